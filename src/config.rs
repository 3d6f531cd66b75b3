//! TOML-loadable orchestrator tuning knobs, gated behind `config-file`.
//!
//! Mirrors [`concord_schema::Thresholds::from_toml_str`]: a `Deserialize`
//! raw shape with per-field defaults, validated into the same ranges the
//! builder methods enforce.

use std::time::Duration;

use serde::Deserialize;

use crate::orchestrator::Orchestrator;

/// Orchestrator tuning knobs loadable from a TOML document, in addition to
/// the builder-method path on [`Orchestrator`].
#[derive(Clone, Copy, Debug, PartialEq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct OrchestratorSettings {
    #[serde(default = "defaults::max_retries")]
    max_retries: u32,
    #[serde(default = "defaults::timeout_seconds")]
    timeout_seconds: u64,
    #[serde(default = "defaults::enable_hitl")]
    enable_hitl: bool,
}

mod defaults {
    pub const fn max_retries() -> u32 {
        3
    }
    pub const fn timeout_seconds() -> u64 {
        30
    }
    pub const fn enable_hitl() -> bool {
        true
    }
}

impl Default for OrchestratorSettings {
    fn default() -> Self {
        Self {
            max_retries: defaults::max_retries(),
            timeout_seconds: defaults::timeout_seconds(),
            enable_hitl: defaults::enable_hitl(),
        }
    }
}

impl OrchestratorSettings {
    /// Parse orchestrator settings from a TOML document. Missing fields fall
    /// back to the same defaults as [`Orchestrator::new`].
    ///
    /// # Errors
    ///
    /// Returns an error if the document is malformed.
    pub fn from_toml_str(s: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(s)
    }

    /// The configured retry budget.
    pub const fn max_retries(self) -> u32 {
        self.max_retries
    }

    /// The configured per-attempt cancellation deadline.
    pub const fn timeout(self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }

    /// Whether hard disagreement should trigger `requires_human_review`.
    pub const fn enable_hitl(self) -> bool {
        self.enable_hitl
    }

    /// Apply these settings to an [`Orchestrator`] builder chain.
    #[must_use]
    pub fn apply(self, orchestrator: Orchestrator) -> Orchestrator {
        orchestrator
            .with_max_retries(self.max_retries())
            .with_timeout(self.timeout())
            .with_enable_hitl(self.enable_hitl())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_orchestrator_defaults() {
        let settings = OrchestratorSettings::default();
        assert_eq!(settings.max_retries(), 3);
        assert_eq!(settings.timeout(), Duration::from_secs(30));
        assert!(settings.enable_hitl());
    }

    #[test]
    fn parses_partial_toml_with_defaults() {
        let settings = OrchestratorSettings::from_toml_str("max_retries = 5\n").unwrap();
        assert_eq!(settings.max_retries(), 5);
        assert_eq!(settings.timeout(), Duration::from_secs(30));
        assert!(settings.enable_hitl());
    }

    #[test]
    fn rejects_malformed_toml() {
        assert!(OrchestratorSettings::from_toml_str("max_retries = [1, 2]\n").is_err());
    }
}
