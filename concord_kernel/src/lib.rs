//! Identifier primitives for the `concord` multi-agent evaluation core.
//!
//! The evaluation core stamps two kinds of identifiers on its outputs: a
//! per-evaluation `request_id` and the 8-character uniquifier suffix of a
//! `HITLRequest.request_id` (`hitl-{task_id}-{uniquifier}`). Both are the same
//! shape: an 8-hex-character token with no structural meaning beyond
//! uniqueness within a process.
//!
//! This crate deliberately does not source entropy itself — callers supply
//! the random bits (typically from `getrandom`), keeping this crate a pure,
//! `no_std`-friendly type substrate.

#![forbid(unsafe_code)]
#![no_std]

extern crate alloc;

use alloc::fmt;
use core::str::FromStr;

use serde::{Deserialize, Serialize};

/// An 8-hex-character uniquifier used in evaluation and HITL request ids.
///
/// Backed by a `u32`; formatted as lowercase, zero-padded hex.
///
/// ```
/// use concord_kernel::Uniquifier;
///
/// let id = Uniquifier::from_raw(0x1234_5678);
/// assert_eq!(id.to_string(), "12345678");
/// let parsed: Uniquifier = "12345678".parse().unwrap();
/// assert_eq!(id, parsed);
/// ```
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Uniquifier(
    /// Hex-encoded 32-bit value.
    #[serde(with = "hex_u32")]
    u32,
);

impl Uniquifier {
    /// Construct a uniquifier from a raw 32-bit value.
    pub const fn from_raw(raw: u32) -> Self {
        Self(raw)
    }

    /// Construct a uniquifier from the low 32 bits of a caller-supplied random value.
    ///
    /// Callers are expected to source `random` from a CSPRNG (e.g. `getrandom`);
    /// this type has no opinion on entropy sourcing.
    pub const fn from_random(random: u64) -> Self {
        Self(random as u32)
    }

    /// The raw 32-bit value.
    pub const fn as_u32(self) -> u32 {
        self.0
    }
}

impl fmt::Debug for Uniquifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Uniquifier({:08x})", self.0)
    }
}

impl fmt::Display for Uniquifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:08x}", self.0)
    }
}

impl FromStr for Uniquifier {
    type Err = ParseUniquifierError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.len() != 8 {
            return Err(ParseUniquifierError { input_len: s.len() });
        }
        let val =
            u32::from_str_radix(s, 16).map_err(|_| ParseUniquifierError { input_len: s.len() })?;
        Ok(Self(val))
    }
}

/// Error returned when parsing a uniquifier string fails.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ParseUniquifierError {
    /// Length of the input string that failed to parse.
    pub input_len: usize,
}

impl fmt::Display for ParseUniquifierError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "invalid uniquifier hex string (length {}, expected 8)",
            self.input_len
        )
    }
}

// ---------------------------------------------------------------------------
// Serde helper: serialize u32 as zero-padded hex string
// ---------------------------------------------------------------------------

mod hex_u32 {
    use alloc::format;
    use alloc::string::String;

    use serde::{self, Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(value: &u32, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&format!("{value:08x}"))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<u32, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        u32::from_str_radix(&s, 16)
            .map_err(|_| serde::de::Error::custom(format!("invalid hex u32: {s}")))
    }
}

#[cfg(test)]
mod tests {
    extern crate std;

    use super::*;
    use std::string::ToString;

    #[test]
    fn display_is_zero_padded_hex() {
        let id = Uniquifier::from_raw(0xAB);
        assert_eq!(id.to_string(), "000000ab");
    }

    #[test]
    fn display_parse_roundtrip() {
        let id = Uniquifier::from_raw(0xDEAD_BEEF);
        let text = id.to_string();
        let parsed: Uniquifier = text.parse().unwrap();
        assert_eq!(id, parsed);
    }

    #[test]
    fn from_random_truncates_to_low_32_bits() {
        let id = Uniquifier::from_random(0x0000_0001_1234_5678);
        assert_eq!(id.as_u32(), 0x1234_5678);
    }

    #[test]
    fn rejects_wrong_length() {
        assert!("1234".parse::<Uniquifier>().is_err());
        assert!("123456789".parse::<Uniquifier>().is_err());
    }

    #[test]
    fn rejects_non_hex() {
        assert!("not-hexx".parse::<Uniquifier>().is_err());
    }

    #[test]
    fn serde_json_roundtrip() {
        let id = Uniquifier::from_raw(0x0102_0304);
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"01020304\"");
    }

    #[test]
    fn ordering_matches_raw_value() {
        let a = Uniquifier::from_raw(1);
        let b = Uniquifier::from_raw(2);
        assert!(a < b);
    }

    #[test]
    fn parse_error_display() {
        let err = ParseUniquifierError { input_len: 3 };
        let msg = err.to_string();
        assert!(msg.contains('3'));
        assert!(msg.contains("8"));
    }
}
