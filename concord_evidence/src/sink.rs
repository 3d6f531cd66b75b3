//! A `tracing`-backed [`EventSink`] implementation.

#![cfg(feature = "tracing-integration")]

use std::collections::BTreeMap;

use concord_schema::EventSink;
use serde_json::Value;

/// Forwards every emitted event to the `tracing` crate.
///
/// `hitl_escalation_not_required` logs at DEBUG since it fires on every
/// evaluation that does not need a human; every other event logs at INFO.
#[derive(Clone, Copy, Debug, Default)]
pub struct TracingEventSink;

impl EventSink for TracingEventSink {
    fn emit(&self, event_name: &str, payload: &BTreeMap<String, Value>) {
        let payload = serde_json::to_string(payload).unwrap_or_default();
        if event_name == "hitl_escalation_not_required" {
            tracing::debug!(event = event_name, %payload, "concord event");
        } else {
            tracing::info!(event = event_name, %payload, "concord event");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn emits_without_panicking() {
        let sink = TracingEventSink;
        sink.emit("hitl_escalation_not_required", &BTreeMap::new());
        sink.emit("hitl_escalation_triggered", &BTreeMap::new());
    }
}
