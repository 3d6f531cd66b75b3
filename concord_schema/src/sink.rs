//! The event sink contract (C7): a narrow callback interface the analyser,
//! resolver, orchestrator, and HITL builder use to report what they did
//! without taking on an opinion about logging, metrics, or tracing backends.

use std::collections::BTreeMap;

use serde_json::Value;

/// Receives structured events emitted by the evaluation core.
///
/// Implementations may log, meter, or discard events; core code never
/// branches on anything but whether a sink was supplied. The set of event
/// names and their payload shapes are fixed by each emitting component and
/// documented there, not by this trait.
pub trait EventSink: Send + Sync {
    /// Called once per emitted event, in the order the event occurred.
    fn emit(&self, event_name: &str, payload: &BTreeMap<String, Value>);
}

impl<F> EventSink for F
where
    F: Fn(&str, &BTreeMap<String, Value>) + Send + Sync,
{
    fn emit(&self, event_name: &str, payload: &BTreeMap<String, Value>) {
        self(event_name, payload);
    }
}

/// An [`EventSink`] that discards every event.
///
/// The default when no sink is supplied at construction.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopEventSink;

impl EventSink for NoopEventSink {
    fn emit(&self, _event_name: &str, _payload: &BTreeMap<String, Value>) {}
}

/// Emit an event to an optional sink, matching the core's `nil`-check
/// discipline: no sink, no event, no cost beyond the branch.
pub fn emit(sink: Option<&dyn EventSink>, event_name: &str, payload: BTreeMap<String, Value>) {
    if let Some(sink) = sink {
        sink.emit(event_name, &payload);
    }
}
