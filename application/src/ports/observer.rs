//! Port for structured run-event observation.
//!
//! Defines the [`RunObserver`] trait for recording generation events
//! (article selections, failed attempts, accepted questions) to a
//! structured sink.
//!
//! This is separate from `tracing`-based operation logs: tracing handles
//! human-readable diagnostic messages, while this port captures the run
//! history in a machine-readable format, including the seed values a
//! crashed run needs for resumption.

use serde_json::Value;

/// A structured run event.
pub struct RunEvent {
    /// Event type identifier (e.g., "question_accepted", "attempt_failed").
    pub event_type: &'static str,
    /// JSON payload with event-specific data.
    pub payload: Value,
}

impl RunEvent {
    pub fn new(event_type: &'static str, payload: Value) -> Self {
        Self {
            event_type,
            payload,
        }
    }
}

/// Port for recording run events to a structured sink.
///
/// The `record` method is intentionally synchronous and non-fallible to
/// avoid disrupting the generation loop; sink failures are silently
/// ignored.
pub trait RunObserver: Send + Sync {
    /// Record a run event.
    fn record(&self, event: RunEvent);
}

/// No-op implementation for tests and when observation is disabled.
pub struct NoRunObserver;

impl RunObserver for NoRunObserver {
    fn record(&self, _event: RunEvent) {}
}
