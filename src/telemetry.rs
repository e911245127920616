//! Application telemetry events and sinks.
//!
//! Handlers and the intake report operational signals such as session
//! changes and skipped repositories as structured events. The default sink
//! forwards them to `tracing`, so they land wherever the subscriber installed
//! by the binary writes.

use serde::{Deserialize, Serialize};

/// A structured telemetry event emitted by the dashboard backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TelemetryEvent {
    /// A login completed and a token was stored for a new session.
    SessionEstablished {
        /// Login of the user the token belongs to, when known.
        login: Option<String>,
    },
    /// GitHub rejected a session's token, so it was discarded.
    SessionInvalidated {
        /// What the session was doing when the token was rejected.
        operation: String,
    },
    /// Pull requests were collected across repositories.
    PullRequestsCollected {
        /// Repositories whose pull requests were listed.
        repositories: usize,
        /// Pull request records produced.
        pull_requests: usize,
    },
    /// A repository was left out of a collection because a call failed.
    RepositorySkipped {
        /// `owner/name` of the repository.
        repository: String,
        /// Failure description.
        reason: String,
    },
}

/// A sink that can record telemetry events.
pub trait TelemetrySink: Send + Sync {
    /// Records a telemetry event.
    fn record(&self, event: TelemetryEvent);
}

/// Forwards events to `tracing` with the event serialised as a field.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingTelemetrySink;

impl TelemetrySink for TracingTelemetrySink {
    fn record(&self, event: TelemetryEvent) {
        let Ok(serialised) = serde_json::to_string(&event) else {
            return;
        };
        match event {
            TelemetryEvent::RepositorySkipped { .. } | TelemetryEvent::SessionInvalidated { .. } => {
                tracing::warn!(target: "reviewdeck::telemetry", event = %serialised);
            }
            TelemetryEvent::SessionEstablished { .. }
            | TelemetryEvent::PullRequestsCollected { .. } => {
                tracing::info!(target: "reviewdeck::telemetry", event = %serialised);
            }
        }
    }
}

/// Sink that keeps events in memory for assertions.
#[cfg(any(test, feature = "test-support"))]
#[derive(Debug, Default)]
pub struct RecordingTelemetrySink {
    events: std::sync::Mutex<Vec<TelemetryEvent>>,
}

#[cfg(any(test, feature = "test-support"))]
impl RecordingTelemetrySink {
    /// Drains the recorded events.
    #[must_use]
    pub fn take(&self) -> Vec<TelemetryEvent> {
        self.events
            .lock()
            .map(|mut events| events.drain(..).collect())
            .unwrap_or_default()
    }
}

#[cfg(any(test, feature = "test-support"))]
impl TelemetrySink for RecordingTelemetrySink {
    fn record(&self, event: TelemetryEvent) {
        if let Ok(mut events) = self.events.lock() {
            events.push(event);
        }
    }
}
