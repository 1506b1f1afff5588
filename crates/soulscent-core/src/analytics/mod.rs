//! Best-effort telemetry.
//!
//! Consumed by UI event handlers, never by the phase engine or the flow
//! controller. Every call is fire-and-forget: failures are logged and
//! swallowed, and nothing here may ever block or break the user-facing
//! flow.

mod client;

pub use client::HttpTelemetry;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// How the user reached immersion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryType {
    /// Through the incense ritual.
    Ritual,
    /// Straight from the Dashboard.
    Direct,
}

impl EntryType {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntryType::Ritual => "ritual",
            EntryType::Direct => "direct",
        }
    }
}

/// Write-only analytics interface. Implementations must be best-effort:
/// no method returns an error and none may block the caller.
pub trait Telemetry: Send + Sync {
    fn track_event(&self, event_type: &str, payload: &Value);

    /// Open a session; returns the (client-generated) session id.
    fn start_session(&self, fragrance_id: &str, entry_type: EntryType) -> String;

    fn end_session(&self, session_id: &str, duration_secs: u64, completed: bool);

    fn record_mood(&self, session_id: &str, mood: &str, context: &str);
}

/// Telemetry that records nothing. The test-time override, and the default
/// when no analytics endpoint is configured.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopTelemetry;

impl Telemetry for NoopTelemetry {
    fn track_event(&self, _event_type: &str, _payload: &Value) {}

    fn start_session(&self, _fragrance_id: &str, _entry_type: EntryType) -> String {
        uuid::Uuid::new_v4().to_string()
    }

    fn end_session(&self, _session_id: &str, _duration_secs: u64, _completed: bool) {}

    fn record_mood(&self, _session_id: &str, _mood: &str, _context: &str) {}
}
