use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::audio::AmbianceMode;
use crate::phase::{FadeDirection, Phase};

/// Every state change in the system produces an Event.
/// The GUI shell polls for events; telemetry hooks subscribe to them.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Event {
    PhaseChanged {
        from: Phase,
        to: Phase,
        at: DateTime<Utc>,
    },
    /// A master-volume ramp was armed (any previous ramp is superseded).
    FadeStarted {
        direction: FadeDirection,
        at: DateTime<Utc>,
    },
    /// A master-volume ramp reached its target and was released.
    FadeFinished {
        direction: FadeDirection,
        volume: f32,
        at: DateTime<Utc>,
    },
    /// The 10-minute immersion auto-timeout fired; the fade-out begins.
    ImmersionTimedOut {
        at: DateTime<Utc>,
    },
    /// The ritual gesture reached full level and its settle delay elapsed.
    RitualCompleted {
        at: DateTime<Utc>,
    },
    MoodSelected {
        mood: String,
        at: DateTime<Utc>,
    },
    /// An AI reply (real or fallback) was applied to the current session.
    ReplyReady {
        nickname: String,
        at: DateTime<Utc>,
    },
    /// An async result arrived for a session that no longer exists.
    StaleResultDiscarded {
        epoch: u64,
        at: DateTime<Utc>,
    },
    HealingAccepted {
        at: DateTime<Utc>,
    },
    /// Content validation refused the healing text; nothing was mutated.
    HealingRejected {
        at: DateTime<Utc>,
    },
    /// The pseudo-search finished and a peer echo was revealed.
    EchoMatched {
        echo_id: String,
        at: DateTime<Utc>,
    },
    HugGiven {
        echo_id: String,
        hugs: u32,
        at: DateTime<Utc>,
    },
    /// The hug fly-away animation finished; the session departs to Dashboard.
    JourneyDeparted {
        at: DateTime<Utc>,
    },
    /// The user explicitly ended the treehole journey.
    JourneyFinished {
        at: DateTime<Utc>,
    },
    StateSnapshot {
        phase: Phase,
        master_volume: f32,
        ambiance: AmbianceMode,
        ritual_level: f32,
        at: DateTime<Utc>,
    },
}
