//! # SoulScent Core Library
//!
//! Core logic for the SoulScent incense companion: a scent-based ritual
//! experience with ambient audio, mood journaling ("treehole"), and
//! best-effort analytics. This crate is the engine a thin GUI shell embeds;
//! rendering, audio decoding, and the AI backend live behind traits.
//!
//! ## Architecture
//!
//! - **Phase Engine**: a wall-clock state machine that owns the active
//!   phase, the master volume, and every timer (fades, the immersion
//!   auto-timeout, settle delays); the caller drives `tick()` periodically
//! - **Audio**: control of a dual-layer ambience mix over host-provided
//!   sinks; playback failures are absorbed, never surfaced
//! - **Ritual**: the fill gesture and the smoke particle field
//! - **Treehole**: the mood journaling wizard, with epoch-guarded
//!   application of async collaborator results
//! - **Collaborators**: AI reply, content validation, and daily-sign
//!   boundaries that resolve to fixed fallbacks on any failure
//! - **Analytics**: fire-and-forget telemetry plus the one piece of state
//!   that survives reloads (the current session id)
//!
//! ## Key Components
//!
//! - [`PhaseEngine`]: central orchestrator
//! - [`DualLayerMixer`]: base + overlay + chime staging
//! - [`TreeholeFlow`]: mood -> context -> reply -> echo wizard
//! - [`connection_path`]: the waterfall polyline between visited cards

pub mod analytics;
pub mod audio;
pub mod collaborators;
pub mod error;
pub mod events;
pub mod phase;
pub mod ritual;
pub mod storage;
pub mod treehole;
pub mod waterfall;

pub use analytics::{EntryType, HttpTelemetry, NoopTelemetry, Telemetry};
pub use audio::{AmbianceMode, AudioChannel, AudioSink, DualLayerMixer, NullSink};
pub use collaborators::{
    ContentValidator, HttpContentValidator, HttpReplyProvider, HttpSignProvider, ReplyProvider,
    SignProvider, TimeOfDay, TreeholeReply,
};
pub use error::{ConfigError, CoreError, PlaybackError, StorageError, TelemetryError};
pub use events::Event;
pub use phase::{FadeDirection, FinishOutcome, Phase, PhaseEngine};
pub use ritual::{GesturePhase, RitualGesture, SmokeField};
pub use storage::{Config, Database};
pub use treehole::{
    EchoEntry, FlowStep, MedicineEntry, MoodSession, TreeholeFlow, VisitedSet, MY_ECHO_ID,
};
pub use waterfall::{connection_path, LayoutProvider, PathPoint};

/// Wall-clock milliseconds since the Unix epoch, for hosts driving the
/// engines in real time. Tests pass explicit values instead.
pub fn now_ms() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}
