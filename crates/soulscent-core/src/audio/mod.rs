//! Audio control layer.
//!
//! Playback itself is delegated to the host platform through the
//! [`AudioSink`] trait; this module only owns *control* -- desired
//! play/pause state, volume staging, source swaps, and the dual-layer
//! ambience mix. Playback failures never escape this layer: a rejected
//! play request leaves the channel paused and is logged.

mod channel;
mod mixer;

pub use channel::{AudioChannel, AudioSink, NullSink};
pub use mixer::{AmbianceMode, DualLayerMixer, BASE_DUCK, OVERLAY_GAIN};
