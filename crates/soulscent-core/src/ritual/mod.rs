//! Incense ritual: fill gesture and smoke simulation.

mod gesture;
mod particles;

pub use gesture::{GesturePhase, RitualGesture, COMPLETION_SETTLE_MS, FILL_SENSITIVITY};
pub use particles::{SmokeField, SmokeParticle, BURST_LEVEL, IDLE_LEVEL_MAX};
