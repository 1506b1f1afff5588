//! Phase orchestration.

mod engine;
mod fade;

pub use engine::{FinishOutcome, PhaseEngine};
pub use fade::{FadeDirection, FadeRamp, FADE_STEPS, FADE_STEP_MS, FADE_STEP_SIZE};

use serde::{Deserialize, Serialize};

/// The screens of the experience. Exactly one is active at a time, owned
/// exclusively by the [`PhaseEngine`]; transitions are explicit calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    Landing,
    Ritual,
    Sign,
    Immersion,
    Treehole,
    Dashboard,
}
