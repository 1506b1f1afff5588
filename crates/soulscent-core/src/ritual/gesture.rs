//! Ritual fill gesture.
//!
//! The gesture engine is a wall-clock state machine over pointer samples.
//! The host unifies mouse and touch input into plain `(now_ms, y)` samples
//! before they reach this module, and calls `tick()` periodically.
//!
//! ```text
//! Idle -> Filling -> Completed (terminal)
//! ```

use serde::{Deserialize, Serialize};
use chrono::Utc;

use crate::events::Event;

/// Fill gained per pixel of upward drag.
pub const FILL_SENSITIVITY: f32 = 0.3;
/// Fill lost per downward drag sample.
const DOWNWARD_DECAY: f32 = 1.0;
/// Full fill.
const LEVEL_MAX: f32 = 100.0;
/// Delay between reaching full level and the completion event, so the
/// whiteout visual can play.
pub const COMPLETION_SETTLE_MS: u64 = 1_500;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GesturePhase {
    Idle,
    Filling,
    Completed,
}

/// State machine for the continuous drag gesture that fills the censer.
#[derive(Debug, Clone)]
pub struct RitualGesture {
    phase: GesturePhase,
    level: f32,
    /// Last pointer y while a drag is active.
    last_y: Option<f32>,
    settle_at: Option<u64>,
    completion_emitted: bool,
}

impl Default for RitualGesture {
    fn default() -> Self {
        Self::new()
    }
}

impl RitualGesture {
    pub fn new() -> Self {
        Self {
            phase: GesturePhase::Idle,
            level: 0.0,
            last_y: None,
            settle_at: None,
            completion_emitted: false,
        }
    }

    pub fn phase(&self) -> GesturePhase {
        self.phase
    }

    /// Current fill level in [0, 100].
    pub fn level(&self) -> f32 {
        self.level
    }

    /// Begin (or resume) a drag at pointer position `y`.
    pub fn pointer_down(&mut self, y: f32) {
        if self.phase == GesturePhase::Completed {
            return;
        }
        self.phase = GesturePhase::Filling;
        self.last_y = Some(y);
    }

    /// Feed one movement sample. Screen y grows downward, so a smaller `y`
    /// than the previous sample is an upward drag.
    pub fn pointer_move(&mut self, now_ms: u64, y: f32) {
        if self.phase != GesturePhase::Filling {
            return;
        }
        let Some(last) = self.last_y else {
            return;
        };
        let dy_up = last - y;
        if dy_up > 0.0 {
            self.level += dy_up * FILL_SENSITIVITY;
        } else if dy_up < 0.0 {
            self.level -= DOWNWARD_DECAY;
        }
        self.level = self.level.clamp(0.0, LEVEL_MAX);
        self.last_y = Some(y);

        if self.level >= LEVEL_MAX {
            self.complete(now_ms);
        }
    }

    /// End the drag. The level holds its value; dragging can resume.
    pub fn pointer_up(&mut self) {
        self.last_y = None;
    }

    /// Call periodically. Returns the completion event exactly once, after
    /// the settle delay has elapsed.
    pub fn tick(&mut self, now_ms: u64) -> Option<Event> {
        if self.completion_emitted {
            return None;
        }
        match self.settle_at {
            Some(at) if now_ms >= at => {
                self.completion_emitted = true;
                self.settle_at = None;
                Some(Event::RitualCompleted { at: Utc::now() })
            }
            _ => None,
        }
    }

    /// Reset for a fresh ritual. The only way out of `Completed`.
    pub fn reset(&mut self) {
        *self = Self::new();
    }

    fn complete(&mut self, now_ms: u64) {
        // Re-entrant guard: once terminal, further samples are ignored.
        if self.phase == GesturePhase::Completed {
            return;
        }
        self.phase = GesturePhase::Completed;
        self.level = LEVEL_MAX;
        self.last_y = None;
        self.settle_at = Some(now_ms + COMPLETION_SETTLE_MS);
    }
}
