//! Master-volume fade ramp.

use serde::{Deserialize, Serialize};

/// Steps per ramp.
pub const FADE_STEPS: u32 = 20;
/// Milliseconds between steps.
pub const FADE_STEP_MS: u64 = 100;
/// Volume delta per step.
pub const FADE_STEP_SIZE: f32 = 0.05;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FadeDirection {
    In,
    Out,
}

/// One wall-clock volume ramp: 20 steps of 0.05 every 100 ms.
///
/// The engine holds at most one ramp at a time; arming a new one replaces
/// (and thereby cancels) the old, so two ramps can never fight over the
/// shared volume. The ramp mutates the volume it is handed on each tick --
/// it never keeps a copy of its own.
#[derive(Debug, Clone)]
pub struct FadeRamp {
    direction: FadeDirection,
    steps_left: u32,
    next_step_at: u64,
}

impl FadeRamp {
    pub fn new(direction: FadeDirection, now_ms: u64) -> Self {
        Self {
            direction,
            steps_left: FADE_STEPS,
            next_step_at: now_ms + FADE_STEP_MS,
        }
    }

    pub fn direction(&self) -> FadeDirection {
        self.direction
    }

    /// Apply every step due by `now_ms` to `volume`. Returns `true` when
    /// the ramp has finished and should be released.
    pub fn tick(&mut self, now_ms: u64, volume: &mut f32) -> bool {
        while self.steps_left > 0 && now_ms >= self.next_step_at {
            match self.direction {
                FadeDirection::In => *volume = (*volume + FADE_STEP_SIZE).min(1.0),
                FadeDirection::Out => *volume = (*volume - FADE_STEP_SIZE).max(0.0),
            }
            self.steps_left -= 1;
            self.next_step_at += FADE_STEP_MS;
        }
        if self.steps_left == 0 {
            // Snap away accumulated float error at the endpoint.
            *volume = match self.direction {
                FadeDirection::In => 1.0,
                FadeDirection::Out => 0.0,
            };
            true
        } else {
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fade_in_reaches_one_after_twenty_steps() {
        let mut ramp = FadeRamp::new(FadeDirection::In, 0);
        let mut volume = 0.0;

        assert!(!ramp.tick(FADE_STEP_MS * 10, &mut volume));
        assert!((volume - 0.5).abs() < 1e-4);

        assert!(ramp.tick(FADE_STEP_MS * FADE_STEPS as u64, &mut volume));
        assert_eq!(volume, 1.0);
    }

    #[test]
    fn fade_out_reaches_zero_and_clamps() {
        let mut ramp = FadeRamp::new(FadeDirection::Out, 0);
        // Starting below 1.0: the ramp clamps at 0 instead of undershooting.
        let mut volume = 0.25;
        assert!(ramp.tick(FADE_STEP_MS * FADE_STEPS as u64, &mut volume));
        assert_eq!(volume, 0.0);
    }

    #[test]
    fn no_step_before_the_first_interval() {
        let mut ramp = FadeRamp::new(FadeDirection::In, 1_000);
        let mut volume = 0.0;
        ramp.tick(1_000 + FADE_STEP_MS - 1, &mut volume);
        assert_eq!(volume, 0.0);
    }

    #[test]
    fn catches_up_on_late_ticks() {
        let mut ramp = FadeRamp::new(FadeDirection::In, 0);
        let mut volume = 0.0;
        // One very late tick applies every elapsed step at once.
        ramp.tick(FADE_STEP_MS * 5, &mut volume);
        assert!((volume - 0.25).abs() < 1e-4);
    }
}
