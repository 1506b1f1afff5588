//! Phase orchestration engine.
//!
//! The engine is a wall-clock state machine in the same mold as the other
//! engines in this crate: no internal threads or timers, the caller
//! supplies `now_ms` and calls `tick()` periodically (typically once per
//! animation frame). Commands return events; `tick()` returns the events
//! produced by elapsed deadlines and ramps.
//!
//! The engine exclusively owns the active [`Phase`] and the master volume
//! (through the mixer). Timer discipline: there is exactly one slot for
//! each timer kind -- fade ramp, immersion timeout, pending phase switch --
//! and arming a slot replaces its previous occupant, so overlapping fades
//! or duplicate phase switches cannot occur.

use chrono::Utc;
use serde::{Deserialize, Serialize};

use super::fade::{FadeDirection, FadeRamp};
use super::Phase;
use crate::audio::{AmbianceMode, AudioSink, DualLayerMixer};
use crate::events::Event;
use crate::ritual::RitualGesture;
use crate::storage::Config;
use crate::treehole::TreeholeFlow;

/// Pause between a completed fade-out and the actual phase switch.
const SWITCH_SETTLE_MS: u64 = 1_500;
/// How long the ritual visual keeps fading after the transition.
const RITUAL_OVERLAY_FADE_MS: u64 = 3_000;

/// Result of asking to finish the treehole journey.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FinishOutcome {
    /// Nothing was visited; the session ended and we are on the Dashboard.
    Finished,
    /// Cards were visited; show the summary and call `confirm_finish`.
    ConfirmationRequired,
}

pub struct PhaseEngine {
    phase: Phase,
    mixer: DualLayerMixer,
    treehole: TreeholeFlow,
    gesture: RitualGesture,
    /// At most one active volume ramp.
    fade: Option<FadeRamp>,
    /// Immersion auto-timeout deadline.
    immersion_deadline: Option<u64>,
    /// Armed after a fade-out completes; fires the switch to Treehole.
    treehole_switch_at: Option<u64>,
    /// When the ritual overlay began fading out, if it is.
    ritual_overlay_fade_started: Option<u64>,
    immersion_timeout_ms: u64,
    default_scenario_url: String,
    /// Scenario picked before entering the ritual path.
    pending_scenario: Option<String>,
}

impl PhaseEngine {
    /// Build an engine over three platform sinks. A fresh engine always
    /// starts on the Dashboard.
    pub fn new(
        config: &Config,
        base_sink: Box<dyn AudioSink>,
        overlay_sink: Box<dyn AudioSink>,
        chime_sink: Box<dyn AudioSink>,
    ) -> Self {
        Self {
            phase: Phase::Dashboard,
            mixer: DualLayerMixer::new(base_sink, overlay_sink, chime_sink, &config.audio),
            treehole: TreeholeFlow::new(),
            gesture: RitualGesture::new(),
            fade: None,
            immersion_deadline: None,
            treehole_switch_at: None,
            ritual_overlay_fade_started: None,
            immersion_timeout_ms: config.immersion_timeout_ms(),
            default_scenario_url: config.audio.default_scenario_url.clone(),
            pending_scenario: None,
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn mixer(&self) -> &DualLayerMixer {
        &self.mixer
    }

    pub fn master_volume(&self) -> f32 {
        self.mixer.master()
    }

    pub fn treehole(&self) -> &TreeholeFlow {
        &self.treehole
    }

    pub fn treehole_mut(&mut self) -> &mut TreeholeFlow {
        &mut self.treehole
    }

    pub fn gesture(&self) -> &RitualGesture {
        &self.gesture
    }

    /// Opacity for the ritual visual: 1 while the ritual is active, then
    /// decaying to 0 over three seconds after the transition.
    pub fn ritual_overlay_alpha(&self, now_ms: u64) -> f32 {
        if self.phase == Phase::Ritual {
            return 1.0;
        }
        match self.ritual_overlay_fade_started {
            Some(start) => {
                let elapsed = now_ms.saturating_sub(start);
                if elapsed >= RITUAL_OVERLAY_FADE_MS {
                    0.0
                } else {
                    1.0 - elapsed as f32 / RITUAL_OVERLAY_FADE_MS as f32
                }
            }
            None => 0.0,
        }
    }

    /// Build a full state snapshot event.
    pub fn snapshot(&self) -> Event {
        Event::StateSnapshot {
            phase: self.phase,
            master_volume: self.mixer.master(),
            ambiance: self.mixer.mode(),
            ritual_level: self.gesture.level(),
            at: Utc::now(),
        }
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Dashboard -> Immersion, the direct path. Resets the session, sets
    /// the master volume to 1, starts the base audio immediately, and arms
    /// the auto-timeout.
    pub fn select_scenario(&mut self, now_ms: u64, scenario_url: &str) -> Vec<Event> {
        if self.phase != Phase::Dashboard {
            return Vec::new();
        }
        self.enter_immersion(now_ms, scenario_url, false)
    }

    /// Dashboard -> Ritual. The scenario plays once the ritual completes.
    pub fn begin_ritual(&mut self, scenario_url: &str) -> Option<Event> {
        if self.phase != Phase::Dashboard {
            return None;
        }
        self.pending_scenario = Some(scenario_url.to_string());
        self.gesture.reset();
        self.ritual_overlay_fade_started = None;
        Some(self.switch_phase(Phase::Ritual))
    }

    /// Dashboard -> Landing onboarding entry.
    pub fn enter_landing(&mut self) -> Option<Event> {
        if self.phase != Phase::Dashboard {
            return None;
        }
        Some(self.switch_phase(Phase::Landing))
    }

    /// Landing -> Sign: show the daily sign before the ritual.
    pub fn begin_journey(&mut self) -> Option<Event> {
        if self.phase != Phase::Landing {
            return None;
        }
        Some(self.switch_phase(Phase::Sign))
    }

    /// Sign -> Ritual.
    pub fn dismiss_sign(&mut self) -> Option<Event> {
        if self.phase != Phase::Sign {
            return None;
        }
        self.gesture.reset();
        self.ritual_overlay_fade_started = None;
        Some(self.switch_phase(Phase::Ritual))
    }

    /// Immersion -> Treehole by explicit mood-entry trigger: the timeout is
    /// cancelled and the switch happens immediately, without a fade.
    pub fn enter_treehole(&mut self) -> Option<Event> {
        if self.phase != Phase::Immersion {
            return None;
        }
        self.cancel_timers();
        self.mixer.pause();
        Some(self.switch_phase(Phase::Treehole))
    }

    /// Menu escape hatch: immediate, cancels every pending timer.
    pub fn go_dashboard(&mut self) -> Option<Event> {
        if self.phase == Phase::Dashboard {
            return None;
        }
        self.cancel_timers();
        self.mixer.pause();
        Some(self.switch_phase(Phase::Dashboard))
    }

    /// Ask to finish the treehole journey. With nothing visited the
    /// session ends right away; otherwise the caller must show the summary
    /// and come back through [`confirm_finish`].
    ///
    /// [`confirm_finish`]: PhaseEngine::confirm_finish
    pub fn finish_journey(&mut self) -> Option<(FinishOutcome, Vec<Event>)> {
        if self.phase != Phase::Treehole {
            return None;
        }
        if self.treehole.visited().is_empty() {
            let mut events = vec![Event::JourneyFinished { at: Utc::now() }];
            events.push(self.depart_to_dashboard());
            Some((FinishOutcome::Finished, events))
        } else {
            Some((FinishOutcome::ConfirmationRequired, Vec::new()))
        }
    }

    /// Confirm the summary modal and end the session.
    pub fn confirm_finish(&mut self) -> Option<Vec<Event>> {
        if self.phase != Phase::Treehole {
            return None;
        }
        let mut events = vec![Event::JourneyFinished { at: Utc::now() }];
        events.push(self.depart_to_dashboard());
        Some(events)
    }

    /// Switch the functional-noise overlay. A user preference, not session
    /// state: it survives session resets.
    pub fn set_ambiance(&mut self, mode: AmbianceMode) {
        self.mixer.set_mode(mode);
    }

    // ── Ritual input (active only during the Ritual phase) ───────────

    pub fn ritual_pointer_down(&mut self, y: f32) {
        if self.phase == Phase::Ritual {
            self.gesture.pointer_down(y);
        }
    }

    pub fn ritual_pointer_move(&mut self, now_ms: u64, y: f32) {
        if self.phase == Phase::Ritual {
            self.gesture.pointer_move(now_ms, y);
        }
    }

    pub fn ritual_pointer_up(&mut self) {
        if self.phase == Phase::Ritual {
            self.gesture.pointer_up();
        }
    }

    // ── Tick ─────────────────────────────────────────────────────────

    /// Call periodically. Advances ramps, deadlines, and the treehole
    /// flow's timed sub-states.
    pub fn tick(&mut self, now_ms: u64) -> Vec<Event> {
        let mut events = Vec::new();
        match self.phase {
            Phase::Ritual => {
                if let Some(ev) = self.gesture.tick(now_ms) {
                    events.push(ev);
                    self.mixer.play_chime();
                    self.ritual_overlay_fade_started = Some(now_ms);
                    let scenario = self
                        .pending_scenario
                        .take()
                        .unwrap_or_else(|| self.default_scenario_url.clone());
                    events.extend(self.enter_immersion(now_ms, &scenario, true));
                }
            }
            Phase::Immersion => {
                if let Some(deadline) = self.immersion_deadline {
                    if now_ms >= deadline {
                        self.immersion_deadline = None;
                        // Supersedes any ramp still running.
                        self.fade = Some(FadeRamp::new(FadeDirection::Out, now_ms));
                        events.push(Event::ImmersionTimedOut { at: Utc::now() });
                        events.push(Event::FadeStarted {
                            direction: FadeDirection::Out,
                            at: Utc::now(),
                        });
                    }
                }
                events.extend(self.tick_fade(now_ms));
                if let Some(at) = self.treehole_switch_at {
                    if now_ms >= at {
                        self.treehole_switch_at = None;
                        self.mixer.pause();
                        events.push(self.switch_phase(Phase::Treehole));
                    }
                }
            }
            Phase::Treehole => {
                for ev in self.treehole.tick(now_ms) {
                    let departed = matches!(ev, Event::JourneyDeparted { .. });
                    events.push(ev);
                    if departed {
                        events.push(self.depart_to_dashboard());
                    }
                }
            }
            _ => {}
        }
        events
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn enter_immersion(&mut self, now_ms: u64, scenario_url: &str, fade_in: bool) -> Vec<Event> {
        let mut events = Vec::new();
        // Fresh session context: mood, AI result, healing text, visited set.
        self.treehole.reset_session();
        self.mixer.set_base_url(scenario_url);
        if fade_in {
            self.mixer.set_master(0.0);
            self.fade = Some(FadeRamp::new(FadeDirection::In, now_ms));
            events.push(Event::FadeStarted {
                direction: FadeDirection::In,
                at: Utc::now(),
            });
        } else {
            self.fade = None;
            self.mixer.set_master(1.0);
        }
        self.mixer.play();
        self.immersion_deadline = Some(now_ms + self.immersion_timeout_ms);
        self.treehole_switch_at = None;
        events.push(self.switch_phase(Phase::Immersion));
        events
    }

    fn tick_fade(&mut self, now_ms: u64) -> Vec<Event> {
        let mut events = Vec::new();
        if let Some(ramp) = self.fade.as_mut() {
            let mut volume = self.mixer.master();
            let finished = ramp.tick(now_ms, &mut volume);
            let direction = ramp.direction();
            self.mixer.set_master(volume);
            if finished {
                self.fade = None;
                events.push(Event::FadeFinished {
                    direction,
                    volume,
                    at: Utc::now(),
                });
                if direction == FadeDirection::Out {
                    self.treehole_switch_at = Some(now_ms + SWITCH_SETTLE_MS);
                }
            }
        }
        events
    }

    fn depart_to_dashboard(&mut self) -> Event {
        self.cancel_timers();
        self.mixer.pause();
        self.treehole.reset_session();
        self.switch_phase(Phase::Dashboard)
    }

    fn cancel_timers(&mut self) {
        self.fade = None;
        self.immersion_deadline = None;
        self.treehole_switch_at = None;
    }

    fn switch_phase(&mut self, to: Phase) -> Event {
        let from = self.phase;
        self.phase = to;
        Event::PhaseChanged {
            from,
            to,
            at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::NullSink;

    fn engine() -> PhaseEngine {
        PhaseEngine::new(
            &Config::default(),
            Box::new(NullSink),
            Box::new(NullSink),
            Box::new(NullSink),
        )
    }

    #[test]
    fn fresh_engine_starts_on_dashboard() {
        let e = engine();
        assert_eq!(e.phase(), Phase::Dashboard);
        assert_eq!(e.master_volume(), 1.0);
    }

    #[test]
    fn scenario_selection_requires_dashboard() {
        let mut e = engine();
        e.begin_ritual("scene.mp3").unwrap();
        assert!(e.select_scenario(0, "scene.mp3").is_empty());
        assert_eq!(e.phase(), Phase::Ritual);
    }

    #[test]
    fn landing_sign_ritual_path() {
        let mut e = engine();
        e.enter_landing().unwrap();
        assert_eq!(e.phase(), Phase::Landing);
        e.begin_journey().unwrap();
        assert_eq!(e.phase(), Phase::Sign);
        e.dismiss_sign().unwrap();
        assert_eq!(e.phase(), Phase::Ritual);
    }

    #[test]
    fn menu_returns_to_dashboard_and_cancels_timers() {
        let mut e = engine();
        e.select_scenario(0, "scene.mp3");
        assert_eq!(e.phase(), Phase::Immersion);

        e.go_dashboard().unwrap();
        assert_eq!(e.phase(), Phase::Dashboard);
        // Way past the old deadline: nothing fires.
        assert!(e.tick(100_000_000).is_empty());
        assert_eq!(e.phase(), Phase::Dashboard);
    }

    #[test]
    fn ritual_input_is_ignored_outside_the_ritual_phase() {
        let mut e = engine();
        e.ritual_pointer_down(500.0);
        e.ritual_pointer_move(0, 100.0);
        assert_eq!(e.gesture().level(), 0.0);
    }

    #[test]
    fn overlay_alpha_decays_after_transition() {
        let mut e = engine();
        e.begin_ritual("scene.mp3");
        assert_eq!(e.ritual_overlay_alpha(0), 1.0);

        e.ritual_pointer_down(1000.0);
        e.ritual_pointer_move(0, 500.0);
        e.tick(1_500);
        assert_eq!(e.phase(), Phase::Immersion);
        assert!(e.ritual_overlay_alpha(1_500) > 0.99);
        let mid = e.ritual_overlay_alpha(1_500 + 1_500);
        assert!(mid > 0.4 && mid < 0.6);
        assert_eq!(e.ritual_overlay_alpha(1_500 + 3_000), 0.0);
    }

    #[test]
    fn snapshot_reflects_state() {
        let e = engine();
        match e.snapshot() {
            Event::StateSnapshot {
                phase,
                master_volume,
                ambiance,
                ..
            } => {
                assert_eq!(phase, Phase::Dashboard);
                assert_eq!(master_volume, 1.0);
                assert_eq!(ambiance, AmbianceMode::Original);
            }
            _ => panic!("expected StateSnapshot"),
        }
    }
}
