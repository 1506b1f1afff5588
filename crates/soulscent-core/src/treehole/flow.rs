//! Mood/treehole flow controller.
//!
//! A wall-clock state machine over the journaling wizard: mood, context,
//! AI reply, optional healing share, peer echo, hugs. Like the phase
//! engine, it has no internal timers -- the caller supplies `now_ms` and
//! drives `tick()`.
//!
//! The two asynchronous boundaries (AI reply, content validation) are
//! modelled as request-out / apply-back: selecting a context returns a
//! [`ReplyRequest`], the host awaits the collaborator, then feeds the
//! result to [`TreeholeFlow::apply_reply`]. Every request carries the
//! session epoch; a result applied after the session was reset is
//! discarded instead of leaking into the new session.

use chrono::Utc;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::echoes::{peer_pool, EchoEntry, MedicineEntry, VisitedSet, MY_ECHO_ID, MY_NICKNAME};
use crate::collaborators::TreeholeReply;
use crate::events::Event;

/// Cosmetic pause between mood selection and the context step.
pub const MOOD_SETTLE_MS: u64 = 300;
/// Simulated "searching for someone like you" delay before the peer echo.
pub const MATCH_SEARCH_MS: u64 = 2_500;
/// Duration of the hug feedback overlay.
pub const HUG_OVERLAY_MS: u64 = 1_500;
/// Duration of the fly-away animation before departing to Dashboard.
pub const FLY_AWAY_MS: u64 = 1_000;

/// Per-session mood state. Created fresh on every immersion entry.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MoodSession {
    pub selected_mood: Option<String>,
    pub selected_context: Option<String>,
    /// Set at most once per session, from the collaborator or its fallback.
    pub ai_result: Option<TreeholeReply>,
    pub healing_text: String,
    pub my_medicine_entry: Option<MedicineEntry>,
}

/// Where the wizard currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "step", rename_all = "snake_case")]
pub enum FlowStep {
    MoodSelect,
    MoodSettle { until: u64 },
    ContextSelect,
    AwaitingReply,
    Reply,
    Matching { reveal_at: u64 },
    PeerEcho,
    HugOverlay { until: u64 },
    FlyAway { until: u64 },
    /// Session end reached; the orchestrator takes it from here.
    Finished,
}

/// Handed to the host when a context is selected; resolve against the
/// reply collaborator and feed the result back with the same epoch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplyRequest {
    pub epoch: u64,
    pub mood: String,
    pub context: String,
}

/// Handed to the host when healing text is submitted; resolve against the
/// content validator and feed the verdict back with the same epoch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationRequest {
    pub epoch: u64,
    pub text: String,
}

pub struct TreeholeFlow {
    /// Monotonic session token; bumped on every reset so in-flight async
    /// results from an older session can be recognized and dropped.
    epoch: u64,
    step: FlowStep,
    session: MoodSession,
    echoes: Vec<EchoEntry>,
    visited: VisitedSet,
    rng: Pcg32,
}

impl Default for TreeholeFlow {
    fn default() -> Self {
        Self::new()
    }
}

impl TreeholeFlow {
    pub fn new() -> Self {
        Self::with_seed(0xB10_0D0)
    }

    /// Deterministic peer-echo choice for tests.
    pub fn with_seed(seed: u64) -> Self {
        Self {
            epoch: 0,
            step: FlowStep::MoodSelect,
            session: MoodSession::default(),
            echoes: Vec::new(),
            visited: VisitedSet::new(),
            rng: Pcg32::seed_from_u64(seed),
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    pub fn step(&self) -> FlowStep {
        self.step
    }

    pub fn session(&self) -> &MoodSession {
        &self.session
    }

    pub fn echoes(&self) -> &[EchoEntry] {
        &self.echoes
    }

    pub fn visited(&self) -> &VisitedSet {
        &self.visited
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Start a fresh session. Clears every piece of session state and
    /// invalidates in-flight async results.
    pub fn reset_session(&mut self) {
        self.epoch += 1;
        self.step = FlowStep::MoodSelect;
        self.session = MoodSession::default();
        self.echoes.clear();
        self.visited.clear();
    }

    pub fn select_mood(&mut self, now_ms: u64, mood: &str) -> Option<Event> {
        if self.step != FlowStep::MoodSelect {
            return None;
        }
        self.session.selected_mood = Some(mood.to_string());
        self.step = FlowStep::MoodSettle {
            until: now_ms + MOOD_SETTLE_MS,
        };
        Some(Event::MoodSelected {
            mood: mood.to_string(),
            at: Utc::now(),
        })
    }

    /// Select a context and hand back the AI request to resolve.
    pub fn select_context(&mut self, context: &str) -> Option<ReplyRequest> {
        if self.step != FlowStep::ContextSelect {
            return None;
        }
        let mood = self.session.selected_mood.clone()?;
        self.session.selected_context = Some(context.to_string());
        self.step = FlowStep::AwaitingReply;
        Some(ReplyRequest {
            epoch: self.epoch,
            mood,
            context: context.to_string(),
        })
    }

    /// Apply a resolved AI reply. Results from a stale epoch are dropped;
    /// within a session the result is written at most once.
    pub fn apply_reply(&mut self, request_epoch: u64, reply: TreeholeReply) -> Option<Event> {
        if request_epoch != self.epoch {
            debug!(request_epoch, current = self.epoch, "dropping stale AI reply");
            return Some(Event::StaleResultDiscarded {
                epoch: request_epoch,
                at: Utc::now(),
            });
        }
        if self.step != FlowStep::AwaitingReply || self.session.ai_result.is_some() {
            return None;
        }
        let nickname = reply.nickname.clone();
        self.session.ai_result = Some(reply);
        self.step = FlowStep::Reply;
        Some(Event::ReplyReady {
            nickname,
            at: Utc::now(),
        })
    }

    /// Submit free-text healing content for validation. Nothing is mutated
    /// until the verdict comes back through [`apply_validation`].
    ///
    /// [`apply_validation`]: TreeholeFlow::apply_validation
    pub fn submit_healing(&self, text: &str) -> Option<ValidationRequest> {
        if self.step != FlowStep::Reply || text.trim().is_empty() {
            return None;
        }
        Some(ValidationRequest {
            epoch: self.epoch,
            text: text.to_string(),
        })
    }

    /// Apply a validation verdict. Rejection surfaces an event and leaves
    /// all session state untouched.
    pub fn apply_validation(
        &mut self,
        now_ms: u64,
        request_epoch: u64,
        text: &str,
        accepted: bool,
    ) -> Option<Event> {
        if request_epoch != self.epoch {
            debug!(request_epoch, current = self.epoch, "dropping stale validation");
            return Some(Event::StaleResultDiscarded {
                epoch: request_epoch,
                at: Utc::now(),
            });
        }
        if self.step != FlowStep::Reply {
            return None;
        }
        if !accepted {
            return Some(Event::HealingRejected { at: Utc::now() });
        }
        self.session.healing_text = text.to_string();
        self.session.my_medicine_entry = Some(MedicineEntry {
            content: text.to_string(),
            date: Utc::now().date_naive(),
        });
        self.echoes.push(EchoEntry {
            id: MY_ECHO_ID.to_string(),
            content: text.to_string(),
            nickname: MY_NICKNAME.to_string(),
            hugs: 0,
            is_liked: false,
        });
        self.visited.insert(MY_ECHO_ID);
        self.step = FlowStep::Matching {
            reveal_at: now_ms + MATCH_SEARCH_MS,
        };
        Some(Event::HealingAccepted { at: Utc::now() })
    }

    /// Skip the share step and end the session.
    pub fn skip_share(&mut self) {
        if self.step == FlowStep::Reply {
            self.step = FlowStep::Finished;
        }
    }

    /// Hug the revealed peer echo: counter, visited mark, feedback overlay,
    /// then the fly-away departure.
    pub fn give_hug(&mut self, now_ms: u64, echo_id: &str) -> Option<Event> {
        if self.step != FlowStep::PeerEcho {
            return None;
        }
        let hugs = self.bump_hugs(echo_id)?;
        self.step = FlowStep::HugOverlay {
            until: now_ms + HUG_OVERLAY_MS,
        };
        Some(Event::HugGiven {
            echo_id: echo_id.to_string(),
            hugs,
            at: Utc::now(),
        })
    }

    /// Hug a card in the waterfall. Same visited-marking as [`give_hug`]
    /// but without the overlay/fly-away sequence.
    ///
    /// [`give_hug`]: TreeholeFlow::give_hug
    pub fn hug_entry(&mut self, echo_id: &str) -> Option<Event> {
        let hugs = self.bump_hugs(echo_id)?;
        Some(Event::HugGiven {
            echo_id: echo_id.to_string(),
            hugs,
            at: Utc::now(),
        })
    }

    /// Call periodically to advance timed sub-states.
    pub fn tick(&mut self, now_ms: u64) -> Vec<Event> {
        let mut events = Vec::new();
        match self.step {
            FlowStep::MoodSettle { until } if now_ms >= until => {
                self.step = FlowStep::ContextSelect;
            }
            FlowStep::Matching { reveal_at } if now_ms >= reveal_at => {
                let echo = self.draw_peer_echo();
                let id = echo.id.clone();
                self.echoes.push(echo);
                self.step = FlowStep::PeerEcho;
                events.push(Event::EchoMatched {
                    echo_id: id,
                    at: Utc::now(),
                });
            }
            FlowStep::HugOverlay { until } if now_ms >= until => {
                self.step = FlowStep::FlyAway {
                    until: now_ms + FLY_AWAY_MS,
                };
            }
            FlowStep::FlyAway { until } if now_ms >= until => {
                self.step = FlowStep::Finished;
                events.push(Event::JourneyDeparted { at: Utc::now() });
            }
            _ => {}
        }
        events
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn bump_hugs(&mut self, echo_id: &str) -> Option<u32> {
        let entry = self.echoes.iter_mut().find(|e| e.id == echo_id)?;
        entry.hugs += 1;
        entry.is_liked = true;
        let hugs = entry.hugs;
        self.visited.insert(echo_id);
        Some(hugs)
    }

    fn draw_peer_echo(&mut self) -> EchoEntry {
        let mood = self.session.selected_mood.as_deref().unwrap_or_default();
        let context = self.session.selected_context.as_deref().unwrap_or_default();
        // Never empty: peer_pool falls back to the default pool.
        let pool = peer_pool(mood, context);
        let seed = &pool[self.rng.gen_range(0..pool.len())];
        EchoEntry {
            id: format!("peer-{}", uuid::Uuid::new_v4()),
            content: seed.content.to_string(),
            nickname: seed.nickname.to_string(),
            hugs: self.rng.gen_range(3..40),
            is_liked: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Drive a fresh flow to the Reply step with the fallback AI result.
    fn flow_at_reply() -> TreeholeFlow {
        let mut f = TreeholeFlow::with_seed(1);
        f.reset_session();
        f.select_mood(0, "想静静").unwrap();
        f.tick(MOOD_SETTLE_MS);
        let req = f.select_context("家庭").unwrap();
        f.apply_reply(req.epoch, TreeholeReply::fallback()).unwrap();
        f
    }

    #[test]
    fn mood_settle_gates_context_step() {
        let mut f = TreeholeFlow::with_seed(1);
        f.reset_session();
        f.select_mood(1_000, "开心");
        assert!(f.select_context("工作").is_none(), "still settling");
        f.tick(1_000 + MOOD_SETTLE_MS - 1);
        assert!(f.select_context("工作").is_none());
        f.tick(1_000 + MOOD_SETTLE_MS);
        assert!(f.select_context("工作").is_some());
    }

    #[test]
    fn ai_result_is_written_at_most_once() {
        let mut f = flow_at_reply();
        let first = f.session().ai_result.clone();
        let second = TreeholeReply {
            reply: "other".into(),
            story: "other".into(),
            nickname: "other".into(),
        };
        assert!(f.apply_reply(f.epoch(), second).is_none());
        assert_eq!(f.session().ai_result, first);
    }

    #[test]
    fn stale_reply_is_discarded_after_reset() {
        let mut f = TreeholeFlow::with_seed(1);
        f.reset_session();
        f.select_mood(0, "想静静");
        f.tick(MOOD_SETTLE_MS);
        let req = f.select_context("家庭").unwrap();

        f.reset_session();
        let ev = f.apply_reply(req.epoch, TreeholeReply::fallback());
        assert!(matches!(ev, Some(Event::StaleResultDiscarded { .. })));
        assert!(f.session().ai_result.is_none());
        assert_eq!(f.step(), FlowStep::MoodSelect);
    }

    #[test]
    fn rejected_validation_mutates_nothing() {
        let mut f = flow_at_reply();
        let req = f.submit_healing("某些被拒绝的话").unwrap();
        let ev = f.apply_validation(10_000, req.epoch, &req.text, false);
        assert!(matches!(ev, Some(Event::HealingRejected { .. })));
        assert!(f.echoes().is_empty());
        assert!(f.visited().is_empty());
        assert_eq!(f.step(), FlowStep::Reply);
        assert!(f.session().healing_text.is_empty());
    }

    #[test]
    fn accepted_healing_adds_my_entry_and_schedules_match() {
        let mut f = flow_at_reply();
        let req = f.submit_healing("今天很好").unwrap();
        f.apply_validation(10_000, req.epoch, &req.text, true)
            .unwrap();

        assert_eq!(f.echoes().len(), 1);
        assert_eq!(f.echoes()[0].id, MY_ECHO_ID);
        assert_eq!(f.echoes()[0].content, "今天很好");
        assert!(f.visited().contains(MY_ECHO_ID));
        assert_eq!(
            f.step(),
            FlowStep::Matching {
                reveal_at: 10_000 + MATCH_SEARCH_MS
            }
        );

        let events = f.tick(10_000 + MATCH_SEARCH_MS);
        assert!(matches!(events[0], Event::EchoMatched { .. }));
        assert_eq!(f.echoes().len(), 2);
        assert_eq!(f.step(), FlowStep::PeerEcho);
    }

    #[test]
    fn empty_healing_text_is_not_submitted() {
        let f = flow_at_reply();
        assert!(f.submit_healing("   ").is_none());
    }

    #[test]
    fn hug_overlay_then_fly_away_then_departure() {
        let mut f = flow_at_reply();
        let req = f.submit_healing("今天很好").unwrap();
        f.apply_validation(0, req.epoch, &req.text, true);
        f.tick(MATCH_SEARCH_MS);
        let peer_id = f.echoes()[1].id.clone();

        let ev = f.give_hug(5_000, &peer_id).unwrap();
        assert!(matches!(ev, Event::HugGiven { .. }));
        assert!(f.visited().contains(&peer_id));

        assert!(f.tick(5_000 + HUG_OVERLAY_MS - 1).is_empty());
        f.tick(5_000 + HUG_OVERLAY_MS);
        assert!(matches!(f.step(), FlowStep::FlyAway { .. }));

        let events = f.tick(5_000 + HUG_OVERLAY_MS + FLY_AWAY_MS);
        assert!(matches!(events[0], Event::JourneyDeparted { .. }));
        assert_eq!(f.step(), FlowStep::Finished);
    }

    #[test]
    fn waterfall_hug_marks_visited_without_overlay() {
        let mut f = flow_at_reply();
        let req = f.submit_healing("今天很好").unwrap();
        f.apply_validation(0, req.epoch, &req.text, true);

        let before = f.step();
        f.hug_entry(MY_ECHO_ID).unwrap();
        assert_eq!(f.step(), before, "no overlay/fly-away for waterfall hugs");
        assert_eq!(f.echoes()[0].hugs, 1);
        assert!(f.echoes()[0].is_liked);
    }

    #[test]
    fn skip_share_ends_the_session() {
        let mut f = flow_at_reply();
        f.skip_share();
        assert_eq!(f.step(), FlowStep::Finished);
        assert!(f.visited().is_empty());
    }

    #[test]
    fn reset_clears_every_session_field() {
        let mut f = flow_at_reply();
        let req = f.submit_healing("今天很好").unwrap();
        f.apply_validation(0, req.epoch, &req.text, true);
        f.tick(MATCH_SEARCH_MS);

        let epoch_before = f.epoch();
        f.reset_session();
        assert_eq!(f.epoch(), epoch_before + 1);
        assert_eq!(f.session().selected_mood, None);
        assert_eq!(f.session().selected_context, None);
        assert!(f.session().ai_result.is_none());
        assert!(f.session().healing_text.is_empty());
        assert!(f.session().my_medicine_entry.is_none());
        assert!(f.echoes().is_empty());
        assert!(f.visited().is_empty());
        assert_eq!(f.step(), FlowStep::MoodSelect);
    }
}
