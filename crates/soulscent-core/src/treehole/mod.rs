//! Mood journaling ("treehole") flow.

mod echoes;
mod flow;

pub use echoes::{EchoEntry, MedicineEntry, VisitedSet, MY_ECHO_ID};
pub use flow::{
    FlowStep, MoodSession, ReplyRequest, TreeholeFlow, ValidationRequest, FLY_AWAY_MS,
    HUG_OVERLAY_MS, MATCH_SEARCH_MS, MOOD_SETTLE_MS,
};
