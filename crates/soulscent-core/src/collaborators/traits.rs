use serde::{Deserialize, Serialize};

/// Fallback reply shown when the AI collaborator cannot answer.
pub const FALLBACK_REPLY: &str =
    "谢谢你愿意把心事说出来。此刻的感受没有对错，先陪它坐一会儿，风会把剩下的话带走。";
/// Fallback story accompanying the fallback reply.
pub const FALLBACK_STORY: &str =
    "有位朋友也曾在深夜写下同样的心事。后来她说，把话放进树洞的那一刻，肩膀就轻了一点。";
/// Fallback nickname for the reply persona.
pub const FALLBACK_NICKNAME: &str = "林间来信";

/// Fallback daily sign.
pub const FALLBACK_SIGN: &str = "今天也值得被温柔以待。";

/// Structured reply from the AI collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TreeholeReply {
    pub reply: String,
    pub story: String,
    pub nickname: String,
}

impl TreeholeReply {
    /// The fixed triple every provider resolves to on failure. Always
    /// non-empty.
    pub fn fallback() -> Self {
        Self {
            reply: FALLBACK_REPLY.into(),
            story: FALLBACK_STORY.into(),
            nickname: FALLBACK_NICKNAME.into(),
        }
    }

    pub fn is_complete(&self) -> bool {
        !self.reply.is_empty() && !self.story.is_empty() && !self.nickname.is_empty()
    }
}

/// Coarse time-of-day bucket for the daily sign.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeOfDay {
    Morning,
    Afternoon,
    Evening,
}

impl TimeOfDay {
    pub fn as_str(&self) -> &'static str {
        match self {
            TimeOfDay::Morning => "morning",
            TimeOfDay::Afternoon => "afternoon",
            TimeOfDay::Evening => "evening",
        }
    }

    /// Bucket a local hour (0-23).
    pub fn from_hour(hour: u32) -> Self {
        match hour {
            5..=11 => TimeOfDay::Morning,
            12..=17 => TimeOfDay::Afternoon,
            _ => TimeOfDay::Evening,
        }
    }
}

/// Generates the reflective reply for a mood/context pair.
///
/// Infallible by contract: implementations resolve to
/// [`TreeholeReply::fallback`] on any failure rather than surfacing an
/// error.
#[allow(async_fn_in_trait)]
pub trait ReplyProvider {
    async fn treehole_reply(&self, mood: &str, context: &str) -> TreeholeReply;
}

/// Moderates free-text healing submissions before they enter the session.
#[allow(async_fn_in_trait)]
pub trait ContentValidator {
    /// `true` when the text may be accepted.
    async fn validate(&self, text: &str) -> bool;
}

/// Supplies the daily sign line.
#[allow(async_fn_in_trait)]
pub trait SignProvider {
    async fn daily_sign(&self, time_of_day: TimeOfDay) -> String;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fallback_reply_is_complete() {
        assert!(TreeholeReply::fallback().is_complete());
    }

    #[test]
    fn hour_buckets() {
        assert_eq!(TimeOfDay::from_hour(7), TimeOfDay::Morning);
        assert_eq!(TimeOfDay::from_hour(13), TimeOfDay::Afternoon);
        assert_eq!(TimeOfDay::from_hour(22), TimeOfDay::Evening);
        assert_eq!(TimeOfDay::from_hour(2), TimeOfDay::Evening);
    }
}
