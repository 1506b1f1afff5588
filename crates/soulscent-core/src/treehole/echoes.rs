//! Echo entries, the visited set, and the static peer pools.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Sentinel id for the user's own submission.
pub const MY_ECHO_ID: &str = "my-new";
/// Nickname shown on the user's own entry.
pub(crate) const MY_NICKNAME: &str = "我";

/// Pool used when no exact (mood, context) pool exists; also registered
/// under its own key ("想静静", "家庭").
const FALLBACK_POOL: &[EchoSeed] = &[
    EchoSeed {
        content: "饭桌上谁都没说话，我把想说的都咽了回去。后来我学着先抱抱自己。",
        nickname: "檐下人",
    },
    EchoSeed {
        content: "家人不懂没关系，你已经很努力地在表达了。",
        nickname: "晚风",
    },
    EchoSeed {
        content: "我也在一个热闹的家里感到孤单过。安静不是错。",
        nickname: "青苔",
    },
];

/// One card in the echo waterfall.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EchoEntry {
    pub id: String,
    pub content: String,
    pub nickname: String,
    pub hugs: u32,
    pub is_liked: bool,
}

/// The "medicine" the user wrote for themselves, kept with its date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MedicineEntry {
    pub content: String,
    pub date: NaiveDate,
}

/// Ids of cards that have been lit up by an explicit action (hug or
/// self-submission). Append-only for the duration of a session; never
/// mutated by scrolling or other passive observation.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VisitedSet(Vec<String>);

impl VisitedSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert an id; duplicates are ignored.
    pub fn insert(&mut self, id: &str) {
        if !self.contains(id) {
            self.0.push(id.to_string());
        }
    }

    pub fn contains(&self, id: &str) -> bool {
        self.0.iter().any(|v| v == id)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    pub fn clear(&mut self) {
        self.0.clear();
    }
}

pub(crate) struct EchoSeed {
    pub content: &'static str,
    pub nickname: &'static str,
}

/// Static peer echoes keyed by (mood, context). Matched locally; peer
/// content is not fetched.
const POOLS: &[((&str, &str), &[EchoSeed])] = &[
    (("想静静", "家庭"), FALLBACK_POOL),
    (
        ("想静静", "工作"),
        &[
            EchoSeed {
                content: "下班路上绕了远路，只为多走十分钟不用说话的路。",
                nickname: "路灯",
            },
            EchoSeed {
                content: "会议室里的声音太多了，愿你今晚有一个完整的安静。",
                nickname: "白噪",
            },
        ],
    ),
    (
        ("有点丧", "感情"),
        &[
            EchoSeed {
                content: "难过的时候不用急着好起来。我陪你丧一会儿。",
                nickname: "月亮替班",
            },
            EchoSeed {
                content: "你值得被认真对待，包括被你自己。",
                nickname: "拾光",
            },
        ],
    ),
    (
        ("焦虑", "自己"),
        &[
            EchoSeed {
                content: "焦虑是心里着急想把一切都做好。可以慢一点，真的可以。",
                nickname: "慢递员",
            },
            EchoSeed {
                content: "今晚先睡，明天的事明天再焦虑，这是我学会的第一件温柔。",
                nickname: "守夜鹿",
            },
        ],
    ),
];

/// Look up the peer pool for a mood/context pair, falling back to the
/// default pool when no exact match exists.
pub(crate) fn peer_pool(mood: &str, context: &str) -> &'static [EchoSeed] {
    POOLS
        .iter()
        .find(|((m, c), _)| *m == mood && *c == context)
        .map(|(_, seeds)| *seeds)
        .unwrap_or(FALLBACK_POOL)
}
