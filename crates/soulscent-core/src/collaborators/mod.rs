//! External service boundaries.
//!
//! Every collaborator absorbs its own failures: the AI reply provider and
//! the daily-sign provider resolve to fixed fallback content on any
//! transport or parse error, and the content validator fails open. Callers
//! never special-case a collaborator fault.

pub mod reply;
pub mod sign;
pub mod traits;
pub mod validate;

pub use reply::HttpReplyProvider;
pub use sign::HttpSignProvider;
pub use traits::{ContentValidator, ReplyProvider, SignProvider, TimeOfDay, TreeholeReply};
pub use validate::HttpContentValidator;
