mod conversation;
mod message;
mod user;

pub use conversation::Conversation;
pub use message::Message;
pub use user::User;

use chrono::Utc;

/// Current time as epoch milliseconds, the timestamp unit used in stored documents.
pub fn now_millis() -> i64 {
    Utc::now().timestamp_millis()
}
