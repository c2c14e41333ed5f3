use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::message_id::MessageId;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    pub id: MessageId,
    pub conversation_id: String,
    pub sender: String,
    pub text: String,
    pub created: i64, // epoch millis
}

impl Message {
    /// Creates a message with a freshly generated id.
    pub fn new(
        conversation_id: impl Into<String>,
        sender: impl Into<String>,
        text: impl Into<String>,
        created: i64,
    ) -> Self {
        Self {
            id: MessageId::new(),
            conversation_id: conversation_id.into(),
            sender: sender.into(),
            text: text.into(),
            created,
        }
    }
}

impl fmt::Display for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match DateTime::<Utc>::from_timestamp_millis(self.created) {
            Some(at) => write!(
                f,
                "[{}] {}: {}",
                at.format("%Y-%m-%d %H:%M"),
                self.sender,
                self.text
            ),
            None => write!(f, "{}: {}", self.sender, self.text),
        }
    }
}
