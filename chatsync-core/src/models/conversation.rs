use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

use super::Message;

/// A participant set plus its ordered message history.
///
/// `messages` is display order. Once a conversation is held locally its
/// messages are only ever appended to.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Conversation {
    /// Store-assigned document id. Not part of the stored body.
    #[serde(skip)]
    pub id: String,
    pub users: BTreeSet<String>,
    pub created: i64, // epoch millis
    #[serde(default)]
    pub messages: Vec<Message>,
}

impl Conversation {
    pub fn new<I, U>(users: I, created: i64) -> Self
    where
        I: IntoIterator<Item = U>,
        U: Into<String>,
    {
        Self {
            id: String::new(),
            users: users.into_iter().map(Into::into).collect(),
            created,
            messages: Vec::new(),
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    pub fn last_message(&self) -> Option<&Message> {
        self.messages.last()
    }

    pub fn has_participant(&self, user_id: &str) -> bool {
        self.users.contains(user_id)
    }
}

impl fmt::Display for Conversation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let users: Vec<&str> = self.users.iter().map(String::as_str).collect();
        writeln!(f, "{} ({})", self.id, users.join(", "))?;

        if self.messages.is_empty() {
            writeln!(f, "  (no messages)")?;
        }
        for message in &self.messages {
            writeln!(f, "  {}", message)?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_conversation_new() {
        let convo = Conversation::new(["mr_b", "mr_a"], 10).with_id("c1");
        assert_eq!(convo.id, "c1");
        assert!(convo.has_participant("mr_a"));
        assert!(!convo.has_participant("mr_c"));
        assert!(convo.messages.is_empty());
        assert!(convo.last_message().is_none());
    }

    #[test]
    fn test_decode_without_messages_field() {
        let convo: Conversation =
            serde_json::from_value(serde_json::json!({ "users": ["mr_a"], "created": 3 }))
                .unwrap();
        assert!(convo.messages.is_empty());
        assert_eq!(convo.created, 3);
    }

    #[test]
    fn test_conversation_display() {
        let mut convo = Conversation::new(["mr_a", "mr_b"], 0).with_id("c1");
        let output = format!("{}", convo);
        assert!(output.contains("c1 (mr_a, mr_b)"));
        assert!(output.contains("(no messages)"));

        convo.messages.push(Message::new("c1", "mr_a", "Hi there", 0));
        let output = format!("{}", convo);
        assert!(output.contains("mr_a: Hi there"));
    }
}
