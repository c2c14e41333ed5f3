//! Client-generated message identifiers.
//!
//! Message ids are created on the sending device rather than by the document
//! store, so the same message can be recognised when it is delivered or
//! reloaded more than once.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Errors that can occur when parsing a message ID
#[derive(Error, Debug)]
pub enum MessageIdError {
    #[error("Message ID must not be empty")]
    Empty,
}

/// A globally unique message identifier.
///
/// Freshly generated ids are random UUIDs. Ids read back from the store are
/// kept verbatim, so messages written by other clients keep whatever id
/// format they were created with. Blank ids are rejected on parse and on
/// deserialize alike.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct MessageId(String);

impl MessageId {
    /// Generate a new random message ID
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for MessageId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for MessageId {
    type Err = MessageIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err(MessageIdError::Empty);
        }
        Ok(Self(s.to_string()))
    }
}

impl TryFrom<String> for MessageId {
    type Error = MessageIdError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<MessageId> for String {
    fn from(id: MessageId) -> Self {
        id.0
    }
}
