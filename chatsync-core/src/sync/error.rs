//! Sync error types.

use thiserror::Error;

use crate::message_id::MessageId;
use crate::store::StoreError;

pub type SyncResult<T> = Result<T, SyncError>;

/// Errors that can occur during sync operations.
///
/// Remote failures are terminal for the operation that triggered them and
/// leave local state unchanged. A duplicate message id is not an error.
#[derive(Error, Debug)]
pub enum SyncError {
    #[error("Failed to read '{collection}' from the document store: {source}")]
    RemoteRead {
        collection: String,
        #[source]
        source: StoreError,
    },

    #[error("Failed to write to '{collection}' in the document store: {source}")]
    RemoteWrite {
        collection: String,
        #[source]
        source: StoreError,
    },

    #[error("Conversation not loaded: {0}")]
    UnknownConversation(String),

    #[error("Message {message_id} belongs to conversation {actual}, not {expected}")]
    ConversationMismatch {
        message_id: MessageId,
        expected: String,
        actual: String,
    },

    #[error("Malformed {collection} document {id}: {source}")]
    Decode {
        collection: String,
        id: String,
        #[source]
        source: serde_json::Error,
    },
}

impl SyncError {
    pub(crate) fn read(collection: &str, source: StoreError) -> Self {
        SyncError::RemoteRead {
            collection: collection.to_string(),
            source,
        }
    }

    pub(crate) fn write(collection: &str, source: StoreError) -> Self {
        SyncError::RemoteWrite {
            collection: collection.to_string(),
            source,
        }
    }

    /// Returns true for failures of the remote store, as opposed to misuse of
    /// local state.
    pub fn is_remote(&self) -> bool {
        matches!(
            self,
            SyncError::RemoteRead { .. } | SyncError::RemoteWrite { .. }
        )
    }
}
