//! Chatsync Core Library
//!
//! Conversation models, the document store abstraction and the logic that
//! keeps a local conversation cache in step with a remote document store.

pub mod fixtures;
pub mod message_id;
pub mod models;
pub mod store;
pub mod sync;

pub use message_id::{MessageId, MessageIdError};
pub use models::{now_millis, Conversation, Message, User};
pub use store::{
    to_fields, Collection, Document, DocumentRef, DocumentStore, Fields, MemoryStore, StoreError,
    StoreResult, CONVERSATIONS, USERS,
};
pub use sync::{
    ConversationState, ConversationSync, Hydration, HydrationParseError, Mutation, StateEvent,
    SyncError, SyncOptions, SyncResult, UserDirectory, DEFAULT_CURRENT_USER,
};

pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
