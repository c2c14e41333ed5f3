//! Synchronization between the local conversation cache and the document store.
//!
//! ## Flow
//!
//! 1. `ConversationSync::load` reads the `conversations` collection and
//!    registers conversations that are not yet known locally
//! 2. `ConversationSync::append_message` writes a new message to the store
//!    with an atomic list append; local state is not touched
//! 3. Incoming messages (pushed by a live-update source, or pulled with
//!    `ConversationSync::refresh`) go through
//!    `ConversationSync::apply_incoming_message`, which applies each message
//!    id at most once for the lifetime of the process

mod conversations;
mod error;
mod options;
mod state;
mod users;

pub use conversations::ConversationSync;
pub(crate) use conversations::MESSAGES_FIELD;
pub use error::{SyncError, SyncResult};
pub use options::{Hydration, HydrationParseError, SyncOptions};
pub use state::{ConversationState, Mutation, StateEvent};
pub use users::{UserDirectory, DEFAULT_CURRENT_USER};
