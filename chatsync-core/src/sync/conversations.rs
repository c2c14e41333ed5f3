//! Conversation synchronization.

use std::collections::BTreeSet;
use std::sync::Arc;

use serde::Deserialize;
use serde_json::Value;
use tokio::sync::broadcast;

use super::error::{SyncError, SyncResult};
use super::options::SyncOptions;
use super::state::{ConversationState, Mutation, StateEvent};
use crate::fixtures;
use crate::models::{now_millis, Conversation, Message};
use crate::store::{Document, DocumentStore, StoreError, CONVERSATIONS};

/// Field of a conversation document holding its message list.
pub(crate) const MESSAGES_FIELD: &str = "messages";

/// Buffered state events per subscriber before the oldest are dropped.
const EVENT_CAPACITY: usize = 256;

/// Stored shape of a conversation. Messages stay raw so one malformed entry
/// doesn't hide the rest.
#[derive(Debug, Deserialize)]
struct ConversationDocument {
    users: BTreeSet<String>,
    created: i64,
    #[serde(default)]
    messages: Vec<Value>,
}

/// Owns local conversation state and keeps it in step with a [`DocumentStore`].
///
/// Local mutations take `&mut self`; they run on the caller's task and need no
/// locking. Sending only reads local state, so several sends can be in flight
/// at once.
pub struct ConversationSync<S> {
    store: Arc<S>,
    options: SyncOptions,
    state: ConversationState,
    events: broadcast::Sender<StateEvent>,
}

impl<S: DocumentStore> ConversationSync<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self::with_options(store, SyncOptions::default())
    }

    pub fn with_options(store: Arc<S>, options: SyncOptions) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            store,
            options,
            state: ConversationState::new(),
            events,
        }
    }

    pub fn state(&self) -> &ConversationState {
        &self.state
    }

    pub fn conversation(&self, id: &str) -> Option<&Conversation> {
        self.state.get(id)
    }

    /// Subscribes to state changes. Only effective mutations are published.
    pub fn subscribe(&self) -> broadcast::Receiver<StateEvent> {
        self.events.subscribe()
    }

    /// Applies a mutation to local state and publishes the resulting event.
    pub fn commit(&mut self, mutation: Mutation) -> SyncResult<Option<StateEvent>> {
        let event = self.state.commit(mutation)?;
        if let Some(event) = &event {
            // No subscribers is fine
            let _ = self.events.send(event.clone());
        }
        Ok(event)
    }

    /// Clears local state, including the applied message ids.
    pub fn reset(&mut self) {
        self.state.reset();
    }

    /// Reads every conversation from the store and registers the ones not
    /// yet known locally.
    ///
    /// Already-registered conversations keep their local messages. Depending
    /// on [`SyncOptions::hydration`], stored messages are then applied through
    /// the same deduplication as incoming ones.
    ///
    /// Returns the number of newly registered conversations.
    pub async fn load(&mut self) -> SyncResult<usize> {
        let docs = self
            .store
            .collection(CONVERSATIONS)
            .get()
            .await
            .map_err(|e| {
                tracing::warn!("Failed to load conversations: {}", e);
                SyncError::read(CONVERSATIONS, e)
            })?;

        let total = docs.len();
        let mut registered = 0;
        let mut hydrated = 0;

        for doc in &docs {
            let (conversation, stored) = match decode_conversation(doc) {
                Ok(decoded) => decoded,
                Err(e) => {
                    tracing::warn!("Skipping conversation: {}", e);
                    continue;
                }
            };

            let id = conversation.id.clone();
            if self
                .commit(Mutation::SetConversation(conversation))?
                .is_some()
            {
                registered += 1;
            }

            let decoded = decode_messages(&id, &stored);
            let selected = self.options.hydration.select(&decoded);
            hydrated += self.apply_messages(&id, selected).len();
        }

        tracing::info!(
            "Loaded {} conversation(s), {} new, {} message(s) hydrated",
            total,
            registered,
            hydrated
        );
        Ok(registered)
    }

    /// Sends a message to a loaded conversation.
    ///
    /// The message gets a fresh id and is appended to the stored message list
    /// with a single atomic append, so concurrent senders never overwrite each
    /// other. Local state is not changed; the message shows up locally once it
    /// comes back through [`apply_incoming_message`](Self::apply_incoming_message)
    /// or [`refresh`](Self::refresh).
    pub async fn append_message(
        &self,
        conversation_id: &str,
        sender: &str,
        text: &str,
        created: i64,
    ) -> SyncResult<Message> {
        if !self.state.contains(conversation_id) {
            return Err(SyncError::UnknownConversation(conversation_id.to_string()));
        }

        let message = Message::new(conversation_id, sender, text, created);
        let value = serde_json::to_value(&message)
            .map_err(|e| SyncError::write(CONVERSATIONS, StoreError::from(e)))?;

        self.store
            .collection(CONVERSATIONS)
            .doc(conversation_id)
            .append(MESSAGES_FIELD, value)
            .await
            .map_err(|e| {
                tracing::warn!("Failed to send message to {}: {}", conversation_id, e);
                SyncError::write(CONVERSATIONS, e)
            })?;

        tracing::debug!(
            message_id = %message.id,
            conversation_id,
            "Message sent"
        );
        Ok(message)
    }

    /// Sends a message stamped with the current time.
    pub async fn send(&self, conversation_id: &str, sender: &str, text: &str) -> SyncResult<Message> {
        self.append_message(conversation_id, sender, text, now_millis())
            .await
    }

    /// Applies a message delivered for `conversation_id`.
    ///
    /// Each message id is applied at most once for the lifetime of this
    /// state, however often it is delivered. Returns `true` if the message
    /// was appended, `false` if its id had already been applied.
    pub fn apply_incoming_message(
        &mut self,
        conversation_id: &str,
        message: Message,
    ) -> SyncResult<bool> {
        let event = self.commit(Mutation::AddMessage {
            conversation_id: conversation_id.to_string(),
            message,
        })?;
        Ok(event.is_some())
    }

    /// Re-reads one conversation from the store and applies every stored
    /// message. Returns the messages that were new locally, in stored order.
    pub async fn refresh(&mut self, conversation_id: &str) -> SyncResult<Vec<Message>> {
        if !self.state.contains(conversation_id) {
            return Err(SyncError::UnknownConversation(conversation_id.to_string()));
        }

        let doc = self
            .store
            .collection(CONVERSATIONS)
            .doc(conversation_id)
            .get()
            .await
            .map_err(|e| {
                tracing::warn!("Failed to refresh conversation {}: {}", conversation_id, e);
                SyncError::read(CONVERSATIONS, e)
            })?
            .ok_or_else(|| {
                SyncError::read(
                    CONVERSATIONS,
                    StoreError::not_found(CONVERSATIONS, conversation_id),
                )
            })?;

        let (_, stored) = decode_conversation(&doc)?;
        let decoded = decode_messages(conversation_id, &stored);
        Ok(self.apply_messages(conversation_id, &decoded))
    }

    /// Creates the two sample conversations. Returns their ids.
    pub async fn seed_fixtures(&self) -> SyncResult<Vec<String>> {
        fixtures::seed_conversations(self.store.as_ref(), now_millis()).await
    }

    fn apply_messages(&mut self, conversation_id: &str, messages: &[Message]) -> Vec<Message> {
        let mut applied = Vec::new();

        for message in messages {
            match self.apply_incoming_message(conversation_id, message.clone()) {
                Ok(true) => applied.push(message.clone()),
                Ok(false) => {}
                Err(e) => tracing::warn!("Skipping stored message: {}", e),
            }
        }

        applied
    }
}

/// Decodes a stored message list, skipping entries that aren't valid messages.
fn decode_messages(conversation_id: &str, stored: &[Value]) -> Vec<Message> {
    stored
        .iter()
        .filter_map(|value| match serde_json::from_value::<Message>(value.clone()) {
            Ok(message) => Some(message),
            Err(e) => {
                tracing::warn!(
                    "Skipping malformed message in conversation {}: {}",
                    conversation_id,
                    e
                );
                None
            }
        })
        .collect()
}

fn decode_conversation(doc: &Document) -> SyncResult<(Conversation, Vec<Value>)> {
    let body: ConversationDocument = doc.decode().map_err(|e| SyncError::Decode {
        collection: CONVERSATIONS.to_string(),
        id: doc.id().to_string(),
        source: e,
    })?;

    let conversation = Conversation::new(body.users, body.created).with_id(doc.id());
    Ok((conversation, body.messages))
}
