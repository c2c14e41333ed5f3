//! Local conversation state and the mutations that change it.

use std::collections::{HashMap, HashSet};

use super::error::{SyncError, SyncResult};
use crate::message_id::MessageId;
use crate::models::{Conversation, Message};

/// A named change to [`ConversationState`].
#[derive(Debug, Clone)]
pub enum Mutation {
    /// Registers a conversation. Its `messages` are ignored; messages only
    /// enter local state through `AddMessage`.
    SetConversation(Conversation),
    /// Appends a message unless its id has been applied before.
    AddMessage {
        conversation_id: String,
        message: Message,
    },
}

/// Emitted for every mutation that changed state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StateEvent {
    ConversationAdded(String),
    MessageAdded {
        conversation_id: String,
        message_id: MessageId,
    },
}

/// The local cache of remote conversations.
///
/// - `all` maps conversation id to its local copy
/// - `all_ids` is load order; an id appears at most once
/// - `applied` holds every message id applied so far, across all
///   conversations; only `reset` clears it
#[derive(Debug, Clone, Default)]
pub struct ConversationState {
    all: HashMap<String, Conversation>,
    all_ids: Vec<String>,
    applied: HashSet<MessageId>,
}

impl ConversationState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Applies a mutation. Returns the resulting event, or `None` if the
    /// mutation was a no-op.
    pub fn commit(&mut self, mutation: Mutation) -> SyncResult<Option<StateEvent>> {
        match mutation {
            Mutation::SetConversation(conversation) => Ok(self.set_conversation(conversation)),
            Mutation::AddMessage {
                conversation_id,
                message,
            } => self.add_message(conversation_id, message),
        }
    }

    fn set_conversation(&mut self, mut conversation: Conversation) -> Option<StateEvent> {
        // Known conversations keep their messages
        if self.all.contains_key(&conversation.id) {
            return None;
        }

        conversation.messages.clear();
        let id = conversation.id.clone();
        self.all.insert(id.clone(), conversation);
        self.all_ids.push(id.clone());
        Some(StateEvent::ConversationAdded(id))
    }

    fn add_message(
        &mut self,
        conversation_id: String,
        message: Message,
    ) -> SyncResult<Option<StateEvent>> {
        let conversation = self
            .all
            .get_mut(&conversation_id)
            .ok_or_else(|| SyncError::UnknownConversation(conversation_id.clone()))?;

        if message.conversation_id != conversation_id {
            return Err(SyncError::ConversationMismatch {
                message_id: message.id,
                expected: conversation_id,
                actual: message.conversation_id,
            });
        }

        if !self.applied.insert(message.id.clone()) {
            return Ok(None);
        }

        let message_id = message.id.clone();
        conversation.messages.push(message);
        Ok(Some(StateEvent::MessageAdded {
            conversation_id,
            message_id,
        }))
    }

    pub fn get(&self, id: &str) -> Option<&Conversation> {
        self.all.get(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.all.contains_key(id)
    }

    /// Conversation ids in load order.
    pub fn ids(&self) -> &[String] {
        &self.all_ids
    }

    /// Conversations in load order.
    pub fn iter(&self) -> impl Iterator<Item = &Conversation> {
        self.all_ids.iter().filter_map(|id| self.all.get(id))
    }

    pub fn len(&self) -> usize {
        self.all_ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.all_ids.is_empty()
    }

    /// Returns true if a message with this id has been applied.
    pub fn is_applied(&self, id: &MessageId) -> bool {
        self.applied.contains(id)
    }

    pub fn applied_count(&self) -> usize {
        self.applied.len()
    }

    /// Drops all local state, including the applied-id set.
    pub fn reset(&mut self) {
        self.all.clear();
        self.all_ids.clear();
        self.applied.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state_with(id: &str) -> ConversationState {
        let mut state = ConversationState::new();
        state
            .commit(Mutation::SetConversation(
                Conversation::new(["mr_a", "mr_b"], 0).with_id(id),
            ))
            .unwrap();
        state
    }

    fn add(state: &mut ConversationState, message: &Message) -> Option<StateEvent> {
        state
            .commit(Mutation::AddMessage {
                conversation_id: message.conversation_id.clone(),
                message: message.clone(),
            })
            .unwrap()
    }

    #[test]
    fn test_set_conversation_registers_once() {
        let mut state = state_with("c1");
        let again = state
            .commit(Mutation::SetConversation(
                Conversation::new(["mr_a", "mr_b"], 0).with_id("c1"),
            ))
            .unwrap();

        assert!(again.is_none());
        assert_eq!(state.ids(), &["c1".to_string()]);
        assert_eq!(state.len(), 1);
    }

    #[test]
    fn test_set_conversation_drops_embedded_messages() {
        let mut state = ConversationState::new();
        let mut convo = Conversation::new(["mr_a"], 0).with_id("c1");
        convo.messages.push(Message::new("c1", "mr_a", "hi", 0));
        state.commit(Mutation::SetConversation(convo)).unwrap();

        assert!(state.get("c1").unwrap().messages.is_empty());
        assert_eq!(state.applied_count(), 0);
    }

    #[test]
    fn test_add_message_is_idempotent_by_id() {
        let mut state = state_with("c1");
        let msg = Message::new("c1", "mr_a", "hi", 0);

        assert!(add(&mut state, &msg).is_some());
        assert!(add(&mut state, &msg).is_none());
        assert!(add(&mut state, &msg).is_none());

        let messages = &state.get("c1").unwrap().messages;
        assert_eq!(messages.len(), 1);
        assert!(state.is_applied(&msg.id));
    }

    #[test]
    fn test_add_message_preserves_order() {
        let mut state = state_with("c1");
        let a = Message::new("c1", "mr_a", "A", 1);
        let b = Message::new("c1", "mr_b", "B", 2);
        let c = Message::new("c1", "mr_a", "C", 3);
        for msg in [&a, &b, &c] {
            add(&mut state, msg);
        }

        let texts: Vec<&str> = state
            .get("c1")
            .unwrap()
            .messages
            .iter()
            .map(|m| m.text.as_str())
            .collect();
        assert_eq!(texts, vec!["A", "B", "C"]);
    }

    #[test]
    fn test_add_message_unknown_conversation() {
        let mut state = ConversationState::new();
        let msg = Message::new("nope", "mr_a", "hi", 0);
        let result = state.commit(Mutation::AddMessage {
            conversation_id: "nope".to_string(),
            message: msg.clone(),
        });

        assert!(matches!(result, Err(SyncError::UnknownConversation(id)) if id == "nope"));
        assert!(!state.is_applied(&msg.id));
    }

    #[test]
    fn test_add_message_conversation_mismatch() {
        let mut state = state_with("c1");
        let msg = Message::new("c2", "mr_a", "hi", 0);
        let result = state.commit(Mutation::AddMessage {
            conversation_id: "c1".to_string(),
            message: msg.clone(),
        });

        assert!(matches!(result, Err(SyncError::ConversationMismatch { .. })));
        assert!(!state.is_applied(&msg.id));
    }

    #[test]
    fn test_iter_follows_load_order() {
        let mut state = ConversationState::new();
        for id in ["z", "a", "m"] {
            state
                .commit(Mutation::SetConversation(Conversation::new(["u"], 0).with_id(id)))
                .unwrap();
        }
        let ids: Vec<&str> = state.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, vec!["z", "a", "m"]);
    }

    #[test]
    fn test_reset() {
        let mut state = state_with("c1");
        let msg = Message::new("c1", "mr_a", "hi", 0);
        add(&mut state, &msg);

        state.reset();
        assert!(state.is_empty());
        assert!(!state.is_applied(&msg.id));
    }
}
