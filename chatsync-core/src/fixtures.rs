//! Sample users and conversations for a fresh store.

use futures::future::try_join_all;

use crate::models::{Conversation, Message, User};
use crate::store::{to_fields, DocumentStore, StoreError, CONVERSATIONS, USERS};
use crate::sync::{SyncError, SyncResult, MESSAGES_FIELD};

/// Sample users as (id, first name, last name).
pub const FIXTURE_USERS: [(&str, &str, &str); 3] = [
    ("mr_a", "Andy", "Andyson"),
    ("mr_b", "Ben", "Benson"),
    ("mr_c", "Cee", "Ceeson"),
];

/// Writes the sample users. Seeding again overwrites them in place.
pub async fn seed_users<S: DocumentStore>(store: &S) -> SyncResult<()> {
    let users = store.collection(USERS);

    let writes = FIXTURE_USERS.iter().map(|(id, first, last)| {
        let users = &users;
        async move {
            let fields = to_fields(&User::new(*id, *first, *last))?;
            users.doc(*id).set(fields).await
        }
    });

    try_join_all(writes).await.map_err(|e| {
        tracing::warn!("Failed to seed users: {}", e);
        SyncError::write(USERS, e)
    })?;

    tracing::info!("Seeded {} user(s)", FIXTURE_USERS.len());
    Ok(())
}

/// Creates two sample conversations and returns their ids.
///
/// Every call creates new documents. Messages get fresh ids and are appended
/// once their conversation exists.
pub async fn seed_conversations<S: DocumentStore>(store: &S, now: i64) -> SyncResult<Vec<String>> {
    let fixtures: [([&str; 2], &[(&str, &str)]); 2] = [
        (
            ["mr_a", "mr_b"],
            &[("mr_a", "Hi there"), ("mr_b", "Hi to you too!")],
        ),
        (["mr_a", "mr_c"], &[]),
    ];

    let conversations = store.collection(CONVERSATIONS);
    let write_err = |e: StoreError| {
        tracing::warn!("Failed to seed conversations: {}", e);
        SyncError::write(CONVERSATIONS, e)
    };

    let mut ids = Vec::with_capacity(fixtures.len());
    for (users, messages) in fixtures {
        let body = to_fields(&Conversation::new(users, now)).map_err(write_err)?;
        let id = conversations.add(body).await.map_err(write_err)?;

        let doc = conversations.doc(id.clone());
        for (sender, text) in messages {
            let message = Message::new(id.clone(), *sender, *text, now);
            let value = serde_json::to_value(&message).map_err(|e| write_err(e.into()))?;
            doc.append(MESSAGES_FIELD, value).await.map_err(write_err)?;
        }

        ids.push(id);
    }

    tracing::info!("Seeded {} conversation(s)", ids.len());
    Ok(ids)
}
