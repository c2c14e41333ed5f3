//! User directory.

use std::collections::BTreeMap;
use std::sync::Arc;

use super::error::{SyncError, SyncResult};
use crate::fixtures;
use crate::models::User;
use crate::store::{DocumentStore, USERS};

/// User the directory acts as when none is configured.
pub const DEFAULT_CURRENT_USER: &str = "mr_b";

/// Local copy of the `users` collection plus the acting user.
pub struct UserDirectory<S> {
    store: Arc<S>,
    all: BTreeMap<String, User>,
    current_user: String,
}

impl<S: DocumentStore> UserDirectory<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self {
            store,
            all: BTreeMap::new(),
            current_user: DEFAULT_CURRENT_USER.to_string(),
        }
    }

    pub fn with_current_user(mut self, user_id: impl Into<String>) -> Self {
        self.current_user = user_id.into();
        self
    }

    /// Reads the `users` collection and replaces the local map with it.
    ///
    /// Malformed user documents are skipped. On a failed read the local map
    /// is left as it was. Returns the number of users read.
    pub async fn load(&mut self) -> SyncResult<usize> {
        let docs = self.store.collection(USERS).get().await.map_err(|e| {
            tracing::warn!("Failed to load users: {}", e);
            SyncError::read(USERS, e)
        })?;

        let mut all = BTreeMap::new();
        for doc in docs {
            match doc.decode::<User>() {
                Ok(mut user) => {
                    user.id = doc.id().to_string();
                    all.insert(user.id.clone(), user);
                }
                Err(e) => tracing::warn!("Skipping user {}: {}", doc.id(), e),
            }
        }

        self.all = all;
        tracing::info!("Loaded {} user(s)", self.all.len());
        Ok(self.all.len())
    }

    /// Writes the sample users `mr_a`, `mr_b` and `mr_c`.
    pub async fn seed(&self) -> SyncResult<()> {
        fixtures::seed_users(self.store.as_ref()).await
    }

    pub fn get(&self, id: &str) -> Option<&User> {
        self.all.get(id)
    }

    /// Users ordered by id.
    pub fn iter(&self) -> impl Iterator<Item = &User> {
        self.all.values()
    }

    pub fn len(&self) -> usize {
        self.all.len()
    }

    pub fn is_empty(&self) -> bool {
        self.all.is_empty()
    }

    pub fn current_user(&self) -> &str {
        &self.current_user
    }

    /// Full name of a user, or the raw id if the user isn't known.
    pub fn display_name(&self, id: &str) -> String {
        self.get(id)
            .map(User::full_name)
            .unwrap_or_else(|| id.to_string())
    }
}
