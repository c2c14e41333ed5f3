use serde::{Deserialize, Serialize};

/// A chat participant. Conversations and messages refer to users by `id` only.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// Document id (e.g. a handle). Not part of the stored body.
    #[serde(skip)]
    pub id: String,
    pub first_name: String,
    pub last_name: String,
}

impl User {
    pub fn new(
        id: impl Into<String>,
        first_name: impl Into<String>,
        last_name: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            first_name: first_name.into(),
            last_name: last_name.into(),
        }
    }

    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
            .trim()
            .to_string()
    }
}
