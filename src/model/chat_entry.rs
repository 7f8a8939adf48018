use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatDraft {
    pub message: String,
    pub response: String,
}

/// One question and the assistant's answer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatEntry {
    pub(crate) id: String,
    pub(crate) owner: String,
    #[serde(flatten)]
    pub(crate) fields: ChatDraft,
    pub(crate) created_at: DateTime<Utc>,
}

impl ChatEntry {
    pub fn message(&self) -> &str {
        &self.fields.message
    }

    pub fn response(&self) -> &str {
        &self.fields.response
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}
