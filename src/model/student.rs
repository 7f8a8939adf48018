use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A student account. Students are identified by their NIM (student number) and name; there is
/// no password.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Student {
    pub(crate) id: String,
    pub(crate) nim: String,
    pub(crate) name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) program: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) semester: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) role: Option<String>,
    pub(crate) created_at: DateTime<Utc>,
    pub(crate) updated_at: DateTime<Utc>,
}

impl Student {
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn nim(&self) -> &str {
        &self.nim
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Study program, e.g. "Informatika".
    pub fn program(&self) -> Option<&str> {
        self.program.as_deref()
    }

    pub fn semester(&self) -> Option<u32> {
        self.semester
    }

    pub fn role(&self) -> Option<&str> {
        self.role.as_deref()
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }
}
