use anyhow::bail;
use chrono::{DateTime, NaiveTime, Utc, Weekday};
use serde::{Deserialize, Serialize};

use crate::Result;

/// The user-supplied fields of a course meeting on the weekly schedule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleDraft {
    pub course: String,
    pub day: Weekday,
    pub start: NaiveTime,
    pub end: NaiveTime,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lecturer: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub room: Option<String>,
    /// Credit hours (SKS).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub credits: Option<u32>,
}

impl ScheduleDraft {
    pub fn new(course: impl Into<String>, day: Weekday, start: NaiveTime, end: NaiveTime) -> Self {
        Self {
            course: course.into(),
            day,
            start,
            end,
            lecturer: None,
            room: None,
            credits: None,
        }
    }

    pub fn with_credits(mut self, credits: u32) -> Self {
        self.credits = Some(credits);
        self
    }

    /// Rejects meetings that end before they start and empty course names.
    pub(crate) fn validate(&self) -> Result<()> {
        if self.course.trim().is_empty() {
            bail!("The course name cannot be empty");
        }
        if self.end <= self.start {
            bail!(
                "The class must end after it starts ({} - {})",
                self.start.format("%H:%M"),
                self.end.format("%H:%M")
            );
        }
        Ok(())
    }
}

/// A stored course meeting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleEntry {
    pub(crate) id: String,
    pub(crate) owner: String,
    #[serde(flatten)]
    pub(crate) fields: ScheduleDraft,
    pub(crate) created_at: DateTime<Utc>,
}

impl ScheduleEntry {
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn owner(&self) -> &str {
        &self.owner
    }

    pub fn course(&self) -> &str {
        &self.fields.course
    }

    pub fn credits(&self) -> Option<u32> {
        self.fields.credits
    }

    pub fn fields(&self) -> &ScheduleDraft {
        &self.fields
    }
}
