use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Attendance for a single class meeting. Stored with the one-letter codes `H` (hadir), `S`
/// (sakit) and `A` (alpa).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AttendanceStatus {
    #[serde(rename = "H", alias = "present", alias = "hadir")]
    Present,
    #[serde(rename = "S", alias = "sick", alias = "sakit")]
    Sick,
    #[serde(rename = "A", alias = "absent", alias = "alpa")]
    Absent,
}

serde_plain::derive_display_from_serialize!(AttendanceStatus);
serde_plain::derive_fromstr_from_deserialize!(AttendanceStatus);

impl AttendanceStatus {
    pub fn label(self) -> &'static str {
        match self {
            AttendanceStatus::Present => "Present",
            AttendanceStatus::Sick => "Sick",
            AttendanceStatus::Absent => "Absent",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttendanceDraft {
    pub schedule_id: String,
    pub date: NaiveDate,
    pub status: AttendanceStatus,
}

impl AttendanceDraft {
    pub fn new(schedule_id: impl Into<String>, date: NaiveDate, status: AttendanceStatus) -> Self {
        Self {
            schedule_id: schedule_id.into(),
            date,
            status,
        }
    }
}

/// A stored attendance record, joined with the name of its course.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttendanceEntry {
    pub(crate) id: String,
    pub(crate) owner: String,
    #[serde(flatten)]
    pub(crate) fields: AttendanceDraft,
    pub(crate) course: String,
    pub(crate) created_at: DateTime<Utc>,
}

impl AttendanceEntry {
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn course(&self) -> &str {
        &self.course
    }

    pub fn date(&self) -> NaiveDate {
        self.fields.date
    }

    pub fn status(&self) -> AttendanceStatus {
        self.fields.status
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_status_codes() {
        assert_eq!(AttendanceStatus::from_str("H").unwrap(), AttendanceStatus::Present);
        assert_eq!(AttendanceStatus::from_str("sakit").unwrap(), AttendanceStatus::Sick);
        assert_eq!(AttendanceStatus::from_str("absent").unwrap(), AttendanceStatus::Absent);
        assert_eq!(AttendanceStatus::Absent.to_string(), "A");
        assert!(AttendanceStatus::from_str("X").is_err());
    }
}
