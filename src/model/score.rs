use crate::grade::{LetterGrade, ScoreRecord};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The user-supplied fields of a course grade. The final score and letter are never supplied;
/// they are computed from the three scores whenever a grade is saved.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GradeDraft {
    /// The schedule entry (course) this grade belongs to.
    pub schedule_id: String,
    #[serde(flatten)]
    pub scores: ScoreRecord,
    pub semester: u32,
}

impl GradeDraft {
    pub fn new(schedule_id: impl Into<String>, scores: ScoreRecord, semester: u32) -> Self {
        Self {
            schedule_id: schedule_id.into(),
            scores,
            semester,
        }
    }
}

/// A stored grade, joined with the name of its course.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GradeEntry {
    pub(crate) id: String,
    pub(crate) owner: String,
    #[serde(flatten)]
    pub(crate) fields: GradeDraft,
    /// Empty when the course no longer exists.
    pub(crate) course: String,
    pub(crate) final_score: f64,
    pub(crate) letter: LetterGrade,
    pub(crate) created_at: DateTime<Utc>,
}

impl GradeEntry {
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn schedule_id(&self) -> &str {
        &self.fields.schedule_id
    }

    pub fn course(&self) -> &str {
        &self.course
    }

    pub fn scores(&self) -> ScoreRecord {
        self.fields.scores
    }

    pub fn semester(&self) -> u32 {
        self.fields.semester
    }

    pub fn final_score(&self) -> f64 {
        self.final_score
    }

    pub fn letter(&self) -> LetterGrade {
        self.letter
    }
}
