//! The storage-facing interface of the program. Commands read and write entities through
//! [`Repository`] and never build SQL themselves.

use crate::model::{
    AttendanceDraft, AttendanceEntry, ChatDraft, ChatEntry, GradeDraft, GradeEntry, ScheduleDraft,
    ScheduleEntry, Student, Transaction, TransactionDraft,
};
use crate::Result;
use anyhow::bail;
use async_trait::async_trait;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A stored record type. `Draft` holds the fields a caller supplies to create or replace one.
pub trait Entity: Send + Sync + Sized {
    type Draft: Send + Sync;

    /// Human-readable name used in messages, e.g. "transaction".
    const NAME: &'static str;

    fn id(&self) -> &str;

    /// The id of the student the record belongs to.
    fn owner(&self) -> &str;
}

macro_rules! entity {
    ($entity:ty, $draft:ty, $name:literal) => {
        impl Entity for $entity {
            type Draft = $draft;
            const NAME: &'static str = $name;

            fn id(&self) -> &str {
                &self.id
            }

            fn owner(&self) -> &str {
                &self.owner
            }
        }
    };
}

entity!(Transaction, TransactionDraft, "transaction");
entity!(ScheduleEntry, ScheduleDraft, "schedule entry");
entity!(GradeEntry, GradeDraft, "grade");
entity!(AttendanceEntry, AttendanceDraft, "attendance record");
entity!(ChatEntry, ChatDraft, "chat entry");

/// Sort direction over an entity's natural sort column.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

serde_plain::derive_display_from_serialize!(SortOrder);
serde_plain::derive_fromstr_from_deserialize!(SortOrder);

impl SortOrder {
    pub(crate) fn sql(self) -> &'static str {
        match self {
            SortOrder::Asc => "ASC",
            SortOrder::Desc => "DESC",
        }
    }
}

/// Filters for [`Repository::list`]. `from` and `to` are inclusive and only apply to entities
/// that carry a date.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListParams {
    pub owner: String,
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
    pub order: SortOrder,
}

impl ListParams {
    pub fn new(owner: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
            from: None,
            to: None,
            order: SortOrder::Asc,
        }
    }

    pub fn from(mut self, date: Option<NaiveDate>) -> Self {
        self.from = date;
        self
    }

    pub fn to(mut self, date: Option<NaiveDate>) -> Self {
        self.to = date;
        self
    }

    pub fn order(mut self, order: SortOrder) -> Self {
        self.order = order;
        self
    }

    /// Restricts the range to the calendar year `year`, or leaves it open when `None`.
    ///
    /// # Errors
    /// - Returns an error if `year` cannot be represented as a date.
    pub fn year(self, year: Option<i32>) -> Result<Self> {
        let Some(y) = year else {
            return Ok(self);
        };
        match (
            NaiveDate::from_ymd_opt(y, 1, 1),
            NaiveDate::from_ymd_opt(y, 12, 31),
        ) {
            (Some(first), Some(last)) => Ok(self.from(Some(first)).to(Some(last))),
            _ => bail!("The year {y} is out of range"),
        }
    }
}

/// CRUD over one entity type. `update` and `delete` fail when no record has the given id.
#[async_trait]
pub trait Repository<E: Entity> {
    async fn insert(&self, owner: &str, draft: E::Draft) -> Result<E>;

    async fn get(&self, id: &str) -> Result<Option<E>>;

    async fn list(&self, params: &ListParams) -> Result<Vec<E>>;

    async fn update(&self, id: &str, draft: E::Draft) -> Result<E>;

    async fn delete(&self, id: &str) -> Result<()>;
}

/// Student accounts. Students are looked up by NIM; there are no passwords.
#[async_trait]
pub trait StudentStore {
    async fn find_by_nim(&self, nim: &str) -> Result<Option<Student>>;

    async fn insert_student(&self, nim: &str, name: &str) -> Result<Student>;

    async fn rename_student(&self, id: &str, name: &str) -> Result<Student>;
}
