//! Types that represent the core data model, such as `Transaction` and `ScheduleEntry`.
mod amount;
mod attendance;
mod chat_entry;
mod schedule;
mod score;
mod student;
mod transaction;

pub use amount::{Amount, AmountError};
pub use attendance::{AttendanceDraft, AttendanceEntry, AttendanceStatus};
pub use chat_entry::{ChatDraft, ChatEntry};
pub use schedule::{ScheduleDraft, ScheduleEntry};
pub use score::{GradeDraft, GradeEntry};
pub use student::Student;
pub use transaction::{Direction, LedgerEntry, Transaction, TransactionDraft};
