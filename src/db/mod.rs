//! This module is responsible for reading, writing and managing the SQLite database.
//!
//! Dates are stored as `YYYY-MM-DD` text, times of day as `HH:MM`, timestamps as fixed-width
//! RFC 3339 text and amounts as plain decimal strings. Every table is keyed by a UUID.

mod migrations;

use crate::model::{
    Amount, AttendanceDraft, AttendanceEntry, ChatDraft, ChatEntry, GradeDraft, GradeEntry,
    ScheduleDraft, ScheduleEntry, Student, Transaction, TransactionDraft,
};
use crate::grade::ScoreRecord;
use crate::repo::{Entity, ListParams, Repository, StudentStore};
use crate::{utils, Error, Result};
use anyhow::{anyhow, bail, ensure, Context};
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, NaiveTime, Utc, Weekday};
use sqlx::sqlite::{SqliteConnectOptions, SqliteQueryResult, SqliteRow};
use sqlx::{QueryBuilder, Row, Sqlite, SqlitePool};
use std::path::Path;
use std::str::FromStr;
use tracing::{debug, trace};

const DATE_FORMAT: &str = "%Y-%m-%d";
const TIME_FORMAT: &str = "%H:%M";

/// A handle to the campus database.
#[derive(Debug, Clone)]
pub(crate) struct Db {
    pool: SqlitePool,
}

impl Db {
    /// - Validates that there is a SQLite file at `path`
    /// - Opens a connection pool with foreign keys enforced
    /// - Updates the database schema with migrations if it is out-of-date
    pub(crate) async fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        ensure!(
            path.is_file(),
            "The database file is missing '{}'",
            path.display()
        );
        let pool = connect(path, false).await?;

        let version = migrations::version(&pool).await?;
        ensure!(
            version <= migrations::CURRENT_VERSION,
            "The database schema version {version} is newer than this program supports ({})",
            migrations::CURRENT_VERSION
        );
        migrations::run(&pool, version, migrations::CURRENT_VERSION).await?;
        Ok(Self { pool })
    }

    /// - Validates that no file currently exists at `path`
    /// - Creates a new SQLite file at `path`
    /// - Initializes the database schema
    pub(crate) async fn init(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        ensure!(
            !path.exists(),
            "A database already exists at '{}'",
            path.display()
        );
        let pool = connect(path, true).await?;
        migrations::bootstrap(&pool).await?;
        migrations::run(&pool, 0, migrations::CURRENT_VERSION).await?;
        debug!("Created the database at {}", path.display());
        Ok(Self { pool })
    }

    /// The name of a schedule entry, or an error if it does not exist.
    async fn course_name(&self, schedule_id: &str) -> Result<String> {
        let row: Option<(String,)> = sqlx::query_as("SELECT course FROM schedule WHERE id = ?")
            .bind(schedule_id)
            .fetch_optional(&self.pool)
            .await
            .context("Failed to look up the course")?;
        match row {
            Some((course,)) => Ok(course),
            None => Err(not_found::<ScheduleEntry>(schedule_id)),
        }
    }

    async fn student_by_id(&self, id: &str) -> Result<Option<Student>> {
        let row = sqlx::query("SELECT * FROM users WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .context("Failed to query users")?;
        row.as_ref().map(student_from_row).transpose()
    }
}

async fn connect(path: &Path, create: bool) -> Result<SqlitePool> {
    let options = SqliteConnectOptions::new()
        .filename(path)
        .create_if_missing(create)
        .foreign_keys(true);
    SqlitePool::connect_with(options)
        .await
        .with_context(|| format!("Unable to open the SQLite database at '{}'", path.display()))
}

fn not_found<E: Entity>(id: &str) -> Error {
    anyhow!("No {} found with id '{id}'", E::NAME)
}

fn ensure_affected<E: Entity>(result: SqliteQueryResult, id: &str) -> Result<()> {
    if result.rows_affected() == 0 {
        return Err(not_found::<E>(id));
    }
    Ok(())
}

/// Appends inclusive `from`/`to` bounds on `column`, a `YYYY-MM-DD` valued expression.
fn push_date_range(qb: &mut QueryBuilder<'_, Sqlite>, column: &str, params: &ListParams) {
    if let Some(from) = params.from {
        qb.push(format!(" AND {column} >= "));
        qb.push_bind(from.format(DATE_FORMAT).to_string());
    }
    if let Some(to) = params.to {
        qb.push(format!(" AND {column} <= "));
        qb.push_bind(to.format(DATE_FORMAT).to_string());
    }
}

// =============================================================================
// Row decoding
// =============================================================================

fn date(row: &SqliteRow, column: &str) -> Result<NaiveDate> {
    let s: String = row.try_get(column)?;
    NaiveDate::parse_from_str(&s, DATE_FORMAT)
        .with_context(|| format!("Invalid date '{s}' in column '{column}'"))
}

fn time(row: &SqliteRow, column: &str) -> Result<NaiveTime> {
    let s: String = row.try_get(column)?;
    NaiveTime::parse_from_str(&s, TIME_FORMAT)
        .with_context(|| format!("Invalid time '{s}' in column '{column}'"))
}

fn timestamp(row: &SqliteRow, column: &str) -> Result<DateTime<Utc>> {
    let s: String = row.try_get(column)?;
    let t = DateTime::parse_from_rfc3339(&s)
        .with_context(|| format!("Invalid timestamp '{s}' in column '{column}'"))?;
    Ok(t.with_timezone(&Utc))
}

fn parsed<T>(row: &SqliteRow, column: &str) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    let s: String = row.try_get(column)?;
    s.parse::<T>()
        .with_context(|| format!("Invalid value '{s}' in column '{column}'"))
}

fn count(row: &SqliteRow, column: &str) -> Result<Option<u32>> {
    let value: Option<i64> = row.try_get(column)?;
    value
        .map(|v| u32::try_from(v).with_context(|| format!("Invalid count {v} in '{column}'")))
        .transpose()
}

fn weekday(n: i64) -> Result<Weekday> {
    let index = u8::try_from(n - 1).map_err(|_| anyhow!("Invalid day number {n}"))?;
    Weekday::try_from(index).map_err(|_| anyhow!("Invalid day number {n}"))
}

fn student_from_row(row: &SqliteRow) -> Result<Student> {
    Ok(Student {
        id: row.try_get("id")?,
        nim: row.try_get("nim")?,
        name: row.try_get("name")?,
        program: row.try_get("program")?,
        semester: count(row, "semester")?,
        role: row.try_get("role")?,
        created_at: timestamp(row, "created_at")?,
        updated_at: timestamp(row, "updated_at")?,
    })
}

fn transaction_from_row(row: &SqliteRow) -> Result<Transaction> {
    Ok(Transaction {
        id: row.try_get("id")?,
        owner: row.try_get("user_id")?,
        fields: TransactionDraft {
            date: date(row, "date")?,
            category: row.try_get("category")?,
            description: row.try_get("description")?,
            amount: parsed::<Amount>(row, "amount")?,
            direction: parsed(row, "direction")?,
        },
        created_at: timestamp(row, "created_at")?,
    })
}

fn schedule_from_row(row: &SqliteRow) -> Result<ScheduleEntry> {
    Ok(ScheduleEntry {
        id: row.try_get("id")?,
        owner: row.try_get("user_id")?,
        fields: ScheduleDraft {
            course: row.try_get("course")?,
            day: weekday(row.try_get("day")?)?,
            start: time(row, "start_time")?,
            end: time(row, "end_time")?,
            lecturer: row.try_get("lecturer")?,
            room: row.try_get("room")?,
            credits: count(row, "credits")?,
        },
        created_at: timestamp(row, "created_at")?,
    })
}

fn grade_from_row(row: &SqliteRow) -> Result<GradeEntry> {
    Ok(GradeEntry {
        id: row.try_get("id")?,
        owner: row.try_get("user_id")?,
        fields: GradeDraft {
            schedule_id: row.try_get("schedule_id")?,
            scores: ScoreRecord::new(
                row.try_get("task")?,
                row.try_get("midterm")?,
                row.try_get("final_exam")?,
            ),
            semester: count(row, "semester")?.unwrap_or_default(),
        },
        course: row.try_get("course")?,
        final_score: row.try_get("final_score")?,
        letter: parsed(row, "letter")?,
        created_at: timestamp(row, "created_at")?,
    })
}

fn attendance_from_row(row: &SqliteRow) -> Result<AttendanceEntry> {
    Ok(AttendanceEntry {
        id: row.try_get("id")?,
        owner: row.try_get("user_id")?,
        fields: AttendanceDraft {
            schedule_id: row.try_get("schedule_id")?,
            date: date(row, "date")?,
            status: parsed(row, "status")?,
        },
        course: row.try_get("course")?,
        created_at: timestamp(row, "created_at")?,
    })
}

fn chat_from_row(row: &SqliteRow) -> Result<ChatEntry> {
    Ok(ChatEntry {
        id: row.try_get("id")?,
        owner: row.try_get("user_id")?,
        fields: ChatDraft {
            message: row.try_get("message")?,
            response: row.try_get("response")?,
        },
        created_at: timestamp(row, "created_at")?,
    })
}

// =============================================================================
// Students
// =============================================================================

#[async_trait]
impl StudentStore for Db {
    async fn find_by_nim(&self, nim: &str) -> Result<Option<Student>> {
        let row = sqlx::query("SELECT * FROM users WHERE nim = ?")
            .bind(nim)
            .fetch_optional(&self.pool)
            .await
            .context("Failed to query users")?;
        row.as_ref().map(student_from_row).transpose()
    }

    async fn insert_student(&self, nim: &str, name: &str) -> Result<Student> {
        let nim = nim.trim();
        let name = name.trim();
        ensure!(!nim.is_empty(), "The NIM cannot be empty");
        ensure!(!name.is_empty(), "The name cannot be empty");

        let now = utils::now();
        let student = Student {
            id: utils::generate_id(),
            nim: nim.to_string(),
            name: name.to_string(),
            program: None,
            semester: None,
            role: None,
            created_at: now,
            updated_at: now,
        };
        sqlx::query(
            "INSERT INTO users (id, nim, name, created_at, updated_at) VALUES (?, ?, ?, ?, ?)",
        )
        .bind(&student.id)
        .bind(&student.nim)
        .bind(&student.name)
        .bind(utils::timestamp(now))
        .bind(utils::timestamp(now))
        .execute(&self.pool)
        .await
        .with_context(|| format!("Failed to create the student with NIM {nim}"))?;

        debug!("Created student {} ({})", student.name, student.nim);
        Ok(student)
    }

    async fn rename_student(&self, id: &str, name: &str) -> Result<Student> {
        let name = name.trim();
        ensure!(!name.is_empty(), "The name cannot be empty");
        let result = sqlx::query("UPDATE users SET name = ?, updated_at = ? WHERE id = ?")
            .bind(name)
            .bind(utils::timestamp(utils::now()))
            .bind(id)
            .execute(&self.pool)
            .await
            .context("Failed to rename the student")?;
        if result.rows_affected() == 0 {
            bail!("No student found with id '{id}'");
        }
        self.student_by_id(id)
            .await?
            .with_context(|| format!("No student found with id '{id}'"))
    }
}

// =============================================================================
// Transactions
// =============================================================================

#[async_trait]
impl Repository<Transaction> for Db {
    async fn insert(&self, owner: &str, draft: TransactionDraft) -> Result<Transaction> {
        let txn = Transaction {
            id: utils::generate_id(),
            owner: owner.to_string(),
            fields: draft,
            created_at: utils::now(),
        };
        sqlx::query(
            "INSERT INTO transactions \
            (id, user_id, date, category, description, amount, direction, created_at) \
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&txn.id)
        .bind(&txn.owner)
        .bind(txn.fields.date.format(DATE_FORMAT).to_string())
        .bind(&txn.fields.category)
        .bind(&txn.fields.description)
        .bind(txn.fields.amount.value().to_string())
        .bind(txn.fields.direction.to_string())
        .bind(utils::timestamp(txn.created_at))
        .execute(&self.pool)
        .await
        .context("Failed to insert the transaction")?;
        trace!("Inserted transaction {}", txn.id);
        Ok(txn)
    }

    async fn get(&self, id: &str) -> Result<Option<Transaction>> {
        let row = sqlx::query("SELECT * FROM transactions WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .context("Failed to query transactions")?;
        row.as_ref().map(transaction_from_row).transpose()
    }

    async fn list(&self, params: &ListParams) -> Result<Vec<Transaction>> {
        let mut qb = QueryBuilder::<Sqlite>::new("SELECT * FROM transactions WHERE user_id = ");
        qb.push_bind(params.owner.clone());
        push_date_range(&mut qb, "date", params);
        qb.push(format!(
            " ORDER BY date {0}, created_at {0}",
            params.order.sql()
        ));
        let rows = qb
            .build()
            .fetch_all(&self.pool)
            .await
            .context("Failed to list transactions")?;
        rows.iter().map(transaction_from_row).collect()
    }

    async fn update(&self, id: &str, draft: TransactionDraft) -> Result<Transaction> {
        let result = sqlx::query(
            "UPDATE transactions SET date = ?, category = ?, description = ?, amount = ?, \
            direction = ? WHERE id = ?",
        )
        .bind(draft.date.format(DATE_FORMAT).to_string())
        .bind(&draft.category)
        .bind(&draft.description)
        .bind(draft.amount.value().to_string())
        .bind(draft.direction.to_string())
        .bind(id)
        .execute(&self.pool)
        .await
        .context("Failed to update the transaction")?;
        ensure_affected::<Transaction>(result, id)?;
        Repository::<Transaction>::get(self, id)
            .await?
            .ok_or_else(|| not_found::<Transaction>(id))
    }

    async fn delete(&self, id: &str) -> Result<()> {
        let result = sqlx::query("DELETE FROM transactions WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .context("Failed to delete the transaction")?;
        ensure_affected::<Transaction>(result, id)
    }
}

// =============================================================================
// Schedule
// =============================================================================

#[async_trait]
impl Repository<ScheduleEntry> for Db {
    async fn insert(&self, owner: &str, draft: ScheduleDraft) -> Result<ScheduleEntry> {
        draft.validate()?;
        let entry = ScheduleEntry {
            id: utils::generate_id(),
            owner: owner.to_string(),
            fields: draft,
            created_at: utils::now(),
        };
        let fields = &entry.fields;
        sqlx::query(
            "INSERT INTO schedule \
            (id, user_id, course, day, start_time, end_time, lecturer, room, credits, created_at) \
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&entry.id)
        .bind(&entry.owner)
        .bind(&fields.course)
        .bind(i64::from(fields.day.number_from_monday()))
        .bind(fields.start.format(TIME_FORMAT).to_string())
        .bind(fields.end.format(TIME_FORMAT).to_string())
        .bind(&fields.lecturer)
        .bind(&fields.room)
        .bind(fields.credits.map(i64::from))
        .bind(utils::timestamp(entry.created_at))
        .execute(&self.pool)
        .await
        .context("Failed to insert the schedule entry")?;
        trace!("Inserted schedule entry {}", entry.id);
        Ok(entry)
    }

    async fn get(&self, id: &str) -> Result<Option<ScheduleEntry>> {
        let row = sqlx::query("SELECT * FROM schedule WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .context("Failed to query the schedule")?;
        row.as_ref().map(schedule_from_row).transpose()
    }

    async fn list(&self, params: &ListParams) -> Result<Vec<ScheduleEntry>> {
        let rows = sqlx::query(&format!(
            "SELECT * FROM schedule WHERE user_id = ? ORDER BY day {0}, start_time {0}",
            params.order.sql()
        ))
        .bind(&params.owner)
        .fetch_all(&self.pool)
        .await
        .context("Failed to list the schedule")?;
        rows.iter().map(schedule_from_row).collect()
    }

    async fn update(&self, id: &str, draft: ScheduleDraft) -> Result<ScheduleEntry> {
        draft.validate()?;
        let result = sqlx::query(
            "UPDATE schedule SET course = ?, day = ?, start_time = ?, end_time = ?, \
            lecturer = ?, room = ?, credits = ? WHERE id = ?",
        )
        .bind(&draft.course)
        .bind(i64::from(draft.day.number_from_monday()))
        .bind(draft.start.format(TIME_FORMAT).to_string())
        .bind(draft.end.format(TIME_FORMAT).to_string())
        .bind(&draft.lecturer)
        .bind(&draft.room)
        .bind(draft.credits.map(i64::from))
        .bind(id)
        .execute(&self.pool)
        .await
        .context("Failed to update the schedule entry")?;
        ensure_affected::<ScheduleEntry>(result, id)?;
        Repository::<ScheduleEntry>::get(self, id)
            .await?
            .ok_or_else(|| not_found::<ScheduleEntry>(id))
    }

    /// Also removes the grades and attendance records of the course.
    async fn delete(&self, id: &str) -> Result<()> {
        let result = sqlx::query("DELETE FROM schedule WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .context("Failed to delete the schedule entry")?;
        ensure_affected::<ScheduleEntry>(result, id)
    }
}

// =============================================================================
// Grades
// =============================================================================

const GRADE_SELECT: &str = "SELECT g.*, COALESCE(s.course, '') AS course FROM grades g \
    LEFT JOIN schedule s ON s.id = g.schedule_id";

fn ensure_finite(scores: &ScoreRecord) -> Result<()> {
    ensure!(scores.is_finite(), "Scores must be finite numbers");
    Ok(())
}

#[async_trait]
impl Repository<GradeEntry> for Db {
    async fn insert(&self, owner: &str, draft: GradeDraft) -> Result<GradeEntry> {
        ensure_finite(&draft.scores)?;
        let course = self.course_name(&draft.schedule_id).await?;
        let (final_score, letter) = draft.scores.grade();
        let entry = GradeEntry {
            id: utils::generate_id(),
            owner: owner.to_string(),
            fields: draft,
            course,
            final_score,
            letter,
            created_at: utils::now(),
        };
        let scores = entry.fields.scores;
        sqlx::query(
            "INSERT INTO grades (id, user_id, schedule_id, task, midterm, final_exam, \
            final_score, letter, semester, created_at) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&entry.id)
        .bind(&entry.owner)
        .bind(&entry.fields.schedule_id)
        .bind(scores.task)
        .bind(scores.midterm)
        .bind(scores.final_exam)
        .bind(entry.final_score)
        .bind(entry.letter.to_string())
        .bind(i64::from(entry.fields.semester))
        .bind(utils::timestamp(entry.created_at))
        .execute(&self.pool)
        .await
        .context("Failed to insert the grade")?;
        trace!(
            "Inserted grade {} for {}: {} {}",
            entry.id,
            entry.course,
            entry.final_score,
            entry.letter
        );
        Ok(entry)
    }

    async fn get(&self, id: &str) -> Result<Option<GradeEntry>> {
        let row = sqlx::query(&format!("{GRADE_SELECT} WHERE g.id = ?"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .context("Failed to query grades")?;
        row.as_ref().map(grade_from_row).transpose()
    }

    async fn list(&self, params: &ListParams) -> Result<Vec<GradeEntry>> {
        let rows = sqlx::query(&format!(
            "{GRADE_SELECT} WHERE g.user_id = ? ORDER BY g.semester {0}, g.created_at {0}",
            params.order.sql()
        ))
        .bind(&params.owner)
        .fetch_all(&self.pool)
        .await
        .context("Failed to list grades")?;
        rows.iter().map(grade_from_row).collect()
    }

    async fn update(&self, id: &str, draft: GradeDraft) -> Result<GradeEntry> {
        ensure_finite(&draft.scores)?;
        self.course_name(&draft.schedule_id).await?;
        let (final_score, letter) = draft.scores.grade();
        let result = sqlx::query(
            "UPDATE grades SET schedule_id = ?, task = ?, midterm = ?, final_exam = ?, \
            final_score = ?, letter = ?, semester = ? WHERE id = ?",
        )
        .bind(&draft.schedule_id)
        .bind(draft.scores.task)
        .bind(draft.scores.midterm)
        .bind(draft.scores.final_exam)
        .bind(final_score)
        .bind(letter.to_string())
        .bind(i64::from(draft.semester))
        .bind(id)
        .execute(&self.pool)
        .await
        .context("Failed to update the grade")?;
        ensure_affected::<GradeEntry>(result, id)?;
        Repository::<GradeEntry>::get(self, id)
            .await?
            .ok_or_else(|| not_found::<GradeEntry>(id))
    }

    async fn delete(&self, id: &str) -> Result<()> {
        let result = sqlx::query("DELETE FROM grades WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .context("Failed to delete the grade")?;
        ensure_affected::<GradeEntry>(result, id)
    }
}

// =============================================================================
// Attendance
// =============================================================================

const ATTENDANCE_SELECT: &str = "SELECT a.*, COALESCE(s.course, '') AS course FROM attendance a \
    LEFT JOIN schedule s ON s.id = a.schedule_id";

#[async_trait]
impl Repository<AttendanceEntry> for Db {
    async fn insert(&self, owner: &str, draft: AttendanceDraft) -> Result<AttendanceEntry> {
        let course = self.course_name(&draft.schedule_id).await?;
        let entry = AttendanceEntry {
            id: utils::generate_id(),
            owner: owner.to_string(),
            fields: draft,
            course,
            created_at: utils::now(),
        };
        sqlx::query(
            "INSERT INTO attendance (id, user_id, schedule_id, date, status, created_at) \
            VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(&entry.id)
        .bind(&entry.owner)
        .bind(&entry.fields.schedule_id)
        .bind(entry.fields.date.format(DATE_FORMAT).to_string())
        .bind(entry.fields.status.to_string())
        .bind(utils::timestamp(entry.created_at))
        .execute(&self.pool)
        .await
        .context("Failed to insert the attendance record")?;
        Ok(entry)
    }

    async fn get(&self, id: &str) -> Result<Option<AttendanceEntry>> {
        let row = sqlx::query(&format!("{ATTENDANCE_SELECT} WHERE a.id = ?"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .context("Failed to query attendance")?;
        row.as_ref().map(attendance_from_row).transpose()
    }

    async fn list(&self, params: &ListParams) -> Result<Vec<AttendanceEntry>> {
        let mut qb = QueryBuilder::<Sqlite>::new(ATTENDANCE_SELECT);
        qb.push(" WHERE a.user_id = ");
        qb.push_bind(params.owner.clone());
        push_date_range(&mut qb, "a.date", params);
        qb.push(format!(
            " ORDER BY a.date {0}, a.created_at {0}",
            params.order.sql()
        ));
        let rows = qb
            .build()
            .fetch_all(&self.pool)
            .await
            .context("Failed to list attendance")?;
        rows.iter().map(attendance_from_row).collect()
    }

    async fn update(&self, id: &str, draft: AttendanceDraft) -> Result<AttendanceEntry> {
        self.course_name(&draft.schedule_id).await?;
        let result =
            sqlx::query("UPDATE attendance SET schedule_id = ?, date = ?, status = ? WHERE id = ?")
                .bind(&draft.schedule_id)
                .bind(draft.date.format(DATE_FORMAT).to_string())
                .bind(draft.status.to_string())
                .bind(id)
                .execute(&self.pool)
                .await
                .context("Failed to update the attendance record")?;
        ensure_affected::<AttendanceEntry>(result, id)?;
        Repository::<AttendanceEntry>::get(self, id)
            .await?
            .ok_or_else(|| not_found::<AttendanceEntry>(id))
    }

    async fn delete(&self, id: &str) -> Result<()> {
        let result = sqlx::query("DELETE FROM attendance WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .context("Failed to delete the attendance record")?;
        ensure_affected::<AttendanceEntry>(result, id)
    }
}

// =============================================================================
// Chat history
// =============================================================================

#[async_trait]
impl Repository<ChatEntry> for Db {
    async fn insert(&self, owner: &str, draft: ChatDraft) -> Result<ChatEntry> {
        let entry = ChatEntry {
            id: utils::generate_id(),
            owner: owner.to_string(),
            fields: draft,
            created_at: utils::now(),
        };
        sqlx::query(
            "INSERT INTO chat_history (id, user_id, message, response, created_at) \
            VALUES (?, ?, ?, ?, ?)",
        )
        .bind(&entry.id)
        .bind(&entry.owner)
        .bind(&entry.fields.message)
        .bind(&entry.fields.response)
        .bind(utils::timestamp(entry.created_at))
        .execute(&self.pool)
        .await
        .context("Failed to save the chat entry")?;
        Ok(entry)
    }

    async fn get(&self, id: &str) -> Result<Option<ChatEntry>> {
        let row = sqlx::query("SELECT * FROM chat_history WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .context("Failed to query the chat history")?;
        row.as_ref().map(chat_from_row).transpose()
    }

    async fn list(&self, params: &ListParams) -> Result<Vec<ChatEntry>> {
        let mut qb = QueryBuilder::<Sqlite>::new("SELECT * FROM chat_history WHERE user_id = ");
        qb.push_bind(params.owner.clone());
        push_date_range(&mut qb, "substr(created_at, 1, 10)", params);
        qb.push(format!(
            " ORDER BY created_at {0}, rowid {0}",
            params.order.sql()
        ));
        let rows = qb
            .build()
            .fetch_all(&self.pool)
            .await
            .context("Failed to list the chat history")?;
        rows.iter().map(chat_from_row).collect()
    }

    async fn update(&self, id: &str, draft: ChatDraft) -> Result<ChatEntry> {
        let result = sqlx::query("UPDATE chat_history SET message = ?, response = ? WHERE id = ?")
            .bind(&draft.message)
            .bind(&draft.response)
            .bind(id)
            .execute(&self.pool)
            .await
            .context("Failed to update the chat entry")?;
        ensure_affected::<ChatEntry>(result, id)?;
        Repository::<ChatEntry>::get(self, id)
            .await?
            .ok_or_else(|| not_found::<ChatEntry>(id))
    }

    async fn delete(&self, id: &str) -> Result<()> {
        let result = sqlx::query("DELETE FROM chat_history WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .context("Failed to delete the chat entry")?;
        ensure_affected::<ChatEntry>(result, id)
    }
}
