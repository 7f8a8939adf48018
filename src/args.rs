//! These structs provide the CLI interface for the campus CLI.

use crate::grade::ScoreRecord;
use crate::ledger::Granularity;
use crate::model::{Amount, AttendanceStatus, Direction};
use crate::repo::SortOrder;
use chrono::{NaiveDate, NaiveTime, Weekday};
use clap::{Parser, Subcommand};
use serde::{Deserialize, Serialize};
use std::convert::Infallible;
use std::fmt::{Display, Formatter};
use std::ops::Deref;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::error;
use tracing::level_filters::LevelFilter;

/// campus: keep track of your classes, grades, attendance and money.
///
/// Everything is stored locally in a SQLite database under the campus home directory. Start with
/// `campus init`, then `campus login --nim <NIM> --name <NAME>`. All other commands act on
/// behalf of the logged-in student.
#[derive(Debug, Parser, Clone)]
#[command(name = "campus", version)]
pub struct Args {
    #[clap(flatten)]
    common: Common,

    #[command(subcommand)]
    command: Command,
}

impl Args {
    pub fn new(common: Common, command: Command) -> Self {
        Self { common, command }
    }

    pub fn common(&self) -> &Common {
        &self.common
    }

    pub fn command(&self) -> &Command {
        &self.command
    }
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Create the campus home directory, its config file and an empty database.
    Init,
    /// Log in as a student. The student is created on first login; logging in with a known NIM
    /// and a different name renames the student.
    Login(LoginArgs),
    /// Forget the logged-in student.
    Logout,
    /// Show the logged-in student.
    Whoami,
    /// Manage the weekly class schedule.
    #[command(subcommand)]
    Schedule(ScheduleCommand),
    /// Record course grades. Final scores and letters are computed for you.
    #[command(subcommand)]
    Grade(GradeCommand),
    /// Record attendance at class meetings.
    #[command(subcommand)]
    Attendance(AttendanceCommand),
    /// Record income and expenses.
    #[command(subcommand)]
    Transaction(TransactionCommand),
    /// Financial and academic summaries.
    #[command(subcommand)]
    Report(ReportCommand),
    /// Ask the campus assistant a question, or show past conversations.
    Chat(ChatArgs),
}

/// Arguments common to all subcommands.
#[derive(Debug, Parser, Clone)]
pub struct Common {
    /// The logging verbosity. One of, from least to most verbose:
    /// off, error, warn, info, debug, trace
    ///
    /// This can be overridden by RUST_LOG.
    #[arg(long, global = true, default_value_t = LevelFilter::INFO)]
    log_level: LevelFilter,

    /// The directory where campus data and configuration is held. Defaults to ~/campus
    #[arg(long, global = true, env = "CAMPUS_HOME", default_value_t = default_campus_home())]
    campus_home: DisplayPath,
}

impl Common {
    pub fn new(log_level: LevelFilter, campus_home: PathBuf) -> Self {
        Self {
            log_level,
            campus_home: campus_home.into(),
        }
    }

    pub fn log_level(&self) -> LevelFilter {
        self.log_level
    }

    pub fn campus_home(&self) -> &DisplayPath {
        &self.campus_home
    }
}

/// Args for the `campus login` command.
#[derive(Debug, Parser, Clone)]
pub struct LoginArgs {
    /// Your student number.
    #[arg(long)]
    nim: String,

    /// Your full name.
    #[arg(long)]
    name: String,
}

impl LoginArgs {
    pub fn new(nim: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            nim: nim.into(),
            name: name.into(),
        }
    }

    pub fn nim(&self) -> &str {
        &self.nim
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

/// Filters shared by the `list` subcommands.
#[derive(Debug, Default, Parser, Clone)]
pub struct ListArgs {
    /// Only show records on or after this date (YYYY-MM-DD).
    #[arg(long)]
    from: Option<NaiveDate>,

    /// Only show records on or before this date (YYYY-MM-DD).
    #[arg(long)]
    to: Option<NaiveDate>,

    /// Sort order: asc or desc.
    #[arg(long, default_value_t = SortOrder::Asc)]
    order: SortOrder,

    /// Output format: json, table or csv.
    #[arg(long, default_value_t = OutputFormat::Table)]
    format: OutputFormat,
}

impl ListArgs {
    pub fn new(from: Option<NaiveDate>, to: Option<NaiveDate>, order: SortOrder) -> Self {
        Self {
            from,
            to,
            order,
            format: OutputFormat::Table,
        }
    }

    pub fn with_format(mut self, format: OutputFormat) -> Self {
        self.format = format;
        self
    }

    pub fn from(&self) -> Option<NaiveDate> {
        self.from
    }

    pub fn to(&self) -> Option<NaiveDate> {
        self.to
    }

    pub fn order(&self) -> SortOrder {
        self.order
    }

    pub fn format(&self) -> OutputFormat {
        self.format
    }
}

/// How list and report output is rendered on stdout.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    Json,
    /// A markdown table.
    #[default]
    Table,
    Csv,
}

serde_plain::derive_display_from_serialize!(OutputFormat);
serde_plain::derive_fromstr_from_deserialize!(OutputFormat);

// =============================================================================
// schedule
// =============================================================================

#[derive(Subcommand, Debug, Clone)]
pub enum ScheduleCommand {
    /// Add a course meeting to the weekly schedule.
    Add(ScheduleAddArgs),
    /// List the weekly schedule, Monday first.
    List(ListArgs),
    /// Change some fields of a course meeting.
    Update(ScheduleUpdateArgs),
    /// Delete a course meeting together with its grades and attendance.
    Delete(IdArgs),
}

#[derive(Debug, Parser, Clone)]
pub struct ScheduleAddArgs {
    /// The course name.
    #[arg(long)]
    course: String,

    /// Day of the week, e.g. mon, monday or senin.
    #[arg(long, value_parser = parse_day)]
    day: Weekday,

    /// Start time, HH:MM.
    #[arg(long, value_parser = parse_time)]
    start: NaiveTime,

    /// End time, HH:MM.
    #[arg(long, value_parser = parse_time)]
    end: NaiveTime,

    #[arg(long)]
    lecturer: Option<String>,

    #[arg(long)]
    room: Option<String>,

    /// Credit hours (SKS).
    #[arg(long)]
    credits: Option<u32>,
}

impl ScheduleAddArgs {
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

    pub fn course(&self) -> &str {
        &self.course
    }

    pub fn day(&self) -> Weekday {
        self.day
    }

    pub fn start(&self) -> NaiveTime {
        self.start
    }

    pub fn end(&self) -> NaiveTime {
        self.end
    }

    pub fn lecturer(&self) -> Option<&str> {
        self.lecturer.as_deref()
    }

    pub fn room(&self) -> Option<&str> {
        self.room.as_deref()
    }

    pub fn credits(&self) -> Option<u32> {
        self.credits
    }
}

/// Only the fields that are given are changed.
#[derive(Debug, Default, Parser, Clone)]
pub struct ScheduleUpdateArgs {
    /// The id of the course meeting.
    id: String,

    #[arg(long)]
    course: Option<String>,

    #[arg(long, value_parser = parse_day)]
    day: Option<Weekday>,

    #[arg(long, value_parser = parse_time)]
    start: Option<NaiveTime>,

    #[arg(long, value_parser = parse_time)]
    end: Option<NaiveTime>,

    #[arg(long)]
    lecturer: Option<String>,

    #[arg(long)]
    room: Option<String>,

    #[arg(long)]
    credits: Option<u32>,
}

impl ScheduleUpdateArgs {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Self::default()
        }
    }

    pub fn with_course(mut self, course: impl Into<String>) -> Self {
        self.course = Some(course.into());
        self
    }

    pub fn with_times(mut self, start: NaiveTime, end: NaiveTime) -> Self {
        self.start = Some(start);
        self.end = Some(end);
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn course(&self) -> Option<&str> {
        self.course.as_deref()
    }

    pub fn day(&self) -> Option<Weekday> {
        self.day
    }

    pub fn start(&self) -> Option<NaiveTime> {
        self.start
    }

    pub fn end(&self) -> Option<NaiveTime> {
        self.end
    }

    pub fn lecturer(&self) -> Option<&str> {
        self.lecturer.as_deref()
    }

    pub fn room(&self) -> Option<&str> {
        self.room.as_deref()
    }

    pub fn credits(&self) -> Option<u32> {
        self.credits
    }
}

/// A single record id.
#[derive(Debug, Parser, Clone)]
pub struct IdArgs {
    id: String,
}

impl IdArgs {
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into() }
    }

    pub fn id(&self) -> &str {
        &self.id
    }
}

// =============================================================================
// grade
// =============================================================================

#[derive(Subcommand, Debug, Clone)]
pub enum GradeCommand {
    /// Record the scores of a course.
    Add(GradeAddArgs),
    /// List grades by semester.
    List(ListArgs),
    /// Change some fields of a grade. The final score and letter are recomputed.
    Update(GradeUpdateArgs),
    Delete(IdArgs),
}

#[derive(Debug, Parser, Clone)]
pub struct GradeAddArgs {
    /// The id of the course on the schedule.
    #[arg(long)]
    course_id: String,

    /// Task (assignment) score, 0 to 100.
    #[arg(long)]
    task: f64,

    /// Midterm exam score, 0 to 100.
    #[arg(long)]
    midterm: f64,

    /// Final exam score, 0 to 100.
    #[arg(long = "final")]
    final_exam: f64,

    #[arg(long)]
    semester: u32,
}

impl GradeAddArgs {
    pub fn new(course_id: impl Into<String>, scores: ScoreRecord, semester: u32) -> Self {
        Self {
            course_id: course_id.into(),
            task: scores.task,
            midterm: scores.midterm,
            final_exam: scores.final_exam,
            semester,
        }
    }

    pub fn course_id(&self) -> &str {
        &self.course_id
    }

    pub fn scores(&self) -> ScoreRecord {
        ScoreRecord::new(self.task, self.midterm, self.final_exam)
    }

    pub fn semester(&self) -> u32 {
        self.semester
    }
}

/// Only the fields that are given are changed.
#[derive(Debug, Default, Parser, Clone)]
pub struct GradeUpdateArgs {
    id: String,

    #[arg(long)]
    course_id: Option<String>,

    #[arg(long)]
    task: Option<f64>,

    #[arg(long)]
    midterm: Option<f64>,

    #[arg(long = "final")]
    final_exam: Option<f64>,

    #[arg(long)]
    semester: Option<u32>,
}

impl GradeUpdateArgs {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Self::default()
        }
    }

    pub fn with_final_exam(mut self, score: f64) -> Self {
        self.final_exam = Some(score);
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn course_id(&self) -> Option<&str> {
        self.course_id.as_deref()
    }

    /// `current` with the given scores replaced.
    pub fn scores(&self, current: ScoreRecord) -> ScoreRecord {
        ScoreRecord::new(
            self.task.unwrap_or(current.task),
            self.midterm.unwrap_or(current.midterm),
            self.final_exam.unwrap_or(current.final_exam),
        )
    }

    pub fn semester(&self) -> Option<u32> {
        self.semester
    }
}

// =============================================================================
// attendance
// =============================================================================

#[derive(Subcommand, Debug, Clone)]
pub enum AttendanceCommand {
    /// Record attendance at one class meeting.
    Add(AttendanceAddArgs),
    /// List attendance records by date.
    List(ListArgs),
    Delete(IdArgs),
}

#[derive(Debug, Parser, Clone)]
pub struct AttendanceAddArgs {
    /// The id of the course on the schedule.
    #[arg(long)]
    course_id: String,

    /// The date of the meeting (YYYY-MM-DD). Defaults to today.
    #[arg(long)]
    date: Option<NaiveDate>,

    /// H (present), S (sick) or A (absent).
    #[arg(long)]
    status: AttendanceStatus,
}

impl AttendanceAddArgs {
    pub fn new(course_id: impl Into<String>, date: NaiveDate, status: AttendanceStatus) -> Self {
        Self {
            course_id: course_id.into(),
            date: Some(date),
            status,
        }
    }

    pub fn course_id(&self) -> &str {
        &self.course_id
    }

    pub fn date(&self) -> Option<NaiveDate> {
        self.date
    }

    pub fn status(&self) -> AttendanceStatus {
        self.status
    }
}

// =============================================================================
// transaction
// =============================================================================

#[derive(Subcommand, Debug, Clone)]
pub enum TransactionCommand {
    /// Record income or an expense.
    Add(TransactionAddArgs),
    /// List transactions by date.
    List(ListArgs),
    /// Change some fields of a transaction.
    Update(TransactionUpdateArgs),
    Delete(IdArgs),
}

#[derive(Debug, Parser, Clone)]
pub struct TransactionAddArgs {
    /// The date of the transaction (YYYY-MM-DD). Defaults to today.
    #[arg(long)]
    date: Option<NaiveDate>,

    #[arg(long)]
    category: String,

    #[arg(long, default_value = "")]
    description: String,

    /// The amount in Rupiah, e.g. 15000 or "Rp 1,500,000".
    #[arg(long)]
    amount: Amount,

    /// in (masuk) or out (keluar).
    #[arg(long)]
    direction: Direction,
}

impl TransactionAddArgs {
    pub fn new(
        date: NaiveDate,
        category: impl Into<String>,
        amount: impl Into<Amount>,
        direction: Direction,
    ) -> Self {
        Self {
            date: Some(date),
            category: category.into(),
            description: String::new(),
            amount: amount.into(),
            direction,
        }
    }

    pub fn date(&self) -> Option<NaiveDate> {
        self.date
    }

    pub fn category(&self) -> &str {
        &self.category
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn amount(&self) -> Amount {
        self.amount
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }
}

/// Only the fields that are given are changed.
#[derive(Debug, Default, Parser, Clone)]
pub struct TransactionUpdateArgs {
    id: String,

    #[arg(long)]
    date: Option<NaiveDate>,

    #[arg(long)]
    category: Option<String>,

    #[arg(long)]
    description: Option<String>,

    #[arg(long)]
    amount: Option<Amount>,

    #[arg(long)]
    direction: Option<Direction>,
}

impl TransactionUpdateArgs {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Self::default()
        }
    }

    pub fn with_amount(mut self, amount: impl Into<Amount>) -> Self {
        self.amount = Some(amount.into());
        self
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn date(&self) -> Option<NaiveDate> {
        self.date
    }

    pub fn category(&self) -> Option<&str> {
        self.category.as_deref()
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn amount(&self) -> Option<Amount> {
        self.amount
    }

    pub fn direction(&self) -> Option<Direction> {
        self.direction
    }
}

// =============================================================================
// report
// =============================================================================

#[derive(Subcommand, Debug, Clone)]
pub enum ReportCommand {
    /// Income and expenses by period and by category, with totals.
    Ledger(LedgerArgs),
    /// Credits per semester, average score and attendance rate.
    Academic(AcademicArgs),
}

#[derive(Debug, Parser, Clone)]
pub struct LedgerArgs {
    /// month or week.
    #[arg(long, default_value_t = Granularity::Month)]
    granularity: Granularity,

    /// Only include transactions from this calendar year. Defaults to all transactions.
    #[arg(long, value_parser = clap::value_parser!(i32).range(1..=9999))]
    year: Option<i32>,

    /// Output format: json, table or csv.
    #[arg(long, default_value_t = OutputFormat::Table)]
    format: OutputFormat,
}

impl LedgerArgs {
    pub fn new(granularity: Granularity, year: Option<i32>, format: OutputFormat) -> Self {
        Self {
            granularity,
            year,
            format,
        }
    }

    pub fn granularity(&self) -> Granularity {
        self.granularity
    }

    pub fn year(&self) -> Option<i32> {
        self.year
    }

    pub fn format(&self) -> OutputFormat {
        self.format
    }
}

#[derive(Debug, Parser, Clone)]
pub struct AcademicArgs {
    /// Output format: json, table or csv.
    #[arg(long, default_value_t = OutputFormat::Table)]
    format: OutputFormat,
}

impl AcademicArgs {
    pub fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    pub fn format(&self) -> OutputFormat {
        self.format
    }
}

// =============================================================================
// chat
// =============================================================================

#[derive(Debug, Parser, Clone)]
pub struct ChatArgs {
    /// What you want to ask.
    #[arg(required_unless_present = "history")]
    message: Option<String>,

    /// Show your past questions and answers instead of asking a new one.
    #[arg(long, conflicts_with = "message")]
    history: bool,
}

impl ChatArgs {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: Some(message.into()),
            history: false,
        }
    }

    pub fn history() -> Self {
        Self {
            message: None,
            history: true,
        }
    }

    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    pub fn show_history(&self) -> bool {
        self.history
    }
}

// =============================================================================
// value parsers
// =============================================================================

/// Parses an English day name or abbreviation, or an Indonesian day name.
pub fn parse_day(s: &str) -> Result<Weekday, String> {
    let day = match s.trim().to_lowercase().as_str() {
        "senin" => Weekday::Mon,
        "selasa" => Weekday::Tue,
        "rabu" => Weekday::Wed,
        "kamis" => Weekday::Thu,
        "jumat" | "jum'at" => Weekday::Fri,
        "sabtu" => Weekday::Sat,
        "minggu" => Weekday::Sun,
        other => Weekday::from_str(other).map_err(|_| format!("'{s}' is not a day of the week"))?,
    };
    Ok(day)
}

/// Parses a time of day written as `HH:MM`.
pub fn parse_time(s: &str) -> Result<NaiveTime, String> {
    NaiveTime::parse_from_str(s.trim(), "%H:%M")
        .map_err(|e| format!("'{s}' is not a time in HH:MM format: {e}"))
}

fn default_campus_home() -> DisplayPath {
    DisplayPath(match dirs::home_dir() {
        Some(home) => home.join("campus"),
        None => {
            error!(
                "There was an error when trying to get your home directory. You can get around \
                this by providing --campus-home or CAMPUS_HOME instead of relying on the default \
                campus home directory. If you continue using the program right now, you may have \
                problems!",
            );
            PathBuf::from("campus")
        }
    })
}

#[derive(Debug, Default, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct DisplayPath(PathBuf);

impl From<PathBuf> for DisplayPath {
    fn from(value: PathBuf) -> Self {
        DisplayPath(value)
    }
}

impl Deref for DisplayPath {
    type Target = Path;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl AsRef<Path> for DisplayPath {
    fn as_ref(&self) -> &Path {
        &self.0
    }
}

impl Display for DisplayPath {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.to_string_lossy())
    }
}

impl FromStr for DisplayPath {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(PathBuf::from(s)))
    }
}

impl DisplayPath {
    pub fn path(&self) -> &Path {
        &self.0
    }
}
