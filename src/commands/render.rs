//! Renders records as JSON, a markdown table or CSV for stdout.

use crate::academic::{Dashboard, SemesterCredits};
use crate::args::OutputFormat;
use crate::ledger::{CategoryBucket, PeriodBucket, Totals};
use crate::model::{AttendanceEntry, ChatEntry, GradeEntry, ScheduleEntry, Transaction};
use crate::Result;
use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::fmt::{Debug, Display, Formatter};

/// Rendered command output in the requested format.
#[derive(Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Rows {
    /// Pretty-printed JSON.
    Json(serde_json::Value),
    /// Markdown table as a single formatted string.
    Table(String),
    /// CSV data as a properly escaped string.
    Csv(String),
}

impl Debug for Rows {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Rows::Json(v) => write!(f, "Rows::Json({:?})", v),
            Rows::Table(s) => write!(f, "Rows::Table({} chars)", s.len()),
            Rows::Csv(s) => write!(f, "Rows::Csv({} chars)", s.len()),
        }
    }
}

impl Display for Rows {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Rows::Json(v) => {
                if let Ok(s) = serde_json::to_string_pretty(v) {
                    write!(f, "{}", s)
                } else {
                    write!(f, "{:?}", v)
                }
            }
            Rows::Table(s) => write!(f, "{}", s),
            Rows::Csv(s) => write!(f, "{}", s),
        }
    }
}

/// A record that can be shown as one row of a table.
pub(crate) trait Tabular {
    fn headers() -> &'static [&'static str];
    fn cells(&self) -> Vec<String>;
}

/// A titled group of rows. Reports are made of several sections.
pub(crate) struct Section {
    title: &'static str,
    headers: &'static [&'static str],
    rows: Vec<Vec<String>>,
}

impl Section {
    pub(crate) fn new<T: Tabular>(title: &'static str, records: &[T]) -> Self {
        Self {
            title,
            headers: T::headers(),
            rows: cells(records),
        }
    }
}

/// Renders a flat list of records.
pub(crate) fn render<T>(records: &[T], format: OutputFormat) -> Result<Rows>
where
    T: Tabular + Serialize,
{
    match format {
        OutputFormat::Json => json(records),
        OutputFormat::Table => Ok(Rows::Table(markdown(T::headers(), &cells(records)))),
        OutputFormat::Csv => Ok(Rows::Csv(csv_text(T::headers(), &cells(records))?)),
    }
}

/// Renders a report. JSON uses `value` as a whole; the table and CSV formats print each section
/// under its own header.
pub(crate) fn render_sections<T>(value: &T, sections: &[Section], format: OutputFormat) -> Result<Rows>
where
    T: Serialize,
{
    match format {
        OutputFormat::Json => json(value),
        OutputFormat::Table => {
            let parts: Vec<String> = sections
                .iter()
                .map(|s| format!("## {}\n\n{}", s.title, markdown(s.headers, &s.rows)))
                .collect();
            Ok(Rows::Table(parts.join("\n\n")))
        }
        OutputFormat::Csv => {
            let mut parts = Vec::with_capacity(sections.len());
            for s in sections {
                parts.push(csv_text(s.headers, &s.rows)?);
            }
            Ok(Rows::Csv(parts.join("\n")))
        }
    }
}

fn json<T: Serialize + ?Sized>(value: &T) -> Result<Rows> {
    let value = serde_json::to_value(value).context("Unable to serialize output as JSON")?;
    Ok(Rows::Json(value))
}

fn cells<T: Tabular>(records: &[T]) -> Vec<Vec<String>> {
    records.iter().map(Tabular::cells).collect()
}

fn markdown(headers: &[&str], rows: &[Vec<String>]) -> String {
    let escape = |s: &str| s.replace('|', "\\|").replace('\n', " ");
    let mut out = String::new();
    out.push_str(&format!("| {} |\n", headers.join(" | ")));
    out.push_str(&format!(
        "|{}\n",
        headers.iter().map(|_| " --- |").collect::<String>()
    ));
    for row in rows {
        let row: Vec<String> = row.iter().map(|c| escape(c)).collect();
        out.push_str(&format!("| {} |\n", row.join(" | ")));
    }
    out
}

fn csv_text(headers: &[&str], rows: &[Vec<String>]) -> Result<String> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer
        .write_record(headers)
        .context("Unable to write CSV header")?;
    for row in rows {
        writer.write_record(row).context("Unable to write CSV row")?;
    }
    let bytes = writer
        .into_inner()
        .map_err(|e| anyhow::anyhow!("Unable to finish CSV output: {e}"))?;
    String::from_utf8(bytes).context("CSV output is not valid UTF-8")
}

fn opt<T: ToString>(value: Option<T>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

impl Tabular for Transaction {
    fn headers() -> &'static [&'static str] {
        &["id", "date", "direction", "category", "amount", "description"]
    }

    fn cells(&self) -> Vec<String> {
        let f = self.fields();
        vec![
            self.id().to_string(),
            f.date.to_string(),
            f.direction.to_string(),
            f.category.clone(),
            f.amount.to_string(),
            f.description.clone(),
        ]
    }
}

impl Tabular for ScheduleEntry {
    fn headers() -> &'static [&'static str] {
        &[
            "id", "day", "start", "end", "course", "credits", "lecturer", "room",
        ]
    }

    fn cells(&self) -> Vec<String> {
        let f = self.fields();
        vec![
            self.id().to_string(),
            f.day.to_string(),
            f.start.format("%H:%M").to_string(),
            f.end.format("%H:%M").to_string(),
            f.course.clone(),
            opt(f.credits),
            opt(f.lecturer.as_deref()),
            opt(f.room.as_deref()),
        ]
    }
}

impl Tabular for GradeEntry {
    fn headers() -> &'static [&'static str] {
        &[
            "id", "semester", "course", "task", "midterm", "final", "score", "letter",
        ]
    }

    fn cells(&self) -> Vec<String> {
        let scores = self.scores();
        vec![
            self.id().to_string(),
            self.semester().to_string(),
            self.course().to_string(),
            scores.task.to_string(),
            scores.midterm.to_string(),
            scores.final_exam.to_string(),
            self.final_score().to_string(),
            self.letter().to_string(),
        ]
    }
}

impl Tabular for AttendanceEntry {
    fn headers() -> &'static [&'static str] {
        &["id", "date", "course", "status"]
    }

    fn cells(&self) -> Vec<String> {
        vec![
            self.id().to_string(),
            self.date().to_string(),
            self.course().to_string(),
            self.status().label().to_string(),
        ]
    }
}

impl Tabular for ChatEntry {
    fn headers() -> &'static [&'static str] {
        &["time", "message", "response"]
    }

    fn cells(&self) -> Vec<String> {
        vec![
            self.created_at().format("%Y-%m-%d %H:%M").to_string(),
            self.message().to_string(),
            self.response().to_string(),
        ]
    }
}

impl Tabular for PeriodBucket {
    fn headers() -> &'static [&'static str] {
        &["period", "income", "expense", "balance"]
    }

    fn cells(&self) -> Vec<String> {
        vec![
            self.period.clone(),
            self.income.to_string(),
            self.expense.to_string(),
            self.balance.to_string(),
        ]
    }
}

impl Tabular for CategoryBucket {
    fn headers() -> &'static [&'static str] {
        &["category", "direction", "total"]
    }

    fn cells(&self) -> Vec<String> {
        vec![
            self.category.clone(),
            self.direction.to_string(),
            self.total.to_string(),
        ]
    }
}

impl Tabular for Totals {
    fn headers() -> &'static [&'static str] {
        &["income", "expense", "balance"]
    }

    fn cells(&self) -> Vec<String> {
        vec![
            self.income.to_string(),
            self.expense.to_string(),
            self.balance.to_string(),
        ]
    }
}

impl Tabular for SemesterCredits {
    fn headers() -> &'static [&'static str] {
        &["semester", "credits", "courses"]
    }

    fn cells(&self) -> Vec<String> {
        vec![
            self.semester.to_string(),
            self.total_credits.to_string(),
            self.courses.join(", "),
        ]
    }
}

impl Tabular for Dashboard {
    fn headers() -> &'static [&'static str] {
        &["courses", "credits", "average score", "attendance rate"]
    }

    fn cells(&self) -> Vec<String> {
        vec![
            self.course_count.to_string(),
            self.total_credits.to_string(),
            format_num::format_num!(".2", self.average_score),
            format!("{}%", format_num::format_num!(".1", self.attendance_rate)),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Amount, Direction};

    fn totals() -> Totals {
        Totals {
            income: Amount::from(100i64),
            expense: Amount::from(40i64),
            balance: Amount::from(60i64),
        }
    }

    #[test]
    fn test_markdown() {
        let rows = render(&[totals()], OutputFormat::Table).unwrap();
        let text = rows.to_string();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "| income | expense | balance |");
        assert_eq!(lines[1], "| --- | --- | --- |");
        assert_eq!(lines[2], "| Rp 100 | Rp 40 | Rp 60 |");
    }

    #[test]
    fn test_dashboard_cells() {
        let dashboard = Dashboard {
            total_credits: 9,
            average_score: 75.0,
            attendance_rate: 66.666,
            course_count: 3,
        };
        assert_eq!(dashboard.cells(), vec!["3", "9", "75.00", "66.7%"]);
    }

    #[test]
    fn test_markdown_escapes_pipes() {
        let text = markdown(&["a"], &[vec!["x|y".to_string()]]);
        assert!(text.contains("x\\|y"), "{text}");
    }

    #[test]
    fn test_csv_quotes_fields() {
        let bucket = CategoryBucket {
            category: "Food, drinks".into(),
            total: Amount::from(1500000i64),
            direction: Direction::Out,
        };
        let rows = render(&[bucket], OutputFormat::Csv).unwrap();
        assert_eq!(
            rows.to_string(),
            "category,direction,total\n\"Food, drinks\",out,Rp 1.500.000\n"
        );
    }

    #[test]
    fn test_json_uses_plain_amounts() {
        let rows = render(&[totals()], OutputFormat::Json).unwrap();
        match rows {
            Rows::Json(v) => assert_eq!(v[0]["balance"], "60"),
            other => panic!("expected JSON, got {other:?}"),
        }
    }

    #[test]
    fn test_sections() {
        let sections = vec![
            Section::new("Totals", &[totals()]),
            Section::new::<PeriodBucket>("Periods", &[]),
        ];
        let rows = render_sections(&totals(), &sections, OutputFormat::Table).unwrap();
        let text = rows.to_string();
        assert!(text.starts_with("## Totals\n\n| income"), "{text}");
        assert!(text.contains("## Periods\n\n| period | income | expense | balance |"));
    }
}
