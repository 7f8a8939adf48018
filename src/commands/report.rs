//! Report command handlers. Reports are computed from freshly listed records every time; nothing
//! is cached.

use crate::academic::{credits_by_semester, Dashboard, SemesterCredits};
use crate::args::{AcademicArgs, LedgerArgs};
use crate::commands::render::{render_sections, Section};
use crate::commands::{list_params, Out};
use crate::error::{ErrorType, IntoResult};
use crate::ledger::LedgerSummary;
use crate::model::{AttendanceEntry, GradeEntry, ScheduleEntry, Transaction};
use crate::repo::Repository;
use crate::{Config, Result};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// The academic report: credits per semester and the dashboard numbers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AcademicReport {
    pub dashboard: Dashboard,
    pub semesters: Vec<SemesterCredits>,
}

/// Summarizes the logged-in student's transactions by period and by category.
pub async fn report_ledger(config: Config, args: LedgerArgs) -> Result<Out<LedgerSummary>> {
    let session = config.session()?;
    let params = list_params(session)
        .year(args.year())
        .pub_result(ErrorType::Request)?;
    let txns: Vec<Transaction> = config
        .db()
        .list(&params)
        .await
        .pub_result(ErrorType::Database)?;
    debug!("Summarizing {} transactions", txns.len());

    let summary = LedgerSummary::build(&txns, args.granularity());
    let sections = [
        Section::new("Totals", &[summary.totals]),
        Section::new("Periods", &summary.periods),
        Section::new("Categories", &summary.categories),
    ];
    let rows =
        render_sections(&summary, &sections, args.format()).pub_result(ErrorType::Request)?;

    let scope = match args.year() {
        Some(year) => format!("in {year}"),
        None => "overall".to_string(),
    };
    let message = format!(
        "Balance {scope}: {} (income {}, expense {})",
        summary.totals.balance, summary.totals.income, summary.totals.expense
    );
    Ok(Out::new(message, summary).with_rows(rows))
}

/// Builds the academic dashboard and the credits taken in each semester.
pub async fn report_academic(config: Config, args: AcademicArgs) -> Result<Out<AcademicReport>> {
    let session = config.session()?;
    let db = config.db();
    let params = list_params(session);
    let schedule: Vec<ScheduleEntry> = db.list(&params).await.pub_result(ErrorType::Database)?;
    let grades: Vec<GradeEntry> = db.list(&params).await.pub_result(ErrorType::Database)?;
    let attendance: Vec<AttendanceEntry> =
        db.list(&params).await.pub_result(ErrorType::Database)?;

    let report = AcademicReport {
        dashboard: Dashboard::build(&schedule, &grades, &attendance),
        semesters: credits_by_semester(&grades, &schedule),
    };
    let sections = [
        Section::new("Dashboard", std::slice::from_ref(&report.dashboard)),
        Section::new("Semesters", &report.semesters),
    ];
    let rows =
        render_sections(&report, &sections, args.format()).pub_result(ErrorType::Request)?;

    let d = &report.dashboard;
    let message = format!(
        "{} credits, average score {:.2}, attendance {:.1}%",
        d.total_credits, d.average_score, d.attendance_rate
    );
    Ok(Out::new(message, report).with_rows(rows))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::args::{AttendanceAddArgs, GradeAddArgs, OutputFormat, TransactionAddArgs};
    use crate::commands::{attendance_add, grade_add, transaction_add, Rows};
    use crate::error::error_type;
    use crate::grade::ScoreRecord;
    use crate::ledger::{Granularity, Totals};
    use crate::model::{Amount, AttendanceStatus, Direction};
    use crate::test::TestEnv;
    use chrono::NaiveDate;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    async fn add(env: &TestEnv, d: NaiveDate, category: &str, amount: i64, dir: Direction) {
        let args = TransactionAddArgs::new(d, category, amount, dir);
        transaction_add(env.config(), args).await.unwrap();
    }

    #[tokio::test]
    async fn test_report_ledger_totals() {
        let env = TestEnv::logged_in().await;
        add(&env, date(2024, 1, 3), "Beasiswa", 100, Direction::In).await;
        add(&env, date(2024, 1, 9), "Makan", 40, Direction::Out).await;
        add(&env, date(2024, 2, 1), "Buku", 60, Direction::Out).await;

        let args = LedgerArgs::new(Granularity::Month, None, OutputFormat::Table);
        let out = report_ledger(env.config(), args).await.unwrap();
        let summary = out.structure().unwrap();
        assert_eq!(
            summary.totals,
            Totals {
                income: Amount::from(100i64),
                expense: Amount::from(100i64),
                balance: Amount::ZERO,
            }
        );
        let periods: Vec<&str> = summary.periods.iter().map(|p| p.period.as_str()).collect();
        assert_eq!(periods, vec!["2024-01", "2024-02"]);
        assert_eq!(summary.categories[0].category, "Beasiswa");
        assert_eq!(out.message(), "Balance overall: Rp 0 (income Rp 100, expense Rp 100)");

        let text = out.rows().unwrap().to_string();
        assert!(text.starts_with("## Totals"), "{text}");
        assert!(text.contains("## Categories"));
    }

    #[tokio::test]
    async fn test_report_ledger_year_and_weeks() {
        let env = TestEnv::logged_in().await;
        add(&env, date(2023, 12, 30), "Makan", 10, Direction::Out).await;
        add(&env, date(2024, 1, 1), "Makan", 20, Direction::Out).await;
        add(&env, date(2024, 1, 7), "Makan", 30, Direction::Out).await;

        let args = LedgerArgs::new(Granularity::Week, Some(2024), OutputFormat::Json);
        let out = report_ledger(env.config(), args).await.unwrap();
        let summary = out.structure().unwrap();
        assert_eq!(summary.totals.expense, Amount::from(50i64));
        // 2024-01-01 is a Monday, so the first Sunday starts week 2
        let periods: Vec<&str> = summary.periods.iter().map(|p| p.period.as_str()).collect();
        assert_eq!(periods, vec!["2024-W01", "2024-W02"]);
        assert!(matches!(out.rows(), Some(Rows::Json(_))));
    }

    #[tokio::test]
    async fn test_report_ledger_rejects_unrepresentable_year() {
        let env = TestEnv::logged_in().await;
        add(&env, date(2024, 1, 3), "Beasiswa", 100, Direction::In).await;
        let args = LedgerArgs::new(Granularity::Month, Some(300_000), OutputFormat::Table);
        let err = report_ledger(env.config(), args).await.unwrap_err();
        assert_eq!(error_type(&err), Some(ErrorType::Request));
    }

    #[tokio::test]
    async fn test_report_academic() {
        let env = TestEnv::logged_in().await;
        let basis = env.add_course("Basis Data", 3).await;
        let kalkulus = env.add_course("Kalkulus", 2).await;
        env.add_course("Fisika", 4).await;

        for (course, semester, score) in [(&basis, 1, 80.0), (&kalkulus, 1, 70.0)] {
            let scores = ScoreRecord::new(score, score, score);
            grade_add(env.config(), GradeAddArgs::new(course.id(), scores, semester))
                .await
                .unwrap();
        }
        for (day, status) in [
            (4, AttendanceStatus::Present),
            (11, AttendanceStatus::Present),
            (18, AttendanceStatus::Present),
            (25, AttendanceStatus::Absent),
        ] {
            let args = AttendanceAddArgs::new(basis.id(), date(2024, 3, day), status);
            attendance_add(env.config(), args).await.unwrap();
        }

        let out = report_academic(env.config(), AcademicArgs::new(OutputFormat::Table))
            .await
            .unwrap();
        let report = out.structure().unwrap();
        assert_eq!(report.dashboard.total_credits, 9);
        assert_eq!(report.dashboard.course_count, 3);
        assert_eq!(report.dashboard.average_score, 75.0);
        assert_eq!(report.dashboard.attendance_rate, 75.0);
        assert_eq!(report.semesters.len(), 1);
        assert_eq!(report.semesters[0].total_credits, 5);
        assert_eq!(report.semesters[0].courses, vec!["Basis Data", "Kalkulus"]);
        assert_eq!(out.message(), "9 credits, average score 75.00, attendance 75.0%");
    }

    #[tokio::test]
    async fn test_report_academic_empty() {
        let env = TestEnv::logged_in().await;
        let out = report_academic(env.config(), AcademicArgs::new(OutputFormat::Csv))
            .await
            .unwrap();
        let report = out.structure().unwrap();
        assert_eq!(report.dashboard.average_score, 0.0);
        assert!(report.semesters.is_empty());
    }
}
