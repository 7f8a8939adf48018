use crate::args::{AttendanceAddArgs, IdArgs, ListArgs};
use crate::commands::render::render;
use crate::commands::{list_params, owned, plural, Out};
use crate::error::{ErrorType, IntoResult};
use crate::model::{AttendanceDraft, AttendanceEntry, ScheduleEntry};
use crate::repo::Repository;
use crate::{Config, Result};

/// Records attendance at one meeting of a course. The date defaults to today.
pub async fn attendance_add(
    config: Config,
    args: AttendanceAddArgs,
) -> Result<Out<AttendanceEntry>> {
    let session = config.session()?;
    let course: ScheduleEntry = owned(&config, session, args.course_id()).await?;
    let date = args
        .date()
        .unwrap_or_else(|| chrono::Local::now().date_naive());
    let draft = AttendanceDraft::new(course.id(), date, args.status());
    let entry: AttendanceEntry = config
        .db()
        .insert(&session.student_id, draft)
        .await
        .pub_result(ErrorType::Database)?;
    let message = format!(
        "Marked {} as {} on {}",
        entry.course(),
        entry.status().label(),
        entry.date()
    );
    Ok(Out::new(message, entry))
}

/// Lists attendance records by date, optionally restricted to a date range.
pub async fn attendance_list(
    config: Config,
    args: ListArgs,
) -> Result<Out<Vec<AttendanceEntry>>> {
    let session = config.session()?;
    let params = list_params(session)
        .from(args.from())
        .to(args.to())
        .order(args.order());
    let entries: Vec<AttendanceEntry> = config
        .db()
        .list(&params)
        .await
        .pub_result(ErrorType::Database)?;
    let rows = render(&entries, args.format()).pub_result(ErrorType::Request)?;
    let message = format!(
        "{} attendance record{}, {:.1}% present",
        entries.len(),
        plural(entries.len()),
        crate::academic::attendance_rate(&entries)
    );
    Ok(Out::new(message, entries).with_rows(rows))
}

pub async fn attendance_delete(config: Config, args: IdArgs) -> Result<Out<String>> {
    let session = config.session()?;
    let entry: AttendanceEntry = owned(&config, session, args.id()).await?;
    Repository::<AttendanceEntry>::delete(config.db(), entry.id())
        .await
        .pub_result(ErrorType::Database)?;
    Ok(Out::new(
        format!("Deleted attendance for {} on {}", entry.course(), entry.date()),
        entry.id().to_string(),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::error_type;
    use crate::model::AttendanceStatus;
    use crate::repo::SortOrder;
    use crate::test::TestEnv;
    use chrono::NaiveDate;

    fn date(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, day).unwrap()
    }

    #[tokio::test]
    async fn test_attendance_add_and_list() {
        let env = TestEnv::logged_in().await;
        let course = env.add_course("Basis Data", 3).await;
        for (day, status) in [
            (4, AttendanceStatus::Present),
            (11, AttendanceStatus::Sick),
            (18, AttendanceStatus::Present),
            (25, AttendanceStatus::Absent),
        ] {
            let args = AttendanceAddArgs::new(course.id(), date(day), status);
            attendance_add(env.config(), args).await.unwrap();
        }

        let out = attendance_list(env.config(), ListArgs::default())
            .await
            .unwrap();
        assert_eq!(out.message(), "4 attendance records, 50.0% present");

        let args = ListArgs::new(Some(date(10)), Some(date(20)), SortOrder::Desc);
        let out = attendance_list(env.config(), args).await.unwrap();
        let dates: Vec<NaiveDate> = out.structure().unwrap().iter().map(|a| a.date()).collect();
        assert_eq!(dates, vec![date(18), date(11)]);
    }

    #[tokio::test]
    async fn test_attendance_add_message() {
        let env = TestEnv::logged_in().await;
        let course = env.add_course("Kalkulus", 2).await;
        let args = AttendanceAddArgs::new(course.id(), date(4), AttendanceStatus::Sick);
        let out = attendance_add(env.config(), args).await.unwrap();
        assert_eq!(out.message(), "Marked Kalkulus as Sick on 2024-03-04");
        assert_eq!(out.structure().unwrap().course(), "Kalkulus");
    }

    #[tokio::test]
    async fn test_attendance_requires_own_course() {
        let env = TestEnv::logged_in().await;
        let args = AttendanceAddArgs::new("missing", date(4), AttendanceStatus::Present);
        let err = attendance_add(env.config(), args).await.unwrap_err();
        assert_eq!(error_type(&err), Some(ErrorType::Request));
    }

    #[tokio::test]
    async fn test_attendance_delete() {
        let env = TestEnv::logged_in().await;
        let course = env.add_course("Basis Data", 3).await;
        let args = AttendanceAddArgs::new(course.id(), date(4), AttendanceStatus::Present);
        let added = attendance_add(env.config(), args).await.unwrap();
        let id = added.structure().unwrap().id().to_string();

        let out = attendance_delete(env.config(), IdArgs::new(&id))
            .await
            .unwrap();
        assert_eq!(out.message(), "Deleted attendance for Basis Data on 2024-03-04");
        let out = attendance_list(env.config(), ListArgs::default())
            .await
            .unwrap();
        assert!(out.structure().unwrap().is_empty());
        assert_eq!(out.message(), "0 attendance records, 0.0% present");
    }
}
