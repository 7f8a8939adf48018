//! Schedule command handlers.

use crate::args::{IdArgs, ListArgs, ScheduleAddArgs, ScheduleUpdateArgs};
use crate::commands::render::render;
use crate::commands::{list_params, owned, plural, Out};
use crate::error::{ErrorType, IntoResult};
use crate::model::{ScheduleDraft, ScheduleEntry};
use crate::repo::Repository;
use crate::{Config, Result};

/// Adds a course meeting to the logged-in student's weekly schedule.
///
/// # Errors
/// - Returns a `Request` error if the course name is empty or the meeting ends before it starts.
pub async fn schedule_add(config: Config, args: ScheduleAddArgs) -> Result<Out<ScheduleEntry>> {
    let session = config.session()?;
    let draft = ScheduleDraft {
        course: args.course().trim().to_string(),
        day: args.day(),
        start: args.start(),
        end: args.end(),
        lecturer: args.lecturer().map(str::to_string),
        room: args.room().map(str::to_string),
        credits: args.credits(),
    };
    draft.validate().pub_result(ErrorType::Request)?;

    let entry: ScheduleEntry = config
        .db()
        .insert(&session.student_id, draft)
        .await
        .pub_result(ErrorType::Database)?;
    let message = format!(
        "Added {} on {} {}-{} ({})",
        entry.course(),
        entry.fields().day,
        entry.fields().start.format("%H:%M"),
        entry.fields().end.format("%H:%M"),
        entry.id()
    );
    Ok(Out::new(message, entry))
}

/// Lists the weekly schedule, ordered by day and then start time.
pub async fn schedule_list(config: Config, args: ListArgs) -> Result<Out<Vec<ScheduleEntry>>> {
    let session = config.session()?;
    let params = list_params(session).order(args.order());
    let entries: Vec<ScheduleEntry> = config
        .db()
        .list(&params)
        .await
        .pub_result(ErrorType::Database)?;
    let rows = render(&entries, args.format()).pub_result(ErrorType::Request)?;
    let message = format!("{} course{} on the schedule", entries.len(), plural(entries.len()));
    Ok(Out::new(message, entries).with_rows(rows))
}

/// Changes the given fields of a course meeting and leaves the others as they are.
pub async fn schedule_update(
    config: Config,
    args: ScheduleUpdateArgs,
) -> Result<Out<ScheduleEntry>> {
    let session = config.session()?;
    let current: ScheduleEntry = owned(&config, session, args.id()).await?;

    let mut draft = current.fields().clone();
    if let Some(course) = args.course() {
        draft.course = course.trim().to_string();
    }
    if let Some(day) = args.day() {
        draft.day = day;
    }
    if let Some(start) = args.start() {
        draft.start = start;
    }
    if let Some(end) = args.end() {
        draft.end = end;
    }
    if let Some(lecturer) = args.lecturer() {
        draft.lecturer = Some(lecturer.to_string());
    }
    if let Some(room) = args.room() {
        draft.room = Some(room.to_string());
    }
    if let Some(credits) = args.credits() {
        draft.credits = Some(credits);
    }
    draft.validate().pub_result(ErrorType::Request)?;

    let updated: ScheduleEntry = config
        .db()
        .update(args.id(), draft)
        .await
        .pub_result(ErrorType::Database)?;
    Ok(Out::new(format!("Updated {}", updated.course()), updated))
}

/// Deletes a course meeting. Its grades and attendance records are deleted with it.
pub async fn schedule_delete(config: Config, args: IdArgs) -> Result<Out<String>> {
    let session = config.session()?;
    let entry: ScheduleEntry = owned(&config, session, args.id()).await?;
    Repository::<ScheduleEntry>::delete(config.db(), entry.id())
        .await
        .pub_result(ErrorType::Database)?;
    Ok(Out::new(
        format!("Deleted {} and its grades and attendance", entry.course()),
        entry.id().to_string(),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::args::{GradeAddArgs, OutputFormat};
    use crate::commands::{grade_add, grade_list, Rows};
    use crate::error::error_type;
    use crate::grade::ScoreRecord;
    use crate::repo::SortOrder;
    use crate::test::TestEnv;
    use chrono::{NaiveTime, Weekday};

    fn hm(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    #[tokio::test]
    async fn test_schedule_add_and_list() {
        let env = TestEnv::logged_in().await;
        let args = ScheduleAddArgs::new("Basis Data", Weekday::Tue, hm(10, 0), hm(11, 40))
            .with_credits(3);
        let out = schedule_add(env.config(), args).await.unwrap();
        assert!(out.message().starts_with("Added Basis Data on Tue 10:00-11:40"));

        let args = ScheduleAddArgs::new("Kalkulus", Weekday::Mon, hm(8, 0), hm(9, 40));
        schedule_add(env.config(), args).await.unwrap();

        let out = schedule_list(env.config(), ListArgs::default())
            .await
            .unwrap();
        let names: Vec<&str> = out.structure().unwrap().iter().map(|s| s.course()).collect();
        assert_eq!(names, vec!["Kalkulus", "Basis Data"]);
        assert_eq!(out.message(), "2 courses on the schedule");
        assert!(matches!(out.rows(), Some(Rows::Table(_))));

        let args = ListArgs::new(None, None, SortOrder::Desc).with_format(OutputFormat::Json);
        let out = schedule_list(env.config(), args).await.unwrap();
        assert_eq!(out.structure().unwrap()[0].course(), "Basis Data");
    }

    #[tokio::test]
    async fn test_schedule_add_rejects_bad_times() {
        let env = TestEnv::logged_in().await;
        let args = ScheduleAddArgs::new("Basis Data", Weekday::Tue, hm(12, 0), hm(11, 0));
        let err = schedule_add(env.config(), args).await.unwrap_err();
        assert_eq!(error_type(&err), Some(ErrorType::Request));
    }

    #[tokio::test]
    async fn test_schedule_requires_login() {
        let env = TestEnv::new().await;
        let err = schedule_list(env.config(), ListArgs::default())
            .await
            .unwrap_err();
        assert_eq!(error_type(&err), Some(ErrorType::Session));
    }

    #[tokio::test]
    async fn test_schedule_update_keeps_other_fields() {
        let env = TestEnv::logged_in().await;
        let course = env.add_course("Basis Data", 3).await;
        let args = ScheduleUpdateArgs::new(course.id()).with_course("Basis Data II");
        let out = schedule_update(env.config(), args).await.unwrap();
        let updated = out.structure().unwrap();
        assert_eq!(updated.course(), "Basis Data II");
        assert_eq!(updated.credits(), Some(3));
        assert_eq!(updated.fields().day, course.fields().day);

        let args = ScheduleUpdateArgs::new(course.id()).with_times(hm(9, 0), hm(8, 0));
        let err = schedule_update(env.config(), args).await.unwrap_err();
        assert_eq!(error_type(&err), Some(ErrorType::Request));
    }

    #[tokio::test]
    async fn test_schedule_of_other_student_is_hidden() {
        let env = TestEnv::logged_in().await;
        let other = env.other_student("2021002").await;
        let draft = ScheduleDraft::new("Fisika", Weekday::Fri, hm(7, 0), hm(8, 0));
        let theirs: ScheduleEntry = env
            .config()
            .db()
            .insert(&other.student_id, draft)
            .await
            .unwrap();

        let err = schedule_delete(env.config(), IdArgs::new(theirs.id()))
            .await
            .unwrap_err();
        assert_eq!(error_type(&err), Some(ErrorType::Request));
        let out = schedule_list(env.config(), ListArgs::default())
            .await
            .unwrap();
        assert!(out.structure().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_schedule_delete_removes_grades() {
        let env = TestEnv::logged_in().await;
        let course = env.add_course("Basis Data", 3).await;
        let scores = ScoreRecord::new(80.0, 80.0, 80.0);
        grade_add(env.config(), GradeAddArgs::new(course.id(), scores, 1))
            .await
            .unwrap();

        let out = schedule_delete(env.config(), IdArgs::new(course.id()))
            .await
            .unwrap();
        assert_eq!(out.structure().unwrap(), course.id());
        let grades = grade_list(env.config(), ListArgs::default()).await.unwrap();
        assert!(grades.structure().unwrap().is_empty());
    }
}
