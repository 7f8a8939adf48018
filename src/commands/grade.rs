//! Grade command handlers. Callers only supply the three raw scores; the final score and letter
//! are computed whenever a grade is saved.

use crate::args::{GradeAddArgs, GradeUpdateArgs, IdArgs, ListArgs};
use crate::commands::render::render;
use crate::commands::{list_params, owned, plural, Out};
use crate::error::{ErrorType, IntoResult};
use crate::model::{GradeDraft, GradeEntry, ScheduleEntry};
use crate::repo::Repository;
use crate::{Config, Result};
use anyhow::ensure;

/// Records the scores of one of the logged-in student's courses.
pub async fn grade_add(config: Config, args: GradeAddArgs) -> Result<Out<GradeEntry>> {
    let session = config.session()?;
    let course: ScheduleEntry = owned(&config, session, args.course_id()).await?;
    let draft = GradeDraft::new(course.id(), args.scores(), args.semester());
    check_scores(&draft).pub_result(ErrorType::Request)?;
    let grade: GradeEntry = config
        .db()
        .insert(&session.student_id, draft)
        .await
        .pub_result(ErrorType::Database)?;
    Ok(Out::new(summary("Recorded", &grade), grade))
}

/// Lists grades ordered by semester, together with the mean final score.
pub async fn grade_list(config: Config, args: ListArgs) -> Result<Out<Vec<GradeEntry>>> {
    let session = config.session()?;
    let params = list_params(session).order(args.order());
    let grades: Vec<GradeEntry> = config
        .db()
        .list(&params)
        .await
        .pub_result(ErrorType::Database)?;
    let rows = render(&grades, args.format()).pub_result(ErrorType::Request)?;
    let message = format!(
        "{} grade{}, average score {:.2}",
        grades.len(),
        plural(grades.len()),
        crate::academic::average_score(&grades)
    );
    Ok(Out::new(message, grades).with_rows(rows))
}

/// Changes the given scores or fields of a grade and recomputes its final score and letter.
pub async fn grade_update(config: Config, args: GradeUpdateArgs) -> Result<Out<GradeEntry>> {
    let session = config.session()?;
    let current: GradeEntry = owned(&config, session, args.id()).await?;

    let schedule_id = match args.course_id() {
        Some(id) => {
            let course: ScheduleEntry = owned(&config, session, id).await?;
            course.id().to_string()
        }
        None => current.schedule_id().to_string(),
    };
    let draft = GradeDraft::new(
        schedule_id,
        args.scores(current.scores()),
        args.semester().unwrap_or(current.semester()),
    );
    check_scores(&draft).pub_result(ErrorType::Request)?;
    let grade: GradeEntry = config
        .db()
        .update(current.id(), draft)
        .await
        .pub_result(ErrorType::Database)?;
    Ok(Out::new(summary("Updated", &grade), grade))
}

pub async fn grade_delete(config: Config, args: IdArgs) -> Result<Out<String>> {
    let session = config.session()?;
    let grade: GradeEntry = owned(&config, session, args.id()).await?;
    Repository::<GradeEntry>::delete(config.db(), grade.id())
        .await
        .pub_result(ErrorType::Database)?;
    Ok(Out::new(
        format!("Deleted the grade for {}", grade.course()),
        grade.id().to_string(),
    ))
}

fn check_scores(draft: &GradeDraft) -> Result<()> {
    ensure!(draft.scores.is_finite(), "Scores must be finite numbers");
    Ok(())
}

fn summary(verb: &str, grade: &GradeEntry) -> String {
    format!(
        "{verb} {}: final score {} ({})",
        grade.course(),
        grade.final_score(),
        grade.letter()
    )
}
