//! Academic summaries: credits per semester, the average final score and the attendance rate.

use crate::model::{AttendanceEntry, AttendanceStatus, GradeEntry, ScheduleEntry};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

/// Credits taken in one semester and the courses that make them up.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SemesterCredits {
    pub semester: u32,
    pub total_credits: u32,
    pub courses: Vec<String>,
}

/// The headline numbers of the home screen.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dashboard {
    pub total_credits: u32,
    /// Mean final score over all grades (IPK).
    pub average_score: f64,
    /// Percentage of attendance records that are `Present`.
    pub attendance_rate: f64,
    pub course_count: usize,
}

impl Dashboard {
    pub fn build(
        schedule: &[ScheduleEntry],
        grades: &[GradeEntry],
        attendance: &[AttendanceEntry],
    ) -> Self {
        Self {
            total_credits: total_credits(schedule),
            average_score: average_score(grades),
            attendance_rate: attendance_rate(attendance),
            course_count: schedule.len(),
        }
    }
}

/// Groups graded courses by semester. A grade contributes the credits of its schedule entry,
/// or nothing if the entry has no credits or cannot be found. Course names are listed once per
/// semester in the order they were first seen.
pub fn credits_by_semester(
    grades: &[GradeEntry],
    schedule: &[ScheduleEntry],
) -> Vec<SemesterCredits> {
    let courses: HashMap<&str, &ScheduleEntry> = schedule.iter().map(|s| (s.id(), s)).collect();
    let mut semesters: BTreeMap<u32, (u32, Vec<String>)> = BTreeMap::new();

    for grade in grades {
        let linked = courses.get(grade.schedule_id());
        let credits = linked.and_then(|s| s.credits()).unwrap_or_default();
        let name = match linked {
            Some(s) => s.course(),
            None => grade.course(),
        };

        let (total, names) = semesters.entry(grade.semester()).or_default();
        *total += credits;
        if !name.is_empty() && !names.iter().any(|n| n == name) {
            names.push(name.to_string());
        }
    }

    semesters
        .into_iter()
        .map(|(semester, (total_credits, courses))| SemesterCredits {
            semester,
            total_credits,
            courses,
        })
        .collect()
}

pub fn total_credits(schedule: &[ScheduleEntry]) -> u32 {
    schedule.iter().filter_map(|s| s.credits()).sum()
}

/// Mean of the final scores, or 0 when there are no grades.
pub fn average_score(grades: &[GradeEntry]) -> f64 {
    if grades.is_empty() {
        return 0.0;
    }
    grades.iter().map(|g| g.final_score()).sum::<f64>() / grades.len() as f64
}

/// Present count over all records, as a percentage. 0 when there are no records.
pub fn attendance_rate(attendance: &[AttendanceEntry]) -> f64 {
    if attendance.is_empty() {
        return 0.0;
    }
    let present = attendance
        .iter()
        .filter(|a| a.status() == AttendanceStatus::Present)
        .count();
    present as f64 / attendance.len() as f64 * 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grade::ScoreRecord;
    use crate::model::{AttendanceDraft, GradeDraft, ScheduleDraft};
    use chrono::{DateTime, NaiveDate, NaiveTime, Weekday};

    fn course(id: &str, name: &str, credits: Option<u32>) -> ScheduleEntry {
        let mut fields = ScheduleDraft::new(
            name,
            Weekday::Tue,
            NaiveTime::from_hms_opt(8, 0, 0).unwrap(),
            NaiveTime::from_hms_opt(10, 0, 0).unwrap(),
        );
        fields.credits = credits;
        ScheduleEntry {
            id: id.into(),
            owner: "u".into(),
            fields,
            created_at: DateTime::from_timestamp(0, 0).unwrap(),
        }
    }

    fn grade(schedule_id: &str, semester: u32, final_score: f64) -> GradeEntry {
        let scores = ScoreRecord::new(final_score, final_score, final_score);
        let (final_score, letter) = scores.grade();
        GradeEntry {
            id: format!("g-{schedule_id}-{semester}"),
            owner: "u".into(),
            fields: GradeDraft::new(schedule_id, scores, semester),
            course: String::new(),
            final_score,
            letter,
            created_at: DateTime::from_timestamp(0, 0).unwrap(),
        }
    }

    fn attended(status: AttendanceStatus) -> AttendanceEntry {
        AttendanceEntry {
            id: "a".into(),
            owner: "u".into(),
            fields: AttendanceDraft::new("c1", NaiveDate::from_ymd_opt(2025, 2, 3).unwrap(), status),
            course: "Kalkulus".into(),
            created_at: DateTime::from_timestamp(0, 0).unwrap(),
        }
    }

    #[test]
    fn test_credits_by_semester() {
        let schedule = vec![
            course("c1", "Kalkulus", Some(3)),
            course("c2", "Fisika", Some(2)),
            course("c3", "Agama", None),
        ];
        let grades = vec![
            grade("c2", 2, 70.0),
            grade("c1", 1, 80.0),
            grade("c3", 1, 90.0),
            grade("c1", 2, 85.0),
        ];
        let result = credits_by_semester(&grades, &schedule);
        assert_eq!(
            result,
            vec![
                SemesterCredits {
                    semester: 1,
                    total_credits: 3,
                    courses: vec!["Kalkulus".into(), "Agama".into()],
                },
                SemesterCredits {
                    semester: 2,
                    total_credits: 5,
                    courses: vec!["Fisika".into(), "Kalkulus".into()],
                },
            ]
        );
    }

    #[test]
    fn test_credits_for_missing_course() {
        let grades = vec![grade("gone", 1, 80.0)];
        let result = credits_by_semester(&grades, &[]);
        assert_eq!(result[0].total_credits, 0);
        assert!(result[0].courses.is_empty());
    }

    #[test]
    fn test_total_credits() {
        let schedule = vec![course("c1", "A", Some(3)), course("c2", "B", None)];
        assert_eq!(total_credits(&schedule), 3);
    }

    #[test]
    fn test_average_score() {
        let grades = vec![grade("c1", 1, 80.0), grade("c2", 1, 90.0)];
        assert_eq!(average_score(&grades), 85.0);
        assert_eq!(average_score(&[]), 0.0);
    }

    #[test]
    fn test_attendance_rate() {
        let records = vec![
            attended(AttendanceStatus::Present),
            attended(AttendanceStatus::Present),
            attended(AttendanceStatus::Sick),
            attended(AttendanceStatus::Absent),
        ];
        assert_eq!(attendance_rate(&records), 50.0);
        assert_eq!(attendance_rate(&[]), 0.0);
    }

    #[test]
    fn test_dashboard() {
        let schedule = vec![course("c1", "A", Some(3)), course("c2", "B", Some(2))];
        let grades = vec![grade("c1", 1, 60.0)];
        let attendance = vec![attended(AttendanceStatus::Present)];
        let dash = Dashboard::build(&schedule, &grades, &attendance);
        assert_eq!(dash.total_credits, 5);
        assert_eq!(dash.average_score, 60.0);
        assert_eq!(dash.attendance_rate, 100.0);
        assert_eq!(dash.course_count, 2);
    }
}
