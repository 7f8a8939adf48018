//! The grade engine: turns task, midterm and final exam scores into a final score and a letter.
//!
//! Weights are 30% task, 30% midterm and 40% final exam. Scores are expected to be in `0..=100`
//! but nothing here checks that; out-of-range inputs produce out-of-range results.

use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

const TASK_WEIGHT: f64 = 0.3;
const MIDTERM_WEIGHT: f64 = 0.3;
const FINAL_WEIGHT: f64 = 0.4;

/// Lower bounds of each letter band, best first. Anything below the last bound is an `E`.
const BANDS: [(f64, LetterGrade); 10] = [
    (85.0, LetterGrade::A),
    (80.0, LetterGrade::AMinus),
    (75.0, LetterGrade::BPlus),
    (70.0, LetterGrade::B),
    (65.0, LetterGrade::BMinus),
    (60.0, LetterGrade::CPlus),
    (55.0, LetterGrade::C),
    (50.0, LetterGrade::CMinus),
    (45.0, LetterGrade::DPlus),
    (40.0, LetterGrade::D),
];

/// The three raw scores of a course.
#[derive(Debug, Default, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoreRecord {
    pub task: f64,
    pub midterm: f64,
    pub final_exam: f64,
}

impl ScoreRecord {
    pub fn new(task: f64, midterm: f64, final_exam: f64) -> Self {
        Self {
            task,
            midterm,
            final_exam,
        }
    }

    pub fn final_score(&self) -> f64 {
        final_score(self.task, self.midterm, self.final_exam)
    }

    pub fn is_finite(&self) -> bool {
        self.task.is_finite() && self.midterm.is_finite() && self.final_exam.is_finite()
    }

    /// Computes the final score and its letter together.
    pub fn grade(&self) -> (f64, LetterGrade) {
        let score = self.final_score();
        (score, letter_grade(score))
    }
}

/// Computes `round(task * 0.3 + midterm * 0.3 + final_exam * 0.4)` with halves rounding up.
///
/// Finite inputs are weighted in decimal arithmetic so that a score like `84.5` is not pulled
/// below the half by binary floating point error. Anything that cannot be represented as a
/// `Decimal` (NaN, infinities, huge values) is computed with plain `f64` and propagates.
///
/// ```
/// # use smart_campus::grade::final_score;
/// assert_eq!(final_score(80.0, 70.0, 60.0), 69.0);
/// ```
pub fn final_score(task: f64, midterm: f64, final_exam: f64) -> f64 {
    match decimal_final_score(task, midterm, final_exam) {
        Some(score) => score,
        None => {
            let weighted = task * TASK_WEIGHT + midterm * MIDTERM_WEIGHT + final_exam * FINAL_WEIGHT;
            (weighted + 0.5).floor()
        }
    }
}

fn decimal_final_score(task: f64, midterm: f64, final_exam: f64) -> Option<f64> {
    let weight = |w: i64| Decimal::new(w, 1);
    let weighted = Decimal::from_f64(task)?
        .checked_mul(weight(3))?
        .checked_add(Decimal::from_f64(midterm)?.checked_mul(weight(3))?)?
        .checked_add(Decimal::from_f64(final_exam)?.checked_mul(weight(4))?)?;
    weighted.checked_add(Decimal::new(5, 1))?.floor().to_f64()
}

/// Maps a final score onto its letter. Total: every input, including NaN, has a letter.
pub fn letter_grade(final_score: f64) -> LetterGrade {
    BANDS
        .iter()
        .find(|(bound, _)| final_score >= *bound)
        .map(|(_, letter)| *letter)
        .unwrap_or(LetterGrade::E)
}

/// The eleven letter grades, best first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum LetterGrade {
    #[serde(rename = "A")]
    A,
    #[serde(rename = "A-")]
    AMinus,
    #[serde(rename = "B+")]
    BPlus,
    #[serde(rename = "B")]
    B,
    #[serde(rename = "B-")]
    BMinus,
    #[serde(rename = "C+")]
    CPlus,
    #[serde(rename = "C")]
    C,
    #[serde(rename = "C-")]
    CMinus,
    #[serde(rename = "D+")]
    DPlus,
    #[serde(rename = "D")]
    D,
    #[serde(rename = "E")]
    E,
}

serde_plain::derive_display_from_serialize!(LetterGrade);
serde_plain::derive_fromstr_from_deserialize!(LetterGrade);

impl LetterGrade {
    pub fn band(self) -> GradeBand {
        match self {
            LetterGrade::A | LetterGrade::AMinus => GradeBand::Excellent,
            LetterGrade::BPlus | LetterGrade::B | LetterGrade::BMinus => GradeBand::Good,
            LetterGrade::CPlus | LetterGrade::C | LetterGrade::CMinus => GradeBand::Fair,
            LetterGrade::DPlus | LetterGrade::D | LetterGrade::E => GradeBand::Poor,
        }
    }
}

/// Coarse grouping of letters, used to highlight grades in listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GradeBand {
    Excellent,
    Good,
    Fair,
    Poor,
}

serde_plain::derive_display_from_serialize!(GradeBand);
