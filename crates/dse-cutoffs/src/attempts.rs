//! Assessment of logged past-paper attempts against the cutoff store.

use crate::cutoffs::{estimate_grade, has_subject_cutoff_data, CutoffStore, Estimate};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum AttemptError {
    #[error("paper total must be greater than zero (found {0})")]
    InvalidTotal(f64),
    #[error("score cannot be negative (found {0})")]
    NegativeScore(f64),
    #[error("score must be a finite number (found {0})")]
    InvalidScore(f64),
    #[error("score {score} cannot be greater than the paper total {total}")]
    ScoreExceedsTotal { score: f64, total: f64 },
}

fn default_is_dse() -> bool {
    true
}

/// One sitting of a past paper, as logged by the student.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaperAttempt {
    pub subject: String,
    #[serde(default)]
    pub exam_year: Option<i32>,
    pub score: f64,
    pub total: f64,
    #[serde(default = "default_is_dse")]
    pub is_dse: bool,
}

impl PaperAttempt {
    pub fn percentage(&self) -> Result<f64, AttemptError> {
        percentage_of(self.score, self.total)
    }
}

/// Score as a percentage of the paper total, in `0..=100`.
pub fn percentage_of(score: f64, total: f64) -> Result<f64, AttemptError> {
    if !total.is_finite() || total <= 0.0 {
        return Err(AttemptError::InvalidTotal(total));
    }
    if !score.is_finite() {
        return Err(AttemptError::InvalidScore(score));
    }
    if score < 0.0 {
        return Err(AttemptError::NegativeScore(score));
    }
    if score > total {
        return Err(AttemptError::ScoreExceedsTotal { score, total });
    }
    Ok(score / total * 100.0)
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct AttemptAssessment {
    pub percentage: f64,
    pub estimate: Estimate,
    /// Set when the level cannot be trusted to the estimator: non-DSE papers,
    /// or no boundaries for this exact subject and year.
    pub manual_grade_required: bool,
}

pub fn assess(attempt: &PaperAttempt, store: &CutoffStore) -> Result<AttemptAssessment, AttemptError> {
    let percentage = attempt.percentage()?;
    let estimate = estimate_grade(&attempt.subject, percentage, store, attempt.exam_year);
    let manual_grade_required =
        !attempt.is_dse || !has_subject_cutoff_data(store, &attempt.subject, attempt.exam_year);

    Ok(AttemptAssessment {
        percentage,
        estimate,
        manual_grade_required,
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct AttemptSummary {
    pub total_attempts: usize,
    pub average_percentage: f64,
    pub top_estimate: Estimate,
}

pub fn summarize(assessments: &[AttemptAssessment]) -> Option<AttemptSummary> {
    let top_estimate = assessments.iter().map(|a| a.estimate).max()?;
    let total: f64 = assessments.iter().map(|a| a.percentage).sum();

    Some(AttemptSummary {
        total_attempts: assessments.len(),
        average_percentage: total / assessments.len() as f64,
        top_estimate,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cutoffs::{BoundaryRow, GradeLevel};

    fn store() -> CutoffStore {
        let mut store = CutoffStore::new();
        store.insert_rows(
            "CHEM",
            2023,
            vec![
                BoundaryRow::new(GradeLevel::FiveStarStar, 85.0),
                BoundaryRow::new(GradeLevel::FiveStar, 75.0),
                BoundaryRow::new(GradeLevel::Five, 65.0),
            ],
        );
        store
    }

    fn attempt(subject: &str, year: i32, score: f64, total: f64) -> PaperAttempt {
        PaperAttempt {
            subject: subject.to_string(),
            exam_year: Some(year),
            score,
            total,
            is_dse: true,
        }
    }

    #[test]
    fn percentage_is_score_over_total() {
        assert_eq!(percentage_of(45.0, 60.0), Ok(75.0));
        assert_eq!(percentage_of(1.0, 0.0), Err(AttemptError::InvalidTotal(0.0)));
        assert_eq!(percentage_of(-1.0, 10.0), Err(AttemptError::NegativeScore(-1.0)));
        assert!(percentage_of(1.0, f64::NAN).is_err());
        assert_eq!(percentage_of(200.0, 200.0), Ok(100.0));
    }

    #[test]
    fn score_above_total_is_rejected() {
        assert_eq!(
            percentage_of(250.0, 200.0),
            Err(AttemptError::ScoreExceedsTotal {
                score: 250.0,
                total: 200.0
            })
        );
        let err = assess(&attempt("CHEM", 2023, 250.0, 200.0), &store()).unwrap_err();
        assert!(matches!(err, AttemptError::ScoreExceedsTotal { .. }));
    }

    #[test]
    fn non_finite_scores_and_totals_are_rejected() {
        assert!(matches!(
            percentage_of(f64::NAN, 200.0),
            Err(AttemptError::InvalidScore(_))
        ));
        assert!(matches!(
            percentage_of(f64::INFINITY, 200.0),
            Err(AttemptError::InvalidScore(_))
        ));
        assert_eq!(
            percentage_of(10.0, f64::INFINITY),
            Err(AttemptError::InvalidTotal(f64::INFINITY))
        );
        assert!(matches!(
            percentage_of(10.0, f64::NEG_INFINITY),
            Err(AttemptError::InvalidTotal(_))
        ));
    }

    #[test]
    fn exact_year_data_lets_the_estimate_stand() {
        let result = assess(&attempt("chem", 2023, 160.0, 200.0), &store()).expect("valid");
        assert_eq!(result.percentage, 80.0);
        assert_eq!(result.estimate, Estimate::Level(GradeLevel::FiveStar));
        assert!(!result.manual_grade_required);
    }

    #[test]
    fn missing_year_or_non_dse_papers_need_a_manual_grade() {
        let nearest = assess(&attempt("CHEM", 2021, 160.0, 200.0), &store()).expect("valid");
        assert!(nearest.manual_grade_required);
        assert_eq!(nearest.estimate, Estimate::Level(GradeLevel::FiveStar));

        let mut mock = attempt("CHEM", 2023, 160.0, 200.0);
        mock.is_dse = false;
        assert!(assess(&mock, &store()).expect("valid").manual_grade_required);
    }

    #[test]
    fn summary_reports_average_and_best_estimate() {
        assert!(summarize(&[]).is_none());

        let store = store();
        let assessments: Vec<_> = [(120.0, 200.0), (180.0, 200.0), (40.0, 200.0)]
            .into_iter()
            .map(|(score, total)| assess(&attempt("CHEM", 2023, score, total), &store))
            .collect::<Result<_, _>>()
            .expect("valid attempts");

        let summary = summarize(&assessments).expect("summary");
        assert_eq!(summary.total_attempts, 3);
        assert!((summary.average_percentage - 56.666_666).abs() < 1e-3);
        assert_eq!(summary.top_estimate, Estimate::Level(GradeLevel::FiveStarStar));
    }

    #[test]
    fn attempts_deserialize_with_dse_default() {
        let parsed: PaperAttempt =
            serde_json::from_str(r#"{"subject":"ENG","score":50,"total":80}"#).expect("json");
        assert!(parsed.is_dse);
        assert_eq!(parsed.exam_year, None);
    }
}
