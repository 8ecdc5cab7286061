use super::level::{BoundaryRow, Estimate, GradeLevel};
use super::store::{normalize_subject, CutoffStore};
use chrono::Datelike;
use serde::Serialize;

/// Subject-independent thresholds used when no real data applies.
pub const GENERIC_CUTOFFS: [BoundaryRow; 7] = [
    BoundaryRow::new(GradeLevel::FiveStarStar, 90.0),
    BoundaryRow::new(GradeLevel::FiveStar, 80.0),
    BoundaryRow::new(GradeLevel::Five, 70.0),
    BoundaryRow::new(GradeLevel::Four, 60.0),
    BoundaryRow::new(GradeLevel::Three, 50.0),
    BoundaryRow::new(GradeLevel::Two, 40.0),
    BoundaryRow::new(GradeLevel::One, 30.0),
];

pub fn generic_fallback_table() -> &'static [BoundaryRow] {
    &GENERIC_CUTOFFS
}

/// Exam year assumed when a caller does not name one.
pub fn current_exam_year() -> i32 {
    chrono::Local::now().year()
}

/// Where the boundaries used for an estimate came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum BoundarySource {
    ExactYear { year: i32 },
    NearestYear { requested: i32, used: i32 },
    Generic,
}

#[derive(Debug, Clone, Copy)]
pub struct ResolvedBoundaries<'a> {
    pub source: BoundarySource,
    pub rows: &'a [BoundaryRow],
}

/// Whether boundaries exist for exactly this subject and year.
///
/// `exam_year` defaults to the current calendar year. An empty store (generic
/// fallback mode) never has data.
pub fn has_subject_cutoff_data(store: &CutoffStore, subject: &str, exam_year: Option<i32>) -> bool {
    if store.is_empty() {
        return false;
    }
    let year = exam_year.unwrap_or_else(current_exam_year);
    store
        .subject(subject)
        .is_some_and(|table| table.contains_year(year))
}

/// Picks the year closest to `requested` from `years`.
///
/// Years are scanned newest first and a candidate only replaces the current
/// pick on a strictly smaller distance, so equidistant years resolve to the
/// newer one.
pub(crate) fn nearest_year(years: impl IntoIterator<Item = i32>, requested: i32) -> Option<i32> {
    let mut sorted: Vec<i32> = years.into_iter().collect();
    sorted.sort_unstable_by(|a, b| b.cmp(a));

    sorted.into_iter().reduce(|best, candidate| {
        if candidate.abs_diff(requested) < best.abs_diff(requested) {
            candidate
        } else {
            best
        }
    })
}

/// Chooses the boundary list for `subject` in `exam_year`.
///
/// Exact year, then nearest year, then the generic table. A legacy table only
/// has the synthetic year, so it is always the nearest one.
pub fn resolve_boundaries<'a>(
    store: &'a CutoffStore,
    subject: &str,
    exam_year: i32,
) -> ResolvedBoundaries<'a> {
    let code = normalize_subject(subject);
    let Some(table) = store.subject(&code) else {
        return generic();
    };

    if let Some(rows) = table.rows_for(exam_year) {
        return ResolvedBoundaries {
            source: BoundarySource::ExactYear { year: exam_year },
            rows,
        };
    }

    match nearest_year(table.years(), exam_year).and_then(|year| Some((year, table.rows_for(year)?))) {
        Some((used, rows)) => ResolvedBoundaries {
            source: BoundarySource::NearestYear {
                requested: exam_year,
                used,
            },
            rows,
        },
        None => generic(),
    }
}

fn generic() -> ResolvedBoundaries<'static> {
    ResolvedBoundaries {
        source: BoundarySource::Generic,
        rows: &GENERIC_CUTOFFS,
    }
}

/// First level, from 5** down, whose threshold `percentage` meets.
pub fn classify(rows: &[BoundaryRow], percentage: f64) -> Estimate {
    rows.iter()
        .find(|row| percentage >= row.minimum_percentage)
        .map_or(Estimate::Unclassified, |row| Estimate::Level(row.level))
}

/// Estimated level for a percentage score. Out-of-range percentages are not rejected.
pub fn estimate_grade(
    subject: &str,
    percentage: f64,
    store: &CutoffStore,
    exam_year: Option<i32>,
) -> Estimate {
    let year = exam_year.unwrap_or_else(current_exam_year);
    let resolved = resolve_boundaries(store, subject, year);
    classify(resolved.rows, percentage)
}
