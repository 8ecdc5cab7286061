//! Line-oriented scanners for the three boundary document layouts.
//!
//! None of the parsers fail: a line that does not look like a heading or a
//! data row is skipped and scanning continues.

pub mod compulsory;
pub mod elective;
pub mod legacy;

use super::level::{sort_canonical, BoundaryRow, GradeLevel};
use super::store::CutoffStore;
use regex::Regex;
use std::ops::RangeInclusive;
use std::sync::OnceLock;
use tracing::debug;

/// Grade columns of a year row, left to right, after the year and full-mark cells.
const LEVEL_COLUMNS: [GradeLevel; 6] = [
    GradeLevel::FiveStarStar,
    GradeLevel::FiveStar,
    GradeLevel::Five,
    GradeLevel::Four,
    GradeLevel::Three,
    GradeLevel::Two,
];

/// Cells before the first grade column: leading pipe, year, full mark.
const FIRST_LEVEL_CELL: usize = 3;

pub const YEAR_RANGE: RangeInclusive<i32> = 2012..=2030;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentFormat {
    /// `## 1. 中國語文` sections keyed by a fixed ordinal table.
    Compulsory,
    /// `### Physics` sections keyed by the heading text.
    Elective,
    /// `## Subject (CODE)` sections with one year-less table each.
    Legacy,
}

impl DocumentFormat {
    /// Picks the parser for the primary document. Both signatures must open the text.
    pub fn sniff_primary(text: &str) -> Self {
        static SIGNATURE: OnceLock<Regex> = OnceLock::new();
        let signature = SIGNATURE.get_or_init(|| {
            Regex::new(r"\A(?:# HKDSE 歷年 Cut-Off|##\s+1\.\s+中國語文)")
                .expect("valid compulsory signature")
        });

        if signature.is_match(text) {
            DocumentFormat::Compulsory
        } else {
            DocumentFormat::Legacy
        }
    }

    /// True when the title or a `### Physics` heading appears anywhere in `text`.
    pub fn is_elective_document(text: &str) -> bool {
        static SIGNATURE: OnceLock<Regex> = OnceLock::new();
        let signature = SIGNATURE.get_or_init(|| {
            Regex::new(r"HKDSE Historical Cut-Off|### Physics")
                .expect("valid elective signature")
        });
        signature.is_match(text)
    }

    pub fn parse(self, text: &str) -> CutoffStore {
        match self {
            DocumentFormat::Compulsory => compulsory::parse(text),
            DocumentFormat::Elective => elective::parse(text),
            DocumentFormat::Legacy => legacy::parse(text),
        }
    }
}

/// Extracts the percentage from a cell such as `470 (71%)`.
///
/// Dashes, `N/A` and empty cells mean "no boundary published".
pub(crate) fn parse_percentage_cell(cell: &str) -> Option<f64> {
    static PERCENTAGE: OnceLock<Regex> = OnceLock::new();

    let trimmed = cell.trim();
    if trimmed.is_empty()
        || matches!(trimmed, "-" | "—" | "–")
        || trimmed.eq_ignore_ascii_case("n/a")
    {
        return None;
    }

    let pattern =
        PERCENTAGE.get_or_init(|| Regex::new(r"\((\d+)%\)").expect("valid percentage pattern"));
    pattern
        .captures(trimmed)
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse::<f64>().ok())
}

/// Parses `| 2023 | 300 | 250 (83%) | ... |` into a year and its boundaries.
///
/// Returns `None` for anything that is not a year row, for years outside
/// [`YEAR_RANGE`], and for rows where no grade column carries a percentage.
pub(crate) fn parse_year_row(line: &str) -> Option<(i32, Vec<BoundaryRow>)> {
    static YEAR_ROW: OnceLock<Regex> = OnceLock::new();
    let pattern =
        YEAR_ROW.get_or_init(|| Regex::new(r"^\s*\|\s*(\d{4})\s*\|").expect("valid row pattern"));
    if !pattern.is_match(line) {
        return None;
    }

    let cells: Vec<&str> = line.trim().split('|').map(str::trim).collect();
    if cells.len() < FIRST_LEVEL_CELL {
        return None;
    }

    let year = cells[1].parse::<i32>().ok()?;
    if !YEAR_RANGE.contains(&year) {
        debug!(year, "skipping boundary row outside the supported year range");
        return None;
    }

    let mut rows: Vec<BoundaryRow> = LEVEL_COLUMNS
        .iter()
        .enumerate()
        .filter_map(|(offset, &level)| {
            let cell = cells.get(FIRST_LEVEL_CELL + offset).copied().unwrap_or("");
            parse_percentage_cell(cell).map(|pct| BoundaryRow::new(level, pct))
        })
        .collect();

    if rows.is_empty() {
        debug!(year, "skipping boundary row without any percentage cells");
        return None;
    }

    sort_canonical(&mut rows);
    Some((year, rows))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn percentage_cell_extracts_parenthesised_value() {
        assert_eq!(parse_percentage_cell("470 (71%)"), Some(71.0));
        assert_eq!(parse_percentage_cell("   98 ( 3%)  "), None);
        assert_eq!(parse_percentage_cell("  98 (3%)  "), Some(3.0));
        assert_eq!(parse_percentage_cell("—"), None);
        assert_eq!(parse_percentage_cell("-"), None);
        assert_eq!(parse_percentage_cell("N/A"), None);
        assert_eq!(parse_percentage_cell("n/a"), None);
        assert_eq!(parse_percentage_cell(""), None);
        assert_eq!(parse_percentage_cell("470"), None);
    }

    #[test]
    fn year_row_keeps_valid_columns_when_others_are_missing() {
        let (year, rows) =
            parse_year_row("| 2019 | 300 | 255 (85%) | N/A | 200 (67%) | — | junk | 90 (30%) |")
                .expect("row parses");
        assert_eq!(year, 2019);
        assert_eq!(
            rows,
            vec![
                BoundaryRow::new(GradeLevel::FiveStarStar, 85.0),
                BoundaryRow::new(GradeLevel::Five, 67.0),
                BoundaryRow::new(GradeLevel::Two, 30.0),
            ]
        );
    }

    #[test]
    fn year_row_tolerates_surrounding_whitespace() {
        let (year, rows) = parse_year_row("   |   2021   |  300  |   240 (80%)   |")
            .expect("row parses");
        assert_eq!(year, 2021);
        assert_eq!(rows, vec![BoundaryRow::new(GradeLevel::FiveStarStar, 80.0)]);
    }

    #[test]
    fn year_row_rejects_out_of_range_and_empty_rows() {
        assert!(parse_year_row("| 1999 | 300 | 255 (85%) |").is_none());
        assert!(parse_year_row("| 2031 | 300 | 255 (85%) |").is_none());
        assert!(parse_year_row("| 2020 | 300 | — | — | N/A |").is_none());
        assert!(parse_year_row("| 年份 | 滿分 | 5** |").is_none());
        assert!(parse_year_row("|------|------|-----|").is_none());
        assert!(parse_year_row("2020 | 300 | 255 (85%) |").is_none());
    }

    #[test]
    fn sniffing_recognises_each_layout() {
        assert_eq!(
            DocumentFormat::sniff_primary("# HKDSE 歷年 Cut-Off 整理\n"),
            DocumentFormat::Compulsory
        );
        assert_eq!(
            DocumentFormat::sniff_primary("## 1. 中國語文\n| 2020 |"),
            DocumentFormat::Compulsory
        );
        assert_eq!(
            DocumentFormat::sniff_primary("# Cutoffs\n## English (ENG)\n| 5** | 85 |"),
            DocumentFormat::Legacy
        );
        assert!(DocumentFormat::is_elective_document(
            "# HKDSE Historical Cut-Off (Electives)"
        ));
        assert!(DocumentFormat::is_elective_document("notes\n### Physics 物理\n"));
        assert!(!DocumentFormat::is_elective_document("## Physics (PHY)"));
    }

    #[test]
    fn compulsory_signature_must_open_the_document() {
        assert_eq!(
            DocumentFormat::sniff_primary("intro\n\n## 1. 中國語文\n| 2020 |"),
            DocumentFormat::Legacy
        );
        assert_eq!(
            DocumentFormat::sniff_primary("notes\n# HKDSE 歷年 Cut-Off 整理\n"),
            DocumentFormat::Legacy
        );
    }

    #[test]
    fn elective_signature_matches_anywhere_in_a_line() {
        assert!(DocumentFormat::is_elective_document("intro ### Physics 物理"));
        assert!(DocumentFormat::is_elective_document("  #### Physics\n"));
        assert!(DocumentFormat::is_elective_document("see HKDSE Historical Cut-Off tables"));
    }
}
