use super::parse_year_row;
use crate::cutoffs::store::CutoffStore;
use regex::Regex;
use std::sync::OnceLock;
use tracing::debug;

/// Section ordinal -> subject code for the core subjects document.
const SECTION_CODES: &[(u32, &str)] = &[
    (1, "CHI"),
    (2, "ENG"),
    (3, "MATH"),
    (4, "CHEM"),
    (5, "BIO"),
];

pub(crate) fn code_for_section(ordinal: u32) -> Option<&'static str> {
    SECTION_CODES
        .iter()
        .find(|(section, _)| *section == ordinal)
        .map(|(_, code)| *code)
}

fn heading_pattern() -> &'static Regex {
    static HEADING: OnceLock<Regex> = OnceLock::new();
    HEADING.get_or_init(|| Regex::new(r"^##\s+(\d+)\.\s+\S").expect("valid section heading"))
}

/// Parses a `## <n>. <subject>` sectioned document of per-year boundary rows.
pub fn parse(text: &str) -> CutoffStore {
    let mut store = CutoffStore::new();
    let mut current: Option<&'static str> = None;

    for line in text.lines() {
        if let Some(caps) = heading_pattern().captures(line) {
            current = caps
                .get(1)
                .and_then(|m| m.as_str().parse::<u32>().ok())
                .and_then(code_for_section);
            match current {
                Some(code) => store.ensure_subject(code),
                None => debug!(heading = line.trim(), "ignoring unknown compulsory section"),
            }
            continue;
        }

        let Some(code) = current else {
            continue;
        };

        if let Some((year, rows)) = parse_year_row(line) {
            store.insert_rows(code, year, rows);
        }
    }

    store
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cutoffs::level::{BoundaryRow, GradeLevel};

    const SAMPLE: &str = "\
# HKDSE 歷年 Cut-Off

## 2. 英國語文 English Language

| 年份 | 滿分 | 5** | 5* | 5 | 4 | 3 | 2 |
|------|------|-----|----|---|---|---|---|
| 2023 | 100 | 84 (84%) | 76 (76%) | 67 (67%) | 55 (55%) | 42 (42%) | 29 (29%) |
| 2022 | 100 | 85 (85%) | — | 68 (68%) | 56 (56%) | N/A | 30 (30%) |

## 9. 公民與社會發展

| 2023 | 100 | 90 (90%) |

## 3. 數學 Mathematics

| 2023 | 105 | 90 (86%) | 80 (76%) |
| 1990 | 105 | 90 (86%) | 80 (76%) |
";

    #[test]
    fn sections_map_to_fixed_subject_codes() {
        let store = parse(SAMPLE);
        assert_eq!(store.len(), 2);
        assert_eq!(store.years("ENG"), vec![2022, 2023]);
        assert_eq!(store.years("MATH"), vec![2023]);
    }

    #[test]
    fn rows_under_unknown_sections_are_dropped() {
        let store = parse(SAMPLE);
        assert!(store.subject("CS").is_none());
        let eng_2023 = store
            .subject("ENG")
            .and_then(|table| table.rows_for(2023))
            .expect("2023 rows");
        assert_eq!(eng_2023.len(), 6);
    }

    #[test]
    fn missing_cells_are_skipped_without_losing_the_row() {
        let store = parse(SAMPLE);
        let eng_2022 = store
            .subject("ENG")
            .and_then(|table| table.rows_for(2022))
            .expect("2022 rows");
        assert_eq!(
            eng_2022,
            &[
                BoundaryRow::new(GradeLevel::FiveStarStar, 85.0),
                BoundaryRow::new(GradeLevel::Five, 68.0),
                BoundaryRow::new(GradeLevel::Four, 56.0),
                BoundaryRow::new(GradeLevel::Two, 30.0),
            ]
        );
    }

    #[test]
    fn rows_before_any_heading_are_ignored() {
        let store = parse("| 2023 | 100 | 84 (84%) |\n");
        assert!(store.is_empty());
    }

    #[test]
    fn known_heading_without_rows_still_registers_subject() {
        let store = parse("## 5. 生物 Biology\n\nno table yet\n");
        assert_eq!(store.len(), 1);
        assert!(store.subject("BIO").expect("registered").is_empty());
    }
}
