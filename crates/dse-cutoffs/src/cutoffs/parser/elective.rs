use super::parse_year_row;
use crate::cutoffs::store::CutoffStore;
use regex::Regex;
use std::sync::OnceLock;
use tracing::debug;

/// Heading prefix -> subject code. Longer names precede names that prefix them.
const ELECTIVE_CODES: &[(&str, &str)] = &[
    ("CHINESE HISTORY", "CHIST"),
    ("CHINESE LITERATURE", "CHILIT"),
    ("PHYSICS", "PHY"),
    ("ECONOMICS", "ECON"),
    ("BAFS", "BAFS"),
    ("HISTORY", "HIST"),
    ("GEOGRAPHY", "GEOG"),
    ("ICT", "ICT"),
    ("M1", "M1"),
    ("M2", "M2"),
];

fn is_cjk(c: char) -> bool {
    ('\u{4e00}'..='\u{9fff}').contains(&c)
}

/// Resolves a heading such as `Physics (Paper 1+2) 物理` to its code.
pub(crate) fn code_for_heading(heading: &str) -> Option<&'static str> {
    static TRAILING_PAREN: OnceLock<Regex> = OnceLock::new();
    let trailing_paren = TRAILING_PAREN
        .get_or_init(|| Regex::new(r"\s*\([^)]*\)\s*$").expect("valid parenthetical pattern"));

    let latin = heading.split(is_cjk).next().unwrap_or("").trim();
    let normalized = trailing_paren.replace(latin, "").trim().to_uppercase();

    ELECTIVE_CODES
        .iter()
        .find(|(name, _)| {
            normalized == *name
                || normalized
                    .strip_prefix(name)
                    .is_some_and(|rest| rest.starts_with(' '))
        })
        .map(|(_, code)| *code)
}

fn heading_pattern() -> &'static Regex {
    static HEADING: OnceLock<Regex> = OnceLock::new();
    HEADING.get_or_init(|| Regex::new(r"^###\s+(.+)$").expect("valid elective heading"))
}

/// Parses a `### <subject>` sectioned document of per-year boundary rows.
pub fn parse(text: &str) -> CutoffStore {
    let mut store = CutoffStore::new();
    let mut current: Option<&'static str> = None;

    for line in text.lines() {
        if let Some(caps) = heading_pattern().captures(line) {
            current = caps.get(1).and_then(|m| code_for_heading(m.as_str()));
            match current {
                Some(code) => store.ensure_subject(code),
                None => debug!(heading = line.trim(), "ignoring unknown elective heading"),
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
