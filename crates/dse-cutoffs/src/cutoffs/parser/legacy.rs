use crate::cutoffs::level::{sort_canonical, BoundaryRow, GradeLevel};
use crate::cutoffs::store::{CutoffStore, SubjectBoundaryTable};
use regex::Regex;
use std::collections::BTreeMap;
use std::sync::OnceLock;
use tracing::debug;

fn heading_pattern() -> &'static Regex {
    static HEADING: OnceLock<Regex> = OnceLock::new();
    HEADING.get_or_init(|| Regex::new(r"^##\s+.+\(([^)]+)\)\s*$").expect("valid legacy heading"))
}

fn row_pattern() -> &'static Regex {
    static ROW: OnceLock<Regex> = OnceLock::new();
    ROW.get_or_init(|| {
        Regex::new(r"^\s*\|\s*(5\*\*|5\*|5|4|3|2|1)\s*\|\s*([0-9]+(?:\.[0-9]+)?)\s*\|")
            .expect("valid legacy row")
    })
}

fn parse_row(line: &str) -> Option<BoundaryRow> {
    let caps = row_pattern().captures(line)?;
    let level = caps.get(1)?.as_str().parse::<GradeLevel>().ok()?;
    let minimum_percentage = caps.get(2)?.as_str().parse::<f64>().ok()?;
    Some(BoundaryRow::new(level, minimum_percentage))
}

/// Parses `## <name> (<CODE>)` sections of year-less `| level | pct |` rows.
///
/// Each subject's list is stored under [`crate::cutoffs::LEGACY_YEAR`].
pub fn parse(text: &str) -> CutoffStore {
    let mut flat: BTreeMap<String, Vec<BoundaryRow>> = BTreeMap::new();
    let mut current: Option<String> = None;

    for line in text.lines() {
        if let Some(caps) = heading_pattern().captures(line) {
            current = caps
                .get(1)
                .map(|m| m.as_str().trim().to_uppercase())
                .filter(|code| !code.is_empty());
            if let Some(code) = &current {
                flat.entry(code.clone()).or_default();
            }
            continue;
        }

        let Some(code) = &current else {
            continue;
        };

        match parse_row(line) {
            Some(row) => flat.entry(code.clone()).or_default().push(row),
            None if line.trim_start().starts_with('|') => {
                debug!(subject = %code, line = line.trim(), "skipping legacy table line")
            }
            None => {}
        }
    }

    let mut store = CutoffStore::new();
    for (code, mut rows) in flat {
        if rows.is_empty() {
            continue;
        }
        sort_canonical(&mut rows);
        store.insert_table(&code, SubjectBoundaryTable::legacy(rows));
    }
    store
}
