use super::level::BoundaryRow;
use serde::Serialize;
use std::collections::BTreeMap;

/// Year under which year-less legacy tables are stored.
pub const LEGACY_YEAR: i32 = 0;

pub(crate) fn normalize_subject(code: &str) -> String {
    code.trim().to_uppercase()
}

/// Boundary lists for one subject, keyed by exam year.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct SubjectBoundaryTable {
    years: BTreeMap<i32, Vec<BoundaryRow>>,
}

impl SubjectBoundaryTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wraps a year-less boundary list under [`LEGACY_YEAR`].
    pub fn legacy(rows: Vec<BoundaryRow>) -> Self {
        let mut table = Self::new();
        table.insert(LEGACY_YEAR, rows);
        table
    }

    pub fn insert(&mut self, year: i32, rows: Vec<BoundaryRow>) {
        self.years.insert(year, rows);
    }

    pub fn rows_for(&self, year: i32) -> Option<&[BoundaryRow]> {
        self.years.get(&year).map(Vec::as_slice)
    }

    pub fn contains_year(&self, year: i32) -> bool {
        self.years.contains_key(&year)
    }

    /// Ascending.
    pub fn years(&self) -> impl Iterator<Item = i32> + '_ {
        self.years.keys().copied()
    }

    pub fn is_empty(&self) -> bool {
        self.years.is_empty()
    }

    pub fn is_legacy(&self) -> bool {
        self.years.len() == 1 && self.years.contains_key(&LEGACY_YEAR)
    }
}

/// Resolved subject -> year -> boundary list structure. Built once, read-only afterwards.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct CutoffStore {
    subjects: BTreeMap<String, SubjectBoundaryTable>,
}

impl CutoffStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_rows(&mut self, subject: &str, year: i32, rows: Vec<BoundaryRow>) {
        self.subjects
            .entry(normalize_subject(subject))
            .or_default()
            .insert(year, rows);
    }

    pub fn insert_table(&mut self, subject: &str, table: SubjectBoundaryTable) {
        self.subjects.insert(normalize_subject(subject), table);
    }

    /// Registers a subject with no years yet. Lookups treat it as absent data.
    pub(crate) fn ensure_subject(&mut self, subject: &str) {
        self.subjects.entry(normalize_subject(subject)).or_default();
    }

    pub fn subject(&self, code: &str) -> Option<&SubjectBoundaryTable> {
        self.subjects.get(&normalize_subject(code))
    }

    pub fn subjects(&self) -> impl Iterator<Item = (&str, &SubjectBoundaryTable)> {
        self.subjects
            .iter()
            .map(|(code, table)| (code.as_str(), table))
    }

    pub fn years(&self, code: &str) -> Vec<i32> {
        self.subject(code)
            .map(|table| table.years().collect())
            .unwrap_or_default()
    }

    pub fn is_empty(&self) -> bool {
        self.subjects.is_empty()
    }

    pub fn len(&self) -> usize {
        self.subjects.len()
    }

    /// Unions `other` into `self`. For the same subject and year, `other` wins.
    pub fn merge(&mut self, other: CutoffStore) {
        for (code, table) in other.subjects {
            let target = self.subjects.entry(code).or_default();
            for (year, rows) in table.years {
                target.years.insert(year, rows);
            }
        }
    }
}
