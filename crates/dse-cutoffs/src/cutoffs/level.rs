use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

/// HKDSE exam level, declared highest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GradeLevel {
    FiveStarStar,
    FiveStar,
    Five,
    Four,
    Three,
    Two,
    One,
}

impl GradeLevel {
    /// Canonical order: 5** down to 1.
    pub const ALL: [GradeLevel; 7] = [
        GradeLevel::FiveStarStar,
        GradeLevel::FiveStar,
        GradeLevel::Five,
        GradeLevel::Four,
        GradeLevel::Three,
        GradeLevel::Two,
        GradeLevel::One,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            GradeLevel::FiveStarStar => "5**",
            GradeLevel::FiveStar => "5*",
            GradeLevel::Five => "5",
            GradeLevel::Four => "4",
            GradeLevel::Three => "3",
            GradeLevel::Two => "2",
            GradeLevel::One => "1",
        }
    }

    /// Position in [`GradeLevel::ALL`]; 0 is the top level.
    pub fn rank(self) -> usize {
        self as usize
    }
}

impl fmt::Display for GradeLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("'{0}' is not an HKDSE level")]
pub struct ParseLevelError(pub String);

impl FromStr for GradeLevel {
    type Err = ParseLevelError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let trimmed = value.trim();
        GradeLevel::ALL
            .into_iter()
            .find(|level| level.as_str() == trimmed)
            .ok_or_else(|| ParseLevelError(trimmed.to_string()))
    }
}

impl Serialize for GradeLevel {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for GradeLevel {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// Outcome of estimating a score: a level, or below every threshold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Estimate {
    Level(GradeLevel),
    Unclassified,
}

impl Estimate {
    pub const UNCLASSIFIED: &'static str = "U";

    pub fn as_str(self) -> &'static str {
        match self {
            Estimate::Level(level) => level.as_str(),
            Estimate::Unclassified => Self::UNCLASSIFIED,
        }
    }
}

impl fmt::Display for Estimate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Estimate {
    type Err = ParseLevelError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        if value.trim() == Self::UNCLASSIFIED {
            return Ok(Estimate::Unclassified);
        }
        value.parse().map(Estimate::Level)
    }
}

/// Better estimates compare greater: `5**` is the maximum, `U` the minimum.
impl Ord for Estimate {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Estimate::Unclassified, Estimate::Unclassified) => Ordering::Equal,
            (Estimate::Unclassified, Estimate::Level(_)) => Ordering::Less,
            (Estimate::Level(_), Estimate::Unclassified) => Ordering::Greater,
            (Estimate::Level(a), Estimate::Level(b)) => b.rank().cmp(&a.rank()),
        }
    }
}

impl PartialOrd for Estimate {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Serialize for Estimate {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Estimate {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// Minimum percentage needed for `level`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundaryRow {
    pub level: GradeLevel,
    pub minimum_percentage: f64,
}

impl BoundaryRow {
    pub const fn new(level: GradeLevel, minimum_percentage: f64) -> Self {
        Self {
            level,
            minimum_percentage,
        }
    }
}

/// Stable sort into 5** -> 1 order.
pub fn sort_canonical(rows: &mut [BoundaryRow]) {
    rows.sort_by_key(|row| row.level.rank());
}
