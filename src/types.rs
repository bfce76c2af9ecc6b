use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Entity identifier as read from the id column (stringified)
pub type EntityId = String;

/// Binary classifier target
pub type Label = i64;

/// One row of the entity table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityRecord {
    pub id: EntityId,
    pub country: String,
    pub reference_date: NaiveDate,
    pub label: Option<Label>,
}

/// One row of the long-format measurement table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MeasurementRecord {
    pub country: String,
    pub measure: String,
    pub date: NaiveDate,
    pub value: Option<f64>,
}

/// Partition a record ends up in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SplitTag {
    Train,
    Val,
    Test,
}

impl SplitTag {
    pub fn all() -> [Self; 3] {
        [Self::Train, Self::Val, Self::Test]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Train => "train",
            Self::Val => "val",
            Self::Test => "test",
        }
    }

    /// The two other tags, in the order excess rows are handed to them
    pub fn others(&self) -> [Self; 2] {
        match self {
            Self::Train => [Self::Val, Self::Test],
            Self::Val => [Self::Train, Self::Test],
            Self::Test => [Self::Train, Self::Val],
        }
    }

    pub fn index(&self) -> usize {
        match self {
            Self::Train => 0,
            Self::Val => 1,
            Self::Test => 2,
        }
    }
}

impl fmt::Display for SplitTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
