use crate::error::CountrysplitError;
use crate::types::{EntityRecord, SplitTag};
use serde::{Deserialize, Serialize};

const RATIO_TOLERANCE: f64 = 1e-6;

/// Requested share of rows per split
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SplitRatios {
    pub train: f64,
    pub val: f64,
    pub test: f64,
}

impl SplitRatios {
    pub fn new(train: f64, val: f64, test: f64) -> Self {
        Self { train, val, test }
    }

    pub fn validate(&self) -> Result<(), CountrysplitError> {
        for tag in SplitTag::all() {
            let ratio = self.get(tag);
            if !(0.0..=1.0).contains(&ratio) {
                return Err(CountrysplitError::Configuration(format!(
                    "{} ratio must be between 0 and 1, got {}",
                    tag, ratio
                )));
            }
        }
        let sum = self.train + self.val + self.test;
        if (sum - 1.0).abs() > RATIO_TOLERANCE {
            return Err(CountrysplitError::Configuration(format!(
                "Split ratios must sum to 1, got {}",
                sum
            )));
        }
        Ok(())
    }

    pub fn get(&self, tag: SplitTag) -> f64 {
        match tag {
            SplitTag::Train => self.train,
            SplitTag::Val => self.val,
            SplitTag::Test => self.test,
        }
    }

    /// Row targets for `total` rows; test takes whatever flooring leaves over
    pub fn targets(&self, total: usize) -> SplitTargets {
        let train = (total as f64 * self.train) as usize;
        let val = ((total as f64 * self.val) as usize).min(total - train);
        SplitTargets {
            train,
            val,
            test: total - train - val,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SplitTargets {
    pub train: usize,
    pub val: usize,
    pub test: usize,
}

impl SplitTargets {
    pub fn get(&self, tag: SplitTag) -> usize {
        match tag {
            SplitTag::Train => self.train,
            SplitTag::Val => self.val,
            SplitTag::Test => self.test,
        }
    }

    pub fn total(&self) -> usize {
        self.train + self.val + self.test
    }
}

/// Countries drawn for each split
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CountryAssignment {
    pub train: Vec<String>,
    pub val: Vec<String>,
    pub test: Vec<String>,
}

impl CountryAssignment {
    pub fn get(&self, tag: SplitTag) -> &[String] {
        match tag {
            SplitTag::Train => &self.train,
            SplitTag::Val => &self.val,
            SplitTag::Test => &self.test,
        }
    }

    pub fn tag_of(&self, country: &str) -> Option<SplitTag> {
        SplitTag::all()
            .into_iter()
            .find(|tag| self.get(*tag).iter().any(|c| c == country))
    }

    pub fn len(&self) -> usize {
        self.train.len() + self.val.len() + self.test.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Entity rows currently assigned to one split
#[derive(Debug, Clone, PartialEq)]
pub struct SplitGroup {
    pub tag: SplitTag,
    pub rows: Vec<EntityRecord>,
}

impl SplitGroup {
    pub fn new(tag: SplitTag) -> Self {
        Self { tag, rows: Vec::new() }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn ids(&self) -> Vec<&str> {
        self.rows.iter().map(|r| r.id.as_str()).collect()
    }

    /// Distinct countries in row order
    pub fn countries(&self) -> Vec<String> {
        let mut countries: Vec<String> = Vec::new();
        for row in &self.rows {
            if !countries.contains(&row.country) {
                countries.push(row.country.clone());
            }
        }
        countries
    }
}

/// The three groups, indexable by tag
#[derive(Debug, Clone, PartialEq)]
pub struct SplitGroups {
    groups: [SplitGroup; 3],
}

impl Default for SplitGroups {
    fn default() -> Self {
        Self::new()
    }
}

impl SplitGroups {
    pub fn new() -> Self {
        Self {
            groups: SplitTag::all().map(SplitGroup::new),
        }
    }

    pub fn get(&self, tag: SplitTag) -> &SplitGroup {
        &self.groups[tag.index()]
    }

    pub fn get_mut(&mut self, tag: SplitTag) -> &mut SplitGroup {
        &mut self.groups[tag.index()]
    }

    pub fn sizes(&self) -> SplitTargets {
        SplitTargets {
            train: self.get(SplitTag::Train).len(),
            val: self.get(SplitTag::Val).len(),
            test: self.get(SplitTag::Test).len(),
        }
    }

    pub fn total(&self) -> usize {
        self.groups.iter().map(SplitGroup::len).sum()
    }

    pub fn iter(&self) -> impl Iterator<Item = &SplitGroup> {
        self.groups.iter()
    }
}

/// Ascending positions into a master id list
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SplitIndexSet {
    positions: Vec<usize>,
}

impl SplitIndexSet {
    pub fn new(mut positions: Vec<usize>) -> Self {
        positions.sort_unstable();
        positions.dedup();
        Self { positions }
    }

    pub fn positions(&self) -> &[usize] {
        &self.positions
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    pub fn contains(&self, position: usize) -> bool {
        self.positions.binary_search(&position).is_ok()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SplitIndices {
    pub train: SplitIndexSet,
    pub val: SplitIndexSet,
    pub test: SplitIndexSet,
}

impl SplitIndices {
    pub fn get(&self, tag: SplitTag) -> &SplitIndexSet {
        match tag {
            SplitTag::Train => &self.train,
            SplitTag::Val => &self.val,
            SplitTag::Test => &self.test,
        }
    }

    /// Positions claimed by more than one split
    pub fn overlapping(&self) -> Vec<usize> {
        let mut overlaps: Vec<usize> = self
            .train
            .positions()
            .iter()
            .copied()
            .filter(|p| self.val.contains(*p) || self.test.contains(*p))
            .chain(
                self.val
                    .positions()
                    .iter()
                    .copied()
                    .filter(|p| self.test.contains(*p)),
            )
            .collect();
        overlaps.sort_unstable();
        overlaps.dedup();
        overlaps
    }
}
