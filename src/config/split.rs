use super::traits::ConfigSection;
use crate::engines::splitting::SplitRatios;
use crate::error::CountrysplitError;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SplitConfig {
    pub train_ratio: f64,
    pub val_ratio: f64,
    pub test_ratio: f64,
    /// `None` draws the shuffling seed from entropy
    pub seed: Option<u64>,
    pub rebalance: RebalancePolicy,
    pub duplicate_ids: DuplicateIdPolicy,
    /// Warn instead of failing when a split with a non-zero ratio gets no country
    pub allow_empty_splits: bool,
}

/// How oversized groups hand rows to the other splits
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RebalancePolicy {
    /// Never move anything; splits stay country-exclusive and ratios drift
    CountryExclusive,
    /// Move whole countries; splits stay country-exclusive
    CountryLevel,
    /// Move individual rows; countries can leak across splits
    RowLevel,
}

/// What the index resolver does with repeated ids in the master list
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DuplicateIdPolicy {
    /// Only the first occurrence of an id is reachable
    FirstMatch,
    /// A repeated id is a configuration error
    Reject,
}

impl Default for SplitConfig {
    fn default() -> Self {
        Self {
            train_ratio: 0.6,
            val_ratio: 0.2,
            test_ratio: 0.2,
            seed: Some(42),
            rebalance: RebalancePolicy::CountryLevel,
            duplicate_ids: DuplicateIdPolicy::FirstMatch,
            allow_empty_splits: false,
        }
    }
}

impl SplitConfig {
    pub fn ratios(&self) -> SplitRatios {
        SplitRatios::new(self.train_ratio, self.val_ratio, self.test_ratio)
    }
}

impl ConfigSection for SplitConfig {
    fn section_name() -> &'static str {
        "split"
    }

    fn validate(&self) -> Result<(), CountrysplitError> {
        self.ratios().validate()
    }
}
