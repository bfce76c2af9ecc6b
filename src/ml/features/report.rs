use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Why an entity produced no sample
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RejectionReason {
    /// No measurements at all for the entity's country
    UnknownCountry,
    /// Fewer or more than `window_size * n_features` observations in the window
    IncompleteWindow,
    /// The window holds a null value
    NullValue,
    /// Features observed on different dates
    MisalignedDates,
    /// Complete window but null label
    MissingLabel,
}

/// Accepted and rejected entity counts from one windowing pass
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AcceptanceReport {
    pub total: usize,
    pub accepted: usize,
    pub rejected: BTreeMap<RejectionReason, usize>,
}

impl AcceptanceReport {
    pub fn record_accepted(&mut self) {
        self.total += 1;
        self.accepted += 1;
    }

    pub fn record_rejected(&mut self, reason: RejectionReason) {
        self.total += 1;
        *self.rejected.entry(reason).or_insert(0) += 1;
    }

    pub fn rejected_count(&self) -> usize {
        self.rejected.values().sum()
    }

    pub fn rejected_for(&self, reason: RejectionReason) -> usize {
        self.rejected.get(&reason).copied().unwrap_or(0)
    }

    pub fn acceptance_rate(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            (self.accepted as f64 / self.total as f64) * 100.0
        }
    }
}
