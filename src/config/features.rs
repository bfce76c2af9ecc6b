use super::traits::ConfigSection;
use crate::error::CountrysplitError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FeatureConfig {
    /// Months of history per sample
    pub window_size: usize,
    /// Measure names to extract; tensor columns follow their sorted order
    pub desired_features: BTreeSet<String>,
    pub label_column: String,
    /// Look up entity windows on the rayon pool
    pub parallel: bool,
}

impl Default for FeatureConfig {
    fn default() -> Self {
        Self {
            window_size: 3,
            desired_features: BTreeSet::new(),
            label_column: "label".to_string(),
            parallel: true,
        }
    }
}

impl FeatureConfig {
    pub fn new<I, S>(window_size: usize, desired_features: I, label_column: &str) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            window_size,
            desired_features: desired_features.into_iter().map(Into::into).collect(),
            label_column: label_column.to_string(),
            ..Default::default()
        }
    }

    pub fn num_features(&self) -> usize {
        self.desired_features.len()
    }
}

impl FeatureConfig {
    /// Checks that hold for any stored config; the feature list may still be empty
    pub fn validate_settings(&self) -> Result<(), CountrysplitError> {
        if self.window_size == 0 {
            return Err(CountrysplitError::Configuration(
                "Window size must be at least 1".to_string(),
            ));
        }
        if self.label_column.trim().is_empty() {
            return Err(CountrysplitError::Configuration(
                "Label column must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}

impl ConfigSection for FeatureConfig {
    fn section_name() -> &'static str {
        "features"
    }

    /// Full check run before building windows
    fn validate(&self) -> Result<(), CountrysplitError> {
        self.validate_settings()?;
        if self.desired_features.is_empty() {
            return Err(CountrysplitError::Configuration(
                "At least one desired feature is required".to_string(),
            ));
        }
        Ok(())
    }
}
