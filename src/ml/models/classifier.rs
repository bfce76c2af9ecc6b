use crate::error::CountrysplitError;
use crate::ml::features::FeatureTensor;
use crate::types::Label;

/// Seam for the external classifier the prepared splits are handed to.
///
/// Implementations wrap an actual learning library; this crate only produces
/// the aligned `(features, labels)` pairs they consume.
pub trait Classifier {
    fn fit(&mut self, features: &FeatureTensor, labels: &[Label]) -> Result<(), CountrysplitError>;

    fn predict(&self, features: &FeatureTensor) -> Result<Vec<Label>, CountrysplitError>;
}

/// Check that a tensor and its labels describe the same samples
pub fn check_training_pair(features: &FeatureTensor, labels: &[Label]) -> Result<(), CountrysplitError> {
    if features.n_samples() != labels.len() {
        return Err(CountrysplitError::Alignment {
            features: features.n_samples(),
            labels: labels.len(),
            ids: labels.len(),
        });
    }
    Ok(())
}
