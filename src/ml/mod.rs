pub mod features;
pub mod models;

pub use features::{AcceptanceReport, FeatureSet, FeatureTensor, RejectionReason, WindowedFeatureBuilder};
pub use models::Classifier;
