pub mod report;
pub mod tensor;
pub mod window;

pub use report::{AcceptanceReport, RejectionReason};
pub use tensor::FeatureTensor;
pub use window::{FeatureSet, WindowedFeatureBuilder};
