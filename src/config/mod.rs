pub mod traits;
pub mod columns;
pub mod split;
pub mod features;
pub mod manager;

pub use manager::{AppConfig, ConfigManager};
pub use columns::{ColumnConfig, EntityColumns, MeasurementColumns};
pub use split::{DuplicateIdPolicy, RebalancePolicy, SplitConfig};
pub use features::FeatureConfig;
pub use traits::ConfigSection;
