pub mod config;
pub mod data;
pub mod engines;
pub mod error;
pub mod ml;
pub mod types;

pub use config::AppConfig;
pub use engines::{SplitOrchestrator, SplitOutput, SplitReport, SplitTriple};
pub use error::{CountrysplitError, Result};
pub use types::{EntityId, EntityRecord, Label, MeasurementRecord, SplitTag};
