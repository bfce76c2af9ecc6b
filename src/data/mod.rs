pub mod connectors;
pub mod dates;
pub mod index;
pub mod tables;

pub use connectors::{CsvConnector, DataValidator, DatasetMetadata, TableKind};
pub use index::MeasurementIndex;
pub use tables::{EntityTable, MeasurementTable};
