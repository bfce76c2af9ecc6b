mod csv;
mod types;
mod validator;

pub use csv::CsvConnector;
pub use types::{DatasetMetadata, TableKind};
pub use validator::DataValidator;
