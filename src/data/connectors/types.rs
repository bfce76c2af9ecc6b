use serde::{Deserialize, Serialize};

/// The two input tables the pipeline reads
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TableKind {
    Entity,
    Measurement,
}

impl TableKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Entity => "entity",
            Self::Measurement => "measurement",
        }
    }
}

/// Metadata about a loaded CSV table
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatasetMetadata {
    pub file_path: String,
    pub kind: TableKind,
    pub num_rows: usize,
    pub num_columns: usize,
    pub columns: Vec<String>,
    pub null_counts: Vec<(String, usize)>,
}
