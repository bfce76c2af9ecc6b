use crate::config::{EntityColumns, MeasurementColumns};
use crate::error::{CountrysplitError, Result};
use polars::prelude::*;
use std::path::Path;
use super::{
    types::{DatasetMetadata, TableKind},
    validator::DataValidator,
};

pub struct CsvConnector;

impl CsvConnector {
    /// Load CSV file into DataFrame
    pub fn load<P: AsRef<Path>>(path: P) -> Result<DataFrame> {
        let df = CsvReadOptions::default()
            .with_has_header(true)
            .try_into_reader_with_file_path(Some(path.as_ref().to_path_buf()))?
            .finish()
            .map_err(|e| CountrysplitError::DataLoading(format!("Failed to read CSV: {}", e)))?;

        Ok(df)
    }

    /// Load and validate the entity table
    pub fn load_entities<P: AsRef<Path>>(
        path: P,
        columns: &EntityColumns,
        label_column: &str,
    ) -> Result<DataFrame> {
        let df = Self::load(&path)?;
        DataValidator::validate_entities(&df, columns, label_column)?;
        DataValidator::validate_minimum_rows(&df, 1)?;
        Self::log_metadata(&path, TableKind::Entity, &df);
        Ok(df)
    }

    /// Load and validate the measurement table
    pub fn load_measurements<P: AsRef<Path>>(
        path: P,
        columns: &MeasurementColumns,
    ) -> Result<DataFrame> {
        let df = Self::load(&path)?;
        DataValidator::validate_measurements(&df, columns)?;
        Self::log_metadata(&path, TableKind::Measurement, &df);
        Ok(df)
    }

    /// Create metadata for a loaded DataFrame
    pub fn create_metadata<P: AsRef<Path>>(path: P, kind: TableKind, df: &DataFrame) -> DatasetMetadata {
        DatasetMetadata {
            file_path: path.as_ref().to_string_lossy().to_string(),
            kind,
            num_rows: df.height(),
            num_columns: df.width(),
            columns: df.get_column_names().iter().map(|s| s.to_string()).collect(),
            null_counts: DataValidator::check_nulls(df),
        }
    }

    fn log_metadata<P: AsRef<Path>>(path: P, kind: TableKind, df: &DataFrame) {
        let metadata = Self::create_metadata(path, kind, df);
        log::info!(
            "Loaded {} table {} ({} rows, {} columns)",
            kind.as_str(),
            metadata.file_path,
            metadata.num_rows,
            metadata.num_columns
        );
        // Nulls are tolerated here; the window filter rejects what they break
        if !metadata.null_counts.is_empty() {
            log::warn!("Null values detected: {:?}", metadata.null_counts);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_temp(name: &str, contents: &str) -> std::path::PathBuf {
        let path = std::env::temp_dir().join(format!("countrysplit_{}_{}.csv", name, std::process::id()));
        std::fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn test_load_entities() {
        let path = write_temp(
            "entities",
            "id,country,date,label\n1,FR,2020-05-01,0\n2,DE,2020-06-01,1\n",
        );

        let df = CsvConnector::load_entities(&path, &EntityColumns::default(), "label").unwrap();
        assert_eq!(df.height(), 2);

        let metadata = CsvConnector::create_metadata(&path, TableKind::Entity, &df);
        assert_eq!(metadata.num_columns, 4);
        assert!(metadata.null_counts.is_empty());

        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn test_load_measurements_missing_column() {
        let path = write_temp(
            "measurements",
            "country,measure,date\nFR,temp,2020-01-01\n",
        );

        let result = CsvConnector::load_measurements(&path, &MeasurementColumns::default());
        assert!(matches!(result, Err(CountrysplitError::DataLoading(_))));

        std::fs::remove_file(&path).ok();
    }
}
