use crate::config::{EntityColumns, MeasurementColumns};
use crate::error::{CountrysplitError, Result};
use polars::prelude::*;
use super::types::TableKind;

pub struct DataValidator;

impl DataValidator {
    /// Validate that the entity table has its id, country, date and label columns
    pub fn validate_entities(df: &DataFrame, columns: &EntityColumns, label_column: &str) -> Result<()> {
        Self::require_columns(
            df,
            TableKind::Entity,
            &[
                &columns.id_column,
                &columns.country_column,
                &columns.month_column,
                label_column,
            ],
        )
    }

    /// Validate that the measurement table has its four long-format columns,
    /// with a numeric value column
    pub fn validate_measurements(df: &DataFrame, columns: &MeasurementColumns) -> Result<()> {
        Self::require_columns(
            df,
            TableKind::Measurement,
            &[
                &columns.country_column,
                &columns.measure_column,
                &columns.date_column,
                &columns.value_column,
            ],
        )?;

        let value = df.column(&columns.value_column)?;
        if !matches!(
            value.dtype(),
            DataType::Float64
                | DataType::Float32
                | DataType::Int64
                | DataType::Int32
                | DataType::Int16
                | DataType::Int8
                | DataType::UInt64
                | DataType::UInt32
                | DataType::UInt16
                | DataType::UInt8
                | DataType::Null
        ) {
            return Err(CountrysplitError::DataLoading(format!(
                "Measurement column '{}' must be numeric, found {:?}",
                columns.value_column,
                value.dtype()
            )));
        }
        Ok(())
    }

    fn require_columns(df: &DataFrame, kind: TableKind, required: &[&str]) -> Result<()> {
        let present = df.get_column_names();
        for name in required {
            if !present.iter().any(|col| col.as_str() == *name) {
                return Err(CountrysplitError::DataLoading(format!(
                    "Missing required {} column: {} (found {:?})",
                    kind.as_str(),
                    name,
                    present.iter().map(|c| c.as_str()).collect::<Vec<_>>()
                )));
            }
        }
        Ok(())
    }

    /// Check for minimum required rows
    pub fn validate_minimum_rows(df: &DataFrame, min_rows: usize) -> Result<()> {
        if df.height() < min_rows {
            return Err(CountrysplitError::DataLoading(format!(
                "Insufficient data: {} rows, minimum {} required",
                df.height(),
                min_rows
            )));
        }
        Ok(())
    }

    /// Null counts per column, only for columns that have any
    pub fn check_nulls(df: &DataFrame) -> Vec<(String, usize)> {
        df.get_columns()
            .iter()
            .filter(|col| col.null_count() > 0)
            .map(|col| (col.name().to_string(), col.null_count()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use polars::df;

    #[test]
    fn test_validate_good_entities() {
        let df = df! {
            "id" => &[1i64, 2],
            "country" => &["FR", "DE"],
            "date" => &["2020-05-01", "2020-06-01"],
            "label" => &[0i64, 1],
        }
        .unwrap();

        assert!(DataValidator::validate_entities(&df, &EntityColumns::default(), "label").is_ok());
    }

    #[test]
    fn test_missing_label_column() {
        let df = df! {
            "id" => &[1i64, 2],
            "country" => &["FR", "DE"],
            "date" => &["2020-05-01", "2020-06-01"],
        }
        .unwrap();

        let result = DataValidator::validate_entities(&df, &EntityColumns::default(), "label");
        assert!(matches!(result, Err(CountrysplitError::DataLoading(_))));
    }

    #[test]
    fn test_non_numeric_values() {
        let df = df! {
            "country" => &["FR"],
            "measure" => &["temp"],
            "date" => &["2020-01-01"],
            "value" => &["warm"],
        }
        .unwrap();

        let result = DataValidator::validate_measurements(&df, &MeasurementColumns::default());
        assert!(result.is_err());
    }

    #[test]
    fn test_null_report() {
        let df = df! {
            "value" => &[Some(1.0), None, None],
            "measure" => &["a", "b", "c"],
        }
        .unwrap();

        assert_eq!(DataValidator::check_nulls(&df), vec![("value".to_string(), 2)]);
    }
}
