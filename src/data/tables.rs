use crate::config::{EntityColumns, MeasurementColumns};
use crate::data::connectors::DataValidator;
use crate::data::dates::column_dates;
use crate::error::{CountrysplitError, Result};
use crate::types::{EntityRecord, MeasurementRecord};
use polars::prelude::*;
use std::collections::{BTreeMap, HashSet};

/// Typed view of the entity table, rows in file order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EntityTable {
    records: Vec<EntityRecord>,
}

impl EntityTable {
    pub fn new(records: Vec<EntityRecord>) -> Self {
        Self { records }
    }

    pub fn from_frame(df: &DataFrame, columns: &EntityColumns, label_column: &str) -> Result<Self> {
        DataValidator::validate_entities(df, columns, label_column)?;

        let ids = string_column(df, &columns.id_column)?;
        let countries = string_column(df, &columns.country_column)?;
        let dates = column_dates(df.column(&columns.month_column)?)?;
        let labels = df.column(label_column)?.cast(&DataType::Int64)?;
        let labels = labels.i64()?;

        let mut records = Vec::with_capacity(df.height());
        for (row, label) in labels.into_iter().enumerate() {
            let id = required(ids[row].clone(), &columns.id_column, row)?;
            let country = required(countries[row].clone(), &columns.country_column, row)?;
            let reference_date = required(dates[row], &columns.month_column, row)?;
            records.push(EntityRecord {
                id,
                country,
                reference_date,
                label,
            });
        }

        log::debug!("Read {} entity rows", records.len());
        Ok(Self { records })
    }

    pub fn records(&self) -> &[EntityRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Keep only rows whose id is in `ids`
    pub fn filter_ids(&self, ids: &HashSet<&str>) -> Self {
        Self {
            records: self
                .records
                .iter()
                .filter(|r| ids.contains(r.id.as_str()))
                .cloned()
                .collect(),
        }
    }

    /// Keep the first row of every id, in file order
    pub fn first_rows(&self) -> Self {
        let mut seen = HashSet::new();
        Self {
            records: self
                .records
                .iter()
                .filter(|r| seen.insert(r.id.as_str()))
                .cloned()
                .collect(),
        }
    }

    /// Distinct countries in order of first appearance
    pub fn countries(&self) -> Vec<String> {
        let mut seen = HashSet::new();
        self.records
            .iter()
            .filter(|r| seen.insert(r.country.as_str()))
            .map(|r| r.country.clone())
            .collect()
    }

    /// First row of every id, in ascending id order.
    ///
    /// Integer ids sort numerically; non-numeric ids come first, in string order.
    pub fn first_by_id(&self) -> Vec<&EntityRecord> {
        let mut first: BTreeMap<(Option<i64>, &str), &EntityRecord> = BTreeMap::new();
        for record in &self.records {
            let key = (record.id.parse::<i64>().ok(), record.id.as_str());
            first.entry(key).or_insert(record);
        }
        first.into_values().collect()
    }
}

/// Typed view of the long-format measurement table
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MeasurementTable {
    records: Vec<MeasurementRecord>,
}

impl MeasurementTable {
    pub fn new(records: Vec<MeasurementRecord>) -> Self {
        Self { records }
    }

    pub fn from_frame(df: &DataFrame, columns: &MeasurementColumns) -> Result<Self> {
        DataValidator::validate_measurements(df, columns)?;

        let countries = string_column(df, &columns.country_column)?;
        let measures = string_column(df, &columns.measure_column)?;
        let dates = column_dates(df.column(&columns.date_column)?)?;
        let values = df.column(&columns.value_column)?.cast(&DataType::Float64)?;
        let values = values.f64()?;

        let mut records = Vec::with_capacity(df.height());
        for (row, value) in values.into_iter().enumerate() {
            records.push(MeasurementRecord {
                country: required(countries[row].clone(), &columns.country_column, row)?,
                measure: required(measures[row].clone(), &columns.measure_column, row)?,
                date: required(dates[row], &columns.date_column, row)?,
                value,
            });
        }

        log::debug!("Read {} measurement rows", records.len());
        Ok(Self { records })
    }

    pub fn records(&self) -> &[MeasurementRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

fn string_column(df: &DataFrame, name: &str) -> Result<Vec<Option<String>>> {
    let column = df.column(name)?.cast(&DataType::String)?;
    Ok(column
        .str()?
        .into_iter()
        .map(|v| v.map(|s| s.to_string()))
        .collect())
}

fn required<T>(value: Option<T>, column: &str, row: usize) -> Result<T> {
    value.ok_or_else(|| {
        CountrysplitError::DataLoading(format!("Null value in column '{}' at row {}", column, row))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use polars::df;

    #[test]
    fn test_entities_from_frame() {
        let df = df! {
            "id" => &[7i64, 3, 7],
            "country" => &["FR", "DE", "FR"],
            "date" => &["2020-05-01", "2020-06-01", "2020-07-01"],
            "label" => &[Some(1i64), None, Some(0)],
        }
        .unwrap();

        let table = EntityTable::from_frame(&df, &EntityColumns::default(), "label").unwrap();
        assert_eq!(table.len(), 3);
        assert_eq!(table.records()[0].id, "7");
        assert_eq!(table.records()[1].label, None);
        assert_eq!(
            table.records()[0].reference_date,
            NaiveDate::from_ymd_opt(2020, 5, 1).unwrap()
        );
        assert_eq!(table.countries(), vec!["FR".to_string(), "DE".to_string()]);

        let firsts: Vec<&str> = table.first_by_id().iter().map(|r| r.id.as_str()).collect();
        assert_eq!(firsts, vec!["3", "7"]);

        let unique = table.first_rows();
        assert_eq!(unique.len(), 2);
        assert_eq!(unique.records()[0].id, "7");
        assert_eq!(unique.records()[0].label, Some(1));
        assert_eq!(unique.records()[1].id, "3");

        let numeric = EntityTable::new(
            ["10", "9", "x"]
                .iter()
                .map(|id| EntityRecord {
                    id: id.to_string(),
                    country: "FR".to_string(),
                    reference_date: NaiveDate::from_ymd_opt(2020, 5, 1).unwrap(),
                    label: None,
                })
                .collect(),
        );
        let order: Vec<&str> = numeric.first_by_id().iter().map(|r| r.id.as_str()).collect();
        assert_eq!(order, vec!["x", "9", "10"]);
        assert_eq!(table.first_by_id()[1].label, Some(1));
    }

    #[test]
    fn test_null_country_is_an_error() {
        let df = df! {
            "id" => &["a"],
            "country" => &[None::<&str>],
            "date" => &["2020-05-01"],
            "label" => &[1i64],
        }
        .unwrap();

        let result = EntityTable::from_frame(&df, &EntityColumns::default(), "label");
        assert!(matches!(result, Err(CountrysplitError::DataLoading(_))));
    }

    #[test]
    fn test_filter_ids() {
        let df = df! {
            "id" => &["a", "b", "c"],
            "country" => &["FR", "DE", "FR"],
            "date" => &["2020-05-01", "2020-06-01", "2020-07-01"],
            "label" => &[1i64, 0, 1],
        }
        .unwrap();
        let table = EntityTable::from_frame(&df, &EntityColumns::default(), "label").unwrap();

        let keep: HashSet<&str> = ["a", "c"].into_iter().collect();
        let filtered = table.filter_ids(&keep);
        assert_eq!(filtered.len(), 2);
        assert_eq!(filtered.countries(), vec!["FR".to_string()]);
    }

    #[test]
    fn test_measurements_keep_null_values() {
        let df = df! {
            "country" => &["FR", "FR"],
            "measure" => &["temp", "temp"],
            "date" => &["2020-01-01", "2020-02-01"],
            "value" => &[Some(1.5), None],
        }
        .unwrap();

        let table = MeasurementTable::from_frame(&df, &MeasurementColumns::default()).unwrap();
        assert_eq!(table.len(), 2);
        assert_eq!(table.records()[0].value, Some(1.5));
        assert_eq!(table.records()[1].value, None);
    }
}
