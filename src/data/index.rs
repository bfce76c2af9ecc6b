use crate::data::tables::MeasurementTable;
use crate::error::{CountrysplitError, Result};
use chrono::NaiveDate;
use std::collections::{BTreeMap, HashMap};
use std::ops::Bound;

type DatedValues = BTreeMap<NaiveDate, Option<f64>>;

/// Measurements keyed by country, then measure, then date.
///
/// Read-only once built, so it can be shared across rayon tasks.
#[derive(Debug, Clone, Default)]
pub struct MeasurementIndex {
    data: HashMap<String, HashMap<String, DatedValues>>,
    len: usize,
}

impl MeasurementIndex {
    pub fn from_table(table: &MeasurementTable) -> Result<Self> {
        let mut data: HashMap<String, HashMap<String, DatedValues>> = HashMap::new();

        for record in table.records() {
            let series = data
                .entry(record.country.clone())
                .or_default()
                .entry(record.measure.clone())
                .or_default();
            if series.insert(record.date, record.value).is_some() {
                return Err(CountrysplitError::DataLoading(format!(
                    "Duplicate measurement for country '{}', measure '{}', date {}",
                    record.country, record.measure, record.date
                )));
            }
        }

        log::debug!(
            "Indexed {} measurements across {} countries",
            table.len(),
            data.len()
        );
        Ok(Self {
            data,
            len: table.len(),
        })
    }

    pub fn has_country(&self, country: &str) -> bool {
        self.data.contains_key(country)
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Observations of `measure` in `country` strictly between `after` and `before`, ascending
    pub fn window(
        &self,
        country: &str,
        measure: &str,
        after: NaiveDate,
        before: NaiveDate,
    ) -> Vec<(NaiveDate, Option<f64>)> {
        if after >= before {
            return Vec::new();
        }
        self.data
            .get(country)
            .and_then(|measures| measures.get(measure))
            .map(|series| {
                series
                    .range((Bound::Excluded(after), Bound::Excluded(before)))
                    .map(|(date, value)| (*date, *value))
                    .collect()
            })
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::MeasurementRecord;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn record(country: &str, measure: &str, d: NaiveDate, value: Option<f64>) -> MeasurementRecord {
        MeasurementRecord {
            country: country.to_string(),
            measure: measure.to_string(),
            date: d,
            value,
        }
    }

    #[test]
    fn test_window_bounds_are_exclusive() {
        let table = MeasurementTable::new(
            (1..=6)
                .map(|m| record("FR", "temp", date(2020, m, 1), Some(m as f64)))
                .collect(),
        );
        let index = MeasurementIndex::from_table(&table).unwrap();

        let window = index.window("FR", "temp", date(2020, 1, 1), date(2020, 5, 1));
        let months: Vec<f64> = window.iter().filter_map(|(_, v)| *v).collect();
        assert_eq!(months, vec![2.0, 3.0, 4.0]);
    }

    #[test]
    fn test_unknown_series_is_empty() {
        let table = MeasurementTable::new(vec![record("FR", "temp", date(2020, 1, 1), None)]);
        let index = MeasurementIndex::from_table(&table).unwrap();

        assert!(index.has_country("FR"));
        assert!(!index.has_country("DE"));
        assert!(index.window("DE", "temp", date(2019, 1, 1), date(2021, 1, 1)).is_empty());
        assert!(index.window("FR", "rain", date(2019, 1, 1), date(2021, 1, 1)).is_empty());
        assert!(index.window("FR", "temp", date(2021, 1, 1), date(2021, 1, 1)).is_empty());
    }

    #[test]
    fn test_duplicate_measurement_rejected() {
        let table = MeasurementTable::new(vec![
            record("FR", "temp", date(2020, 1, 1), Some(1.0)),
            record("FR", "temp", date(2020, 1, 1), Some(2.0)),
        ]);
        assert!(matches!(
            MeasurementIndex::from_table(&table),
            Err(CountrysplitError::DataLoading(_))
        ));
    }
}
