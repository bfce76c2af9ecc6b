use super::report::{AcceptanceReport, RejectionReason};
use super::tensor::FeatureTensor;
use crate::config::{ConfigSection, FeatureConfig};
use crate::data::dates::month_begin_back;
use crate::data::{EntityTable, MeasurementIndex};
use crate::error::{CountrysplitError, Result};
use crate::types::{EntityId, EntityRecord, Label};
use chrono::NaiveDate;
use rayon::prelude::*;

/// Windowed tensor plus the labels and ids aligned with its samples
#[derive(Debug, Clone)]
pub struct FeatureSet {
    pub tensor: FeatureTensor,
    pub labels: Vec<Label>,
    pub ids: Vec<EntityId>,
    pub report: AcceptanceReport,
}

/// A complete window, values laid out `[feature][step]`
struct WindowSample {
    id: EntityId,
    label: Label,
    values: Vec<f64>,
}

enum WindowOutcome {
    Accepted(WindowSample),
    Rejected(EntityId, RejectionReason),
}

pub struct WindowedFeatureBuilder {
    window_size: usize,
    features: Vec<String>,
    parallel: bool,
}

impl WindowedFeatureBuilder {
    pub fn new(config: &FeatureConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            window_size: config.window_size,
            features: config.desired_features.iter().cloned().collect(),
            parallel: config.parallel,
        })
    }

    /// Feature names in tensor column order
    pub fn features(&self) -> &[String] {
        &self.features
    }

    /// Build one sample per entity id whose window is complete, in ascending id order
    pub fn build(&self, entities: &EntityTable, measurements: &MeasurementIndex) -> Result<FeatureSet> {
        let candidates = entities.first_by_id();

        // Collecting a rayon iterator keeps input order, so both paths agree
        let outcomes: Vec<WindowOutcome> = if self.parallel {
            candidates
                .par_iter()
                .map(|record| self.evaluate(record, measurements))
                .collect()
        } else {
            candidates
                .iter()
                .map(|record| self.evaluate(record, measurements))
                .collect()
        };

        let mut report = AcceptanceReport::default();
        let mut accepted = Vec::new();
        for outcome in outcomes {
            match outcome {
                WindowOutcome::Accepted(sample) => {
                    report.record_accepted();
                    accepted.push(sample);
                }
                WindowOutcome::Rejected(id, reason) => {
                    log::debug!("Entity {} rejected: {:?}", id, reason);
                    report.record_rejected(reason);
                }
            }
        }

        if accepted.is_empty() {
            return Err(CountrysplitError::EmptyFeatureSet {
                rejected: report.rejected_count(),
            });
        }
        if report.rejected_count() > 0 {
            log::warn!(
                "Dropped {} of {} entities without a usable window: {:?}",
                report.rejected_count(),
                report.total,
                report.rejected
            );
        }
        log::info!(
            "Built {} windows of {} features x {} months ({:.1}% accepted)",
            accepted.len(),
            self.features.len(),
            self.window_size,
            report.acceptance_rate()
        );

        let mut tensor = FeatureTensor::zeros(accepted.len(), self.features.clone(), self.window_size);
        let mut labels = Vec::with_capacity(accepted.len());
        let mut ids = Vec::with_capacity(accepted.len());
        for (s, sample) in accepted.into_iter().enumerate() {
            for f in 0..self.features.len() {
                for t in 0..self.window_size {
                    tensor.set(s, f, t, sample.values[f * self.window_size + t]);
                }
            }
            labels.push(sample.label);
            ids.push(sample.id);
        }

        Ok(FeatureSet {
            tensor,
            labels,
            ids,
            report,
        })
    }

    /// Window bounds `(after, before)`, both exclusive
    pub fn window_bounds(&self, reference_date: NaiveDate) -> Option<(NaiveDate, NaiveDate)> {
        let months = u32::try_from(self.window_size).ok()?.checked_add(1)?;
        let after = month_begin_back(reference_date, months)?;
        Some((after, reference_date))
    }

    fn evaluate(&self, record: &EntityRecord, measurements: &MeasurementIndex) -> WindowOutcome {
        let reject = |reason| WindowOutcome::Rejected(record.id.clone(), reason);

        if !measurements.has_country(&record.country) {
            return reject(RejectionReason::UnknownCountry);
        }
        let Some((after, before)) = self.window_bounds(record.reference_date) else {
            return reject(RejectionReason::IncompleteWindow);
        };

        let windows: Vec<Vec<(NaiveDate, Option<f64>)>> = self
            .features
            .iter()
            .map(|feature| measurements.window(&record.country, feature, after, before))
            .collect();

        let observed: usize = windows.iter().map(Vec::len).sum();
        if observed != self.window_size * self.features.len() {
            return reject(RejectionReason::IncompleteWindow);
        }
        if windows.iter().flatten().any(|(_, value)| value.is_none()) {
            return reject(RejectionReason::NullValue);
        }
        let dates: Vec<NaiveDate> = windows[0].iter().map(|(date, _)| *date).collect();
        let aligned = windows.iter().all(|window| {
            window.len() == self.window_size
                && window.iter().map(|(date, _)| *date).eq(dates.iter().copied())
        });
        if !aligned {
            return reject(RejectionReason::MisalignedDates);
        }
        let Some(label) = record.label else {
            return reject(RejectionReason::MissingLabel);
        };

        let values = windows
            .into_iter()
            .flatten()
            .filter_map(|(_, value)| value)
            .collect();

        WindowOutcome::Accepted(WindowSample {
            id: record.id.clone(),
            label,
            values,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::MeasurementTable;
    use crate::types::MeasurementRecord;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn entity(id: &str, country: &str, reference: NaiveDate, label: Option<Label>) -> EntityRecord {
        EntityRecord {
            id: id.to_string(),
            country: country.to_string(),
            reference_date: reference,
            label,
        }
    }

    /// Monthly temp = month, rain = 100 + month, for Jan..Dec 2020
    fn measurements(country: &str) -> Vec<MeasurementRecord> {
        let mut records = Vec::new();
        for month in 1..=12 {
            for (measure, base) in [("temp", 0.0), ("rain", 100.0)] {
                records.push(MeasurementRecord {
                    country: country.to_string(),
                    measure: measure.to_string(),
                    date: date(2020, month, 1),
                    value: Some(base + month as f64),
                });
            }
        }
        records
    }

    fn builder(parallel: bool) -> WindowedFeatureBuilder {
        let mut config = FeatureConfig::new(3, ["temp", "rain"], "label");
        config.parallel = parallel;
        WindowedFeatureBuilder::new(&config).unwrap()
    }

    #[test]
    fn test_window_values_and_shape() {
        let index = MeasurementIndex::from_table(&MeasurementTable::new(measurements("FR"))).unwrap();
        let entities = EntityTable::new(vec![entity("a", "FR", date(2020, 6, 1), Some(1))]);

        let set = builder(false).build(&entities, &index).unwrap();
        assert_eq!(set.tensor.shape(), [1, 2, 3]);
        assert_eq!(set.tensor.feature_names(), &["rain".to_string(), "temp".to_string()]);
        // March..May, rain first
        assert_eq!(set.tensor.series(0, 0), &[103.0, 104.0, 105.0]);
        assert_eq!(set.tensor.series(0, 1), &[3.0, 4.0, 5.0]);
        assert_eq!(set.labels, vec![1]);
        assert_eq!(set.ids, vec!["a".to_string()]);
    }

    #[test]
    fn test_mid_month_reference_includes_current_month_start() {
        let index = MeasurementIndex::from_table(&MeasurementTable::new(measurements("FR"))).unwrap();
        let entities = EntityTable::new(vec![entity("a", "FR", date(2020, 6, 15), Some(0))]);

        let set = builder(false).build(&entities, &index).unwrap();
        assert_eq!(set.tensor.series(0, 1), &[4.0, 5.0, 6.0]);
    }

    #[test]
    fn test_oversized_window_has_no_bounds() {
        let reference = date(2020, 6, 1);
        for window_size in [u32::MAX as usize, usize::MAX] {
            let builder =
                WindowedFeatureBuilder::new(&FeatureConfig::new(window_size, ["temp"], "label")).unwrap();
            assert_eq!(builder.window_bounds(reference), None);
        }

        let builder = WindowedFeatureBuilder::new(&FeatureConfig::new(3, ["temp"], "label")).unwrap();
        assert_eq!(builder.window_bounds(reference), Some((date(2020, 2, 1), reference)));
    }

    #[test]
    fn test_rejections_are_reported() {
        let mut records = measurements("FR");
        records.extend(measurements("DE"));
        for record in records.iter_mut() {
            if record.country == "DE" && record.date == date(2020, 4, 1) && record.measure == "temp" {
                record.value = None;
            }
        }
        let index = MeasurementIndex::from_table(&MeasurementTable::new(records)).unwrap();
        let entities = EntityTable::new(vec![
            entity("ok", "FR", date(2020, 6, 1), Some(1)),
            entity("early", "FR", date(2020, 2, 1), Some(1)),
            entity("null", "DE", date(2020, 6, 1), Some(0)),
            entity("nowhere", "XX", date(2020, 6, 1), Some(0)),
            entity("unlabelled", "FR", date(2020, 7, 1), None),
        ]);

        let set = builder(true).build(&entities, &index).unwrap();
        assert_eq!(set.ids, vec!["ok".to_string()]);
        assert_eq!(set.report.total, 5);
        assert_eq!(set.report.rejected_for(RejectionReason::IncompleteWindow), 1);
        assert_eq!(set.report.rejected_for(RejectionReason::NullValue), 1);
        assert_eq!(set.report.rejected_for(RejectionReason::UnknownCountry), 1);
        assert_eq!(set.report.rejected_for(RejectionReason::MissingLabel), 1);
    }

    #[test]
    fn test_uneven_features_are_misaligned() {
        // Missing March rain leaves the June window one row short
        let mut records: Vec<MeasurementRecord> = measurements("FR")
            .into_iter()
            .filter(|r| !(r.measure == "rain" && r.date == date(2020, 3, 1)))
            .collect();
        records.retain(|r| r.date >= date(2020, 2, 1));
        let index = MeasurementIndex::from_table(&MeasurementTable::new(records)).unwrap();
        let entities = EntityTable::new(vec![
            entity("skewed", "FR", date(2020, 6, 1), Some(1)),
            entity("fine", "FR", date(2020, 9, 1), Some(0)),
        ]);

        let mut config = FeatureConfig::new(3, ["temp", "rain"], "label");
        config.parallel = false;
        let set = WindowedFeatureBuilder::new(&config).unwrap().build(&entities, &index).unwrap();
        assert_eq!(set.ids, vec!["fine".to_string()]);
        assert_eq!(set.report.rejected_for(RejectionReason::IncompleteWindow), 1);

        // Shift a rain observation off the shared dates without changing the count
        let mut records = measurements("FR");
        for record in records.iter_mut() {
            if record.measure == "rain" && record.date == date(2020, 4, 1) {
                record.date = date(2020, 4, 15);
            }
        }
        let index = MeasurementIndex::from_table(&MeasurementTable::new(records)).unwrap();
        let set = WindowedFeatureBuilder::new(&config).unwrap().build(&entities, &index).unwrap();
        assert_eq!(set.ids, vec!["fine".to_string()]);
        assert_eq!(set.report.rejected_for(RejectionReason::MisalignedDates), 1);
    }

    #[test]
    fn test_no_complete_window_is_an_error() {
        let index = MeasurementIndex::from_table(&MeasurementTable::new(measurements("FR"))).unwrap();
        let entities = EntityTable::new(vec![entity("early", "FR", date(2020, 1, 1), Some(1))]);

        let result = builder(false).build(&entities, &index);
        assert!(matches!(
            result,
            Err(CountrysplitError::EmptyFeatureSet { rejected: 1 })
        ));
    }

    #[test]
    fn test_parallel_matches_sequential() {
        let mut records = Vec::new();
        let mut entities = Vec::new();
        for c in 0..5 {
            let country = format!("C{}", c);
            records.extend(measurements(&country));
            for month in 1..=12 {
                entities.push(entity(
                    &format!("{}-{:02}", country, month),
                    &country,
                    date(2020, month, 1),
                    Some((month % 2) as Label),
                ));
            }
        }
        let index = MeasurementIndex::from_table(&MeasurementTable::new(records)).unwrap();
        let table = EntityTable::new(entities);

        let sequential = builder(false).build(&table, &index).unwrap();
        let parallel = builder(true).build(&table, &index).unwrap();
        assert_eq!(sequential.ids, parallel.ids);
        assert_eq!(sequential.labels, parallel.labels);
        assert_eq!(sequential.tensor, parallel.tensor);
        let mut sorted = sequential.ids.clone();
        sorted.sort();
        assert_eq!(sequential.ids, sorted);
    }
}
