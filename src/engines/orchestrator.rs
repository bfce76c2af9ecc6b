use crate::config::{AppConfig, ColumnConfig, ConfigSection, FeatureConfig, RebalancePolicy, SplitConfig};
use crate::data::{CsvConnector, EntityTable, MeasurementIndex, MeasurementTable};
use crate::engines::splitting::{
    random_source, CountryAssignment, CountryGrouper, IndexResolver, RebalanceStep, SizeRebalancer,
    SplitIndices, SplitTargets,
};
use crate::error::{CountrysplitError, Result};
use crate::ml::features::{AcceptanceReport, FeatureTensor, WindowedFeatureBuilder};
use crate::types::{EntityId, Label, SplitTag};
use polars::prelude::*;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;

/// Features, labels and ids of one split, index-aligned
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SplitTriple {
    features: FeatureTensor,
    labels: Vec<Label>,
    ids: Vec<EntityId>,
}

impl SplitTriple {
    pub fn new(features: FeatureTensor, labels: Vec<Label>, ids: Vec<EntityId>) -> Result<Self> {
        if features.n_samples() != labels.len() || labels.len() != ids.len() {
            return Err(CountrysplitError::Alignment {
                features: features.n_samples(),
                labels: labels.len(),
                ids: ids.len(),
            });
        }
        Ok(Self { features, labels, ids })
    }

    pub fn features(&self) -> &FeatureTensor {
        &self.features
    }

    pub fn labels(&self) -> &[Label] {
        &self.labels
    }

    pub fn ids(&self) -> &[EntityId] {
        &self.ids
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn into_parts(self) -> (FeatureTensor, Vec<Label>, Vec<EntityId>) {
        (self.features, self.labels, self.ids)
    }
}

/// Country grouping, rebalancing and index resolution for one id list
#[derive(Debug, Clone)]
pub struct SplitPlan {
    pub assignment: CountryAssignment,
    pub targets: SplitTargets,
    pub group_sizes: SplitTargets,
    pub steps: Vec<RebalanceStep>,
    pub leaked_countries: Vec<String>,
    pub indices: SplitIndices,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SplitReport {
    pub acceptance: AcceptanceReport,
    pub policy: RebalancePolicy,
    pub seed: Option<u64>,
    pub assignment: CountryAssignment,
    pub targets: SplitTargets,
    pub group_sizes: SplitTargets,
    pub samples: SplitTargets,
    pub rebalance_steps: Vec<RebalanceStep>,
    pub leaked_countries: Vec<String>,
    pub overlapping_ids: Vec<EntityId>,
}

impl SplitReport {
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

#[derive(Debug, Clone)]
pub struct SplitOutput {
    pub train: SplitTriple,
    pub val: SplitTriple,
    pub test: SplitTriple,
    pub report: SplitReport,
}

impl SplitOutput {
    pub fn get(&self, tag: SplitTag) -> &SplitTriple {
        match tag {
            SplitTag::Train => &self.train,
            SplitTag::Val => &self.val,
            SplitTag::Test => &self.test,
        }
    }

    pub fn total(&self) -> usize {
        self.train.len() + self.val.len() + self.test.len()
    }

    /// One `(id, split)` row per sample, train first
    pub fn assignments(&self) -> Result<DataFrame> {
        let mut ids: Vec<String> = Vec::with_capacity(self.total());
        let mut splits: Vec<&str> = Vec::with_capacity(self.total());
        for tag in SplitTag::all() {
            for id in self.get(tag).ids() {
                ids.push(id.clone());
                splits.push(tag.as_str());
            }
        }
        Ok(df!("id" => ids, "split" => splits)?)
    }
}

/// Builds windowed tensors once and slices them into country-grouped splits
pub struct SplitOrchestrator {
    entities: DataFrame,
    measurements: MeasurementIndex,
    columns: ColumnConfig,
    split: SplitConfig,
}

impl SplitOrchestrator {
    pub fn new(entities: DataFrame, measurements: &DataFrame, config: &AppConfig) -> Result<Self> {
        config.columns.validate()?;
        config.split.validate()?;

        let table = MeasurementTable::from_frame(measurements, &config.columns.measurement)?;
        let measurements = MeasurementIndex::from_table(&table)?;

        Ok(Self {
            entities,
            measurements,
            columns: config.columns.clone(),
            split: config.split.clone(),
        })
    }

    pub fn from_csv<P: AsRef<Path>, Q: AsRef<Path>>(
        entity_path: P,
        measurement_path: Q,
        config: &AppConfig,
    ) -> Result<Self> {
        let entities = CsvConnector::load_entities(
            entity_path,
            &config.columns.entity,
            &config.features.label_column,
        )?;
        let measurements = CsvConnector::load_measurements(measurement_path, &config.columns.measurement)?;
        Self::new(entities, &measurements, config)
    }

    pub fn split_config(&self) -> &SplitConfig {
        &self.split
    }

    /// Build the full tensor, split it by country and slice out train/val/test
    pub fn process(&self, features: &FeatureConfig) -> Result<SplitOutput> {
        features.validate()?;
        self.split.validate()?;

        let entities = EntityTable::from_frame(&self.entities, &self.columns.entity, &features.label_column)?;
        let builder = WindowedFeatureBuilder::new(features)?;
        let feature_set = builder.build(&entities, &self.measurements)?;

        let mut rng = random_source(self.split.seed);
        let plan = self.plan(&entities, &feature_set.ids, &mut rng)?;

        let slice = |tag: SplitTag| -> Result<SplitTriple> {
            let positions = plan.indices.get(tag).positions();
            SplitTriple::new(
                feature_set.tensor.select(positions),
                positions.iter().map(|&p| feature_set.labels[p]).collect(),
                positions.iter().map(|&p| feature_set.ids[p].clone()).collect(),
            )
        };
        let train = slice(SplitTag::Train)?;
        let val = slice(SplitTag::Val)?;
        let test = slice(SplitTag::Test)?;

        let overlapping_ids: Vec<EntityId> = plan
            .indices
            .overlapping()
            .into_iter()
            .map(|p| feature_set.ids[p].clone())
            .collect();
        if !overlapping_ids.is_empty() {
            log::warn!("{} ids were assigned to more than one split", overlapping_ids.len());
        }

        let samples = SplitTargets {
            train: train.len(),
            val: val.len(),
            test: test.len(),
        };
        log::info!(
            "Split {} samples into train={} val={} test={} (targets {}/{}/{})",
            feature_set.ids.len(),
            samples.train,
            samples.val,
            samples.test,
            plan.targets.train,
            plan.targets.val,
            plan.targets.test
        );

        let report = SplitReport {
            acceptance: feature_set.report,
            policy: self.split.rebalance,
            seed: self.split.seed,
            assignment: plan.assignment,
            targets: plan.targets,
            group_sizes: plan.group_sizes,
            samples,
            rebalance_steps: plan.steps,
            leaked_countries: plan.leaked_countries,
            overlapping_ids,
        };

        Ok(SplitOutput {
            train,
            val,
            test,
            report,
        })
    }

    /// Group the entities behind `ids` by country, rebalance, and resolve positions into `ids`.
    ///
    /// Each id is placed by the first row it has in `entities`.
    pub fn plan<R: Rng + ?Sized>(
        &self,
        entities: &EntityTable,
        ids: &[EntityId],
        rng: &mut R,
    ) -> Result<SplitPlan> {
        let keep: HashSet<&str> = ids.iter().map(String::as_str).collect();
        let matching = entities.filter_ids(&keep);
        // One row per id, the same row its window was built from
        let filtered = matching.first_rows();
        if filtered.len() < matching.len() {
            log::debug!(
                "Ignoring {} repeated rows of already seen ids",
                matching.len() - filtered.len()
            );
        }
        if filtered.is_empty() {
            return Err(CountrysplitError::InsufficientData(
                "No entity rows match the id list".to_string(),
            ));
        }

        let ratios = self.split.ratios();
        let grouper = CountryGrouper::new(ratios);
        let countries = filtered.countries();
        let assignment = grouper.group(&countries, rng);

        let empty = grouper.empty_splits(&assignment);
        if !empty.is_empty() {
            let message = format!(
                "{} countries leave {:?} without data",
                countries.len(),
                empty.iter().map(SplitTag::as_str).collect::<Vec<_>>()
            );
            if self.split.allow_empty_splits {
                log::warn!("{}", message);
            } else {
                return Err(CountrysplitError::InsufficientData(message));
            }
        }

        let mut groups = grouper.partition(&filtered, &assignment);
        let targets = ratios.targets(filtered.len());
        let steps = SizeRebalancer::new(self.split.rebalance).rebalance_all(&targets, &mut groups, rng);

        let leaked_countries = SizeRebalancer::leaked_countries(&groups);
        if !leaked_countries.is_empty() {
            log::warn!(
                "Row-level rebalancing spread {} countries across splits: {:?}",
                leaked_countries.len(),
                leaked_countries
            );
        }

        let resolver = IndexResolver::new(self.split.duplicate_ids);
        let master: Vec<&str> = ids.iter().map(String::as_str).collect();
        let indices = SplitIndices {
            train: resolver.resolve(&groups.get(SplitTag::Train).ids(), &master)?,
            val: resolver.resolve(&groups.get(SplitTag::Val).ids(), &master)?,
            test: resolver.resolve(&groups.get(SplitTag::Test).ids(), &master)?,
        };

        Ok(SplitPlan {
            assignment,
            targets,
            group_sizes: groups.sizes(),
            steps,
            leaked_countries,
            indices,
        })
    }
}
