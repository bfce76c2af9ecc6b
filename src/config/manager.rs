use super::{
    columns::ColumnConfig, features::FeatureConfig, split::SplitConfig, traits::ConfigSection,
};
use crate::error::CountrysplitError;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Prefix of environment overrides, e.g. `COUNTRYSPLIT__SPLIT__SEED=7`
pub const ENV_PREFIX: &str = "COUNTRYSPLIT";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub columns: ColumnConfig,
    pub split: SplitConfig,
    pub features: FeatureConfig,
}

impl AppConfig {
    pub fn validate(&self) -> Result<(), CountrysplitError> {
        self.columns.validate()?;
        self.split.validate()?;
        // The feature list is checked when windows are built, so a file may omit it
        self.features.validate_settings()?;
        Ok(())
    }
}

pub struct ConfigManager {
    config: AppConfig,
}

impl Default for ConfigManager {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigManager {
    pub fn new() -> Self {
        Self {
            config: AppConfig::default(),
        }
    }

    pub fn with_config(config: AppConfig) -> Result<Self, CountrysplitError> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn load_from_file<P: AsRef<Path>>(&mut self, path: P) -> Result<(), CountrysplitError> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| CountrysplitError::Configuration(format!("Failed to read config: {}", e)))?;

        let config: AppConfig = toml::from_str(&contents)
            .map_err(|e| CountrysplitError::Configuration(format!("Failed to parse config: {}", e)))?;

        config.validate()?;
        log::debug!("Loaded configuration: {:?}", config);

        self.config = config;
        Ok(())
    }

    /// Load a config file and apply `COUNTRYSPLIT__<SECTION>__<KEY>` overrides on top
    pub fn load_layered<P: AsRef<Path>>(&mut self, path: P) -> Result<(), CountrysplitError> {
        let layered = ::config::Config::builder()
            .add_source(::config::File::from(path.as_ref()))
            .add_source(
                ::config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .map_err(|e| CountrysplitError::Configuration(format!("Failed to read config: {}", e)))?;

        let config: AppConfig = layered
            .try_deserialize()
            .map_err(|e| CountrysplitError::Configuration(format!("Failed to parse config: {}", e)))?;

        config.validate()?;
        log::debug!("Loaded layered configuration: {:?}", config);

        self.config = config;
        Ok(())
    }

    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<(), CountrysplitError> {
        let toml_str = toml::to_string_pretty(&self.config)
            .map_err(|e| CountrysplitError::Configuration(format!("Failed to serialize: {}", e)))?;

        std::fs::write(path, toml_str)
            .map_err(|e| CountrysplitError::Configuration(format!("Failed to write config: {}", e)))?;

        Ok(())
    }

    pub fn get(&self) -> &AppConfig {
        &self.config
    }

    /// Apply `f` to a copy and keep it only if it still validates
    pub fn update<F>(&mut self, f: F) -> Result<(), CountrysplitError>
    where
        F: FnOnce(&mut AppConfig),
    {
        let mut candidate = self.config.clone();
        f(&mut candidate);
        candidate.validate()?;
        self.config = candidate;
        Ok(())
    }
}
