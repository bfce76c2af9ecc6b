use super::traits::ConfigSection;
use crate::error::CountrysplitError;
use serde::{Deserialize, Serialize};

/// Column names of the entity and measurement tables
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColumnConfig {
    pub entity: EntityColumns,
    pub measurement: MeasurementColumns,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EntityColumns {
    pub id_column: String,
    pub country_column: String,
    /// Reference date of the observation; windows end just before it
    pub month_column: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MeasurementColumns {
    pub country_column: String,
    pub measure_column: String,
    pub date_column: String,
    pub value_column: String,
}

impl Default for ColumnConfig {
    fn default() -> Self {
        Self {
            entity: EntityColumns::default(),
            measurement: MeasurementColumns::default(),
        }
    }
}

impl Default for EntityColumns {
    fn default() -> Self {
        Self {
            id_column: "id".to_string(),
            country_column: "country".to_string(),
            month_column: "date".to_string(),
        }
    }
}

impl Default for MeasurementColumns {
    fn default() -> Self {
        Self {
            country_column: "country".to_string(),
            measure_column: "measure".to_string(),
            date_column: "date".to_string(),
            value_column: "value".to_string(),
        }
    }
}

impl ConfigSection for ColumnConfig {
    fn section_name() -> &'static str {
        "columns"
    }

    fn validate(&self) -> Result<(), CountrysplitError> {
        let names = [
            ("entity.id_column", &self.entity.id_column),
            ("entity.country_column", &self.entity.country_column),
            ("entity.month_column", &self.entity.month_column),
            ("measurement.country_column", &self.measurement.country_column),
            ("measurement.measure_column", &self.measurement.measure_column),
            ("measurement.date_column", &self.measurement.date_column),
            ("measurement.value_column", &self.measurement.value_column),
        ];
        for (key, name) in names {
            if name.trim().is_empty() {
                return Err(CountrysplitError::Configuration(format!(
                    "Column name '{}' must not be empty",
                    key
                )));
            }
        }
        if self.entity.id_column == self.entity.country_column {
            return Err(CountrysplitError::Configuration(
                "Entity id and country columns must differ".to_string(),
            ));
        }
        Ok(())
    }
}
