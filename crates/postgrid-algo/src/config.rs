//! Analysis constants as configuration.
//!
//! Emission intensities and the curtailable resource set are plain data so a
//! study can override them from a TOML file. Every section supports partial
//! configs: fields that are not given keep their built-in defaults.
//!
//! ```toml
//! [emissions]
//! decommit_threshold = 2.0
//!
//! [emissions.carbon_per_mwh]
//! coal = 1001.0
//! ng = 469.0
//!
//! [curtailment]
//! curtailable_resources = ["solar", "wind"]
//! ```

use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use postgrid_core::{FuelType, PostgridError, PostgridResult};
use serde::{Deserialize, Serialize};

/// Top-level configuration handed to the analysis entry points.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    pub emissions: EmissionsConfig,
    pub curtailment: CurtailmentConfig,
}

impl AnalysisConfig {
    pub fn from_toml_str(data: &str) -> Result<Self> {
        let config: Self = toml::from_str(data).context("parsing analysis config toml")?;
        config.validate()?;
        Ok(config)
    }

    pub fn load_from_path(path: &Path) -> Result<Self> {
        let data = fs::read_to_string(path)
            .with_context(|| format!("reading analysis config '{}'", path.display()))?;
        Self::from_toml_str(&data)
            .with_context(|| format!("loading analysis config '{}'", path.display()))
    }

    pub fn validate(&self) -> PostgridResult<()> {
        self.emissions.validate()?;
        self.curtailment.validate()
    }
}

/// Emission factors and the carbon-emitting resource set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EmissionsConfig {
    /// Carbon dioxide, kg per MWh generated.
    pub carbon_per_mwh: BTreeMap<FuelType, f64>,
    /// Nitrogen oxides, kg per MWh generated.
    pub nox_per_mwh: BTreeMap<FuelType, f64>,
    /// Sulfur dioxide, kg per MWh generated.
    pub so2_per_mwh: BTreeMap<FuelType, f64>,
    /// Carbon (not CO2), kg per MMBtu of heat input.
    pub carbon_per_mmbtu: BTreeMap<FuelType, f64>,
    /// Mass ratio of CO2 to C.
    pub carbon_to_co2: f64,
    /// Dispatch below this many MW counts as offline under the decommit method.
    pub decommit_threshold: f64,
    pub carbon_resources: BTreeSet<FuelType>,
}

impl Default for EmissionsConfig {
    fn default() -> Self {
        Self {
            carbon_per_mwh: fuel_table(1001.0, 840.0, 469.0),
            nox_per_mwh: fuel_table(0.658, 1.537, 0.179),
            so2_per_mwh: fuel_table(0.965, 2.189, 0.01),
            carbon_per_mmbtu: fuel_table(26.05, 20.31, 14.46),
            carbon_to_co2: 44.0 / 12.0,
            decommit_threshold: 1.0,
            carbon_resources: [FuelType::Coal, FuelType::Dfo, FuelType::Ng]
                .into_iter()
                .collect(),
        }
    }
}

fn fuel_table(coal: f64, dfo: f64, ng: f64) -> BTreeMap<FuelType, f64> {
    [(FuelType::Coal, coal), (FuelType::Dfo, dfo), (FuelType::Ng, ng)]
        .into_iter()
        .collect()
}

impl EmissionsConfig {
    pub fn validate(&self) -> PostgridResult<()> {
        let tables = [
            ("carbon_per_mwh", &self.carbon_per_mwh),
            ("nox_per_mwh", &self.nox_per_mwh),
            ("so2_per_mwh", &self.so2_per_mwh),
            ("carbon_per_mmbtu", &self.carbon_per_mmbtu),
        ];
        for (name, table) in tables {
            let invalid = table.iter().find(|(_, v)| !(v.is_finite() && **v >= 0.0));
            if let Some((fuel, value)) = invalid {
                return Err(PostgridError::Config(format!(
                    "emissions.{name}.{fuel} must be a non-negative number, got {value}"
                )));
            }
        }
        if !(self.carbon_to_co2.is_finite() && self.carbon_to_co2 > 0.0) {
            return Err(PostgridError::Config(format!(
                "emissions.carbon_to_co2 must be positive, got {}",
                self.carbon_to_co2
            )));
        }
        if !(self.decommit_threshold.is_finite() && self.decommit_threshold >= 0.0) {
            return Err(PostgridError::Config(format!(
                "emissions.decommit_threshold must be non-negative, got {}",
                self.decommit_threshold
            )));
        }
        Ok(())
    }
}

/// Resources whose output can be curtailed and the rounding applied to
/// curtailment values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CurtailmentConfig {
    pub curtailable_resources: BTreeSet<FuelType>,
    /// Decimal places kept in curtailment values.
    pub precision: u32,
}

impl Default for CurtailmentConfig {
    fn default() -> Self {
        Self {
            curtailable_resources: [FuelType::Solar, FuelType::Wind, FuelType::WindOffshore]
                .into_iter()
                .collect(),
            precision: 6,
        }
    }
}

impl CurtailmentConfig {
    pub fn validate(&self) -> PostgridResult<()> {
        if self.curtailable_resources.is_empty() {
            return Err(PostgridError::Config(
                "curtailment.curtailable_resources cannot be empty".to_string(),
            ));
        }
        if self.precision > 12 {
            return Err(PostgridError::Config(format!(
                "curtailment.precision must be at most 12, got {}",
                self.precision
            )));
        }
        Ok(())
    }

    pub(crate) fn round(&self, value: f64) -> f64 {
        let scale = 10f64.powi(self.precision as i32);
        (value * scale).round() / scale
    }
}
