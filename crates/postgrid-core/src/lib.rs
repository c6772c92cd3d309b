//! # postgrid-core: Generator Data Model
//!
//! Read-only snapshots of the grid attributes that post-processing needs:
//! generator records, polynomial cost curves and the unified error type.
//!
//! ## Core Data Structures
//!
//! - [`GeneratorRecord`] / [`GeneratorTable`] - per-unit fuel type, limits, fuel price and location
//! - [`CostCurve`] / [`CostCurveTable`] - polynomial cost curves keyed by generator id
//! - [`FuelType`] - enumerated resource types
//! - [`PostgridError`] - the error every analysis operation returns
//!
//! ## Quick Start
//!
//! ```rust
//! use postgrid_core::*;
//!
//! let plants = GeneratorTable::new(vec![
//!     GeneratorRecord::new("101", FuelType::Coal, BusId::new(1001))
//!         .with_p_limits(50.0, 400.0)
//!         .with_fuel_cost(4.4),
//!     GeneratorRecord::new("102", FuelType::Wind, BusId::new(1002)).with_p_limits(0.0, 150.0),
//! ])
//! .unwrap();
//!
//! assert_eq!(plants.ids_of_type(FuelType::Wind), vec!["102"]);
//! assert_eq!(plants.require("101").unwrap().fuel, FuelType::Coal);
//! ```

use std::collections::{BTreeSet, HashMap};
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

pub mod cost_curve;
pub mod error;
pub mod units;

pub use cost_curve::{CostCurve, CostCurveTable, POLYNOMIAL_CURVE_TYPE};
pub use error::{PostgridError, PostgridResult};
pub use units::{FuelPrice, Megawatts};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BusId(usize);

impl BusId {
    #[inline]
    pub fn new(value: usize) -> Self {
        BusId(value)
    }
    #[inline]
    pub fn value(&self) -> usize {
        self.0
    }
}

impl fmt::Display for BusId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Fuel / resource type of a generator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FuelType {
    Coal,
    Ng,
    Dfo,
    Nuclear,
    Hydro,
    Solar,
    Wind,
    WindOffshore,
    Geothermal,
    Biomass,
    Other,
    Storage,
}

impl FuelType {
    pub const ALL: [FuelType; 12] = [
        FuelType::Coal,
        FuelType::Ng,
        FuelType::Dfo,
        FuelType::Nuclear,
        FuelType::Hydro,
        FuelType::Solar,
        FuelType::Wind,
        FuelType::WindOffshore,
        FuelType::Geothermal,
        FuelType::Biomass,
        FuelType::Other,
        FuelType::Storage,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            FuelType::Coal => "coal",
            FuelType::Ng => "ng",
            FuelType::Dfo => "dfo",
            FuelType::Nuclear => "nuclear",
            FuelType::Hydro => "hydro",
            FuelType::Solar => "solar",
            FuelType::Wind => "wind",
            FuelType::WindOffshore => "wind_offshore",
            FuelType::Geothermal => "geothermal",
            FuelType::Biomass => "biomass",
            FuelType::Other => "other",
            FuelType::Storage => "storage",
        }
    }
}

impl fmt::Display for FuelType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FuelType {
    type Err = PostgridError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        FuelType::ALL
            .iter()
            .copied()
            .find(|fuel| fuel.as_str() == s)
            .ok_or_else(|| PostgridError::validation(format!("unknown resource type '{s}'")))
    }
}

/// Geographic coordinates of a plant.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub lat: f64,
    pub lon: f64,
}

/// Immutable attributes of one dispatchable unit.
#[derive(Debug, Clone)]
pub struct GeneratorRecord {
    pub id: String,
    pub fuel: FuelType,
    /// Minimum active power output
    pub pmin: Megawatts,
    /// Maximum active power output
    pub pmax: Megawatts,
    pub fuel_cost: FuelPrice,
    pub bus: BusId,
    /// Load zone name, used for area filters
    pub zone: Option<String>,
    pub location: Option<Location>,
}

impl GeneratorRecord {
    /// Create a record with zero limits and no fuel cost.
    pub fn new(id: impl Into<String>, fuel: FuelType, bus: BusId) -> Self {
        Self {
            id: id.into(),
            fuel,
            pmin: Megawatts(0.0),
            pmax: Megawatts(0.0),
            fuel_cost: FuelPrice(0.0),
            bus,
            zone: None,
            location: None,
        }
    }

    /// Set active power limits (in MW)
    pub fn with_p_limits(mut self, pmin: f64, pmax: f64) -> Self {
        self.pmin = Megawatts(pmin);
        self.pmax = Megawatts(pmax);
        self
    }

    /// Set fuel price (in $/MMBtu)
    pub fn with_fuel_cost(mut self, fuel_cost: f64) -> Self {
        self.fuel_cost = FuelPrice(fuel_cost);
        self
    }

    pub fn with_zone(mut self, zone: impl Into<String>) -> Self {
        self.zone = Some(zone.into());
        self
    }

    pub fn with_location(mut self, lat: f64, lon: f64) -> Self {
        self.location = Some(Location { lat, lon });
        self
    }
}

/// Generator records indexed by identifier, in insertion order.
#[derive(Debug, Clone, Default)]
pub struct GeneratorTable {
    records: Vec<GeneratorRecord>,
    by_id: HashMap<String, usize>,
}

impl GeneratorTable {
    /// Build a table, rejecting blank or duplicate identifiers.
    pub fn new(records: Vec<GeneratorRecord>) -> PostgridResult<Self> {
        let mut by_id = HashMap::with_capacity(records.len());
        for (idx, record) in records.iter().enumerate() {
            if record.id.trim().is_empty() {
                return Err(PostgridError::validation(
                    "generator identifiers cannot be empty",
                ));
            }
            if by_id.insert(record.id.clone(), idx).is_some() {
                return Err(PostgridError::validation(format!(
                    "duplicate generator identifier '{}'",
                    record.id
                )));
            }
        }
        tracing::debug!(generators = records.len(), "built generator table");
        Ok(Self { records, by_id })
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &GeneratorRecord> {
        self.records.iter()
    }

    pub fn get(&self, id: &str) -> Option<&GeneratorRecord> {
        self.by_id.get(id).map(|&idx| &self.records[idx])
    }

    /// Look up a generator, failing with a validation error if it is unknown.
    pub fn require(&self, id: &str) -> PostgridResult<&GeneratorRecord> {
        self.get(id).ok_or_else(|| {
            PostgridError::validation(format!("plant '{id}' is not in the generator table"))
        })
    }

    /// Fail unless every identifier is present in the table.
    pub fn check_contains_all<'a, I>(&self, ids: I) -> PostgridResult<()>
    where
        I: IntoIterator<Item = &'a str>,
    {
        for id in ids {
            self.require(id)?;
        }
        Ok(())
    }

    /// Identifiers of generators of the given type, in table order.
    pub fn ids_of_type(&self, fuel: FuelType) -> Vec<&str> {
        self.records
            .iter()
            .filter(|r| r.fuel == fuel)
            .map(|r| r.id.as_str())
            .collect()
    }

    /// All resource types present in the table.
    pub fn resources(&self) -> BTreeSet<FuelType> {
        self.records.iter().map(|r| r.fuel).collect()
    }

    /// Resource types with at least one generator whose Pmax is positive.
    pub fn active_resources(&self) -> BTreeSet<FuelType> {
        self.records
            .iter()
            .filter(|r| r.pmax.value() > 0.0)
            .map(|r| r.fuel)
            .collect()
    }
}
