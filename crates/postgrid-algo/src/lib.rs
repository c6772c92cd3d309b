//! # postgrid-algo: Analytics over Grid Simulation Output
//!
//! Turns hourly dispatch from a production-cost simulation into cost,
//! emissions, curtailment and capacity figures. Every operation is a pure
//! function of in-memory tables ([`postgrid_ts::TimeSeries`],
//! [`postgrid_core::GeneratorTable`], [`postgrid_core::CostCurveTable`]) and
//! fails with a validation error before producing any output if its inputs
//! break the contract.
//!
//! ## Emissions
//!
//! | Method | Source of heat input | Pollutants |
//! |--------|----------------------|------------|
//! | [`EmissionMethod::Simple`] | fixed kg/MWh per fuel | carbon, NOx, SO2 |
//! | [`EmissionMethod::AlwaysOn`] | cost curve / fuel price | carbon |
//! | [`EmissionMethod::Decommit`] | as always-on, zero below threshold | carbon |
//!
//! ## Curtailment
//!
//! [`CurtailmentCalculator`] compares dispatch with the availability profile
//! of renewable units and breaks the result down by resource, bus, location
//! and area.
//!
//! ## Configuration
//!
//! Factors and resource sets live in [`AnalysisConfig`], which can be loaded
//! from TOML. Defaults match the reference US factors.
//!
//! ## Example
//!
//! ```rust
//! use chrono::NaiveDate;
//! use postgrid_algo::{EmissionMethod, EmissionsEstimator, Pollutant};
//! use postgrid_core::{BusId, FuelType, GeneratorRecord, GeneratorTable};
//! use postgrid_ts::TimeSeries;
//!
//! let plants = GeneratorTable::new(vec![
//!     GeneratorRecord::new("coal_1", FuelType::Coal, BusId::new(1))
//!         .with_p_limits(0.0, 500.0),
//! ])
//! .unwrap();
//! let start = NaiveDate::from_ymd_opt(2016, 1, 1).unwrap().and_hms_opt(0, 0, 0).unwrap();
//! let dispatch =
//!     TimeSeries::hourly(start, 2, vec![("coal_1".into(), vec![100.0, 200.0])]).unwrap();
//!
//! let tonnes = EmissionsEstimator::default()
//!     .estimate(&dispatch, &plants, None, Pollutant::Carbon, EmissionMethod::Simple)
//!     .unwrap();
//! assert_eq!(tonnes.column("coal_1").unwrap(), &[100.1, 200.2]);
//! ```

pub mod capacity;
pub mod config;
pub mod costs;
pub mod curtailment;
pub mod emissions;
pub mod summarize;

pub use capacity::{
    capacity_by_resource, capacity_factor_time_series, net_demand_time_series,
    net_load_duration_capacity_value, net_load_peak_capacity_value,
};
pub use config::{AnalysisConfig, CurtailmentConfig, EmissionsConfig};
pub use costs::{calculate_costs, Commitment};
pub use curtailment::CurtailmentCalculator;
pub use emissions::{EmissionMethod, EmissionsEstimator, Pollutant};
pub use summarize::{
    active_resources_in_grid, plant_ids_in_area, resources_in_grid, sum_capacity_by_type_zone,
    sum_generation_by_type_zone, summarize_plant_to_bus, summarize_plant_to_location, total_by_bus,
    total_by_location, Area,
};
