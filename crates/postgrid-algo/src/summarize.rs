//! Roll generator-level results up to buses, locations, fuels and zones.

use std::collections::{BTreeMap, BTreeSet};

use postgrid_core::{
    BusId, FuelType, GeneratorRecord, GeneratorTable, Location, PostgridError, PostgridResult,
};
use postgrid_ts::{check_time_series, TimeSeries};

/// Geographic filter over generators.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Area {
    All,
    /// Plants whose load zone has this name.
    Zone(String),
}

impl Area {
    pub fn contains(&self, plant: &GeneratorRecord) -> bool {
        match self {
            Area::All => true,
            Area::Zone(name) => plant.zone.as_deref() == Some(name.as_str()),
        }
    }
}

/// Identifiers of generators of the given resources inside `area`, in table
/// order.
pub fn plant_ids_in_area<'a>(
    plants: &'a GeneratorTable,
    resources: &[FuelType],
    area: &Area,
) -> Vec<&'a str> {
    plants
        .iter()
        .filter(|p| resources.contains(&p.fuel) && area.contains(p))
        .map(|p| p.id.as_str())
        .collect()
}

/// Sum generator columns into one column per bus (named by bus id).
pub fn summarize_plant_to_bus(
    ts: &TimeSeries,
    plants: &GeneratorTable,
) -> PostgridResult<TimeSeries> {
    check_time_series(ts, "time series")?;
    ts.aggregate_columns(|id| Ok(plants.require(id)?.bus.to_string()))
}

/// Sum generator columns into one column per location, named `"lat,lon"`.
pub fn summarize_plant_to_location(
    ts: &TimeSeries,
    plants: &GeneratorTable,
) -> PostgridResult<TimeSeries> {
    check_time_series(ts, "time series")?;
    ts.aggregate_columns(|id| {
        let loc = location_of(plants, id)?;
        Ok(format!("{},{}", loc.lat, loc.lon))
    })
}

/// Whole-horizon total per bus.
pub fn total_by_bus(
    ts: &TimeSeries,
    plants: &GeneratorTable,
) -> PostgridResult<BTreeMap<BusId, f64>> {
    let mut totals = BTreeMap::new();
    for (id, total) in ts.column_sums() {
        *totals.entry(plants.require(&id)?.bus).or_insert(0.0) += total;
    }
    Ok(totals)
}

/// Whole-horizon total per location, in order of first appearance.
pub fn total_by_location(
    ts: &TimeSeries,
    plants: &GeneratorTable,
) -> PostgridResult<Vec<(Location, f64)>> {
    let mut totals: Vec<(Location, f64)> = Vec::new();
    for (id, total) in ts.column_sums() {
        let loc = location_of(plants, &id)?;
        match totals.iter_mut().find(|(l, _)| *l == loc) {
            Some((_, acc)) => *acc += total,
            None => totals.push((loc, total)),
        }
    }
    Ok(totals)
}

fn location_of(plants: &GeneratorTable, id: &str) -> PostgridResult<Location> {
    plants
        .require(id)?
        .location
        .ok_or_else(|| PostgridError::validation(format!("plant '{id}' has no lat/lon")))
}

/// Total energy (MWh) per `(fuel, zone)` over the whole horizon.
pub fn sum_generation_by_type_zone(
    dispatch: &TimeSeries,
    plants: &GeneratorTable,
) -> PostgridResult<BTreeMap<(FuelType, String), f64>> {
    check_time_series(dispatch, "dispatch")?;
    let mut totals = BTreeMap::new();
    for (id, total) in dispatch.column_sums() {
        let plant = plants.require(&id)?;
        *totals.entry((plant.fuel, zone_of(plant)?)).or_insert(0.0) += total;
    }
    Ok(totals)
}

/// Total Pmax per `(fuel, zone)`. Combinations without generators are absent.
pub fn sum_capacity_by_type_zone(
    plants: &GeneratorTable,
) -> PostgridResult<BTreeMap<(FuelType, String), f64>> {
    let mut totals = BTreeMap::new();
    for plant in plants.iter() {
        *totals.entry((plant.fuel, zone_of(plant)?)).or_insert(0.0) += plant.pmax.value();
    }
    Ok(totals)
}

fn zone_of(plant: &GeneratorRecord) -> PostgridResult<String> {
    plant
        .zone
        .clone()
        .ok_or_else(|| PostgridError::validation(format!("plant '{}' has no zone", plant.id)))
}

pub fn resources_in_grid(plants: &GeneratorTable) -> BTreeSet<FuelType> {
    plants.resources()
}

/// Resources with at least one generator of positive capacity.
pub fn active_resources_in_grid(plants: &GeneratorTable) -> BTreeSet<FuelType> {
    plants.active_resources()
}
