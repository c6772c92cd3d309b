//! Nameplate capacity, capacity factors and capacity value of resources.
//!
//! Capacity value compares peak demand with peak *net* demand (demand minus
//! the output of the resources under study) over the top `hours` hours.

use std::collections::{BTreeMap, BTreeSet};

use postgrid_core::{FuelType, GeneratorTable, PostgridError, PostgridResult};
use postgrid_ts::{check_time_series, TimeSeries};

use crate::summarize::{plant_ids_in_area, Area};

/// Hourly `dispatch / Pmax` for the given generators, clipped to `[0, 1]`.
/// Generators with zero capacity get a factor of zero.
pub fn capacity_factor_time_series<S: AsRef<str>>(
    dispatch: &TimeSeries,
    plants: &GeneratorTable,
    ids: &[S],
) -> PostgridResult<TimeSeries> {
    check_time_series(dispatch, "dispatch")?;
    let selected = dispatch.select_columns(ids)?;
    let mut columns = Vec::with_capacity(selected.column_count());
    for (id, values) in selected.columns() {
        let pmax = plants.require(id)?.pmax.value();
        let factors = values
            .iter()
            .map(|&p| if pmax > 0.0 { (p / pmax).clamp(0.0, 1.0) } else { 0.0 })
            .collect();
        columns.push((id.to_string(), factors));
    }
    selected.with_columns(columns)
}

/// Total Pmax of each resource inside `area`. Resources without generators
/// there are omitted.
pub fn capacity_by_resource(
    plants: &GeneratorTable,
    resources: &[FuelType],
    area: &Area,
) -> PostgridResult<BTreeMap<FuelType, f64>> {
    if resources.is_empty() {
        return Err(PostgridError::validation("resources cannot be empty"));
    }
    let mut totals = BTreeMap::new();
    for id in plant_ids_in_area(plants, resources, area) {
        let plant = plants.require(id)?;
        *totals.entry(plant.fuel).or_insert(0.0) += plant.pmax.value();
    }
    Ok(totals)
}

/// Hourly demand of `area` minus the output of `resources` there, as a single
/// `net_demand` column.
///
/// `demand` has one column per load zone; [`Area::All`] sums every zone.
pub fn net_demand_time_series(
    demand: &TimeSeries,
    dispatch: &TimeSeries,
    plants: &GeneratorTable,
    resources: &[FuelType],
    area: &Area,
) -> PostgridResult<TimeSeries> {
    check_time_series(demand, "demand")?;
    check_time_series(dispatch, "dispatch")?;
    if demand.index() != dispatch.index() {
        return Err(PostgridError::validation(
            "demand and dispatch must share the same time index",
        ));
    }
    if resources.is_empty() {
        return Err(PostgridError::validation("resources cannot be empty"));
    }
    let area_demand = match area {
        Area::All => demand.row_sums(),
        Area::Zone(zone) => demand
            .column(zone)
            .ok_or_else(|| PostgridError::validation(format!("no demand for zone '{zone}'")))?
            .to_vec(),
    };
    let ids = plant_ids_in_area(plants, resources, area);
    let generation = dispatch.select_columns(&ids)?.row_sums();
    let net = area_demand
        .iter()
        .zip(&generation)
        .map(|(d, g)| d - g)
        .collect();
    tracing::debug!(?area, generators = ids.len(), "computed net demand");
    demand.with_columns(vec![("net_demand".to_string(), net)])
}

/// Mean of the top `hours` total demand minus mean of the top `hours` net
/// demand.
pub fn net_load_duration_capacity_value(
    demand: &TimeSeries,
    dispatch: &TimeSeries,
    plants: &GeneratorTable,
    resources: &[FuelType],
    hours: usize,
) -> PostgridResult<f64> {
    let load = NetLoad::new(demand, dispatch, plants, resources, hours)?;
    let peak = mean_of(&load.demand, &load.top_hours(&load.demand));
    let net_peak = mean_of(&load.net, &load.top_hours(&load.net));
    Ok(peak - net_peak)
}

/// Mean output of the resources during the top `hours` net-demand hours.
pub fn net_load_peak_capacity_value(
    demand: &TimeSeries,
    dispatch: &TimeSeries,
    plants: &GeneratorTable,
    resources: &[FuelType],
    hours: usize,
) -> PostgridResult<f64> {
    let load = NetLoad::new(demand, dispatch, plants, resources, hours)?;
    Ok(mean_of(&load.generation, &load.top_hours(&load.net)))
}

struct NetLoad {
    demand: Vec<f64>,
    generation: Vec<f64>,
    net: Vec<f64>,
    hours: usize,
}

impl NetLoad {
    fn new(
        demand: &TimeSeries,
        dispatch: &TimeSeries,
        plants: &GeneratorTable,
        resources: &[FuelType],
        hours: usize,
    ) -> PostgridResult<Self> {
        check_time_series(demand, "demand")?;
        check_time_series(dispatch, "dispatch")?;
        if demand.index() != dispatch.index() {
            return Err(PostgridError::validation(
                "demand and dispatch must share the same time index",
            ));
        }
        if hours == 0 || hours > demand.row_count() {
            return Err(PostgridError::validation(format!(
                "hours must be in 1..={}, got {hours}",
                demand.row_count()
            )));
        }
        let resources: BTreeSet<FuelType> = resources.iter().copied().collect();
        if resources.is_empty() {
            return Err(PostgridError::validation("resources cannot be empty"));
        }
        let in_grid = plants.resources();
        if let Some(missing) = resources.difference(&in_grid).next() {
            return Err(PostgridError::validation(format!(
                "'{missing}' has no generators in the generator table"
            )));
        }

        let ids: Vec<&str> = resources
            .iter()
            .flat_map(|&r| plants.ids_of_type(r))
            .collect();
        let demand = demand.row_sums();
        let generation = dispatch.select_columns(&ids)?.row_sums();
        let net = demand.iter().zip(&generation).map(|(d, g)| d - g).collect();
        Ok(Self {
            demand,
            generation,
            net,
            hours,
        })
    }

    /// Row positions of the `hours` largest values; ties keep time order.
    fn top_hours(&self, values: &[f64]) -> Vec<usize> {
        let mut order: Vec<usize> = (0..values.len()).collect();
        order.sort_by(|&a, &b| values[b].total_cmp(&values[a]));
        order.truncate(self.hours);
        order
    }
}

fn mean_of(values: &[f64], rows: &[usize]) -> f64 {
    rows.iter().map(|&r| values[r]).sum::<f64>() / rows.len() as f64
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use postgrid_core::{BusId, GeneratorRecord};

    fn hourly(columns: Vec<(&str, Vec<f64>)>) -> TimeSeries {
        let start = NaiveDate::from_ymd_opt(2016, 1, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        let rows = columns[0].1.len();
        TimeSeries::hourly(
            start,
            rows,
            columns.into_iter().map(|(k, v)| (k.to_string(), v)).collect(),
        )
        .unwrap()
    }

    fn plants() -> GeneratorTable {
        GeneratorTable::new(vec![
            GeneratorRecord::new("A", FuelType::Solar, BusId::new(1))
                .with_p_limits(0.0, 10.0)
                .with_zone("Washington"),
            GeneratorRecord::new("B", FuelType::Wind, BusId::new(2))
                .with_p_limits(0.0, 20.0)
                .with_zone("Bay Area"),
            GeneratorRecord::new("C", FuelType::Coal, BusId::new(3))
                .with_p_limits(0.0, 100.0)
                .with_zone("Bay Area"),
            GeneratorRecord::new("D", FuelType::Wind, BusId::new(4)).with_zone("Bay Area"),
        ])
        .unwrap()
    }

    fn demand() -> TimeSeries {
        hourly(vec![
            ("Washington", vec![40.0, 50.0, 60.0, 50.0]),
            ("Bay Area", vec![40.0, 50.0, 60.0, 70.0]),
        ])
    }

    fn dispatch() -> TimeSeries {
        hourly(vec![
            ("A", vec![0.0, 5.0, 10.0, 0.0]),
            ("B", vec![10.0, 25.0, 10.0, 5.0]),
            ("C", vec![70.0, 70.0, 100.0, 100.0]),
            ("D", vec![0.0, 0.0, 0.0, 0.0]),
        ])
    }

    #[test]
    fn capacity_factor_clips_and_handles_zero_capacity() {
        let cf = capacity_factor_time_series(&dispatch(), &plants(), &["A", "B", "D"]).unwrap();
        assert_eq!(cf.column("A").unwrap(), &[0.0, 0.5, 1.0, 0.0]);
        assert_eq!(cf.column("B").unwrap(), &[0.5, 1.0, 0.5, 0.25]);
        assert_eq!(cf.column("D").unwrap(), &[0.0; 4]);
    }

    #[test]
    fn capacity_factor_requires_known_columns() {
        assert!(capacity_factor_time_series(&dispatch(), &plants(), &["Z"]).is_err());
    }

    #[test]
    fn capacity_sums_pmax_in_area() {
        let all = capacity_by_resource(&plants(), &[FuelType::Wind, FuelType::Solar], &Area::All)
            .unwrap();
        assert_eq!(all[&FuelType::Wind], 20.0);
        assert_eq!(all[&FuelType::Solar], 10.0);

        let bay = capacity_by_resource(
            &plants(),
            &[FuelType::Solar, FuelType::Coal],
            &Area::Zone("Bay Area".into()),
        )
        .unwrap();
        assert_eq!(bay.len(), 1);
        assert_eq!(bay[&FuelType::Coal], 100.0);
    }

    #[test]
    fn net_load_duration_value() {
        // demand      [80, 100, 120, 120]
        // solar+wind  [10,  30,  20,   5]
        // net         [70,  70, 100, 115]
        let value = net_load_duration_capacity_value(
            &demand(),
            &dispatch(),
            &plants(),
            &[FuelType::Solar, FuelType::Wind],
            2,
        )
        .unwrap();
        assert!((value - (120.0 - 107.5)).abs() < 1e-9);
    }

    #[test]
    fn net_load_peak_value() {
        let value = net_load_peak_capacity_value(
            &demand(),
            &dispatch(),
            &plants(),
            &[FuelType::Solar, FuelType::Wind],
            2,
        )
        .unwrap();
        assert!((value - 12.5).abs() < 1e-9);
    }

    #[test]
    fn hours_must_fit_the_horizon() {
        for hours in [0, 5] {
            let err = net_load_peak_capacity_value(
                &demand(),
                &dispatch(),
                &plants(),
                &[FuelType::Wind],
                hours,
            )
            .unwrap_err();
            assert!(err.to_string().contains("hours must be in 1..=4"));
        }
    }

    #[test]
    fn resources_must_be_in_grid() {
        let err =
            net_load_duration_capacity_value(&demand(), &dispatch(), &plants(), &[FuelType::Ng], 1)
                .unwrap_err();
        assert!(err.to_string().contains("'ng'"));
    }

    #[test]
    fn net_demand_for_whole_grid() {
        let renewables = [FuelType::Solar, FuelType::Wind];
        let net = net_demand_time_series(&demand(), &dispatch(), &plants(), &renewables, &Area::All)
            .unwrap();
        assert_eq!(net.column_names().collect::<Vec<_>>(), vec!["net_demand"]);
        assert_eq!(net.column("net_demand").unwrap(), &[70.0, 70.0, 100.0, 115.0]);
        assert_eq!(net.index(), demand().index());
    }

    #[test]
    fn net_demand_for_one_zone() {
        let net = net_demand_time_series(
            &demand(),
            &dispatch(),
            &plants(),
            &[FuelType::Solar, FuelType::Wind],
            &Area::Zone("Bay Area".into()),
        )
        .unwrap();
        assert_eq!(net.column("net_demand").unwrap(), &[30.0, 25.0, 50.0, 65.0]);
    }

    #[test]
    fn net_demand_needs_zone_demand() {
        let err = net_demand_time_series(
            &demand(),
            &dispatch(),
            &plants(),
            &[FuelType::Wind],
            &Area::Zone("Texas".into()),
        )
        .unwrap_err();
        assert!(err.to_string().contains("no demand for zone 'Texas'"));
    }
}
