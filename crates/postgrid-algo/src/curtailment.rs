//! Renewable curtailment: available energy that was not dispatched.

use std::collections::{BTreeMap, BTreeSet};

use postgrid_core::{BusId, FuelType, GeneratorTable, Location, PostgridError, PostgridResult};
use postgrid_ts::{check_non_negative, check_time_series, TimeSeries, DEFAULT_TOLERANCE};

use crate::config::CurtailmentConfig;
use crate::summarize::{total_by_bus, total_by_location, Area};

#[derive(Debug, Clone, Default)]
pub struct CurtailmentCalculator {
    config: CurtailmentConfig,
}

impl CurtailmentCalculator {
    pub fn new(config: CurtailmentConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &CurtailmentConfig {
        &self.config
    }

    /// `max(availability - dispatch, 0)` for every generator present in both
    /// tables, rounded to the configured precision. Generators in only one
    /// table are left out.
    pub fn calculate(
        &self,
        dispatch: &TimeSeries,
        availability: &TimeSeries,
    ) -> PostgridResult<TimeSeries> {
        check_time_series(dispatch, "dispatch")?;
        check_time_series(availability, "availability")?;
        let curtailment =
            availability.zip_with(dispatch, |avail, pg| self.config.round((avail - pg).max(0.0)))?;
        if curtailment.column_count() == 0 {
            return Err(PostgridError::validation(
                "dispatch and availability have no generator in common",
            ));
        }
        tracing::debug!(
            generators = curtailment.column_count(),
            hours = curtailment.row_count(),
            "calculated curtailment"
        );
        Ok(curtailment)
    }

    /// Resources to analyze: the given ones after checking they are
    /// curtailable and present in `plants`, otherwise every curtailable
    /// resource the table contains.
    pub fn resolve_resources(
        &self,
        plants: &GeneratorTable,
        resources: Option<&[FuelType]>,
    ) -> PostgridResult<BTreeSet<FuelType>> {
        let in_grid = plants.resources();
        let Some(resources) = resources else {
            let present: BTreeSet<FuelType> = self
                .config
                .curtailable_resources
                .intersection(&in_grid)
                .copied()
                .collect();
            if present.is_empty() {
                return Err(PostgridError::validation(
                    "generator table has no curtailable resources",
                ));
            }
            return Ok(present);
        };
        if resources.is_empty() {
            return Err(PostgridError::validation("resources cannot be empty"));
        }
        for r in resources {
            if !self.config.curtailable_resources.contains(r) {
                return Err(PostgridError::validation(format!(
                    "'{r}' is not a curtailable resource"
                )));
            }
            if !in_grid.contains(r) {
                return Err(PostgridError::validation(format!(
                    "'{r}' has no generators in the generator table"
                )));
            }
        }
        Ok(resources.iter().copied().collect())
    }

    /// Curtailment of each selected resource's generators. Every generator of
    /// a selected resource must appear in both dispatch and availability.
    pub fn calculate_by_resource(
        &self,
        dispatch: &TimeSeries,
        availability: &TimeSeries,
        plants: &GeneratorTable,
        resources: Option<&[FuelType]>,
    ) -> PostgridResult<BTreeMap<FuelType, TimeSeries>> {
        let resources = self.resolve_resources(plants, resources)?;
        let curtailment = self.calculate(dispatch, availability)?;
        resources
            .into_iter()
            .map(|r| {
                let ids = plants.ids_of_type(r);
                curtailment.select_columns(&ids).map(|ts| (r, ts))
            })
            .collect()
    }

    /// Curtailed share of available energy over the selected resources.
    pub fn percentage_by_resource(
        &self,
        dispatch: &TimeSeries,
        availability: &TimeSeries,
        plants: &GeneratorTable,
        resources: Option<&[FuelType]>,
    ) -> PostgridResult<f64> {
        let by_resource = self.calculate_by_resource(dispatch, availability, plants, resources)?;
        let mut curtailed = 0.0;
        let mut available = 0.0;
        for ts in by_resource.values() {
            curtailed += ts.total();
            let ids: Vec<&str> = ts.column_names().collect();
            available += availability.select_columns(&ids)?.total();
        }
        if available <= 0.0 {
            return Err(PostgridError::validation(
                "selected resources have no available energy",
            ));
        }
        Ok(curtailed / available)
    }

    /// Whole-horizon curtailment per resource and bus.
    pub fn summarize_by_bus(
        &self,
        by_resource: &BTreeMap<FuelType, TimeSeries>,
        plants: &GeneratorTable,
    ) -> PostgridResult<BTreeMap<FuelType, BTreeMap<BusId, f64>>> {
        self.check_by_resource(by_resource, plants)?;
        by_resource
            .iter()
            .map(|(&r, ts)| total_by_bus(ts, plants).map(|totals| (r, totals)))
            .collect()
    }

    /// Whole-horizon curtailment per resource and plant location.
    pub fn summarize_by_location(
        &self,
        by_resource: &BTreeMap<FuelType, TimeSeries>,
        plants: &GeneratorTable,
    ) -> PostgridResult<BTreeMap<FuelType, Vec<(Location, f64)>>> {
        self.check_by_resource(by_resource, plants)?;
        by_resource
            .iter()
            .map(|(&r, ts)| total_by_location(ts, plants).map(|totals| (r, totals)))
            .collect()
    }

    /// Hourly curtailment in `area`, one `<resource>_curtailment` column per
    /// resource that has generators there.
    pub fn time_series_for_area(
        &self,
        by_resource: &BTreeMap<FuelType, TimeSeries>,
        plants: &GeneratorTable,
        area: &Area,
    ) -> PostgridResult<TimeSeries> {
        self.check_by_resource(by_resource, plants)?;
        let mut tables = by_resource.values();
        let Some(first) = tables.next() else {
            return Err(PostgridError::validation("curtailment by resource is empty"));
        };
        if tables.any(|ts| ts.index() != first.index()) {
            return Err(PostgridError::validation(
                "curtailment tables must share the same time index",
            ));
        }

        let mut columns = Vec::new();
        for (r, ts) in by_resource {
            let mut ids = Vec::new();
            for id in ts.column_names() {
                if area.contains(plants.require(id)?) {
                    ids.push(id);
                }
            }
            if ids.is_empty() {
                continue;
            }
            columns.push((format!("{r}_curtailment"), ts.select_columns(&ids)?.row_sums()));
        }
        if columns.is_empty() {
            return Err(PostgridError::validation(format!(
                "no curtailable generators in area {area:?}"
            )));
        }
        first.with_columns(columns)
    }

    fn check_by_resource(
        &self,
        by_resource: &BTreeMap<FuelType, TimeSeries>,
        plants: &GeneratorTable,
    ) -> PostgridResult<()> {
        for (r, ts) in by_resource {
            if !self.config.curtailable_resources.contains(r) {
                return Err(PostgridError::validation(format!(
                    "'{r}' is not a curtailable resource"
                )));
            }
            check_non_negative(ts, &format!("{r} curtailment"), DEFAULT_TOLERANCE)?;
            for id in ts.column_names() {
                let plant = plants.require(id)?;
                if plant.fuel != *r {
                    return Err(PostgridError::validation(format!(
                        "plant '{id}' is {} but listed under {r} curtailment",
                        plant.fuel
                    )));
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn table(columns: Vec<(&str, Vec<f64>)>) -> TimeSeries {
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

    #[test]
    fn over_dispatch_clips_to_zero() {
        let calc = CurtailmentCalculator::default();
        let pg = table(vec![("A", vec![2.0, 1.0, 0.3])]);
        let avail = table(vec![("A", vec![1.0, 1.0, 1.0])]);
        let curtailment = calc.calculate(&pg, &avail).unwrap();
        assert_eq!(curtailment.column("A").unwrap(), &[0.0, 0.0, 0.7]);
    }

    #[test]
    fn only_shared_generators_are_kept() {
        let calc = CurtailmentCalculator::default();
        let pg = table(vec![("A", vec![1.0]), ("G", vec![5.0])]);
        let avail = table(vec![("A", vec![3.0]), ("W", vec![2.0])]);
        let curtailment = calc.calculate(&pg, &avail).unwrap();
        assert_eq!(curtailment.column_names().collect::<Vec<_>>(), vec!["A"]);
    }

    #[test]
    fn disjoint_tables_are_rejected() {
        let calc = CurtailmentCalculator::default();
        let pg = table(vec![("G", vec![5.0])]);
        let avail = table(vec![("W", vec![2.0])]);
        assert!(calc.calculate(&pg, &avail).unwrap_err().is_validation());
    }

    #[test]
    fn rounds_to_configured_precision() {
        let calc = CurtailmentCalculator::default();
        let pg = table(vec![("A", vec![0.1])]);
        let avail = table(vec![("A", vec![0.3])]);
        let curtailment = calc.calculate(&pg, &avail).unwrap();
        assert_eq!(curtailment.column("A").unwrap(), &[0.2]);
    }
}
