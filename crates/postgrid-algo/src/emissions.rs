//! Pollutant emissions estimated from hourly dispatch.
//!
//! Three estimation methods are available:
//!
//! * [`EmissionMethod::Simple`] multiplies energy by a per-fuel intensity
//!   (kg/MWh). Works for every [`Pollutant`].
//! * [`EmissionMethod::AlwaysOn`] derives heat input from the cost curve
//!   (`cost / fuel_cost`, MMBtu/h) and multiplies by the fuel's carbon
//!   content. No-load cost is charged every hour, so idle units still emit.
//! * [`EmissionMethod::Decommit`] is the heat-rate method with units below the
//!   decommit threshold treated as offline.
//!
//! Heat-rate methods only apply to carbon. All results are in tonnes.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use postgrid_core::{
    BusId, CostCurveTable, FuelType, GeneratorTable, PostgridError, PostgridResult,
};
use postgrid_ts::{check_non_negative, TimeSeries, DEFAULT_TOLERANCE};

use crate::config::EmissionsConfig;
use crate::costs::{calculate_costs, Commitment};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Pollutant {
    Carbon,
    Nox,
    So2,
}

impl Pollutant {
    /// Estimation methods that can be used for this pollutant.
    pub fn allowed_methods(&self) -> &'static [EmissionMethod] {
        match self {
            Pollutant::Carbon => &[
                EmissionMethod::Simple,
                EmissionMethod::AlwaysOn,
                EmissionMethod::Decommit,
            ],
            Pollutant::Nox | Pollutant::So2 => &[EmissionMethod::Simple],
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Pollutant::Carbon => "carbon",
            Pollutant::Nox => "nox",
            Pollutant::So2 => "so2",
        }
    }
}

impl fmt::Display for Pollutant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Pollutant {
    type Err = PostgridError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "carbon" => Ok(Pollutant::Carbon),
            "nox" => Ok(Pollutant::Nox),
            "so2" => Ok(Pollutant::So2),
            other => Err(PostgridError::validation(format!(
                "unknown pollutant '{other}'; expected one of carbon, nox, so2"
            ))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EmissionMethod {
    Simple,
    AlwaysOn,
    Decommit,
}

impl EmissionMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            EmissionMethod::Simple => "simple",
            EmissionMethod::AlwaysOn => "always-on",
            EmissionMethod::Decommit => "decommit",
        }
    }
}

impl fmt::Display for EmissionMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EmissionMethod {
    type Err = PostgridError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "simple" => Ok(EmissionMethod::Simple),
            "always-on" => Ok(EmissionMethod::AlwaysOn),
            "decommit" => Ok(EmissionMethod::Decommit),
            other => Err(PostgridError::validation(format!(
                "unknown emission method '{other}'; expected one of simple, always-on, decommit"
            ))),
        }
    }
}

/// Emissions estimator bound to a set of emission factors.
#[derive(Debug, Clone, Default)]
pub struct EmissionsEstimator {
    config: EmissionsConfig,
}

impl EmissionsEstimator {
    pub fn new(config: EmissionsConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &EmissionsConfig {
        &self.config
    }

    fn intensity_per_mwh(&self, pollutant: Pollutant) -> &BTreeMap<FuelType, f64> {
        match pollutant {
            Pollutant::Carbon => &self.config.carbon_per_mwh,
            Pollutant::Nox => &self.config.nox_per_mwh,
            Pollutant::So2 => &self.config.so2_per_mwh,
        }
    }

    /// Hourly emissions (tonnes) of `pollutant` for every dispatch column.
    ///
    /// Columns must all be in `plants`. Heat-rate methods need `cost_curves`
    /// for every carbon-emitting generator in the dispatch and a positive
    /// fuel cost for each of them. Generators whose fuel has no factor emit
    /// nothing.
    pub fn estimate(
        &self,
        dispatch: &TimeSeries,
        plants: &GeneratorTable,
        cost_curves: Option<&CostCurveTable>,
        pollutant: Pollutant,
        method: EmissionMethod,
    ) -> PostgridResult<TimeSeries> {
        if !pollutant.allowed_methods().contains(&method) {
            let allowed: Vec<&str> = pollutant
                .allowed_methods()
                .iter()
                .map(EmissionMethod::as_str)
                .collect();
            return Err(PostgridError::validation(format!(
                "method for {pollutant} must be one of: {}",
                allowed.join(", ")
            )));
        }
        check_non_negative(dispatch, "dispatch", DEFAULT_TOLERANCE)?;
        plants.check_contains_all(dispatch.column_names())?;

        let emissions = match method {
            EmissionMethod::Simple => self.simple(dispatch, plants, pollutant)?,
            EmissionMethod::AlwaysOn => {
                self.heat_rate(dispatch, plants, cost_curves, Commitment::AlwaysOn)?
            }
            EmissionMethod::Decommit => self.heat_rate(
                dispatch,
                plants,
                cost_curves,
                Commitment::Decommit {
                    threshold: self.config.decommit_threshold,
                },
            )?,
        };

        if let Some(min) = emissions.min_value() {
            if min < -DEFAULT_TOLERANCE {
                return Err(PostgridError::validation(format!(
                    "{method} emissions came out negative ({min}); check cost curves"
                )));
            }
        }
        // Dispatch within tolerance of zero can still yield tiny negatives.
        let emissions = emissions.map_values(|v| v.max(0.0));
        tracing::debug!(
            %pollutant,
            %method,
            generators = emissions.column_count(),
            hours = emissions.row_count(),
            total_tonnes = emissions.total(),
            "estimated emissions"
        );
        Ok(emissions)
    }

    fn simple(
        &self,
        dispatch: &TimeSeries,
        plants: &GeneratorTable,
        pollutant: Pollutant,
    ) -> PostgridResult<TimeSeries> {
        let intensity = self.intensity_per_mwh(pollutant);
        let mut columns = Vec::with_capacity(dispatch.column_count());
        for (id, values) in dispatch.columns() {
            let fuel = plants.require(id)?.fuel;
            let kg_per_mwh = intensity.get(&fuel).copied().unwrap_or(0.0);
            let tonnes = values.iter().map(|p| p * kg_per_mwh / 1000.0).collect();
            columns.push((id.to_string(), tonnes));
        }
        dispatch.with_columns(columns)
    }

    fn heat_rate(
        &self,
        dispatch: &TimeSeries,
        plants: &GeneratorTable,
        cost_curves: Option<&CostCurveTable>,
        commitment: Commitment,
    ) -> PostgridResult<TimeSeries> {
        let curves = cost_curves.ok_or_else(|| {
            PostgridError::validation("heat-rate emission methods require cost curves")
        })?;

        let mut emitters = Vec::new();
        for id in dispatch.column_names() {
            let plant = plants.require(id)?;
            if !self.config.carbon_per_mmbtu.contains_key(&plant.fuel) {
                continue;
            }
            if !(plant.fuel_cost.value() > 0.0) {
                return Err(PostgridError::validation(format!(
                    "fuel_cost of {} plant '{id}' must be positive, got {}",
                    plant.fuel, plant.fuel_cost
                )));
            }
            emitters.push(id);
        }

        let costs = if emitters.is_empty() {
            None
        } else {
            let subset: CostCurveTable = emitters
                .iter()
                .map(|&id| {
                    curves.get(id).cloned().map(|c| (id, c)).ok_or_else(|| {
                        PostgridError::validation(format!("no cost curve for plant '{id}'"))
                    })
                })
                .collect::<PostgridResult<Vec<_>>>()?
                .into_iter()
                .collect();
            Some(calculate_costs(
                &dispatch.select_columns(&emitters)?,
                &subset,
                commitment,
            )?)
        };

        let mut columns = Vec::with_capacity(dispatch.column_count());
        for id in dispatch.column_names() {
            let plant = plants.require(id)?;
            let cost = costs.as_ref().and_then(|c| c.column(id));
            let values = match (cost, self.config.carbon_per_mmbtu.get(&plant.fuel)) {
                (Some(cost), Some(&kg_c_per_mmbtu)) => cost
                    .iter()
                    .map(|&c| {
                        plant.fuel_cost.heat_input(c) * kg_c_per_mmbtu * self.config.carbon_to_co2
                            / 1000.0
                    })
                    .collect(),
                _ => vec![0.0; dispatch.row_count()],
            };
            columns.push((id.to_string(), values));
        }
        dispatch.with_columns(columns)
    }

    /// Total emissions per carbon-emitting fuel and bus.
    ///
    /// Every carbon resource appears as a key; buses whose total is not
    /// positive are left out.
    pub fn summarize_by_bus(
        &self,
        emissions: &TimeSeries,
        plants: &GeneratorTable,
    ) -> PostgridResult<BTreeMap<FuelType, BTreeMap<BusId, f64>>> {
        check_non_negative(emissions, "emissions", DEFAULT_TOLERANCE)?;
        let mut totals: BTreeMap<FuelType, BTreeMap<BusId, f64>> = self
            .config
            .carbon_resources
            .iter()
            .map(|&fuel| (fuel, BTreeMap::new()))
            .collect();
        for (id, total) in emissions.column_sums() {
            let plant = plants.require(&id)?;
            if let Some(by_bus) = totals.get_mut(&plant.fuel) {
                *by_bus.entry(plant.bus).or_insert(0.0) += total;
            }
        }
        for by_bus in totals.values_mut() {
            by_bus.retain(|_, total| *total > 0.0);
        }
        Ok(totals)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_names() {
        assert_eq!("carbon".parse::<Pollutant>().unwrap(), Pollutant::Carbon);
        assert_eq!("so2".parse::<Pollutant>().unwrap(), Pollutant::So2);
        assert!("co2".parse::<Pollutant>().is_err());
        assert_eq!(
            "always-on".parse::<EmissionMethod>().unwrap(),
            EmissionMethod::AlwaysOn
        );
        assert!("always_on".parse::<EmissionMethod>().is_err());
    }

    #[test]
    fn only_carbon_allows_heat_rate_methods() {
        assert_eq!(Pollutant::Carbon.allowed_methods().len(), 3);
        assert_eq!(Pollutant::Nox.allowed_methods(), &[EmissionMethod::Simple]);
        assert_eq!(Pollutant::So2.allowed_methods(), &[EmissionMethod::Simple]);
    }

    #[test]
    fn display_round_trips_through_from_str() {
        for method in Pollutant::Carbon.allowed_methods() {
            assert_eq!(method.to_string().parse::<EmissionMethod>().unwrap(), *method);
        }
    }
}
