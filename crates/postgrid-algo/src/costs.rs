//! Hourly generation cost from polynomial cost curves.

use postgrid_core::{CostCurveTable, PostgridError, PostgridResult};
use postgrid_ts::{check_non_negative, TimeSeries, DEFAULT_TOLERANCE};

/// Unit-commitment assumption applied when evaluating cost curves.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Commitment {
    /// Every unit pays its curve every hour, even at zero output.
    AlwaysOn,
    /// Units dispatched below the threshold (MW) are off and cost nothing.
    Decommit { threshold: f64 },
}

/// Evaluate each generator's cost curve against its hourly dispatch ($/h).
///
/// The result has the same index, zone and columns as `dispatch`.
pub fn calculate_costs(
    dispatch: &TimeSeries,
    curves: &CostCurveTable,
    commitment: Commitment,
) -> PostgridResult<TimeSeries> {
    check_non_negative(dispatch, "dispatch", DEFAULT_TOLERANCE)?;
    let n = curves.validate()?;
    let missing: Vec<&str> = dispatch
        .column_names()
        .filter(|id| curves.get(id).is_none())
        .collect();
    if !missing.is_empty() {
        return Err(PostgridError::validation(format!(
            "cost curves are missing for dispatch columns: {}",
            missing.join(", ")
        )));
    }
    if let Commitment::Decommit { threshold } = commitment {
        if !(threshold.is_finite() && threshold >= 0.0) {
            return Err(PostgridError::validation(format!(
                "decommit threshold must be non-negative, got {threshold}"
            )));
        }
    }

    let mut columns = Vec::with_capacity(dispatch.column_count());
    for (id, values) in dispatch.columns() {
        let Some(curve) = curves.get(id) else {
            continue;
        };
        let costs = values
            .iter()
            .map(|&p| match commitment {
                Commitment::Decommit { threshold } if p < threshold => 0.0,
                _ => curve.evaluate(p),
            })
            .collect();
        columns.push((id.to_string(), costs));
    }
    tracing::debug!(
        generators = columns.len(),
        hours = dispatch.row_count(),
        coefficients = n,
        ?commitment,
        "evaluated cost curves"
    );
    dispatch.with_columns(columns)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use postgrid_core::CostCurve;

    fn dispatch(columns: Vec<(&str, Vec<f64>)>) -> TimeSeries {
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

    fn curves() -> CostCurveTable {
        CostCurveTable::new().with_curve("A", CostCurve::quadratic(100.0, 10.0, 1.0))
    }

    #[test]
    fn quadratic_curve_costs() {
        let costs = calculate_costs(
            &dispatch(vec![("A", vec![0.0, 1.0, 2.0, 3.0])]),
            &curves(),
            Commitment::AlwaysOn,
        )
        .unwrap();
        assert_eq!(costs.column("A").unwrap(), &[100.0, 111.0, 124.0, 139.0]);
    }

    #[test]
    fn decommit_zeroes_hours_below_threshold() {
        let costs = calculate_costs(
            &dispatch(vec![("A", vec![0.0, 0.5, 1.0, 3.0])]),
            &curves(),
            Commitment::Decommit { threshold: 1.0 },
        )
        .unwrap();
        assert_eq!(costs.column("A").unwrap(), &[0.0, 0.0, 111.0, 139.0]);
    }

    #[test]
    fn missing_curve_is_rejected() {
        let err = calculate_costs(
            &dispatch(vec![("A", vec![1.0]), ("B", vec![1.0])]),
            &curves(),
            Commitment::AlwaysOn,
        )
        .unwrap_err();
        assert!(err.is_validation());
        assert!(err.to_string().contains("B"), "unexpected message: {err}");
    }

    #[test]
    fn negative_dispatch_is_rejected() {
        let err = calculate_costs(
            &dispatch(vec![("A", vec![1.0, -0.5])]),
            &curves(),
            Commitment::AlwaysOn,
        )
        .unwrap_err();
        assert!(err.to_string().contains("non-negative"));
    }

    #[test]
    fn small_negative_dispatch_within_tolerance_is_accepted() {
        let costs = calculate_costs(
            &dispatch(vec![("A", vec![-1e-4])]),
            &curves(),
            Commitment::AlwaysOn,
        )
        .unwrap();
        assert!((costs.column("A").unwrap()[0] - 100.0).abs() < 1e-2);
    }

    #[test]
    fn mismatched_curve_lengths_are_rejected() {
        let table = curves().with_curve("B", CostCurve::polynomial(vec![1.0, 2.0]));
        let err = calculate_costs(
            &dispatch(vec![("A", vec![1.0]), ("B", vec![1.0])]),
            &table,
            Commitment::AlwaysOn,
        )
        .unwrap_err();
        assert!(err.to_string().contains("same n"));
    }
}
