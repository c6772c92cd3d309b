//! Polynomial generator cost curves.

use std::collections::BTreeMap;

use crate::error::{PostgridError, PostgridResult};

/// Curve family code for polynomial cost curves (MATPOWER `gencost` model 2).
pub const POLYNOMIAL_CURVE_TYPE: u8 = 2;

/// Cost curve of a single generator.
///
/// `coefficients[i]` multiplies `P^i`, so `[c0, c1, c2]` means
/// `cost = c0 + c1*P + c2*P^2` in $/h. `n` is the declared number of
/// coefficients; the vector may be longer but never shorter for a valid curve.
#[derive(Debug, Clone, PartialEq)]
pub struct CostCurve {
    pub curve_type: u8,
    pub n: usize,
    pub coefficients: Vec<f64>,
}

impl CostCurve {
    /// Polynomial curve whose degree is taken from the coefficient count.
    pub fn polynomial(coefficients: Vec<f64>) -> Self {
        Self {
            curve_type: POLYNOMIAL_CURVE_TYPE,
            n: coefficients.len(),
            coefficients,
        }
    }

    /// Create quadratic cost: c0 + c1*P + c2*P^2
    pub fn quadratic(c0: f64, c1: f64, c2: f64) -> Self {
        Self::polynomial(vec![c0, c1, c2])
    }

    /// Evaluate cost at given power output ($/hr)
    pub fn evaluate(&self, p_mw: f64) -> f64 {
        self.coefficients
            .iter()
            .take(self.n)
            .enumerate()
            .map(|(i, c)| c * p_mw.powi(i as i32))
            .sum()
    }

    fn check(&self, id: &str) -> PostgridResult<()> {
        if self.curve_type != POLYNOMIAL_CURVE_TYPE {
            return Err(PostgridError::validation(format!(
                "cost curve for '{id}' has type {}; only polynomial curves (type {POLYNOMIAL_CURVE_TYPE}) are supported",
                self.curve_type
            )));
        }
        if self.n == 0 {
            return Err(PostgridError::validation(format!(
                "cost curve for '{id}' declares n = 0 coefficients"
            )));
        }
        if self.coefficients.len() < self.n {
            return Err(PostgridError::validation(format!(
                "cost curve for '{id}' is missing coefficient c{}",
                self.coefficients.len()
            )));
        }
        Ok(())
    }
}

/// Cost curves keyed by generator identifier.
#[derive(Debug, Clone, Default)]
pub struct CostCurveTable {
    curves: BTreeMap<String, CostCurve>,
}

impl CostCurveTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, id: impl Into<String>, curve: CostCurve) -> Option<CostCurve> {
        self.curves.insert(id.into(), curve)
    }

    pub fn with_curve(mut self, id: impl Into<String>, curve: CostCurve) -> Self {
        self.insert(id, curve);
        self
    }

    pub fn get(&self, id: &str) -> Option<&CostCurve> {
        self.curves.get(id)
    }

    pub fn len(&self) -> usize {
        self.curves.len()
    }

    pub fn is_empty(&self) -> bool {
        self.curves.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &CostCurve)> {
        self.curves.iter().map(|(id, curve)| (id.as_str(), curve))
    }

    /// Check that every curve is polynomial, all share one degree, and each
    /// declares its coefficients. Returns the shared coefficient count.
    pub fn validate(&self) -> PostgridResult<usize> {
        let mut degree = None;
        for (id, curve) in &self.curves {
            curve.check(id)?;
            match degree {
                None => degree = Some(curve.n),
                Some(n) if n != curve.n => {
                    return Err(PostgridError::validation(format!(
                        "all cost curves must share the same n; '{id}' has n = {} but expected {n}",
                        curve.n
                    )));
                }
                Some(_) => {}
            }
        }
        degree.ok_or_else(|| PostgridError::validation("cost curve table is empty"))
    }
}

impl<S: Into<String>> FromIterator<(S, CostCurve)> for CostCurveTable {
    fn from_iter<I: IntoIterator<Item = (S, CostCurve)>>(iter: I) -> Self {
        Self {
            curves: iter.into_iter().map(|(id, c)| (id.into(), c)).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn evaluates_constant_first_polynomial() {
        let curve = CostCurve::quadratic(100.0, 10.0, 1.0);
        let costs: Vec<f64> = [0.0, 1.0, 2.0, 3.0]
            .iter()
            .map(|&p| curve.evaluate(p))
            .collect();
        assert_eq!(costs, vec![100.0, 111.0, 124.0, 139.0]);
    }

    #[test]
    fn evaluate_ignores_coefficients_beyond_n() {
        let curve = CostCurve {
            curve_type: POLYNOMIAL_CURVE_TYPE,
            n: 2,
            coefficients: vec![5.0, 2.0, 100.0],
        };
        assert_eq!(curve.evaluate(3.0), 11.0);
    }

    #[test]
    fn validate_returns_shared_degree() {
        let table: CostCurveTable = [
            ("a", CostCurve::quadratic(1.0, 2.0, 3.0)),
            ("b", CostCurve::quadratic(0.0, 0.0, 0.0)),
        ]
        .into_iter()
        .collect();
        assert_eq!(table.validate().unwrap(), 3);
    }

    #[test]
    fn validate_rejects_mixed_degree() {
        let table = CostCurveTable::new()
            .with_curve("a", CostCurve::quadratic(1.0, 2.0, 3.0))
            .with_curve("b", CostCurve::polynomial(vec![1.0, 2.0]));
        let err = table.validate().unwrap_err();
        assert!(err.to_string().contains("same n"));
    }

    #[test]
    fn validate_rejects_non_polynomial_type() {
        let mut curve = CostCurve::quadratic(1.0, 2.0, 3.0);
        curve.curve_type = 1;
        let table = CostCurveTable::new().with_curve("a", curve);
        let err = table.validate().unwrap_err();
        assert!(err.to_string().contains("type 1"));
    }

    #[test]
    fn validate_names_missing_coefficient() {
        let curve = CostCurve {
            curve_type: POLYNOMIAL_CURVE_TYPE,
            n: 3,
            coefficients: vec![1.0, 2.0],
        };
        let table = CostCurveTable::new().with_curve("a", curve);
        let err = table.validate().unwrap_err();
        assert!(err.to_string().contains("c2"), "got: {err}");
    }

    #[test]
    fn validate_rejects_empty_table() {
        assert!(CostCurveTable::new().validate().is_err());
    }
}
