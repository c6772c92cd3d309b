//! Unit newtypes for generator attributes.
//!
//! Generator tables mix capacities (MW) with fuel prices ($/MMBtu) and it is
//! easy to hand one where the other is expected. The wrappers below keep the
//! two apart at compile time while staying `#[repr(transparent)]` over `f64`.
//!
//! ```
//! use postgrid_core::units::{FuelPrice, Megawatts};
//!
//! let pmax = Megawatts(250.0) + Megawatts(50.0);
//! assert_eq!(pmax.value(), 300.0);
//!
//! // Dollars per hour divided by $/MMBtu gives MMBtu per hour of heat input.
//! let heat = FuelPrice(4.0).heat_input(1200.0);
//! assert_eq!(heat, 300.0);
//! ```

use serde::{Deserialize, Serialize};
use std::ops::{Add, Div, Mul, Sub};

macro_rules! impl_unit_ops {
    ($type:ty, $unit_name:literal) => {
        impl Add for $type {
            type Output = Self;
            fn add(self, rhs: Self) -> Self::Output {
                Self(self.0 + rhs.0)
            }
        }

        impl Sub for $type {
            type Output = Self;
            fn sub(self, rhs: Self) -> Self::Output {
                Self(self.0 - rhs.0)
            }
        }

        impl Mul<f64> for $type {
            type Output = Self;
            fn mul(self, rhs: f64) -> Self::Output {
                Self(self.0 * rhs)
            }
        }

        impl Div<$type> for $type {
            type Output = f64;
            fn div(self, rhs: $type) -> Self::Output {
                self.0 / rhs.0
            }
        }

        impl std::fmt::Display for $type {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{:.4} {}", self.0, $unit_name)
            }
        }

        impl $type {
            #[inline]
            pub const fn new(value: f64) -> Self {
                Self(value)
            }

            /// Get the raw numeric value
            #[inline]
            pub const fn value(self) -> f64 {
                self.0
            }

            #[inline]
            pub fn is_finite(self) -> bool {
                self.0.is_finite()
            }
        }

        impl std::iter::Sum for $type {
            fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
                Self(iter.map(|x| x.0).sum())
            }
        }

        impl<'a> std::iter::Sum<&'a $type> for $type {
            fn sum<I: Iterator<Item = &'a Self>>(iter: I) -> Self {
                Self(iter.map(|x| x.0).sum())
            }
        }
    };
}

/// Active power in megawatts (MW)
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[repr(transparent)]
pub struct Megawatts(pub f64);

impl_unit_ops!(Megawatts, "MW");

/// Fuel price in dollars per MMBtu of heat input
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[repr(transparent)]
pub struct FuelPrice(pub f64);

impl_unit_ops!(FuelPrice, "$/MMBtu");

impl FuelPrice {
    /// Heat input (MMBtu/h) implied by an hourly fuel cost ($/h) at this price.
    #[inline]
    pub fn heat_input(self, cost_per_hour: f64) -> f64 {
        cost_per_hour / self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_megawatts_arithmetic() {
        let p1 = Megawatts(100.0);
        let p2 = Megawatts(50.0);

        assert_eq!((p1 + p2).value(), 150.0);
        assert_eq!((p1 - p2).value(), 50.0);
        assert_eq!((p1 * 2.0).value(), 200.0);
        assert_eq!(p1 / p2, 2.0);
    }

    #[test]
    fn test_sum_iterator() {
        let capacities = vec![Megawatts(10.0), Megawatts(20.0), Megawatts(30.0)];
        let total: Megawatts = capacities.iter().sum();

        assert_eq!(total.value(), 60.0);
    }

    #[test]
    fn test_heat_input() {
        assert!((FuelPrice(3.3).heat_input(330.0) - 100.0).abs() < 1e-10);
    }

    #[test]
    fn test_display() {
        assert_eq!(format!("{}", Megawatts(100.0)), "100.0000 MW");
        assert_eq!(format!("{}", FuelPrice(2.5)), "2.5000 $/MMBtu");
    }
}
