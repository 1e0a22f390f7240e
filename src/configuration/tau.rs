use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::ops::Sub;

/// A point on the imaginary-time circle of circumference β.
///
/// The value lives in `[0, β]`, with `β` itself reserved for the
/// distinguished endpoint produced by [`Tau::beta`]. Every point carries its
/// own period, so arithmetic never relies on an ambient global constant.
/// Subtraction is cyclic: `a - b` wraps into `[0, β)`.
///
/// # Example
/// ```
/// use ctseg::configuration::tau::Tau;
///
/// let a = Tau::new(0.2, 1.0);
/// let b = Tau::new(0.7, 1.0);
/// // Cyclic difference wraps through the origin.
/// assert!(((a - b).value() - 0.5).abs() < 1e-14);
/// assert!(((b - a).value() - 0.5).abs() < 1e-14);
/// ```
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct Tau {
    value: f64,
    beta: f64,
}

impl Tau {
    /// Creates a time point, wrapping `value` into `[0, β)`.
    ///
    /// # Panics
    /// Panics if `beta` is not a positive finite number or `value` is not
    /// finite.
    pub fn new(value: f64, beta: f64) -> Self {
        assert!(
            beta.is_finite() && beta > 0.0,
            "Period must be positive and finite, got {}",
            beta
        );
        assert!(value.is_finite(), "Time value must be finite, got {}", value);
        Self {
            value: value.rem_euclid(beta),
            beta,
        }
    }

    /// The origin of the circle, τ = 0.
    pub fn zero(beta: f64) -> Self {
        Self::new(0.0, beta)
    }

    /// The distinguished endpoint τ = β.
    ///
    /// This is the only value for which `value() == period()`; it is used by
    /// the full-line sentinel and as the insertion-window edge for an empty
    /// color.
    pub fn beta(beta: f64) -> Self {
        assert!(
            beta.is_finite() && beta > 0.0,
            "Period must be positive and finite, got {}",
            beta
        );
        Self { value: beta, beta }
    }

    /// The raw value in `[0, β]`.
    pub fn value(&self) -> f64 {
        self.value
    }

    /// The period β of the circle this point lives on.
    pub fn period(&self) -> f64 {
        self.beta
    }

    /// Total order on the raw value (local ordering within one color's list).
    pub fn total_cmp(&self, other: &Self) -> Ordering {
        debug_assert_eq!(
            self.beta, other.beta,
            "Compared time points must share the same period"
        );
        self.value.total_cmp(&other.value)
    }
}

impl PartialEq for Tau {
    fn eq(&self, other: &Self) -> bool {
        debug_assert_eq!(
            self.beta, other.beta,
            "Compared time points must share the same period"
        );
        self.value == other.value
    }
}

impl PartialOrd for Tau {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.total_cmp(other))
    }
}

impl Sub for Tau {
    type Output = Tau;

    /// Cyclic difference, wrapped into `[0, β)`.
    fn sub(self, other: Tau) -> Tau {
        Tau::new(self.value - other.value, self.beta)
    }
}

impl Sub<f64> for Tau {
    type Output = Tau;

    /// Shifts the point backwards by `offset`, cyclically.
    fn sub(self, offset: f64) -> Tau {
        Tau::new(self.value - offset, self.beta)
    }
}

impl fmt::Display for Tau {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.6}", self.value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wrapping_constructor() {
        let t = Tau::new(1.3, 1.0);
        assert!((t.value() - 0.3).abs() < 1e-14);
        let t = Tau::new(-0.2, 1.0);
        assert!((t.value() - 0.8).abs() < 1e-14);
    }

    #[test]
    fn test_beta_endpoint_is_distinguished() {
        let b = Tau::beta(2.5);
        assert_eq!(b.value(), 2.5);
        // The wrapping constructor folds beta back to zero.
        assert_eq!(Tau::new(2.5, 2.5).value(), 0.0);
    }

    #[test]
    fn test_cyclic_subtraction() {
        let beta = 10.0;
        let a = Tau::new(2.0, beta);
        let b = Tau::new(7.0, beta);
        assert!(((b - a).value() - 5.0).abs() < 1e-12);
        assert!(((a - b).value() - 5.0).abs() < 1e-12);
        assert_eq!((a - a).value(), 0.0);
    }

    #[test]
    fn test_offset_subtraction_from_endpoint() {
        let beta = 1.0;
        let t = Tau::beta(beta) - 0.8;
        assert!((t.value() - 0.2).abs() < 1e-14);
    }

    #[test]
    fn test_ordering() {
        let beta = 1.0;
        let a = Tau::new(0.25, beta);
        let b = Tau::new(0.75, beta);
        assert!(a < b);
        assert_eq!(a.total_cmp(&b), std::cmp::Ordering::Less);
        assert!(a == Tau::new(0.25, beta));
    }

    #[test]
    #[should_panic(expected = "Period must be positive")]
    fn test_invalid_period() {
        Tau::new(0.0, -1.0);
    }

    #[test]
    #[should_panic(expected = "share the same period")]
    fn test_comparison_across_periods_is_rejected() {
        let _ = Tau::new(0.3, 1.0) == Tau::new(0.3, 2.0);
    }
}
