use super::tau::Tau;
use serde::{Deserialize, Serialize};
use std::fmt;

/// One interval of occupation for a single color.
///
/// The segment occupies the cyclic arc running from the creation time
/// `tau_c` forward to the annihilation time `tau_cdag`. A segment whose arc
/// wraps through the origin (`tau_cdag < tau_c` numerically) is *cyclic*.
/// The degenerate segment `{0, β}` is the *full line* sentinel: the color is
/// permanently occupied and admits no insertion.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    /// Creation time: occupation starts here.
    pub tau_c: Tau,
    /// Annihilation time: occupation ends here. List placement orders by
    /// this field.
    pub tau_cdag: Tau,
}

impl Segment {
    /// Builds a segment from its creation and annihilation times.
    ///
    /// # Panics
    /// Panics if the two times live on circles of different periods.
    pub fn new(tau_c: Tau, tau_cdag: Tau) -> Self {
        assert_eq!(
            tau_c.period(),
            tau_cdag.period(),
            "Segment endpoints must share the same period"
        );
        Self { tau_c, tau_cdag }
    }

    /// The full-line sentinel `{0, β}` for a permanently occupied color.
    pub fn full_line(beta: f64) -> Self {
        Self {
            tau_c: Tau::zero(beta),
            tau_cdag: Tau::beta(beta),
        }
    }

    /// Whether this is the full-line sentinel.
    pub fn is_full_line(&self) -> bool {
        self.tau_c.value() == 0.0 && self.tau_cdag.value() == self.tau_cdag.period()
    }

    /// Whether the occupied arc wraps through the origin.
    pub fn is_cyclic(&self) -> bool {
        !self.is_full_line() && self.tau_cdag < self.tau_c
    }

    /// Length of the occupied arc.
    pub fn length(&self) -> f64 {
        if self.is_full_line() {
            self.tau_c.period()
        } else {
            (self.tau_cdag - self.tau_c).value()
        }
    }

    /// Whether `tau` lies on the occupied arc, half-open at the annihilation
    /// end: the color is occupied at `tau_c` and unoccupied again at
    /// `tau_cdag`.
    pub fn contains(&self, tau: Tau) -> bool {
        if self.is_full_line() {
            return true;
        }
        if self.is_cyclic() {
            tau >= self.tau_c || tau < self.tau_cdag
        } else {
            tau >= self.tau_c && tau < self.tau_cdag
        }
    }

    /// Decomposes the occupied arc into one or two plain intervals
    /// `[start, end)` on `[0, β)`.
    fn arcs(&self) -> ([f64; 2], Option<[f64; 2]>) {
        let beta = self.tau_c.period();
        if self.is_full_line() {
            ([0.0, beta], None)
        } else if self.is_cyclic() {
            (
                [self.tau_c.value(), beta],
                Some([0.0, self.tau_cdag.value()]),
            )
        } else {
            ([self.tau_c.value(), self.tau_cdag.value()], None)
        }
    }

    /// Length of the intersection of the two occupied arcs.
    pub fn overlap_with(&self, other: &Segment) -> f64 {
        let mut total = 0.0;
        let (a0, a1) = self.arcs();
        let (b0, b1) = other.arcs();
        for a in std::iter::once(&a0).chain(a1.iter()) {
            for b in std::iter::once(&b0).chain(b1.iter()) {
                total += (a[1].min(b[1]) - a[0].max(b[0])).max(0.0);
            }
        }
        total
    }
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_full_line() {
            write!(f, "[full line]")
        } else {
            write!(f, "[c:{} cdag:{}]", self.tau_c, self.tau_cdag)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seg(c: f64, cdag: f64, beta: f64) -> Segment {
        Segment::new(Tau::new(c, beta), Tau::new(cdag, beta))
    }

    #[test]
    fn test_length_plain_and_cyclic() {
        let beta = 1.0;
        assert!((seg(0.2, 0.7, beta).length() - 0.5).abs() < 1e-14);
        // Wraps through the origin: 0.9 -> 1.0 -> 0.1
        assert!((seg(0.9, 0.1, beta).length() - 0.2).abs() < 1e-14);
        assert_eq!(Segment::full_line(beta).length(), beta);
    }

    #[test]
    fn test_cyclic_detection() {
        let beta = 1.0;
        assert!(!seg(0.2, 0.7, beta).is_cyclic());
        assert!(seg(0.9, 0.1, beta).is_cyclic());
        assert!(!Segment::full_line(beta).is_cyclic());
        assert!(Segment::full_line(beta).is_full_line());
    }

    #[test]
    fn test_contains_half_open() {
        let beta = 1.0;
        let s = seg(0.2, 0.7, beta);
        assert!(s.contains(Tau::new(0.2, beta)));
        assert!(s.contains(Tau::new(0.5, beta)));
        assert!(!s.contains(Tau::new(0.7, beta)));
        assert!(!s.contains(Tau::new(0.9, beta)));

        let w = seg(0.9, 0.1, beta);
        assert!(w.contains(Tau::new(0.95, beta)));
        assert!(w.contains(Tau::new(0.05, beta)));
        assert!(!w.contains(Tau::new(0.1, beta)));
        assert!(!w.contains(Tau::new(0.5, beta)));
    }

    #[test]
    fn test_overlap_between_segments() {
        let beta = 1.0;
        let a = seg(0.2, 0.7, beta);
        let b = seg(0.5, 0.9, beta);
        assert!((a.overlap_with(&b) - 0.2).abs() < 1e-14);
        // Disjoint arcs.
        assert_eq!(a.overlap_with(&seg(0.7, 0.9, beta)), 0.0);
        // Cyclic against plain.
        let w = seg(0.8, 0.3, beta);
        assert!((a.overlap_with(&w) - 0.1).abs() < 1e-14);
        // Full line overlaps with the whole of the other segment.
        assert!((Segment::full_line(beta).overlap_with(&a) - a.length()).abs() < 1e-14);
    }
}
