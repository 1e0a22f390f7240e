use super::segment::Segment;
use super::seglist;
use crate::det::Determinant;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Whether the structural invariants are re-checked after every accepted
/// move. Follows the build profile: debug builds verify, release builds
/// trust the bookkeeping.
pub const CHECK_INVARIANTS: bool = cfg!(debug_assertions);

/// The sampled state: one ordered segment list per color.
///
/// Lists are sorted ascending by annihilation time, segments never overlap,
/// and a full line is the sole entry of its list. Accepted moves mutate the
/// configuration in place; it persists for the whole run.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Configuration {
    /// Circumference of the imaginary-time circle.
    pub beta: f64,
    pub seglists: Vec<Vec<Segment>>,
}

impl Configuration {
    /// An empty configuration (every color unoccupied) with `n_color`
    /// colors on the circle of circumference `beta`.
    pub fn new(n_color: usize, beta: f64) -> Self {
        assert!(n_color > 0, "Need at least one color");
        assert!(beta.is_finite() && beta > 0.0, "Period must be positive");
        Self {
            beta,
            seglists: vec![Vec::new(); n_color],
        }
    }

    pub fn n_color(&self) -> usize {
        self.seglists.len()
    }

    /// Inserts `seg` into the given color's list at the position that keeps
    /// the list ordered by annihilation time.
    pub fn insert_segment(&mut self, color: usize, seg: Segment) {
        let sl = &mut self.seglists[color];
        let pos = seglist::insert_position(sl, &seg);
        sl.insert(pos, seg);
    }
}

impl fmt::Display for Configuration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (c, sl) in self.seglists.iter().enumerate() {
            write!(f, "color {}:", c)?;
            if sl.is_empty() {
                write!(f, " (empty)")?;
            }
            for seg in sl {
                write!(f, " {}", seg)?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

/// The derived configuration sign.
///
/// A color contributes a factor −1 when its list wraps around τ = 0 (first
/// entry cyclic; the full line does not count) and its determinant dimension
/// is odd. With the determinant kernel positive on `(0, β)` under the
/// antiperiodic convention, this is exactly the sign of the hybridization
/// determinant, so the product `config_sign × det_sign` tracks the
/// accumulated per-move sign contributions.
pub fn config_sign<D: Determinant>(config: &Configuration, dets: &[D]) -> f64 {
    let mut sign = 1.0;
    for (c, sl) in config.seglists.iter().enumerate() {
        if let Some(first) = sl.first() {
            if first.is_cyclic() && dets[c].size() % 2 == 1 {
                sign = -sign;
            }
        }
    }
    sign
}

/// Verifies the structural invariants tying the configuration to the
/// determinant state, per color:
///
/// - the list is sorted by annihilation time and its segments tile at most
///   one period (ordering plus non-overlap),
/// - the determinant dimension equals the segment count (0 for a full
///   line),
/// - the determinant row keys are the sorted annihilation times and the
///   column keys the sorted creation times.
///
/// # Panics
/// Panics with a diagnostic naming the offending color on any violation;
/// a failure here means the fast-update or list bookkeeping is corrupt.
pub fn check_invariant<D: Determinant>(config: &Configuration, dets: &[D]) {
    assert_eq!(
        config.n_color(),
        dets.len(),
        "One determinant per color is required"
    );
    for (c, sl) in config.seglists.iter().enumerate() {
        let det = &dets[c];
        if seglist::has_full_line(sl) {
            assert!(
                sl.len() == 1 && det.size() == 0,
                "Color {}: full line must be the sole entry with an empty determinant",
                c
            );
            continue;
        }
        assert_eq!(
            det.size(),
            sl.len(),
            "Color {}: determinant dimension {} does not match segment count {}",
            c,
            det.size(),
            sl.len()
        );
        if sl.is_empty() {
            continue;
        }

        // Walking the circle once must visit every segment and every gap
        // exactly once: lengths plus gaps tile the period.
        let beta = config.beta;
        let mut covered = 0.0;
        for (i, seg) in sl.iter().enumerate() {
            assert!(
                seg.length() > 0.0,
                "Color {}: degenerate segment {}",
                c,
                seg
            );
            let next = &sl[(i + 1) % sl.len()];
            covered += seg.length() + (next.tau_c - seg.tau_cdag).value();
        }
        assert!(
            (covered - beta).abs() < 1e-10 * beta,
            "Color {}: segments overlap or are out of order (covered {} of {})",
            c,
            covered,
            beta
        );

        // Determinant keys mirror the segment times.
        let mut cdags: Vec<f64> = sl.iter().map(|s| s.tau_cdag.value()).collect();
        let mut cs: Vec<f64> = sl.iter().map(|s| s.tau_c.value()).collect();
        cdags.sort_by(f64::total_cmp);
        cs.sort_by(f64::total_cmp);
        for i in 0..sl.len() {
            assert!(
                det.get_y(i).value() == cdags[i] && det.get_x(i).value() == cs[i],
                "Color {}: determinant keys out of sync with the segment list",
                c
            );
        }
    }
}
