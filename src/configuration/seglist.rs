//! Operations on one color's ordered segment list.
//!
//! A segment list is sorted ascending by annihilation time (`tau_cdag`), its
//! segments never overlap, and a full line is the sole entry of its list.
//! Everything here is a pure function of its inputs; the move and the
//! measurements call these to evaluate trace ratios and measurement
//! prefactors.

use super::segment::Segment;
use super::tau::Tau;
use crate::work_data::RetardedKernel;

/// Whether the color is permanently occupied.
pub fn has_full_line(seglist: &[Segment]) -> bool {
    seglist.first().is_some_and(|s| s.is_full_line())
}

/// Total occupied time of `seglist` inside the arc of `seg`.
pub fn overlap(seglist: &[Segment], seg: &Segment) -> f64 {
    seglist.iter().map(|s| s.overlap_with(seg)).sum()
}

/// Occupation (0 or 1) immediately to the right of `tau`.
pub fn n_at(tau: Tau, seglist: &[Segment]) -> f64 {
    if seglist.iter().any(|s| s.contains(tau)) {
        1.0
    } else {
        0.0
    }
}

/// Retarded-kernel overlap of a candidate segment `(tau_c, tau_cdag)` with
/// every segment of `seglist`, for the color pair `(c1, c2)`.
///
/// Operator pairs of the same kind (c/c, cdag/cdag) enter with a plus,
/// mixed pairs with a minus.
pub fn k_overlap(
    seglist: &[Segment],
    tau_c: Tau,
    tau_cdag: Tau,
    kernel: &dyn RetardedKernel,
    c1: usize,
    c2: usize,
) -> f64 {
    seglist
        .iter()
        .map(|s| {
            kernel.eval((tau_c - s.tau_c).value(), c1, c2)
                - kernel.eval((tau_c - s.tau_cdag).value(), c1, c2)
                - kernel.eval((tau_cdag - s.tau_c).value(), c1, c2)
                + kernel.eval((tau_cdag - s.tau_cdag).value(), c1, c2)
        })
        .sum()
}

/// Single-time retarded-kernel overlap: the contribution of one operator at
/// `tau` (a creation operator when `is_c` is false) against every segment of
/// `seglist`.
pub fn k_overlap_at(
    seglist: &[Segment],
    tau: Tau,
    is_c: bool,
    kernel: &dyn RetardedKernel,
    c1: usize,
    c2: usize,
) -> f64 {
    let res: f64 = seglist
        .iter()
        .map(|s| {
            kernel.eval((tau - s.tau_c).value(), c1, c2)
                - kernel.eval((tau - s.tau_cdag).value(), c1, c2)
        })
        .sum();
    if is_c {
        res
    } else {
        -res
    }
}

/// First index in `0..len` whose time-key (given by `at`) is not less than
/// `key`. Used to locate determinant insertion positions among the sorted
/// row/column keys.
pub fn lower_bound(len: usize, key: Tau, at: impl Fn(usize) -> Tau) -> usize {
    let mut lo = 0;
    let mut hi = len;
    while lo < hi {
        let mid = (lo + hi) / 2;
        if at(mid) < key {
            lo = mid + 1;
        } else {
            hi = mid;
        }
    }
    lo
}

/// Position at which `seg` must be inserted to keep the list ordered by
/// annihilation time.
pub fn insert_position(seglist: &[Segment], seg: &Segment) -> usize {
    seglist.partition_point(|s| s.tau_cdag <= seg.tau_cdag)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::work_data::TabulatedKernel;
    use ndarray::Array3;

    fn seg(c: f64, cdag: f64, beta: f64) -> Segment {
        Segment::new(Tau::new(c, beta), Tau::new(cdag, beta))
    }

    #[test]
    fn test_overlap_with_list() {
        let beta = 1.0;
        let sl = vec![seg(0.1, 0.3, beta), seg(0.5, 0.8, beta)];
        let probe = seg(0.2, 0.6, beta);
        // 0.1 from the first segment, 0.1 from the second.
        assert!((overlap(&sl, &probe) - 0.2).abs() < 1e-14);
        assert_eq!(overlap(&[], &probe), 0.0);
    }

    #[test]
    fn test_density_to_the_right() {
        let beta = 1.0;
        let sl = vec![seg(0.1, 0.3, beta), seg(0.5, 0.8, beta)];
        assert_eq!(n_at(Tau::new(0.2, beta), &sl), 1.0);
        assert_eq!(n_at(Tau::new(0.4, beta), &sl), 0.0);
        // Half-open: just annihilated.
        assert_eq!(n_at(Tau::new(0.3, beta), &sl), 0.0);
        assert_eq!(n_at(Tau::new(0.9, beta), &[Segment::full_line(beta)]), 1.0);
    }

    #[test]
    fn test_lower_bound() {
        let beta = 1.0;
        let keys = [0.1, 0.4, 0.7];
        let at = |i: usize| Tau::new(keys[i], beta);
        assert_eq!(lower_bound(3, Tau::new(0.05, beta), at), 0);
        assert_eq!(lower_bound(3, Tau::new(0.4, beta), at), 1);
        assert_eq!(lower_bound(3, Tau::new(0.5, beta), at), 2);
        assert_eq!(lower_bound(3, Tau::new(0.9, beta), at), 3);
        assert_eq!(lower_bound(0, Tau::new(0.5, beta), at), 0);
    }

    #[test]
    fn test_insert_position_orders_by_annihilation_time() {
        let beta = 1.0;
        let sl = vec![seg(0.1, 0.3, beta), seg(0.5, 0.8, beta)];
        assert_eq!(insert_position(&sl, &seg(0.35, 0.45, beta)), 1);
        assert_eq!(insert_position(&sl, &seg(0.85, 0.95, beta)), 2);
        assert_eq!(insert_position(&sl, &seg(0.02, 0.05, beta)), 0);
    }

    #[test]
    fn test_k_overlap_constant_kernel_cancels() {
        // A kernel constant in tau contributes K - K - K + K = 0 per segment.
        let beta = 1.0;
        let values = Array3::from_elem((5, 1, 1), 0.3);
        let kernel = TabulatedKernel::new(beta, values);
        let sl = vec![seg(0.1, 0.3, beta), seg(0.5, 0.8, beta)];
        let res = k_overlap(
            &sl,
            Tau::new(0.35, beta),
            Tau::new(0.45, beta),
            &kernel,
            0,
            0,
        );
        assert!(res.abs() < 1e-12);
        // The single-time variant cancels as well, for both operator kinds.
        let at = k_overlap_at(&sl, Tau::new(0.35, beta), true, &kernel, 0, 0);
        assert!(at.abs() < 1e-12);
    }

    #[test]
    fn test_k_overlap_quadratic_kernel() {
        // K(tau) = tau^2 sampled on the grid, exact at multiples of 0.1.
        let beta = 1.0;
        let n = 11;
        let mut values = Array3::zeros((n, 1, 1));
        for i in 0..n {
            let tau = beta * i as f64 / (n - 1) as f64;
            values[[i, 0, 0]] = tau * tau;
        }
        let kernel = TabulatedKernel::new(beta, values);
        let sl = vec![seg(0.2, 0.7, beta)];

        // K(0.7) - K(0.2) - K(0.9) + K(0.4) = 0.49 - 0.04 - 0.81 + 0.16.
        let res = k_overlap(
            &sl,
            Tau::new(0.9, beta),
            Tau::new(0.1, beta),
            &kernel,
            0,
            0,
        );
        assert!((res + 0.2).abs() < 1e-12);

        // One operator at 0.7: K(0.5) - K(0.0) = 0.25, negated for an
        // annihilation operator.
        let at_c = k_overlap_at(&sl, Tau::new(0.7, beta), true, &kernel, 0, 0);
        assert!((at_c - 0.25).abs() < 1e-12);
        let at_cdag = k_overlap_at(&sl, Tau::new(0.7, beta), false, &kernel, 0, 0);
        assert!((at_cdag + 0.25).abs() < 1e-12);
    }
}
