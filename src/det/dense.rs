//! Dense, non-incremental reference backend for the determinant contract.
//!
//! The matrix, its determinant and its inverse are rebuilt from scratch on
//! every commit. This is quadratic-to-cubic where a fast-update engine is
//! quadratic at worst, but it is exact by construction, which makes it the
//! crate's test double and a correctness oracle for any incremental
//! implementation of [`Determinant`].

use super::Determinant;
use crate::configuration::tau::Tau;
use log::trace;
use nalgebra::DMatrix;

/// Wraps a hybridization function Δ(τ) defined on `(0, β)` into the
/// antiperiodic two-time kernel used by the determinant: the cyclic
/// difference `x - y` is evaluated on `(0, β)` and the value is negated
/// when `x < y`, which is exactly β-antiperiodicity.
///
/// The sampled sign identities assume the wrapped function is positive on
/// `(0, β)`; callers pass Δ with its overall sign absorbed.
pub fn antiperiodic(delta: impl Fn(f64) -> f64) -> impl Fn(Tau, Tau) -> f64 {
    move |x: Tau, y: Tau| {
        let val = delta((x - y).value());
        if x >= y {
            val
        } else {
            -val
        }
    }
}

struct PendingInsert {
    rows: Vec<Tau>,
    cols: Vec<Tau>,
    matrix: DMatrix<f64>,
    det: f64,
}

/// Dense determinant manager over a two-time kernel `f(row_key, col_key)`.
pub struct DenseDeterminant<F> {
    kernel: F,
    rows: Vec<Tau>,
    cols: Vec<Tau>,
    matrix: DMatrix<f64>,
    inverse: DMatrix<f64>,
    det: f64,
    pending: Option<PendingInsert>,
}

impl<F: Fn(Tau, Tau) -> f64> DenseDeterminant<F> {
    /// Creates an empty (dimension-0) determinant manager; the empty
    /// determinant is 1.
    pub fn new(kernel: F) -> Self {
        Self {
            kernel,
            rows: Vec::new(),
            cols: Vec::new(),
            matrix: DMatrix::zeros(0, 0),
            inverse: DMatrix::zeros(0, 0),
            det: 1.0,
            pending: None,
        }
    }

    /// The current determinant value.
    pub fn determinant(&self) -> f64 {
        self.det
    }

    /// The current matrix (for state snapshots in tests and diagnostics).
    pub fn matrix(&self) -> &DMatrix<f64> {
        &self.matrix
    }

    fn build_matrix(&self, rows: &[Tau], cols: &[Tau]) -> DMatrix<f64> {
        DMatrix::from_fn(rows.len(), cols.len(), |i, j| (self.kernel)(rows[i], cols[j]))
    }
}

impl<F: Fn(Tau, Tau) -> f64> Determinant for DenseDeterminant<F> {
    fn size(&self) -> usize {
        self.rows.len()
    }

    fn get_y(&self, i: usize) -> Tau {
        self.rows[i]
    }

    fn get_x(&self, j: usize) -> Tau {
        self.cols[j]
    }

    fn inverse_matrix(&self, i: usize, j: usize) -> f64 {
        // The inverse swaps the index roles: entry (col, row) links row key
        // i with column key j.
        self.inverse[(j, i)]
    }

    fn try_insert(&mut self, row_pos: usize, col_pos: usize, row_key: Tau, col_key: Tau) -> f64 {
        assert!(
            self.pending.is_none(),
            "A determinant trial is already pending"
        );
        assert!(row_pos <= self.rows.len() && col_pos <= self.cols.len());

        let mut rows = self.rows.clone();
        let mut cols = self.cols.clone();
        rows.insert(row_pos, row_key);
        cols.insert(col_pos, col_key);

        let matrix = self.build_matrix(&rows, &cols);
        let det = if matrix.nrows() == 0 {
            1.0
        } else {
            matrix.determinant()
        };
        let ratio = det / self.det;
        trace!(
            "try_insert at ({}, {}): det {} -> {}, ratio {}",
            row_pos,
            col_pos,
            self.det,
            det,
            ratio
        );

        self.pending = Some(PendingInsert {
            rows,
            cols,
            matrix,
            det,
        });
        ratio
    }

    fn complete_operation(&mut self) {
        let pending = self
            .pending
            .take()
            .unwrap_or_else(|| panic!("No determinant trial to commit"));
        self.rows = pending.rows;
        self.cols = pending.cols;
        self.det = pending.det;
        self.inverse = pending
            .matrix
            .clone()
            .try_inverse()
            .unwrap_or_else(|| panic!("Singular hybridization matrix of size {}", pending.matrix.nrows()));
        self.matrix = pending.matrix;
    }

    fn reject_last_try(&mut self) {
        self.pending = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn delta(tau: f64) -> f64 {
        // Positive on (0, beta), as the sign convention assumes.
        0.5 + 0.1 * tau
    }

    fn manager() -> DenseDeterminant<impl Fn(Tau, Tau) -> f64> {
        DenseDeterminant::new(antiperiodic(delta))
    }

    #[test]
    fn test_first_insertion_ratio_is_kernel_value() {
        let beta = 1.0;
        let mut d = manager();
        let row = Tau::new(0.7, beta);
        let col = Tau::new(0.2, beta);
        let ratio = d.try_insert(0, 0, row, col);
        // Empty determinant is 1, so the ratio is the single matrix entry.
        assert!((ratio - delta(0.5)).abs() < 1e-14);
        d.complete_operation();
        assert_eq!(d.size(), 1);
        assert!((d.inverse_matrix(0, 0) - 1.0 / delta(0.5)).abs() < 1e-12);
    }

    #[test]
    fn test_antiperiodic_sign_flip() {
        let beta = 1.0;
        let mut d = manager();
        // Annihilation before creation wraps through beta: negative entry.
        let ratio = d.try_insert(0, 0, Tau::new(0.2, beta), Tau::new(0.8, beta));
        assert!(ratio < 0.0);
        assert!((ratio + delta(0.4)).abs() < 1e-14);
    }

    #[test]
    fn test_ratio_matches_recomputed_determinant() {
        let beta = 1.0;
        let mut d = manager();
        d.try_insert(0, 0, Tau::new(0.3, beta), Tau::new(0.1, beta));
        d.complete_operation();
        let before = d.determinant();
        let ratio = d.try_insert(1, 1, Tau::new(0.8, beta), Tau::new(0.6, beta));
        d.complete_operation();
        assert!((d.determinant() - before * ratio).abs() < 1e-12);
        // The committed inverse really is the matrix inverse.
        let product = d.matrix() * d.matrix().clone().try_inverse().unwrap();
        assert!((product - DMatrix::<f64>::identity(2, 2)).abs().max() < 1e-12);
    }

    #[test]
    fn test_rollback_restores_state() {
        let beta = 1.0;
        let mut d = manager();
        d.try_insert(0, 0, Tau::new(0.3, beta), Tau::new(0.1, beta));
        d.complete_operation();
        let matrix_before = d.matrix().clone();
        let det_before = d.determinant();

        d.try_insert(1, 1, Tau::new(0.8, beta), Tau::new(0.6, beta));
        d.reject_last_try();

        assert_eq!(d.size(), 1);
        assert_eq!(d.determinant(), det_before);
        assert_eq!(d.matrix(), &matrix_before);
        // Rejecting with nothing pending is a no-op.
        d.reject_last_try();
        assert_eq!(d.size(), 1);
    }

    #[test]
    #[should_panic(expected = "already pending")]
    fn test_single_outstanding_trial() {
        let beta = 1.0;
        let mut d = manager();
        d.try_insert(0, 0, Tau::new(0.3, beta), Tau::new(0.1, beta));
        d.try_insert(0, 0, Tau::new(0.5, beta), Tau::new(0.4, beta));
    }
}
