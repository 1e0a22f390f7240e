//! Contract of the per-color determinant manager.
//!
//! Each color carries a square hybridization matrix whose rows are indexed
//! by the color's annihilation times and whose columns are indexed by its
//! creation times, both kept sorted. Moves mutate it through a two-phase
//! trial: `try_insert` evaluates the determinant ratio and leaves exactly
//! one pending trial, which `complete_operation` commits and
//! `reject_last_try` discards.

pub mod dense;

pub use dense::{antiperiodic, DenseDeterminant};

use crate::configuration::tau::Tau;

/// Fast-update tracker for one color's hybridization matrix and its inverse.
///
/// At most one trial may be pending at a time; the move resolves it before
/// the next proposal.
pub trait Determinant {
    /// Current matrix dimension (equals the color's segment count, 0 for an
    /// empty or fully occupied color).
    fn size(&self) -> usize;

    /// The i-th row time-key (annihilation time), ascending in `i`.
    fn get_y(&self, i: usize) -> Tau;

    /// The j-th column time-key (creation time), ascending in `j`.
    fn get_x(&self, j: usize) -> Tau;

    /// Inverse-matrix entry linking row key `i` and column key `j`.
    fn inverse_matrix(&self, i: usize, j: usize) -> f64;

    /// Evaluates the trial insertion of a row key at `row_pos` and a column
    /// key at `col_pos`, returning the signed ratio of new-to-old
    /// determinant. Leaves the trial pending.
    ///
    /// # Panics
    /// Panics if a trial is already pending.
    fn try_insert(&mut self, row_pos: usize, col_pos: usize, row_key: Tau, col_key: Tau) -> f64;

    /// Commits the pending trial, updating the matrix and its inverse.
    ///
    /// # Panics
    /// Panics if no trial is pending.
    fn complete_operation(&mut self);

    /// Discards the pending trial, if any, leaving the state exactly as it
    /// was before `try_insert`.
    fn reject_last_try(&mut self);
}
