//! Monte Carlo moves over segment configurations.
//!
//! Each move is a three-step state machine driven by the outer sampler:
//! `propose` returns a signed weight ratio, the sampler performs the
//! Metropolis test, and `accept`/`reject` resolve the trial. The move
//! catalogue currently holds the insert-segment move; removal, shift and
//! spin-flip moves share the same trait and bookkeeping pattern.

pub mod insert_segment;
pub mod monte_carlo_move;

pub use insert_segment::InsertSegment;
pub use monte_carlo_move::{MonteCarloMove, RandomSource};
