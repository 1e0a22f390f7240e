use crate::configuration::Configuration;
use crate::det::Determinant;
use crate::work_data::WorkData;

/// Source of the random draws a move consumes.
///
/// Every `rand::Rng` works out of the box through the blanket
/// implementation; tests implement this directly to script the draws.
pub trait RandomSource {
    /// Uniform integer in `[0, n)`.
    fn draw(&mut self, n: usize) -> usize;

    /// Uniform time offset in `[0, window)`.
    fn draw_time(&mut self, window: f64) -> f64;
}

impl<R: rand::Rng> RandomSource for R {
    fn draw(&mut self, n: usize) -> usize {
        self.gen_range(0..n)
    }

    fn draw_time(&mut self, window: f64) -> f64 {
        self.gen::<f64>() * window
    }
}

/// A Monte Carlo move as a three-step state machine.
///
/// The outer sampler calls `propose`, decides acceptance from the returned
/// signed weight ratio (Metropolis test), then calls exactly one of
/// `accept` or `reject`. A trial must be resolved before the next
/// `propose`; implementations enforce this with internal state asserts.
pub trait MonteCarloMove<D: Determinant> {
    /// Proposes a configuration change and returns the signed acceptance
    /// weight ratio. A zero ratio signals a degenerate proposal (handled by
    /// the caller like any rejection).
    fn propose<R: RandomSource>(
        &mut self,
        config: &Configuration,
        wdata: &mut WorkData<D>,
        rng: &mut R,
    ) -> f64;

    /// Commits the outstanding trial to the configuration and the
    /// determinant state. Returns the configuration-sign ratio for the
    /// caller's global sign bookkeeping.
    fn accept(&mut self, config: &mut Configuration, wdata: &mut WorkData<D>) -> f64;

    /// Discards the outstanding trial, restoring the pre-proposal state.
    fn reject(&mut self, wdata: &mut WorkData<D>);
}
