//! Cross-worker reduction contract.
//!
//! Independent workers run disjoint Markov chains and meet exactly once, at
//! result collection, in a collective elementwise sum. The binding to an
//! actual communicator (MPI or threads) lives outside this crate; the
//! single-worker identity is provided for serial runs and tests.

/// Collective elementwise sum across all workers, returning the summed
/// result to every worker. All workers must call with matching shapes; this
/// is a structural precondition, not negotiated at runtime.
pub trait AllReduce {
    /// Sums a scalar across workers.
    fn sum_scalar(&self, value: f64) -> f64;

    /// Sums a buffer elementwise across workers, in place.
    fn sum_inplace(&self, data: &mut [f64]);
}

/// The single-worker reduction: everything is already the global sum.
pub struct LocalReduce;

impl AllReduce for LocalReduce {
    fn sum_scalar(&self, value: f64) -> f64 {
        value
    }

    fn sum_inplace(&self, _data: &mut [f64]) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_local_reduce_is_identity() {
        let r = LocalReduce;
        assert_eq!(r.sum_scalar(3.5), 3.5);
        let mut data = vec![1.0, 2.0];
        r.sum_inplace(&mut data);
        assert_eq!(data, vec![1.0, 2.0]);
    }
}
