//! Measurements accumulated along the Markov chain.
//!
//! Each measure owns its raw accumulators, is fed once per sampled
//! configuration, and publishes normalized observables into
//! [`Results`](crate::results::Results) at the end of the run.

pub mod g_f_tau;

pub use g_f_tau::{GFTau, Params};
