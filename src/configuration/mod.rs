//! The sampled state: β-cyclic time points, occupation segments, per-color
//! ordered segment lists, and the configuration they form together.

pub mod config;
pub mod seglist;
pub mod segment;
pub mod tau;

pub use config::{check_invariant, config_sign, Configuration, CHECK_INVARIANTS};
pub use segment::Segment;
pub use tau::Tau;
