//! Sampling core of a continuous-time quantum impurity solver in the
//! segment picture (CT-SEG).
//!
//! A configuration is a set of occupation segments on the circle of
//! circumference β, one ordered list per color (orbital/spin channel),
//! weighted by a local many-body trace and a hybridization determinant.
//! Monte Carlo moves propose a configuration change, evaluate the ratio of
//! weights, and either commit the change to the configuration and the
//! per-color determinants or roll it back. Measurements read the determinant
//! inverse after each sampled configuration and bin the Green's function
//! G(τ) over one period.
//!
//! The outer sampling loop (move selection, Metropolis test, sweep counts)
//! is deliberately not part of this crate: moves expose
//! `propose`/`accept`/`reject`, measurements expose
//! `accumulate`/`collect_results`, and the caller wires them together.

pub mod configuration;
pub mod det;
pub mod measures;
pub mod moves;
pub mod reduce;
pub mod results;
pub mod work_data;
