//! Read-mostly physical data shared by moves and measurements: interaction
//! matrix, chemical potentials, optional retarded kernels, and the per-color
//! determinant managers.

use crate::det::Determinant;
use ndarray::{Array1, Array2, Array3};

/// A retarded (bosonic) interaction kernel K(τ), β-periodic, resolved per
/// color pair.
pub trait RetardedKernel {
    /// Evaluates the kernel at the time difference `dtau` for the color
    /// pair `(c1, c2)`. Implementations wrap `dtau` into one period.
    fn eval(&self, dtau: f64, c1: usize, c2: usize) -> f64;
}

/// A kernel sampled uniformly on `[0, β]`, evaluated by linear
/// interpolation with periodic wrapping.
pub struct TabulatedKernel {
    beta: f64,
    /// Samples with shape `(n_tau, n_color, n_color)`; first and last rows
    /// are the values at τ = 0 and τ = β.
    values: Array3<f64>,
}

impl TabulatedKernel {
    /// # Panics
    /// Panics unless there are at least two time samples and the color
    /// blocks are square.
    pub fn new(beta: f64, values: Array3<f64>) -> Self {
        assert!(beta > 0.0, "Period must be positive");
        assert!(
            values.shape()[0] >= 2,
            "Need at least two time samples, got {}",
            values.shape()[0]
        );
        assert_eq!(
            values.shape()[1],
            values.shape()[2],
            "Color blocks must be square"
        );
        Self { beta, values }
    }
}

impl RetardedKernel for TabulatedKernel {
    fn eval(&self, dtau: f64, c1: usize, c2: usize) -> f64 {
        let n = self.values.shape()[0];
        let step = self.beta / (n - 1) as f64;
        let x = dtau.rem_euclid(self.beta) / step;
        let i = (x.floor() as usize).min(n - 2);
        let w = x - i as f64;
        (1.0 - w) * self.values[[i, c1, c2]] + w * self.values[[i + 1, c1, c2]]
    }
}

/// Physical parameters plus the per-color determinant state.
///
/// Moves are the only writers of `dets` while a trial is pending; everything
/// else is read-only during the run.
pub struct WorkData<D: Determinant> {
    /// Density-density interaction U[c, c'].
    pub u: Array2<f64>,
    /// Chemical potential per color.
    pub mu: Array1<f64>,
    /// Whether a retarded density-density kernel is active.
    pub has_dt: bool,
    /// Whether a retarded spin-spin kernel is active.
    pub has_jperp: bool,
    /// Whether the model is rotationally invariant (required for the F
    /// measurement).
    pub rot_inv: bool,
    /// Retarded kernel K and its derivative K', present when `has_dt`.
    pub k: Option<Box<dyn RetardedKernel>>,
    pub kprime: Option<Box<dyn RetardedKernel>>,
    /// Spin counterpart of K', present when `has_jperp`.
    pub kprime_spin: Option<Box<dyn RetardedKernel>>,
    /// One determinant manager per color.
    pub dets: Vec<D>,
}

impl<D: Determinant> WorkData<D> {
    /// Builds work data with no retarded interactions.
    ///
    /// # Panics
    /// Panics if `u` is not square or the shapes disagree on the number of
    /// colors.
    pub fn new(u: Array2<f64>, mu: Array1<f64>, dets: Vec<D>) -> Self {
        let n = mu.len();
        assert_eq!(u.nrows(), n, "U must be n_color x n_color");
        assert_eq!(u.ncols(), n, "U must be n_color x n_color");
        assert_eq!(dets.len(), n, "One determinant per color is required");
        Self {
            u,
            mu,
            has_dt: false,
            has_jperp: false,
            rot_inv: true,
            k: None,
            kprime: None,
            kprime_spin: None,
            dets,
        }
    }

    pub fn n_color(&self) -> usize {
        self.mu.len()
    }

    /// Activates the retarded density-density interaction.
    pub fn set_density_kernels(
        &mut self,
        k: Box<dyn RetardedKernel>,
        kprime: Box<dyn RetardedKernel>,
    ) {
        self.k = Some(k);
        self.kprime = Some(kprime);
        self.has_dt = true;
    }

    /// Activates the retarded spin-spin interaction.
    pub fn set_spin_kernel(&mut self, kprime_spin: Box<dyn RetardedKernel>) {
        self.kprime_spin = Some(kprime_spin);
        self.has_jperp = true;
    }
}
