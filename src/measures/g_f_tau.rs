use crate::configuration::seglist;
use crate::configuration::{Configuration, Tau};
use crate::det::Determinant;
use crate::reduce::AllReduce;
use crate::results::Results;
use crate::work_data::WorkData;
use log::{debug, trace};
use ndarray::Array1;
use serde::{Deserialize, Serialize};

/// Measurement parameters.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Params {
    /// Circumference of the imaginary-time circle.
    pub beta: f64,
    /// Number of mesh points of the G(τ) histograms, endpoints included.
    pub n_tau_g: usize,
    /// Whether to also measure the improved estimator F(τ). Honored only
    /// for rotationally invariant models.
    pub measure_f_tau: bool,
}

/// Accumulator for the imaginary-time Green's function G(τ) and,
/// optionally, the improved estimator F(τ).
///
/// After every sampled configuration, [`GFTau::accumulate`] reads the
/// inverse of each color's hybridization matrix and bins its entries over
/// one period; [`GFTau::collect_results`] reduces across workers,
/// normalizes by the partition-function estimator and hands the histograms
/// to the result sink.
pub struct GFTau {
    beta: f64,
    delta_tau: f64,
    measure_f: bool,
    g_tau: Vec<Array1<f64>>,
    f_tau: Vec<Array1<f64>>,
    z: f64,
}

impl GFTau {
    /// Allocates zeroed histograms, one per color, over the inclusive mesh
    /// `τ_k = k·β/(n_tau_g − 1)`.
    ///
    /// # Panics
    /// Panics unless the mesh has at least two points.
    pub fn new<D: Determinant>(params: &Params, wdata: &WorkData<D>) -> Self {
        assert!(
            params.n_tau_g >= 2,
            "The G(tau) mesh needs at least two points, got {}",
            params.n_tau_g
        );
        let n_color = wdata.n_color();
        let measure_f = params.measure_f_tau && wdata.rot_inv;
        let f_colors = if measure_f { n_color } else { 0 };
        Self {
            beta: params.beta,
            delta_tau: params.beta / (params.n_tau_g - 1) as f64,
            measure_f,
            g_tau: vec![Array1::zeros(params.n_tau_g); n_color],
            f_tau: vec![Array1::zeros(params.n_tau_g); f_colors],
            z: 0.0,
        }
    }

    /// The signed sample count accumulated so far (the partition-function
    /// estimator).
    pub fn z(&self) -> f64 {
        self.z
    }

    /// Raw signed histograms accumulated so far, before reduction and
    /// normalization.
    pub fn raw_g(&self) -> &[Array1<f64>] {
        &self.g_tau
    }

    /// Bins the current configuration's propagator matrix elements with the
    /// sample's signed weight.
    pub fn accumulate<D: Determinant>(
        &mut self,
        sign: f64,
        config: &Configuration,
        wdata: &WorkData<D>,
    ) {
        trace!("Measuring G(tau), sign {}", sign);
        debug_assert_eq!(
            self.beta, config.beta,
            "Measurement and configuration must share the same period"
        );
        self.z += sign;

        for (color, det) in wdata.dets.iter().enumerate() {
            let n = det.size();
            for i in 0..n {
                let tau_y = det.get_y(i);
                let f_fact = if self.measure_f {
                    fprefactor(color, tau_y, config, wdata)
                } else {
                    0.0
                };
                for j in 0..n {
                    let tau_x = det.get_x(j);
                    // The cyclic difference folds tau_y - tau_x into one
                    // period; antiperiodicity only leaves the sign flip for
                    // wrapped pairs.
                    let val = if tau_y >= tau_x { sign } else { -sign } * det.inverse_matrix(i, j);
                    let dtau = (tau_y - tau_x).value();
                    let last = self.g_tau[color].len() - 1;
                    let bin = ((dtau / self.delta_tau).round() as usize).min(last);
                    self.g_tau[color][bin] += val;
                    if self.measure_f {
                        self.f_tau[color][bin] += val * f_fact;
                    }
                }
            }
        }
    }

    /// Reduces the accumulators across all workers, normalizes and
    /// publishes the histograms, consuming the accumulator.
    ///
    /// Each histogram is rescaled by `1 / (−β · Z · δτ)`; the first and
    /// last bins are then doubled to compensate for the half-width of the
    /// endpoint bins at τ = 0 and τ = β.
    pub fn collect_results(mut self, reducer: &impl AllReduce, results: &mut Results) {
        self.z = reducer.sum_scalar(self.z);
        debug!("Collecting G(tau): Z = {}", self.z);

        let norm = -self.beta * self.z * self.delta_tau;
        for g in self.g_tau.iter_mut().chain(self.f_tau.iter_mut()) {
            reducer.sum_inplace(g.as_slice_mut().expect("Histogram must be contiguous"));
            *g /= norm;
            let last = g.len() - 1;
            g[0] *= 2.0;
            g[last] *= 2.0;
        }

        results.beta = self.beta;
        results.g_tau = Some(self.g_tau);
        results.f_tau = if self.measure_f {
            Some(self.f_tau)
        } else {
            None
        };
    }
}

/// Local potential prefactor of the improved estimator: the instantaneous
/// interaction felt by `color` at the annihilation time `tau`, from every
/// other color's occupation and, when active, from the retarded kernels.
fn fprefactor<D: Determinant>(
    color: usize,
    tau: Tau,
    config: &Configuration,
    wdata: &WorkData<D>,
) -> f64 {
    let mut i_tau = 0.0;
    for (c, sl) in config.seglists.iter().enumerate() {
        let ntau = seglist::n_at(tau, sl);
        if c != color {
            i_tau += wdata.u[[c, color]] * ntau;
        }
        if wdata.has_dt {
            let kprime = wdata
                .kprime
                .as_deref()
                .expect("has_dt requires the K' kernel");
            i_tau -= seglist::k_overlap_at(sl, tau, false, kprime, c, color);
            if c == color {
                i_tau -= 2.0 * kprime.eval(0.0, c, c);
            }
        }
        if wdata.has_jperp {
            let kprime_spin = wdata
                .kprime_spin
                .as_deref()
                .expect("has_jperp requires the spin K' kernel");
            i_tau -= 4.0 * kprime_spin.eval(0.0, c, color) * ntau;
            i_tau -= 2.0 * seglist::k_overlap_at(sl, tau, false, kprime_spin, c, color);
        }
    }
    i_tau
}
