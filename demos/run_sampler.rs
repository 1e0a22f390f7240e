use env_logger::Builder;
use log::info;
use ndarray::{Array1, Array2};
use rand::Rng;

use ctseg::configuration::{check_invariant, Configuration};
use ctseg::det::{antiperiodic, DenseDeterminant};
use ctseg::measures::{GFTau, Params};
use ctseg::moves::{InsertSegment, MonteCarloMove};
use ctseg::reduce::LocalReduce;
use ctseg::results::Results;
use ctseg::work_data::WorkData;

const N_COLOR: usize = 2;
const BETA: f64 = 4.0;
const N_SWEEPS: usize = 2000;

fn main() {
    // Programmatically set the logging level to INFO
    Builder::new().filter_level(log::LevelFilter::Info).init();

    info!("Starting CT-SEG demo: {} colors, beta = {}", N_COLOR, BETA);

    // Flat hybridization, positive on (0, beta).
    let dets: Vec<_> = (0..N_COLOR)
        .map(|_| DenseDeterminant::new(antiperiodic(|_| 0.25)))
        .collect();

    let mut u = Array2::zeros((N_COLOR, N_COLOR));
    u[[0, 1]] = 1.0;
    u[[1, 0]] = 1.0;
    let mu = Array1::from_elem(N_COLOR, 0.5);
    let mut wdata = WorkData::new(u, mu, dets);

    let mut config = Configuration::new(N_COLOR, BETA);
    let mut insert = InsertSegment::new();
    let mut gf = GFTau::new(
        &Params {
            beta: BETA,
            n_tau_g: 101,
            measure_f_tau: true,
        },
        &wdata,
    );

    let mut rng = rand::thread_rng();
    let mut sign = 1.0;

    for sweep in 0..N_SWEEPS {
        let ratio = insert.propose(&config, &mut wdata, &mut rng);
        if rng.gen::<f64>() < ratio.abs() {
            sign *= insert.accept(&mut config, &mut wdata);
        } else {
            insert.reject(&mut wdata);
        }
        gf.accumulate(sign, &config, &wdata);

        if (sweep + 1) % 500 == 0 {
            info!(
                "Sweep {}: {} accepted, {} rejected",
                sweep + 1,
                insert.accept_count,
                insert.reject_count
            );
            info!("Current configuration:\n{}", config);
        }
    }

    check_invariant(&config, &wdata.dets);
    let occupied: f64 = config.seglists[0].iter().map(|s| s.length()).sum();
    info!(
        "Color 0 occupation: {:.4}, Z estimator: {}",
        occupied / BETA,
        gf.z()
    );

    let mut results = Results::default();
    gf.collect_results(&LocalReduce, &mut results);
    let g = results.g_tau.as_ref().unwrap();
    let delta_tau = BETA / 100.0;
    for k in [0, 25, 50, 75, 100] {
        info!(
            "G(tau = {:.2}) = {:+.6}",
            k as f64 * delta_tau,
            g[0][k]
        );
    }

    results
        .save_to_file("gtau_demo.json")
        .expect("Failed to write results");
    info!("Results written to gtau_demo.json");
}
