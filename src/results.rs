//! Result sink for the measured correlation functions.

use ndarray::Array1;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{self, BufReader, BufWriter};

/// The normalized measurement output, filled by ownership transfer when the
/// accumulators collect their results.
///
/// Histograms are dense per-color arrays over the inclusive mesh
/// `τ_k = k·β/(n−1)`, `k = 0..n`.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct Results {
    /// Circumference of the imaginary-time circle.
    pub beta: f64,
    /// Imaginary-time Green's function G(τ), one array per color.
    pub g_tau: Option<Vec<Array1<f64>>>,
    /// Improved estimator F(τ), one array per color, when measured.
    pub f_tau: Option<Vec<Array1<f64>>>,
}

impl Results {
    /// Serializes the results to a JSON file.
    pub fn save_to_file(&self, filename: &str) -> io::Result<()> {
        let file = File::create(filename)?;
        let writer = BufWriter::new(file);
        serde_json::to_writer(writer, &self)?;
        Ok(())
    }

    /// Restores results from a JSON file written by [`Results::save_to_file`].
    pub fn load_from_file(filename: &str) -> io::Result<Self> {
        let file = File::open(filename)?;
        let reader = BufReader::new(file);
        let results = serde_json::from_reader(reader)?;
        Ok(results)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::arr1;
    use tempfile::NamedTempFile;

    #[test]
    fn test_json_round_trip() {
        let results = Results {
            beta: 4.0,
            g_tau: Some(vec![arr1(&[0.1, 0.2, 0.3]), arr1(&[0.4, 0.5, 0.6])]),
            f_tau: None,
        };

        let file = NamedTempFile::new().expect("Failed to create temp file");
        let path = file.path().to_str().unwrap();
        results.save_to_file(path).expect("Failed to save results");
        let loaded = Results::load_from_file(path).expect("Failed to load results");

        assert_eq!(loaded.beta, 4.0);
        let g = loaded.g_tau.unwrap();
        assert_eq!(g.len(), 2);
        assert_eq!(g[0], arr1(&[0.1, 0.2, 0.3]));
        assert!(loaded.f_tau.is_none());
    }
}
