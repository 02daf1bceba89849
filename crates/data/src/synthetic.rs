//! Synthetic coupled series for demos and tests.
//!
//! Generates `y[t] = coupling * x[t - lag] + noise * e[t]` with white-noise
//! `x`, so the direction and delay of the dependence are known in advance.

use anyhow::{Context, Result};
use csv::Writer;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::path::Path;

/// Parameters of the generated pair.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyntheticConfig {
    /// Number of samples to generate.
    pub samples: usize,
    /// Delay of the X -> Y coupling in samples.
    pub lag: usize,
    /// Weight of the lagged X term in Y.
    pub coupling: f64,
    /// Standard deviation of Y's own noise.
    pub noise: f64,
    /// Seed for reproducible output.
    pub seed: u64,
}

impl Default for SyntheticConfig {
    fn default() -> Self {
        Self {
            samples: 1000,
            lag: 10,
            coupling: 0.8,
            noise: 0.3,
            seed: 42,
        }
    }
}

impl SyntheticConfig {
    #[must_use]
    pub fn new(samples: usize, lag: usize) -> Self {
        Self {
            samples,
            lag,
            ..Default::default()
        }
    }

    #[must_use]
    pub fn with_coupling(mut self, coupling: f64) -> Self {
        self.coupling = coupling;
        self
    }

    #[must_use]
    pub fn with_noise(mut self, noise: f64) -> Self {
        self.noise = noise;
        self
    }

    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }
}

/// Draws a standard normal variate (Box-Muller).
fn standard_normal<R: Rng>(rng: &mut R) -> f64 {
    let u1: f64 = rng.gen_range(f64::EPSILON..1.0);
    let u2: f64 = rng.gen();
    (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos()
}

/// Generates the coupled pair described by `config`.
#[must_use]
pub fn generate_pair(config: &SyntheticConfig) -> (Vec<f64>, Vec<f64>) {
    let mut rng = ChaCha8Rng::seed_from_u64(config.seed);
    let x: Vec<f64> = (0..config.samples)
        .map(|_| standard_normal(&mut rng))
        .collect();
    let y: Vec<f64> = (0..config.samples)
        .map(|t| {
            let driven = if t >= config.lag {
                config.coupling * x[t - config.lag]
            } else {
                0.0
            };
            driven + config.noise * standard_normal(&mut rng)
        })
        .collect();
    (x, y)
}

/// Writes a pair as header-less CSV, optionally prefixed by a 1-based index column.
///
/// # Errors
/// Returns error if file cannot be created or writing fails
pub fn write_csv(path: &Path, x: &[f64], y: &[f64], with_index: bool) -> Result<()> {
    let file = File::create(path)
        .with_context(|| format!("Failed to create CSV file: {}", path.display()))?;
    let mut writer = Writer::from_writer(file);

    for (i, (xi, yi)) in x.iter().zip(y.iter()).enumerate() {
        if with_index {
            writer.write_record(&[(i + 1).to_string(), xi.to_string(), yi.to_string()])?;
        } else {
            writer.write_record(&[xi.to_string(), yi.to_string()])?;
        }
    }

    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use causal_compare_core::stats::pearson_correlation;

    #[test]
    fn same_seed_same_output() {
        let config = SyntheticConfig::new(200, 5).with_seed(7);
        assert_eq!(generate_pair(&config), generate_pair(&config));
    }

    #[test]
    fn lagged_correlation_is_strong() {
        let config = SyntheticConfig::new(500, 4).with_noise(0.2);
        let (x, y) = generate_pair(&config);
        let r = pearson_correlation(&x[..496], &y[4..]).unwrap();
        assert!(r > 0.9, "lagged correlation was {r}");
    }

    #[test]
    fn written_csv_loads_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pair.csv");
        let (x, y) = generate_pair(&SyntheticConfig::new(120, 3));

        write_csv(&path, &x, &y, true).unwrap();
        let pair = crate::load_pair(&path, crate::SourceHint::Auto, 50).unwrap();

        assert_eq!(pair.len(), 120);
        assert_eq!(pair.x(), x.as_slice());
        assert_eq!(pair.y(), y.as_slice());
    }
}
