use std::f64::consts::PI;

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::data::dataset::Dataset;
use crate::error::{Error, Result};
use crate::math::matrix::Matrix;

/// Samples a single value from N(0, 1) using the Box-Muller transform.
fn sample_standard_normal<R: Rng + ?Sized>(rng: &mut R) -> f64 {
    // Draw two independent uniform samples in (0, 1] to avoid log(0).
    let u1: f64 = 1.0 - rng.gen::<f64>();
    let u2: f64 = 1.0 - rng.gen::<f64>();
    (-2.0 * u1.ln()).sqrt() * (2.0 * PI * u2).cos()
}

/// Isotropic unit-variance Gaussian blobs, one per class.
///
/// `class_sizes[c]` samples are drawn for class `c` around a center whose
/// first feature is `c * separation` (other features centered at 0), so
/// only the first feature carries signal. Samples are returned grouped by
/// class; shuffle before splitting.
pub fn gaussian_blobs(
    class_sizes: &[usize],
    n_features: usize,
    separation: f64,
    seed: u64,
) -> Result<Dataset> {
    if n_features == 0 {
        return Err(Error::config("n_features must be > 0"));
    }
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let mut rows = Vec::with_capacity(class_sizes.iter().sum());
    let mut labels = Vec::with_capacity(rows.capacity());
    for (class, &size) in class_sizes.iter().enumerate() {
        for _ in 0..size {
            let row: Vec<f64> = (0..n_features)
                .map(|j| {
                    let center = if j == 0 { class as f64 * separation } else { 0.0 };
                    center + sample_standard_normal(&mut rng)
                })
                .collect();
            rows.push(row);
            labels.push(class);
        }
    }
    Dataset::new(Matrix::from_data(rows), labels)
}
