use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use crate::data::dataset::Dataset;
use crate::error::{Error, Result};

/// Seeded permutation of `0..n`.
pub fn permutation(n: usize, seed: u64) -> Vec<usize> {
    let mut indices: Vec<usize> = (0..n).collect();
    indices.shuffle(&mut ChaCha8Rng::seed_from_u64(seed));
    indices
}

/// Returns the samples of `data` in a seeded random order.
pub fn shuffle(data: &Dataset, seed: u64) -> Dataset {
    data.subset(&permutation(data.len(), seed))
}

/// Shuffles and splits into `(train, test)`; the test part holds
/// `ceil(n * test_ratio)` samples. Both parts must end up non-empty.
pub fn train_test_split(data: &Dataset, test_ratio: f64, seed: u64) -> Result<(Dataset, Dataset)> {
    if !(test_ratio > 0.0 && test_ratio < 1.0) {
        return Err(Error::config(format!("test ratio must be in (0, 1), got {test_ratio}")));
    }
    let n = data.len();
    let n_test = (n as f64 * test_ratio).ceil() as usize;
    if n_test == 0 || n_test >= n {
        return Err(Error::data(format!(
            "cannot split {n} samples with test ratio {test_ratio}"
        )));
    }
    let perm = permutation(n, seed);
    let (test_idx, train_idx) = perm.split_at(n_test);
    Ok((data.subset(train_idx), data.subset(test_idx)))
}

/// Appends a copy of every sample labelled `class`, doubling its weight
/// in training.
pub fn oversample_class(data: &Dataset, class: usize) -> Dataset {
    let mut indices: Vec<usize> = (0..data.len()).collect();
    indices.extend((0..data.len()).filter(|&i| data.y[i] == class));
    data.subset(&indices)
}
