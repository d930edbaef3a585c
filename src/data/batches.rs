use std::ops::Range;

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::data::dataset::Dataset;
use crate::error::{Error, Result};
use crate::math::matrix::Matrix;

/// Default number of samples per mini-batch.
pub const BATCH_SIZE: usize = 100;

/// One mini-batch. `index` is the batch's position in the sequential order.
#[derive(Debug, Clone)]
pub struct Batch {
    pub index: usize,
    pub x: Matrix,
    pub y: Vec<usize>,
}

/// Splits a dataset into mini-batches, epoch after epoch.
///
/// Sequential mode yields `ceil(n / batch_size)` consecutive batches, the
/// last one possibly short. Randomized mode yields `floor(n / batch_size)`
/// batches per epoch, each one a uniformly drawn batch slot, so a slot may
/// come up twice in an epoch. The sampler's RNG carries over between epochs.
#[derive(Debug, Clone)]
pub struct MiniBatchIterator {
    batch_size: usize,
    randomize: bool,
    rng: ChaCha8Rng,
}

impl MiniBatchIterator {
    pub fn new(batch_size: usize) -> Result<MiniBatchIterator> {
        if batch_size == 0 {
            return Err(Error::config("batch_size must be at least 1"));
        }
        Ok(MiniBatchIterator {
            batch_size,
            randomize: false,
            rng: ChaCha8Rng::seed_from_u64(42),
        })
    }

    pub fn randomized(batch_size: usize, seed: u64) -> Result<MiniBatchIterator> {
        let mut it = MiniBatchIterator::new(batch_size)?;
        it.randomize = true;
        it.rng = ChaCha8Rng::seed_from_u64(seed);
        Ok(it)
    }

    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    /// Number of distinct batch slots for `n` samples.
    pub fn n_slots(&self, n: usize) -> usize {
        n.div_ceil(self.batch_size)
    }

    /// Row ranges for one epoch over `n` samples.
    pub fn ranges(&mut self, n: usize) -> Vec<(usize, Range<usize>)> {
        let bs = self.batch_size;
        let slot = |i: usize| (i, i * bs..((i + 1) * bs).min(n));
        let slots = self.n_slots(n);
        if self.randomize {
            (0..n / bs)
                .map(|_| slot(self.rng.gen_range(0..slots)))
                .collect()
        } else {
            (0..slots).map(slot).collect()
        }
    }

    /// Materialized batches for one epoch over `data`.
    pub fn batches<'a>(&mut self, data: &'a Dataset) -> impl Iterator<Item = Batch> + 'a {
        self.ranges(data.len()).into_iter().map(move |(index, range)| Batch {
            index,
            x: data.x.slice_rows(range.start, range.end),
            y: data.y[range].to_vec(),
        })
    }
}

/// Consecutive row blocks of `x`, used for batched prediction.
pub fn row_batches(x: &Matrix, batch_size: usize) -> impl Iterator<Item = Matrix> + '_ {
    let bs = batch_size.max(1);
    (0..x.rows.div_ceil(bs)).map(move |i| x.slice_rows(i * bs, (i + 1) * bs))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dataset(n: usize) -> Dataset {
        Dataset::from_rows((0..n).map(|i| vec![i as f64]).collect(), vec![0; n]).unwrap()
    }

    #[test]
    fn sequential_covers_every_row_once() {
        let data = dataset(250);
        let mut it = MiniBatchIterator::new(100).unwrap();
        let sizes: Vec<usize> = it.batches(&data).map(|b| b.y.len()).collect();
        assert_eq!(sizes, vec![100, 100, 50]);
        let last = it.batches(&data).last().unwrap();
        assert_eq!(last.index, 2);
        assert_eq!(last.x.data[0][0], 200.0);
    }

    #[test]
    fn randomized_draws_floor_n_over_bs_slots() {
        let mut it = MiniBatchIterator::randomized(10, 42).unwrap();
        let ranges = it.ranges(95);
        assert_eq!(ranges.len(), 9);
        for (index, range) in &ranges {
            assert!(*index < 10);
            assert!(!range.is_empty());
            assert!(range.end <= 95);
        }
    }

    #[test]
    fn randomized_with_unit_batches_picks_single_rows() {
        let mut it = MiniBatchIterator::randomized(1, 7).unwrap();
        let ranges = it.ranges(5);
        assert_eq!(ranges.len(), 5);
        assert!(ranges.iter().all(|(i, r)| r.len() == 1 && r.start == *i));
    }

    #[test]
    fn rejects_zero_batch_size() {
        assert!(MiniBatchIterator::new(0).is_err());
    }

    #[test]
    fn row_batches_keep_the_tail() {
        let x = Matrix::filled(7, 2, 1.0);
        let sizes: Vec<usize> = row_batches(&x, 3).map(|m| m.rows).collect();
        assert_eq!(sizes, vec![3, 3, 1]);
    }
}
