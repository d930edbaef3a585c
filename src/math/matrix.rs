use rand::Rng;
use serde::{Serialize, Deserialize};
use std::ops::{Add, Sub, Mul};

use crate::error::{Error, Result};

/// Row-major dense matrix. A mini-batch is stored one sample per row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Matrix{
    pub rows: usize,
    pub cols: usize,
    pub data: Vec<Vec<f64>>
}

impl Matrix{
    pub fn zeros(rows: usize, cols: usize) -> Matrix {
        Matrix::filled(rows, cols, 0.0)
    }

    pub fn filled(rows: usize, cols: usize, value: f64) -> Matrix {
        Matrix{
            rows,
            cols,
            data: vec![vec![value; cols]; rows]
        }
    }

    /// Glorot uniform initialization scaled by 4, the recommended range for
    /// sigmoid units: U(-l, l) * 4 with l = sqrt(6 / (n_in + n_out)).
    ///
    /// Shape: (n_in, n_out).
    pub fn glorot_uniform<R: Rng + ?Sized>(n_in: usize, n_out: usize, rng: &mut R) -> Matrix {
        let limit = (6.0 / (n_in + n_out) as f64).sqrt();
        let mut res = Matrix::zeros(n_in, n_out);
        for row in res.data.iter_mut() {
            for x in row.iter_mut() {
                *x = rng.gen_range(-limit..=limit) * 4.0;
            }
        }
        res
    }

    /// Wraps row data without checking it; `cols` is taken from the first row.
    pub fn from_data(data: Vec<Vec<f64>>) -> Matrix {
        Matrix {
            rows: data.len(),
            cols: data.first().map_or(0, |r| r.len()),
            data
        }
    }

    /// Like `from_data`, but rejects ragged or empty input.
    pub fn from_rows(data: Vec<Vec<f64>>) -> Result<Matrix> {
        let cols = match data.first() {
            Some(row) if !row.is_empty() => row.len(),
            Some(_) => return Err(Error::data("rows must not be empty")),
            None => return Err(Error::data("matrix needs at least one row")),
        };
        if let Some((i, row)) = data.iter().enumerate().find(|(_, r)| r.len() != cols) {
            return Err(Error::data(format!(
                "row {i} has {} columns, expected {cols}",
                row.len()
            )));
        }
        Ok(Matrix::from_data(data))
    }

    pub fn transpose(&self) -> Matrix {
        let mut res = Matrix::zeros(self.cols, self.rows);

        for i in 0..res.rows {
            for j in 0..res.cols {
                res.data[i][j] = self.data[j][i];
            }
        }

        res
    }

    pub fn map<F>(&self, functor: F) -> Matrix
    where
        F: Fn(f64) -> f64,
    {
        Matrix {
            rows: self.rows,
            cols: self.cols,
            data: self.data.iter()
                .map(|row| row.iter().map(|&x| functor(x)).collect())
                .collect(),
        }
    }

    /// Element-wise combination of two same-shape matrices.
    pub fn zip_map<F>(&self, other: &Matrix, functor: F) -> Matrix
    where
        F: Fn(f64, f64) -> f64,
    {
        assert_same_shape(self, other);
        Matrix {
            rows: self.rows,
            cols: self.cols,
            data: self.data.iter().zip(other.data.iter())
                .map(|(ra, rb)| ra.iter().zip(rb.iter()).map(|(&a, &b)| functor(a, b)).collect())
                .collect(),
        }
    }

    pub fn matmul(&self, rhs: &Matrix) -> Matrix {
        if self.cols != rhs.rows {
            panic!("matmul: [{}x{}] * [{}x{}]", self.rows, self.cols, rhs.rows, rhs.cols)
        }

        let mut res = Matrix::zeros(self.rows, rhs.cols);

        for (i, out_row) in res.data.iter_mut().enumerate() {
            for (k, &a) in self.data[i].iter().enumerate() {
                if a == 0.0 {
                    continue;
                }
                for (o, &b) in out_row.iter_mut().zip(rhs.data[k].iter()) {
                    *o += a * b;
                }
            }
        }

        res
    }

    /// Element-wise (Hadamard) product.
    pub fn hadamard(&self, other: &Matrix) -> Matrix {
        self.zip_map(other, |a, b| a * b)
    }

    pub fn scale(&self, factor: f64) -> Matrix {
        self.map(|x| x * factor)
    }

    /// Adds a 1×cols row to every row (bias broadcast).
    pub fn add_row(&self, row: &Matrix) -> Matrix {
        assert_eq!(row.rows, 1, "add_row expects a single row");
        assert_eq!(row.cols, self.cols, "add_row: column count mismatch");
        let bias = &row.data[0];
        Matrix {
            rows: self.rows,
            cols: self.cols,
            data: self.data.iter()
                .map(|r| r.iter().zip(bias.iter()).map(|(x, b)| x + b).collect())
                .collect(),
        }
    }

    /// Column sums as a 1×cols matrix.
    pub fn sum_rows(&self) -> Matrix {
        let mut res = Matrix::zeros(1, self.cols);
        for row in &self.data {
            for (acc, x) in res.data[0].iter_mut().zip(row.iter()) {
                *acc += x;
            }
        }
        res
    }

    pub fn slice_rows(&self, start: usize, end: usize) -> Matrix {
        let end = end.min(self.rows);
        let start = start.min(end);
        Matrix {
            rows: end - start,
            cols: self.cols,
            data: self.data[start..end].to_vec(),
        }
    }

    pub fn select_rows(&self, indices: &[usize]) -> Matrix {
        Matrix {
            rows: indices.len(),
            cols: self.cols,
            data: indices.iter().map(|&i| self.data[i].clone()).collect(),
        }
    }

    /// Stacks matrices vertically. All parts must share a column count.
    pub fn vstack(parts: &[Matrix]) -> Matrix {
        let cols = parts.first().map_or(0, |m| m.cols);
        let mut data = Vec::with_capacity(parts.iter().map(|m| m.rows).sum());
        for part in parts {
            assert_eq!(part.cols, cols, "vstack: column count mismatch");
            data.extend(part.data.iter().cloned());
        }
        Matrix { rows: data.len(), cols, data }
    }

    /// Index of the largest entry of each row; ties go to the lowest index.
    pub fn row_argmax(&self) -> Vec<usize> {
        self.data.iter()
            .map(|row| {
                let mut best = 0;
                for (j, &x) in row.iter().enumerate() {
                    if x > row[best] {
                        best = j;
                    }
                }
                best
            })
            .collect()
    }

    pub fn sum(&self) -> f64 {
        self.data.iter().flatten().sum()
    }

    pub fn sum_abs(&self) -> f64 {
        self.data.iter().flatten().map(|x| x.abs()).sum()
    }

    pub fn sum_sq(&self) -> f64 {
        self.data.iter().flatten().map(|x| x * x).sum()
    }

    pub fn shape(&self) -> (usize, usize) {
        (self.rows, self.cols)
    }
}

fn assert_same_shape(a: &Matrix, b: &Matrix) {
    if a.rows != b.rows || a.cols != b.cols {
        panic!("Matrices are of incorrect sizes: {}x{} vs {}x{}", a.rows, a.cols, b.rows, b.cols)
    }
}

impl Default for Matrix {
    fn default() -> Self {
        Matrix { rows: 0, cols: 0, data: vec![] }
    }
}

impl Add for Matrix {
    type Output = Matrix;

    fn add(self, rhs: Self) -> Self::Output {
        self.zip_map(&rhs, |a, b| a + b)
    }
}

impl Sub for Matrix {
    type Output = Matrix;

    fn sub(self, rhs: Self) -> Self::Output {
        self.zip_map(&rhs, |a, b| a - b)
    }
}

impl Mul for Matrix {
    type Output = Matrix;

    fn mul(self, rhs: Self) -> Self::Output {
        self.matmul(&rhs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn matmul_matches_hand_computation() {
        let a = Matrix::from_data(vec![vec![1.0, 2.0], vec![3.0, 4.0]]);
        let b = Matrix::from_data(vec![vec![5.0], vec![6.0]]);
        assert_eq!((a * b).data, vec![vec![17.0], vec![39.0]]);
    }

    #[test]
    fn add_row_broadcasts_and_sum_rows_reduces() {
        let m = Matrix::from_data(vec![vec![1.0, 2.0], vec![3.0, 4.0]]);
        let bias = Matrix::from_data(vec![vec![10.0, 20.0]]);
        let shifted = m.add_row(&bias);
        assert_eq!(shifted.data, vec![vec![11.0, 22.0], vec![13.0, 24.0]]);
        assert_eq!(shifted.sum_rows().data, vec![vec![24.0, 46.0]]);
    }

    #[test]
    fn glorot_uniform_stays_within_scaled_limit() {
        let mut rng = ChaCha8Rng::seed_from_u64(42);
        let w = Matrix::glorot_uniform(20, 10, &mut rng);
        let limit = (6.0_f64 / 30.0).sqrt() * 4.0;
        assert_eq!(w.shape(), (20, 10));
        assert!(w.data.iter().flatten().all(|x| x.abs() <= limit));
        assert!(w.sum_abs() > 0.0);
    }

    #[test]
    fn from_rows_rejects_ragged_input() {
        assert!(Matrix::from_rows(vec![vec![1.0, 2.0], vec![3.0]]).is_err());
        assert!(Matrix::from_rows(vec![]).is_err());
    }

    #[test]
    fn row_argmax_prefers_first_on_ties() {
        let m = Matrix::from_data(vec![vec![0.5, 0.5], vec![0.1, 0.9]]);
        assert_eq!(m.row_argmax(), vec![0, 1]);
    }

    #[test]
    fn vstack_and_slice_round_out_batches() {
        let m = Matrix::from_data(vec![vec![1.0], vec![2.0], vec![3.0]]);
        let head = m.slice_rows(0, 2);
        let tail = m.slice_rows(2, 10);
        assert_eq!(tail.rows, 1);
        assert_eq!(Matrix::vstack(&[head, tail]), m);
    }
}
