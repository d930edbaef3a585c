use serde::{Serialize, Deserialize};

use crate::error::{Error, Result};
use crate::math::matrix::Matrix;

/// Feature matrix (one sample per row) with integer class labels.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dataset {
    pub x: Matrix,
    pub y: Vec<usize>,
}

impl Dataset {
    pub fn new(x: Matrix, y: Vec<usize>) -> Result<Dataset> {
        if x.rows == 0 {
            return Err(Error::data("dataset must not be empty"));
        }
        if x.cols == 0 {
            return Err(Error::data("dataset must have at least one feature"));
        }
        if x.rows != y.len() {
            return Err(Error::data(format!(
                "{} feature rows but {} labels",
                x.rows,
                y.len()
            )));
        }
        if x.data.iter().any(|row| row.len() != x.cols) {
            return Err(Error::data("feature rows have differing lengths"));
        }
        if x.data.iter().flatten().any(|v| !v.is_finite()) {
            return Err(Error::data("features must be finite (impute missing values first)"));
        }
        Ok(Dataset { x, y })
    }

    pub fn from_rows(rows: Vec<Vec<f64>>, y: Vec<usize>) -> Result<Dataset> {
        Dataset::new(Matrix::from_rows(rows)?, y)
    }

    pub fn len(&self) -> usize {
        self.y.len()
    }

    pub fn is_empty(&self) -> bool {
        self.y.is_empty()
    }

    pub fn n_features(&self) -> usize {
        self.x.cols
    }

    /// One more than the largest label.
    pub fn n_classes(&self) -> usize {
        self.y.iter().max().map_or(0, |&m| m + 1)
    }

    /// Number of samples per class, indexed by label.
    pub fn class_counts(&self) -> Vec<usize> {
        let mut counts = vec![0; self.n_classes()];
        for &label in &self.y {
            counts[label] += 1;
        }
        counts
    }

    /// Rows at `indices`, in that order. Indices may repeat.
    pub fn subset(&self, indices: &[usize]) -> Dataset {
        Dataset {
            x: self.x.select_rows(indices),
            y: indices.iter().map(|&i| self.y[i]).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_label_count_mismatch_and_nan() {
        assert!(Dataset::from_rows(vec![vec![1.0], vec![2.0]], vec![0]).is_err());
        assert!(Dataset::from_rows(vec![vec![f64::NAN]], vec![0]).is_err());
        assert!(Dataset::from_rows(vec![], vec![]).is_err());
    }

    #[test]
    fn counts_classes() {
        let data = Dataset::from_rows(vec![vec![0.0], vec![1.0], vec![2.0]], vec![2, 0, 2]).unwrap();
        assert_eq!(data.n_classes(), 3);
        assert_eq!(data.class_counts(), vec![1, 0, 2]);
        assert_eq!(data.subset(&[2, 2]).y, vec![2, 2]);
    }
}
