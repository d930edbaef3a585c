use std::f64::consts::PI;

use serde::{Serialize, Deserialize};
use tracing::debug;

use crate::data::dataset::Dataset;
use crate::error::{Error, Result};
use crate::math::matrix::Matrix;

/// Fraction of the largest feature variance added to every variance.
pub const VAR_SMOOTHING: f64 = 1e-9;

/// Gaussian Naive Bayes: features are independent normals within a class.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GaussianNb {
    pub var_smoothing: f64,
    /// Sorted distinct labels seen by `fit`.
    classes: Vec<usize>,
    class_prior: Vec<f64>,
    /// Per-class feature means, shape (n_classes, n_features).
    theta: Matrix,
    /// Per-class feature variances (smoothed), same shape as `theta`.
    var: Matrix,
}

impl Default for GaussianNb {
    fn default() -> Self {
        GaussianNb::new()
    }
}

impl GaussianNb {
    pub fn new() -> GaussianNb {
        GaussianNb::with_var_smoothing(VAR_SMOOTHING)
    }

    pub fn with_var_smoothing(var_smoothing: f64) -> GaussianNb {
        GaussianNb {
            var_smoothing,
            classes: Vec::new(),
            class_prior: Vec::new(),
            theta: Matrix::zeros(0, 0),
            var: Matrix::zeros(0, 0),
        }
    }

    pub fn is_fitted(&self) -> bool {
        !self.classes.is_empty()
    }

    pub fn classes(&self) -> &[usize] {
        &self.classes
    }

    pub fn class_prior(&self) -> &[f64] {
        &self.class_prior
    }

    pub fn theta(&self) -> &Matrix {
        &self.theta
    }

    pub fn var(&self) -> &Matrix {
        &self.var
    }

    pub fn fit(&mut self, data: &Dataset) -> Result<()> {
        if !(self.var_smoothing.is_finite() && self.var_smoothing >= 0.0) {
            return Err(Error::config(format!("var_smoothing must be >= 0, got {}", self.var_smoothing)));
        }
        let n = data.len() as f64;
        let d = data.n_features();

        let mut classes: Vec<usize> = data.y.clone();
        classes.sort_unstable();
        classes.dedup();

        let (_, overall_var) = mean_var(&data.x.data.iter().collect::<Vec<_>>(), d);
        let max_var = overall_var.iter().cloned().fold(0.0, f64::max);
        let mut epsilon = self.var_smoothing * max_var;
        if epsilon == 0.0 {
            // Every feature is constant; keep the variances strictly positive.
            epsilon = self.var_smoothing.max(f64::MIN_POSITIVE);
        }

        let mut theta = Vec::with_capacity(classes.len());
        let mut var = Vec::with_capacity(classes.len());
        let mut prior = Vec::with_capacity(classes.len());
        for &class in &classes {
            let rows: Vec<&Vec<f64>> = data.x.data.iter().zip(data.y.iter())
                .filter(|(_, y)| **y == class)
                .map(|(row, _)| row)
                .collect();
            let (mean, variance) = mean_var(&rows, d);
            prior.push(rows.len() as f64 / n);
            theta.push(mean);
            var.push(variance.into_iter().map(|v| v + epsilon).collect());
        }

        self.classes = classes;
        self.class_prior = prior;
        self.theta = Matrix::from_data(theta);
        self.var = Matrix::from_data(var);
        debug!(classes = ?self.classes, priors = ?self.class_prior, epsilon, "fitted gaussian naive bayes");
        Ok(())
    }

    /// log P(c) + log P(x | c) for every row and class.
    fn joint_log_likelihood(&self, x: &Matrix) -> Result<Matrix> {
        if !self.is_fitted() {
            return Err(Error::NotFitted);
        }
        if x.cols != self.theta.cols {
            return Err(Error::ShapeMismatch { expected: self.theta.cols, got: x.cols });
        }
        let data = x.data.iter()
            .map(|row| {
                (0..self.classes.len())
                    .map(|c| {
                        let mean = &self.theta.data[c];
                        let var = &self.var.data[c];
                        let log_norm: f64 = var.iter().map(|v| (2.0 * PI * v).ln()).sum::<f64>() * -0.5;
                        let sq: f64 = row.iter().zip(mean.iter()).zip(var.iter())
                            .map(|((xv, m), v)| (xv - m).powi(2) / v)
                            .sum();
                        self.class_prior[c].ln() + log_norm - 0.5 * sq
                    })
                    .collect()
            })
            .collect();
        Ok(Matrix { rows: x.rows, cols: self.classes.len(), data })
    }

    /// Posterior class probabilities; columns follow `classes()`.
    pub fn predict_proba(&self, x: &Matrix) -> Result<Matrix> {
        let jll = self.joint_log_likelihood(x)?;
        Ok(log_normalize_rows(&jll))
    }

    pub fn predict(&self, x: &Matrix) -> Result<Vec<usize>> {
        let jll = self.joint_log_likelihood(x)?;
        Ok(jll.row_argmax().into_iter().map(|i| self.classes[i]).collect())
    }
}

/// Feature-wise mean and (population) variance of `rows`.
fn mean_var(rows: &[&Vec<f64>], d: usize) -> (Vec<f64>, Vec<f64>) {
    let n = rows.len().max(1) as f64;
    let mut mean = vec![0.0; d];
    for row in rows {
        for (m, x) in mean.iter_mut().zip(row.iter()) {
            *m += x;
        }
    }
    mean.iter_mut().for_each(|m| *m /= n);

    let mut var = vec![0.0; d];
    for row in rows {
        for ((v, x), m) in var.iter_mut().zip(row.iter()).zip(mean.iter()) {
            *v += (x - m).powi(2);
        }
    }
    var.iter_mut().for_each(|v| *v /= n);
    (mean, var)
}

/// exp(row - logsumexp(row)) for every row.
fn log_normalize_rows(m: &Matrix) -> Matrix {
    let data = m.data.iter()
        .map(|row| {
            let max = row.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
            let log_total = max + row.iter().map(|v| (v - max).exp()).sum::<f64>().ln();
            row.iter().map(|v| (v - log_total).exp()).collect()
        })
        .collect();
    Matrix { rows: m.rows, cols: m.cols, data }
}
