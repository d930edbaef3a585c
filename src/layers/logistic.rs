use serde::{Serialize, Deserialize};

use crate::loss::nll::{NllLoss, softmax};
use crate::math::matrix::Matrix;

/// Multi-class logistic regression output layer:
/// `p(y|x) = softmax(X.W + b)`, prediction is the arg-max class.
///
/// Parameters start at zero, so an untrained layer predicts the uniform
/// distribution.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogisticRegression {
    pub weights: Matrix,
    pub biases: Matrix,
}

/// Parameter gradients of the output layer plus the error sent to its input.
#[derive(Debug, Clone)]
pub struct LogisticGrads {
    pub d_weights: Matrix,
    pub d_biases: Matrix,
    pub d_input: Matrix,
}

impl LogisticRegression {
    pub fn new(n_in: usize, n_out: usize) -> LogisticRegression {
        LogisticRegression {
            weights: Matrix::zeros(n_in, n_out),
            biases: Matrix::zeros(1, n_out),
        }
    }

    pub fn n_in(&self) -> usize {
        self.weights.rows
    }

    pub fn n_out(&self) -> usize {
        self.weights.cols
    }

    pub fn p_y_given_x(&self, input: &Matrix) -> Matrix {
        softmax(&input.matmul(&self.weights).add_row(&self.biases))
    }

    pub fn y_pred(&self, input: &Matrix) -> Vec<usize> {
        self.p_y_given_x(input).row_argmax()
    }

    pub fn negative_log_likelihood(proba: &Matrix, labels: &[usize]) -> f64 {
        NllLoss::loss(proba, labels)
    }

    pub fn negative_log_likelihood_sum(proba: &Matrix, labels: &[usize]) -> f64 {
        NllLoss::loss_sum(proba, labels)
    }

    /// Number of rows whose arg-max differs from the label.
    pub fn count_errors(proba: &Matrix, labels: &[usize]) -> usize {
        proba.row_argmax().iter().zip(labels.iter())
            .filter(|(pred, y)| pred != y)
            .count()
    }

    /// Fraction of misclassified rows.
    pub fn errors(proba: &Matrix, labels: &[usize]) -> f64 {
        if labels.is_empty() {
            return 0.0;
        }
        Self::count_errors(proba, labels) as f64 / labels.len() as f64
    }

    /// Backward pass of softmax + mean negative log-likelihood.
    /// `proba` must come from `p_y_given_x(input)`.
    pub fn backward(&self, input: &Matrix, proba: &Matrix, labels: &[usize]) -> LogisticGrads {
        let delta = NllLoss::derivative(proba, labels);
        LogisticGrads {
            d_weights: input.transpose().matmul(&delta),
            d_biases: delta.sum_rows(),
            d_input: delta.matmul(&self.weights.transpose()),
        }
    }
}
