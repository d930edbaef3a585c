use serde::{Serialize, Deserialize};

use crate::math::matrix::Matrix;

/// L1/L2 weight penalties added to the training cost:
///   l1 * sum|theta| + l2 * sum(theta^2)
/// over every parameter, biases included. A coefficient of zero disables
/// that term.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Regularization {
    pub l1: f64,
    pub l2: f64,
}

impl Regularization {
    pub fn new(l1: f64, l2: f64) -> Regularization {
        Regularization { l1, l2 }
    }

    pub fn is_active(&self) -> bool {
        self.l1 > 0.0 || self.l2 > 0.0
    }

    pub fn penalty<'a>(&self, params: impl IntoIterator<Item = &'a Matrix>) -> f64 {
        if !self.is_active() {
            return 0.0;
        }
        params.into_iter()
            .map(|p| {
                let mut cost = 0.0;
                if self.l1 > 0.0 {
                    cost += self.l1 * p.sum_abs();
                }
                if self.l2 > 0.0 {
                    cost += self.l2 * p.sum_sq();
                }
                cost
            })
            .sum()
    }

    /// Adds the penalty's gradient for `param` into `grad` in place.
    /// The L1 subgradient is 0 at 0.
    pub fn accumulate(&self, param: &Matrix, grad: &mut Matrix) {
        if !self.is_active() {
            return;
        }
        for (g_row, p_row) in grad.data.iter_mut().zip(param.data.iter()) {
            for (g, &p) in g_row.iter_mut().zip(p_row.iter()) {
                if self.l1 > 0.0 && p != 0.0 {
                    *g += self.l1 * p.signum();
                }
                if self.l2 > 0.0 {
                    *g += 2.0 * self.l2 * p;
                }
            }
        }
    }
}
