use crate::math::matrix::Matrix;
use crate::optim::Optimizer;

/// Plain stochastic gradient descent: `theta <- theta - lr * g`.
#[derive(Debug, Clone, Default)]
pub struct Sgd;

impl Sgd {
    pub fn new() -> Sgd {
        Sgd
    }
}

impl Optimizer for Sgd {
    fn step(&mut self, params: Vec<&mut Matrix>, grads: &[Matrix], lr: f64) {
        for (param, grad) in params.into_iter().zip(grads.iter()) {
            for (p_row, g_row) in param.data.iter_mut().zip(grad.data.iter()) {
                for (p, g) in p_row.iter_mut().zip(g_row.iter()) {
                    *p -= lr * g;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn steps_against_the_gradient() {
        let mut w = Matrix::from_data(vec![vec![1.0, -1.0]]);
        let g = Matrix::from_data(vec![vec![0.5, -2.0]]);
        Sgd::new().step(vec![&mut w], &[g], 0.1);
        assert!((w.data[0][0] - 0.95).abs() < 1e-12);
        assert!((w.data[0][1] + 0.8).abs() < 1e-12);
    }
}
