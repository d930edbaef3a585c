use crate::math::matrix::Matrix;
use crate::optim::Optimizer;

/// Adagrad (Duchi et al. 2010).
///
/// Keeps a running sum of squared gradients per parameter entry:
///   a <- a + g^2
///   theta <- theta - lr / sqrt(a + eps) * g
#[derive(Debug, Clone)]
pub struct Adagrad {
    pub eps: f64,
    accugrads: Vec<Matrix>,
}

impl Adagrad {
    /// `shapes` are the (rows, cols) of every parameter, in update order.
    pub fn new(shapes: &[(usize, usize)], eps: f64) -> Adagrad {
        Adagrad {
            eps,
            accugrads: shapes.iter().map(|&(r, c)| Matrix::zeros(r, c)).collect(),
        }
    }

    pub fn accugrads(&self) -> &[Matrix] {
        &self.accugrads
    }
}

impl Optimizer for Adagrad {
    fn step(&mut self, params: Vec<&mut Matrix>, grads: &[Matrix], lr: f64) {
        debug_assert_eq!(params.len(), self.accugrads.len());
        for ((param, grad), acc) in params.into_iter().zip(grads.iter()).zip(self.accugrads.iter_mut()) {
            for ((p_row, g_row), a_row) in param.data.iter_mut().zip(grad.data.iter()).zip(acc.data.iter_mut()) {
                for ((p, &g), a) in p_row.iter_mut().zip(g_row.iter()).zip(a_row.iter_mut()) {
                    *a += g * g;
                    *p -= lr / (*a + self.eps).sqrt() * g;
                }
            }
        }
    }
}
