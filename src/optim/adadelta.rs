use crate::math::matrix::Matrix;
use crate::optim::Optimizer;

/// Adadelta (Zeiler 2012, Algorithm 1).
///
///   a <- rho * a + (1 - rho) * g^2
///   dx = -sqrt((d + eps) / (a + eps)) * g
///   d <- rho * d + (1 - rho) * dx^2
///   theta <- theta + dx
///
/// The learning rate passed to `step` is ignored.
#[derive(Debug, Clone)]
pub struct Adadelta {
    pub rho: f64,
    pub eps: f64,
    accugrads: Vec<Matrix>,
    accudeltas: Vec<Matrix>,
}

impl Adadelta {
    pub fn new(shapes: &[(usize, usize)], rho: f64, eps: f64) -> Adadelta {
        let zeros = || -> Vec<Matrix> { shapes.iter().map(|&(r, c)| Matrix::zeros(r, c)).collect() };
        Adadelta {
            rho,
            eps,
            accugrads: zeros(),
            accudeltas: zeros(),
        }
    }

    pub fn accugrads(&self) -> &[Matrix] {
        &self.accugrads
    }

    pub fn accudeltas(&self) -> &[Matrix] {
        &self.accudeltas
    }
}

impl Optimizer for Adadelta {
    fn step(&mut self, params: Vec<&mut Matrix>, grads: &[Matrix], _lr: f64) {
        debug_assert_eq!(params.len(), self.accugrads.len());
        let (rho, eps) = (self.rho, self.eps);
        let state = self.accugrads.iter_mut().zip(self.accudeltas.iter_mut());
        for ((param, grad), (acc_g, acc_d)) in params.into_iter().zip(grads.iter()).zip(state) {
            for (i, p_row) in param.data.iter_mut().enumerate() {
                for (j, p) in p_row.iter_mut().enumerate() {
                    let g = grad.data[i][j];
                    let a = rho * acc_g.data[i][j] + (1.0 - rho) * g * g;
                    let d = acc_d.data[i][j];
                    let dx = -((d + eps) / (a + eps)).sqrt() * g;
                    acc_d.data[i][j] = rho * d + (1.0 - rho) * dx * dx;
                    acc_g.data[i][j] = a;
                    *p += dx;
                }
            }
        }
    }
}
