use rand::Rng;
use serde::{Serialize, Deserialize};

use crate::{math::matrix::Matrix, activation::activation::ActivationFunction};

/// Hidden layer computing `act((X.W + b) * scale)` over a mini-batch.
///
/// `scale` is 1 everywhere except on the training path of a dropout net,
/// where it is `1 / (1 - p)` for the layer's output dropout rate `p`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Dense {
    pub weights: Matrix,
    pub biases: Matrix,
    pub activator: ActivationFunction,
}

/// Parameter gradients of one `Dense` layer plus the error sent to its input.
#[derive(Debug, Clone)]
pub struct DenseGrads {
    pub d_weights: Matrix,
    pub d_biases: Matrix,
    pub d_input: Matrix,
}

impl Dense {
    pub fn new<R: Rng + ?Sized>(
        n_in: usize,
        n_out: usize,
        activation: ActivationFunction,
        rng: &mut R,
    ) -> Dense {
        Dense {
            weights: Matrix::glorot_uniform(n_in, n_out, rng),
            biases: Matrix::zeros(1, n_out),
            activator: activation,
        }
    }

    pub fn n_in(&self) -> usize {
        self.weights.rows
    }

    pub fn n_out(&self) -> usize {
        self.weights.cols
    }

    /// Returns `(z, a)`: the scaled pre-activation and the activation.
    /// `z` is kept by the caller for the backward pass.
    pub fn forward(&self, input: &Matrix, scale: f64) -> (Matrix, Matrix) {
        let mut z = input.matmul(&self.weights).add_row(&self.biases);
        if scale != 1.0 {
            z = z.scale(scale);
        }
        let a = z.map(|x| self.activator.function(x));
        (z, a)
    }

    /// `d_output` is dL/da for this layer's activation.
    pub fn backward(&self, input: &Matrix, z: &Matrix, d_output: &Matrix, scale: f64) -> DenseGrads {
        // dL/d(X.W + b) = d_output * act'(z) * scale
        let delta = d_output
            .zip_map(z, |d, zv| d * self.activator.derivative(zv))
            .scale(scale);

        DenseGrads {
            d_weights: input.transpose().matmul(&delta),
            d_biases: delta.sum_rows(),
            d_input: delta.matmul(&self.weights.transpose()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn layer(activation: ActivationFunction) -> Dense {
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        Dense::new(3, 2, activation, &mut rng)
    }

    #[test]
    fn forward_shapes_follow_batch() {
        let l = layer(ActivationFunction::ReLU);
        let x = Matrix::filled(5, 3, 0.3);
        let (z, a) = l.forward(&x, 1.0);
        assert_eq!(z.shape(), (5, 2));
        assert_eq!(a.shape(), (5, 2));
        assert!(a.data.iter().flatten().all(|&v| v >= 0.0));
        assert_eq!(l.biases.sum_abs(), 0.0);
    }

    #[test]
    fn weight_gradient_matches_finite_difference() {
        let mut l = layer(ActivationFunction::Sigmoid);
        let x = Matrix::from_data(vec![vec![0.2, -0.4, 0.9], vec![-1.0, 0.5, 0.1]]);
        let scale = 1.25;
        // L = sum(a)
        let loss = |l: &Dense| l.forward(&x, scale).1.sum();

        let (z, a) = l.forward(&x, scale);
        let grads = l.backward(&x, &z, &Matrix::filled(a.rows, a.cols, 1.0), scale);

        let h = 1e-6;
        for (i, j) in [(0, 0), (1, 1), (2, 0)] {
            let orig = l.weights.data[i][j];
            l.weights.data[i][j] = orig + h;
            let up = loss(&l);
            l.weights.data[i][j] = orig - h;
            let down = loss(&l);
            l.weights.data[i][j] = orig;
            let numeric = (up - down) / (2.0 * h);
            assert!((numeric - grads.d_weights.data[i][j]).abs() < 1e-6);
        }
        assert_eq!(grads.d_input.shape(), (2, 3));
    }
}
