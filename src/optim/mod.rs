pub mod adadelta;
pub mod adagrad;
pub mod method;
pub mod sgd;

pub use adadelta::Adadelta;
pub use adagrad::Adagrad;
pub use method::Method;
pub use sgd::Sgd;

use crate::math::matrix::Matrix;

/// A gradient-descent update rule with its own per-parameter state.
///
/// `params` and `grads` are parallel lists in the network's `params()` order.
pub trait Optimizer {
    fn step(&mut self, params: Vec<&mut Matrix>, grads: &[Matrix], lr: f64);
}
