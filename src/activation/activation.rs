use serde::{Serialize, Deserialize};
use std::f64::consts::E;

/// Element-wise activation of a hidden layer. The softmax output is not an
/// activation here; it belongs to `LogisticRegression`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ActivationFunction {
    /// Plain affine layer, `W.X + b`.
    Identity,
    Sigmoid,
    ReLU,
}

impl ActivationFunction {
    pub fn function(&self, x: f64) -> f64 {
        match self {
            ActivationFunction::Identity => x,
            ActivationFunction::Sigmoid => 1.0 / (1.0 + E.powf(-x)),
            ActivationFunction::ReLU => (x + x.abs()) / 2.0,
        }
    }

    /// Derivative evaluated at the pre-activation `x`. ReLU's is 0 at 0.
    pub fn derivative(&self, x: f64) -> f64 {
        match self {
            ActivationFunction::Identity => 1.0,
            ActivationFunction::Sigmoid => {
                let fx = self.function(x);
                fx * (1.0 - fx)
            },
            ActivationFunction::ReLU => if x > 0.0 { 1.0 } else { 0.0 },
        }
    }

    /// Layer name used in network descriptions.
    pub fn name(&self) -> &'static str {
        match self {
            ActivationFunction::Identity => "Linear",
            ActivationFunction::Sigmoid => "SigmoidLayer",
            ActivationFunction::ReLU => "ReLU",
        }
    }
}
