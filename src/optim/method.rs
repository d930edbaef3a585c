use std::fmt;
use std::str::FromStr;

use serde::{Serialize, Deserialize};

use crate::error::{Error, Result};
use crate::optim::{Adadelta, Adagrad, Optimizer, Sgd};

/// Which update rule `fit` trains with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Method {
    Sgd,
    Adagrad,
    #[default]
    Adadelta,
}

impl Method {
    /// Whether the rule consumes the learning rate (Adadelta does not).
    pub fn uses_learning_rate(self) -> bool {
        !matches!(self, Method::Adadelta)
    }

    /// Allocates the optimizer with fresh state for parameters of `shapes`.
    pub fn build(self, shapes: &[(usize, usize)], rho: f64, eps: f64) -> Result<Box<dyn Optimizer>> {
        if !(eps.is_finite() && eps > 0.0) {
            return Err(Error::config(format!("eps must be finite and > 0, got {eps}")));
        }
        Ok(match self {
            Method::Sgd => Box::new(Sgd::new()),
            Method::Adagrad => Box::new(Adagrad::new(shapes, eps)),
            Method::Adadelta => {
                if !(rho.is_finite() && (0.0..1.0).contains(&rho)) {
                    return Err(Error::config(format!("rho must be in [0, 1), got {rho}")));
                }
                Box::new(Adadelta::new(shapes, rho, eps))
            }
        })
    }
}

impl FromStr for Method {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sgd" => Ok(Method::Sgd),
            "adagrad" => Ok(Method::Adagrad),
            "adadelta" => Ok(Method::Adadelta),
            other => Err(Error::config(format!("unknown training method '{other}'"))),
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Method::Sgd => "sgd",
            Method::Adagrad => "adagrad",
            Method::Adadelta => "adadelta",
        };
        f.write_str(name)
    }
}
