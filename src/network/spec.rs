use serde::{Serialize, Deserialize};
use crate::activation::activation::ActivationFunction;
use crate::error::{Error, Result};
use crate::loss::regularization::Regularization;
use crate::network::metadata::ModelMetadata;

/// One hidden layer: its width and activation. The input width is the
/// previous layer's `size` (or the network's `n_ins` for the first layer).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayerSpec {
    pub size: usize,
    pub activation: ActivationFunction,
}

impl LayerSpec {
    pub fn new(size: usize, activation: ActivationFunction) -> LayerSpec {
        LayerSpec { size, activation }
    }

    pub fn relu(size: usize) -> LayerSpec {
        LayerSpec::new(size, ActivationFunction::ReLU)
    }

    pub fn sigmoid(size: usize) -> LayerSpec {
        LayerSpec::new(size, ActivationFunction::Sigmoid)
    }
}

/// A fully serializable description of a classifier network.
///
/// The output layer is always a softmax `LogisticRegression` over `n_outs`
/// classes; `layers` lists only the hidden layers, so an empty list gives a
/// plain logistic regression.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NetworkSpec {
    /// Number of input features.
    pub n_ins: usize,
    /// Hidden layers, input side first.
    #[serde(default)]
    pub layers: Vec<LayerSpec>,
    /// Number of classes.
    pub n_outs: usize,
    /// Empty for no dropout. Otherwise `layers.len() + 1` rates: the first
    /// applies to the input, the rest to each hidden layer's output.
    #[serde(default)]
    pub dropout_rates: Vec<f64>,
    #[serde(default)]
    pub regularization: Regularization,
    /// Seed for weight initialization and dropout masks.
    #[serde(default = "default_seed")]
    pub seed: u64,
    #[serde(default)]
    pub metadata: Option<ModelMetadata>,
}

fn default_seed() -> u64 {
    42
}

impl NetworkSpec {
    /// Hidden-layer-free spec: a softmax regression from `n_ins` to `n_outs`.
    pub fn new(n_ins: usize, n_outs: usize) -> NetworkSpec {
        NetworkSpec {
            n_ins,
            layers: Vec::new(),
            n_outs,
            dropout_rates: Vec::new(),
            regularization: Regularization::default(),
            seed: default_seed(),
            metadata: None,
        }
    }

    pub fn with_layers(mut self, layers: Vec<LayerSpec>) -> NetworkSpec {
        self.layers = layers;
        self
    }

    pub fn with_dropout(mut self, rates: Vec<f64>) -> NetworkSpec {
        self.dropout_rates = rates;
        self
    }

    pub fn with_regularization(mut self, l1: f64, l2: f64) -> NetworkSpec {
        self.regularization = Regularization::new(l1, l2);
        self
    }

    pub fn with_seed(mut self, seed: u64) -> NetworkSpec {
        self.seed = seed;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.n_ins == 0 {
            return Err(Error::config("n_ins must be > 0"));
        }
        if self.n_outs < 2 {
            return Err(Error::config(format!("n_outs must be >= 2, got {}", self.n_outs)));
        }
        if let Some(i) = self.layers.iter().position(|l| l.size == 0) {
            return Err(Error::config(format!("hidden layer {i} has size 0")));
        }
        if !self.dropout_rates.is_empty() {
            if self.dropout_rates.len() != self.layers.len() + 1 {
                return Err(Error::config(format!(
                    "expected {} dropout rates (input + one per hidden layer), got {}",
                    self.layers.len() + 1,
                    self.dropout_rates.len()
                )));
            }
            if let Some(p) = self.dropout_rates.iter().find(|p| !(p.is_finite() && (0.0..1.0).contains(*p))) {
                return Err(Error::config(format!("dropout rate must be in [0, 1), got {p}")));
            }
        }
        let Regularization { l1, l2 } = self.regularization;
        if !(l1.is_finite() && l1 >= 0.0 && l2.is_finite() && l2 >= 0.0) {
            return Err(Error::config(format!("l1/l2 must be finite and >= 0, got {l1}/{l2}")));
        }
        Ok(())
    }

    /// Serializes the spec to a pretty-printed JSON file.
    pub fn save_json(&self, path: &str) -> Result<()> {
        let file = std::fs::File::create(path)?;
        let writer = std::io::BufWriter::new(file);
        serde_json::to_writer_pretty(writer, self)?;
        Ok(())
    }

    /// Deserializes and validates a `NetworkSpec` from a JSON file.
    pub fn load_json(path: &str) -> Result<NetworkSpec> {
        let file = std::fs::File::open(path)?;
        let reader = std::io::BufReader::new(file);
        let spec: NetworkSpec = serde_json::from_reader(reader)?;
        spec.validate()?;
        Ok(spec)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dropout_rates_must_cover_input_and_hidden_layers() {
        let spec = NetworkSpec::new(4, 2)
            .with_layers(vec![LayerSpec::relu(8)])
            .with_dropout(vec![0.2]);
        assert!(matches!(spec.validate(), Err(Error::InvalidConfig(_))));
        assert!(spec.with_dropout(vec![0.2, 0.5]).validate().is_ok());
    }

    #[test]
    fn rejects_rate_of_one_and_negative_penalties() {
        let spec = NetworkSpec::new(4, 2).with_dropout(vec![1.0]);
        assert!(spec.validate().is_err());
        assert!(NetworkSpec::new(4, 2).with_regularization(-0.1, 0.0).validate().is_err());
        assert!(NetworkSpec::new(4, 1).validate().is_err());
    }

    #[test]
    fn json_defaults_fill_optional_fields() {
        let spec: NetworkSpec = serde_json::from_str(r#"{"n_ins": 3, "n_outs": 2}"#).unwrap();
        assert_eq!(spec.seed, 42);
        assert!(spec.layers.is_empty());
        assert!(spec.dropout_rates.is_empty());
        assert!(!spec.regularization.is_active());
    }
}
