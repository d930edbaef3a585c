pub mod error;
pub mod math;
pub mod activation;
pub mod layers;
pub mod loss;
pub mod network;
pub mod optim;
pub mod data;
pub mod train;
pub mod bayes;
pub mod metrics;
pub mod classifier;
pub mod telemetry;

// Convenience re-exports
pub use error::{Error, Result};
pub use math::matrix::Matrix;
pub use activation::activation::ActivationFunction;
pub use network::{LayerSpec, ModelMetadata, NetworkSpec, NeuralNet};
pub use optim::{Method, Optimizer};
pub use data::{Dataset, MiniBatchIterator};
pub use train::{fit, EpochStats, FitConfig, FitReport};
pub use bayes::GaussianNb;
pub use classifier::{Classifier, NeuralClassifier};
