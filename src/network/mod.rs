pub mod metadata;
pub mod network;
pub mod spec;

pub use metadata::ModelMetadata;
pub use network::NeuralNet;
pub use spec::{NetworkSpec, LayerSpec};
