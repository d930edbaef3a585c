pub mod dense;
pub mod dropout;
pub mod logistic;

pub use dense::{Dense, DenseGrads};
pub use dropout::Dropout;
pub use logistic::{LogisticRegression, LogisticGrads};
