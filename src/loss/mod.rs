pub mod nll;
pub mod regularization;

pub use nll::{NllLoss, softmax};
pub use regularization::Regularization;
