pub mod gaussian_nb;

pub use gaussian_nb::{GaussianNb, VAR_SMOOTHING};
