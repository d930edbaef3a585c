/// All errors surfaced by the public API.
///
/// Matrix arithmetic itself still panics on mismatched shapes; every public
/// entry point validates its inputs first and reports problems through this
/// type instead.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The data handed to a constructor or `fit` is unusable.
    #[error("invalid data: {0}")]
    InvalidData(String),

    /// A hyperparameter or architecture value is out of range.
    #[error("invalid config: {0}")]
    InvalidConfig(String),

    /// Feature width or class count does not match the model.
    #[error("shape mismatch: expected {expected}, got {got}")]
    ShapeMismatch { expected: usize, got: usize },

    /// `predict` was called before `fit`.
    #[error("model has not been fitted")]
    NotFitted,

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl Error {
    pub fn data(msg: impl Into<String>) -> Self {
        Error::InvalidData(msg.into())
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Error::InvalidConfig(msg.into())
    }
}

pub type Result<T> = std::result::Result<T, Error>;
