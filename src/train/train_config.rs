use std::sync::mpsc;
use std::sync::{Arc, atomic::AtomicBool};

use serde::{Serialize, Deserialize};

use crate::data::batches::BATCH_SIZE;
use crate::error::{Error, Result};
use crate::optim::Method;
use crate::train::epoch_stats::EpochStats;

/// Default learning rate for SGD and Adagrad.
pub const INIT_LR: f64 = 0.01;

/// Hyperparameters for a `fit` run.
///
/// # Fields
/// - `max_epochs`      — upper bound on full passes over the training data
/// - `batch_size`      — samples per mini-batch
/// - `method`          — update rule (`sgd`, `adagrad`, `adadelta`)
/// - `learning_rate`   — step size for `sgd` and `adagrad`; ignored by `adadelta`
/// - `rho`, `eps`      — Adadelta decay and the epsilon shared by Adagrad/Adadelta
/// - `early_stopping`  — restore the parameters with the lowest dev error at the end
/// - `patience`        — stop after this many epochs without dev improvement
/// - `split_ratio`     — dev fraction carved out of the training set when no dev set is given
/// - `split_seed`      — seed for that split
/// - `shuffle_batches` — draw random batch slots instead of walking them in order;
///                     needs at least `batch_size` training samples
/// - `verbose`         — also measure the training error each epoch and log at INFO
/// - `progress_tx`     — optional channel; one `EpochStats` per completed epoch.
///                       If the receiver is dropped the loop terminates early.
/// - `stop_flag`       — optional atomic flag; when set from another thread the
///                       loop terminates after the current epoch.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FitConfig {
    pub max_epochs: usize,
    pub batch_size: usize,
    pub method: Method,
    pub learning_rate: f64,
    pub rho: f64,
    pub eps: f64,
    pub early_stopping: bool,
    pub patience: Option<usize>,
    pub split_ratio: f64,
    pub split_seed: u64,
    pub shuffle_batches: bool,
    pub verbose: bool,
    #[serde(skip)]
    pub progress_tx: Option<mpsc::Sender<EpochStats>>,
    #[serde(skip)]
    pub stop_flag: Option<Arc<AtomicBool>>,
}

impl Default for FitConfig {
    fn default() -> Self {
        FitConfig {
            max_epochs: 20,
            batch_size: BATCH_SIZE,
            method: Method::Adadelta,
            learning_rate: INIT_LR,
            rho: 0.95,
            eps: 1e-6,
            early_stopping: true,
            patience: None,
            split_ratio: 0.1,
            split_seed: 42,
            shuffle_batches: false,
            verbose: false,
            progress_tx: None,
            stop_flag: None,
        }
    }
}

impl FitConfig {
    /// Default configuration with the given epoch budget and update rule.
    pub fn new(max_epochs: usize, method: Method) -> Self {
        FitConfig {
            max_epochs,
            method,
            ..FitConfig::default()
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.max_epochs == 0 {
            return Err(Error::config("max_epochs must be > 0"));
        }
        if self.batch_size == 0 {
            return Err(Error::config("batch_size must be at least 1"));
        }
        if self.method.uses_learning_rate() && !(self.learning_rate.is_finite() && self.learning_rate > 0.0) {
            return Err(Error::config(format!(
                "learning_rate must be finite and > 0, got {}",
                self.learning_rate
            )));
        }
        if !(self.split_ratio > 0.0 && self.split_ratio < 1.0) {
            return Err(Error::config(format!("split_ratio must be in (0, 1), got {}", self.split_ratio)));
        }
        if self.patience == Some(0) {
            return Err(Error::config("patience must be at least 1 epoch"));
        }
        Ok(())
    }

    /// Reads a config from JSON; missing fields take their defaults.
    pub fn load_json(path: &str) -> Result<FitConfig> {
        let file = std::fs::File::open(path)?;
        let reader = std::io::BufReader::new(file);
        let cfg: FitConfig = serde_json::from_reader(reader)?;
        cfg.validate()?;
        Ok(cfg)
    }
}
