use serde::{Serialize, Deserialize};

/// Per-epoch training statistics emitted by `fit`.
///
/// When a `progress_tx` channel is configured in `FitConfig`, the training
/// loop sends one `EpochStats` value at the end of every completed epoch.
/// The same values are collected in `FitReport::history`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EpochStats {
    /// 1-based epoch number.
    pub epoch: usize,
    /// Epoch budget for this run.
    pub total_epochs: usize,
    /// Mean of the per-batch training costs (dropout path, no penalty).
    pub mean_cost: f64,
    /// Training error rate; only measured when `verbose` is set.
    pub train_error: Option<f64>,
    /// Error rate on the dev set.
    pub dev_error: f64,
    /// Whether this epoch set a new best dev error.
    pub improved: bool,
    /// Wall-clock duration of the training pass in milliseconds.
    pub elapsed_ms: u64,
}
