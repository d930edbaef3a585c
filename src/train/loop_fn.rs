use std::sync::atomic::Ordering;
use std::time::Instant;

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Serialize, Deserialize};
use tracing::{debug, info, warn};

use crate::data::batches::MiniBatchIterator;
use crate::data::dataset::Dataset;
use crate::data::split::train_test_split;
use crate::error::{Error, Result};
use crate::math::matrix::Matrix;
use crate::network::network::NeuralNet;
use crate::train::epoch_stats::EpochStats;
use crate::train::train_config::FitConfig;
use crate::train::trainer::{error_rate, train_epoch};

/// Seed of the randomized batch sampler.
const SAMPLER_SEED: u64 = 42;

/// Outcome of a `fit` run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FitReport {
    /// Epochs actually completed.
    pub epochs_run: usize,
    /// 1-based epoch whose parameters had the lowest dev error (0 if none).
    pub best_epoch: usize,
    pub best_dev_error: f64,
    /// One entry per completed epoch.
    pub history: Vec<EpochStats>,
}

/// Checks that `data` fits the network's input width and class count.
pub fn check_compatible(network: &NeuralNet, data: &Dataset) -> Result<()> {
    if data.n_features() != network.n_ins() {
        return Err(Error::ShapeMismatch { expected: network.n_ins(), got: data.n_features() });
    }
    if data.n_classes() > network.n_outs() {
        return Err(Error::data(format!(
            "label {} is out of range for {} classes",
            data.n_classes() - 1,
            network.n_outs()
        )));
    }
    Ok(())
}

/// Trains `network` with mini-batch gradient descent and selects parameters
/// by dev-set error.
///
/// When `dev` is `None`, `cfg.split_ratio` of `train` is held out as the dev
/// set. Every epoch the dev error is measured without dropout; a strictly
/// lower value than any before snapshots all parameters. With
/// `cfg.early_stopping` the best snapshot is restored once training ends.
///
/// # Early termination
/// The loop breaks before `cfg.max_epochs` if:
/// - `cfg.stop_flag` is set to `true`,
/// - the `progress_tx` receiver has been dropped,
/// - `cfg.patience` epochs pass without a new best dev error, **or**
/// - the training cost stops being finite.
pub fn fit(
    network: &mut NeuralNet,
    train: &Dataset,
    dev: Option<&Dataset>,
    cfg: &FitConfig,
) -> Result<FitReport> {
    cfg.validate()?;
    check_compatible(network, train)?;

    let split;
    let (train, dev) = match dev {
        Some(dev) => (train, dev),
        None => {
            split = train_test_split(train, cfg.split_ratio, cfg.split_seed)?;
            (&split.0, &split.1)
        }
    };
    check_compatible(network, dev)?;
    if cfg.shuffle_batches && train.len() < cfg.batch_size {
        return Err(Error::config(format!(
            "randomized batches need at least batch_size = {} training samples, got {}",
            cfg.batch_size,
            train.len()
        )));
    }

    let shapes: Vec<(usize, usize)> = network.params().iter().map(|p| p.shape()).collect();
    let mut optimizer = cfg.method.build(&shapes, cfg.rho, cfg.eps)?;
    let mut sampler = if cfg.shuffle_batches {
        MiniBatchIterator::randomized(cfg.batch_size, SAMPLER_SEED)?
    } else {
        MiniBatchIterator::new(cfg.batch_size)?
    };
    let mut dropout_rng = ChaCha8Rng::seed_from_u64(network.seed.wrapping_add(1));

    info!(
        model = %network,
        method = %cfg.method,
        train = train.len(),
        dev = dev.len(),
        max_epochs = cfg.max_epochs,
        "starting training"
    );

    let mut report = FitReport { best_dev_error: f64::INFINITY, ..FitReport::default() };
    let mut best_params: Option<Vec<Matrix>> = None;
    let mut since_best = 0usize;

    for epoch in 1..=cfg.max_epochs {
        if stop_requested(cfg) {
            break;
        }

        let t_start = Instant::now();
        let mean_cost = train_epoch(
            network,
            optimizer.as_mut(),
            sampler.batches(train),
            cfg.learning_rate,
            &mut dropout_rng,
        );
        let elapsed_ms = t_start.elapsed().as_millis() as u64;

        if !mean_cost.is_finite() {
            warn!(epoch, "training cost is not finite; stopping");
            break;
        }

        let train_error = cfg.verbose.then(|| error_rate(network, train, cfg.batch_size));
        let dev_error = error_rate(network, dev, cfg.batch_size);
        let improved = dev_error < report.best_dev_error;

        if cfg.verbose {
            info!(epoch, elapsed_ms, mean_cost, train_error = train_error.unwrap_or_default(), dev_error, "epoch done");
        } else {
            debug!(epoch, elapsed_ms, mean_cost, dev_error, "epoch done");
        }

        if improved {
            report.best_dev_error = dev_error;
            report.best_epoch = epoch;
            best_params = Some(network.snapshot());
            since_best = 0;
            info!(epoch, dev_error, "validation error of best model");
        } else {
            since_best += 1;
        }

        let stats = EpochStats {
            epoch,
            total_epochs: cfg.max_epochs,
            mean_cost,
            train_error,
            dev_error,
            improved,
            elapsed_ms,
        };
        report.history.push(stats.clone());
        report.epochs_run = epoch;

        if let Some(ref tx) = cfg.progress_tx {
            // If the receiver has been dropped, stop training.
            if tx.send(stats).is_err() {
                break;
            }
        }

        if let Some(patience) = cfg.patience {
            if since_best >= patience {
                info!(epoch, patience, "no dev improvement; stopping early");
                break;
            }
        }
    }

    if cfg.early_stopping {
        match best_params {
            Some(best) => network.restore(best)?,
            None => warn!("no epoch completed; keeping current parameters"),
        }
    }

    info!(
        epochs = report.epochs_run,
        best_epoch = report.best_epoch,
        best_dev_error = report.best_dev_error,
        "training finished"
    );
    Ok(report)
}

fn stop_requested(cfg: &FitConfig) -> bool {
    cfg.stop_flag.as_ref().is_some_and(|flag| flag.load(Ordering::Relaxed))
}
