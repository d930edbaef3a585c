//! A common fit/predict surface over the neural network and the Naive
//! Bayes baseline.

use crate::bayes::GaussianNb;
use crate::data::batches::row_batches;
use crate::data::dataset::Dataset;
use crate::error::{Error, Result};
use crate::math::matrix::Matrix;
use crate::metrics;
use crate::network::{NetworkSpec, NeuralNet};
use crate::train::{fit, FitConfig, FitReport};

pub trait Classifier {
    fn fit(&mut self, data: &Dataset) -> Result<()>;

    /// Class probabilities, one row per sample.
    fn predict_proba(&self, x: &Matrix) -> Result<Matrix>;

    fn predict(&self, x: &Matrix) -> Result<Vec<usize>>;

    /// Error rate on `data`.
    fn score(&self, data: &Dataset) -> Result<f64> {
        metrics::error_rate(&data.y, &self.predict(&data.x)?)
    }
}

impl Classifier for GaussianNb {
    fn fit(&mut self, data: &Dataset) -> Result<()> {
        GaussianNb::fit(self, data)
    }

    fn predict_proba(&self, x: &Matrix) -> Result<Matrix> {
        GaussianNb::predict_proba(self, x)
    }

    fn predict(&self, x: &Matrix) -> Result<Vec<usize>> {
        GaussianNb::predict(self, x)
    }
}

/// A `NeuralNet` bundled with the configuration `fit` trains it with.
#[derive(Debug, Clone)]
pub struct NeuralClassifier {
    pub net: NeuralNet,
    pub config: FitConfig,
    report: Option<FitReport>,
}

impl NeuralClassifier {
    pub fn new(spec: &NetworkSpec, config: FitConfig) -> Result<NeuralClassifier> {
        config.validate()?;
        Ok(NeuralClassifier {
            net: NeuralNet::new(spec)?,
            config,
            report: None,
        })
    }

    /// Trains against an explicit dev set instead of splitting one off.
    pub fn fit_with_dev(&mut self, train: &Dataset, dev: &Dataset) -> Result<&FitReport> {
        let report = fit(&mut self.net, train, Some(dev), &self.config)?;
        Ok(self.report.insert(report))
    }

    /// Report of the last `fit`, if any.
    pub fn report(&self) -> Option<&FitReport> {
        self.report.as_ref()
    }

    fn check_width(&self, x: &Matrix) -> Result<()> {
        if x.cols != self.net.n_ins() {
            return Err(Error::ShapeMismatch { expected: self.net.n_ins(), got: x.cols });
        }
        Ok(())
    }
}

impl Classifier for NeuralClassifier {
    fn fit(&mut self, data: &Dataset) -> Result<()> {
        self.report = Some(fit(&mut self.net, data, None, &self.config)?);
        Ok(())
    }

    fn predict_proba(&self, x: &Matrix) -> Result<Matrix> {
        self.check_width(x)?;
        let parts: Vec<Matrix> = row_batches(x, self.config.batch_size)
            .map(|batch| self.net.p_y_given_x(&batch))
            .collect();
        Ok(Matrix::vstack(&parts))
    }

    fn predict(&self, x: &Matrix) -> Result<Vec<usize>> {
        Ok(self.predict_proba(x)?.row_argmax())
    }
}
