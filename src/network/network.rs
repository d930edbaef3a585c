use std::fmt;

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Serialize, Deserialize};
use tracing::warn;

use crate::error::{Error, Result};
use crate::layers::{Dense, Dropout, LogisticRegression};
use crate::loss::nll::NllLoss;
use crate::loss::regularization::Regularization;
use crate::math::matrix::Matrix;
use crate::network::metadata::ModelMetadata;
use crate::network::spec::NetworkSpec;

/// Feed-forward classifier: dense hidden layers followed by a softmax
/// `LogisticRegression` output layer.
///
/// Evaluation always uses the deterministic path. The training path applies
/// dropout (when rates are configured) and the L1/L2 penalties.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NeuralNet {
    pub hidden: Vec<Dense>,
    pub output: LogisticRegression,
    #[serde(default)]
    pub dropout_rates: Vec<f64>,
    #[serde(default)]
    pub regularization: Regularization,
    pub seed: u64,
    #[serde(default)]
    pub metadata: Option<ModelMetadata>,
}

/// Per-layer intermediates of one training forward pass.
struct HiddenTrace {
    input: Matrix,
    z: Matrix,
    mask: Option<Matrix>,
    scale: f64,
}

impl NeuralNet {
    pub fn new(spec: &NetworkSpec) -> Result<NeuralNet> {
        spec.validate()?;
        let mut rng = ChaCha8Rng::seed_from_u64(spec.seed);

        let ins = std::iter::once(spec.n_ins).chain(spec.layers.iter().map(|l| l.size));
        let hidden: Vec<Dense> = spec.layers.iter().zip(ins)
            .map(|(layer, n_in)| Dense::new(n_in, layer.size, layer.activation, &mut rng))
            .collect();
        let last_width = spec.layers.last().map_or(spec.n_ins, |l| l.size);

        if !spec.dropout_rates.is_empty() && spec.dropout_rates.iter().all(|&p| p == 0.0) {
            warn!("all dropout rates are 0; the network trains without dropout");
        }

        Ok(NeuralNet {
            hidden,
            output: LogisticRegression::new(last_width, spec.n_outs),
            dropout_rates: spec.dropout_rates.clone(),
            regularization: spec.regularization,
            seed: spec.seed,
            metadata: spec.metadata.clone(),
        })
    }

    pub fn n_ins(&self) -> usize {
        self.hidden.first().map_or(self.output.n_in(), |l| l.n_in())
    }

    pub fn n_outs(&self) -> usize {
        self.output.n_out()
    }

    pub fn has_dropout(&self) -> bool {
        self.dropout_rates.iter().any(|&p| Dropout::is_active(p))
    }

    fn rate(&self, idx: usize) -> f64 {
        self.dropout_rates.get(idx).copied().unwrap_or(0.0)
    }

    /// Class probabilities for every row of `x`, without dropout.
    pub fn p_y_given_x(&self, x: &Matrix) -> Matrix {
        let mut current = x.clone();
        for layer in &self.hidden {
            current = layer.forward(&current, 1.0).1;
        }
        self.output.p_y_given_x(&current)
    }

    pub fn y_pred(&self, x: &Matrix) -> Vec<usize> {
        self.p_y_given_x(x).row_argmax()
    }

    /// Fraction of misclassified rows on the evaluation path.
    pub fn errors(&self, x: &Matrix, labels: &[usize]) -> f64 {
        LogisticRegression::errors(&self.p_y_given_x(x), labels)
    }

    /// Mean negative log-likelihood on the evaluation path.
    pub fn mean_cost(&self, x: &Matrix, labels: &[usize]) -> f64 {
        NllLoss::loss(&self.p_y_given_x(x), labels)
    }

    /// Training cost: mean NLL of the evaluation path plus the L1/L2 penalty.
    pub fn training_cost(&self, x: &Matrix, labels: &[usize]) -> f64 {
        self.mean_cost(x, labels) + self.regularization.penalty(self.params())
    }

    /// Parameters in order `[W0, b0, W1, b1, ..., W_out, b_out]`.
    pub fn params(&self) -> Vec<&Matrix> {
        let mut params: Vec<&Matrix> = Vec::with_capacity(2 * (self.hidden.len() + 1));
        for layer in &self.hidden {
            params.push(&layer.weights);
            params.push(&layer.biases);
        }
        params.push(&self.output.weights);
        params.push(&self.output.biases);
        params
    }

    pub fn params_mut(&mut self) -> Vec<&mut Matrix> {
        let mut params: Vec<&mut Matrix> = Vec::with_capacity(2 * (self.hidden.len() + 1));
        for layer in self.hidden.iter_mut() {
            params.push(&mut layer.weights);
            params.push(&mut layer.biases);
        }
        params.push(&mut self.output.weights);
        params.push(&mut self.output.biases);
        params
    }

    /// Owned copy of every parameter, for snapshots.
    pub fn snapshot(&self) -> Vec<Matrix> {
        self.params().into_iter().cloned().collect()
    }

    /// Overwrites every parameter from a `snapshot()` of this network.
    pub fn restore(&mut self, snapshot: Vec<Matrix>) -> Result<()> {
        let mut params = self.params_mut();
        if params.len() != snapshot.len() {
            return Err(Error::ShapeMismatch { expected: params.len(), got: snapshot.len() });
        }
        if let Some((i, _)) = params.iter().zip(snapshot.iter())
            .enumerate()
            .find(|(_, (p, s))| p.shape() != s.shape())
        {
            return Err(Error::data(format!("snapshot parameter {i} has the wrong shape")));
        }
        for (param, saved) in params.iter_mut().zip(snapshot) {
            **param = saved;
        }
        Ok(())
    }

    /// One training forward/backward pass over a mini-batch.
    ///
    /// Returns the mean NLL of the training path (with dropout) and the
    /// gradient of the regularized cost for every parameter, in `params()`
    /// order.
    pub fn gradients<R: Rng + ?Sized>(
        &self,
        x: &Matrix,
        labels: &[usize],
        rng: &mut R,
    ) -> (f64, Vec<Matrix>) {
        let dropout = self.has_dropout();

        // The input is masked only; the 1 / (1 - p) scale belongs to the
        // layers whose outputs are dropped.
        let mut current = if dropout && Dropout::is_active(self.rate(0)) {
            let p = self.rate(0);
            x.hadamard(&Dropout::mask(x.rows, x.cols, p, rng))
        } else {
            x.clone()
        };

        let mut traces: Vec<HiddenTrace> = Vec::with_capacity(self.hidden.len());
        for (i, layer) in self.hidden.iter().enumerate() {
            // A dropped layer's pre-activation is scaled by 1 / (1 - p).
            let p = if dropout { self.rate(i + 1) } else { 0.0 };
            let scale = Dropout::keep_scale(p);
            let (z, a) = layer.forward(&current, scale);
            let (out, mask) = if Dropout::is_active(p) {
                let mask = Dropout::mask(a.rows, a.cols, p, rng);
                (a.hadamard(&mask), Some(mask))
            } else {
                (a, None)
            };
            traces.push(HiddenTrace { input: current, z, mask, scale });
            current = out;
        }

        let proba = self.output.p_y_given_x(&current);
        let cost = NllLoss::loss(&proba, labels);
        let out_grads = self.output.backward(&current, &proba, labels);

        let mut grads: Vec<Matrix> = Vec::with_capacity(2 * (self.hidden.len() + 1));
        grads.push(out_grads.d_biases);
        grads.push(out_grads.d_weights);

        let mut delta = out_grads.d_input;
        for (layer, trace) in self.hidden.iter().zip(traces.iter()).rev() {
            let d_a = match &trace.mask {
                Some(mask) => delta.hadamard(mask),
                None => delta,
            };
            let g = layer.backward(&trace.input, &trace.z, &d_a, trace.scale);
            grads.push(g.d_biases);
            grads.push(g.d_weights);
            delta = g.d_input;
        }
        // Built output-first with biases before weights; reversing yields params() order.
        grads.reverse();

        if self.regularization.is_active() {
            for (param, grad) in self.params().into_iter().zip(grads.iter_mut()) {
                self.regularization.accumulate(param, grad);
            }
        }

        (cost, grads)
    }

    /// Serializes the network to a pretty-printed JSON file.
    pub fn save_json(&self, path: &str) -> Result<()> {
        let file = std::fs::File::create(path)?;
        let writer = std::io::BufWriter::new(file);
        serde_json::to_writer_pretty(writer, self)?;
        Ok(())
    }

    /// Deserializes a network from a JSON file previously written by `save_json`.
    pub fn load_json(path: &str) -> Result<NeuralNet> {
        let file = std::fs::File::open(path)?;
        let reader = std::io::BufReader::new(file);
        Ok(serde_json::from_reader(reader)?)
    }
}

/// `ReLU_10x100_ReLU_100x100_LogisticRegression_100x2`, followed by a line
/// with the dropout rates when dropout is configured.
impl fmt::Display for NeuralNet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut parts: Vec<String> = self.hidden.iter()
            .map(|l| format!("{}_{}x{}", l.activator.name(), l.n_in(), l.n_out()))
            .collect();
        parts.push(format!("LogisticRegression_{}x{}", self.output.n_in(), self.output.n_out()));
        write!(f, "{}", parts.join("_"))?;
        if !self.dropout_rates.is_empty() {
            write!(f, "\ndropout rates: {:?}", self.dropout_rates)?;
        }
        Ok(())
    }
}
