use rand::Rng;

use crate::data::batches::{Batch, row_batches};
use crate::data::dataset::Dataset;
use crate::layers::LogisticRegression;
use crate::network::network::NeuralNet;
use crate::optim::Optimizer;

/// Runs one pass of mini-batch updates and returns the mean batch cost,
/// or NaN when `batches` yielded nothing.
///
/// Each batch: forward/backward on the training path, then one optimizer
/// step over every parameter.
pub fn train_epoch<R, I>(
    network: &mut NeuralNet,
    optimizer: &mut dyn Optimizer,
    batches: I,
    learning_rate: f64,
    rng: &mut R,
) -> f64
where
    R: Rng + ?Sized,
    I: IntoIterator<Item = Batch>,
{
    let mut total_cost = 0.0;
    let mut n_batches = 0usize;

    for batch in batches {
        let (cost, grads) = network.gradients(&batch.x, &batch.y, rng);
        optimizer.step(network.params_mut(), &grads, learning_rate);
        total_cost += cost;
        n_batches += 1;
    }

    if n_batches == 0 {
        return f64::NAN;
    }
    total_cost / n_batches as f64
}

/// Fraction of `data` the network misclassifies, evaluated in batches
/// without dropout.
pub fn error_rate(network: &NeuralNet, data: &Dataset, batch_size: usize) -> f64 {
    if data.is_empty() {
        return 0.0;
    }
    let mut wrong = 0usize;
    let mut offset = 0usize;
    for x in row_batches(&data.x, batch_size) {
        let labels = &data.y[offset..offset + x.rows];
        wrong += LogisticRegression::count_errors(&network.p_y_given_x(&x), labels);
        offset += x.rows;
    }
    wrong as f64 / data.len() as f64
}
