//! Evaluation metrics for class predictions and scores.

use crate::error::{Error, Result};
use crate::math::matrix::Matrix;

fn check_lengths(a: usize, b: usize) -> Result<()> {
    if a != b {
        return Err(Error::ShapeMismatch { expected: a, got: b });
    }
    if a == 0 {
        return Err(Error::data("cannot score an empty prediction set"));
    }
    Ok(())
}

/// Fraction of predictions that differ from the truth.
pub fn error_rate(truth: &[usize], predicted: &[usize]) -> Result<f64> {
    check_lengths(truth.len(), predicted.len())?;
    let wrong = truth.iter().zip(predicted.iter()).filter(|(t, p)| t != p).count();
    Ok(wrong as f64 / truth.len() as f64)
}

pub fn accuracy(truth: &[usize], predicted: &[usize]) -> Result<f64> {
    Ok(1.0 - error_rate(truth, predicted)?)
}

/// Column `class` of a probability matrix.
pub fn positive_scores(proba: &Matrix, class: usize) -> Result<Vec<f64>> {
    if class >= proba.cols {
        return Err(Error::ShapeMismatch { expected: proba.cols, got: class + 1 });
    }
    Ok(proba.data.iter().map(|row| row[class]).collect())
}

/// Area under the ROC curve for binary labels (1 = positive, 0 = negative).
///
/// Computed as the Mann-Whitney rank statistic; tied scores share their
/// average rank.
pub fn roc_auc(truth: &[usize], scores: &[f64]) -> Result<f64> {
    check_lengths(truth.len(), scores.len())?;
    if let Some(bad) = truth.iter().find(|&&t| t > 1) {
        return Err(Error::data(format!("roc_auc expects 0/1 labels, found {bad}")));
    }
    if scores.iter().any(|s| s.is_nan()) {
        return Err(Error::data("scores must not be NaN"));
    }
    let n_pos = truth.iter().filter(|&&t| t == 1).count();
    let n_neg = truth.len() - n_pos;
    if n_pos == 0 || n_neg == 0 {
        return Err(Error::data("roc_auc is undefined when only one class is present"));
    }

    let mut order: Vec<usize> = (0..scores.len()).collect();
    order.sort_by(|&a, &b| scores[a].total_cmp(&scores[b]));

    let mut rank_sum_pos = 0.0;
    let mut i = 0;
    while i < order.len() {
        let mut j = i;
        while j + 1 < order.len() && scores[order[j + 1]] == scores[order[i]] {
            j += 1;
        }
        // 1-based ranks i+1 ..= j+1 share their mean.
        let avg_rank = (i + j + 2) as f64 / 2.0;
        rank_sum_pos += order[i..=j].iter().filter(|&&k| truth[k] == 1).count() as f64 * avg_rank;
        i = j + 1;
    }

    let n_pos_f = n_pos as f64;
    Ok((rank_sum_pos - n_pos_f * (n_pos_f + 1.0) / 2.0) / (n_pos_f * n_neg as f64))
}
