use crate::math::matrix::Matrix;

/// Negative log-likelihood of integer class labels under row-wise class
/// probabilities (the output of a softmax layer).
pub struct NllLoss;

/// Keeps `ln` finite when a probability underflows to zero.
const EPS: f64 = 1e-12;

impl NllLoss {
    /// -sum_i log p[i, y_i]
    pub fn loss_sum(proba: &Matrix, labels: &[usize]) -> f64 {
        proba.data.iter().zip(labels.iter())
            .map(|(row, &y)| -(row[y] + EPS).ln())
            .sum()
    }

    /// -mean_i log p[i, y_i]
    pub fn loss(proba: &Matrix, labels: &[usize]) -> f64 {
        if labels.is_empty() {
            return 0.0;
        }
        Self::loss_sum(proba, labels) / labels.len() as f64
    }

    /// Gradient of the mean loss w.r.t. the pre-softmax logits:
    /// (p - onehot(y)) / batch_size.
    pub fn derivative(proba: &Matrix, labels: &[usize]) -> Matrix {
        let inv_n = 1.0 / labels.len().max(1) as f64;
        let data = proba.data.iter().zip(labels.iter())
            .map(|(row, &y)| {
                row.iter().enumerate()
                    .map(|(j, &p)| (p - if j == y { 1.0 } else { 0.0 }) * inv_n)
                    .collect()
            })
            .collect();
        Matrix { rows: proba.rows, cols: proba.cols, data }
    }
}

/// Row-wise softmax, shifted by each row's max for stability.
pub fn softmax(logits: &Matrix) -> Matrix {
    let data = logits.data.iter()
        .map(|row| {
            let max = row.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
            let exps: Vec<f64> = row.iter().map(|x| (x - max).exp()).collect();
            let total: f64 = exps.iter().sum();
            exps.into_iter().map(|e| e / total).collect()
        })
        .collect();
    Matrix { rows: logits.rows, cols: logits.cols, data }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn softmax_rows_sum_to_one_even_for_large_logits() {
        let p = softmax(&Matrix::from_data(vec![vec![1000.0, 1001.0], vec![0.0, 0.0]]));
        for row in &p.data {
            assert!((row.iter().sum::<f64>() - 1.0).abs() < 1e-12);
        }
        assert!((p.data[1][0] - 0.5).abs() < 1e-12);
        assert!(p.data[0][1] > p.data[0][0]);
    }

    #[test]
    fn uniform_prediction_costs_ln_k() {
        let p = Matrix::filled(4, 2, 0.5);
        let labels = [0, 1, 1, 0];
        assert!((NllLoss::loss(&p, &labels) - 2f64.ln()).abs() < 1e-9);
        assert!((NllLoss::loss_sum(&p, &labels) - 4.0 * 2f64.ln()).abs() < 1e-9);
    }

    #[test]
    fn derivative_rows_sum_to_zero() {
        let p = Matrix::from_data(vec![vec![0.2, 0.3, 0.5]]);
        let d = NllLoss::derivative(&p, &[2]);
        assert!((d.data[0][2] + 0.5).abs() < 1e-12);
        assert!(d.sum().abs() < 1e-12);
    }
}
