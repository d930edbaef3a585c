use rand::Rng;

use crate::math::matrix::Matrix;

/// Bernoulli keep masks for dropout.
///
/// A rate `p` strictly inside (0, 1) zeroes each entry with probability `p`.
/// Any other rate (0, or a degenerate value that validation would reject)
/// keeps every entry.
pub struct Dropout;

impl Dropout {
    pub fn is_active(p: f64) -> bool {
        p > 0.0 && p < 1.0
    }

    /// 0/1 mask of shape (rows, cols); ones are kept with probability `1 - p`.
    pub fn mask<R: Rng + ?Sized>(rows: usize, cols: usize, p: f64, rng: &mut R) -> Matrix {
        if !Self::is_active(p) {
            return Matrix::filled(rows, cols, 1.0);
        }
        let mut mask = Matrix::zeros(rows, cols);
        for row in mask.data.iter_mut() {
            for x in row.iter_mut() {
                if rng.gen::<f64>() >= p {
                    *x = 1.0;
                }
            }
        }
        mask
    }

    /// Scale applied to kept units so the expected value matches evaluation.
    pub fn keep_scale(p: f64) -> f64 {
        if Self::is_active(p) { 1.0 / (1.0 - p) } else { 1.0 }
    }
}
