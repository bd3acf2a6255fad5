//! Small dense-matrix statistics used by the optimizer and performance metrics.

use rand::Rng;
use rand_distr::{Distribution, StandardNormal};

pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Sample standard deviation (n - 1). `None` below two values.
pub fn sample_std(values: &[f64]) -> Option<f64> {
    if values.len() < 2 {
        return None;
    }
    let m = mean(values);
    let var = values.iter().map(|v| (v - m).powi(2)).sum::<f64>() / (values.len() - 1) as f64;
    Some(var.sqrt())
}

/// Sample covariance (n - 1) of two equally long series.
pub fn sample_covariance(a: &[f64], b: &[f64]) -> Option<f64> {
    let n = a.len().min(b.len());
    if n < 2 {
        return None;
    }
    let ma = mean(&a[..n]);
    let mb = mean(&b[..n]);
    let sum: f64 = (0..n).map(|i| (a[i] - ma) * (b[i] - mb)).sum();
    Some(sum / (n - 1) as f64)
}

/// Daily log returns `ln(p_t / p_{t-1})`.
pub fn log_returns(prices: &[f64]) -> Vec<f64> {
    prices.windows(2).map(|w| (w[1] / w[0]).ln()).collect()
}

/// Covariance matrix of per-asset return series.
pub fn covariance_matrix(series: &[Vec<f64>]) -> Vec<Vec<f64>> {
    let n = series.len();
    let mut cov = vec![vec![0.0; n]; n];
    for i in 0..n {
        for j in i..n {
            let c = sample_covariance(&series[i], &series[j]).unwrap_or(0.0);
            cov[i][j] = c;
            cov[j][i] = c;
        }
    }
    cov
}

/// Lower-triangular Cholesky factor.
///
/// Non-positive pivots are replaced by a small epsilon so that a singular
/// covariance (e.g. two perfectly correlated assets) still yields a usable factor.
pub fn cholesky(matrix: &[Vec<f64>]) -> Vec<Vec<f64>> {
    let n = matrix.len();
    let mut l = vec![vec![0.0; n]; n];

    for i in 0..n {
        for j in 0..=i {
            let sum: f64 = (0..j).map(|k| l[i][k] * l[j][k]).sum();

            if i == j {
                let diag = matrix[i][i] - sum;
                l[i][j] = if diag <= 0.0 {
                    diag.abs().max(1e-10).sqrt()
                } else {
                    diag.sqrt()
                };
            } else if l[j][j].abs() < 1e-15 {
                l[i][j] = 0.0;
            } else {
                l[i][j] = (matrix[i][j] - sum) / l[j][j];
            }
        }
    }

    l
}

/// `wᵀ M w`.
pub fn quadratic_form(weights: &[f64], matrix: &[Vec<f64>]) -> f64 {
    let mut total = 0.0;
    for (i, wi) in weights.iter().enumerate() {
        for (j, wj) in weights.iter().enumerate() {
            total += wi * matrix[i][j] * wj;
        }
    }
    total
}

/// Multivariate normal sampler built from a mean vector and covariance.
#[derive(Debug, Clone)]
pub struct MultivariateNormal {
    mean: Vec<f64>,
    factor: Vec<Vec<f64>>,
}

impl MultivariateNormal {
    pub fn new(mean: Vec<f64>, covariance: &[Vec<f64>]) -> Self {
        Self {
            factor: cholesky(covariance),
            mean,
        }
    }

    pub fn dimension(&self) -> usize {
        self.mean.len()
    }

    /// One draw: `mean + L z` with `z` standard normal.
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Vec<f64> {
        let n = self.mean.len();
        let z: Vec<f64> = (0..n).map(|_| StandardNormal.sample(&mut *rng)).collect();
        (0..n)
            .map(|i| self.mean[i] + (0..=i).map(|k| self.factor[i][k] * z[k]).sum::<f64>())
            .collect()
    }
}
