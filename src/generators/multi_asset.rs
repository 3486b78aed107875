use rand::rngs::StdRng;
use rand::SeedableRng;
use rand_distr::{Distribution, StandardNormal};
use serde::{Deserialize, Serialize};

use super::ohlc::{self, VolumeCoupling};
use super::{bar_timestamps, GeneratorConfig, DEFAULT_START_PRICE};
use crate::models::{Frequency, PriceSeries};
use crate::Result;

const DEFAULT_MU: f64 = 0.0001;
const DEFAULT_SIGMA: f64 = 0.01;

/// Joint configuration for N correlated assets.
///
/// `correlation_matrix` must be symmetric positive-definite for the
/// Cholesky factorization; anything else (including a shape mismatch)
/// falls back to the identity matrix, i.e. independent assets.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MultiAssetParams {
    pub num_assets: usize,
    pub asset_names: Vec<String>,
    pub correlation_matrix: Vec<Vec<f64>>,
    pub mus: Vec<f64>,
    pub sigmas: Vec<f64>,
}

impl Default for MultiAssetParams {
    fn default() -> Self {
        Self {
            num_assets: 3,
            asset_names: Vec::new(),
            correlation_matrix: Vec::new(),
            mus: Vec::new(),
            sigmas: Vec::new(),
        }
    }
}

/// Multi-asset generator: N assets follow their own GBM recursions driven
/// by jointly correlated shocks (`correlated = uncorrelated * L^T` where
/// `L*L^T` is the configured correlation matrix).
#[derive(Debug)]
pub struct MultiAssetGenerator {
    length: usize,
    frequency: Frequency,
    asset_names: Vec<String>,
    cholesky: Vec<Vec<f64>>,
    mus: Vec<f64>,
    sigmas: Vec<f64>,
    rng: StdRng,
}

impl MultiAssetGenerator {
    pub fn new(config: &GeneratorConfig) -> Self {
        let params = &config.multi_asset;
        let n = params.num_assets.max(1);

        let asset_names = if params.asset_names.len() == n {
            params.asset_names.clone()
        } else {
            (1..=n).map(|i| format!("Asset_{}", i)).collect()
        };

        let mus = if params.mus.len() == n {
            params.mus.clone()
        } else {
            vec![DEFAULT_MU; n]
        };
        let sigmas = if params.sigmas.len() == n {
            params.sigmas.clone()
        } else {
            vec![DEFAULT_SIGMA; n]
        };

        let correlation = resolve_correlation(&params.correlation_matrix, n);
        let cholesky = match cholesky(&correlation) {
            Some(l) => l,
            None => {
                tracing::warn!(
                    "correlation matrix is not symmetric positive-definite, \
                     falling back to independent assets"
                );
                identity(n)
            }
        };

        Self {
            length: config.length,
            frequency: config.frequency,
            asset_names,
            cholesky,
            mus,
            sigmas,
            rng: StdRng::seed_from_u64(config.seed),
        }
    }

    pub fn generate(&mut self, base: Option<&[PriceSeries]>) -> Result<Vec<PriceSeries>> {
        let n = self.asset_names.len();

        // Per-asset anchors: match base series by symbol.
        let start_prices: Vec<f64> = self
            .asset_names
            .iter()
            .map(|name| {
                base.and_then(|series| series.iter().find(|s| &s.symbol == name))
                    .and_then(|s| s.last_close())
                    .unwrap_or(DEFAULT_START_PRICE)
            })
            .collect();
        let last_ts = base
            .and_then(|series| series.first())
            .and_then(|s| s.last_timestamp());

        // Independent shocks of shape (length x N), correlated through the
        // Cholesky factor: correlated[t][i] = sum_k L[i][k] * z[t][k].
        let raw: Vec<Vec<f64>> = (0..self.length)
            .map(|_| {
                (0..n)
                    .map(|_| StandardNormal.sample(&mut self.rng))
                    .collect()
            })
            .collect();
        let correlated: Vec<Vec<f64>> = raw
            .iter()
            .map(|z| {
                (0..n)
                    .map(|i| (0..=i).map(|k| self.cholesky[i][k] * z[k]).sum())
                    .collect()
            })
            .collect();

        let timestamps = bar_timestamps(last_ts, self.frequency, self.length);

        let mut output = Vec::with_capacity(n);
        for i in 0..n {
            let mu = self.mus[i];
            let sigma = self.sigmas[i];

            let mut closes = Vec::with_capacity(self.length);
            closes.push(start_prices[i]);
            for t in 1..self.length {
                let prev = *closes.last().unwrap();
                closes.push(prev * (mu + sigma * correlated[t][i]).exp());
            }

            let sigmas = vec![sigma; self.length];
            let (opens, highs, lows) = ohlc::synth_open_high_low(&mut self.rng, &closes, &sigmas);
            let volumes = ohlc::synth_volume(&mut self.rng, &closes, VolumeCoupling::NORMAL);

            let bars = ohlc::make_bars(&timestamps, opens, highs, lows, closes, volumes);
            output.push(PriceSeries::new(self.asset_names[i].clone(), bars));
        }

        Ok(output)
    }
}

fn identity(n: usize) -> Vec<Vec<f64>> {
    (0..n)
        .map(|i| (0..n).map(|j| if i == j { 1.0 } else { 0.0 }).collect())
        .collect()
}

/// Use the configured matrix when its shape matches, otherwise warn and
/// substitute the identity. An empty matrix means "not configured" and
/// takes the identity silently.
fn resolve_correlation(matrix: &[Vec<f64>], n: usize) -> Vec<Vec<f64>> {
    if matrix.is_empty() {
        return identity(n);
    }
    if matrix.len() != n || matrix.iter().any(|row| row.len() != n) {
        tracing::warn!(
            "correlation matrix shape does not match {} assets, using identity",
            n
        );
        return identity(n);
    }
    matrix.to_vec()
}

/// Lower-triangular Cholesky factor of a symmetric positive-definite
/// matrix; `None` when the matrix is asymmetric or not positive-definite.
fn cholesky(matrix: &[Vec<f64>]) -> Option<Vec<Vec<f64>>> {
    let n = matrix.len();
    for i in 0..n {
        for j in 0..i {
            if (matrix[i][j] - matrix[j][i]).abs() > 1e-9 {
                return None;
            }
        }
    }

    let mut l = vec![vec![0.0; n]; n];
    for i in 0..n {
        for j in 0..=i {
            let sum: f64 = (0..j).map(|k| l[i][k] * l[j][k]).sum();
            if i == j {
                let diag = matrix[i][i] - sum;
                if diag <= 0.0 {
                    return None;
                }
                l[i][j] = diag.sqrt();
            } else {
                l[i][j] = (matrix[i][j] - sum) / l[j][j];
            }
        }
    }
    Some(l)
}
