use rand::rngs::StdRng;
use rand::SeedableRng;
use rand_distr::{Distribution, StandardNormal};
use serde::{Deserialize, Serialize};

use super::ohlc::{self, VolumeCoupling};
use super::{anchor, bar_timestamps, GeneratorConfig, DEFAULT_SYMBOL};
use crate::models::{Bar, Frequency, PriceSeries};
use crate::Result;

/// GARCH(1,1) coefficients.
///
/// `alpha + beta < 1` is the stability condition; violating it is not
/// rejected, but the conditional variance then grows without bound and
/// the generated path is explosive.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct GarchParams {
    pub omega: f64,
    pub alpha: f64,
    pub beta: f64,
}

impl Default for GarchParams {
    fn default() -> Self {
        Self {
            omega: 0.00001,
            alpha: 0.1,
            beta: 0.8,
        }
    }
}

/// GARCH(1,1) generator reproducing volatility clustering.
///
/// Conditional variance recursion `h[t] = omega + alpha*r[t-1]^2 +
/// beta*h[t-1]^2` with return `r[t] = sqrt(h[t-1]) * Z`; the price
/// compounds through `price[t] = price[t-1] * exp(r[t])`. The initial
/// variance is the unconditional long-run level `omega/(1-alpha-beta)`
/// when the process is stable, `sqrt(omega)` otherwise.
///
/// Bars are flat (open = high = low = close): this model produces no
/// intrabar noise, so callers needing realistic bars must layer OHLC
/// synthesis on top themselves.
#[derive(Debug)]
pub struct GarchGenerator {
    length: usize,
    frequency: Frequency,
    params: GarchParams,
    rng: StdRng,
}

impl GarchGenerator {
    pub fn new(config: &GeneratorConfig) -> Self {
        Self {
            length: config.length,
            frequency: config.frequency,
            params: config.garch,
            rng: StdRng::seed_from_u64(config.seed),
        }
    }

    fn initial_variance(&self) -> f64 {
        let GarchParams { omega, alpha, beta } = self.params;
        if alpha + beta < 1.0 {
            omega / (1.0 - alpha - beta)
        } else {
            omega.sqrt()
        }
    }

    pub fn generate(&mut self, base: Option<&[PriceSeries]>) -> Result<Vec<PriceSeries>> {
        let (start_price, last_ts) = anchor(base);
        let GarchParams { omega, alpha, beta } = self.params;

        let mut closes = Vec::with_capacity(self.length);
        closes.push(start_price);

        let mut variance = self.initial_variance();
        for _ in 1..self.length {
            let z: f64 = StandardNormal.sample(&mut self.rng);
            let ret = variance.sqrt() * z;
            let prev = *closes.last().unwrap();
            closes.push(prev * ret.exp());
            variance = omega + alpha * ret * ret + beta * variance * variance;
        }

        let timestamps = bar_timestamps(last_ts, self.frequency, self.length);
        let volumes = ohlc::synth_volume(&mut self.rng, &closes, VolumeCoupling::NORMAL);

        let bars: Vec<Bar> = timestamps
            .iter()
            .zip(closes)
            .zip(volumes)
            .map(|((ts, close), volume)| Bar {
                timestamp: *ts,
                open: close,
                high: close,
                low: close,
                close,
                volume,
            })
            .collect();

        Ok(vec![PriceSeries::new(DEFAULT_SYMBOL, bars)])
    }
}
