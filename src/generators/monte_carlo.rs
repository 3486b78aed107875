use rand::rngs::StdRng;
use rand::SeedableRng;
use rand_distr::{Distribution, StandardNormal};
use serde::{Deserialize, Serialize};

use super::ohlc::{self, VolumeCoupling};
use super::{anchor, bar_timestamps, GeneratorConfig, DEFAULT_SYMBOL};
use crate::models::{Frequency, PriceSeries};
use crate::Result;

/// Drift and volatility of the geometric Brownian motion, per bar.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct MonteCarloParams {
    pub mu: f64,
    pub sigma: f64,
}

impl Default for MonteCarloParams {
    fn default() -> Self {
        Self {
            mu: 0.0001,
            sigma: 0.01,
        }
    }
}

/// Monte Carlo generator: log-prices follow discrete geometric Brownian
/// motion, `price[t] = price[t-1] * exp(mu*dt + sigma*sqrt(dt)*Z)` with
/// `dt = 1` bar.
///
/// With `sigma = 0` the path is fully deterministic:
/// `close[t] = start * exp(mu * t)`.
#[derive(Debug)]
pub struct MonteCarloGenerator {
    length: usize,
    frequency: Frequency,
    params: MonteCarloParams,
    rng: StdRng,
}

impl MonteCarloGenerator {
    pub fn new(config: &GeneratorConfig) -> Self {
        Self {
            length: config.length,
            frequency: config.frequency,
            params: config.monte_carlo,
            rng: StdRng::seed_from_u64(config.seed),
        }
    }

    pub fn generate(&mut self, base: Option<&[PriceSeries]>) -> Result<Vec<PriceSeries>> {
        let (start_price, last_ts) = anchor(base);

        let mut closes = Vec::with_capacity(self.length);
        closes.push(start_price);
        for _ in 1..self.length {
            let z: f64 = StandardNormal.sample(&mut self.rng);
            let shock = self.params.sigma * z;
            let prev = *closes.last().unwrap();
            closes.push(prev * (self.params.mu + shock).exp());
        }

        let timestamps = bar_timestamps(last_ts, self.frequency, self.length);
        let sigmas = vec![self.params.sigma; self.length];
        let (opens, highs, lows) = ohlc::synth_open_high_low(&mut self.rng, &closes, &sigmas);
        let volumes = ohlc::synth_volume(&mut self.rng, &closes, VolumeCoupling::NORMAL);

        let bars = ohlc::make_bars(&timestamps, opens, highs, lows, closes, volumes);
        Ok(vec![PriceSeries::new(DEFAULT_SYMBOL, bars)])
    }
}
