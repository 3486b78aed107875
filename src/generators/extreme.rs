use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::{Distribution, StandardNormal};
use serde::{Deserialize, Serialize};

use super::ohlc::{self, VolumeCoupling, MIN_PRICE};
use super::{anchor, bar_timestamps, GeneratorConfig, DEFAULT_SYMBOL};
use crate::models::{Frequency, PriceSeries};
use crate::Result;

/// Shock probabilities and magnitudes layered on the base walk.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtremeParams {
    pub crash_probability: f64,
    pub crash_intensity: f64,
    pub surge_probability: f64,
    pub surge_intensity: f64,
    pub mu: f64,
    pub sigma: f64,
}

impl Default for ExtremeParams {
    fn default() -> Self {
        Self {
            crash_probability: 0.01,
            crash_intensity: 0.1,
            surge_probability: 0.01,
            surge_intensity: 0.1,
            mu: 0.0001,
            sigma: 0.01,
        }
    }
}

/// Extreme-event generator: a small-increment Gaussian walk with
/// Bernoulli-triggered crash and surge shocks overlaid each bar.
///
/// The crash and surge checks are independent and both are evaluated
/// every bar, so a single bar can take both a crash and a surge. Prices
/// are floored at 0.01.
#[derive(Debug)]
pub struct ExtremeEventGenerator {
    length: usize,
    frequency: Frequency,
    params: ExtremeParams,
    rng: StdRng,
}

impl ExtremeEventGenerator {
    pub fn new(config: &GeneratorConfig) -> Self {
        Self {
            length: config.length,
            frequency: config.frequency,
            params: config.extreme,
            rng: StdRng::seed_from_u64(config.seed),
        }
    }

    pub fn generate(&mut self, base: Option<&[PriceSeries]>) -> Result<Vec<PriceSeries>> {
        let (start_price, last_ts) = anchor(base);
        let p = self.params;

        let mut closes = Vec::with_capacity(self.length);
        closes.push(start_price.max(MIN_PRICE));

        for _ in 1..self.length {
            let z: f64 = StandardNormal.sample(&mut self.rng);
            let mut price = *closes.last().unwrap() * (p.mu + p.sigma * z).exp();

            if self.rng.gen::<f64>() < p.crash_probability {
                price *= 1.0 - p.crash_intensity * self.rng.gen::<f64>();
            }
            if self.rng.gen::<f64>() < p.surge_probability {
                price *= 1.0 + p.surge_intensity * self.rng.gen::<f64>();
            }

            closes.push(price.max(MIN_PRICE));
        }

        let timestamps = bar_timestamps(last_ts, self.frequency, self.length);
        let sigmas = vec![p.sigma; self.length];
        let (opens, highs, lows) = ohlc::synth_open_high_low(&mut self.rng, &closes, &sigmas);
        let volumes = ohlc::synth_volume(&mut self.rng, &closes, VolumeCoupling::NORMAL);

        let bars = ohlc::make_bars(&timestamps, opens, highs, lows, closes, volumes);
        Ok(vec![PriceSeries::new(DEFAULT_SYMBOL, bars)])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(length: usize, params: ExtremeParams) -> GeneratorConfig {
        GeneratorConfig {
            length,
            seed: 42,
            extreme: params,
            ..GeneratorConfig::default()
        }
    }

    #[test]
    fn test_generates_exact_length() {
        let mut gen = ExtremeEventGenerator::new(&config(500, ExtremeParams::default()));
        let series = gen.generate(None).unwrap();
        assert_eq!(series[0].len(), 500);
    }

    #[test]
    fn test_prices_never_drop_below_floor() {
        // Guaranteed crash every bar at near-total intensity.
        let params = ExtremeParams {
            crash_probability: 1.0,
            crash_intensity: 0.99,
            surge_probability: 0.0,
            ..ExtremeParams::default()
        };
        let mut gen = ExtremeEventGenerator::new(&config(1000, params));
        let series = gen.generate(None).unwrap();
        for bar in &series[0].bars {
            assert!(bar.close >= 0.01);
            assert!(bar.low > 0.0);
        }
    }

    #[test]
    fn test_no_shocks_reduces_to_plain_walk() {
        let params = ExtremeParams {
            crash_probability: 0.0,
            surge_probability: 0.0,
            sigma: 0.0,
            mu: 0.001,
            ..ExtremeParams::default()
        };
        let mut gen = ExtremeEventGenerator::new(&config(50, params));
        let series = gen.generate(None).unwrap();
        for (t, bar) in series[0].bars.iter().enumerate() {
            let expected = 100.0 * (0.001 * t as f64).exp();
            assert!((bar.close - expected).abs() < 1e-9 * expected);
        }
    }

    #[test]
    fn test_crash_heavy_config_drags_price_down() {
        let params = ExtremeParams {
            crash_probability: 0.2,
            crash_intensity: 0.3,
            surge_probability: 0.0,
            mu: 0.0,
            ..ExtremeParams::default()
        };
        let mut gen = ExtremeEventGenerator::new(&config(500, params));
        let series = gen.generate(None).unwrap();
        let closes = series[0].closes();
        assert!(closes.last().unwrap() < &closes[0]);
    }
}
