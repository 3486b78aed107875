use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::{Distribution, StandardNormal};
use serde::{Deserialize, Serialize};

use super::ohlc::{self, VolumeCoupling};
use super::{anchor, bar_timestamps, GeneratorConfig, DEFAULT_SYMBOL};
use crate::error::Error;
use crate::models::{Frequency, PriceSeries};
use crate::Result;

/// Drift and volatility of one market regime.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct RegimeState {
    pub drift: f64,
    pub volatility: f64,
}

/// Markov-chain configuration: `transition_matrix[i]` is the probability
/// distribution over the next state given current state `i`, and
/// `regime_params` must hold exactly `states` entries.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RegimeParams {
    pub states: usize,
    pub transition_matrix: Vec<Vec<f64>>,
    pub regime_params: Vec<RegimeState>,
    pub initial_state: usize,
}

impl Default for RegimeParams {
    fn default() -> Self {
        Self {
            states: 2,
            transition_matrix: vec![vec![0.95, 0.05], vec![0.05, 0.95]],
            regime_params: vec![
                RegimeState {
                    drift: 0.0005,
                    volatility: 0.01,
                },
                RegimeState {
                    drift: -0.0005,
                    volatility: 0.02,
                },
            ],
            initial_state: 0,
        }
    }
}

/// Regime-switching generator: a discrete-time Markov chain picks the
/// active regime each bar, and the bar's log-return is drawn from that
/// regime's Gaussian. The realized per-bar state labels are kept on the
/// output series, and high/low noise scales with the active regime's
/// volatility.
#[derive(Debug)]
pub struct RegimeSwitchingGenerator {
    length: usize,
    frequency: Frequency,
    params: RegimeParams,
    rng: StdRng,
}

impl RegimeSwitchingGenerator {
    pub fn new(config: &GeneratorConfig) -> Result<Self> {
        let params = config.regime.clone();

        if params.regime_params.len() != params.states {
            return Err(Error::config(
                "regime.regime_params",
                format!(
                    "expected {} regime parameter pairs, got {}",
                    params.states,
                    params.regime_params.len()
                ),
            ));
        }
        if params.transition_matrix.len() != params.states
            || params
                .transition_matrix
                .iter()
                .any(|row| row.len() != params.states)
        {
            return Err(Error::config(
                "regime.transition_matrix",
                format!("must be a {0}x{0} row-stochastic matrix", params.states),
            ));
        }
        if params.initial_state >= params.states {
            return Err(Error::config(
                "regime.initial_state",
                format!(
                    "state {} out of range for {} states",
                    params.initial_state, params.states
                ),
            ));
        }

        Ok(Self {
            length: config.length,
            frequency: config.frequency,
            params,
            rng: StdRng::seed_from_u64(config.seed),
        })
    }

    /// Categorical draw from the current state's transition row.
    fn next_state(&mut self, current: usize) -> usize {
        let row = &self.params.transition_matrix[current];
        let u: f64 = self.rng.gen();
        let mut cumulative = 0.0;
        for (state, p) in row.iter().enumerate() {
            cumulative += p;
            if u < cumulative {
                return state;
            }
        }
        row.len() - 1
    }

    pub fn generate(&mut self, base: Option<&[PriceSeries]>) -> Result<Vec<PriceSeries>> {
        let (start_price, last_ts) = anchor(base);

        let mut closes = Vec::with_capacity(self.length);
        let mut labels = Vec::with_capacity(self.length);

        let mut state = self.params.initial_state;
        closes.push(start_price);
        labels.push(state);

        for _ in 1..self.length {
            state = self.next_state(state);
            let regime = self.params.regime_params[state];
            let z: f64 = StandardNormal.sample(&mut self.rng);
            let ret = regime.drift + regime.volatility * z;
            let prev = *closes.last().unwrap();
            closes.push(prev * ret.exp());
            labels.push(state);
        }

        let timestamps = bar_timestamps(last_ts, self.frequency, self.length);
        let sigmas: Vec<f64> = labels
            .iter()
            .map(|&s| self.params.regime_params[s].volatility)
            .collect();
        let (opens, highs, lows) = ohlc::synth_open_high_low(&mut self.rng, &closes, &sigmas);
        let volumes = ohlc::synth_volume(&mut self.rng, &closes, VolumeCoupling::NORMAL);

        let bars = ohlc::make_bars(&timestamps, opens, highs, lows, closes, volumes);
        Ok(vec![PriceSeries::with_regimes(DEFAULT_SYMBOL, bars, labels)])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(length: usize, params: RegimeParams) -> GeneratorConfig {
        GeneratorConfig {
            length,
            seed: 42,
            regime: params,
            ..GeneratorConfig::default()
        }
    }

    #[test]
    fn test_rejects_mismatched_regime_count() {
        let params = RegimeParams {
            states: 3,
            transition_matrix: vec![vec![1.0 / 3.0; 3]; 3],
            ..RegimeParams::default()
        };
        let err = RegimeSwitchingGenerator::new(&config(100, params)).unwrap_err();
        assert!(matches!(
            err,
            Error::InvalidConfig {
                field: "regime.regime_params",
                ..
            }
        ));
    }

    #[test]
    fn test_rejects_non_square_transition_matrix() {
        let params = RegimeParams {
            transition_matrix: vec![vec![0.5, 0.5]],
            ..RegimeParams::default()
        };
        let err = RegimeSwitchingGenerator::new(&config(100, params)).unwrap_err();
        assert!(matches!(
            err,
            Error::InvalidConfig {
                field: "regime.transition_matrix",
                ..
            }
        ));
    }

    #[test]
    fn test_absorbing_state_never_leaves() {
        let params = RegimeParams {
            transition_matrix: vec![vec![1.0, 0.0], vec![0.0, 1.0]],
            ..RegimeParams::default()
        };
        let mut gen = RegimeSwitchingGenerator::new(&config(300, params)).unwrap();
        let series = gen.generate(None).unwrap();
        let labels = series[0].regimes.as_ref().unwrap();
        assert_eq!(labels.len(), 300);
        assert!(labels.iter().all(|&s| s == 0));
    }

    #[test]
    fn test_labels_and_bars_line_up() {
        let mut gen = RegimeSwitchingGenerator::new(&config(250, RegimeParams::default())).unwrap();
        let series = gen.generate(None).unwrap();
        let labels = series[0].regimes.as_ref().unwrap();
        assert_eq!(labels.len(), series[0].len());
        assert!(labels.iter().all(|&s| s < 2));
    }

    #[test]
    fn test_both_regimes_visited_under_default_matrix() {
        let mut gen = RegimeSwitchingGenerator::new(&config(2000, RegimeParams::default())).unwrap();
        let series = gen.generate(None).unwrap();
        let labels = series[0].regimes.as_ref().unwrap();
        assert!(labels.contains(&0));
        assert!(labels.contains(&1));
    }
}
