use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::{Distribution, StandardNormal};
use serde::{Deserialize, Serialize};

use super::ohlc::{self, VolumeCoupling};
use super::{anchor, bar_timestamps, GeneratorConfig, DEFAULT_SYMBOL};
use crate::models::{Frequency, PriceSeries};
use crate::Result;

/// Which extreme scenario the stress path is built around.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StressEvent {
    Crash,
    Rally,
    Volatility,
    /// Uniformly pick one of the three per call.
    Random,
}

/// Stress scenario parameters. Durations are in bars.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct StressParams {
    pub event_type: StressEvent,
    pub crash_intensity: f64,
    pub crash_duration: usize,
    pub crash_recovery: usize,
    pub rally_intensity: f64,
    pub rally_duration: usize,
    pub rally_correction: usize,
    pub vol_multiplier: f64,
    pub vol_duration: usize,
    pub mu: f64,
    pub sigma: f64,
}

impl Default for StressParams {
    fn default() -> Self {
        Self {
            event_type: StressEvent::Random,
            crash_intensity: 0.3,
            crash_duration: 20,
            crash_recovery: 60,
            rally_intensity: 0.3,
            rally_duration: 20,
            rally_correction: 30,
            vol_multiplier: 3.0,
            vol_duration: 40,
            mu: 0.0001,
            sigma: 0.01,
        }
    }
}

/// Stress-test generator composing a three-phase path: a normal GBM
/// stretch, the extreme event itself, and the aftermath.
///
/// Crashes decline along a back-loaded nonlinear log-price interpolation
/// (progress exponent 2) and recover front-loaded (exponent 0.5) toward
/// 90% of the pre-crash price; rallies rise with exponent 1.5 and correct
/// with exponent 0.8 to 85% of the peak; volatility spikes multiply sigma
/// by `vol_multiplier` for `vol_duration` bars. Phase noise runs at 1.5x
/// sigma during the event and 1.2x during the aftermath. Turnover couples
/// to price moves twice as hard as in calm-market synthesis.
#[derive(Debug)]
pub struct StressTestGenerator {
    length: usize,
    frequency: Frequency,
    params: StressParams,
    rng: StdRng,
}

impl StressTestGenerator {
    pub fn new(config: &GeneratorConfig) -> Self {
        Self {
            length: config.length,
            frequency: config.frequency,
            params: config.stress_test,
            rng: StdRng::seed_from_u64(config.seed),
        }
    }

    /// Normal-market phase: `n` GBM bars starting at `start`.
    fn gbm_phase(&mut self, start: f64, n: usize, sigma: f64) -> Vec<f64> {
        let mut prices = Vec::with_capacity(n);
        if n == 0 {
            return prices;
        }
        prices.push(start);
        for _ in 1..n {
            let z: f64 = StandardNormal.sample(&mut self.rng);
            let prev = *prices.last().unwrap();
            prices.push(prev * (self.params.mu + sigma * z).exp());
        }
        prices
    }

    /// Nonlinear log-price interpolation from `from` toward `to` over `n`
    /// bars with noisy progress `(i/n)^exponent`.
    fn interp_phase(
        &mut self,
        from: f64,
        to: f64,
        n: usize,
        exponent: f64,
        noise_mult: f64,
    ) -> Vec<f64> {
        let mut prices = Vec::with_capacity(n);
        for i in 0..n {
            let progress = (i as f64 / n as f64).powf(exponent);
            let z: f64 = StandardNormal.sample(&mut self.rng);
            let log_price = from.ln() * (1.0 - progress)
                + to.ln() * progress
                + self.params.sigma * noise_mult * z;
            prices.push(log_price.exp());
        }
        prices
    }

    /// Split the total length into (normal, event, aftermath), falling
    /// back to rough thirds when fewer than 10 normal bars would remain.
    fn phase_split(&self, event: usize, aftermath: usize) -> (usize, usize, usize) {
        let normal = self.length.saturating_sub(event + aftermath);
        if normal < 10 {
            let normal = self.length / 3;
            let event = self.length / 3;
            (normal, event, self.length - normal - event)
        } else {
            (normal, event, aftermath)
        }
    }

    fn crash_path(&mut self, start: f64) -> Vec<f64> {
        let p = self.params;
        let (normal, duration, recovery) = self.phase_split(p.crash_duration, p.crash_recovery);

        let mut prices = self.gbm_phase(start, normal, p.sigma);
        let pre_crash = prices.last().copied().unwrap_or(start);

        let floor = pre_crash * (1.0 - p.crash_intensity);
        prices.extend(self.interp_phase(pre_crash, floor, duration, 2.0, 1.5));

        let trough = prices.last().copied().unwrap_or(pre_crash);
        let target = pre_crash * 0.9;
        prices.extend(self.interp_phase(trough, target, recovery, 0.5, 1.2));
        prices
    }

    fn rally_path(&mut self, start: f64) -> Vec<f64> {
        let p = self.params;
        let (normal, duration, correction) = self.phase_split(p.rally_duration, p.rally_correction);

        let mut prices = self.gbm_phase(start, normal, p.sigma);
        let pre_rally = prices.last().copied().unwrap_or(start);

        let peak = pre_rally * (1.0 + p.rally_intensity);
        prices.extend(self.interp_phase(pre_rally, peak, duration, 1.5, 1.5));

        let top = prices.last().copied().unwrap_or(peak);
        let target = top * 0.85;
        prices.extend(self.interp_phase(top, target, correction, 0.8, 1.2));
        prices
    }

    fn volatility_path(&mut self, start: f64) -> Vec<f64> {
        let p = self.params;
        let spike = p.vol_duration.min(self.length);
        let before = (self.length - spike) / 2;
        let after = self.length - before - spike;

        let mut prices = self.gbm_phase(start, before, p.sigma);
        let spike_start = prices.last().copied().unwrap_or(start);

        prices.extend(self.gbm_phase(spike_start, spike, p.sigma * p.vol_multiplier));
        let calm_start = prices.last().copied().unwrap_or(spike_start);

        prices.extend(self.gbm_phase(calm_start, after, p.sigma));
        prices
    }

    pub fn generate(&mut self, base: Option<&[PriceSeries]>) -> Result<Vec<PriceSeries>> {
        let (start_price, last_ts) = anchor(base);

        let event = match self.params.event_type {
            StressEvent::Random => match self.rng.gen_range(0..3) {
                0 => StressEvent::Crash,
                1 => StressEvent::Rally,
                _ => StressEvent::Volatility,
            },
            other => other,
        };
        tracing::debug!(?event, length = self.length, "building stress path");

        let closes = match event {
            StressEvent::Crash => self.crash_path(start_price),
            StressEvent::Rally => self.rally_path(start_price),
            StressEvent::Volatility => self.volatility_path(start_price),
            StressEvent::Random => unreachable!("resolved above"),
        };
        debug_assert_eq!(closes.len(), self.length);

        let timestamps = bar_timestamps(last_ts, self.frequency, self.length);
        let sigmas = vec![self.params.sigma; self.length];
        let (opens, highs, lows) = ohlc::synth_open_high_low(&mut self.rng, &closes, &sigmas);
        let volumes = ohlc::synth_volume(&mut self.rng, &closes, VolumeCoupling::STRESS);

        let bars = ohlc::make_bars(&timestamps, opens, highs, lows, closes, volumes);
        Ok(vec![PriceSeries::new(DEFAULT_SYMBOL, bars)])
    }
}
