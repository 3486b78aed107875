use crate::error::Error;
use crate::indicators::calculate_sma;
use crate::models::{Bar, Signal};
use crate::strategy::Strategy;
use crate::Result;

/// Dual moving average crossover strategy
///
/// Buys when the short SMA crosses above the long SMA, sells when it
/// crosses back below. Between crossings it holds.
#[derive(Debug, Clone)]
pub struct DualMovingAverageStrategy {
    pub short_window: usize,
    pub long_window: usize,
}

impl Default for DualMovingAverageStrategy {
    fn default() -> Self {
        Self {
            short_window: 20,
            long_window: 50,
        }
    }
}

impl DualMovingAverageStrategy {
    pub fn new(short_window: usize, long_window: usize) -> Self {
        Self {
            short_window,
            long_window,
        }
    }

    fn spread(&self, closes: &[f64]) -> Option<f64> {
        let short = calculate_sma(closes, self.short_window)?;
        let long = calculate_sma(closes, self.long_window)?;
        Some(short - long)
    }
}

impl Strategy for DualMovingAverageStrategy {
    fn generate_signal(&self, bars: &[Bar]) -> Result<Signal> {
        if bars.len() < self.min_bars_required() {
            return Err(Error::InsufficientData {
                needed: self.min_bars_required(),
                got: bars.len(),
            });
        }

        let closes: Vec<f64> = bars.iter().map(|b| b.close).collect();
        let now = self.spread(&closes);
        let prev = self.spread(&closes[..closes.len() - 1]);

        Ok(match (prev, now) {
            (Some(p), Some(n)) if p <= 0.0 && n > 0.0 => Signal::Buy,
            (Some(p), Some(n)) if p >= 0.0 && n < 0.0 => Signal::Sell,
            _ => Signal::Hold,
        })
    }

    fn name(&self) -> &str {
        "DualMovingAverage"
    }

    fn min_bars_required(&self) -> usize {
        // One extra bar so the previous spread exists for cross detection.
        self.long_window + 1
    }
}
