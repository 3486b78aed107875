use crate::error::Error;
use crate::indicators::calculate_roc;
use crate::models::{Bar, Signal};
use crate::strategy::Strategy;
use crate::Result;

/// Momentum strategy
///
/// Watches the rate of change over `momentum_period` bars and trades its
/// zero crossings: momentum turning positive buys, momentum turning
/// negative sells. Suited to markets with persistent trends.
#[derive(Debug, Clone)]
pub struct MomentumStrategy {
    pub momentum_period: usize,
}

impl Default for MomentumStrategy {
    fn default() -> Self {
        Self {
            momentum_period: 30,
        }
    }
}

impl MomentumStrategy {
    pub fn new(momentum_period: usize) -> Self {
        Self { momentum_period }
    }
}

impl Strategy for MomentumStrategy {
    fn generate_signal(&self, bars: &[Bar]) -> Result<Signal> {
        if bars.len() < self.min_bars_required() {
            return Err(Error::InsufficientData {
                needed: self.min_bars_required(),
                got: bars.len(),
            });
        }

        let closes: Vec<f64> = bars.iter().map(|b| b.close).collect();
        let now = calculate_roc(&closes, self.momentum_period);
        let prev = calculate_roc(&closes[..closes.len() - 1], self.momentum_period);

        Ok(match (prev, now) {
            (Some(p), Some(n)) if p <= 0.0 && n > 0.0 => Signal::Buy,
            (Some(p), Some(n)) if p >= 0.0 && n < 0.0 => Signal::Sell,
            _ => Signal::Hold,
        })
    }

    fn name(&self) -> &str {
        "Momentum"
    }

    fn min_bars_required(&self) -> usize {
        // Lookback plus the prior bar for cross detection.
        self.momentum_period + 2
    }
}
