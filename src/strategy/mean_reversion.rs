use crate::error::Error;
use crate::indicators::{calculate_sma, calculate_std};
use crate::models::{Bar, Signal};
use crate::strategy::Strategy;
use crate::Result;

/// Mean reversion strategy
///
/// Trades the z-score of the close against its trailing moving average:
/// a deep negative deviation is bought, and the position is handed back
/// once price reverts past the exit band above the mean. Built for
/// choppy, range-bound markets; it will bleed in a sustained trend.
#[derive(Debug, Clone)]
pub struct MeanReversionStrategy {
    /// Window for the mean and standard deviation
    pub lookback: usize,
    /// Entry band in standard deviations below the mean
    pub entry_std: f64,
    /// Exit band in standard deviations above the mean
    pub exit_std: f64,
}

impl Default for MeanReversionStrategy {
    fn default() -> Self {
        Self {
            lookback: 20,
            entry_std: 2.0,
            exit_std: 0.5,
        }
    }
}

impl MeanReversionStrategy {
    pub fn new(lookback: usize, entry_std: f64, exit_std: f64) -> Self {
        Self {
            lookback,
            entry_std,
            exit_std,
        }
    }
}

impl Strategy for MeanReversionStrategy {
    fn generate_signal(&self, bars: &[Bar]) -> Result<Signal> {
        if bars.len() < self.min_bars_required() {
            return Err(Error::InsufficientData {
                needed: self.min_bars_required(),
                got: bars.len(),
            });
        }

        let closes: Vec<f64> = bars.iter().map(|b| b.close).collect();
        let mean = calculate_sma(&closes, self.lookback)
            .ok_or(Error::InsufficientData {
                needed: self.lookback,
                got: closes.len(),
            })?;
        let std = calculate_std(&closes, self.lookback)
            .ok_or(Error::InsufficientData {
                needed: self.lookback,
                got: closes.len(),
            })?;

        // A flat window has no band to trade against.
        if std == 0.0 {
            return Ok(Signal::Hold);
        }

        let deviation = (closes[closes.len() - 1] - mean) / std;
        Ok(if deviation < -self.entry_std {
            Signal::Buy
        } else if deviation > self.exit_std {
            Signal::Sell
        } else {
            Signal::Hold
        })
    }

    fn name(&self) -> &str {
        "MeanReversion"
    }

    fn min_bars_required(&self) -> usize {
        self.lookback
    }
}
