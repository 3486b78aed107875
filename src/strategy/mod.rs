// Trading strategy module: signal generation only. Order execution,
// sizing and accounting belong to the external backtest engine.

pub mod dual_ma;
pub mod mean_reversion;
pub mod momentum;

pub use dual_ma::DualMovingAverageStrategy;
pub use mean_reversion::MeanReversionStrategy;
pub use momentum::MomentumStrategy;

use crate::models::{Bar, Signal};
use crate::Result;

/// Base trait for all trading strategies
pub trait Strategy: Send + Sync {
    /// Generate a trading signal from the trailing window of bars
    fn generate_signal(&self, bars: &[Bar]) -> Result<Signal>;

    /// Get strategy name
    fn name(&self) -> &str;

    /// Minimum bars required for this strategy's indicators
    fn min_bars_required(&self) -> usize;
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};

    /// Bars at daily spacing with the given closes and flat volume.
    pub(crate) fn bars_from_closes(closes: &[f64]) -> Vec<Bar> {
        let start = Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0).unwrap();
        closes
            .iter()
            .enumerate()
            .map(|(i, &close)| Bar {
                timestamp: start + Duration::days(i as i64),
                open: close,
                high: close * 1.01,
                low: close * 0.99,
                close,
                volume: 1_000.0,
            })
            .collect()
    }
}
