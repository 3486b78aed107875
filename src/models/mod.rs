use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// Sampling frequency of a generated series.
///
/// Controls both the time step between bars and the annualization factor
/// used by the metrics engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Frequency {
    Daily,
    Hourly,
    Minute,
}

impl Default for Frequency {
    fn default() -> Self {
        Frequency::Daily
    }
}

impl Frequency {
    /// Fixed time step between consecutive bars.
    pub fn bar_duration(&self) -> Duration {
        match self {
            Frequency::Daily => Duration::days(1),
            Frequency::Hourly => Duration::hours(1),
            Frequency::Minute => Duration::minutes(1),
        }
    }

    /// Bars per year at this frequency, on a 252-trading-day calendar.
    pub fn periods_per_year(&self) -> f64 {
        match self {
            Frequency::Daily => 252.0,
            Frequency::Hourly => 252.0 * 24.0,
            Frequency::Minute => 252.0 * 24.0 * 60.0,
        }
    }

    /// Parse a frequency key, tolerating the short forms used in configs.
    ///
    /// Unrecognized values are recoverable: they log one warning and fall
    /// back to daily bars.
    pub fn parse(value: &str) -> Self {
        match value.to_ascii_lowercase().as_str() {
            "d" | "daily" | "day" => Frequency::Daily,
            "h" | "hourly" | "hour" => Frequency::Hourly,
            "m" | "min" | "minute" => Frequency::Minute,
            other => {
                tracing::warn!("unrecognized frequency '{}', defaulting to daily", other);
                Frequency::Daily
            }
        }
    }
}

/// One OHLCV bar of market data.
///
/// Invariants maintained by every generator:
/// `low <= min(open, close) <= max(open, close) <= high`, `low > 0`,
/// `volume >= 0` and integral.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Bar {
    pub timestamp: DateTime<Utc>,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

impl Bar {
    /// Flat bar carrying only a close: open/high/low are set to the close
    /// and volume to zero. Used where a model produces no intrabar detail.
    pub fn from_close(timestamp: DateTime<Utc>, close: f64) -> Self {
        Self {
            timestamp,
            open: close,
            high: close,
            low: close,
            close,
            volume: 0.0,
        }
    }
}

/// An ordered-by-time OHLCV series for one asset.
///
/// Created wholesale by a generator call and immutable afterwards.
/// `regimes` carries the per-bar realized state labels when the series
/// came from the regime-switching model, `None` otherwise.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PriceSeries {
    pub symbol: String,
    pub bars: Vec<Bar>,
    pub regimes: Option<Vec<usize>>,
}

impl PriceSeries {
    pub fn new(symbol: impl Into<String>, bars: Vec<Bar>) -> Self {
        Self {
            symbol: symbol.into(),
            bars,
            regimes: None,
        }
    }

    pub fn with_regimes(symbol: impl Into<String>, bars: Vec<Bar>, regimes: Vec<usize>) -> Self {
        Self {
            symbol: symbol.into(),
            bars,
            regimes: Some(regimes),
        }
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    pub fn last_close(&self) -> Option<f64> {
        self.bars.last().map(|b| b.close)
    }

    pub fn last_timestamp(&self) -> Option<DateTime<Utc>> {
        self.bars.last().map(|b| b.timestamp)
    }

    /// Close prices in bar order.
    pub fn closes(&self) -> Vec<f64> {
        self.bars.iter().map(|b| b.close).collect()
    }
}

/// Trading signal emitted by a strategy.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum Signal {
    Buy,
    Sell,
    Hold,
}
