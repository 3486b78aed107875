//! Adapts generated series into the columnar layout the external
//! backtest engine ingests.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::models::PriceSeries;

/// One engine-ready feed: OHLCV columns indexed by timestamp plus the
/// zero-filled open-interest column the engine requires, tagged with the
/// asset's symbol.
#[derive(Debug, Clone, Serialize)]
pub struct DataFeed {
    pub symbol: String,
    pub timestamps: Vec<DateTime<Utc>>,
    pub open: Vec<f64>,
    pub high: Vec<f64>,
    pub low: Vec<f64>,
    pub close: Vec<f64>,
    pub volume: Vec<f64>,
    pub open_interest: Vec<f64>,
}

impl DataFeed {
    /// Build a feed from one series, repairing incomplete bars on the
    /// way: non-finite or non-positive open/high/low fall back to the
    /// close, invalid volume to zero, and the high/low envelope is
    /// re-clamped around open and close.
    pub fn from_series(series: &PriceSeries) -> Self {
        let n = series.len();
        let mut feed = Self {
            symbol: series.symbol.clone(),
            timestamps: Vec::with_capacity(n),
            open: Vec::with_capacity(n),
            high: Vec::with_capacity(n),
            low: Vec::with_capacity(n),
            close: Vec::with_capacity(n),
            volume: Vec::with_capacity(n),
            open_interest: vec![0.0; n],
        };

        for bar in &series.bars {
            let close = bar.close;
            let open = repair_price(bar.open, close);
            let high = repair_price(bar.high, close).max(open).max(close);
            let low = repair_price(bar.low, close).min(open).min(close);
            let volume = if bar.volume.is_finite() {
                bar.volume.max(0.0)
            } else {
                0.0
            };

            feed.timestamps.push(bar.timestamp);
            feed.open.push(open);
            feed.high.push(high);
            feed.low.push(low);
            feed.close.push(close);
            feed.volume.push(volume);
        }

        feed
    }

    pub fn len(&self) -> usize {
        self.close.len()
    }

    pub fn is_empty(&self) -> bool {
        self.close.is_empty()
    }
}

fn repair_price(value: f64, close: f64) -> f64 {
    if value.is_finite() && value > 0.0 {
        value
    } else {
        close
    }
}

/// One feed per asset, in input order.
pub fn to_feeds(series: &[PriceSeries]) -> Vec<DataFeed> {
    series.iter().map(DataFeed::from_series).collect()
}
