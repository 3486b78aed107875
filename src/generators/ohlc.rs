//! Shared open/high/low and volume synthesis around a close-price path.
//!
//! Every model that produces intrabar detail uses the same construction:
//! opening gaps drawn relative to the prior close, an intraday range tied
//! to the bar's volatility, and an autocorrelated lognormal volume that
//! swells with the size of the day's move.

use chrono::{DateTime, Utc};
use rand::rngs::StdRng;
use rand::Rng;
use rand_distr::{Distribution, LogNormal};

use crate::models::Bar;

/// Hard floor applied to every generated price.
pub(crate) const MIN_PRICE: f64 = 0.01;

const VOLUME_LOG_MEAN: f64 = 8.0;
const VOLUME_LOG_SIGMA: f64 = 1.0;

/// Uniform draw on `[lo, hi)` tolerating a degenerate span.
///
/// With zero volatility the span collapses to a point; sampling an empty
/// range would panic, so the lower bound is returned instead.
pub(crate) fn uniform(rng: &mut StdRng, lo: f64, hi: f64) -> f64 {
    if hi > lo {
        rng.gen_range(lo..hi)
    } else {
        lo
    }
}

/// How strongly volume reacts to the bar's relative price change:
/// `factor = 1 + coeff * |change|^exponent`.
#[derive(Debug, Clone, Copy)]
pub(crate) struct VolumeCoupling {
    pub coeff: f64,
    pub exponent: f64,
}

impl VolumeCoupling {
    /// Calm-market coupling, sublinear in the move size.
    pub(crate) const NORMAL: Self = Self {
        coeff: 5.0,
        exponent: 0.5,
    };

    /// Stress coupling: turnover tracks the move size linearly and twice
    /// as hard.
    pub(crate) const STRESS: Self = Self {
        coeff: 10.0,
        exponent: 1.0,
    };
}

/// Synthesize opens, highs and lows around a close path.
///
/// `sigmas` holds one volatility per bar (a constant-volatility model
/// passes the same value everywhere; the regime model passes the active
/// regime's volatility). The first open equals the first close; later
/// opens gap off the prior close within `±sigma/2`. The intraday range is
/// `max(|open - close|, close * sigma)`, spent mostly on the side the bar
/// moved toward, then clamped so `low <= min(open, close)` and
/// `high >= max(open, close)` with `low >= 0.01`.
pub(crate) fn synth_open_high_low(
    rng: &mut StdRng,
    closes: &[f64],
    sigmas: &[f64],
) -> (Vec<f64>, Vec<f64>, Vec<f64>) {
    debug_assert_eq!(closes.len(), sigmas.len());

    let n = closes.len();
    let mut opens = Vec::with_capacity(n);
    let mut highs = Vec::with_capacity(n);
    let mut lows = Vec::with_capacity(n);

    for i in 0..n {
        let open = if i == 0 {
            closes[0]
        } else {
            let gap = sigmas[i] / 2.0;
            closes[i - 1] * (1.0 + uniform(rng, -gap, gap))
        };
        opens.push(open);
    }

    for i in 0..n {
        let close = closes[i];
        let open = opens[i];
        let range = (open - close).abs().max(close * sigmas[i]);

        let (mut high, mut low) = if close >= open {
            (
                close + uniform(rng, 0.0, range),
                open - uniform(rng, 0.0, range / 2.0),
            )
        } else {
            (
                open + uniform(rng, 0.0, range / 2.0),
                close - uniform(rng, 0.0, range),
            )
        };

        low = low.max(MIN_PRICE);
        high = high.max(open).max(close);
        low = low.min(open).min(close);

        highs.push(high);
        lows.push(low);
    }

    (opens, highs, lows)
}

/// Synthesize a volume series for a close path.
///
/// A lognormal base series is smoothed with `v[t] = 0.6*v[t-1] +
/// 0.4*base[t]`, scaled by the coupling factor for the bar's relative
/// price change, and floored to a whole number of units.
pub(crate) fn synth_volume(
    rng: &mut StdRng,
    closes: &[f64],
    coupling: VolumeCoupling,
) -> Vec<f64> {
    let n = closes.len();
    if n == 0 {
        return Vec::new();
    }

    let lognormal = LogNormal::new(VOLUME_LOG_MEAN, VOLUME_LOG_SIGMA)
        .expect("lognormal parameters are finite");
    let base: Vec<f64> = (0..n).map(|_| lognormal.sample(rng)).collect();

    let mut smoothed = Vec::with_capacity(n);
    smoothed.push(base[0]);
    for i in 1..n {
        smoothed.push(0.6 * smoothed[i - 1] + 0.4 * base[i]);
    }

    (0..n)
        .map(|i| {
            let change = if i == 0 {
                0.0
            } else {
                ((closes[i] - closes[i - 1]) / closes[i - 1]).abs()
            };
            let factor = 1.0 + coupling.coeff * change.powf(coupling.exponent);
            (smoothed[i] * factor).floor().max(0.0)
        })
        .collect()
}

/// Assemble bars from parallel column vectors.
pub(crate) fn make_bars(
    timestamps: &[DateTime<Utc>],
    opens: Vec<f64>,
    highs: Vec<f64>,
    lows: Vec<f64>,
    closes: Vec<f64>,
    volumes: Vec<f64>,
) -> Vec<Bar> {
    timestamps
        .iter()
        .zip(opens)
        .zip(highs)
        .zip(lows)
        .zip(closes)
        .zip(volumes)
        .map(|(((((ts, open), high), low), close), volume)| Bar {
            timestamp: *ts,
            open,
            high,
            low,
            close,
            volume,
        })
        .collect()
}
