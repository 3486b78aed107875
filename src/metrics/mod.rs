//! Performance metrics over a portfolio-value series.
//!
//! Everything here is a pure function and nothing here fails: degenerate
//! input (fewer than two usable points, zero variance, an execution run
//! that produced garbage) yields the documented default values instead,
//! so an optimization driver can keep comparing trials.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Finite stand-in for an infinite Sortino ratio (all-upside returns);
/// Sortino output is clamped to this magnitude so trial ranking never
/// sees an infinity.
pub const MAX_SORTINO_RATIO: f64 = 10_000.0;

/// The fixed set of metrics reported for every scored series.
///
/// All values are finite; a degenerate input series produces the all-zero
/// result rather than an error.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct PerformanceMetrics {
    pub cagr: f64,
    pub sharpe_ratio: f64,
    pub max_drawdown: f64,
    pub sortino_ratio: f64,
    pub total_return: f64,
    pub volatility: f64,
}

impl PerformanceMetrics {
    /// Look a metric up by its reported name, the way an optimization
    /// driver selects its objective.
    pub fn value(&self, name: &str) -> Option<f64> {
        match name {
            "cagr" => Some(self.cagr),
            "sharpe_ratio" => Some(self.sharpe_ratio),
            "max_drawdown" => Some(self.max_drawdown),
            "sortino_ratio" => Some(self.sortino_ratio),
            "total_return" => Some(self.total_return),
            "volatility" => Some(self.volatility),
            _ => None,
        }
    }

    /// Name -> value view with all six keys always present.
    pub fn to_map(&self) -> BTreeMap<String, f64> {
        BTreeMap::from([
            ("cagr".to_string(), self.cagr),
            ("sharpe_ratio".to_string(), self.sharpe_ratio),
            ("max_drawdown".to_string(), self.max_drawdown),
            ("sortino_ratio".to_string(), self.sortino_ratio),
            ("total_return".to_string(), self.total_return),
            ("volatility".to_string(), self.volatility),
        ])
    }
}

/// Repair a portfolio-value series: non-finite or non-positive entries
/// are forward-filled from the last valid value, and leading invalid
/// entries back-filled from the first valid one. An all-invalid series
/// comes back empty.
pub fn clean_values(values: &[f64]) -> Vec<f64> {
    let first_valid = match values.iter().find(|v| v.is_finite() && **v > 0.0) {
        Some(v) => *v,
        None => return Vec::new(),
    };

    let mut cleaned = Vec::with_capacity(values.len());
    let mut last = first_valid;
    for &v in values {
        if v.is_finite() && v > 0.0 {
            last = v;
        }
        cleaned.push(last);
    }
    cleaned
}

/// Percentage change between consecutive values. The first observation
/// has no defined change and is dropped.
pub fn pct_returns(values: &[f64]) -> Vec<f64> {
    values.windows(2).map(|w| w[1] / w[0] - 1.0).collect()
}

fn mean(xs: &[f64]) -> f64 {
    xs.iter().sum::<f64>() / xs.len() as f64
}

/// Population standard deviation.
fn std_dev(xs: &[f64]) -> f64 {
    let m = mean(xs);
    (xs.iter().map(|x| (x - m) * (x - m)).sum::<f64>() / xs.len() as f64).sqrt()
}

fn finite_or_zero(x: f64) -> f64 {
    if x.is_finite() {
        x
    } else {
        0.0
    }
}

/// Annualized Sharpe ratio: `mean(excess) / std(excess) * sqrt(ppy)`,
/// with excess return `r - risk_free_rate / periods_per_year`. Flat
/// returns (zero standard deviation) score 0.0.
pub fn sharpe_ratio(returns: &[f64], risk_free_rate: f64, periods_per_year: f64) -> f64 {
    if returns.is_empty() {
        return 0.0;
    }
    let per_period_rf = risk_free_rate / periods_per_year;
    let excess: Vec<f64> = returns.iter().map(|r| r - per_period_rf).collect();

    let sd = std_dev(&excess);
    if sd == 0.0 {
        return 0.0;
    }
    finite_or_zero(mean(&excess) / sd * periods_per_year.sqrt())
}

/// Annualized Sortino ratio: like Sharpe, but the denominator only uses
/// the negative excess returns. With no downside observations the result
/// is [`MAX_SORTINO_RATIO`] when the mean excess is positive and 0.0
/// otherwise; output is clamped to that magnitude either way.
pub fn sortino_ratio(returns: &[f64], risk_free_rate: f64, periods_per_year: f64) -> f64 {
    if returns.is_empty() {
        return 0.0;
    }
    let per_period_rf = risk_free_rate / periods_per_year;
    let excess: Vec<f64> = returns.iter().map(|r| r - per_period_rf).collect();
    let downside: Vec<f64> = excess.iter().copied().filter(|r| *r < 0.0).collect();

    if downside.is_empty() {
        return if mean(&excess) > 0.0 {
            MAX_SORTINO_RATIO
        } else {
            0.0
        };
    }

    let downside_sd = std_dev(&downside);
    if downside_sd == 0.0 {
        return 0.0;
    }
    let ratio = finite_or_zero(mean(&excess) / downside_sd * periods_per_year.sqrt());
    ratio.clamp(-MAX_SORTINO_RATIO, MAX_SORTINO_RATIO)
}

/// Maximum peak-to-trough decline as a positive fraction of the peak;
/// 0.0 when undefined.
pub fn max_drawdown(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    let mut peak = values[0];
    let mut worst = 0.0f64;
    for &v in values {
        if v > peak {
            peak = v;
        }
        if peak > 0.0 {
            worst = worst.min((v - peak) / peak);
        }
    }
    finite_or_zero(-worst)
}

/// Compound annual growth rate with a bar-count year basis:
/// `years = len / periods_per_year`. Applied uniformly regardless of the
/// wall-clock span the timestamps cover.
pub fn cagr(values: &[f64], periods_per_year: f64) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    let start = values[0];
    let end = values[values.len() - 1];
    if start <= 0.0 {
        return 0.0;
    }
    let years = values.len() as f64 / periods_per_year;
    if years <= 0.0 {
        return 0.0;
    }
    finite_or_zero((end / start).powf(1.0 / years) - 1.0)
}

/// Annualized volatility of the return series (population std).
pub fn annualized_volatility(returns: &[f64], periods_per_year: f64) -> f64 {
    if returns.is_empty() {
        return 0.0;
    }
    finite_or_zero(std_dev(returns) * periods_per_year.sqrt())
}

/// Score a portfolio-value series.
///
/// The sole scoring interface: always returns all six metrics, never
/// fails, and treats any series with fewer than two usable points as
/// degenerate (all-zero result).
pub fn calculate_metrics(
    values: &[f64],
    risk_free_rate: f64,
    periods_per_year: f64,
) -> PerformanceMetrics {
    let cleaned = clean_values(values);
    if cleaned.len() < 2 {
        return PerformanceMetrics::default();
    }

    let returns = pct_returns(&cleaned);
    let start = cleaned[0];
    let end = cleaned[cleaned.len() - 1];

    PerformanceMetrics {
        cagr: cagr(&cleaned, periods_per_year),
        sharpe_ratio: sharpe_ratio(&returns, risk_free_rate, periods_per_year),
        max_drawdown: max_drawdown(&cleaned),
        sortino_ratio: sortino_ratio(&returns, risk_free_rate, periods_per_year),
        total_return: finite_or_zero(end / start - 1.0),
        volatility: annualized_volatility(&returns, periods_per_year),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_max_drawdown_halving_recovers() {
        assert_eq!(max_drawdown(&[100.0, 50.0, 100.0]), 0.5);
    }

    #[test]
    fn test_max_drawdown_monotone_series_is_zero() {
        assert_eq!(max_drawdown(&[100.0, 101.0, 105.0]), 0.0);
    }

    #[test]
    fn test_degenerate_series_yields_all_zero_map() {
        for input in [vec![], vec![100.0]] {
            let metrics = calculate_metrics(&input, 0.0, 252.0);
            assert_eq!(metrics, PerformanceMetrics::default());
            let map = metrics.to_map();
            assert_eq!(map.len(), 6);
            assert!(map.values().all(|v| *v == 0.0));
        }
    }

    #[test]
    fn test_all_nan_series_is_degenerate() {
        let metrics = calculate_metrics(&[f64::NAN, f64::NAN, f64::NAN], 0.0, 252.0);
        assert_eq!(metrics, PerformanceMetrics::default());
    }

    #[test]
    fn test_sharpe_zero_variance_is_zero() {
        let returns = vec![0.01; 20];
        assert_eq!(sharpe_ratio(&returns, 0.0, 252.0), 0.0);
        // A constant value series has all-zero returns: same outcome.
        let metrics = calculate_metrics(&[100.0; 10], 0.0, 252.0);
        assert_eq!(metrics.sharpe_ratio, 0.0);
        assert_eq!(metrics.volatility, 0.0);
    }

    #[test]
    fn test_sortino_all_upside_hits_cap() {
        let returns = vec![0.01, 0.02, 0.015];
        assert_eq!(sortino_ratio(&returns, 0.0, 252.0), MAX_SORTINO_RATIO);
    }

    #[test]
    fn test_sortino_flat_returns_is_zero() {
        assert_eq!(sortino_ratio(&[0.0, 0.0, 0.0], 0.0, 252.0), 0.0);
    }

    #[test]
    fn test_sortino_with_downside_is_finite() {
        let returns = vec![0.02, -0.01, 0.015, -0.005, 0.01];
        let ratio = sortino_ratio(&returns, 0.0, 252.0);
        assert!(ratio.is_finite());
        assert!(ratio > 0.0);
        assert!(ratio.abs() <= MAX_SORTINO_RATIO);
    }

    #[test]
    fn test_clean_values_forward_and_backfills() {
        let cleaned = clean_values(&[f64::NAN, 100.0, -5.0, 110.0, f64::INFINITY]);
        assert_eq!(cleaned, vec![100.0, 100.0, 100.0, 110.0, 110.0]);
    }

    #[test]
    fn test_cagr_doubling_in_a_year() {
        // 252 bars at daily frequency is one year; doubling over it is a
        // 100% CAGR.
        let values: Vec<f64> = (0..252)
            .map(|i| 100.0 * 2.0f64.powf(i as f64 / 251.0))
            .collect();
        let growth = cagr(&values, 252.0);
        assert!((growth - 1.0).abs() < 0.02, "cagr {}", growth);
    }

    #[test]
    fn test_total_return_matches_endpoints() {
        let metrics = calculate_metrics(&[100.0, 120.0, 90.0, 130.0], 0.0, 252.0);
        assert!((metrics.total_return - 0.3).abs() < 1e-12);
    }

    #[test]
    fn test_risk_free_rate_lowers_sharpe() {
        let returns: Vec<f64> = (0..100)
            .map(|i| 0.001 + 0.0005 * ((i % 7) as f64 - 3.0))
            .collect();
        let without = sharpe_ratio(&returns, 0.0, 252.0);
        let with = sharpe_ratio(&returns, 0.05, 252.0);
        assert!(with < without);
    }

    #[test]
    fn test_metric_lookup_by_name() {
        let metrics = calculate_metrics(&[100.0, 110.0, 105.0, 120.0], 0.0, 252.0);
        assert_eq!(metrics.value("sharpe_ratio"), Some(metrics.sharpe_ratio));
        assert_eq!(metrics.value("max_drawdown"), Some(metrics.max_drawdown));
        assert_eq!(metrics.value("unheard_of"), None);
    }

    #[test]
    fn test_all_outputs_finite_on_wild_input() {
        let values = vec![
            100.0,
            f64::NAN,
            1e-9,
            250.0,
            -40.0,
            90.0,
            f64::INFINITY,
            130.0,
        ];
        let metrics = calculate_metrics(&values, 0.0, 252.0);
        for (name, value) in metrics.to_map() {
            assert!(value.is_finite(), "{} = {}", name, value);
        }
    }
}
