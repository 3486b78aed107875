//! Stochastic OHLCV data generators.
//!
//! Each model lives in its own file and owns a `StdRng` seeded once at
//! construction: two instances built from the same config produce
//! identical output, while repeated `generate` calls on one instance
//! continue its stream. The closed [`Generator`] enum plus
//! [`Generator::from_config`] is the only dispatch point, so callers stay
//! agnostic of which model produced the data.

pub mod extreme;
pub mod garch;
pub mod monte_carlo;
pub mod multi_asset;
mod ohlc;
pub mod regime;
pub mod stress;

pub use extreme::{ExtremeEventGenerator, ExtremeParams};
pub use garch::{GarchGenerator, GarchParams};
pub use monte_carlo::{MonteCarloGenerator, MonteCarloParams};
pub use multi_asset::{MultiAssetGenerator, MultiAssetParams};
pub use regime::{RegimeParams, RegimeState, RegimeSwitchingGenerator};
pub use stress::{StressEvent, StressParams, StressTestGenerator};

use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use crate::error::Error;
use crate::models::{Frequency, PriceSeries};
use crate::Result;

/// Price a series starts from when no base series is supplied.
pub(crate) const DEFAULT_START_PRICE: f64 = 100.0;

/// Symbol attached to single-asset synthetic output.
pub(crate) const DEFAULT_SYMBOL: &str = "SYNTH";

/// Common configuration consumed identically by every generator, plus one
/// sub-section per model. Unused sub-sections keep their defaults.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    /// Model key: `monte_carlo`, `garch`, `regime`, `extreme`,
    /// `multi_asset` or `stress_test`.
    #[serde(rename = "type")]
    pub model: String,
    /// Number of bars to generate.
    pub length: usize,
    /// Seed for the generator's private random stream.
    pub seed: u64,
    pub frequency: Frequency,
    pub monte_carlo: MonteCarloParams,
    pub garch: GarchParams,
    pub regime: RegimeParams,
    pub extreme: ExtremeParams,
    pub multi_asset: MultiAssetParams,
    pub stress_test: StressParams,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            model: "monte_carlo".to_string(),
            length: 1000,
            seed: 42,
            frequency: Frequency::Daily,
            monte_carlo: MonteCarloParams::default(),
            garch: GarchParams::default(),
            regime: RegimeParams::default(),
            extreme: ExtremeParams::default(),
            multi_asset: MultiAssetParams::default(),
            stress_test: StressParams::default(),
        }
    }
}

/// A concrete generator, one variant per stochastic model.
#[derive(Debug)]
pub enum Generator {
    MonteCarlo(MonteCarloGenerator),
    Garch(GarchGenerator),
    Regime(RegimeSwitchingGenerator),
    Extreme(ExtremeEventGenerator),
    MultiAsset(MultiAssetGenerator),
    Stress(StressTestGenerator),
}

impl Generator {
    /// Build the generator selected by `config.model`.
    ///
    /// Fails fast on structural problems: an unknown model key, a zero
    /// length, or model parameters whose shapes do not line up.
    pub fn from_config(config: &GeneratorConfig) -> Result<Self> {
        if config.length < 1 {
            return Err(Error::config("length", "must be at least 1 bar"));
        }

        match config.model.as_str() {
            "monte_carlo" => Ok(Self::MonteCarlo(MonteCarloGenerator::new(config))),
            "garch" => Ok(Self::Garch(GarchGenerator::new(config))),
            "regime" => Ok(Self::Regime(RegimeSwitchingGenerator::new(config)?)),
            "extreme" => Ok(Self::Extreme(ExtremeEventGenerator::new(config))),
            "multi_asset" => Ok(Self::MultiAsset(MultiAssetGenerator::new(config))),
            "stress_test" => Ok(Self::Stress(StressTestGenerator::new(config))),
            other => Err(Error::UnknownGenerator(other.to_string())),
        }
    }

    /// Produce one series per asset (single-asset models return one).
    ///
    /// With `base`, the new series continues one step after the base's
    /// last timestamp and anchors at its last close; `base` itself is
    /// never touched.
    pub fn generate(&mut self, base: Option<&[PriceSeries]>) -> Result<Vec<PriceSeries>> {
        match self {
            Self::MonteCarlo(g) => g.generate(base),
            Self::Garch(g) => g.generate(base),
            Self::Regime(g) => g.generate(base),
            Self::Extreme(g) => g.generate(base),
            Self::MultiAsset(g) => g.generate(base),
            Self::Stress(g) => g.generate(base),
        }
    }
}

/// First bar date when there is no base series to continue from.
pub(crate) fn default_start_date() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0).unwrap()
}

/// Strictly increasing timestamps at the frequency's fixed step,
/// starting one step after `after` when given.
pub(crate) fn bar_timestamps(
    after: Option<DateTime<Utc>>,
    frequency: Frequency,
    n: usize,
) -> Vec<DateTime<Utc>> {
    let step = frequency.bar_duration();
    let first = match after {
        Some(ts) => ts + step,
        None => default_start_date(),
    };
    (0..n).map(|i| first + step * i as i32).collect()
}

/// Starting price and last timestamp taken from the first base series,
/// falling back to the defaults when absent or empty.
pub(crate) fn anchor(base: Option<&[PriceSeries]>) -> (f64, Option<DateTime<Utc>>) {
    match base.and_then(|series| series.first()) {
        Some(series) => (
            series.last_close().unwrap_or(DEFAULT_START_PRICE),
            series.last_timestamp(),
        ),
        None => (DEFAULT_START_PRICE, None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_factory_rejects_unknown_model() {
        let config = GeneratorConfig {
            model: "quantum".to_string(),
            ..GeneratorConfig::default()
        };
        let err = Generator::from_config(&config).unwrap_err();
        assert!(matches!(err, Error::UnknownGenerator(_)));
    }

    #[test]
    fn test_factory_rejects_zero_length() {
        let config = GeneratorConfig {
            length: 0,
            ..GeneratorConfig::default()
        };
        let err = Generator::from_config(&config).unwrap_err();
        assert!(matches!(err, Error::InvalidConfig { field: "length", .. }));
    }

    #[test]
    fn test_factory_builds_every_model() {
        for model in [
            "monte_carlo",
            "garch",
            "regime",
            "extreme",
            "multi_asset",
            "stress_test",
        ] {
            let config = GeneratorConfig {
                model: model.to_string(),
                length: 50,
                ..GeneratorConfig::default()
            };
            assert!(Generator::from_config(&config).is_ok(), "model {}", model);
        }
    }

    #[test]
    fn test_config_deserializes_from_nested_layout() {
        let raw = r#"{
            "type": "garch",
            "length": 250,
            "seed": 7,
            "frequency": "hourly",
            "garch": {"omega": 0.00002, "alpha": 0.05, "beta": 0.9}
        }"#;
        let config: GeneratorConfig = serde_json::from_str(raw).unwrap();
        assert_eq!(config.model, "garch");
        assert_eq!(config.length, 250);
        assert_eq!(config.frequency, Frequency::Hourly);
        assert_eq!(config.garch.alpha, 0.05);
        // Untouched sections keep their defaults.
        assert_eq!(config.monte_carlo.sigma, 0.01);
    }

    #[test]
    fn test_timestamps_fixed_step_and_continuation() {
        let ts = bar_timestamps(None, Frequency::Hourly, 5);
        assert_eq!(ts.len(), 5);
        for pair in ts.windows(2) {
            assert_eq!(pair[1] - pair[0], Frequency::Hourly.bar_duration());
        }

        let continued = bar_timestamps(Some(ts[4]), Frequency::Hourly, 3);
        assert_eq!(continued[0] - ts[4], Frequency::Hourly.bar_duration());
    }

    #[test]
    fn test_same_seed_same_output() {
        let config = GeneratorConfig {
            length: 100,
            ..GeneratorConfig::default()
        };
        let mut a = Generator::from_config(&config).unwrap();
        let mut b = Generator::from_config(&config).unwrap();
        let series_a = a.generate(None).unwrap();
        let series_b = b.generate(None).unwrap();
        assert_eq!(series_a[0].closes(), series_b[0].closes());
    }
}
