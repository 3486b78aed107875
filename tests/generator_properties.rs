//! Cross-model invariants: every generator, whatever its stochastic
//! model, must hand the backtest engine the same well-formed shape.

use marketsim::generators::{Generator, GeneratorConfig};
use marketsim::metrics::calculate_metrics;
use marketsim::models::{Frequency, PriceSeries};
use marketsim::to_feeds;

const ALL_MODELS: &[&str] = &[
    "monte_carlo",
    "garch",
    "regime",
    "extreme",
    "multi_asset",
    "stress_test",
];

fn generate(model: &str, length: usize, frequency: Frequency) -> Vec<PriceSeries> {
    let config = GeneratorConfig {
        model: model.to_string(),
        length,
        seed: 42,
        frequency,
        ..GeneratorConfig::default()
    };
    let mut generator = Generator::from_config(&config).unwrap();
    generator.generate(None).unwrap()
}

#[test]
fn every_model_emits_exact_length_and_valid_bars() {
    let _ = tracing_subscriber::fmt().with_env_filter("marketsim=debug").try_init();

    for model in ALL_MODELS {
        for series in generate(model, 300, Frequency::Daily) {
            assert_eq!(series.len(), 300, "model {}", model);
            for bar in &series.bars {
                assert!(bar.low > 0.0, "model {}", model);
                assert!(
                    bar.low <= bar.open.min(bar.close),
                    "model {}: low {} open {} close {}",
                    model,
                    bar.low,
                    bar.open,
                    bar.close
                );
                assert!(
                    bar.high >= bar.open.max(bar.close),
                    "model {}: high {} open {} close {}",
                    model,
                    bar.high,
                    bar.open,
                    bar.close
                );
                assert!(bar.volume >= 0.0, "model {}", model);
            }
        }
    }
}

#[test]
fn every_model_spaces_timestamps_by_frequency() {
    for model in ALL_MODELS {
        for frequency in [Frequency::Daily, Frequency::Hourly, Frequency::Minute] {
            let step = frequency.bar_duration();
            for series in generate(model, 50, frequency) {
                for pair in series.bars.windows(2) {
                    assert_eq!(
                        pair[1].timestamp - pair[0].timestamp,
                        step,
                        "model {} at {:?}",
                        model,
                        frequency
                    );
                }
            }
        }
    }
}

#[test]
fn every_model_continues_smoothly_from_its_own_output() {
    for model in ALL_MODELS {
        let config = GeneratorConfig {
            model: model.to_string(),
            length: 100,
            seed: 42,
            ..GeneratorConfig::default()
        };
        let mut generator = Generator::from_config(&config).unwrap();
        let first = generator.generate(None).unwrap();
        let continued = generator.generate(Some(&first)).unwrap();

        for (prev, next) in first.iter().zip(&continued) {
            let last = prev.bars.last().unwrap();
            let resumed = &next.bars[0];
            assert_eq!(
                resumed.timestamp - last.timestamp,
                Frequency::Daily.bar_duration(),
                "model {}",
                model
            );
            // No discontinuity beyond a generous one-bar move.
            let jump = (resumed.close / last.close - 1.0).abs();
            assert!(jump < 0.10, "model {}: jump {}", model, jump);
        }
    }
}

#[test]
fn feeds_split_per_asset_with_engine_columns() {
    let series = generate("multi_asset", 120, Frequency::Daily);
    let feeds = to_feeds(&series);

    assert_eq!(feeds.len(), 3); // default asset count
    for (s, feed) in series.iter().zip(&feeds) {
        assert_eq!(feed.symbol, s.symbol);
        assert_eq!(feed.len(), 120);
        assert!(feed.open_interest.iter().all(|oi| *oi == 0.0));
        assert_eq!(feed.close, s.closes());
    }
}

#[test]
fn regime_output_carries_labels_others_do_not() {
    let regime = generate("regime", 80, Frequency::Daily);
    assert!(regime[0].regimes.is_some());
    assert_eq!(regime[0].regimes.as_ref().unwrap().len(), 80);

    let gbm = generate("monte_carlo", 80, Frequency::Daily);
    assert!(gbm[0].regimes.is_none());
}

#[test]
fn generated_market_scores_with_finite_metrics() {
    for model in ALL_MODELS {
        for series in generate(model, 400, Frequency::Daily) {
            let metrics = calculate_metrics(&series.closes(), 0.02, 252.0);
            for (name, value) in metrics.to_map() {
                assert!(
                    value.is_finite(),
                    "model {} metric {} = {}",
                    model,
                    name,
                    value
                );
            }
        }
    }
}

#[test]
fn single_bar_market_is_scorable_and_degenerate() {
    for model in ALL_MODELS {
        for series in generate(model, 1, Frequency::Daily) {
            assert_eq!(series.len(), 1, "model {}", model);
            let metrics = calculate_metrics(&series.closes(), 0.0, 252.0);
            assert!(metrics.to_map().values().all(|v| *v == 0.0));
        }
    }
}
