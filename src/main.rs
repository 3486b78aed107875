use anyhow::Context;
use clap::Parser;

use marketsim::generators::{Generator, GeneratorConfig};
use marketsim::metrics::{calculate_metrics, PerformanceMetrics};
use marketsim::models::Frequency;
use marketsim::strategy::{
    DualMovingAverageStrategy, MeanReversionStrategy, MomentumStrategy, Strategy,
};
use marketsim::to_feeds;

/// Generate a synthetic market and score it with the metrics engine.
#[derive(Debug, Parser)]
#[command(name = "marketsim")]
struct Args {
    /// Data generator model: monte_carlo, garch, regime, extreme,
    /// multi_asset or stress_test
    #[arg(long, default_value = "monte_carlo")]
    generator: String,

    /// Number of bars to generate
    #[arg(long, default_value_t = 500)]
    length: usize,

    /// Seed for the generator's random stream
    #[arg(long, default_value_t = 42)]
    seed: u64,

    /// Bar frequency: daily, hourly or minute
    #[arg(long, default_value = "daily")]
    frequency: String,

    /// Annual risk-free rate used by the ratio metrics
    #[arg(long, default_value_t = 0.0)]
    risk_free_rate: f64,
}

fn setup_logging() {
    tracing_subscriber::fmt()
        .with_env_filter("marketsim=info")
        .init();
}

fn print_report(symbol: &str, metrics: &PerformanceMetrics) {
    println!("\n📊 BUY-AND-HOLD METRICS ({})", symbol);
    println!("  Total Return:    {:+.2}%", metrics.total_return * 100.0);
    println!("  CAGR:            {:+.2}%", metrics.cagr * 100.0);
    println!("  Sharpe Ratio:    {:.2}", metrics.sharpe_ratio);
    println!("  Sortino Ratio:   {:.2}", metrics.sortino_ratio);
    println!("  Max Drawdown:    {:.2}%", metrics.max_drawdown * 100.0);
    println!("  Volatility:      {:.2}%", metrics.volatility * 100.0);
}

fn main() -> anyhow::Result<()> {
    setup_logging();
    let args = Args::parse();

    let config = GeneratorConfig {
        model: args.generator.clone(),
        length: args.length,
        seed: args.seed,
        frequency: Frequency::parse(&args.frequency),
        ..GeneratorConfig::default()
    };

    let mut generator = Generator::from_config(&config)
        .with_context(|| format!("building generator '{}'", args.generator))?;
    let series = generator.generate(None)?;
    let feeds = to_feeds(&series);

    tracing::info!(
        model = %args.generator,
        assets = feeds.len(),
        bars = args.length,
        "generated synthetic market"
    );

    for feed in &feeds {
        let first = feed.close.first().copied().unwrap_or(0.0);
        let last = feed.close.last().copied().unwrap_or(0.0);
        println!(
            "🧪 {}: {} bars, close {:.2} -> {:.2}",
            feed.symbol,
            feed.len(),
            first,
            last
        );
    }

    // Score each asset's close path as a buy-and-hold equity proxy.
    let periods_per_year = config.frequency.periods_per_year();
    for asset in &series {
        let metrics = calculate_metrics(&asset.closes(), args.risk_free_rate, periods_per_year);
        print_report(&asset.symbol, &metrics);
    }

    // Latest signal from each bundled strategy on the first asset.
    if let Some(first) = series.first() {
        let strategies: Vec<Box<dyn Strategy>> = vec![
            Box::new(DualMovingAverageStrategy::default()),
            Box::new(MeanReversionStrategy::default()),
            Box::new(MomentumStrategy::default()),
        ];
        println!("\n📈 LATEST SIGNALS ({})", first.symbol);
        for strategy in &strategies {
            match strategy.generate_signal(&first.bars) {
                Ok(signal) => println!("  {:<18} {:?}", strategy.name(), signal),
                Err(e) => println!("  {:<18} unavailable ({})", strategy.name(), e),
            }
        }
    }

    Ok(())
}
