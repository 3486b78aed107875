// Core modules
pub mod error;
pub mod feed;
pub mod generators;
pub mod indicators;
pub mod metrics;
pub mod models;
pub mod results;
pub mod strategy;

// Re-export commonly used types
pub use error::Error;
pub use feed::{to_feeds, DataFeed};
pub use generators::{Generator, GeneratorConfig};
pub use metrics::{calculate_metrics, PerformanceMetrics};
pub use models::{Bar, Frequency, PriceSeries, Signal};
pub use strategy::Strategy;

// Error handling
pub type Result<T> = std::result::Result<T, Error>;
