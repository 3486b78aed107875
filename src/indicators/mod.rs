// Technical indicators consumed by the strategy implementations

pub mod momentum;
pub mod moving_average;
pub mod volatility;

pub use momentum::calculate_roc;
pub use moving_average::calculate_sma;
pub use volatility::calculate_std;
