/// Population standard deviation over the trailing `period` prices
pub fn calculate_std(prices: &[f64], period: usize) -> Option<f64> {
    if period == 0 || prices.len() < period {
        return None;
    }

    let window = &prices[prices.len() - period..];
    let mean = window.iter().sum::<f64>() / period as f64;
    let variance = window.iter().map(|p| (p - mean) * (p - mean)).sum::<f64>() / period as f64;
    Some(variance.sqrt())
}
