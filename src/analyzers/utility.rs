/// Computes the arithmetic mean of a slice of values. Returns `None` for empty input.
pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

/// Computes the sample variance (n − 1 denominator) given a pre-computed mean.
/// Returns `None` for fewer than two values.
pub fn variance(values: &[f64], mean: f64) -> Option<f64> {
    if values.len() < 2 {
        return None;
    }
    let ss = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>();
    Some(ss / (values.len() - 1) as f64)
}

/// Sample standard deviation given a pre-computed mean.
pub fn stddev(values: &[f64], mean: f64) -> Option<f64> {
    variance(values, mean).map(f64::sqrt)
}
