/// Sum of squared elementwise differences
///
/// Elements beyond the shorter slice are ignored.
pub fn squared_euclidean(a: &[f64], b: &[f64]) -> f64 {
    a.iter()
        .zip(b.iter())
        .map(|(&x, &y)| {
            let diff = x - y;
            diff * diff
        })
        .sum()
}

/// Sum of absolute elementwise differences
///
/// Elements beyond the shorter slice are ignored.
pub fn manhattan(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b.iter()).map(|(&x, &y)| (x - y).abs()).sum()
}

/// Arithmetic mean, zero for an empty slice
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Subtract the slice mean from every element
pub fn center(values: &mut [f64]) {
    let offset = mean(values);
    for value in values.iter_mut() {
        *value -= offset;
    }
}
