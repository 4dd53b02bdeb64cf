//! Statistical helper functions for the MISO index pipeline.

/// Arithmetic mean of a slice. Returns 0.0 if empty.
///
/// Undefined values propagate: a single NaN makes the result NaN.
pub fn mean(data: &[f64]) -> f64 {
    if data.is_empty() {
        return 0.0;
    }
    let sum: f64 = data.iter().sum();
    sum / data.len() as f64
}

/// Mean over the finite values of an iterator.
///
/// NaN and infinite values are skipped. Returns `None` when no finite value
/// remains, so callers can decide whether an all-missing reduction is an
/// error or an undefined output.
pub fn finite_mean<I>(data: I) -> Option<f64>
where
    I: IntoIterator<Item = f64>,
{
    let (sum, n) = data
        .into_iter()
        .filter(|v| v.is_finite())
        .fold((0.0, 0usize), |(s, n), v| (s + v, n + 1));
    if n == 0 { None } else { Some(sum / n as f64) }
}
