/// Shared error statistics for prediction accuracy.
pub struct Stats;

impl Stats {
    /// Mean of squared differences between paired predictions and actuals.
    ///
    /// Returns 0.0 for empty input.
    pub fn mean_squared_error(pairs: &[(f64, f64)]) -> f64 {
        Self::mean(pairs.iter().map(|(predicted, actual)| {
            let diff = predicted - actual;
            diff * diff
        }))
    }

    /// Mean of absolute differences between paired predictions and actuals.
    ///
    /// Returns 0.0 for empty input.
    pub fn mean_absolute_error(pairs: &[(f64, f64)]) -> f64 {
        Self::mean(pairs.iter().map(|(predicted, actual)| (predicted - actual).abs()))
    }

    /// NaN never leaves the metrics layer
    pub fn nan_to_zero(value: f64) -> f64 {
        if value.is_nan() { 0.0 } else { value }
    }

    fn mean(values: impl Iterator<Item = f64>) -> f64 {
        let (sum, count) = values.fold((0.0, 0usize), |(sum, count), v| (sum + v, count + 1));
        if count == 0 {
            return 0.0;
        }
        Self::nan_to_zero(sum / count as f64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mean_squared_error() {
        let pairs = vec![(100.0, 90.0), (200.0, 210.0)];
        assert!((Stats::mean_squared_error(&pairs) - 100.0).abs() < 1e-9);
    }

    #[test]
    fn test_mean_absolute_error() {
        let pairs = vec![(10.0, 15.0), (20.0, 18.0)];
        assert!((Stats::mean_absolute_error(&pairs) - 3.5).abs() < 1e-9);
    }

    #[test]
    fn test_empty_input_is_zero() {
        assert_eq!(Stats::mean_squared_error(&[]), 0.0);
        assert_eq!(Stats::mean_absolute_error(&[]), 0.0);
    }

    #[test]
    fn test_nan_is_coerced() {
        let pairs = vec![(f64::NAN, 1.0), (2.0, 1.0)];
        assert_eq!(Stats::mean_squared_error(&pairs), 0.0);
        assert_eq!(Stats::nan_to_zero(f64::NAN), 0.0);
        assert_eq!(Stats::nan_to_zero(2.5), 2.5);
    }
}
