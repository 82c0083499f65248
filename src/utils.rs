//! Shared utility functions and traits

/// Extension trait for tracking minimum and maximum values in Option<T>.
///
/// # Example
///
/// ```
/// use keystroke_timing::utils::MinMaxExt;
///
/// let mut fastest: Option<u64> = None;
/// let mut slowest: Option<u64> = None;
///
/// for delay in [140, 95, 210] {
///     fastest.update_min(delay);
///     slowest.update_max(delay);
/// }
/// assert_eq!(fastest, Some(95));
/// assert_eq!(slowest, Some(210));
/// ```
pub trait MinMaxExt<T: Ord + Copy> {
    /// Store `value` if it is below the current minimum or none exists yet
    fn update_min(&mut self, value: T);

    /// Store `value` if it is above the current maximum or none exists yet
    fn update_max(&mut self, value: T);
}

impl<T: Ord + Copy> MinMaxExt<T> for Option<T> {
    fn update_min(&mut self, value: T) {
        *self = Some(self.map(|m| m.min(value)).unwrap_or(value));
    }

    fn update_max(&mut self, value: T) {
        *self = Some(self.map(|m| m.max(value)).unwrap_or(value));
    }
}

/// Arithmetic mean, `None` for an empty slice
pub fn mean(values: &[u64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().map(|&v| v as f64).sum::<f64>() / values.len() as f64)
}

/// Median of the values, averaging the two middle samples for even lengths
pub fn median(values: &[u64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let mut sorted = values.to_vec();
    sorted.sort_unstable();
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        Some((sorted[mid - 1] as f64 + sorted[mid] as f64) / 2.0)
    } else {
        Some(sorted[mid] as f64)
    }
}

/// Mean of float samples, `None` for an empty slice
pub fn mean_f64(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn update_min_from_none() {
        let mut min: Option<u64> = None;
        min.update_min(100);
        assert_eq!(min, Some(100));
    }

    #[test]
    fn update_min_larger_value_unchanged() {
        let mut min: Option<u64> = Some(50);
        min.update_min(100);
        assert_eq!(min, Some(50));
    }

    #[test]
    fn update_max_smaller_value_unchanged() {
        let mut max: Option<u64> = Some(200);
        max.update_max(100);
        assert_eq!(max, Some(200));
    }

    #[test]
    fn mean_of_delays() {
        assert_eq!(mean(&[]), None);
        assert_eq!(mean(&[100, 200]), Some(150.0));
        assert_eq!(mean(&[7]), Some(7.0));
    }

    #[test]
    fn huge_delays_do_not_overflow() {
        let big = [u64::MAX, u64::MAX];
        assert_eq!(median(&big), Some(u64::MAX as f64));
        assert_eq!(mean(&big), Some(u64::MAX as f64));
    }

    #[test]
    fn median_odd_and_even() {
        assert_eq!(median(&[]), None);
        assert_eq!(median(&[300, 100, 200]), Some(200.0));
        assert_eq!(median(&[400, 100, 200, 300]), Some(250.0));
    }

    #[test]
    fn mean_of_floats() {
        assert_eq!(mean_f64(&[]), None);
        assert_eq!(mean_f64(&[0.5, 1.5]), Some(1.0));
    }
}
