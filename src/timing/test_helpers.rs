//! Shared helpers for timing unit tests

use super::TimingAggregator;
use crate::config::TimingConfig;

/// Default thresholds (1000ms burst split, 1500ms cap) with the given context
/// length and submit-key policy
pub fn config_with(context_k: usize, exclude_submit_key: bool) -> TimingConfig {
    TimingConfig {
        context_k,
        exclude_submit_key,
        ..TimingConfig::default()
    }
}

/// Press each key at the given timestamp, in order
pub fn type_at(agg: &mut TimingAggregator, presses: &[(&str, f64)]) {
    for &(key, at) in presses {
        agg.record_key_down(key, at);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_with_keeps_default_thresholds() {
        let config = config_with(3, false);
        assert_eq!(config.gap_ms, 1000);
        assert_eq!(config.max_ms, 1500);
        assert_eq!(config.context_k, 3);
        assert!(!config.exclude_submit_key);
    }

    #[test]
    fn type_at_presses_in_order() {
        let mut agg = TimingAggregator::new(config_with(1, true));
        type_at(&mut agg, &[("a", 0.0), ("b", 10.0)]);
        assert_eq!(agg.prev_stamp(), Some(10.0));
    }
}
