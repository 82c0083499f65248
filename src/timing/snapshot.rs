//! Exported timing snapshots
//!
//! A [`TimingSnapshot`] owns sorted copies of the aggregator stores, so keys
//! recorded after the export never show up in it.
//!
//! Two JSON shapes are supported:
//!
//! - minimal: `{ "<context>-><key>": [ms, ...], ... }`
//! - full: `{ "ngram_times": {...}, "dwell_times": {...}, "flight_times": {...} }`

use super::store::{FlightKey, NgramKey};
use crate::utils::{mean, median, MinMaxExt};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Which JSON shape to export
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    /// Only the n-gram map, at the top level
    Minimal,
    /// N-gram, dwell and flight maps under named fields
    Full,
}

/// Immutable copy of all recorded timings
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TimingSnapshot {
    #[serde(default)]
    pub ngram_times: BTreeMap<NgramKey, Vec<u64>>,
    #[serde(default)]
    pub dwell_times: BTreeMap<String, Vec<u64>>,
    #[serde(default)]
    pub flight_times: BTreeMap<FlightKey, Vec<u64>>,
}

/// Summary statistics for one delay list
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DelaySummary {
    pub count: usize,
    pub min_ms: u64,
    pub max_ms: u64,
    pub mean_ms: f64,
    pub median_ms: f64,
}

impl DelaySummary {
    pub fn from_delays(delays: &[u64]) -> Option<Self> {
        let mut min: Option<u64> = None;
        let mut max: Option<u64> = None;
        for &d in delays {
            min.update_min(d);
            max.update_max(d);
        }
        Some(Self {
            count: delays.len(),
            min_ms: min?,
            max_ms: max?,
            mean_ms: mean(delays)?,
            median_ms: median(delays)?,
        })
    }
}

impl TimingSnapshot {
    pub fn new(
        ngram_times: BTreeMap<NgramKey, Vec<u64>>,
        dwell_times: BTreeMap<String, Vec<u64>>,
        flight_times: BTreeMap<FlightKey, Vec<u64>>,
    ) -> Self {
        Self {
            ngram_times,
            dwell_times,
            flight_times,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.ngram_times.is_empty() && self.dwell_times.is_empty() && self.flight_times.is_empty()
    }

    /// Total n-gram samples across all keys
    pub fn ngram_sample_count(&self) -> usize {
        self.ngram_times.values().map(Vec::len).sum()
    }

    /// Serialize in the requested shape as pretty JSON
    pub fn to_json(&self, format: ExportFormat) -> Result<String, serde_json::Error> {
        match format {
            ExportFormat::Minimal => serde_json::to_string_pretty(&self.ngram_times),
            ExportFormat::Full => serde_json::to_string_pretty(self),
        }
    }

    /// Parse either JSON shape back into a snapshot
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        let value: Value = serde_json::from_str(json)?;
        let is_full = value
            .as_object()
            .map(|obj| obj.contains_key("ngram_times"))
            .unwrap_or(false);
        if is_full {
            serde_json::from_value(value)
        } else {
            Ok(Self {
                ngram_times: serde_json::from_value(value)?,
                ..Self::default()
            })
        }
    }

    /// Summaries for every pair (order 1) n-gram with at least `min_samples`
    pub fn pair_summaries(&self, min_samples: usize) -> Vec<(&NgramKey, DelaySummary)> {
        self.ngram_times
            .iter()
            .filter(|(key, delays)| key.order() == 1 && delays.len() >= min_samples)
            .filter_map(|(key, delays)| DelaySummary::from_delays(delays).map(|s| (key, s)))
            .collect()
    }

    /// Slowest pairs by mean delay, at most `limit`
    pub fn slowest_pairs(&self, limit: usize, min_samples: usize) -> Vec<(&NgramKey, DelaySummary)> {
        let mut pairs = self.pair_summaries(min_samples);
        pairs.sort_by(|a, b| b.1.mean_ms.total_cmp(&a.1.mean_ms));
        pairs.truncate(limit);
        pairs
    }

    /// Fastest pairs by mean delay, at most `limit`
    pub fn fastest_pairs(&self, limit: usize, min_samples: usize) -> Vec<(&NgramKey, DelaySummary)> {
        let mut pairs = self.pair_summaries(min_samples);
        pairs.sort_by(|a, b| a.1.mean_ms.total_cmp(&b.1.mean_ms));
        pairs.truncate(limit);
        pairs
    }

    /// Mean dwell time over every key
    pub fn mean_dwell_ms(&self) -> Option<f64> {
        let all: Vec<u64> = self.dwell_times.values().flatten().copied().collect();
        mean(&all)
    }

    /// Mean flight time over every key pair
    pub fn mean_flight_ms(&self) -> Option<f64> {
        let all: Vec<u64> = self.flight_times.values().flatten().copied().collect();
        mean(&all)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keyboard::{BACKSPACE, LINE_FEED};

    fn sample() -> TimingSnapshot {
        let mut snap = TimingSnapshot::default();
        snap.ngram_times.insert(NgramKey::pair("a", "b"), vec![200, 180]);
        snap.ngram_times
            .insert(NgramKey::new(vec!["a".into(), "b".into()], "c"), vec![90]);
        snap.ngram_times.insert(NgramKey::pair(BACKSPACE, LINE_FEED), vec![300]);
        snap.dwell_times.insert(LINE_FEED.to_string(), vec![70]);
        snap.flight_times.insert(FlightKey::new("a", "b"), vec![40, 60]);
        snap
    }

    #[test]
    fn minimal_shape_is_flat() {
        let json = TimingSnapshot {
            ngram_times: BTreeMap::from([(NgramKey::pair("a", "b"), vec![200])]),
            ..Default::default()
        }
        .to_json(ExportFormat::Minimal)
        .unwrap();
        let value: Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value, serde_json::json!({ "a->b": [200] }));
    }

    #[test]
    fn full_shape_has_three_maps() {
        let json = sample().to_json(ExportFormat::Full).unwrap();
        let value: Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["ngram_times"]["a->b"], serde_json::json!([200, 180]));
        assert_eq!(value["ngram_times"]["a\u{1f}b->c"], serde_json::json!([90]));
        assert_eq!(value["dwell_times"]["\n"], serde_json::json!([70]));
        assert_eq!(value["flight_times"]["a->b"], serde_json::json!([40, 60]));
    }

    #[test]
    fn full_round_trip_keeps_markers() {
        let snap = sample();
        let json = snap.to_json(ExportFormat::Full).unwrap();
        assert_eq!(TimingSnapshot::from_json(&json).unwrap(), snap);
    }

    #[test]
    fn minimal_round_trip_drops_dwell_and_flight() {
        let snap = sample();
        let json = snap.to_json(ExportFormat::Minimal).unwrap();
        let parsed = TimingSnapshot::from_json(&json).unwrap();
        assert_eq!(parsed.ngram_times, snap.ngram_times);
        assert!(parsed.dwell_times.is_empty());
        assert!(parsed.flight_times.is_empty());
    }

    #[test]
    fn malformed_keys_fail_to_parse() {
        assert!(TimingSnapshot::from_json(r#"{ "nokey": [1] }"#).is_err());
    }

    #[test]
    fn summaries_and_rankings() {
        let snap = sample();
        let summary = DelaySummary::from_delays(&[200, 180]).unwrap();
        assert_eq!(summary.count, 2);
        assert_eq!(summary.min_ms, 180);
        assert_eq!(summary.max_ms, 200);
        assert_eq!(summary.mean_ms, 190.0);
        assert!(DelaySummary::from_delays(&[]).is_none());

        let slowest = snap.slowest_pairs(1, 1);
        assert_eq!(slowest[0].0, &NgramKey::pair(BACKSPACE, LINE_FEED));
        let fastest = snap.fastest_pairs(5, 1);
        assert_eq!(fastest.len(), 2);
        assert_eq!(fastest[0].0, &NgramKey::pair("a", "b"));
        // order-2 contexts are not pairs
        assert!(snap.pair_summaries(1).iter().all(|(k, _)| k.order() == 1));
        assert_eq!(snap.pair_summaries(2).len(), 1);
    }

    #[test]
    fn dwell_and_flight_means() {
        let snap = sample();
        assert_eq!(snap.mean_dwell_ms(), Some(70.0));
        assert_eq!(snap.mean_flight_ms(), Some(50.0));
        assert_eq!(TimingSnapshot::default().mean_dwell_ms(), None);
        assert_eq!(snap.ngram_sample_count(), 4);
    }

    #[test]
    fn imported_huge_delays_summarize() {
        let json = r#"{"a->b": [18446744073709551615, 18446744073709551615]}"#;
        let snap = TimingSnapshot::from_json(json).unwrap();
        let summaries = snap.pair_summaries(1);
        assert_eq!(summaries.len(), 1);
        assert_eq!(summaries[0].1.median_ms, u64::MAX as f64);
    }
}
