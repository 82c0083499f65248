//! Keystroke timing aggregator
//!
//! Consumes key presses and releases for one session and builds:
//!
//! - n-gram delay histograms keyed by the preceding context (1..=K keys)
//! - dwell times (press to release) per key
//! - flight times (release to next press) per key pair
//!
//! A press-to-press gap only becomes an n-gram sample when it falls inside
//! the same typing burst (`gap < gap_ms`) and under the hard cap
//! (`gap <= max_ms`). Line boundaries clear the context so pauses between
//! prompts never produce samples.

use super::context::ContextBuffer;
use super::snapshot::TimingSnapshot;
use super::store::{FlightKey, NgramKey, TimingStore};
use crate::config::TimingConfig;
use crate::keyboard::{normalize_key, KeyEvent, KeyEventType, LINE_FEED};
use log::trace;
use std::collections::HashMap;

/// Classification of a press-to-press gap
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GapVerdict {
    /// Recorded as an n-gram sample
    Accepted,
    /// At or above the burst-split threshold
    NewBurst,
    /// Above the hard cap
    OverCap,
    /// Timestamp went backwards
    OutOfOrder,
}

/// Round a millisecond gap to the recorded integer delay
pub fn round_ms(gap_ms: f64) -> u64 {
    gap_ms.round() as u64
}

/// Aggregates key events into timing stores
#[derive(Debug, Clone)]
pub struct TimingAggregator {
    config: TimingConfig,
    /// Last accepted keys of the current line
    context: ContextBuffer,
    /// Timestamp of the previous key press in the current line
    prev_stamp: Option<f64>,
    ngrams: TimingStore<NgramKey>,
    dwell: TimingStore<String>,
    flight: TimingStore<FlightKey>,
    /// Press timestamp and line number of keys currently held
    held: HashMap<String, (f64, u64)>,
    /// Most recent release in the current line, basis for the next flight time
    last_release: Option<(String, f64)>,
    /// Incremented at every line boundary
    line: u64,
    rejected_gaps: u64,
}

impl TimingAggregator {
    pub fn new(config: TimingConfig) -> Self {
        Self {
            context: ContextBuffer::new(config.context_k),
            config,
            prev_stamp: None,
            ngrams: TimingStore::new(),
            dwell: TimingStore::new(),
            flight: TimingStore::new(),
            held: HashMap::new(),
            last_release: None,
            line: 0,
            rejected_gaps: 0,
        }
    }

    pub fn config(&self) -> &TimingConfig {
        &self.config
    }

    /// Classify a press-to-press gap against the burst and cap thresholds
    pub fn classify_gap(&self, gap_ms: f64) -> GapVerdict {
        if gap_ms.is_nan() || gap_ms < 0.0 {
            GapVerdict::OutOfOrder
        } else if gap_ms > self.config.max_ms as f64 {
            GapVerdict::OverCap
        } else if gap_ms >= self.config.gap_ms as f64 {
            GapVerdict::NewBurst
        } else {
            GapVerdict::Accepted
        }
    }

    /// Dispatch a key event to the press or release handler
    pub fn process_event(&mut self, event: &KeyEvent) {
        match event.event_type {
            KeyEventType::Press => self.record_key_down(&event.key, event.timestamp_ms),
            KeyEventType::Repeat => self.record_key_repeat(&event.key, event.timestamp_ms),
            KeyEventType::Release => self.record_key_up(&event.key, event.timestamp_ms),
        }
    }

    /// Record a key press at `now` (milliseconds)
    pub fn record_key_down(&mut self, key: &str, now: f64) {
        self.press(&normalize_key(key), now, false);
    }

    /// Record an auto-repeat of a held key.
    ///
    /// Counts as a keystroke for n-grams but keeps the original press time
    /// for dwell.
    pub fn record_key_repeat(&mut self, key: &str, now: f64) {
        self.press(&normalize_key(key), now, true);
    }

    fn press(&mut self, key: &str, now: f64, repeat: bool) {
        if self.config.capture_dwell_flight {
            if let Some((from, released_at)) = self.last_release.take() {
                if now >= released_at {
                    self.flight
                        .record(FlightKey::new(from, key), round_ms(now - released_at));
                }
            }
            if repeat {
                self.held
                    .entry(key.to_string())
                    .or_insert((now, self.line));
            } else {
                // a fresh press replaces a press whose release was lost
                self.held.insert(key.to_string(), (now, self.line));
            }
        }

        if let Some(prev) = self.prev_stamp {
            let gap = now - prev;
            match self.classify_gap(gap) {
                GapVerdict::Accepted => {
                    trace!("accepted {:.1}ms gap before {:?}", gap, key);
                    self.record_ngrams(key, round_ms(gap));
                }
                verdict => {
                    self.rejected_gaps += 1;
                    trace!("dropped {:.1}ms gap before {:?}: {:?}", gap, key, verdict);
                }
            }
        }

        self.context.push(key);
        self.prev_stamp = Some(now);
    }

    fn record_ngrams(&mut self, key: &str, delay: u64) {
        let exclude_submit = self.config.exclude_submit_key;
        if exclude_submit && key == LINE_FEED {
            return;
        }
        for order in 1..=self.context.len() {
            let context = self.context.suffix(order);
            if exclude_submit && context.iter().any(|k| k == LINE_FEED) {
                continue;
            }
            self.ngrams.record(NgramKey::new(context, key), delay);
        }
    }

    /// Record a key release at `now` (milliseconds)
    pub fn record_key_up(&mut self, key: &str, now: f64) {
        if !self.config.capture_dwell_flight {
            return;
        }
        let key = normalize_key(key);
        let key = key.as_str();
        let Some((pressed_at, line)) = self.held.remove(key) else {
            return;
        };
        if now >= pressed_at {
            self.dwell.record(key.to_string(), round_ms(now - pressed_at));
        }
        if line == self.line {
            self.last_release = Some((key.to_string(), now));
        }
    }

    /// Close the current line: no delay is measured across the boundary
    ///
    /// Keys still held from earlier lines are forgotten; keys pressed on the
    /// closing line may still report their dwell on release.
    pub fn end_line(&mut self) {
        let line = self.line;
        self.held.retain(|_, &mut (_, pressed_line)| pressed_line == line);
        self.context.clear();
        self.prev_stamp = None;
        self.last_release = None;
        self.line += 1;
    }

    /// Discard every recorded timing
    pub fn reset(&mut self) {
        self.context.clear();
        self.prev_stamp = None;
        self.ngrams.clear();
        self.dwell.clear();
        self.flight.clear();
        self.held.clear();
        self.last_release = None;
        self.line = 0;
        self.rejected_gaps = 0;
    }

    /// Owned copy of all stores, unaffected by later events
    pub fn snapshot(&self) -> TimingSnapshot {
        TimingSnapshot::new(
            self.ngrams.to_sorted(),
            self.dwell.to_sorted(),
            self.flight.to_sorted(),
        )
    }

    pub fn ngrams(&self) -> &TimingStore<NgramKey> {
        &self.ngrams
    }

    pub fn dwell_times(&self) -> &TimingStore<String> {
        &self.dwell
    }

    pub fn flight_times(&self) -> &TimingStore<FlightKey> {
        &self.flight
    }

    pub fn context(&self) -> &ContextBuffer {
        &self.context
    }

    pub fn prev_stamp(&self) -> Option<f64> {
        self.prev_stamp
    }

    /// Gaps dropped by the burst/cap filters
    pub fn rejected_gaps(&self) -> u64 {
        self.rejected_gaps
    }
}

impl Default for TimingAggregator {
    fn default() -> Self {
        Self::new(TimingConfig::default())
    }
}
