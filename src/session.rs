//! Typing session: prompts, submissions and per-line statistics
//!
//! A session walks through a fixed list of prompts. Every key event feeds
//! the [`TimingAggregator`]; Enter submits the current input, skipping
//! records a marker instead. Both close the line so no delay is measured
//! across prompts. Once the last prompt is done the session is ended and
//! ignores further events.

use crate::config::TimingConfig;
use crate::keyboard::{is_printable, normalize_key, KeyEvent, KeyEventSource, KeyEventType, BACKSPACE, LINE_FEED};
use crate::prompts::PromptPool;
use crate::timing::{TimingAggregator, TimingSnapshot};
use crate::utils::mean_f64;
use log::debug;
use serde::{Deserialize, Serialize};
use std::io;
use thiserror::Error;

/// Entry recorded in the typed lines for a skipped prompt
pub const SKIP_MARKER: &str = "[skipped]";

/// Errors starting a session
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("no prompts available")]
    EmptyPromptPool,
    #[error("could not read prompts: {0}")]
    Prompts(#[from] io::Error),
}

/// Result of feeding a key press to the session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineProgress {
    /// Session already ended, nothing changed
    Ignored,
    /// Key was recorded within the current line
    Typing,
    /// Line was submitted or skipped, more prompts remain
    Advanced,
    /// The last line was submitted or skipped
    Finished,
}

/// Statistics for one submitted line
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineStats {
    /// Characters in the submitted (trimmed) text
    pub chars: usize,
    /// Time from the first key press of the line to submit
    pub elapsed_ms: f64,
    /// Words per minute, five characters per word
    pub wpm: f64,
    /// Fraction of positions matching the prompt
    pub accuracy: f64,
}

impl LineStats {
    pub fn compute(target: &str, typed: &str, elapsed_ms: f64) -> Self {
        let chars = typed.chars().count();
        let wpm = if elapsed_ms > 0.0 {
            (chars as f64 / 5.0) / (elapsed_ms / 60_000.0)
        } else {
            0.0
        };
        Self {
            chars,
            elapsed_ms,
            wpm,
            accuracy: accuracy(target, typed),
        }
    }
}

/// Position-wise matches over the longer of the two lengths
pub fn accuracy(target: &str, typed: &str) -> f64 {
    let longest = target.chars().count().max(typed.chars().count());
    if longest == 0 {
        return 1.0;
    }
    let matches = target
        .chars()
        .zip(typed.chars())
        .filter(|(a, b)| a == b)
        .count();
    matches as f64 / longest as f64
}

/// Aggregate results of a session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionSummary {
    pub lines_submitted: usize,
    pub lines_skipped: usize,
    pub mean_wpm: Option<f64>,
    pub mean_accuracy: Option<f64>,
    pub ngram_samples: usize,
    pub rejected_gaps: u64,
}

/// One run through a list of prompts
#[derive(Debug, Clone)]
pub struct Session {
    target_lines: Vec<String>,
    current_index: usize,
    typed_lines: Vec<String>,
    input: String,
    ended: bool,
    aggregator: TimingAggregator,
    line_stats: Vec<LineStats>,
    /// First key press of the current line
    line_started_at: Option<f64>,
}

impl Session {
    /// Session over explicit prompts; an empty list is ended from the start
    pub fn new(target_lines: Vec<String>, config: TimingConfig) -> Self {
        let ended = target_lines.is_empty();
        Self {
            target_lines,
            current_index: 0,
            typed_lines: Vec::new(),
            input: String::new(),
            ended,
            aggregator: TimingAggregator::new(config),
            line_stats: Vec::new(),
            line_started_at: None,
        }
    }

    /// Draw `lines_to_type` prompts from the pool
    pub fn start(
        pool: &PromptPool,
        lines_to_type: usize,
        config: TimingConfig,
    ) -> Result<Self, SessionError> {
        if pool.is_empty() {
            return Err(SessionError::EmptyPromptPool);
        }
        let lines = pool.select_random(lines_to_type);
        debug!("starting session with {} prompts", lines.len());
        Ok(Self::new(lines, config))
    }

    /// Fresh session with new prompts and empty stores
    pub fn restart(&self, pool: &PromptPool) -> Result<Self, SessionError> {
        let lines_to_type = self.target_lines.len().max(1);
        debug!("restarting session");
        Self::start(pool, lines_to_type, *self.aggregator.config())
    }

    /// Handle a key press at `now` (milliseconds)
    pub fn key_down(&mut self, key: &str, now: f64) -> LineProgress {
        self.press(key, now, false)
    }

    /// Handle an auto-repeat of a held key; edits the line like a press
    pub fn key_repeat(&mut self, key: &str, now: f64) -> LineProgress {
        self.press(key, now, true)
    }

    fn press(&mut self, key: &str, now: f64, repeat: bool) -> LineProgress {
        if self.ended {
            return LineProgress::Ignored;
        }

        let key = normalize_key(key);
        let key = key.as_str();
        if repeat {
            self.aggregator.record_key_repeat(key, now);
        } else {
            self.aggregator.record_key_down(key, now);
        }
        if self.line_started_at.is_none() {
            self.line_started_at = Some(now);
        }

        if key == LINE_FEED {
            let typed = self.input.trim().to_string();
            let elapsed = now - self.line_started_at.unwrap_or(now);
            let stats = LineStats::compute(self.current_prompt().unwrap_or(""), &typed, elapsed);
            debug!(
                "line {} submitted: {:.0} wpm, {:.0}% accuracy",
                self.current_index + 1,
                stats.wpm,
                stats.accuracy * 100.0
            );
            self.line_stats.push(stats);
            return self.finish_line(typed);
        }

        if key == BACKSPACE {
            self.input.pop();
        } else if is_printable(key) {
            self.input.push_str(key);
        }
        LineProgress::Typing
    }

    /// Handle a key release at `now` (milliseconds)
    pub fn key_up(&mut self, key: &str, now: f64) {
        if self.ended {
            return;
        }
        self.aggregator.record_key_up(key, now);
    }

    /// Skip the current prompt
    pub fn skip_line(&mut self) -> LineProgress {
        if self.ended {
            return LineProgress::Ignored;
        }
        debug!("line {} skipped", self.current_index + 1);
        self.finish_line(SKIP_MARKER.to_string())
    }

    fn finish_line(&mut self, entry: String) -> LineProgress {
        self.aggregator.end_line();
        self.typed_lines.push(entry);
        self.input.clear();
        self.line_started_at = None;
        self.current_index += 1;

        if self.current_index >= self.target_lines.len() {
            self.ended = true;
            debug!("session finished after {} lines", self.typed_lines.len());
            LineProgress::Finished
        } else {
            LineProgress::Advanced
        }
    }

    /// Dispatch a key event
    pub fn process_event(&mut self, event: &KeyEvent) -> LineProgress {
        match event.event_type {
            KeyEventType::Press => self.key_down(&event.key, event.timestamp_ms),
            KeyEventType::Repeat => self.key_repeat(&event.key, event.timestamp_ms),
            KeyEventType::Release => {
                if self.ended {
                    return LineProgress::Ignored;
                }
                self.key_up(&event.key, event.timestamp_ms);
                LineProgress::Typing
            }
        }
    }

    /// Feed every event of a source, in order
    pub fn replay<S: KeyEventSource + ?Sized>(&mut self, source: &S) -> LineProgress {
        let mut last = LineProgress::Ignored;
        for event in source.events() {
            last = self.process_event(&event);
        }
        last
    }

    pub fn current_prompt(&self) -> Option<&str> {
        self.target_lines.get(self.current_index).map(String::as_str)
    }

    pub fn current_index(&self) -> usize {
        self.current_index
    }

    pub fn target_lines(&self) -> &[String] {
        &self.target_lines
    }

    pub fn typed_lines(&self) -> &[String] {
        &self.typed_lines
    }

    /// Text typed so far on the current line
    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn is_ended(&self) -> bool {
        self.ended
    }

    pub fn aggregator(&self) -> &TimingAggregator {
        &self.aggregator
    }

    pub fn line_stats(&self) -> &[LineStats] {
        &self.line_stats
    }

    /// Owned copy of the recorded timings
    pub fn snapshot(&self) -> TimingSnapshot {
        self.aggregator.snapshot()
    }

    pub fn summary(&self) -> SessionSummary {
        let wpm: Vec<f64> = self.line_stats.iter().map(|s| s.wpm).collect();
        let acc: Vec<f64> = self.line_stats.iter().map(|s| s.accuracy).collect();
        SessionSummary {
            lines_submitted: self.line_stats.len(),
            lines_skipped: self.typed_lines.iter().filter(|l| *l == SKIP_MARKER).count(),
            mean_wpm: mean_f64(&wpm),
            mean_accuracy: mean_f64(&acc),
            ngram_samples: self.aggregator.ngrams().sample_count(),
            rejected_gaps: self.aggregator.rejected_gaps(),
        }
    }
}
