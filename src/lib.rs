//! Keystroke Timing - typing-practice prompts with keystroke timing capture
//!
//! Records how long a typist takes between consecutive keys, keyed by the
//! preceding keys (n-gram context), along with key hold and flight times.
//! Timings can be exported as JSON for later analysis.

pub mod config;
pub mod keyboard;
pub mod prompts;
pub mod report;
pub mod session;
pub mod timing;
pub mod ui;
pub mod utils;

pub use config::Config;
pub use session::Session;
pub use timing::{TimingAggregator, TimingSnapshot};
