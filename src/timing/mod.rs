//! Keystroke timing capture and n-gram aggregation

mod aggregator;
mod context;
mod snapshot;
mod store;

#[cfg(test)]
pub(crate) mod test_helpers;

pub use aggregator::{round_ms, GapVerdict, TimingAggregator};
pub use context::ContextBuffer;
pub use snapshot::{DelaySummary, ExportFormat, TimingSnapshot};
pub use store::{FlightKey, KeyParseError, NgramKey, TimingStore};
