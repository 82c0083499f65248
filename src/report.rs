//! Session report and export functionality

use crate::config::TimingConfig;
use crate::session::{LineStats, Session, SessionSummary};
use crate::timing::{ExportFormat, TimingSnapshot};
use chrono::{DateTime, Utc};
use log::info;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Error writing an export
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("no active session")]
    NoSession,
}

/// Complete session report
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionReport {
    /// Report metadata
    pub metadata: ReportMetadata,
    /// Summary statistics
    pub summary: SessionSummary,
    /// Prompts shown, in order
    pub target_lines: Vec<String>,
    /// Submitted text or skip markers, in order
    pub typed_lines: Vec<String>,
    /// Per submitted line statistics
    pub line_stats: Vec<LineStats>,
    /// Recorded timings
    pub timings: TimingSnapshot,
}

/// Report metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportMetadata {
    /// Report generation timestamp
    pub generated_at: String,
    /// Application version
    pub version: String,
    /// Thresholds the timings were recorded with
    pub timing: TimingConfig,
}

impl SessionReport {
    /// Create a report from the current state of a session
    pub fn new(session: &Session) -> Self {
        let now: DateTime<Utc> = Utc::now();

        Self {
            metadata: ReportMetadata {
                generated_at: now.to_rfc3339(),
                version: env!("CARGO_PKG_VERSION").to_string(),
                timing: *session.aggregator().config(),
            },
            summary: session.summary(),
            target_lines: session.target_lines().to_vec(),
            typed_lines: session.typed_lines().to_vec(),
            line_stats: session.line_stats().to_vec(),
            timings: session.snapshot(),
        }
    }

    /// Export report to JSON file
    pub fn export_json(&self, path: &Path) -> Result<(), ExportError> {
        fs::write(path, self.to_json()?)?;
        info!("exported session report to {}", path.display());
        Ok(())
    }

    /// Export report to JSON string
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

/// Write a timing snapshot to `dir/filename` and return the written path
pub fn export_timings(
    snapshot: &TimingSnapshot,
    dir: &Path,
    filename: &str,
    format: ExportFormat,
) -> Result<PathBuf, ExportError> {
    if !dir.exists() {
        fs::create_dir_all(dir)?;
    }
    let path = dir.join(filename);
    fs::write(&path, snapshot.to_json(format)?)?;
    info!(
        "exported {} n-gram keys to {}",
        snapshot.ngram_times.len(),
        path.display()
    );
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keyboard::LINE_FEED;
    use crate::timing::NgramKey;
    use std::env;

    fn finished_session() -> Session {
        let mut session = Session::new(vec!["ab".to_string()], TimingConfig::default());
        session.key_down("a", 0.0);
        session.key_up("a", 60.0);
        session.key_down("b", 150.0);
        session.key_down(LINE_FEED, 400.0);
        session
    }

    fn temp_dir(tag: &str) -> PathBuf {
        env::temp_dir().join(format!("keystroke-timing-{}-{}", tag, std::process::id()))
    }

    #[test]
    fn report_captures_session() {
        let report = SessionReport::new(&finished_session());
        assert_eq!(report.typed_lines, vec!["ab".to_string()]);
        assert_eq!(report.summary.lines_submitted, 1);
        assert_eq!(report.metadata.timing.gap_ms, 1000);
        assert_eq!(report.timings.ngram_times[&NgramKey::pair("a", "b")], vec![150]);
        assert!(!report.metadata.generated_at.is_empty());
    }

    #[test]
    fn report_json_contains_sections() {
        let json = SessionReport::new(&finished_session()).to_json().unwrap();
        assert!(json.contains("\"metadata\""));
        assert!(json.contains("\"ngram_times\""));
        assert!(json.contains("\"a->b\""));
        assert!(json.contains("\"typed_lines\""));
    }

    #[test]
    fn export_report_writes_file() {
        let dir = temp_dir("report");
        fs::create_dir_all(&dir).unwrap();
        let path = dir.join("report.json");
        SessionReport::new(&finished_session())
            .export_json(&path)
            .unwrap();
        assert!(path.exists());
        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn export_timings_round_trips() {
        let dir = temp_dir("timings");
        let snapshot = finished_session().snapshot();

        let path = export_timings(&snapshot, &dir, "typing-pair-timings.json", ExportFormat::Full)
            .unwrap();
        let parsed = TimingSnapshot::from_json(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(parsed, snapshot);

        let path = export_timings(&snapshot, &dir, "minimal.json", ExportFormat::Minimal).unwrap();
        let parsed = TimingSnapshot::from_json(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(parsed.ngram_times, snapshot.ngram_times);
        assert!(parsed.dwell_times.is_empty());

        let _ = fs::remove_dir_all(&dir);
    }
}
