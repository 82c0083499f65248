//! Main application state and logic

use super::widgets::ResultLine;
use crate::config::Config;
use crate::keyboard::{display_label, KeyEvent};
use crate::prompts::PromptPool;
use crate::report::{export_timings, ExportError, SessionReport};
use crate::session::{LineProgress, Session, SessionError};
use crate::timing::NgramKey;
use log::{info, warn};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

/// Fewest samples a pair needs before it is ranked
const MIN_RANKED_SAMPLES: usize = 2;

/// Current view/tab in the application
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppView {
    Typing,
    Results,
    Help,
}

impl AppView {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Typing => "Typing",
            Self::Results => "Results",
            Self::Help => "Help",
        }
    }

    pub fn all() -> &'static [AppView] {
        &[Self::Typing, Self::Results, Self::Help]
    }

    pub fn index(&self) -> usize {
        match self {
            Self::Typing => 0,
            Self::Results => 1,
            Self::Help => 2,
        }
    }

    pub fn from_index(index: usize) -> Self {
        match index {
            0 => Self::Typing,
            1 => Self::Results,
            _ => Self::Help,
        }
    }
}

/// Application running state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppState {
    Running,
    Quitting,
}

/// Main application
pub struct App {
    /// Current view
    pub view: AppView,
    /// Application state
    pub state: AppState,
    /// Configuration
    pub config: Config,
    /// Prompts sessions are drawn from
    pub pool: PromptPool,
    /// Active session, `None` when no prompts are available
    pub session: Option<Session>,
    /// Application start time, origin of event timestamps
    pub start_time: Instant,
    /// Total events processed
    pub total_events: u64,
    /// Last status message
    pub status_message: Option<String>,
    /// Status message timestamp
    pub status_time: Option<Instant>,
}

impl App {
    pub fn new(config: Config) -> Self {
        let mut status = None;
        let pool = match &config.session.prompts_file {
            Some(path) => PromptPool::from_file(path).unwrap_or_else(|e| {
                warn!("could not read prompts from {}: {}", path.display(), e);
                status = Some(format!("Prompt file unreadable, using bundled sentences ({})", e));
                PromptPool::bundled()
            }),
            None => PromptPool::bundled(),
        };
        Self::with_pool(config, pool, status)
    }

    /// Build the app around an explicit prompt pool
    pub fn with_pool(config: Config, pool: PromptPool, status: Option<String>) -> Self {
        let mut app = Self {
            view: AppView::Typing,
            state: AppState::Running,
            config,
            pool,
            session: None,
            start_time: Instant::now(),
            total_events: 0,
            status_message: None,
            status_time: None,
        };
        app.start_session();
        if let Some(msg) = status {
            app.set_status(msg);
        }
        app
    }

    fn start_session(&mut self) {
        let started = Session::start(
            &self.pool,
            self.config.session.lines_to_type,
            self.config.timing,
        );
        match started {
            Ok(session) => {
                self.session = Some(session);
                self.view = AppView::Typing;
            }
            Err(e) => {
                warn!("session not started: {}", e);
                self.session = None;
                self.set_status(match e {
                    SessionError::EmptyPromptPool => "No prompts available".to_string(),
                    other => other.to_string(),
                });
            }
        }
    }

    /// Milliseconds since the app started
    pub fn now_ms(&self) -> f64 {
        self.start_time.elapsed().as_secs_f64() * 1000.0
    }

    /// Feed a key event to the active session
    pub fn process_event(&mut self, event: &KeyEvent) {
        if self.state != AppState::Running {
            return;
        }
        let Some(session) = self.session.as_mut() else {
            return;
        };

        self.total_events += 1;
        if session.process_event(event) == LineProgress::Finished {
            self.finish();
        }
    }

    fn finish(&mut self) {
        self.view = AppView::Results;
        self.set_status("Session complete - Ctrl+E to export".to_string());
    }

    /// Skip the current prompt
    pub fn skip_line(&mut self) {
        let progress = match self.session.as_mut() {
            Some(session) => session.skip_line(),
            None => return,
        };
        if progress == LineProgress::Finished {
            self.finish();
        }
    }

    /// Replace the session with a fresh one
    pub fn restart(&mut self) {
        self.total_events = 0;
        self.start_session();
        if self.session.is_some() {
            self.set_status("Session restarted".to_string());
        }
    }

    /// Switch to the next view
    pub fn next_view(&mut self) {
        let next = (self.view.index() + 1) % AppView::all().len();
        self.view = AppView::from_index(next);
    }

    /// Switch to the previous view
    pub fn prev_view(&mut self) {
        let current = self.view.index();
        let prev = if current == 0 {
            AppView::all().len() - 1
        } else {
            current - 1
        };
        self.view = AppView::from_index(prev);
    }

    /// Request quit
    pub fn quit(&mut self) {
        self.state = AppState::Quitting;
    }

    /// Set a status message
    pub fn set_status(&mut self, message: String) {
        self.status_message = Some(message);
        self.status_time = Some(Instant::now());
    }

    /// Get status message if still valid (within 3 seconds)
    pub fn get_status(&self) -> Option<&str> {
        match (&self.status_message, self.status_time) {
            (Some(msg), Some(time)) if time.elapsed().as_secs() < 3 => Some(msg),
            _ => None,
        }
    }

    /// "line/total" progress label
    pub fn progress_label(&self) -> String {
        match &self.session {
            Some(s) if s.is_ended() => "done".to_string(),
            Some(s) => format!("{}/{}", s.current_index() + 1, s.target_lines().len()),
            None => "-".to_string(),
        }
    }

    /// Rows for the results view
    pub fn results(&self) -> Vec<ResultLine> {
        let Some(session) = &self.session else {
            return vec![ResultLine::error("Session", "No prompts available")];
        };

        let summary = session.summary();
        let snapshot = session.snapshot();
        let mut results = vec![
            ResultLine::info("Lines Submitted", summary.lines_submitted.to_string()),
            ResultLine::info("Lines Skipped", summary.lines_skipped.to_string()),
        ];

        if let Some(wpm) = summary.mean_wpm {
            results.push(ResultLine::ok("Avg WPM", format!("{:.1}", wpm)));
        }
        if let Some(acc) = summary.mean_accuracy {
            let value = format!("{:.1}%", acc * 100.0);
            results.push(if acc >= 0.95 {
                ResultLine::ok("Accuracy", value)
            } else {
                ResultLine::warning("Accuracy", value)
            });
        }

        results.push(ResultLine::info("N-gram Keys", snapshot.ngram_times.len().to_string()));
        results.push(ResultLine::info("N-gram Samples", summary.ngram_samples.to_string()));
        results.push(ResultLine::info("Dropped Gaps", summary.rejected_gaps.to_string()));

        if let Some(dwell) = snapshot.mean_dwell_ms() {
            results.push(ResultLine::info("Avg Dwell", format!("{:.0} ms", dwell)));
        }
        if let Some(flight) = snapshot.mean_flight_ms() {
            results.push(ResultLine::info("Avg Flight", format!("{:.0} ms", flight)));
        }

        for (key, stats) in snapshot.fastest_pairs(3, MIN_RANKED_SAMPLES) {
            results.push(ResultLine::ok(
                "Fast Pair",
                format!("{}: {:.0} ms (n={})", pair_label(key), stats.mean_ms, stats.count),
            ));
        }
        for (key, stats) in snapshot.slowest_pairs(3, MIN_RANKED_SAMPLES) {
            results.push(ResultLine::warning(
                "Slow Pair",
                format!("{}: {:.0} ms (n={})", pair_label(key), stats.mean_ms, stats.count),
            ));
        }

        for (i, line) in session.typed_lines().iter().enumerate() {
            results.push(ResultLine::info(format!("Line {}", i + 1), line.clone()));
        }

        results
    }

    /// Get elapsed time formatted
    pub fn elapsed_formatted(&self) -> String {
        let secs = self.start_time.elapsed().as_secs();
        format!("{:02}:{:02}", secs / 60, secs % 60)
    }

    /// Write the timing snapshot to the configured export target
    pub fn export_timings(&mut self) -> Result<PathBuf, ExportError> {
        let Some(session) = &self.session else {
            self.set_status("Nothing to export".to_string());
            return Err(ExportError::NoSession);
        };
        let export = &self.config.export;
        let result = export_timings(
            &session.snapshot(),
            &export.target_dir(),
            &export.filename,
            export.format,
        );
        match &result {
            Ok(path) => self.set_status(format!("Exported to {}", path.display())),
            Err(e) => self.set_status(format!("Export failed: {}", e)),
        }
        result
    }

    /// Export the full session report to a JSON file, creating its directory
    pub fn export_report(&mut self, path: &Path) -> Result<(), ExportError> {
        let Some(session) = &self.session else {
            self.set_status("Nothing to export".to_string());
            return Err(ExportError::NoSession);
        };
        let report = SessionReport::new(session);
        let result = match path.parent() {
            Some(dir) if !dir.as_os_str().is_empty() => fs::create_dir_all(dir).map_err(ExportError::from),
            _ => Ok(()),
        }
        .and_then(|_| report.export_json(path));
        match &result {
            Ok(()) => {
                info!("report written to {}", path.display());
                self.set_status(format!("Report saved to {}", path.display()));
            }
            Err(e) => self.set_status(format!("Report failed: {}", e)),
        }
        result
    }
}

/// Readable "x -> y" label for a pair key
fn pair_label(key: &NgramKey) -> String {
    let context: Vec<String> = key.context().iter().map(|k| display_label(k)).collect();
    format!("{} -> {}", context.join(""), display_label(key.key()))
}

impl Default for App {
    fn default() -> Self {
        Self::new(Config::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keyboard::LINE_FEED;
    use std::env;

    fn app_with(lines: &str) -> App {
        let mut config = Config::default();
        config.session.lines_to_type = 5;
        App::with_pool(config, PromptPool::from_text(lines), None)
    }

    #[test]
    fn view_cycling_wraps() {
        let mut app = app_with("one");
        assert_eq!(app.view, AppView::Typing);
        app.next_view();
        assert_eq!(app.view, AppView::Results);
        app.next_view();
        app.next_view();
        assert_eq!(app.view, AppView::Typing);
        app.prev_view();
        assert_eq!(app.view, AppView::Help);
    }

    #[test]
    fn empty_pool_is_reported_not_fatal() {
        let mut app = app_with("");
        assert!(app.session.is_none());
        assert_eq!(app.get_status(), Some("No prompts available"));

        app.process_event(&KeyEvent::press("a", 0.0));
        assert_eq!(app.total_events, 0);
        assert_eq!(app.progress_label(), "-");
    }

    #[test]
    fn finishing_switches_to_results() {
        let mut app = app_with("ok");
        app.process_event(&KeyEvent::press("o", 0.0));
        app.process_event(&KeyEvent::press("k", 100.0));
        app.process_event(&KeyEvent::press("Enter", 200.0));

        assert_eq!(app.view, AppView::Results);
        assert_eq!(app.progress_label(), "done");
        let results = app.results();
        assert!(results.iter().any(|r| r.label == "Lines Submitted" && r.value == "1"));
        assert!(results.iter().any(|r| r.label == "Line 1" && r.value == "ok"));
    }

    #[test]
    fn skip_and_restart() {
        let mut app = app_with("one\ntwo");
        assert_eq!(app.progress_label(), "1/2");
        app.skip_line();
        assert_eq!(app.progress_label(), "2/2");
        app.skip_line();
        assert_eq!(app.view, AppView::Results);

        app.restart();
        assert_eq!(app.view, AppView::Typing);
        assert_eq!(app.progress_label(), "1/2");
        assert!(app.session.as_ref().unwrap().typed_lines().is_empty());
    }

    #[test]
    fn quitting_stops_processing() {
        let mut app = app_with("one");
        app.quit();
        app.process_event(&KeyEvent::press(LINE_FEED, 0.0));
        assert_eq!(app.total_events, 0);
    }

    #[test]
    fn exports_without_session_fail_alike() {
        let mut app = app_with("");
        let path = env::temp_dir().join(format!("keystroke-timing-nosession-{}.json", std::process::id()));

        assert!(matches!(app.export_timings(), Err(ExportError::NoSession)));
        assert!(matches!(app.export_report(&path), Err(ExportError::NoSession)));
        assert_eq!(app.get_status(), Some("Nothing to export"));
        assert!(!path.exists());
    }

    #[test]
    fn export_report_creates_directory() {
        let dir = env::temp_dir().join(format!("keystroke-timing-app-report-{}", std::process::id()));
        let path = dir.join("nested").join("report.json");
        let mut app = app_with("one");

        app.export_report(&path).unwrap();
        assert!(path.exists());
        assert!(app.get_status().unwrap_or("").starts_with("Report saved"));

        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn pair_labels_are_readable() {
        assert_eq!(pair_label(&NgramKey::pair("a", LINE_FEED)), "a -> \u{23ce}");
    }
}
