//! Keyboard event types and event sources

use super::keymap::normalize_key;
use serde::{Deserialize, Deserializer, Serialize};
use std::fs;
use std::io;
use std::path::Path;

/// Type of keyboard event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KeyEventType {
    /// Key was pressed down
    Press,
    /// Auto-repeat while the key is held
    Repeat,
    /// Key was released
    Release,
}

/// A keyboard event with timing information
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeyEvent {
    /// Normalized key identifier, re-normalized when read back from JSON
    #[serde(deserialize_with = "deserialize_key")]
    pub key: String,
    /// Type of event (press/release)
    pub event_type: KeyEventType,
    /// Monotonic timestamp in milliseconds
    pub timestamp_ms: f64,
}

impl KeyEvent {
    pub fn new(key: impl Into<String>, event_type: KeyEventType, timestamp_ms: f64) -> Self {
        Self {
            key: key.into(),
            event_type,
            timestamp_ms,
        }
    }

    /// Build a press event from a raw key name, normalizing it
    pub fn press(raw_key: &str, timestamp_ms: f64) -> Self {
        Self::new(normalize_key(raw_key), KeyEventType::Press, timestamp_ms)
    }

    /// Build an auto-repeat event from a raw key name, normalizing it
    pub fn repeat(raw_key: &str, timestamp_ms: f64) -> Self {
        Self::new(normalize_key(raw_key), KeyEventType::Repeat, timestamp_ms)
    }

    /// Build a release event from a raw key name, normalizing it
    pub fn release(raw_key: &str, timestamp_ms: f64) -> Self {
        Self::new(normalize_key(raw_key), KeyEventType::Release, timestamp_ms)
    }

    /// Press or auto-repeat
    pub fn is_press(&self) -> bool {
        self.event_type != KeyEventType::Release
    }
}

fn deserialize_key<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    Ok(normalize_key(&raw))
}

/// A finite, restartable sequence of key events.
///
/// Every call to [`events`](KeyEventSource::events) starts again from the
/// first event, so the same source can be replayed into several sessions.
pub trait KeyEventSource {
    fn events(&self) -> Box<dyn Iterator<Item = KeyEvent> + '_>;
}

impl KeyEventSource for [KeyEvent] {
    fn events(&self) -> Box<dyn Iterator<Item = KeyEvent> + '_> {
        Box::new(self.iter().cloned())
    }
}

impl KeyEventSource for Vec<KeyEvent> {
    fn events(&self) -> Box<dyn Iterator<Item = KeyEvent> + '_> {
        self.as_slice().events()
    }
}

/// Recorded key events that can be saved and replayed later
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReplayLog {
    events: Vec<KeyEvent>,
}

impl ReplayLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an event to the log
    pub fn push(&mut self, event: KeyEvent) {
        self.events.push(event);
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Load a replay log from a JSON file
    pub fn load(path: &Path) -> io::Result<Self> {
        let contents = fs::read_to_string(path)?;
        serde_json::from_str(&contents)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
    }

    /// Save the replay log as pretty-printed JSON
    pub fn save(&self, path: &Path) -> io::Result<()> {
        let json = serde_json::to_string_pretty(self)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
        fs::write(path, json)
    }
}

impl From<Vec<KeyEvent>> for ReplayLog {
    fn from(events: Vec<KeyEvent>) -> Self {
        Self { events }
    }
}

impl KeyEventSource for ReplayLog {
    fn events(&self) -> Box<dyn Iterator<Item = KeyEvent> + '_> {
        self.events.events()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keyboard::{BACKSPACE, EMPTY_KEY, LINE_FEED};
    use std::env;

    #[test]
    fn press_normalizes_key() {
        let event = KeyEvent::press("Enter", 12.5);
        assert_eq!(event.key, LINE_FEED);
        assert!(event.is_press());
        assert_eq!(event.timestamp_ms, 12.5);

        let event = KeyEvent::repeat("Enter", 15.0);
        assert_eq!(event.event_type, KeyEventType::Repeat);
        assert!(event.is_press());

        let event = KeyEvent::release("Backspace", 20.0);
        assert_eq!(event.key, BACKSPACE);
        assert!(!event.is_press());
    }

    #[test]
    fn sources_are_restartable() {
        let log = ReplayLog::from(vec![
            KeyEvent::press("a", 0.0),
            KeyEvent::release("a", 50.0),
        ]);
        assert_eq!(log.events().count(), 2);
        assert_eq!(log.events().count(), 2);
        assert_eq!(log.events().next().map(|e| e.key), Some("a".to_string()));
    }

    #[test]
    fn replay_log_save_and_load() {
        let path = env::temp_dir().join(format!("keystroke-timing-replay-{}.json", std::process::id()));
        let mut log = ReplayLog::new();
        log.push(KeyEvent::press("a", 0.0));
        log.push(KeyEvent::press("Enter", 120.0));

        log.save(&path).expect("save replay log");
        let loaded = ReplayLog::load(&path).expect("load replay log");
        assert_eq!(loaded, log);

        let _ = fs::remove_file(&path);
    }

    #[test]
    fn loaded_keys_are_normalized() {
        let json = r#"{"events":[
            {"key":"","event_type":"press","timestamp_ms":0.0},
            {"key":"a\u001f","event_type":"press","timestamp_ms":10.0},
            {"key":"Enter","event_type":"release","timestamp_ms":20.0}
        ]}"#;
        let log: ReplayLog = serde_json::from_str(json).unwrap();
        let keys: Vec<String> = log.events().map(|e| e.key).collect();
        assert_eq!(keys, vec![EMPTY_KEY.to_string(), "a<U+001F>".to_string(), LINE_FEED.to_string()]);
    }

    #[test]
    fn event_type_serializes_lowercase() {
        let json = serde_json::to_string(&KeyEvent::press("a", 1.0)).unwrap();
        assert!(json.contains("\"press\""));
    }
}
