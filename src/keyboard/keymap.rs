//! Key identifier normalization and terminal key mapping
//!
//! Every key that reaches the timing aggregator is a plain string identifier.
//! Printable characters identify themselves, Enter and Backspace map to the
//! symbolic markers below, and named keys keep their name (`"Tab"`,
//! `"ArrowLeft"`, ...).

use crossterm::event::KeyCode as TermKeyCode;

/// Identifier of the submit key (Enter)
pub const LINE_FEED: &str = "\n";

/// Identifier of the Backspace key
pub const BACKSPACE: &str = "\u{2408}";

/// Separator between context keys in exported n-gram keys (ASCII unit separator)
pub const CONTEXT_SEPARATOR: char = '\u{1f}';

/// Separator between the context and the next key in exported keys
pub const ARROW: &str = "->";

/// Identifier of a key reported without a name
pub const EMPTY_KEY: &str = "<empty>";

/// Normalize a raw key name into a key identifier.
///
/// The result is never empty and never contains [`CONTEXT_SEPARATOR`] or
/// [`ARROW`], so exported composite keys can always be split back apart.
/// Normalizing an identifier again leaves it unchanged.
pub fn normalize_key(raw: &str) -> String {
    match raw {
        "" => return EMPTY_KEY.to_string(),
        "Enter" | "Return" | "\r" | "\n" | "\r\n" => return LINE_FEED.to_string(),
        "Backspace" => return BACKSPACE.to_string(),
        _ => {}
    }

    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        if c.is_control() {
            out.push_str(&format!("<U+{:04X}>", c as u32));
        } else {
            out.push(c);
        }
    }
    // "->" cannot occur in a single character, only in odd named keys
    out.replace(ARROW, "\u{2192}")
}

/// Map a terminal key code to a normalized key identifier.
///
/// Returns `None` for keys that carry no identifier (modifier-only events,
/// media keys, ...).
pub fn from_terminal_key(code: TermKeyCode) -> Option<String> {
    let raw = match code {
        TermKeyCode::Char(c) => return Some(normalize_key(&c.to_string())),
        TermKeyCode::Enter => "Enter",
        TermKeyCode::Backspace => "Backspace",
        TermKeyCode::Tab => "Tab",
        TermKeyCode::BackTab => "BackTab",
        TermKeyCode::Left => "ArrowLeft",
        TermKeyCode::Right => "ArrowRight",
        TermKeyCode::Up => "ArrowUp",
        TermKeyCode::Down => "ArrowDown",
        TermKeyCode::Home => "Home",
        TermKeyCode::End => "End",
        TermKeyCode::PageUp => "PageUp",
        TermKeyCode::PageDown => "PageDown",
        TermKeyCode::Delete => "Delete",
        TermKeyCode::Insert => "Insert",
        TermKeyCode::Esc => "Escape",
        TermKeyCode::F(n) => return Some(format!("F{}", n)),
        _ => return None,
    };
    Some(normalize_key(raw))
}

/// Whether the identifier stands for a single typed character
pub fn is_printable(key: &str) -> bool {
    let mut chars = key.chars();
    matches!((chars.next(), chars.next()), (Some(c), None) if !c.is_control())
        && key != BACKSPACE
}

/// Human readable label for a key identifier, used by the results view
pub fn display_label(key: &str) -> String {
    match key {
        LINE_FEED => "\u{23ce}".to_string(),
        BACKSPACE => "\u{232b}".to_string(),
        " " => "\u{2423}".to_string(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn enter_and_backspace_become_markers() {
        assert_eq!(normalize_key("Enter"), LINE_FEED);
        assert_eq!(normalize_key("Backspace"), BACKSPACE);
    }

    #[test]
    fn printable_keys_pass_through() {
        assert_eq!(normalize_key("a"), "a");
        assert_eq!(normalize_key(","), ",");
        assert_eq!(normalize_key(" "), " ");
        assert_eq!(normalize_key("ArrowLeft"), "ArrowLeft");
    }

    #[test]
    fn control_characters_are_escaped() {
        assert_eq!(normalize_key("\u{1f}"), "<U+001F>");
        assert_eq!(normalize_key("\t"), "<U+0009>");
        assert!(!normalize_key("\u{1f}").contains(CONTEXT_SEPARATOR));
    }

    #[test]
    fn empty_name_gets_marker() {
        assert_eq!(normalize_key(""), EMPTY_KEY);
        assert_eq!(normalize_key(EMPTY_KEY), EMPTY_KEY);
    }

    #[test]
    fn normalizing_twice_is_stable() {
        for raw in ["a", "Enter", "Backspace", "\u{1f}", "x->y", "", "\t", "F5"] {
            let once = normalize_key(raw);
            assert_eq!(normalize_key(&once), once, "raw {:?}", raw);
        }
    }

    #[test]
    fn arrow_sequence_is_rewritten() {
        let key = normalize_key("odd->name");
        assert!(!key.contains(ARROW));
        // single dash and gt stay intact
        assert_eq!(normalize_key("-"), "-");
        assert_eq!(normalize_key(">"), ">");
    }

    #[test]
    fn terminal_keys_map_to_identifiers() {
        assert_eq!(from_terminal_key(TermKeyCode::Char('x')), Some("x".to_string()));
        assert_eq!(from_terminal_key(TermKeyCode::Enter), Some(LINE_FEED.to_string()));
        assert_eq!(from_terminal_key(TermKeyCode::Backspace), Some(BACKSPACE.to_string()));
        assert_eq!(from_terminal_key(TermKeyCode::Left), Some("ArrowLeft".to_string()));
        assert_eq!(from_terminal_key(TermKeyCode::F(5)), Some("F5".to_string()));
        assert_eq!(from_terminal_key(TermKeyCode::Null), None);
    }

    #[test]
    fn printable_detection() {
        assert!(is_printable("a"));
        assert!(is_printable(" "));
        assert!(is_printable("\u{e9}"));
        assert!(!is_printable(LINE_FEED));
        assert!(!is_printable(BACKSPACE));
        assert!(!is_printable("Tab"));
        assert!(!is_printable(""));
    }

    #[test]
    fn labels_for_markers() {
        assert_eq!(display_label(LINE_FEED), "\u{23ce}");
        assert_eq!(display_label(" "), "\u{2423}");
        assert_eq!(display_label("q"), "q");
    }
}
