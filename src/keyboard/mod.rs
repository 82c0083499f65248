//! Keyboard events, key identifiers and event sources

mod event;
pub mod keymap;

pub use event::{KeyEvent, KeyEventSource, KeyEventType, ReplayLog};
pub use keymap::{
    display_label, from_terminal_key, is_printable, normalize_key, ARROW, BACKSPACE,
    CONTEXT_SEPARATOR, EMPTY_KEY, LINE_FEED,
};
