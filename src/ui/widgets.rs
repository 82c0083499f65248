//! Custom TUI widgets

use super::theme::ThemeColors;
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Widget, Wrap},
};

/// Status of a result row
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResultStatus {
    Ok,
    Warning,
    Error,
    Info,
}

/// A single labelled row in the results view
#[derive(Debug, Clone)]
pub struct ResultLine {
    pub label: String,
    pub value: String,
    pub status: ResultStatus,
}

impl ResultLine {
    pub fn new(label: impl Into<String>, value: impl Into<String>, status: ResultStatus) -> Self {
        Self {
            label: label.into(),
            value: value.into(),
            status,
        }
    }

    pub fn ok(label: impl Into<String>, value: impl Into<String>) -> Self {
        Self::new(label, value, ResultStatus::Ok)
    }

    pub fn warning(label: impl Into<String>, value: impl Into<String>) -> Self {
        Self::new(label, value, ResultStatus::Warning)
    }

    pub fn error(label: impl Into<String>, value: impl Into<String>) -> Self {
        Self::new(label, value, ResultStatus::Error)
    }

    pub fn info(label: impl Into<String>, value: impl Into<String>) -> Self {
        Self::new(label, value, ResultStatus::Info)
    }
}

/// Current prompt with the typed input laid over it
pub struct PromptPanel<'a> {
    prompt: Option<&'a str>,
    input: &'a str,
    progress: &'a str,
    colors: ThemeColors,
}

impl<'a> PromptPanel<'a> {
    pub fn new(prompt: Option<&'a str>, input: &'a str, progress: &'a str, colors: ThemeColors) -> Self {
        Self {
            prompt,
            input,
            progress,
            colors,
        }
    }

    /// One span per prompt character, colored by what was typed at that position
    fn prompt_spans(&self, prompt: &'a str) -> Vec<Span<'a>> {
        let typed: Vec<char> = self.input.chars().collect();
        let mut spans: Vec<Span> = prompt
            .chars()
            .enumerate()
            .map(|(i, expected)| {
                let style = match typed.get(i) {
                    Some(&c) if c == expected => Style::default().fg(self.colors.correct),
                    Some(_) => Style::default()
                        .fg(self.colors.incorrect)
                        .add_modifier(Modifier::UNDERLINED),
                    None if i == typed.len() => Style::default()
                        .fg(self.colors.text)
                        .add_modifier(Modifier::REVERSED),
                    None => Style::default().fg(self.colors.muted),
                };
                Span::styled(expected.to_string(), style)
            })
            .collect();

        // typed past the end of the prompt
        let overflow: String = typed.iter().skip(prompt.chars().count()).collect();
        if !overflow.is_empty() {
            spans.push(Span::styled(overflow, Style::default().fg(self.colors.incorrect)));
        }
        spans
    }
}

impl<'a> Widget for PromptPanel<'a> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let block = Block::default()
            .title(format!(" Line {} ", self.progress))
            .borders(Borders::ALL)
            .border_style(Style::default().fg(self.colors.accent));

        let lines = match self.prompt {
            Some(prompt) => vec![
                Line::from(""),
                Line::from(self.prompt_spans(prompt)),
                Line::from(""),
                Line::from(Span::styled(
                    format!("> {}", self.input),
                    Style::default().fg(self.colors.text),
                )),
            ],
            None => vec![
                Line::from(""),
                Line::from(Span::styled(
                    "No prompt - Ctrl+R to start a new session",
                    Style::default().fg(self.colors.muted),
                )),
            ],
        };

        Paragraph::new(lines)
            .block(block)
            .wrap(Wrap { trim: false })
            .render(area, buf);
    }
}

/// Widget for displaying session results
pub struct ResultsPanel<'a> {
    results: &'a [ResultLine],
    title: &'a str,
    colors: ThemeColors,
}

impl<'a> ResultsPanel<'a> {
    pub fn new(results: &'a [ResultLine], title: &'a str, colors: ThemeColors) -> Self {
        Self {
            results,
            title,
            colors,
        }
    }

    fn status_color(&self, status: ResultStatus) -> Color {
        match status {
            ResultStatus::Ok => self.colors.correct,
            ResultStatus::Warning => self.colors.warning,
            ResultStatus::Error => self.colors.incorrect,
            ResultStatus::Info => self.colors.accent,
        }
    }

    fn status_symbol(status: ResultStatus) -> &'static str {
        match status {
            ResultStatus::Ok => "[OK]",
            ResultStatus::Warning => "[!!]",
            ResultStatus::Error => "[XX]",
            ResultStatus::Info => "[--]",
        }
    }
}

impl<'a> Widget for ResultsPanel<'a> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let block = Block::default()
            .title(self.title)
            .borders(Borders::ALL)
            .border_style(Style::default().fg(self.colors.muted));

        let inner = block.inner(area);
        block.render(area, buf);

        for (row, result) in self.results.iter().enumerate() {
            let y = inner.y + row as u16;
            if y >= inner.y + inner.height {
                break;
            }

            let color = self.status_color(result.status);
            let line = Line::from(vec![
                Span::styled(
                    format!("{} ", Self::status_symbol(result.status)),
                    Style::default().fg(color),
                ),
                Span::styled(
                    format!("{}: ", result.label),
                    Style::default().fg(self.colors.text).add_modifier(Modifier::BOLD),
                ),
                Span::styled(&result.value, Style::default().fg(color)),
            ]);

            buf.set_line(inner.x, y, &line, inner.width);
        }
    }
}

/// Widget for the help screen
pub struct HelpPanel {
    colors: ThemeColors,
}

impl HelpPanel {
    pub fn new(colors: ThemeColors) -> Self {
        Self { colors }
    }
}

impl Widget for HelpPanel {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let block = Block::default()
            .title("Help - Keystroke Timing")
            .borders(Borders::ALL)
            .border_style(Style::default().fg(self.colors.accent));

        let inner = block.inner(area);
        block.render(area, buf);

        let help_text = [
            "",
            " TYPING",
            " -----------",
            " Type the prompt shown on the Typing view",
            " Enter            : Submit the current line",
            " Backspace        : Delete the last character",
            "",
            " CONTROLS",
            " -----------",
            " Ctrl+S           : Skip the current line",
            " Ctrl+R           : Restart with new prompts",
            " Ctrl+E           : Export timings to JSON",
            " Ctrl+P           : Save the full session report",
            " Tab / Shift+Tab  : Switch between views",
            " Esc / Ctrl+C     : Quit",
            "",
            " Pauses of a second or more between keys are not recorded.",
        ];

        for (i, line) in help_text.iter().enumerate() {
            if i as u16 >= inner.height {
                break;
            }
            let style = if line.contains("---") {
                Style::default().fg(self.colors.muted)
            } else if line.trim().chars().all(|c| c.is_uppercase()) && !line.trim().is_empty() {
                Style::default().fg(self.colors.warning).add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(self.colors.text)
            };
            buf.set_string(inner.x, inner.y + i as u16, line, style);
        }
    }
}

/// Status bar widget
pub struct StatusBar<'a> {
    view: &'a str,
    progress: &'a str,
    elapsed: &'a str,
    events: u64,
    message: Option<&'a str>,
    colors: ThemeColors,
}

impl<'a> StatusBar<'a> {
    pub fn new(
        view: &'a str,
        progress: &'a str,
        elapsed: &'a str,
        events: u64,
        colors: ThemeColors,
    ) -> Self {
        Self {
            view,
            progress,
            elapsed,
            events,
            message: None,
            colors,
        }
    }

    pub fn message(mut self, message: Option<&'a str>) -> Self {
        self.message = message;
        self
    }
}

impl<'a> Widget for StatusBar<'a> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let bg_style = Style::default().bg(self.colors.bar).fg(self.colors.text);
        for x in area.x..area.x + area.width {
            buf.set_string(x, area.y, " ", bg_style);
        }

        let left = format!(" {} | Line {} ", self.view, self.progress);
        buf.set_string(area.x, area.y, &left, bg_style.add_modifier(Modifier::BOLD));

        if let Some(msg) = self.message {
            let msg_style = bg_style.fg(self.colors.warning);
            let msg_x = area.x + (area.width / 2).saturating_sub(msg.len() as u16 / 2);
            buf.set_string(msg_x, area.y, msg, msg_style);
        }

        let right = format!(" {} | Events: {} ", self.elapsed, self.events);
        let right_x = area.x + area.width.saturating_sub(right.len() as u16);
        buf.set_string(right_x, area.y, &right, bg_style);
    }
}

/// Tab bar widget
pub struct TabBar<'a> {
    tabs: &'a [&'a str],
    selected: usize,
    colors: ThemeColors,
}

impl<'a> TabBar<'a> {
    pub fn new(tabs: &'a [&'a str], selected: usize, colors: ThemeColors) -> Self {
        Self {
            tabs,
            selected,
            colors,
        }
    }
}

impl<'a> Widget for TabBar<'a> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let mut x = area.x;

        for (i, tab) in self.tabs.iter().enumerate() {
            let style = if i == self.selected {
                Style::default()
                    .fg(self.colors.bar)
                    .bg(self.colors.accent)
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(self.colors.text).bg(self.colors.bar)
            };

            let label = format!(" {} ", tab);
            let width = label.len() as u16;
            if x + width > area.x + area.width {
                break;
            }
            buf.set_string(x, area.y, &label, style);
            x += width;

            if i < self.tabs.len() - 1 && x < area.x + area.width {
                buf.set_string(x, area.y, "|", Style::default().fg(self.colors.muted).bg(self.colors.bar));
                x += 1;
            }
        }

        for fill_x in x..area.x + area.width {
            buf.set_string(fill_x, area.y, " ", Style::default().bg(self.colors.bar));
        }
    }
}
