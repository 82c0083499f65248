//! Keystroke Timing - typing practice with per-key timing capture

use anyhow::{Context, Result};
use crossterm::{
    event::{
        self, Event, KeyCode as CtKeyCode, KeyEvent as CtKeyEvent, KeyEventKind,
        KeyModifiers, KeyboardEnhancementFlags, PopKeyboardEnhancementFlags,
        PushKeyboardEnhancementFlags,
    },
    execute,
    terminal::{
        disable_raw_mode, enable_raw_mode, supports_keyboard_enhancement, EnterAlternateScreen,
        LeaveAlternateScreen,
    },
};
use log::{info, warn};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout},
    Terminal,
};
use std::{
    fs::{self, File},
    io::{stdout, Stdout},
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
};

use keystroke_timing::{
    config::{self, Config},
    keyboard::{from_terminal_key, KeyEvent},
    ui::{App, AppState, AppView, HelpPanel, PromptPanel, ResultsPanel, StatusBar, TabBar, ThemeColors},
};

type Term = Terminal<CrosstermBackend<Stdout>>;

fn main() -> Result<()> {
    init_logging();

    let config = match Config::load() {
        Ok(config) => config,
        Err(e) => {
            warn!("falling back to default config: {}", e);
            Config::default()
        }
    };

    let interrupted = Arc::new(AtomicBool::new(false));
    {
        let interrupted = Arc::clone(&interrupted);
        ctrlc::set_handler(move || interrupted.store(true, Ordering::SeqCst))
            .context("failed to install interrupt handler")?;
    }

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let enhanced = supports_keyboard_enhancement().unwrap_or(false);
    if enhanced {
        execute!(
            stdout,
            PushKeyboardEnhancementFlags(KeyboardEnhancementFlags::REPORT_EVENT_TYPES)
        )?;
    } else {
        info!("terminal does not report key releases, dwell and flight times unavailable");
    }
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = App::new(config);
    let result = run(&mut terminal, &mut app, &interrupted);

    // Cleanup terminal
    if enhanced {
        execute!(terminal.backend_mut(), PopKeyboardEnhancementFlags)?;
    }
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;
    result?;

    println!("\nKeystroke Timing session complete.");
    println!("Total events processed: {}", app.total_events);
    println!("Session duration: {}", app.elapsed_formatted());
    if let Some(session) = &app.session {
        let summary = session.summary();
        println!(
            "Lines submitted: {}, skipped: {}",
            summary.lines_submitted, summary.lines_skipped
        );
        println!("N-gram samples: {}", summary.ngram_samples);
    }

    Ok(())
}

/// Send log output to a file so it does not corrupt the terminal UI
fn init_logging() {
    let Some(dir) = config::data_dir() else {
        return;
    };
    if fs::create_dir_all(&dir).is_err() {
        return;
    }
    let Ok(file) = File::create(dir.join("keystroke-timing.log")) else {
        return;
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"))
        .target(env_logger::Target::Pipe(Box::new(file)))
        .init();
}

fn run(terminal: &mut Term, app: &mut App, interrupted: &AtomicBool) -> Result<()> {
    let tick_rate = app.config.refresh_interval();
    let colors = ThemeColors::from_theme(app.config.ui.theme);

    loop {
        if interrupted.load(Ordering::SeqCst) {
            app.quit();
        }
        if app.state == AppState::Quitting {
            return Ok(());
        }

        draw(terminal, app, colors)?;

        if event::poll(tick_rate)? {
            if let Event::Key(key) = event::read()? {
                handle_key(app, key);
            }
        }
    }
}

fn draw(terminal: &mut Term, app: &App, colors: ThemeColors) -> Result<()> {
    terminal.draw(|frame| {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(1), // Tab bar
                Constraint::Min(8),    // Main content
                Constraint::Length(1), // Status bar
            ])
            .split(frame.area());

        let tab_names: Vec<&str> = AppView::all().iter().map(|v| v.name()).collect();
        frame.render_widget(TabBar::new(&tab_names, app.view.index(), colors), chunks[0]);

        let progress = app.progress_label();
        match app.view {
            AppView::Typing => {
                let (prompt, input) = match &app.session {
                    Some(s) => (s.current_prompt(), s.input()),
                    None => (None, ""),
                };
                frame.render_widget(PromptPanel::new(prompt, input, &progress, colors), chunks[1]);
            }
            AppView::Results => {
                let results = app.results();
                frame.render_widget(ResultsPanel::new(&results, " Results ", colors), chunks[1]);
            }
            AppView::Help => frame.render_widget(HelpPanel::new(colors), chunks[1]),
        }

        let elapsed = app.elapsed_formatted();
        let status = StatusBar::new(app.view.name(), &progress, &elapsed, app.total_events, colors)
            .message(app.get_status());
        frame.render_widget(status, chunks[2]);
    })?;
    Ok(())
}

fn handle_key(app: &mut App, key: CtKeyEvent) {
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);

    if key.kind != KeyEventKind::Release {
        match key.code {
            CtKeyCode::Esc => return app.quit(),
            CtKeyCode::Char('c') if ctrl => return app.quit(),
            CtKeyCode::Char('s') if ctrl => return app.skip_line(),
            CtKeyCode::Char('r') if ctrl => return app.restart(),
            CtKeyCode::Char('e') if ctrl => {
                if let Err(e) = app.export_timings() {
                    warn!("timing export failed: {}", e);
                }
                return;
            }
            CtKeyCode::Char('p') if ctrl => {
                let filename = format!(
                    "keystroke_report_{}.json",
                    chrono::Utc::now().format("%Y%m%d_%H%M%S")
                );
                let path = app.config.export.target_dir().join(filename);
                if let Err(e) = app.export_report(&path) {
                    warn!("report export failed: {}", e);
                }
                return;
            }
            CtKeyCode::BackTab => return app.prev_view(),
            CtKeyCode::Tab if key.modifiers.contains(KeyModifiers::SHIFT) => {
                return app.prev_view()
            }
            CtKeyCode::Tab => return app.next_view(),
            _ => {}
        }
    }

    if ctrl || app.view != AppView::Typing {
        return;
    }
    let Some(name) = from_terminal_key(key.code) else {
        return;
    };
    let now = app.now_ms();
    let event = match key.kind {
        KeyEventKind::Press => KeyEvent::press(&name, now),
        KeyEventKind::Repeat => KeyEvent::repeat(&name, now),
        KeyEventKind::Release => KeyEvent::release(&name, now),
    };
    app.process_event(&event);
}
