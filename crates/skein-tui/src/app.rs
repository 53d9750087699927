//! Top-level viewer state and the main event loop.
//!
//! [`App::run`] sets up the terminal, then alternates between draining the
//! server's event channel into the [`Aggregator`], drawing, and polling the
//! keyboard. The terminal is restored on exit or panic.

use crate::{
    event::{self, AppEvent},
    theme::Theme,
    widgets::{
        filter_bar::{FilterBar, FilterBarState},
        log_view::LogView,
    },
};
use crossterm::{
    event::{self as ct_event},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout},
    Frame, Terminal,
};
use skein_core::{config::Config, Aggregator};
use skein_server::ServerEvent;
use std::{io, time::Duration};
use tokio::sync::mpsc::{self, error::TryRecvError};

const POLL_INTERVAL: Duration = Duration::from_millis(16);

pub struct App {
    aggregator: Aggregator,
    filter_bar: FilterBarState,
    events: mpsc::UnboundedReceiver<ServerEvent>,
    theme: Theme,
    config: Config,
    /// Aggregator revision at the last draw.
    drawn: Option<u64>,
    server_gone: bool,
    quit: bool,
}

impl App {
    pub fn new(events: mpsc::UnboundedReceiver<ServerEvent>, config: Config, theme: Theme) -> Self {
        Self {
            aggregator: Aggregator::new(),
            filter_bar: FilterBarState::default(),
            events,
            theme,
            config,
            drawn: None,
            server_gone: false,
            quit: false,
        }
    }

    pub fn aggregator(&self) -> &Aggregator {
        &self.aggregator
    }

    /// Set up the terminal, run the event loop, and restore the terminal on exit.
    pub fn run(mut self) -> anyhow::Result<()> {
        install_panic_hook();

        enable_raw_mode()?;
        execute!(io::stdout(), EnterAlternateScreen)?;
        let backend = CrosstermBackend::new(io::stdout());
        let mut terminal = Terminal::new(backend)?;

        let result = self.event_loop(&mut terminal);

        // Always restore terminal, even if the loop returned an error
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
        let _ = terminal.show_cursor();

        result
    }

    fn event_loop(
        &mut self,
        terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    ) -> anyhow::Result<()> {
        loop {
            self.pump();

            let revision = self.aggregator.revision();
            if self.drawn != Some(revision) {
                terminal.draw(|frame| draw(frame, self))?;
                self.drawn = Some(revision);
            }

            if self.quit {
                break;
            }

            if ct_event::poll(POLL_INTERVAL)? {
                if let Some(ev) = event::to_app_event(ct_event::read()?) {
                    tracing::debug!(event = ?ev, "key event");
                    self.handle(ev);
                }
            }
        }
        Ok(())
    }

    /// Apply every server event waiting in the channel.
    pub fn pump(&mut self) {
        loop {
            match self.events.try_recv() {
                Ok(event) => event.apply(&mut self.aggregator),
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    if !self.server_gone {
                        tracing::warn!("server event channel closed");
                        self.server_gone = true;
                    }
                    break;
                }
            }
        }
    }

    pub fn handle(&mut self, event: AppEvent) {
        match event {
            AppEvent::Quit => {
                tracing::debug!("quit");
                self.quit = true;
            }
            // force a redraw at the new size
            AppEvent::Resize(_, _) => self.drawn = None,
            other => {
                let before = self.filter_bar.cursor;
                if self.filter_bar.handle(&other) {
                    tracing::debug!(filter = %self.filter_bar.text, "filter changed");
                    self.aggregator.set_filter(self.filter_bar.text.clone());
                } else if self.filter_bar.cursor != before {
                    self.drawn = None;
                }
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Rendering
// ---------------------------------------------------------------------------

fn draw(frame: &mut Frame, app: &App) {
    let area = frame.area();

    // log view | 1-line filter bar
    let vert = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Fill(1), Constraint::Length(1)])
        .split(area);

    let records = app.aggregator.view();
    frame.render_widget(LogView::new(&records, &app.config.ui, &app.theme), vert[0]);

    let bar = FilterBar::new(&app.filter_bar, app.aggregator.buffer().filter(), &app.theme);
    let (cx, cy) = bar.cursor_position(vert[1]);
    frame.render_widget(bar, vert[1]);
    frame.set_cursor_position((cx, cy));
}

// ---------------------------------------------------------------------------
// Terminal helpers
// ---------------------------------------------------------------------------

fn install_panic_hook() {
    let original = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
        original(info);
    }));
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
