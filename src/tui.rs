//! Full-screen terminal front end.

pub mod app;
pub mod editor;
pub mod expansion;
pub mod render;
pub mod rows;

#[cfg(test)]
mod tests;

use std::io::{self, Stdout};
use std::sync::Arc;
use std::time::Duration;

use crossterm::event::{self, Event};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use tokio::sync::mpsc;
use tracing::info;

use crate::client::RaiderIo;
use crate::config::Settings;
use crate::error::Result;
use crate::roster::RosterStore;

pub use app::App;

const TICK: Duration = Duration::from_millis(100);

fn restore_terminal() {
    if let Err(err) = disable_raw_mode() {
        eprintln!("Failed to disable raw mode: {err}");
    }
    if let Err(err) = execute!(io::stdout(), LeaveAlternateScreen) {
        eprintln!("Failed to leave alternate screen: {err}");
    }
}

/// Runs the UI until the user quits. Must be called inside a tokio runtime.
pub fn run(settings: &Settings, source: Arc<dyn RaiderIo>) -> Result<()> {
    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic_info| {
        restore_terminal();
        original_hook(panic_info);
    }));

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;
    terminal.clear()?;

    let res = event_loop(&mut terminal, settings, source);

    restore_terminal();
    terminal.show_cursor()?;
    res
}

fn event_loop(
    terminal: &mut Terminal<CrosstermBackend<Stdout>>,
    settings: &Settings,
    source: Arc<dyn RaiderIo>,
) -> Result<()> {
    let (tx, mut rx) = mpsc::unbounded_channel();
    let mut app = App::new(RosterStore::new(settings.roster_path.clone()), source, tx);
    info!(roster = %settings.roster_path.display(), "starting");
    app.start();

    loop {
        while let Ok(message) = rx.try_recv() {
            app.apply_event(message);
        }

        terminal.draw(|frame| render::draw_app(frame, &mut app))?;

        if event::poll(TICK)? {
            if let Event::Key(key) = event::read()? {
                app.handle_key(key);
            }
        }

        if app.should_quit() {
            info!("quitting");
            return Ok(());
        }
    }
}
