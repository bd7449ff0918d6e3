use std::io::{self, Stdout};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use crossterm::event::{self, Event, KeyCode, KeyEventKind, KeyModifiers};
use crossterm::execute;
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;
use tokio::runtime::Handle;
use tracing::info;

use crate::api::ArtworkSource;

use super::app::App;
use super::loader::PageLoader;

/// How long to wait for input before checking for finished page loads.
const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Spin up the terminal backend, enter the draw loop, and keep processing input
/// and finished page loads until the user quits. Fetches run on `runtime`.
pub fn run_app(app: &mut App, source: Arc<dyn ArtworkSource>, runtime: &Handle) -> Result<()> {
    let (loader, mut results) = PageLoader::new(runtime.clone(), source);

    let mut stdout = io::stdout();
    enable_raw_mode().context("failed to enable raw mode")?;
    execute!(stdout, EnterAlternateScreen).context("failed to enter alternate screen")?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend).context("failed to create terminal backend")?;

    let result = loop {
        if let Some(request) = app.take_load_request() {
            loader.spawn(request);
        }
        while let Ok(message) = results.try_recv() {
            app.apply_load(message.seq, message.result);
        }

        if let Err(err) = terminal
            .draw(|frame| app.draw(frame))
            .context("failed to draw frame")
        {
            break Err(err);
        }

        match event::poll(POLL_INTERVAL).context("event polling failed") {
            Ok(true) => {}
            Ok(false) => continue,
            Err(err) => break Err(err),
        }

        let event = match event::read().context("failed to read event") {
            Ok(event) => event,
            Err(err) => break Err(err),
        };
        if let Event::Key(key_event) = event {
            if key_event.kind != KeyEventKind::Press {
                continue;
            }
            if key_event.modifiers.contains(KeyModifiers::CONTROL)
                && key_event.code == KeyCode::Char('c')
            {
                break Ok(());
            }
            match app.handle_key(key_event.code) {
                Ok(true) => break Ok(()),
                Ok(false) => {}
                Err(err) => break Err(err),
            }
        }
    };

    info!(
        selected = app.controller().selected_count(),
        "leaving artwork table"
    );
    cleanup_terminal(&mut terminal)?;
    result
}

fn cleanup_terminal(terminal: &mut Terminal<CrosstermBackend<Stdout>>) -> Result<()> {
    disable_raw_mode().context("failed to disable raw mode")?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)
        .context("failed to leave alternate screen")?;
    terminal
        .show_cursor()
        .context("failed to restore cursor visibility")
}
