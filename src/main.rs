mod api;
mod app;
mod board;
mod calendar;
mod cli;
mod config;
mod error;
mod event;
mod logging;
mod model;
mod ui;
mod util;

use std::io;
use std::panic;
use std::sync::Arc;

use anyhow::Result;
use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use tokio::sync::mpsc;
use tracing::info;

use api::HttpBoardApi;
use app::{Action, App};
use board::Board;
use calendar::CalendarLog;
use config::AppConfig;

#[tokio::main]
async fn main() -> Result<()> {
    // Load config
    let config = config::load_config()?;
    let _log_guard = logging::init(&config)?;

    let args: Vec<String> = std::env::args().skip(1).collect();
    match args.first().map(String::as_str) {
        None => run_tui(&config).await,
        Some("add") => cli::handle_add(&config, &args[1..]).await,
        Some("move") => cli::handle_move(&config, &args[1..]).await,
        Some("export") => cli::handle_export(&config, &args[1..]).await,
        Some("help" | "--help" | "-h") => {
            cli::print_help();
            Ok(())
        }
        Some(other) => {
            cli::print_help();
            anyhow::bail!("Unknown command: {other}")
        }
    }
}

async fn run_tui(config: &AppConfig) -> Result<()> {
    info!(base_url = %config.base_url, "starting board");

    // Set up action channel
    let (action_tx, mut action_rx) = mpsc::unbounded_channel::<Action>();

    // Create app
    let board = Board::new(Arc::new(HttpBoardApi::from_config(config)));
    let calendar = CalendarLog::new(config.calendar_path());
    let mut app = App::new(board, calendar, action_tx.clone());

    // Set up terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;
    terminal.hide_cursor()?;

    // Set up panic hook to restore terminal
    let original_hook = panic::take_hook();
    panic::set_hook(Box::new(move |panic_info| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
        original_hook(panic_info);
    }));

    // Spawn event reader
    let event_tx = action_tx.clone();
    tokio::spawn(async move {
        event::run_event_loop(event_tx).await;
    });

    // Initial fetch
    app.load();

    // Main loop
    loop {
        // Render
        terminal.draw(|f| ui::render(f, &app))?;

        // Wait for action
        if let Some(action) = action_rx.recv().await {
            app.update(action);
            if app.should_quit {
                break;
            }
        } else {
            break;
        }
    }

    // Restore terminal
    terminal.show_cursor()?;
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;

    info!("board closed");
    Ok(())
}
