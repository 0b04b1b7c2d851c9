// ABOUTME: Main application entry point.
// ABOUTME: Sets up logging and the terminal, then runs the input/clock/command event loop.

mod app;
mod mode;
mod render;
mod status;
mod widgets;

use std::fs::OpenOptions;
use std::io;
use std::sync::Mutex;
use std::time::Duration;

use anyhow::Result;
use crossterm::event::{DisableMouseCapture, EnableMouseCapture, Event, EventStream};
use crossterm::execute;
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use futures_util::StreamExt;
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;
use tracing_subscriber::EnvFilter;

use app::App;
use nav_core::Config;

type Tui = Terminal<CrosstermBackend<io::Stdout>>;

/// The TUI owns stdout, so logs go to `<state_dir>/navbar/navbar.log`
fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let log_file = dirs::state_dir()
        .map(|dir| dir.join("navbar"))
        .and_then(|dir| {
            std::fs::create_dir_all(&dir).ok()?;
            OpenOptions::new()
                .create(true)
                .append(true)
                .open(dir.join("navbar.log"))
                .ok()
        });

    match log_file {
        Some(file) => {
            let _ = tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_ansi(false)
                .with_writer(Mutex::new(file))
                .try_init();
        }
        None => {
            let _ = tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(io::sink)
                .try_init();
        }
    }
}

fn load_config() -> Config {
    match Config::default_path() {
        Some(path) if path.exists() => Config::load(&path).unwrap_or_else(|e| {
            tracing::warn!("Ignoring {}: {}", path.display(), e);
            Config::default()
        }),
        _ => Config::default(),
    }
}

fn setup_terminal() -> Result<Tui> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let mut terminal = Terminal::new(CrosstermBackend::new(stdout))?;
    terminal.clear()?;
    Ok(terminal)
}

fn restore_terminal(terminal: &mut Tui) -> Result<()> {
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;
    Ok(())
}

async fn run(terminal: &mut Tui, app: &mut App) -> Result<()> {
    let mut events = EventStream::new();
    let mut clock = tokio::time::interval(Duration::from_secs(1));

    while !app.should_quit {
        app.set_viewport(terminal.size()?);
        terminal.draw(|frame| render::draw(frame, app))?;

        tokio::select! {
            _ = clock.tick() => app.tick(),
            Some(completion) = app.container.next_completion() => {
                app.container.apply_completion(completion);
                app.sync();
            }
            maybe_event = events.next() => match maybe_event {
                Some(Ok(Event::Key(key))) => app.handle_key(key),
                Some(Ok(Event::Mouse(mouse))) => app.handle_mouse(mouse),
                Some(Ok(_)) => {}
                Some(Err(e)) => {
                    tracing::error!("Failed to read terminal input: {}", e);
                    break;
                }
                None => break,
            },
        }
    }
    Ok(())
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    init_logging();
    tracing::info!("Starting navbar");

    let config = load_config();
    tracing::info!(
        "Session {:?} with {} tabs, shell {:?}",
        config.session_name,
        config.initial_tabs,
        config.shell
    );
    let mut app = App::new(config);

    let mut terminal = setup_terminal()?;
    let result = run(&mut terminal, &mut app).await;
    restore_terminal(&mut terminal)?;

    if let Err(e) = &result {
        tracing::error!("Exited with error: {}", e);
    }
    tracing::info!("Exiting");
    result
}
