//! airepair: terminal client for the AI code repair service.
//!
//! Entry point for the `airepair` binary. Wires together the CLI and config
//! layers, file logging, the terminal lifecycle (`tui`), the unified event bus
//! (`event`), the API worker thread (`api`) and the UI (`ui`).
//!
//! # Startup sequence
//!
//! 1. Parse the CLI and start file logging.
//! 2. Load config, apply CLI overrides, resolve the theme and read `--file`.
//!    All of this happens before the terminal enters raw mode so errors print normally.
//! 3. `install_panic_hook()`, then `register_sigterm()`.
//! 4. `init_tui()` and `spawn_event_task()`.
//! 5. Spawn the API worker on its own thread, sharing the tokio runtime handle.
//!
//! `restore_tui()` runs at the single exit point after the event loop. Draw
//! errors break out of the loop and are returned after the terminal is restored.

mod api;
mod app;
mod cli;
mod config;
mod event;
mod highlight;
mod input;
mod logging;
mod theme;
mod tui;
mod ui;

use std::sync::atomic::Ordering;

use clap::Parser;
use tracing::{error, info};

use airepair_core::Gateway;

use crate::app::{AppState, Workflow};
use crate::cli::Cli;
use crate::config::Config;
use crate::event::AppEvent;
use crate::ui::keybindings::{self, KeyAction};

#[tokio::main]
async fn main() -> std::io::Result<()> {
    let cli = Cli::parse();
    let _log_guard = logging::init()?;

    let mut config = Config::load();
    config.apply_cli(&cli);
    let theme = theme::Theme::from_name(&config.theme);
    let preload = cli.file.as_deref().map(std::fs::read_to_string).transpose()?;

    let review_gateway =
        Gateway::new(config.base_url.clone(), config.timeout()).map_err(std::io::Error::other)?;
    let chat_gateway =
        Gateway::new(config.chat_base_url(), config.timeout()).map_err(std::io::Error::other)?;
    info!(
        review = review_gateway.base_url(),
        chat = chat_gateway.base_url(),
        "starting airepair"
    );

    tui::install_panic_hook();
    let term_flag = tui::register_sigterm()?;
    let mut terminal = tui::init_tui()?;

    let handler = event::EventHandler::new();
    event::spawn_event_task(handler.tx.clone());
    let mut rx = handler.rx;

    let (api_tx, api_rx) = crossbeam_channel::unbounded();
    let worker_events = handler.tx.clone();
    let runtime = tokio::runtime::Handle::current();
    std::thread::spawn(move || {
        api::worker::api_worker_loop(review_gateway, chat_gateway, api_rx, worker_events, runtime);
    });

    let workflow = Workflow::from(cli.command());
    let mut state = AppState::new(workflow, &config.default_language, api_tx);
    if let Some(code) = preload {
        match workflow {
            Workflow::Review => state.code.set_text(&code),
            Workflow::Chat => state.chat_input.set_text(&code),
        }
    }

    let mut outcome = Ok(());

    // Exits only via `break` so `restore_tui()` below is always reached.
    'event_loop: loop {
        tokio::select! {
            // Heartbeat so SIGTERM is noticed even when no events arrive.
            _ = tokio::time::sleep(std::time::Duration::from_millis(50)) => {
                if term_flag.load(Ordering::Relaxed) {
                    break 'event_loop;
                }
            }
            maybe_event = rx.recv() => {
                let action = match maybe_event {
                    Some(AppEvent::Render) => {
                        if let Err(e) = terminal.draw(|frame| ui::render(frame, &mut state, &theme)) {
                            error!(error = %e, "draw failed");
                            outcome = Err(e);
                            break 'event_loop;
                        }
                        KeyAction::Continue
                    }
                    Some(AppEvent::Key(key)) => keybindings::handle_key(key, &mut state),
                    Some(AppEvent::Paste(text)) => keybindings::handle_paste(&text, &mut state),
                    Some(AppEvent::Mouse(mouse)) => keybindings::handle_mouse(mouse, &mut state),
                    Some(AppEvent::ApiResult(payload)) => {
                        state.apply_api_result(*payload);
                        KeyAction::Continue
                    }
                    Some(AppEvent::Tick) => {
                        state.on_tick();
                        KeyAction::Continue
                    }
                    // The next Render picks up the new size.
                    Some(AppEvent::Resize(_, _)) => KeyAction::Continue,
                    Some(AppEvent::Quit) | None => KeyAction::Quit,
                };
                if action == KeyAction::Quit || term_flag.load(Ordering::Relaxed) {
                    break 'event_loop;
                }
            }
        }
    }

    tui::restore_tui()?;
    info!("airepair exiting");
    outcome
}
