//! Terminal lifecycle for airepair.
//!
//! Entering the TUI turns on raw mode, the alternate screen, mouse capture and
//! bracketed paste. Leaving turns all four off again. Bracketed paste matters
//! here because users paste whole source files into the code inputs: without
//! it every newline in the paste would arrive as an Enter key and submit the
//! request halfway through the file.
//!
//! ratatui 0.30 does not restore the terminal on `Drop`, so [`restore_tui`]
//! has to run on every exit path, the panic hook included.

use crossterm::event::{
    DisableBracketedPaste, DisableMouseCapture, EnableBracketedPaste, EnableMouseCapture,
};
use crossterm::execute;
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;
use signal_hook::consts::SIGTERM;
use signal_hook::flag::register;
use std::io::{stdout, BufWriter, Stdout};
use std::panic;
use std::sync::{atomic::AtomicBool, Arc};

/// The terminal airepair draws on: crossterm over a buffered stdout.
///
/// `BufWriter` batches the escape sequences of one frame into a few write(2)
/// calls, which keeps the 30 FPS redraw from flickering on slow terminals.
pub type Tui = Terminal<CrosstermBackend<BufWriter<Stdout>>>;

/// Puts the terminal into TUI mode and returns the ratatui handle.
///
/// Call [`install_panic_hook`] first and [`restore_tui`] on the way out.
///
/// # Errors
///
/// Returns `Err` if raw mode, the alternate screen or the backend cannot be set up.
pub fn init_tui() -> std::io::Result<Tui> {
    let mut out = BufWriter::new(stdout());
    enable_raw_mode()?;
    execute!(out, EnterAlternateScreen, EnableMouseCapture, EnableBracketedPaste)?;
    Terminal::new(CrosstermBackend::new(out))
}

/// Returns the terminal to the state the shell left it in.
///
/// Idempotent: running it twice (panic hook, then the normal exit) is harmless.
/// Bracketed paste is switched off before leaving the alternate screen so the
/// shell never sees stray paste markers.
///
/// # Errors
///
/// Returns `Err` if raw mode or the screen commands fail. The panic hook
/// ignores the result; there is nothing better to do at that point.
pub fn restore_tui() -> std::io::Result<()> {
    disable_raw_mode()?;
    execute!(stdout(), DisableBracketedPaste, LeaveAlternateScreen, DisableMouseCapture)?;
    Ok(())
}

/// Chains a hook that restores the terminal, then runs the previous hook.
///
/// Install before [`init_tui`]. The order inside the hook is what makes the
/// panic readable: the default printer writes to the primary screen, so the
/// alternate screen and raw mode must already be gone when it runs. Otherwise
/// the message is drawn into a buffer that is about to be discarded and the
/// shell is left in raw mode until the user types `reset`.
pub fn install_panic_hook() {
    let original_hook = panic::take_hook();
    panic::set_hook(Box::new(move |panic_info| {
        // Restore first so the message lands on the primary screen.
        let _ = restore_tui();
        original_hook(panic_info);
    }));
}

/// Returns a flag that flips to `true` when the process receives SIGTERM.
///
/// The handler itself only performs an atomic store. The main loop polls the
/// flag on a short heartbeat and breaks out, so `restore_tui` still runs on
/// the normal exit path.
///
/// # Errors
///
/// Returns `Err` if the OS refuses to register the handler.
pub fn register_sigterm() -> std::io::Result<Arc<AtomicBool>> {
    let term = Arc::new(AtomicBool::new(false));
    register(SIGTERM, Arc::clone(&term))?;
    Ok(term)
}
