//! Event bus for airepair.
//!
//! Terminal input, timer ticks and service responses are normalised into a
//! single `AppEvent` and sent over a tokio unbounded MPSC channel. The main loop
//! is the only receiver.
//!
//! Two independent intervals drive the render and logic cycles:
//! - **Render interval** (33 ms ≈ 30 FPS) triggers a `terminal.draw()` call.
//! - **Tick interval** (250 ms) advances the busy spinner.
//!
//! Service responses do not come through this task. The API worker holds its
//! own clone of the sender and posts `ApiResult` directly, so a slow request
//! never delays input or redraws.

use crossterm::event::{Event, EventStream, KeyEvent, KeyEventKind, MouseEvent};
use futures::{FutureExt, StreamExt};
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::interval;

use crate::api::types::ApiResultPayload;

#[derive(Debug)]
pub enum AppEvent {
    /// A key press (`KeyEventKind::Press` only).
    ///
    /// Release and repeat events are dropped in [`spawn_event_task`]. Windows
    /// reports a release for every keystroke, and terminals speaking the kitty
    /// keyboard protocol can report both; without the filter each key would
    /// fire its action twice.
    Key(KeyEvent),
    Mouse(MouseEvent),
    /// Text pasted while bracketed paste is enabled, delivered in one piece.
    Paste(String),
    Resize(u16, u16),
    Tick,
    Render,
    /// A service response from the API worker.
    ApiResult(Box<ApiResultPayload>),
    /// Terminal input closed.
    Quit,
}

/// Sender and receiver ends of the unified event channel.
pub struct EventHandler {
    /// Clone for each producer.
    pub tx: mpsc::UnboundedSender<AppEvent>,
    /// Owned by the main loop.
    pub rx: mpsc::UnboundedReceiver<AppEvent>,
}

impl EventHandler {
    /// Creates a fresh unbounded channel.
    ///
    /// Producers are a human at a keyboard, two timers and one response per
    /// request, all of which the main loop outpaces.
    pub fn new() -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self { tx, rx }
    }
}

impl Default for EventHandler {
    fn default() -> Self {
        Self::new()
    }
}

/// Spawns the task that feeds terminal input and timer ticks into `tx`.
///
/// The task sends `Quit` and exits once the crossterm stream ends, and exits
/// silently once the receiver is dropped.
///
/// # Key implementation choices
///
/// - `reader.next().fuse()`: `tokio::select!` may poll a branch again after it
///   has completed. A fused future returns `Pending` from then on instead of
///   panicking, which matters when the crossterm stream ends.
/// - Input errors are skipped rather than ending the task; a single bad read
///   should not take the keyboard away.
/// - A failed send means the main loop is gone, so the task stops.
pub fn spawn_event_task(tx: mpsc::UnboundedSender<AppEvent>) {
    tokio::spawn(async move {
        let mut tick_interval = interval(Duration::from_millis(250));
        let mut render_interval = interval(Duration::from_millis(33));
        let mut reader = EventStream::new();

        loop {
            let tick_tick = tick_interval.tick();
            let render_tick = render_interval.tick();
            let crossterm_event = reader.next().fuse();

            let event = tokio::select! {
                _ = tick_tick => Some(AppEvent::Tick),
                _ = render_tick => Some(AppEvent::Render),
                maybe_event = crossterm_event => match maybe_event {
                    Some(Ok(event)) => translate(event),
                    Some(Err(_)) => None,
                    None => {
                        let _ = tx.send(AppEvent::Quit);
                        break;
                    }
                },
            };

            if let Some(event) = event {
                if tx.send(event).is_err() {
                    break;
                }
            }
        }
    });
}

fn translate(event: Event) -> Option<AppEvent> {
    match event {
        Event::Key(key) if key.kind == KeyEventKind::Press => Some(AppEvent::Key(key)),
        Event::Mouse(mouse) => Some(AppEvent::Mouse(mouse)),
        Event::Paste(text) => Some(AppEvent::Paste(text)),
        Event::Resize(w, h) => Some(AppEvent::Resize(w, h)),
        _ => None,
    }
}
