//! Keybinding dispatcher for airepair.
//!
//! Translates crossterm key, paste and mouse events into `AppState` mutations
//! and returns a `KeyAction` telling the event loop whether to continue or quit.
//! Dispatch branches first on `state.mode`, then on the active workflow.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseEvent, MouseEventKind};

use airepair_core::view::Tab;

use crate::app::{AppState, Mode, Workflow};

/// Control-flow signal returned from the dispatcher.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyAction {
    Continue,
    Quit,
}

/// Dispatches a key event to the handler for the current mode.
pub fn handle_key(key: KeyEvent, state: &mut AppState) -> KeyAction {
    match state.mode {
        Mode::HelpOverlay => handle_help(key, state),
        Mode::ConfirmQuit => handle_confirm_quit(key, state),
        Mode::Alert => handle_alert(key, state),
        Mode::Insert => handle_insert(key, state),
        Mode::Normal => match state.workflow {
            Workflow::Review => handle_review_normal(key, state),
            Workflow::Chat => handle_chat_normal(key, state),
        },
    }
}

/// Bracketed paste goes to the focused input, entering Insert mode if needed.
pub fn handle_paste(text: &str, state: &mut AppState) -> KeyAction {
    if !matches!(state.mode, Mode::Normal | Mode::Insert) {
        return KeyAction::Continue;
    }
    if let Some(input) = state.focused_input_mut() {
        input.insert_str(text);
        state.mode = Mode::Insert;
    }
    KeyAction::Continue
}

/// Scroll wheel scrolls the help overlay when open, otherwise the active view.
pub fn handle_mouse(mouse: MouseEvent, state: &mut AppState) -> KeyAction {
    let help = state.mode == Mode::HelpOverlay;
    match mouse.kind {
        MouseEventKind::ScrollUp if help => state.help_scroll = state.help_scroll.saturating_sub(3),
        MouseEventKind::ScrollDown if help => state.help_scroll = state.help_scroll.saturating_add(3),
        MouseEventKind::ScrollUp => state.scroll_up(3),
        MouseEventKind::ScrollDown => state.scroll_down(3),
        _ => {}
    }
    KeyAction::Continue
}

// ---------------------------------------------------------------------------
// Normal mode
// ---------------------------------------------------------------------------

fn handle_review_normal(key: KeyEvent, state: &mut AppState) -> KeyAction {
    if let Some(action) = handle_common_key(key, state) {
        return action;
    }

    match key.code {
        KeyCode::Char(c @ '1'..='6') => {
            let index = c as usize - '1' as usize;
            state.set_tab(Tab::ALL[index]);
        }
        KeyCode::Char('l') | KeyCode::Right => state.set_tab(state.active_tab().next()),
        KeyCode::Char('h') | KeyCode::Left => state.set_tab(state.active_tab().prev()),
        KeyCode::Tab => state.next_field(),
        KeyCode::BackTab => state.prev_field(),

        KeyCode::Char('a') => state.analyze(),
        KeyCode::Char('r') => state.direct_repair(),
        KeyCode::Char('p') => state.proceed(),
        KeyCode::Char('t') => state.toggle_translate(),
        KeyCode::Char('A') => state.accept(),
        KeyCode::Char('R') => state.replan(),
        KeyCode::Char('F') => state.autofix(),
        KeyCode::Char('S') => state.stop(),
        KeyCode::Char('d') => state.toggle_diff(),
        _ => {}
    }
    KeyAction::Continue
}

fn handle_chat_normal(key: KeyEvent, state: &mut AppState) -> KeyAction {
    if let Some(action) = handle_common_key(key, state) {
        return action;
    }

    match key.code {
        KeyCode::Char('L') => state.cycle_chat_language(),
        KeyCode::Char('[') => state.select_message(-1),
        KeyCode::Char(']') => state.select_message(1),
        KeyCode::Char('a') => state.chat_accept(),
        KeyCode::Char('r') => state.chat_regenerate(),
        KeyCode::Char('s') => state.chat_stop(),
        _ => {}
    }
    KeyAction::Continue
}

/// Keys shared by both workflows: scrolling, editing, help and quit.
///
/// Returns `None` when the key should fall through to the workflow handler.
fn handle_common_key(key: KeyEvent, state: &mut AppState) -> Option<KeyAction> {
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);

    match key.code {
        KeyCode::Char('c') if ctrl => Some(KeyAction::Quit),
        KeyCode::Char('d') if ctrl => {
            state.half_page_down();
            Some(KeyAction::Continue)
        }
        KeyCode::Char('u') if ctrl => {
            state.half_page_up();
            Some(KeyAction::Continue)
        }
        KeyCode::Char('j') | KeyCode::Down => {
            state.scroll_down(1);
            Some(KeyAction::Continue)
        }
        KeyCode::Char('k') | KeyCode::Up => {
            state.scroll_up(1);
            Some(KeyAction::Continue)
        }
        KeyCode::Char('g') => {
            state.scroll_top();
            Some(KeyAction::Continue)
        }
        KeyCode::Char('G') => {
            state.scroll_bottom();
            Some(KeyAction::Continue)
        }
        KeyCode::Char('i') | KeyCode::Enter => {
            state.enter_insert();
            Some(KeyAction::Continue)
        }
        KeyCode::Char('?') => {
            state.help_scroll = 0;
            state.mode = Mode::HelpOverlay;
            Some(KeyAction::Continue)
        }
        KeyCode::Char('q') | KeyCode::Esc => {
            if state.request_quit() {
                Some(KeyAction::Quit)
            } else {
                Some(KeyAction::Continue)
            }
        }
        _ => None,
    }
}

// ---------------------------------------------------------------------------
// Insert mode
// ---------------------------------------------------------------------------

/// Routes editing keys to the focused input.
///
/// `Esc` returns to Normal mode. In chat, `Enter` sends and `Alt-Enter` adds a
/// line. A single-line review field leaves Insert mode on `Enter`.
fn handle_insert(key: KeyEvent, state: &mut AppState) -> KeyAction {
    let alt = key.modifiers.contains(KeyModifiers::ALT);

    match key.code {
        KeyCode::Esc => state.mode = Mode::Normal,
        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => return KeyAction::Quit,
        KeyCode::Enter if state.workflow == Workflow::Chat && !alt => {
            state.send_chat();
            state.mode = Mode::Normal;
        }
        _ => match state.focused_input_mut() {
            Some(input) => {
                if key.code == KeyCode::Enter && !input.is_multiline() {
                    state.mode = Mode::Normal;
                } else {
                    input.apply_key(key);
                }
            }
            None => state.mode = Mode::Normal,
        },
    }
    KeyAction::Continue
}

// ---------------------------------------------------------------------------
// Overlays
// ---------------------------------------------------------------------------

fn handle_help(key: KeyEvent, state: &mut AppState) -> KeyAction {
    match key.code {
        KeyCode::Char('j') | KeyCode::Down => state.help_scroll = state.help_scroll.saturating_add(1),
        KeyCode::Char('k') | KeyCode::Up => state.help_scroll = state.help_scroll.saturating_sub(1),
        KeyCode::Char('g') => state.help_scroll = 0,
        KeyCode::Char('?') | KeyCode::Esc | KeyCode::Char('q') => state.mode = Mode::Normal,
        _ => {}
    }
    KeyAction::Continue
}

fn handle_confirm_quit(key: KeyEvent, state: &mut AppState) -> KeyAction {
    match key.code {
        KeyCode::Char('y') | KeyCode::Char('Y') => KeyAction::Quit,
        KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => {
            state.mode = Mode::Normal;
            KeyAction::Continue
        }
        _ => KeyAction::Continue,
    }
}

fn handle_alert(key: KeyEvent, state: &mut AppState) -> KeyAction {
    if matches!(key.code, KeyCode::Enter | KeyCode::Esc | KeyCode::Char(' ')) {
        state.dismiss_alert();
    }
    KeyAction::Continue
}
