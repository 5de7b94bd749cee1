//! Minimal text editor backing every input field.
//!
//! The cursor is a byte offset that always sits on a char boundary. Single-line
//! inputs fold pasted newlines into spaces.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TextInput {
    text: String,
    cursor: usize,
    multiline: bool,
}

impl TextInput {
    pub fn single_line() -> Self {
        Self::default()
    }

    pub fn multiline() -> Self {
        Self { multiline: true, ..Self::default() }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    pub fn is_multiline(&self) -> bool {
        self.multiline
    }

    /// Replaces the contents and moves the cursor to the end.
    pub fn set_text(&mut self, text: &str) {
        self.text = self.normalise(text);
        self.cursor = self.text.len();
    }

    pub fn clear(&mut self) {
        self.text.clear();
        self.cursor = 0;
    }

    pub fn insert_char(&mut self, c: char) {
        let c = if c == '\n' && !self.multiline { ' ' } else { c };
        self.text.insert(self.cursor, c);
        self.cursor += c.len_utf8();
    }

    /// Inserts pasted text at the cursor.
    pub fn insert_str(&mut self, s: &str) {
        let s = self.normalise(s);
        self.text.insert_str(self.cursor, &s);
        self.cursor += s.len();
    }

    pub fn backspace(&mut self) {
        if let Some(prev) = self.prev_boundary() {
            self.text.replace_range(prev..self.cursor, "");
            self.cursor = prev;
        }
    }

    pub fn delete(&mut self) {
        if let Some(next) = self.next_boundary() {
            self.text.replace_range(self.cursor..next, "");
        }
    }

    pub fn move_left(&mut self) {
        if let Some(prev) = self.prev_boundary() {
            self.cursor = prev;
        }
    }

    pub fn move_right(&mut self) {
        if let Some(next) = self.next_boundary() {
            self.cursor = next;
        }
    }

    pub fn move_home(&mut self) {
        self.cursor = self.line_start();
    }

    pub fn move_end(&mut self) {
        self.cursor = self.text[self.cursor..]
            .find('\n')
            .map_or(self.text.len(), |i| self.cursor + i);
    }

    pub fn move_up(&mut self) {
        let start = self.line_start();
        if start == 0 {
            return;
        }
        let column = self.text[start..self.cursor].chars().count();
        let prev_start = self.text[..start - 1].rfind('\n').map_or(0, |i| i + 1);
        self.cursor = offset_of_column(&self.text, prev_start, start - 1, column);
    }

    pub fn move_down(&mut self) {
        let Some(nl) = self.text[self.cursor..].find('\n').map(|i| self.cursor + i) else {
            return;
        };
        let column = self.text[self.line_start()..self.cursor].chars().count();
        let next_start = nl + 1;
        let next_end = self.text[next_start..].find('\n').map_or(self.text.len(), |i| next_start + i);
        self.cursor = offset_of_column(&self.text, next_start, next_end, column);
    }

    /// Cursor position as `(row, column)` in chars, for placing the terminal cursor.
    pub fn cursor_position(&self) -> (usize, usize) {
        let before = &self.text[..self.cursor];
        let row = before.matches('\n').count();
        let column = before[self.line_start()..].chars().count();
        (row, column)
    }

    /// Applies an editing key. Returns `false` for keys the editor does not handle.
    pub fn apply_key(&mut self, key: KeyEvent) -> bool {
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        match key.code {
            KeyCode::Char('u') if ctrl => {
                let start = self.line_start();
                self.text.replace_range(start..self.cursor, "");
                self.cursor = start;
            }
            KeyCode::Char(_) if ctrl => return false,
            KeyCode::Char(c) => self.insert_char(c),
            KeyCode::Backspace => self.backspace(),
            KeyCode::Delete => self.delete(),
            KeyCode::Left => self.move_left(),
            KeyCode::Right => self.move_right(),
            KeyCode::Home => self.move_home(),
            KeyCode::End => self.move_end(),
            KeyCode::Up if self.multiline => self.move_up(),
            KeyCode::Down if self.multiline => self.move_down(),
            KeyCode::Enter if self.multiline => self.insert_char('\n'),
            KeyCode::Tab if self.multiline => self.insert_str("    "),
            _ => return false,
        }
        true
    }

    fn normalise(&self, s: &str) -> String {
        let s = s.replace("\r\n", "\n").replace('\r', "\n");
        if self.multiline {
            s
        } else {
            s.replace('\n', " ")
        }
    }

    fn line_start(&self) -> usize {
        self.text[..self.cursor].rfind('\n').map_or(0, |i| i + 1)
    }

    fn prev_boundary(&self) -> Option<usize> {
        self.text[..self.cursor].char_indices().next_back().map(|(i, _)| i)
    }

    fn next_boundary(&self) -> Option<usize> {
        self.text[self.cursor..].chars().next().map(|c| self.cursor + c.len_utf8())
    }
}

/// Byte offset of `column` chars into the line `text[start..end]`, clamped to its end.
fn offset_of_column(text: &str, start: usize, end: usize, column: usize) -> usize {
    text[start..end]
        .char_indices()
        .nth(column)
        .map_or(end, |(i, _)| start + i)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn typing_and_backspace_respect_char_boundaries() {
        let mut input = TextInput::single_line();
        for c in "héllo".chars() {
            input.insert_char(c);
        }
        input.move_left();
        input.move_left();
        input.move_left();
        input.backspace();
        assert_eq!(input.text(), "hllo");
        assert_eq!(input.cursor_position(), (0, 1));
        input.delete();
        assert_eq!(input.text(), "hlo");
    }

    #[test]
    fn single_line_folds_pasted_newlines() {
        let mut input = TextInput::single_line();
        input.insert_str("Java\r\nScript");
        assert_eq!(input.text(), "Java Script");
        assert!(!input.apply_key(key(KeyCode::Enter)));
    }

    #[test]
    fn multiline_paste_and_vertical_movement() {
        let mut input = TextInput::multiline();
        input.insert_str("def f():\r\n    return 1\nx");
        assert_eq!(input.text(), "def f():\n    return 1\nx");
        assert_eq!(input.cursor_position(), (2, 1));

        input.move_up();
        assert_eq!(input.cursor_position(), (1, 1));
        input.move_end();
        assert_eq!(input.cursor_position(), (1, 12));
        input.move_up();
        // Clamped to the end of the shorter first line.
        assert_eq!(input.cursor_position(), (0, 8));
        input.move_home();
        input.move_down();
        assert_eq!(input.cursor_position(), (1, 0));
    }

    #[test]
    fn enter_inserts_newline_only_when_multiline() {
        let mut input = TextInput::multiline();
        input.set_text("a");
        assert!(input.apply_key(key(KeyCode::Enter)));
        assert!(input.apply_key(key(KeyCode::Char('b'))));
        assert_eq!(input.text(), "a\nb");
    }

    #[test]
    fn ctrl_u_clears_to_line_start() {
        let mut input = TextInput::multiline();
        input.set_text("keep\ndrop this");
        assert!(input.apply_key(KeyEvent::new(KeyCode::Char('u'), KeyModifiers::CONTROL)));
        assert_eq!(input.text(), "keep\n");
        assert_eq!(input.cursor_position(), (1, 0));
    }
}
