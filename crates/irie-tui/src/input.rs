//! Input state and key handling for the TUI.
//!
//! This module owns all text input state (buffer, cursor) and handles
//! character-level key events. Command parsing happens here on Enter.

use irie_app::{App, AppAction, KeyInput};
use irie_core::Environment;

use crate::commands::{self, Command};

/// Input state for the TUI.
///
/// Manages the text input buffer and cursor position. The cursor is a byte
/// offset into the buffer and always sits on a character boundary.
#[derive(Debug, Default)]
pub struct InputState {
    buffer: String,
    cursor: usize,
}

impl InputState {
    /// Create a new empty input state.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Current text in the input buffer.
    pub fn buffer(&self) -> &str {
        &self.buffer
    }

    /// Cursor position in display columns, for terminal cursor placement.
    pub fn cursor_column(&self) -> usize {
        self.buffer[..self.cursor].chars().count()
    }

    /// Handle a key input event.
    ///
    /// Returns actions to process (render for editing keys, protocol
    /// actions for submitted commands).
    pub fn handle_key<E: Environment>(&mut self, key: KeyInput, app: &mut App<E>) -> Vec<AppAction> {
        match key {
            KeyInput::Char(c) => {
                self.buffer.insert(self.cursor, c);
                self.cursor = self.cursor.saturating_add(c.len_utf8());
                vec![AppAction::Render]
            },
            KeyInput::Backspace => {
                if let Some(c) = self.buffer[..self.cursor].chars().next_back() {
                    self.cursor = self.cursor.saturating_sub(c.len_utf8());
                    self.buffer.remove(self.cursor);
                }
                vec![AppAction::Render]
            },
            KeyInput::Delete => {
                if self.cursor < self.buffer.len() {
                    self.buffer.remove(self.cursor);
                }
                vec![AppAction::Render]
            },
            KeyInput::Left => {
                if let Some(c) = self.buffer[..self.cursor].chars().next_back() {
                    self.cursor = self.cursor.saturating_sub(c.len_utf8());
                }
                vec![AppAction::Render]
            },
            KeyInput::Right => {
                if let Some(c) = self.buffer[self.cursor..].chars().next() {
                    self.cursor = self.cursor.saturating_add(c.len_utf8());
                }
                vec![AppAction::Render]
            },
            KeyInput::Home => {
                self.cursor = 0;
                vec![AppAction::Render]
            },
            KeyInput::End => {
                self.cursor = self.buffer.len();
                vec![AppAction::Render]
            },
            KeyInput::Enter => self.handle_enter(app),
            KeyInput::Tab => app.focus_next(),
            KeyInput::Esc => app.quit(),
            KeyInput::Up => app.scroll_up(1),
            KeyInput::Down => app.scroll_down(1),
            KeyInput::PageUp => app.page_up(),
            KeyInput::PageDown => app.page_down(),
        }
    }

    /// Handle Enter: parse the line and call the App API.
    fn handle_enter<E: Environment>(&mut self, app: &mut App<E>) -> Vec<AppAction> {
        let text = std::mem::take(&mut self.buffer);
        self.cursor = 0;

        if text.trim().is_empty() {
            return vec![AppAction::Render];
        }

        match commands::parse(&text) {
            Command::Open { name } => app.open_conversation(&name),
            Command::Close => app.close_active(),
            Command::Quit => app.quit(),
            Command::Message { content } => app.send_active(&content),
            Command::Unknown { input } => {
                app.set_status(format!("Unknown command: {input}"));
                vec![AppAction::Render]
            },
            Command::InvalidArgs { command, error } => {
                app.set_status(format!("/{command}: {error}"));
                vec![AppAction::Render]
            },
        }
    }
}
