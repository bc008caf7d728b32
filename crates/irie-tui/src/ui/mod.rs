//! UI rendering
//!
//! Rendering functions that convert App state into terminal output using
//! ratatui widgets. All functions are pure (no I/O), taking state and
//! returning widget trees.

mod chat;
mod input;
mod sidebar;
mod status;

use irie_app::App;
use irie_core::Environment;
use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
};

use crate::InputState;

const MAIN_AREA_MIN_HEIGHT: u16 = 3;
const INPUT_HEIGHT: u16 = 3;
const STATUS_HEIGHT: u16 = 1;
const CHAT_BORDER: u16 = 2;

/// Rows of chat text that fit in a terminal of the given height.
///
/// Everything that is not chat: the input box, the status line, and the
/// chat pane's own border.
#[must_use]
pub fn chat_rows(terminal_rows: u16) -> u16 {
    terminal_rows.saturating_sub(INPUT_HEIGHT + STATUS_HEIGHT + CHAT_BORDER)
}

/// Render the entire UI.
pub fn render<E: Environment>(frame: &mut Frame, app: &App<E>, input: &InputState) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(MAIN_AREA_MIN_HEIGHT),
            Constraint::Length(INPUT_HEIGHT),
            Constraint::Length(STATUS_HEIGHT),
        ])
        .split(frame.area());

    let [main_area, input_area, status_area] = chunks.as_ref() else {
        return;
    };

    render_main_area(frame, app, *main_area);
    input::render(frame, input, *input_area);
    status::render(frame, app, *status_area);
}

/// Render the main area (conversation sidebar + chat).
fn render_main_area<E: Environment>(frame: &mut Frame, app: &App<E>, area: Rect) {
    const SIDEBAR_WIDTH: u16 = 22;
    const CHAT_AREA_MIN_WIDTH: u16 = 20;

    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(SIDEBAR_WIDTH), Constraint::Min(CHAT_AREA_MIN_WIDTH)])
        .split(area);

    let [sidebar_area, chat_area] = chunks.as_ref() else {
        return;
    };

    sidebar::render(frame, app, *sidebar_area);
    chat::render(frame, app, *chat_area);
}
