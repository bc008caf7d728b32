//! Conversation sidebar
//!
//! Displays open conversations in activation order with presence and
//! unread indicators.

use irie_app::App;
use irie_core::Environment;
use ratatui::{
    Frame,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem},
};

const ACTIVE_PREFIX: &str = ">";
const INACTIVE_PREFIX: &str = " ";
const ONLINE_MARKER: &str = "+";
const OFFLINE_MARKER: &str = " ";

/// Render the conversation sidebar.
pub fn render<E: Environment>(frame: &mut Frame, app: &App<E>, area: Rect) {
    let items: Vec<ListItem> = app
        .conversations()
        .map(|conv| {
            let user = conv.user();
            let focused = app.focus() == Some(user);
            let unread = app.unread(user);

            let prefix = if focused { ACTIVE_PREFIX } else { INACTIVE_PREFIX };
            let presence = if app.is_online(user) { ONLINE_MARKER } else { OFFLINE_MARKER };

            let name_style = if focused {
                Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)
            } else if unread > 0 {
                Style::default().fg(Color::Cyan)
            } else {
                Style::default()
            };

            let badge = if unread > 0 { format!(" {unread}") } else { String::new() };

            ListItem::new(Line::from(vec![
                Span::raw(prefix),
                Span::styled(presence, Style::default().fg(Color::Green)),
                Span::styled(conv.descriptor().display_name.clone(), name_style),
                Span::styled(badge, Style::default().fg(Color::Red)),
            ]))
        })
        .collect();

    let block = Block::default().borders(Borders::ALL).title(" Chats ");
    let list = List::new(items).block(block);

    frame.render_widget(list, area);
}
