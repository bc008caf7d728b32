//! Chat area
//!
//! Displays the visible window of the focused conversation.

use irie_app::App;
use irie_core::{Direction, Environment};
use ratatui::{
    Frame,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem},
};

const BORDER_SIZE: u16 = 2;

/// Render the chat area.
pub fn render<E: Environment>(frame: &mut Frame, app: &App<E>, area: Rect) {
    let title = app
        .focused()
        .map_or_else(|| " No conversation ".to_string(), |conv| {
            format!(" {} ", conv.descriptor().display_name)
        });

    let block = Block::default().borders(Borders::ALL).title(title);

    let items: Vec<ListItem> = app.focused().map_or_else(
        || {
            vec![ListItem::new(Line::from(Span::styled(
                "Open a conversation with /open <name>",
                Style::default().fg(Color::DarkGray),
            )))]
        },
        |conv| {
            let height = usize::from(area.height.saturating_sub(BORDER_SIZE));
            let range = app.focused_viewport().visible_range(conv.len(), height);
            let name = conv.descriptor().display_name.as_str();

            conv.messages()[range]
                .iter()
                .map(|msg| {
                    let (sender, sender_color) = match msg.direction {
                        Direction::Outgoing => ("me", Color::Cyan),
                        Direction::Incoming => (name, Color::Green),
                    };

                    ListItem::new(Line::from(vec![
                        Span::styled(
                            msg.timestamp.format("%H:%M ").to_string(),
                            Style::default().fg(Color::DarkGray),
                        ),
                        Span::styled(
                            format!("{sender}: "),
                            Style::default().fg(sender_color).add_modifier(Modifier::BOLD),
                        ),
                        Span::raw(msg.text.clone()),
                    ]))
                })
                .collect()
        },
    );

    let list = List::new(items).block(block);

    frame.render_widget(list, area);
}
