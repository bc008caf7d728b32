//! Application state machine.
//!
//! [`App`] wraps the pure [`ChatClient`] with everything a frontend needs
//! on top of it: the friends list, window focus, per-window scroll state,
//! and a status line. Frontends call the API methods from their input
//! handling; the runtime feeds transport events through [`App::handle`].
//! Both paths return [`AppAction`]s and never touch I/O themselves.

use std::collections::HashMap;

use irie_client::Friend;
use irie_core::{
    ChatClient, ChatConfig, ClientAction, ConnectionState, Conversation, Environment,
};
use irie_proto::{Inbound, UserId};

use crate::{AppAction, AppEvent, Viewport};

/// Fallback chat pane height until the frontend reports a real one.
const DEFAULT_CHAT_HEIGHT: u16 = 24;

/// UI-facing state machine for one signed-in account.
///
/// Owns the [`ChatClient`] and derives display state from it instead of
/// duplicating message buffers. All methods are synchronous; time comes
/// from the embedded [`Environment`].
pub struct App<E: Environment> {
    env: E,
    client: ChatClient<E::Instant>,
    friends: Vec<Friend>,
    focus: Option<UserId>,
    viewports: HashMap<UserId, Viewport>,
    status: Option<String>,
    chat_height: u16,
}

impl<E: Environment> App<E> {
    /// Create an app for a signed-in account with its friends list.
    pub fn new(env: E, config: ChatConfig, friends: Vec<Friend>) -> Self {
        let client = ChatClient::new(env.now(), config);
        Self {
            env,
            client,
            friends,
            focus: None,
            viewports: HashMap::new(),
            status: Some("Connecting".to_string()),
            chat_height: DEFAULT_CHAT_HEIGHT,
        }
    }

    /// Process one external event.
    pub fn handle(&mut self, event: AppEvent) -> Vec<AppAction> {
        match event {
            AppEvent::TransportOpened => self.on_transport_opened(),
            AppEvent::TransportClosed { reason } => self.on_transport_closed(reason),
            AppEvent::FrameReceived(frame) => self.on_frame(frame),
            AppEvent::Tick => self.on_tick(),
        }
    }

    fn on_transport_opened(&mut self) -> Vec<AppAction> {
        let now = self.env.now();
        match self.client.transport_opened(now) {
            Ok(client_actions) => {
                self.set_status("Connected");
                let mut actions = self.absorb(client_actions);
                actions.push(AppAction::Render);
                actions
            },
            Err(error) => {
                self.set_status(error.to_string());
                vec![AppAction::Render]
            },
        }
    }

    fn on_transport_closed(&mut self, reason: String) -> Vec<AppAction> {
        let client_actions = self.client.transport_closed(reason);
        let mut actions = self.absorb(client_actions);
        actions.push(AppAction::Render);
        actions
    }

    fn on_frame(&mut self, frame: Inbound) -> Vec<AppAction> {
        // Live messages append; remember the sender so the focused window
        // can be marked read and its scroll anchor adjusted afterwards.
        let live_sender = match &frame {
            Inbound::Message { sender, .. } => Some(*sender),
            _ => None,
        };
        let len_before = live_sender
            .filter(|sender| self.focus == Some(*sender))
            .and_then(|sender| self.client.conversation(sender))
            .map(Conversation::len);

        let client_actions = self.client.handle_frame(frame);
        let mut actions = self.absorb(client_actions);

        if let Some(sender) = live_sender
            && self.focus == Some(sender)
        {
            // On-screen window, so the message counts as read on arrival.
            self.client.mark_read(sender);
            let len_after =
                self.client.conversation(sender).map_or(0, Conversation::len);
            let appended = len_after.saturating_sub(len_before.unwrap_or(0));
            if appended > 0
                && let Some(viewport) = self.viewports.get_mut(&sender)
            {
                viewport.follow_append(appended);
            }
        }

        actions.push(AppAction::Render);
        actions
    }

    fn on_tick(&mut self) -> Vec<AppAction> {
        let now = self.env.now();
        let client_actions = self.client.tick(now);
        let mut actions = self.absorb(client_actions);
        actions.push(AppAction::Render);
        actions
    }

    /// Open (or refocus) the conversation with the friend called `name`.
    ///
    /// Matches the handle first, then the display name, both
    /// case-insensitively.
    pub fn open_conversation(&mut self, name: &str) -> Vec<AppAction> {
        let Some(descriptor) = self.find_friend(name).map(Friend::descriptor) else {
            self.set_status(format!("No friend named {name}"));
            return vec![AppAction::Render];
        };

        let user = descriptor.user;
        self.focus = Some(user);
        self.viewports.entry(user).or_default();

        let now = self.env.now();
        let client_actions = self.client.open_conversation(descriptor, now);
        let mut actions = self.absorb(client_actions);
        actions.push(AppAction::Render);
        actions
    }

    /// Close the focused conversation window.
    ///
    /// Focus falls back to the most recently focused remaining window.
    pub fn close_active(&mut self) -> Vec<AppAction> {
        let Some(user) = self.focus else {
            self.set_status("No open conversation");
            return vec![AppAction::Render];
        };

        let label = self.window_label(user);
        self.client.close_conversation(user);
        self.viewports.remove(&user);
        self.focus = self.client.conversations().last().map(Conversation::user);
        self.set_status(format!("Closed {label}"));
        vec![AppAction::Render]
    }

    /// Move focus to the next open window, wrapping around.
    pub fn focus_next(&mut self) -> Vec<AppAction> {
        let users: Vec<UserId> = self.client.conversations().map(Conversation::user).collect();
        if users.is_empty() {
            return vec![];
        }

        let next = match self.focus.and_then(|user| users.iter().position(|&u| u == user)) {
            Some(index) => users[(index + 1) % users.len()],
            None => users[0],
        };
        self.focus = Some(next);
        self.viewports.entry(next).or_default();
        self.client.mark_read(next);
        vec![AppAction::Render]
    }

    /// Send `text` to the focused window.
    ///
    /// The message shows up in the buffer immediately; the window jumps
    /// back to the newest entry. On a dead connection the frame goes
    /// nowhere and the status line says so.
    pub fn send_active(&mut self, text: &str) -> Vec<AppAction> {
        let Some(to) = self.focus else {
            self.set_status("No open conversation to send to");
            return vec![AppAction::Render];
        };

        let stamp = self.env.wall_now();
        match self.client.send_message(to, text, stamp) {
            Ok(client_actions) => {
                if let Some(viewport) = self.viewports.get_mut(&to) {
                    viewport.jump_to_latest();
                }
                if self.client.connection_state() == ConnectionState::Closed {
                    // The local append still happened; only the frame was dropped.
                    self.set_status("Not connected; message kept locally");
                }
                let mut actions = self.absorb(client_actions);
                actions.push(AppAction::Render);
                actions
            },
            Err(error) => {
                self.set_status(error.to_string());
                vec![AppAction::Render]
            },
        }
    }

    /// Scroll the focused window towards older messages.
    ///
    /// Reaching the oldest loaded entries requests the next history page.
    pub fn scroll_up(&mut self, lines: usize) -> Vec<AppAction> {
        let Some(user) = self.focus else {
            return vec![];
        };
        let total = self.client.conversation(user).map_or(0, Conversation::len);
        let height = usize::from(self.chat_height);

        let at_edge = match self.viewports.get_mut(&user) {
            Some(viewport) => {
                viewport.scroll_up(lines, total, height);
                viewport.near_top(total, height)
            },
            None => return vec![],
        };

        let mut actions = Vec::new();
        if at_edge && total > 0 {
            let now = self.env.now();
            let client_actions = self.client.request_older_messages(user, now);
            actions = self.absorb(client_actions);
        }
        actions.push(AppAction::Render);
        actions
    }

    /// Scroll the focused window towards newer messages.
    pub fn scroll_down(&mut self, lines: usize) -> Vec<AppAction> {
        let Some(user) = self.focus else {
            return vec![];
        };
        if let Some(viewport) = self.viewports.get_mut(&user) {
            viewport.scroll_down(lines);
        }
        vec![AppAction::Render]
    }

    /// Scroll one screen towards older messages.
    pub fn page_up(&mut self) -> Vec<AppAction> {
        self.scroll_up(usize::from(self.chat_height))
    }

    /// Scroll one screen towards newer messages.
    pub fn page_down(&mut self) -> Vec<AppAction> {
        self.scroll_down(usize::from(self.chat_height))
    }

    /// Ask the runtime to shut down.
    pub fn quit(&self) -> Vec<AppAction> {
        vec![AppAction::Quit]
    }

    /// Replace the status line.
    pub fn set_status(&mut self, message: impl Into<String>) {
        self.status = Some(message.into());
    }

    /// Current status line, if any.
    pub fn status_message(&self) -> Option<&str> {
        self.status.as_deref()
    }

    /// The signed-in account's friends.
    pub fn friends(&self) -> &[Friend] {
        &self.friends
    }

    /// Open conversation windows, least recently focused first.
    pub fn conversations(&self) -> impl Iterator<Item = &Conversation> {
        self.client.conversations()
    }

    /// Counterpart of the focused window.
    pub fn focus(&self) -> Option<UserId> {
        self.focus
    }

    /// The focused window's buffer.
    pub fn focused(&self) -> Option<&Conversation> {
        self.focus.and_then(|user| self.client.conversation(user))
    }

    /// Scroll state for the focused window.
    pub fn focused_viewport(&self) -> Viewport {
        self.focus
            .and_then(|user| self.viewports.get(&user))
            .copied()
            .unwrap_or_default()
    }

    /// Unread count for a counterpart.
    pub fn unread(&self, user: UserId) -> u32 {
        self.client.unread(user)
    }

    /// Whether a counterpart is connected to the hub.
    pub fn is_online(&self, user: UserId) -> bool {
        self.client.is_online(user)
    }

    /// Connection lifecycle state, for the status bar.
    pub fn connection_state(&self) -> ConnectionState {
        self.client.connection_state()
    }

    /// Underlying chat state, for assertions in tests and simulations.
    pub fn client(&self) -> &ChatClient<E::Instant> {
        &self.client
    }

    /// Rows available to the chat pane, reported by the frontend.
    pub fn chat_height(&self) -> u16 {
        self.chat_height
    }

    /// Record the chat pane height after a layout pass.
    pub fn set_chat_height(&mut self, height: u16) {
        self.chat_height = height.max(1);
    }

    /// Map client actions to app actions, folding user-facing ones into
    /// the status line.
    fn absorb(&mut self, client_actions: Vec<ClientAction>) -> Vec<AppAction> {
        let mut actions = Vec::new();
        for client_action in client_actions {
            match client_action {
                ClientAction::Transmit(frame) => actions.push(AppAction::Transmit(frame)),
                ClientAction::SessionEnded { reason } => {
                    tracing::info!(%reason, "session ended");
                    self.set_status(format!("Disconnected: {reason}. Restart to reconnect."));
                },
                ClientAction::FetchTimedOut { user, page } => {
                    tracing::debug!(%user, page, "history fetch timed out");
                    let label = self.window_label(user);
                    self.set_status(format!("History for {label} timed out; scroll to retry"));
                },
            }
        }
        actions
    }

    fn find_friend(&self, name: &str) -> Option<&Friend> {
        self.friends
            .iter()
            .find(|friend| friend.username.eq_ignore_ascii_case(name))
            .or_else(|| {
                self.friends
                    .iter()
                    .find(|friend| friend.display_name().eq_ignore_ascii_case(name))
            })
    }

    fn window_label(&self, user: UserId) -> String {
        self.client
            .conversation(user)
            .map(|conversation| conversation.descriptor().display_name.clone())
            .or_else(|| {
                self.friends
                    .iter()
                    .find(|friend| friend.id == user)
                    .map(Friend::display_name)
            })
            .unwrap_or_else(|| format!("user {user}"))
    }
}
