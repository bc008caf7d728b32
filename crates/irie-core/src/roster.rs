//! The set of open conversation windows, plus per-user unread and presence
//! state that outlives any individual window.

use std::collections::{HashMap, HashSet};

use irie_proto::UserId;

use crate::conversation::{Conversation, ConversationDescriptor};

/// Open windows in activation order (most recently opened last), with
/// unread counters and online/offline flags keyed by counterpart.
///
/// Unread and presence state is intentionally kept outside [`Conversation`]:
/// messages for a closed window still bump the counter, and presence frames
/// arrive for friends with no window at all.
#[derive(Debug, Clone, Default)]
pub struct Roster {
    conversations: Vec<Conversation>,
    unread: HashMap<UserId, u32>,
    online: HashSet<UserId>,
}

impl Roster {
    /// Empty roster: no windows, no unread, everyone offline.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Open a window for `descriptor.user`, or re-activate an existing one.
    ///
    /// Returns `true` when the window is newly created. Reopening moves the
    /// window to the back of the activation order but keeps its buffer and
    /// pagination state untouched.
    pub fn open(&mut self, descriptor: ConversationDescriptor) -> bool {
        if let Some(index) = self.position(descriptor.user) {
            let existing = self.conversations.remove(index);
            self.conversations.push(existing);
            return false;
        }
        self.conversations.push(Conversation::new(descriptor));
        true
    }

    /// Close the window for `user`, dropping its buffer and pagination
    /// state. Returns `false` when no such window is open.
    pub fn close(&mut self, user: UserId) -> bool {
        match self.position(user) {
            Some(index) => {
                self.conversations.remove(index);
                true
            }
            None => false,
        }
    }

    /// The open window for `user`, if any.
    #[must_use]
    pub fn get(&self, user: UserId) -> Option<&Conversation> {
        self.conversations.iter().find(|c| c.user() == user)
    }

    /// Mutable access to the open window for `user`, if any.
    pub fn get_mut(&mut self, user: UserId) -> Option<&mut Conversation> {
        self.conversations.iter_mut().find(|c| c.user() == user)
    }

    /// Open windows in activation order, most recently opened last.
    pub fn iter(&self) -> impl Iterator<Item = &Conversation> {
        self.conversations.iter()
    }

    /// Number of open windows.
    #[must_use]
    pub fn len(&self) -> usize {
        self.conversations.len()
    }

    /// True when no window is open.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.conversations.is_empty()
    }

    /// True when a window for `user` is open.
    #[must_use]
    pub fn contains(&self, user: UserId) -> bool {
        self.position(user).is_some()
    }

    /// Bump the unread counter for `user` and return the new count.
    pub fn record_unread(&mut self, user: UserId) -> u32 {
        let count = self.unread.entry(user).or_insert(0);
        *count += 1;
        *count
    }

    /// Reset the unread counter for `user`.
    pub fn clear_unread(&mut self, user: UserId) {
        self.unread.remove(&user);
    }

    /// Current unread count for `user`.
    #[must_use]
    pub fn unread(&self, user: UserId) -> u32 {
        self.unread.get(&user).copied().unwrap_or(0)
    }

    /// Record a presence transition for `user`.
    pub fn set_online(&mut self, user: UserId, online: bool) {
        if online {
            self.online.insert(user);
        } else {
            self.online.remove(&user);
        }
    }

    /// True when the server has reported `user` online.
    #[must_use]
    pub fn is_online(&self, user: UserId) -> bool {
        self.online.contains(&user)
    }

    fn position(&self, user: UserId) -> Option<usize> {
        self.conversations.iter().position(|c| c.user() == user)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn descriptor(id: i64) -> ConversationDescriptor {
        ConversationDescriptor {
            user: UserId(id),
            display_name: format!("user-{id}"),
            avatar_url: None,
        }
    }

    fn open_order(roster: &Roster) -> Vec<UserId> {
        roster.iter().map(Conversation::user).collect()
    }

    #[test]
    fn open_is_keyed_by_counterpart() {
        let mut roster = Roster::new();
        assert!(roster.open(descriptor(1)));
        assert!(roster.open(descriptor(2)));
        assert!(!roster.open(descriptor(1)));
        assert_eq!(roster.len(), 2);
    }

    #[test]
    fn reopen_moves_window_to_back_and_keeps_state() {
        let mut roster = Roster::new();
        roster.open(descriptor(1));
        roster.open(descriptor(2));
        roster.open(descriptor(3));

        roster.get_mut(UserId(1)).unwrap().advance_page();
        roster.open(descriptor(1));

        assert_eq!(open_order(&roster), vec![UserId(2), UserId(3), UserId(1)]);
        // Pagination survived the reopen.
        assert_eq!(roster.get(UserId(1)).unwrap().next_page(), 2);
    }

    #[test]
    fn close_destroys_window_state() {
        let mut roster = Roster::new();
        roster.open(descriptor(1));
        roster.get_mut(UserId(1)).unwrap().advance_page();

        assert!(roster.close(UserId(1)));
        assert!(!roster.close(UserId(1)));

        // Opening again starts from scratch.
        assert!(roster.open(descriptor(1)));
        assert_eq!(roster.get(UserId(1)).unwrap().next_page(), 1);
    }

    #[test]
    fn unread_counts_accumulate_until_cleared() {
        let mut roster = Roster::new();
        assert_eq!(roster.record_unread(UserId(9)), 1);
        assert_eq!(roster.record_unread(UserId(9)), 2);
        assert_eq!(roster.unread(UserId(9)), 2);
        assert_eq!(roster.unread(UserId(8)), 0);

        roster.clear_unread(UserId(9));
        assert_eq!(roster.unread(UserId(9)), 0);
    }

    #[test]
    fn presence_tracks_latest_transition() {
        let mut roster = Roster::new();
        assert!(!roster.is_online(UserId(4)));
        roster.set_online(UserId(4), true);
        assert!(roster.is_online(UserId(4)));
        roster.set_online(UserId(4), false);
        assert!(!roster.is_online(UserId(4)));
    }
}
