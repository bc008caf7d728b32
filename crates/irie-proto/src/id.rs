//! Identity types shared across the protocol and client layers.

use std::{cmp::Ordering, fmt, num::ParseIntError, str::FromStr};

use serde::{Deserialize, Serialize};

/// Numeric account id, as the backend stores and transmits it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(pub i64);

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for UserId {
    fn from(raw: i64) -> Self {
        Self(raw)
    }
}

impl FromStr for UserId {
    type Err = ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.parse::<i64>().map(Self)
    }
}

/// Total-order key for messages in a conversation buffer.
///
/// Delivered and historical messages carry a database row id; an optimistic
/// local message carries a client-assigned counter until it is reconciled
/// with the server row. Every local id orders after every server id, so a
/// just-composed message always sits at the newest end of the buffer no
/// matter how large the server's id space grows.
///
/// # Invariants
///
/// - `Server(a) < Server(b)` iff `a < b`, likewise for `Local`
/// - `Server(_) < Local(_)` for all values
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MessageId {
    /// Database row id assigned by the backend.
    Server(i64),
    /// Client-local id assigned on optimistic append.
    Local(u64),
}

impl MessageId {
    /// True for ids assigned by the backend.
    #[must_use]
    pub fn is_server(self) -> bool {
        matches!(self, Self::Server(_))
    }

    /// True for provisional client-assigned ids.
    #[must_use]
    pub fn is_local(self) -> bool {
        matches!(self, Self::Local(_))
    }
}

impl Ord for MessageId {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Self::Server(a), Self::Server(b)) => a.cmp(b),
            (Self::Local(a), Self::Local(b)) => a.cmp(b),
            (Self::Server(_), Self::Local(_)) => Ordering::Less,
            (Self::Local(_), Self::Server(_)) => Ordering::Greater,
        }
    }
}

impl PartialOrd for MessageId {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Server(id) => write!(f, "#{id}"),
            Self::Local(id) => write!(f, "local:{id}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn server_ids_order_numerically() {
        assert!(MessageId::Server(1) < MessageId::Server(2));
        assert!(MessageId::Server(-5) < MessageId::Server(0));
    }

    #[test]
    fn local_ids_follow_all_server_ids() {
        assert!(MessageId::Server(i64::MAX) < MessageId::Local(0));
        assert!(MessageId::Local(0) < MessageId::Local(1));
    }

    #[test]
    fn user_id_round_trips_through_json() {
        let id = UserId(42);
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "42");
        let back: UserId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, id);
    }

    #[test]
    fn user_id_parses_from_str() {
        assert_eq!("17".parse::<UserId>().unwrap(), UserId(17));
        assert!("seventeen".parse::<UserId>().is_err());
    }
}
