//! The friends list, as the backend serves it.

use irie_core::ConversationDescriptor;
use irie_proto::UserId;
use serde::{Deserialize, Serialize};

/// One accepted friend, from `GET /friends`.
///
/// Key spellings are the backend's: camelCase names next to a snake_case
/// avatar field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Friend {
    /// Account id; the conversation counterpart key.
    pub id: UserId,

    /// Given name.
    #[serde(rename = "firstName")]
    pub first_name: String,

    /// Family name.
    #[serde(rename = "lastName")]
    pub last_name: String,

    /// Avatar image URL. The backend serves an empty string when unset.
    #[serde(default)]
    pub avatar_url: Option<String>,

    /// Unique handle.
    pub username: String,
}

impl Friend {
    /// Name shown in rosters and window headers: the handle, falling back
    /// to the real name for accounts without one.
    #[must_use]
    pub fn display_name(&self) -> String {
        if self.username.is_empty() {
            let full = format!("{} {}", self.first_name, self.last_name);
            full.trim().to_string()
        } else {
            self.username.clone()
        }
    }

    /// Window identity for a conversation with this friend.
    #[must_use]
    pub fn descriptor(&self) -> ConversationDescriptor {
        ConversationDescriptor {
            user: self.id,
            display_name: self.display_name(),
            avatar_url: self.avatar_url.clone().filter(|url| !url.is_empty()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_backend_rows() {
        let json = r#"[
            {"id":1,"firstName":"John","lastName":"Doe","avatar_url":"avatar1.png","username":"user1"},
            {"id":2,"firstName":"Jane","lastName":"Smith","avatar_url":"","username":"user2"}
        ]"#;

        let friends: Vec<Friend> = serde_json::from_str(json).unwrap();
        assert_eq!(friends.len(), 2);
        assert_eq!(friends[0].id, UserId(1));
        assert_eq!(friends[0].first_name, "John");
        assert_eq!(friends[0].avatar_url.as_deref(), Some("avatar1.png"));
    }

    #[test]
    fn tolerates_missing_avatar() {
        let json = r#"{"id":3,"firstName":"Ana","lastName":"Lima","username":"ana"}"#;
        let friend: Friend = serde_json::from_str(json).unwrap();
        assert_eq!(friend.avatar_url, None);
    }

    #[test]
    fn display_name_prefers_the_handle() {
        let friend = Friend {
            id: UserId(4),
            first_name: "Kai".to_string(),
            last_name: "Ito".to_string(),
            avatar_url: None,
            username: "kai42".to_string(),
        };
        assert_eq!(friend.display_name(), "kai42");

        let nameless = Friend { username: String::new(), ..friend };
        assert_eq!(nameless.display_name(), "Kai Ito");
    }

    #[test]
    fn descriptor_drops_empty_avatars() {
        let friend = Friend {
            id: UserId(5),
            first_name: "Mo".to_string(),
            last_name: "Diaby".to_string(),
            avatar_url: Some(String::new()),
            username: "mo".to_string(),
        };

        let descriptor = friend.descriptor();
        assert_eq!(descriptor.user, UserId(5));
        assert_eq!(descriptor.display_name, "mo");
        assert_eq!(descriptor.avatar_url, None);
    }
}
