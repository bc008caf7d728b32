//! Slash command parsing.
//!
//! Anything typed without a leading `/` is a chat message for the active
//! conversation. Commands take the rest of the line as their argument, so
//! friend names with spaces need no quoting.

/// A parsed input line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Open (or focus) a conversation with the named friend.
    Open {
        /// Friend name as typed; matched against display names and
        /// usernames.
        name: String,
    },
    /// Close the active conversation.
    Close,
    /// Exit the client.
    Quit,
    /// Plain chat text for the active conversation.
    Message {
        /// Message body.
        content: String,
    },
    /// Unrecognized command.
    Unknown {
        /// The full line as typed, for the status bar.
        input: String,
    },
    /// Recognized command with bad arguments.
    InvalidArgs {
        /// Command name without the slash.
        command: String,
        /// What was wrong.
        error: String,
    },
}

/// Parse one submitted input line.
pub fn parse(text: &str) -> Command {
    let trimmed = text.trim();

    let Some(rest) = trimmed.strip_prefix('/') else {
        return Command::Message { content: trimmed.to_string() };
    };

    let mut parts = rest.splitn(2, char::is_whitespace);
    let command = parts.next().unwrap_or("");
    let args = parts.next().unwrap_or("").trim();

    match command {
        "open" | "o" => {
            if args.is_empty() {
                Command::InvalidArgs {
                    command: "open".to_string(),
                    error: "expected a friend name".to_string(),
                }
            } else {
                Command::Open { name: args.to_string() }
            }
        },
        "close" => Command::Close,
        "quit" | "q" => Command::Quit,
        _ => Command::Unknown { input: trimmed.to_string() },
    }
}
