//! Wire protocol constants.
//!
//! The wire format is newline-delimited UTF-8 text. These are the literal
//! lines exchanged around the username handshake and room membership
//! changes; chat messages themselves pass through verbatim.

/// Sentinel asking a freshly connected client to report its username.
pub const USERNAME_REQUEST: &str = "@username";

/// Phrase that triggers a peer's departure when found anywhere in a line.
/// Deliberately a substring match, not an exact command: a message that
/// merely mentions the phrase also counts as a request to leave.
pub const EXIT_TOKEN: &str = "exit chat";

/// Rejection notice sent when the room is at capacity.
pub const ROOM_FULL: &str = "Chat room is full. Cannot accept more connections.";

/// Acknowledgment sent to a peer that asked to leave.
pub const FAREWELL: &str = "You have left the chat room!";

/// Private welcome sequence sent to a newly admitted peer, in order.
pub const WELCOME: [&str; 4] = [
    "You have joined the chat room!",
    "Start chatting...",
    "To exit, type \"exit chat\"",
    "------------------------",
];

/// Broadcast notice that a peer joined the room.
pub fn join_notice(name: &str) -> String {
    format!("{name} joined the chat")
}

/// Broadcast notice that a peer left after an explicit exit.
pub fn leave_notice(name: &str) -> String {
    format!("{name} left the chat")
}

/// Prefix applied to operator console lines before broadcast.
pub fn server_line(text: &str) -> String {
    format!("Server: {text}")
}
