//! Shared types for platform implementations.

use std::fmt;
use teloxide::types::{ChatId, MessageId, UserId};

/// A member's standing in a chat.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Creator,
    Administrator,
    Member,
    Restricted,
    Left,
    Banned,
}

impl Role {
    /// Creators and administrators are exempt from moderation and may run
    /// admin commands.
    pub fn is_privileged(self) -> bool {
        matches!(self, Role::Creator | Role::Administrator)
    }

    /// Bot API status string for this role.
    pub fn as_status(self) -> &'static str {
        match self {
            Role::Creator => "creator",
            Role::Administrator => "administrator",
            Role::Member => "member",
            Role::Restricted => "restricted",
            Role::Left => "left",
            Role::Banned => "kicked",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_status())
    }
}

/// Who a message was sent by.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sender {
    User(UserId),
    /// Sent on behalf of a chat: an anonymous admin posting as the group,
    /// or a channel.
    Chat(ChatId),
}

/// Markup applied to outgoing text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextFormat {
    Plain,
    MarkdownV2,
}

/// The parts of an incoming chat message the moderator looks at.
#[derive(Debug, Clone)]
pub struct IncomingMessage {
    pub chat_id: ChatId,
    pub message_id: MessageId,
    pub sender: Sender,
    pub text: String,
}

impl IncomingMessage {
    /// Create a new incoming message.
    pub fn new(
        chat_id: ChatId,
        message_id: MessageId,
        sender: Sender,
        text: impl Into<String>,
    ) -> Self {
        Self {
            chat_id,
            message_id,
            sender,
            text: text.into(),
        }
    }
}
