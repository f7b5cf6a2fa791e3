//! Chat platform abstraction.
//!
//! The moderator never talks to Telegram directly. Everything it needs from
//! the hosting platform (role lookups, deletions, replies, pins) goes through
//! the [`ChatPlatform`] trait so the handlers can run against a fake in tests.

mod types;

pub mod telegram;

pub use types::{IncomingMessage, Role, Sender, TextFormat};

use crate::error::PlatformError;
use async_trait::async_trait;
use teloxide::types::{ChatId, MessageId, UserId};

/// Operations the moderator needs from the hosting chat platform.
#[async_trait]
pub trait ChatPlatform: Send + Sync {
    /// Look up a user's role in a chat.
    async fn member_role(&self, chat_id: ChatId, user_id: UserId) -> Result<Role, PlatformError>;

    /// Delete a message.
    async fn delete_message(
        &self,
        chat_id: ChatId,
        message_id: MessageId,
    ) -> Result<(), PlatformError>;

    /// Send text to a chat, optionally as a reply.
    ///
    /// # Returns
    /// The id of the sent message.
    async fn send_text(
        &self,
        chat_id: ChatId,
        text: &str,
        format: TextFormat,
        reply_to: Option<MessageId>,
    ) -> Result<MessageId, PlatformError>;

    /// Pin a message.
    async fn pin_message(
        &self,
        chat_id: ChatId,
        message_id: MessageId,
        notify: bool,
    ) -> Result<(), PlatformError>;

    /// Get the platform name for logging purposes.
    fn platform_name(&self) -> &'static str;
}
