//! Telegram platform implementation.
//!
//! Implements the ChatPlatform trait on top of a teloxide `Bot`.

use super::{ChatPlatform, IncomingMessage, Role, Sender, TextFormat};
use crate::error::PlatformError;
use async_trait::async_trait;
use teloxide::prelude::*;
use teloxide::types::{ChatId, ChatMemberKind, MessageId, ParseMode, ReplyParameters, UserId};

/// Telegram access for the moderator.
#[derive(Clone)]
pub struct TelegramPlatform {
    bot: Bot,
}

impl TelegramPlatform {
    /// Create a new Telegram platform around an existing bot handle.
    pub fn new(bot: Bot) -> Self {
        Self { bot }
    }
}

#[async_trait]
impl ChatPlatform for TelegramPlatform {
    async fn member_role(&self, chat_id: ChatId, user_id: UserId) -> Result<Role, PlatformError> {
        let member = self.bot.get_chat_member(chat_id, user_id).await?;
        Ok(role_from_kind(&member.kind))
    }

    async fn delete_message(
        &self,
        chat_id: ChatId,
        message_id: MessageId,
    ) -> Result<(), PlatformError> {
        self.bot.delete_message(chat_id, message_id).await?;
        Ok(())
    }

    async fn send_text(
        &self,
        chat_id: ChatId,
        text: &str,
        format: TextFormat,
        reply_to: Option<MessageId>,
    ) -> Result<MessageId, PlatformError> {
        let mut request = self.bot.send_message(chat_id, text);
        if format == TextFormat::MarkdownV2 {
            request = request.parse_mode(ParseMode::MarkdownV2);
        }
        if let Some(message_id) = reply_to {
            // The message being answered may already be deleted.
            request = request
                .reply_parameters(ReplyParameters::new(message_id).allow_sending_without_reply());
        }

        let sent = request.await?;
        Ok(sent.id)
    }

    async fn pin_message(
        &self,
        chat_id: ChatId,
        message_id: MessageId,
        notify: bool,
    ) -> Result<(), PlatformError> {
        self.bot
            .pin_chat_message(chat_id, message_id)
            .disable_notification(!notify)
            .await?;
        Ok(())
    }

    fn platform_name(&self) -> &'static str {
        "Telegram"
    }
}

/// Map a Bot API member status onto a role.
fn role_from_kind(kind: &ChatMemberKind) -> Role {
    if kind.is_owner() {
        Role::Creator
    } else if kind.is_administrator() {
        Role::Administrator
    } else if kind.is_banned() {
        Role::Banned
    } else if kind.is_left() {
        Role::Left
    } else if kind.is_restricted() {
        Role::Restricted
    } else {
        Role::Member
    }
}

/// Extract the moderated parts of a Telegram message.
///
/// Returns `None` for messages without text or without any sender.
pub fn incoming_message(msg: &Message) -> Option<IncomingMessage> {
    let text = msg.text()?;

    let sender = match (&msg.sender_chat, &msg.from) {
        (Some(chat), _) => Sender::Chat(chat.id),
        (None, Some(user)) => Sender::User(user.id),
        (None, None) => return None,
    };

    Some(IncomingMessage::new(msg.chat.id, msg.id, sender, text))
}

/// Escape special characters for Telegram MarkdownV2 format.
pub fn escape_markdown(text: &str) -> String {
    let special_chars = [
        '_', '*', '[', ']', '(', ')', '~', '`', '>', '#', '+', '-', '=', '|', '{', '}', '.', '!',
    ];
    let mut result = String::with_capacity(text.len() * 2);

    for c in text.chars() {
        if special_chars.contains(&c) {
            result.push('\\');
        }
        result.push(c);
    }

    result
}
