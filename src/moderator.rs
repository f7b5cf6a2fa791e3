//! Moderation handlers.
//!
//! One handler per admin command plus the text-message handler that removes
//! crypto addresses while a block window is open. Handlers answer user
//! mistakes (missing rights, malformed arguments) in chat and still return
//! them as errors so callers can tell what happened; collaborator failures
//! are returned without any chat reply.

use crate::classifier;
use crate::error::{ModerationError, PlatformError};
use crate::gate::{whole_minutes, BlockDuration, GateRegistry};
use crate::platform::{ChatPlatform, IncomingMessage, Sender, TextFormat};
use crate::replies;
use std::sync::Arc;
use teloxide::types::{ChatId, MessageId};

/// What the message handler did with a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageAction {
    /// No block window is open in this chat.
    GateInactive,
    /// The text contains no address.
    Clean,
    /// The sender is an administrator or the chat creator.
    Exempt,
    /// The message was deleted and a warning was posted.
    Removed,
}

/// Shared moderation state and handlers.
pub struct Moderator {
    platform: Arc<dyn ChatPlatform>,
    gates: Arc<GateRegistry>,
}

impl Moderator {
    pub fn new(platform: Arc<dyn ChatPlatform>, gates: Arc<GateRegistry>) -> Self {
        Self { platform, gates }
    }

    pub fn gates(&self) -> &GateRegistry {
        &self.gates
    }

    /// Moderate an ordinary text message.
    pub async fn handle_message(
        &self,
        msg: &IncomingMessage,
    ) -> Result<MessageAction, ModerationError> {
        if !self.gates.is_active(msg.chat_id).await {
            return Ok(MessageAction::GateInactive);
        }

        if !classifier::is_ca_message(&msg.text) {
            return Ok(MessageAction::Clean);
        }

        let privileged = self
            .is_privileged(msg.chat_id, msg.sender)
            .await
            .map_err(ModerationError::RoleLookup)?;
        if privileged {
            return Ok(MessageAction::Exempt);
        }

        tracing::debug!(
            chat_id = msg.chat_id.0,
            addresses = ?classifier::find_addresses(&msg.text),
            "Address found during block window"
        );

        self.platform
            .delete_message(msg.chat_id, msg.message_id)
            .await?;
        self.reply(msg, replies::CA_RESTRICTED, TextFormat::Plain)
            .await?;

        tracing::info!(
            chat_id = msg.chat_id.0,
            message_id = msg.message_id.0,
            "Removed message containing a crypto address"
        );
        Ok(MessageAction::Removed)
    }

    /// `/blockca <amount> <unit>`
    pub async fn block(&self, msg: &IncomingMessage, args: &str) -> Result<(), ModerationError> {
        self.require_admin(msg, replies::BLOCK_DENIED).await?;

        let duration = match BlockDuration::parse(args) {
            Ok(duration) => duration,
            Err(e) => return self.reject_usage(msg, e.into()).await,
        };
        if let Err(e) = self.gates.start(msg.chat_id, &duration).await {
            return self.reject_usage(msg, e.into()).await;
        }

        self.reply(msg, &replies::blocked(&duration), TextFormat::Plain)
            .await?;

        let announcement = self
            .reply(msg, &replies::announcement(&duration), TextFormat::MarkdownV2)
            .await?;
        self.platform
            .pin_message(msg.chat_id, announcement, false)
            .await?;

        Ok(())
    }

    /// `/unblockca`
    pub async fn unblock(&self, msg: &IncomingMessage) -> Result<(), ModerationError> {
        self.require_admin(msg, replies::UNBLOCK_DENIED).await?;

        self.gates.stop(msg.chat_id).await;
        self.reply(msg, replies::UNBLOCKED, TextFormat::Plain)
            .await?;
        Ok(())
    }

    /// `/statusca`
    pub async fn status(&self, msg: &IncomingMessage) -> Result<(), ModerationError> {
        let text = match self.gates.remaining(msg.chat_id).await {
            Some(remaining) => replies::status_blocked(whole_minutes(remaining)),
            None => replies::STATUS_ALLOWED.to_string(),
        };

        self.reply(msg, &text, TextFormat::Plain).await?;
        Ok(())
    }

    /// `/helpca`
    pub async fn help(&self, msg: &IncomingMessage) -> Result<(), ModerationError> {
        self.reply(msg, replies::HELP, TextFormat::MarkdownV2)
            .await?;
        Ok(())
    }

    /// Whether the sender may bypass moderation and run admin commands.
    ///
    /// A message sent on behalf of the chat itself comes from an anonymous
    /// administrator and needs no lookup.
    async fn is_privileged(&self, chat_id: ChatId, sender: Sender) -> Result<bool, PlatformError> {
        match sender {
            Sender::Chat(sender_chat) => Ok(sender_chat == chat_id),
            Sender::User(user_id) => {
                let role = self.platform.member_role(chat_id, user_id).await?;
                tracing::debug!(
                    chat_id = chat_id.0,
                    user_id = user_id.0,
                    %role,
                    "Member role looked up"
                );
                Ok(role.is_privileged())
            }
        }
    }

    async fn require_admin(
        &self,
        msg: &IncomingMessage,
        denied_text: &str,
    ) -> Result<(), ModerationError> {
        match self.is_privileged(msg.chat_id, msg.sender).await {
            Ok(true) => Ok(()),
            Ok(false) => {
                self.reply(msg, denied_text, TextFormat::Plain).await?;
                Err(ModerationError::PrivilegeDenied)
            }
            Err(e) => {
                if let Err(reply_err) = self
                    .reply(msg, replies::ROLE_LOOKUP_FAILED, TextFormat::Plain)
                    .await
                {
                    tracing::warn!("Failed to report role lookup failure: {}", reply_err);
                }
                Err(ModerationError::RoleLookup(e))
            }
        }
    }

    async fn reject_usage(
        &self,
        msg: &IncomingMessage,
        err: ModerationError,
    ) -> Result<(), ModerationError> {
        self.reply(msg, replies::BLOCK_USAGE, TextFormat::Plain)
            .await?;
        Err(err)
    }

    async fn reply(
        &self,
        msg: &IncomingMessage,
        text: &str,
        format: TextFormat,
    ) -> Result<MessageId, PlatformError> {
        self.platform
            .send_text(msg.chat_id, text, format, Some(msg.message_id))
            .await
    }
}
