//! Long-running Telegram bot: command routing and message moderation.

use crate::clock::SystemClock;
use crate::config::Config;
use crate::error::ModerationError;
use crate::gate::GateRegistry;
use crate::moderator::{MessageAction, Moderator};
use crate::platform::telegram::{incoming_message, TelegramPlatform};
use crate::platform::ChatPlatform;
use anyhow::Result;
use std::sync::Arc;
use teloxide::dispatching::UpdateHandler;
use teloxide::prelude::*;
use teloxide::types::{ChatId, MessageEntityKind};
use teloxide::utils::command::BotCommands;

/// Available bot commands.
#[derive(BotCommands, Clone, Debug, PartialEq, Eq)]
#[command(rename_rule = "lowercase", description = "CA blocker commands:")]
pub enum Command {
    #[command(description = "Block CA sharing for a period, e.g. /blockca 2 hours")]
    BlockCa(String),
    #[command(description = "Allow CA sharing again")]
    UnblockCa,
    #[command(description = "Check if blocking is active")]
    StatusCa,
    #[command(description = "Show help")]
    HelpCa,
}

impl Command {
    fn name(&self) -> &'static str {
        match self {
            Command::BlockCa(_) => "blockca",
            Command::UnblockCa => "unblockca",
            Command::StatusCa => "statusca",
            Command::HelpCa => "helpca",
        }
    }
}

/// Whether Telegram marked the message as a bot command: a `bot_command`
/// entity at offset 0. A leading `/` alone does not make a command.
fn is_command(msg: &Message) -> bool {
    msg.entities()
        .and_then(|entities| entities.first())
        .is_some_and(|e| e.offset == 0 && matches!(e.kind, MessageEntityKind::BotCommand))
}

/// Whether a message should go through moderation rather than command routing.
fn is_plain_text(msg: Message) -> bool {
    msg.text().is_some() && !is_command(&msg)
}

/// Route a parsed command to its handler.
async fn handle_command(
    moderator: Arc<Moderator>,
    msg: Message,
    cmd: Command,
) -> ResponseResult<()> {
    let Some(incoming) = incoming_message(&msg) else {
        return Ok(());
    };

    let result = match &cmd {
        Command::BlockCa(args) => moderator.block(&incoming, args).await,
        Command::UnblockCa => moderator.unblock(&incoming).await,
        Command::StatusCa => moderator.status(&incoming).await,
        Command::HelpCa => moderator.help(&incoming).await,
    };

    if let Err(e) = result {
        log_failure(cmd.name(), msg.chat.id, &e);
    }
    Ok(())
}

/// Moderate a new or edited text message.
async fn handle_text(moderator: Arc<Moderator>, msg: Message) -> ResponseResult<()> {
    let Some(incoming) = incoming_message(&msg) else {
        return Ok(());
    };

    match moderator.handle_message(&incoming).await {
        Ok(MessageAction::Removed) => {}
        Ok(action) => tracing::trace!(chat_id = msg.chat.id.0, ?action, "Message passed"),
        Err(e) => log_failure("message", msg.chat.id, &e),
    }
    Ok(())
}

/// Failures stay inside the update that caused them.
fn log_failure(handler: &str, chat_id: ChatId, err: &ModerationError) {
    if err.is_user_error() {
        tracing::debug!(handler, chat_id = chat_id.0, "Rejected: {}", err);
    } else {
        tracing::error!(handler, chat_id = chat_id.0, "Handler failed: {}", err);
    }
}

fn schema() -> UpdateHandler<teloxide::RequestError> {
    dptree::entry()
        .branch(
            Update::filter_message()
                .branch(
                    dptree::entry()
                        .filter_command::<Command>()
                        .endpoint(handle_command),
                )
                .branch(dptree::filter(is_plain_text).endpoint(handle_text)),
        )
        .branch(
            Update::filter_edited_message()
                .branch(dptree::filter(is_plain_text).endpoint(handle_text)),
        )
}

/// Main entry point for the bot.
pub async fn run(config: Config) -> Result<()> {
    let bot = Bot::new(&config.bot_token);

    let platform: Arc<dyn ChatPlatform> = Arc::new(TelegramPlatform::new(bot.clone()));
    let gates = Arc::new(GateRegistry::new(config.gate_scope, Arc::new(SystemClock)));
    let moderator = Arc::new(Moderator::new(platform.clone(), gates));

    if let Err(e) = bot.set_my_commands(Command::bot_commands()).await {
        tracing::warn!("Failed to register command list: {}", e);
    }

    tracing::info!(
        platform = platform.platform_name(),
        scope = %config.gate_scope,
        "Starting CA blocker bot..."
    );

    Dispatcher::builder(bot, schema())
        .dependencies(dptree::deps![moderator])
        .enable_ctrlc_handler()
        .build()
        .dispatch()
        .await;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gate::{BlockDuration, GateScope};
    use crate::platform::Role;
    use crate::testing::{
        message_json, telegram_message, telegram_update, ManualClock, RecordingPlatform,
    };
    use serde_json::json;
    use teloxide::types::{UpdateKind, UserId};

    const CHAT: i64 = -100_123;
    const ADDRESS: &str = "7xKXtg2CW87d97TXJSDpbD5jBkheTqA83TZRuJosgAsU";

    async fn blocked_moderator() -> (Arc<Moderator>, Arc<RecordingPlatform>) {
        let platform = Arc::new(RecordingPlatform::new().with_role(UserId(3), Role::Member));
        let gates = Arc::new(GateRegistry::new(
            GateScope::Chat,
            Arc::new(ManualClock::default()),
        ));
        gates
            .start(ChatId(CHAT), &BlockDuration::parse("1 hour").unwrap())
            .await
            .unwrap();
        (Arc::new(Moderator::new(platform.clone(), gates)), platform)
    }

    #[test]
    fn test_parse_commands() {
        assert_eq!(
            Command::parse("/blockca 2 hours", "ca_blocker_bot").unwrap(),
            Command::BlockCa("2 hours".to_string())
        );
        assert_eq!(
            Command::parse("/blockca@ca_blocker_bot 30 minutes", "ca_blocker_bot").unwrap(),
            Command::BlockCa("30 minutes".to_string())
        );
        assert_eq!(
            Command::parse("/unblockca", "ca_blocker_bot").unwrap(),
            Command::UnblockCa
        );
        assert_eq!(
            Command::parse("/statusca", "ca_blocker_bot").unwrap(),
            Command::StatusCa
        );
        assert_eq!(
            Command::parse("/helpca", "ca_blocker_bot").unwrap(),
            Command::HelpCa
        );
    }

    #[test]
    fn test_unknown_command_is_rejected() {
        assert!(Command::parse("/start", "ca_blocker_bot").is_err());
    }

    #[test]
    fn test_slash_without_command_entity_is_moderated() {
        let msg = telegram_message(CHAT, &format!("/ {ADDRESS}"), json!({ "entities": [] }));
        assert!(!is_command(&msg));
        assert!(is_plain_text(msg));

        let msg = telegram_message(CHAT, &format!("/{ADDRESS}"), json!({}));
        assert!(is_plain_text(msg));
    }

    #[test]
    fn test_command_entity_at_start_is_routed_as_command() {
        let msg = telegram_message(
            CHAT,
            "/statusca",
            json!({ "entities": [{ "type": "bot_command", "offset": 0, "length": 9 }] }),
        );
        assert!(is_command(&msg));
        assert!(!is_plain_text(msg));
    }

    #[test]
    fn test_command_entity_later_in_text_is_moderated() {
        let text = format!("{ADDRESS} /statusca");
        let msg = telegram_message(
            CHAT,
            &text,
            json!({ "entities": [{ "type": "bot_command", "offset": 45, "length": 9 }] }),
        );
        assert!(is_plain_text(msg));
    }

    #[test]
    fn test_edited_message_update_is_moderated() {
        let edited = message_json(CHAT, ADDRESS, json!({ "edit_date": 1_700_000_100 }));
        let update = telegram_update("edited_message", edited);
        let UpdateKind::EditedMessage(msg) = update.kind else {
            panic!("expected an edited message update");
        };
        assert_eq!(msg.chat.id, ChatId(CHAT));
        assert!(is_plain_text(msg));
    }

    #[test]
    fn test_message_without_text_is_skipped() {
        let msg = telegram_message(
            CHAT,
            "",
            json!({ "text": null, "new_chat_title": "Renamed group" }),
        );
        assert!(!is_plain_text(msg));
    }

    #[tokio::test]
    async fn test_slash_prefixed_address_is_removed() {
        let (moderator, platform) = blocked_moderator().await;
        let msg = telegram_message(CHAT, &format!("/ {ADDRESS}"), json!({ "entities": [] }));
        assert!(is_plain_text(msg.clone()));

        handle_text(moderator, msg).await.unwrap();
        assert_eq!(platform.deleted_count(), 1);
    }

    #[tokio::test]
    async fn test_edited_address_is_removed() {
        let (moderator, platform) = blocked_moderator().await;
        let edited = message_json(CHAT, ADDRESS, json!({ "edit_date": 1_700_000_100 }));
        let UpdateKind::EditedMessage(msg) = telegram_update("edited_message", edited).kind
        else {
            panic!("expected an edited message update");
        };

        handle_text(moderator, msg).await.unwrap();
        assert_eq!(platform.deleted_count(), 1);
    }
}
