//! Test doubles: an in-memory platform, a manual clock and Telegram
//! message fixtures.

use crate::clock::Clock;
use crate::error::PlatformError;
use crate::platform::{ChatPlatform, Role, TextFormat};
use async_trait::async_trait;
use chrono::{DateTime, TimeDelta, Utc};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicI32, Ordering};
use std::sync::Mutex;
use teloxide::types::{ChatId, Message, MessageId, Update, UserId};

/// Clock that only moves when told to. Used to simulate expiry.
#[derive(Debug)]
pub struct ManualClock {
    now: Mutex<DateTime<Utc>>,
}

impl ManualClock {
    /// Move the clock forward.
    pub fn advance(&self, delta: TimeDelta) {
        *self.now.lock().unwrap() += delta;
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self {
            now: Mutex::new(Utc::now()),
        }
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock().unwrap()
    }
}

/// Bot API JSON for a supergroup text message from a regular user.
/// Keys in `overrides` replace or extend the defaults.
pub fn message_json(chat_id: i64, text: &str, overrides: Value) -> Value {
    let mut msg = json!({
        "message_id": 77,
        "date": 1_700_000_000,
        "chat": { "id": chat_id, "title": "Test group", "type": "supergroup" },
        "from": { "id": 3, "is_bot": false, "first_name": "Member" },
        "text": text,
    });
    if let (Some(base), Some(extra)) = (msg.as_object_mut(), overrides.as_object()) {
        for (key, value) in extra {
            if value.is_null() {
                base.remove(key);
            } else {
                base.insert(key.clone(), value.clone());
            }
        }
    }
    msg
}

/// Deserialize a supergroup text message, see [`message_json`].
pub fn telegram_message(chat_id: i64, text: &str, overrides: Value) -> Message {
    serde_json::from_value(message_json(chat_id, text, overrides)).unwrap()
}

/// Wrap message JSON in an update under `kind` (`message`, `edited_message`).
pub fn telegram_update(kind: &str, message: Value) -> Update {
    // teloxide's Update deserializer only works from a string source, not a Value.
    serde_json::from_str(&json!({ "update_id": 1, kind: message }).to_string()).unwrap()
}

/// A recorded platform call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    RoleLookup(ChatId, UserId),
    Delete(ChatId, MessageId),
    Send {
        chat_id: ChatId,
        text: String,
        format: TextFormat,
        reply_to: Option<MessageId>,
    },
    Pin(ChatId, MessageId, bool),
}

/// Platform fake that records every call and can be told to fail.
pub struct RecordingPlatform {
    roles: HashMap<UserId, Role>,
    calls: Mutex<Vec<Call>>,
    next_message_id: AtomicI32,
    fail_role_lookups: AtomicBool,
    fail_deletes: AtomicBool,
    fail_pins: AtomicBool,
}

impl RecordingPlatform {
    pub fn new() -> Self {
        Self {
            roles: HashMap::new(),
            calls: Mutex::new(Vec::new()),
            next_message_id: AtomicI32::new(1000),
            fail_role_lookups: AtomicBool::new(false),
            fail_deletes: AtomicBool::new(false),
            fail_pins: AtomicBool::new(false),
        }
    }

    pub fn with_role(mut self, user_id: UserId, role: Role) -> Self {
        self.roles.insert(user_id, role);
        self
    }

    pub fn fail_role_lookups(&self) {
        self.fail_role_lookups.store(true, Ordering::SeqCst);
    }

    pub fn fail_deletes(&self) {
        self.fail_deletes.store(true, Ordering::SeqCst);
    }

    pub fn fail_pins(&self) {
        self.fail_pins.store(true, Ordering::SeqCst);
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn clear(&self) {
        self.calls.lock().unwrap().clear();
    }

    /// Texts of every message sent, in order.
    pub fn sent_texts(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                Call::Send { text, .. } => Some(text),
                _ => None,
            })
            .collect()
    }

    pub fn deleted_count(&self) -> usize {
        self.calls()
            .iter()
            .filter(|c| matches!(c, Call::Delete(..)))
            .count()
    }

    /// Id handed out for the most recent send.
    pub fn last_sent_id(&self) -> Option<MessageId> {
        let last = self.next_message_id.load(Ordering::SeqCst) - 1;
        (last >= 1000).then_some(MessageId(last))
    }

    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }
}

#[async_trait]
impl ChatPlatform for RecordingPlatform {
    async fn member_role(&self, chat_id: ChatId, user_id: UserId) -> Result<Role, PlatformError> {
        self.record(Call::RoleLookup(chat_id, user_id));
        if self.fail_role_lookups.load(Ordering::SeqCst) {
            return Err(PlatformError::Other("getChatMember failed".to_string()));
        }
        Ok(self.roles.get(&user_id).copied().unwrap_or(Role::Member))
    }

    async fn delete_message(
        &self,
        chat_id: ChatId,
        message_id: MessageId,
    ) -> Result<(), PlatformError> {
        if self.fail_deletes.load(Ordering::SeqCst) {
            return Err(PlatformError::Other("message can't be deleted".to_string()));
        }
        self.record(Call::Delete(chat_id, message_id));
        Ok(())
    }

    async fn send_text(
        &self,
        chat_id: ChatId,
        text: &str,
        format: TextFormat,
        reply_to: Option<MessageId>,
    ) -> Result<MessageId, PlatformError> {
        self.record(Call::Send {
            chat_id,
            text: text.to_string(),
            format,
            reply_to,
        });
        Ok(MessageId(self.next_message_id.fetch_add(1, Ordering::SeqCst)))
    }

    async fn pin_message(
        &self,
        chat_id: ChatId,
        message_id: MessageId,
        notify: bool,
    ) -> Result<(), PlatformError> {
        if self.fail_pins.load(Ordering::SeqCst) {
            return Err(PlatformError::Other("not enough rights to pin".to_string()));
        }
        self.record(Call::Pin(chat_id, message_id, notify));
        Ok(())
    }

    fn platform_name(&self) -> &'static str {
        "Recording"
    }
}
