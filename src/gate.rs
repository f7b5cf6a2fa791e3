//! Time-boxed restriction gate.
//!
//! A gate is either inactive or active until some instant. Expiry is lazy:
//! nothing fires when the instant passes, the next check simply sees that the
//! window has closed. Windows are kept per chat or once for the whole
//! process, depending on [`GateScope`].

use crate::clock::Clock;
use crate::error::DurationError;
use chrono::{DateTime, TimeDelta, Utc};
use serde::Deserialize;
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use teloxide::types::ChatId;
use tokio::sync::Mutex;

/// Unit accepted by `/blockca`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DurationUnit {
    Minute,
    Hour,
    Day,
}

impl DurationUnit {
    fn from_word(word: &str) -> Option<Self> {
        match word {
            "minute" | "minutes" => Some(DurationUnit::Minute),
            "hour" | "hours" => Some(DurationUnit::Hour),
            "day" | "days" => Some(DurationUnit::Day),
            _ => None,
        }
    }

    fn delta(self, amount: i64) -> Option<TimeDelta> {
        match self {
            DurationUnit::Minute => TimeDelta::try_minutes(amount),
            DurationUnit::Hour => TimeDelta::try_hours(amount),
            DurationUnit::Day => TimeDelta::try_days(amount),
        }
    }
}

/// A parsed `/blockca <amount> <unit>` argument.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockDuration {
    amount: u32,
    unit: DurationUnit,
    /// Unit word as the admin typed it, echoed back in replies.
    unit_word: String,
}

impl BlockDuration {
    /// Parse whitespace-separated `<amount> <unit>` arguments.
    pub fn parse(args: &str) -> Result<Self, DurationError> {
        let parts: Vec<&str> = args.split_whitespace().collect();
        let [amount, unit] = parts.as_slice() else {
            return Err(DurationError::WrongArity(parts.len()));
        };

        let amount = amount
            .parse::<u32>()
            .ok()
            .filter(|a| *a > 0)
            .ok_or_else(|| DurationError::InvalidAmount(amount.to_string()))?;

        let unit_word = unit.to_string();
        let unit = DurationUnit::from_word(unit)
            .ok_or_else(|| DurationError::InvalidUnit(unit_word.clone()))?;

        Ok(Self {
            amount,
            unit,
            unit_word,
        })
    }

    pub fn amount(&self) -> u32 {
        self.amount
    }

    pub fn unit(&self) -> DurationUnit {
        self.unit
    }

    /// Length of the window.
    pub fn to_time_delta(&self) -> Result<TimeDelta, DurationError> {
        self.unit
            .delta(i64::from(self.amount))
            .ok_or_else(|| self.out_of_range())
    }

    fn out_of_range(&self) -> DurationError {
        DurationError::OutOfRange {
            amount: self.amount,
            unit: self.unit_word.clone(),
        }
    }
}

impl FromStr for BlockDuration {
    type Err = DurationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for BlockDuration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.amount, self.unit_word)
    }
}

/// Observable state of a gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateState {
    Inactive,
    Active { expires_at: DateTime<Utc> },
}

/// Whether block windows are shared across chats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GateScope {
    /// One window per chat.
    #[default]
    Chat,
    /// A single window that governs every chat the bot serves.
    Global,
}

impl FromStr for GateScope {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "chat" => Ok(GateScope::Chat),
            "global" => Ok(GateScope::Global),
            other => Err(other.to_string()),
        }
    }
}

impl fmt::Display for GateScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GateScope::Chat => write!(f, "chat"),
            GateScope::Global => write!(f, "global"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum GateKey {
    Global,
    Chat(ChatId),
}

/// Owner of every block window.
pub struct GateRegistry {
    scope: GateScope,
    clock: Arc<dyn Clock>,
    windows: Mutex<HashMap<GateKey, DateTime<Utc>>>,
}

impl GateRegistry {
    pub fn new(scope: GateScope, clock: Arc<dyn Clock>) -> Self {
        Self {
            scope,
            clock,
            windows: Mutex::new(HashMap::new()),
        }
    }

    pub fn scope(&self) -> GateScope {
        self.scope
    }

    fn key(&self, chat_id: ChatId) -> GateKey {
        match self.scope {
            GateScope::Chat => GateKey::Chat(chat_id),
            GateScope::Global => GateKey::Global,
        }
    }

    /// Activate the gate for `duration` from now, replacing any running
    /// window. Expired windows of other chats are dropped on the way. On
    /// error the previous state is kept.
    pub async fn start(
        &self,
        chat_id: ChatId,
        duration: &BlockDuration,
    ) -> Result<DateTime<Utc>, DurationError> {
        let delta = duration.to_time_delta()?;
        let now = self.clock.now();
        let expires_at = now
            .checked_add_signed(delta)
            .ok_or_else(|| duration.out_of_range())?;

        let mut windows = self.windows.lock().await;
        windows.retain(|_, window_end| now < *window_end);
        windows.insert(self.key(chat_id), expires_at);
        drop(windows);

        tracing::info!(chat_id = chat_id.0, %expires_at, "Block window started");
        Ok(expires_at)
    }

    /// Deactivate the gate. Stopping an inactive gate is a no-op.
    pub async fn stop(&self, chat_id: ChatId) {
        let removed = self.windows.lock().await.remove(&self.key(chat_id));
        if removed.is_some() {
            tracing::info!(chat_id = chat_id.0, "Block window stopped");
        }
    }

    /// Current state, dropping the window if it has already expired.
    pub async fn state(&self, chat_id: ChatId) -> GateState {
        let key = self.key(chat_id);
        let mut windows = self.windows.lock().await;

        match windows.get(&key).copied() {
            Some(expires_at) if self.clock.now() < expires_at => GateState::Active { expires_at },
            Some(_) => {
                windows.remove(&key);
                GateState::Inactive
            }
            None => GateState::Inactive,
        }
    }

    pub async fn is_active(&self, chat_id: ChatId) -> bool {
        matches!(self.state(chat_id).await, GateState::Active { .. })
    }

    #[cfg(test)]
    async fn tracked_windows(&self) -> usize {
        self.windows.lock().await.len()
    }

    /// Time left in the active window, `None` when inactive.
    pub async fn remaining(&self, chat_id: ChatId) -> Option<TimeDelta> {
        match self.state(chat_id).await {
            GateState::Active { expires_at } => Some(expires_at - self.clock.now()),
            GateState::Inactive => None,
        }
    }
}

/// Whole minutes in `delta`, rounded down and never negative.
pub fn whole_minutes(delta: TimeDelta) -> i64 {
    (delta.num_seconds() / 60).max(0)
}
