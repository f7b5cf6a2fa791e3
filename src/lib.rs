//! CA blocker bot library.
//!
//! Detects crypto addresses in group messages and removes them while an
//! administrator-started block window is open.

pub mod bot;
pub mod classifier;
pub mod cli;
pub mod clock;
pub mod config;
pub mod error;
pub mod gate;
pub mod moderator;
pub mod platform;
pub mod replies;

#[cfg(test)]
mod testing;

// Re-export commonly used types
pub use classifier::{find_addresses, is_ca_message};
pub use config::Config;
pub use gate::{BlockDuration, GateRegistry, GateScope, GateState};
pub use moderator::{MessageAction, Moderator};
pub use platform::{ChatPlatform, IncomingMessage, Role, Sender, TextFormat};
