//! User-facing reply texts.

use crate::gate::BlockDuration;
use crate::platform::telegram::escape_markdown;

pub const CA_RESTRICTED: &str = "🚫 Sharing CAs is restricted right now.";
pub const BLOCK_USAGE: &str = "Usage: /blockca <amount> <unit>\nExample: /blockca 2 hours";
pub const BLOCK_DENIED: &str = "Only admins can use this command.";
pub const UNBLOCK_DENIED: &str = "Only admins can unblock.";
pub const UNBLOCKED: &str = "✅ CA sharing is now allowed.";
pub const STATUS_ALLOWED: &str = "✅ CA sharing is currently allowed.";
pub const ROLE_LOOKUP_FAILED: &str = "⚠️ Could not verify your permissions. Please try again.";

/// MarkdownV2 help text for `/helpca`.
pub const HELP: &str = r#"📚 *CA Blocker Bot Help*

Use these commands to manage CA sharing in the group:
• /blockca <amount\> <unit\> \- Block CA sharing for a time period\.
   Example: /blockca 30 minutes
• /unblockca \- Unblock CA sharing immediately\.
• /statusca \- Check if blocking is active\.
• /helpca \- Show this help message\.

🚨 Note: Only admins can use /blockca and /unblockca\."#;

/// Confirmation sent to the admin who started a block.
pub fn blocked(duration: &BlockDuration) -> String {
    format!("✅ CA sharing blocked for {}.", duration)
}

/// MarkdownV2 announcement pinned when a block starts.
pub fn announcement(duration: &BlockDuration) -> String {
    format!(
        "🚫 *Attention Everyone\\!*\n\n\
        CA \\(Crypto Addresses\\) sharing has been *temporarily blocked* in this group\\.\n\n\
        ⏳ Duration: {}\n\
        👮 Only admins are allowed to share addresses during this time\\.\n\n\
        Please refrain from posting any wallet addresses until the restriction is lifted\\.\n\
        Thank you for understanding\\!",
        escape_markdown(&duration.to_string())
    )
}

/// Status text for an active block.
pub fn status_blocked(remaining_minutes: i64) -> String {
    format!(
        "🚫 CA sharing is currently blocked.\n🕒 Time remaining: {} minutes.",
        remaining_minutes
    )
}
