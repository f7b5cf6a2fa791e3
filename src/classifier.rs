//! Crypto address detection.
//!
//! Two fixed patterns are checked: Base58 tokens of 32-44 characters
//! (Solana-style and Bitcoin-style addresses) and `0x`-prefixed 40 digit hex
//! tokens (EVM addresses). This is purely syntactic; no checksum is verified.

use lazy_regex::lazy_regex;

/// Base58 alphabet excludes `0`, `O`, `I` and `l`.
static RE_BASE58: lazy_regex::Lazy<regex::Regex> =
    lazy_regex!(r"\b[1-9A-HJ-NP-Za-km-z]{32,44}\b");

static RE_HEX: lazy_regex::Lazy<regex::Regex> = lazy_regex!(r"\b0x[a-fA-F0-9]{40}\b");

/// Check whether the text contains anything that looks like a crypto address.
pub fn is_ca_message(text: &str) -> bool {
    RE_BASE58.is_match(text) || RE_HEX.is_match(text)
}

/// Return every address-like token in the text, Base58 matches first.
pub fn find_addresses(text: &str) -> Vec<&str> {
    RE_BASE58
        .find_iter(text)
        .chain(RE_HEX.find_iter(text))
        .map(|m| m.as_str())
        .collect()
}
