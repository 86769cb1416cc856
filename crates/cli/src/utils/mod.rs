//! Argument parsing helpers

use std::ops::Deref;
use std::str::FromStr;

/// Bytes given on the command line as hex
///
/// Whitespace, `:` separators and a leading `0x` are accepted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HexBytes(Vec<u8>);

impl HexBytes {
    /// Take the decoded bytes
    pub fn into_inner(self) -> Vec<u8> {
        self.0
    }
}

impl FromStr for HexBytes {
    type Err = hex::FromHexError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let s = s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")).unwrap_or(s);
        let digits: String = s
            .chars()
            .filter(|c| !c.is_whitespace() && *c != ':')
            .collect();
        hex::decode(digits).map(Self)
    }
}

impl Deref for HexBytes {
    type Target = [u8];

    fn deref(&self) -> &[u8] {
        &self.0
    }
}

/// Parse a single byte written in hex, with or without `0x`
pub fn parse_byte(s: &str) -> Result<u8, String> {
    let digits = s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")).unwrap_or(s);
    u8::from_str_radix(digits, 16).map_err(|err| format!("invalid byte '{s}': {err}"))
}
