//! Validation errors for identifiers
//!
//! Raised when an address string, pair or path cannot be turned into a
//! well-formed identifier.

use crate::Address;
use thiserror::Error;

/// Errors that can occur while building addresses, pairs and paths
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Address string does not hold exactly 40 hex digits
    #[error("Invalid address length: expected 40 hex digits, got {len}")]
    InvalidAddressLength { len: usize },

    /// Address string holds a non-hex character
    #[error("Invalid address hex: '{input}'")]
    InvalidAddressHex { input: String },

    /// Both sides of a pair are the same token
    #[error("Identical tokens: {token}")]
    IdenticalTokens { token: Address },

    /// A path needs at least an input and an output token
    #[error("Path too short: {len} token(s), need at least 2")]
    PathTooShort { len: usize },

    /// A path visits the same token twice
    #[error("Token {token} appears more than once in path")]
    RepeatedToken { token: Address },
}
