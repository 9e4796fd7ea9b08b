//! Error types
//!
//! Nothing here is ever fatal to a session: store errors are logged and
//! dropped, game errors mean a command was refused without side effects.

use std::fmt;

use crate::sim::ModeKind;

/// Failure talking to a score store (local or remote)
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// Backend not reachable (offline, no storage, request rejected)
    Unavailable(String),
    /// Remote answered with a non-success HTTP status
    Http(u16),
    /// Payload could not be (de)serialized
    Decode(String),
    /// Local key-value slot refused the write
    Storage(String),
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreError::Unavailable(why) => write!(f, "store unavailable: {why}"),
            StoreError::Http(status) => write!(f, "store returned HTTP {status}"),
            StoreError::Decode(why) => write!(f, "malformed store payload: {why}"),
            StoreError::Storage(why) => write!(f, "local storage write failed: {why}"),
        }
    }
}

impl std::error::Error for StoreError {}

impl From<serde_json::Error> for StoreError {
    fn from(err: serde_json::Error) -> Self {
        StoreError::Decode(err.to_string())
    }
}

/// A command the game refused
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GameError {
    /// Player name empty after trimming, or too long
    InvalidName,
    /// Command not accepted in the current mode
    WrongMode {
        expected: &'static str,
        actual: ModeKind,
    },
    /// Result or tick belongs to a session that has since been replaced
    StaleSession { expected: u64, got: u64 },
}

impl fmt::Display for GameError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GameError::InvalidName => write!(f, "player name must not be empty"),
            GameError::WrongMode { expected, actual } => {
                write!(f, "expected {expected}, game is in {actual:?}")
            }
            GameError::StaleSession { expected, got } => {
                write!(f, "stale session {got} (live session is {expected})")
            }
        }
    }
}

impl std::error::Error for GameError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        assert_eq!(StoreError::Http(503).to_string(), "store returned HTTP 503");
        assert_eq!(
            GameError::StaleSession { expected: 3, got: 2 }.to_string(),
            "stale session 2 (live session is 3)"
        );
    }

    #[test]
    fn test_json_error_converts_to_decode() {
        let err = serde_json::from_str::<u32>("nope").unwrap_err();
        assert!(matches!(StoreError::from(err), StoreError::Decode(_)));
    }
}
