/// Error types for the tetris-arena library
use thiserror::Error;

use crate::types::RoomId;

/// Result type alias for arena operations
pub type Result<T> = std::result::Result<T, ArenaError>;

/// Errors that can occur in tetris-arena operations
///
/// None of these is fatal to the process: each one is scoped to a single
/// room or a single connection.
#[derive(Debug, Error)]
pub enum ArenaError {
    /// Room already holds two sessions
    #[error("Room is full")]
    RoomFull,

    /// Room has started or ended and takes no new sessions
    #[error("Room {0} is closed to new players")]
    RoomClosed(RoomId),

    /// First message of a connection was not a join request
    #[error("Expected Join as first message, got: {0}")]
    JoinExpected(String),

    /// Inbound payload was well-formed JSON but not a valid action
    #[error("Protocol error: {0}")]
    Protocol(String),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// A room task or session receiver has gone away
    #[error("Channel closed: {0}")]
    ChannelClosed(String),
}
