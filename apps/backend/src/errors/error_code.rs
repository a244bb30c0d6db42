//! Error codes for the Coinche backend API.
//!
//! Add new codes here; never pass ad-hoc strings as error codes.
//! All codes are SCREAMING_SNAKE_CASE and map 1:1 to the strings that
//! appear in HTTP responses.

use core::fmt;

/// Centralized error codes for the Coinche backend API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    // Request Validation
    /// Session identifier is missing or not alphanumeric
    InvalidSessionId,
    /// Player identifier is missing or not alphanumeric
    InvalidPlayerId,
    /// Seat alias is not one of Nord/Sud/Est/Ouest
    InvalidSeat,
    /// Team is not one of NordSud/EstOuest
    InvalidTeam,
    /// Card id or presentation id could not be parsed
    ParseCard,
    /// Sequence or round is not a number
    InvalidSequence,
    /// General validation error
    ValidationError,
    /// General bad request error
    BadRequest,

    // Resource Not Found
    /// Game session not found
    GameNotFound,
    /// Player not found
    PlayerNotFound,
    /// General not found error
    NotFound,

    // Business Logic Conflicts
    /// Trick pickup attempted while seats are still missing a card
    IncompleteTrick,

    // System Errors
    /// Key-value store failure
    StoreError,
    /// Key-value store unreachable
    StoreUnavailable,
    /// Internal server error
    InternalError,
    /// Configuration error
    ConfigError,
    /// Stored record could not be decoded
    DataCorruption,
}

impl ErrorCode {
    /// Returns the canonical SCREAMING_SNAKE_CASE string for this error code.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::InvalidSessionId => "INVALID_SESSION_ID",
            Self::InvalidPlayerId => "INVALID_PLAYER_ID",
            Self::InvalidSeat => "INVALID_SEAT",
            Self::InvalidTeam => "INVALID_TEAM",
            Self::ParseCard => "PARSE_CARD",
            Self::InvalidSequence => "INVALID_SEQUENCE",
            Self::ValidationError => "VALIDATION_ERROR",
            Self::BadRequest => "BAD_REQUEST",

            Self::GameNotFound => "GAME_NOT_FOUND",
            Self::PlayerNotFound => "PLAYER_NOT_FOUND",
            Self::NotFound => "NOT_FOUND",

            Self::IncompleteTrick => "INCOMPLETE_TRICK",

            Self::StoreError => "STORE_ERROR",
            Self::StoreUnavailable => "STORE_UNAVAILABLE",
            Self::InternalError => "INTERNAL_ERROR",
            Self::ConfigError => "CONFIG_ERROR",
            Self::DataCorruption => "DATA_CORRUPTION",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
