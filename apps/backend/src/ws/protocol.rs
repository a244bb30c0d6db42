//! Realtime event payload exchanged over the websocket.
//!
//! Inbound frames are decoded into [`RealtimeEvent`] and rebroadcast with the
//! canonical field names. Fields stay as raw strings so an event the
//! coordinator cannot interpret is still relayed unchanged.

use serde::{Deserialize, Serialize};

use crate::domain::{Card, SeatAlias, Team};
use crate::errors::domain::{DomainError, ValidationKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Action {
    #[serde(rename = "PLAY_CARD", alias = "PLAY")]
    PlayCard,
    #[serde(rename = "CANCEL_CARD", alias = "CANCEL")]
    CancelCard,
    #[serde(rename = "PICKUP_CARDS", alias = "PICKUP")]
    PickupCards,
}

impl Action {
    pub fn as_str(&self) -> &'static str {
        match self {
            Action::PlayCard => "PLAY_CARD",
            Action::CancelCard => "CANCEL_CARD",
            Action::PickupCards => "PICKUP_CARDS",
        }
    }
}

impl std::fmt::Display for Action {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RealtimeEvent {
    #[serde(alias = "game_id")]
    pub session_id: String,
    #[serde(default, alias = "game_name")]
    pub session_name: String,
    #[serde(default)]
    pub player_id: String,
    #[serde(default)]
    pub player_name: String,
    #[serde(default)]
    pub player_alias: String,
    #[serde(default)]
    pub player_team: String,
    #[serde(default, alias = "player_card")]
    pub card: String,
    #[serde(default, alias = "player_card_src")]
    pub card_presentation: String,
    #[serde(default)]
    pub sequence: String,
    #[serde(alias = "action_type")]
    pub action: Action,
    #[serde(default)]
    pub message: String,
    /// Explicit round; the session's current round is used when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub round: Option<String>,
}

impl RealtimeEvent {
    pub fn seat(&self) -> Result<SeatAlias, DomainError> {
        self.player_alias.parse()
    }

    pub fn team(&self) -> Result<Team, DomainError> {
        self.player_team.parse()
    }

    pub fn parsed_card(&self) -> Result<Card, DomainError> {
        self.card.parse()
    }

    pub fn sequence_number(&self) -> Result<u32, DomainError> {
        parse_counter("sequence", &self.sequence)
    }

    /// `None` when the event carries no round.
    pub fn round_number(&self) -> Option<Result<u32, DomainError>> {
        self.round
            .as_deref()
            .filter(|raw| !raw.trim().is_empty())
            .map(|raw| parse_counter("round", raw))
    }
}

fn parse_counter(field: &str, raw: &str) -> Result<u32, DomainError> {
    raw.trim().parse::<u32>().map_err(|_| {
        DomainError::validation(
            ValidationKind::InvalidSequence,
            format!("{field} must be a non-negative integer, got '{raw}'"),
        )
    })
}
