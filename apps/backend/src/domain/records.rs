//! Persistent records: sessions, players, played cards and tricks.
//!
//! These are stored as JSON under the key layout in `crate::store::keys`.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::domain::dealing::Deal;
use crate::domain::{Card, SeatAlias, Team};

/// Player bound to a seat of a session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeatAssignment {
    pub alias: SeatAlias,
    pub player_id: String,
    pub player_name: String,
}

/// One four-seat table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameSession {
    pub id: String,
    pub name: String,
    pub seats: Vec<SeatAssignment>,
    /// Deal counter; 0 until the first distribution.
    #[serde(default)]
    pub round: u32,
    /// Dealt order of the current round, kept for audit.
    #[serde(default)]
    pub shuffled_cards: Vec<Card>,
    #[serde(default)]
    pub deal_seed: Option<u64>,
}

impl GameSession {
    pub fn seat(&self, alias: SeatAlias) -> Option<&SeatAssignment> {
        self.seats.iter().find(|seat| seat.alias == alias)
    }

    /// Record a fresh deal and advance the round counter.
    pub fn apply_deal(&mut self, deal: &Deal) {
        self.round += 1;
        self.shuffled_cards = deal.shuffled.clone();
        self.deal_seed = Some(deal.seed);
    }
}

/// Player record with the hand dealt for the current round.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Player {
    pub id: String,
    pub name: String,
    pub alias: SeatAlias,
    pub game_id: String,
    /// Logical id → presentation id.
    #[serde(default)]
    pub distributed_cards: BTreeMap<String, String>,
}

impl Player {
    pub fn set_hand(&mut self, hand: &[Card]) {
        self.distributed_cards = hand
            .iter()
            .map(|card| (card.id(), card.presentation()))
            .collect();
    }
}

/// A card laid on the mat by one seat.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PlayedCardEntry {
    pub session_id: String,
    pub round: u32,
    pub seat: SeatAlias,
    pub sequence: u32,
    pub card: Card,
    pub card_presentation: String,
    pub player_id: String,
    pub player_name: String,
    pub message: String,
    #[serde(with = "time::serde::rfc3339")]
    pub recorded_at: OffsetDateTime,
}

/// One seat's contribution to a picked-up trick. `entry` is `None` when the
/// seat had nothing recorded at pickup time.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TrickSlot {
    pub seat: SeatAlias,
    pub sequence: u32,
    pub entry: Option<PlayedCardEntry>,
}

/// Cards won by a team in one round, stored as an append-only set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrickRecord {
    pub session_id: String,
    pub round: u32,
    pub team: Team,
    pub slots: Vec<TrickSlot>,
}

impl TrickRecord {
    pub fn cards(&self) -> Vec<Card> {
        self.slots
            .iter()
            .filter_map(|slot| slot.entry.as_ref().map(|entry| entry.card))
            .collect()
    }
}
