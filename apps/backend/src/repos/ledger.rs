//! Played-card ledger.
//!
//! One entry per (session, round, seat, sequence) key:
//! `empty -> played` on [`PlayedCardLedger::record_play`], back to `empty` on
//! [`PlayedCardLedger::retract_play`]. Pickup reads entries without
//! consuming them and appends the four slots to the team's trick set.
//! Store failures are returned as-is; nothing is retried or rolled back here.

use std::str::FromStr;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use time::OffsetDateTime;
use tracing::{debug, info, warn};

use crate::domain::{Card, PlayedCardEntry, SeatAlias, Team, TrickRecord, TrickSlot};
use crate::errors::domain::{DomainError, ValidationKind};
use crate::store::{self, keys, KvStore, StoreError};

/// How `collect_trick` treats seats with no recorded play.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrickStrictness {
    /// Missing seats become empty slots; entries stay addressable and a
    /// repeated pickup appends again.
    #[default]
    Permissive,
    /// Refuse to write anything unless all four seats have played.
    RequireAllSeats,
}

impl FromStr for TrickStrictness {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "permissive" => Ok(Self::Permissive),
            "require_all_seats" | "strict" => Ok(Self::RequireAllSeats),
            other => Err(DomainError::validation(
                ValidationKind::Other("strictness".into()),
                format!("Unknown trick strictness: {other}"),
            )),
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum LedgerError {
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error("trick {round}/{sequence} of {session_id} is missing plays from {missing:?}")]
    IncompleteTrick {
        session_id: String,
        round: u32,
        sequence: u32,
        missing: Vec<SeatAlias>,
    },
}

/// Address of one ledger slot.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PlayKey {
    pub session_id: String,
    pub round: u32,
    pub seat: SeatAlias,
    pub sequence: u32,
}

impl PlayKey {
    pub fn store_key(&self) -> String {
        keys::played_card_key(&self.session_id, self.round, self.seat, self.sequence)
    }
}

/// Everything needed to record a play.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewPlay {
    pub key: PlayKey,
    pub card: Card,
    pub card_presentation: String,
    pub player_id: String,
    pub player_name: String,
    pub message: String,
}

#[derive(Clone)]
pub struct PlayedCardLedger {
    store: Arc<dyn KvStore>,
    strictness: TrickStrictness,
}

impl PlayedCardLedger {
    pub fn new(store: Arc<dyn KvStore>, strictness: TrickStrictness) -> Self {
        Self { store, strictness }
    }

    pub fn strictness(&self) -> TrickStrictness {
        self.strictness
    }

    /// Write the entry at its key; an existing entry is overwritten.
    pub async fn record_play(&self, play: NewPlay) -> Result<PlayedCardEntry, LedgerError> {
        let key = play.key.store_key();
        let entry = PlayedCardEntry {
            session_id: play.key.session_id,
            round: play.key.round,
            seat: play.key.seat,
            sequence: play.key.sequence,
            card: play.card,
            card_presentation: play.card_presentation,
            player_id: play.player_id,
            player_name: play.player_name,
            message: play.message,
            recorded_at: OffsetDateTime::now_utc(),
        };
        store::set_json(self.store.as_ref(), &key, &entry).await?;
        debug!(key = %key, card = %entry.card, "play recorded");
        Ok(entry)
    }

    pub async fn find_play(&self, key: &PlayKey) -> Result<Option<PlayedCardEntry>, LedgerError> {
        Ok(store::get_json(self.store.as_ref(), &key.store_key()).await?)
    }

    /// Remove the entry and return what was there. Retracting an empty slot
    /// is a logged no-op returning `None`.
    pub async fn retract_play(&self, key: &PlayKey) -> Result<Option<PlayedCardEntry>, LedgerError> {
        let store_key = key.store_key();
        let previous = match store::get_json::<PlayedCardEntry>(self.store.as_ref(), &store_key).await
        {
            Ok(previous) => previous,
            Err(StoreError::Serialization { detail, .. }) => {
                warn!(key = %store_key, detail = %detail, "retracting undecodable play");
                None
            }
            Err(err) => return Err(err.into()),
        };

        let existed = self.store.delete(&store_key).await?;
        match &previous {
            Some(entry) => debug!(key = %store_key, card = %entry.card, "play retracted"),
            None if !existed => info!(key = %store_key, "retract of an empty slot ignored"),
            None => {}
        }
        Ok(previous)
    }

    /// Gather each seat's entry at `sequence` and append them to `team`'s
    /// trick set for the round. Returns the slots collected by this pickup.
    pub async fn collect_trick(
        &self,
        session_id: &str,
        round: u32,
        team: Team,
        sequence: u32,
    ) -> Result<TrickRecord, LedgerError> {
        let mut slots = Vec::with_capacity(SeatAlias::ALL.len());
        for seat in SeatAlias::ALL {
            let key = PlayKey {
                session_id: session_id.to_string(),
                round,
                seat,
                sequence,
            };
            let entry = self.find_play(&key).await?;
            slots.push(TrickSlot {
                seat,
                sequence,
                entry,
            });
        }

        let missing: Vec<SeatAlias> = slots
            .iter()
            .filter(|slot| slot.entry.is_none())
            .map(|slot| slot.seat)
            .collect();

        if !missing.is_empty() {
            if self.strictness == TrickStrictness::RequireAllSeats {
                return Err(LedgerError::IncompleteTrick {
                    session_id: session_id.to_string(),
                    round,
                    sequence,
                    missing,
                });
            }
            info!(
                session_id,
                round,
                sequence,
                missing = ?missing,
                "collecting incomplete trick"
            );
        }

        let trick_key = keys::trick_key(session_id, round, team);
        for slot in &slots {
            let member = store::encode(&trick_key, slot)?;
            self.store.add_to_set(&trick_key, member).await?;
        }
        debug!(key = %trick_key, team = %team, sequence, "trick collected");

        Ok(TrickRecord {
            session_id: session_id.to_string(),
            round,
            team,
            slots,
        })
    }

    /// Everything the team has picked up so far in the round.
    pub async fn trick_record(
        &self,
        session_id: &str,
        round: u32,
        team: Team,
    ) -> Result<TrickRecord, LedgerError> {
        let trick_key = keys::trick_key(session_id, round, team);
        let mut slots = self
            .store
            .set_members(&trick_key)
            .await?
            .iter()
            .map(|raw| store::decode::<TrickSlot>(&trick_key, raw))
            .collect::<Result<Vec<_>, _>>()?;
        slots.sort();
        Ok(TrickRecord {
            session_id: session_id.to_string(),
            round,
            team,
            slots,
        })
    }
}
