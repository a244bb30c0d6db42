//! Session setup and deal/redeal.

use serde::Deserialize;
use tracing::info;

use crate::domain::ids::{generate_id, validate_id};
use crate::domain::{Card, Dealer, GameSession, Player, SeatAlias, SeatAssignment};
use crate::error::AppError;
use crate::errors::domain::{DomainError, NotFoundKind, ValidationKind};
use crate::repos::{games, players};
use crate::store::{keys, KvStore};

#[derive(Debug, Clone, Deserialize)]
pub struct SeatSetup {
    pub alias: SeatAlias,
    #[serde(default)]
    pub player_id: Option<String>,
    #[serde(default)]
    pub player_name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SessionSetup {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub name: String,
    pub seats: Vec<SeatSetup>,
}

fn blank_to_none(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

/// Create or overwrite a session and its four player records. Re-saving an
/// existing id keeps the round counter and the last shuffled order.
pub async fn save_session(store: &dyn KvStore, setup: SessionSetup) -> Result<GameSession, AppError> {
    let mut seats = Vec::with_capacity(SeatAlias::ALL.len());
    for alias in SeatAlias::ALL {
        let mut matching = setup.seats.iter().filter(|seat| seat.alias == alias);
        let seat = match (matching.next(), matching.next()) {
            (Some(seat), None) => seat,
            (None, _) => {
                return Err(DomainError::validation(
                    ValidationKind::InvalidSeat,
                    format!("Seat {alias} is missing"),
                )
                .into())
            }
            (Some(_), Some(_)) => {
                return Err(DomainError::validation(
                    ValidationKind::InvalidSeat,
                    format!("Seat {alias} is listed more than once"),
                )
                .into())
            }
        };

        let player_id = blank_to_none(seat.player_id.clone()).unwrap_or_else(generate_id);
        validate_id("player id", &player_id)?;
        seats.push(SeatAssignment {
            alias,
            player_id,
            player_name: seat.player_name.clone(),
        });
    }

    let id = blank_to_none(setup.id).unwrap_or_else(generate_id);
    validate_id("session id", &id)?;

    let previous = games::find(store, &id).await?;
    let session = GameSession {
        id,
        name: setup.name,
        seats,
        round: previous.as_ref().map_or(0, |p| p.round),
        shuffled_cards: previous
            .as_ref()
            .map(|p| p.shuffled_cards.clone())
            .unwrap_or_default(),
        deal_seed: previous.and_then(|p| p.deal_seed),
    };

    games::save(store, &session).await?;
    for seat in &session.seats {
        let player = Player {
            id: seat.player_id.clone(),
            name: seat.player_name.clone(),
            alias: seat.alias,
            game_id: session.id.clone(),
            distributed_cards: Default::default(),
        };
        players::save(store, &player).await?;
    }

    info!(session_id = %session.id, round = session.round, "session saved");
    Ok(session)
}

pub async fn load_session(store: &dyn KvStore, session_id: &str) -> Result<GameSession, AppError> {
    validate_id("session id", session_id)?;
    games::find(store, session_id).await?.ok_or_else(|| {
        DomainError::not_found(NotFoundKind::Game, format!("Game {session_id} not found")).into()
    })
}

pub async fn load_player(store: &dyn KvStore, player_id: &str) -> Result<Player, AppError> {
    validate_id("player id", player_id)?;
    players::find(store, player_id).await?.ok_or_else(|| {
        DomainError::not_found(NotFoundKind::Player, format!("Player {player_id} not found")).into()
    })
}

/// Shuffle, advance the round and hand eight cards to each seat's player.
/// Writes are not rolled back if a later player write fails.
pub async fn distribute(
    store: &dyn KvStore,
    dealer: &Dealer,
    session_id: &str,
) -> Result<GameSession, AppError> {
    let mut session = load_session(store, session_id).await?;

    let mut seated = Vec::with_capacity(SeatAlias::ALL.len());
    for alias in SeatAlias::ALL {
        let seat = session.seat(alias).ok_or_else(|| {
            DomainError::not_found(
                NotFoundKind::Player,
                format!("Game {session_id} has no player at {alias}"),
            )
        })?;
        seated.push(load_player(store, &seat.player_id).await?);
    }

    let deal = dealer.deal();
    session.apply_deal(&deal);
    games::save(store, &session).await?;

    for mut player in seated {
        player.set_hand(deal.hand(player.alias));
        players::save(store, &player).await?;
    }

    info!(
        session_id = %session.id,
        round = session.round,
        seed = deal.seed,
        "cards distributed"
    );
    Ok(session)
}

/// Write the logical id → presentation id table.
pub async fn init_ref_cards(store: &dyn KvStore) -> Result<(), AppError> {
    let fields = crate::domain::build_deck()
        .iter()
        .map(|card: &Card| (card.id(), card.presentation()))
        .collect();
    store.put_hash(keys::REF_CARDS_KEY, fields).await?;
    Ok(())
}
