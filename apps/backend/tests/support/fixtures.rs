//! Builders for sessions and realtime events.

use backend_test_support::unique_helpers::unique_id;
use coinche_backend::domain::{GameSession, SeatAlias};
use coinche_backend::services::games::{self, SeatSetup, SessionSetup};
use coinche_backend::store::KvStore;
use coinche_backend::ws::protocol::{Action, RealtimeEvent};
use serde_json::{json, Value};

/// Unique alphanumeric session id per test.
pub fn session_id(prefix: &str) -> String {
    unique_id(prefix)
}

pub fn setup_body(session_id: &str) -> Value {
    json!({
        "id": session_id,
        "name": "Friday table",
        "seats": SeatAlias::ALL.iter().map(|alias| json!({
            "alias": alias.as_str(),
            "player_id": format!("{session_id}{alias}"),
            "player_name": format!("{alias} player"),
        })).collect::<Vec<_>>(),
    })
}

/// Save a four-seat session whose player ids are `<session><Alias>`.
pub async fn seed_session(store: &dyn KvStore, session_id: &str) -> GameSession {
    let setup = SessionSetup {
        id: Some(session_id.to_string()),
        name: "Friday table".into(),
        seats: SeatAlias::ALL
            .into_iter()
            .map(|alias| SeatSetup {
                alias,
                player_id: Some(format!("{session_id}{alias}")),
                player_name: format!("{alias} player"),
            })
            .collect(),
    };
    games::save_session(store, setup)
        .await
        .expect("session should save")
}

pub fn event(
    session_id: &str,
    action: Action,
    seat: SeatAlias,
    card: &str,
    sequence: u32,
) -> RealtimeEvent {
    RealtimeEvent {
        session_id: session_id.to_string(),
        session_name: "Friday table".into(),
        player_id: format!("{session_id}{seat}"),
        player_name: format!("{seat} player"),
        player_alias: seat.to_string(),
        player_team: seat.team().to_string(),
        card: card.to_string(),
        card_presentation: String::new(),
        sequence: sequence.to_string(),
        action,
        message: format!("{seat} {action} {card}"),
        round: None,
    }
}
