// Four seats at one table: play, cancel, play all, pick up.

use std::collections::BTreeSet;
use std::time::Duration;

use coinche_backend::domain::{SeatAlias, Team};
use coinche_backend::repos::ledger::PlayKey;
use coinche_backend::state::AppState;
use coinche_backend::ws::protocol::Action;

use crate::support::fixtures::{event, seed_session};
use crate::support::test_server::{start_test_server, wait_for_connections};
use crate::support::websocket_client::WebSocketClient;

const WAIT: Duration = Duration::from_secs(2);

fn nord_key(sid: &str) -> PlayKey {
    PlayKey {
        session_id: sid.to_string(),
        round: 1,
        seat: SeatAlias::Nord,
        sequence: 1,
    }
}

async fn expect_all(
    clients: &mut [WebSocketClient],
    action: &str,
    alias: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    for client in clients.iter_mut() {
        let msg = client.recv_json_timeout(WAIT).await?.expect("broadcast");
        assert_eq!(msg["action"], action);
        assert_eq!(msg["player_alias"], alias);
    }
    Ok(())
}

#[actix_web::test]
async fn table_g1_plays_cancels_and_picks_up() -> Result<(), Box<dyn std::error::Error>> {
    let state = AppState::in_memory();
    let sid = "G1";
    seed_session(state.store.as_ref(), sid).await;
    let session = state.coordinator.redeal(sid).await?;
    assert_eq!(session.round, 1);

    let server = start_test_server(state.clone()).await?;
    let mut clients = Vec::new();
    for _ in SeatAlias::ALL {
        clients.push(WebSocketClient::connect_retry(&server.ws_url(sid), WAIT).await?);
    }
    wait_for_connections(&state.hub, sid, 4, WAIT).await?;

    // Nord plays heartK
    clients[0]
        .send_json(&event(sid, Action::PlayCard, SeatAlias::Nord, "heartK", 1))
        .await?;
    for client in clients.iter_mut() {
        let msg = client.recv_json_timeout(WAIT).await?.expect("play");
        assert_eq!(msg["action"], "PLAY_CARD");
        assert_eq!(msg["card"], "heartK");
        assert_eq!(msg["player_alias"], "Nord");
    }
    state.coordinator.flush().await;
    assert!(state.coordinator.ledger().find_play(&nord_key(sid)).await?.is_some());
    assert!(state.store.get("game/G1/distrib/1/player/Nord/card/1").await?.is_some());

    // Nord takes it back
    clients[0]
        .send_json(&event(sid, Action::CancelCard, SeatAlias::Nord, "", 1))
        .await?;
    expect_all(&mut clients, "CANCEL_CARD", "Nord").await?;
    state.coordinator.flush().await;
    assert!(state.coordinator.ledger().find_play(&nord_key(sid)).await?.is_none());

    // Everyone plays at sequence 1
    let plays = [
        (SeatAlias::Nord, "heartK"),
        (SeatAlias::Sud, "heartA"),
        (SeatAlias::Est, "heart7"),
        (SeatAlias::Ouest, "diamond9"),
    ];
    for (index, (seat, card)) in plays.iter().enumerate() {
        clients[index]
            .send_json(&event(sid, Action::PlayCard, *seat, card, 1))
            .await?;
        expect_all(&mut clients, "PLAY_CARD", seat.as_str()).await?;
    }

    // NordSud picks up
    clients[1]
        .send_json(&event(sid, Action::PickupCards, SeatAlias::Sud, "", 1))
        .await?;
    expect_all(&mut clients, "PICKUP_CARDS", "Sud").await?;
    state.coordinator.flush().await;

    let trick = state
        .coordinator
        .ledger()
        .trick_record(sid, 1, Team::NordSud)
        .await?;
    let collected: BTreeSet<String> = trick.cards().iter().map(|card| card.id()).collect();
    let expected: BTreeSet<String> = plays.iter().map(|(_, card)| card.to_string()).collect();
    assert_eq!(collected, expected);
    assert_eq!(
        state
            .store
            .set_members("game/G1/distrib/1/team/NordSud")
            .await?
            .len(),
        4
    );

    // Plays stay addressable after pickup
    assert!(state.coordinator.ledger().find_play(&nord_key(sid)).await?.is_some());

    server.stop().await?;
    state.shutdown().await;
    Ok(())
}
