// Full hub queue: reject drops events, wait holds the socket's input.
//
// Store latency on a session with no record slows every dispatch down (the
// round lookup misses each time), so a one-slot queue fills up on a burst.

use std::sync::Arc;
use std::time::Duration;

use coinche_backend::domain::{Dealer, SeatAlias};
use coinche_backend::state::AppState;
use coinche_backend::store::MemoryStore;
use coinche_backend::ws::protocol::Action;
use coinche_backend::ws::{HubConfig, OverflowPolicy};
use coinche_backend::AppConfig;

use crate::support::fixtures::{event, session_id};
use crate::support::test_server::{start_test_server, wait_for_connections};
use crate::support::websocket_client::WebSocketClient;

const WAIT: Duration = Duration::from_secs(3);
const BURST: u32 = 5;

fn slow_state(policy: OverflowPolicy) -> (AppState, Arc<MemoryStore>) {
    let store = Arc::new(MemoryStore::new());
    let config = AppConfig {
        hub: HubConfig {
            queue_capacity: 1,
            overflow_policy: policy,
            enqueue_timeout: Duration::from_secs(5),
        },
        ..AppConfig::default()
    };
    let state = AppState::start(config, store.clone(), Dealer::default());
    (state, store)
}

async fn drain(client: &mut WebSocketClient) -> Vec<String> {
    let mut sequences = Vec::new();
    while let Ok(Some(msg)) = client.recv_json_timeout(Duration::from_millis(600)).await {
        sequences.push(msg["sequence"].as_str().unwrap_or_default().to_string());
    }
    sequences
}

#[actix_web::test]
async fn reject_drops_overflow_and_keeps_the_socket() -> Result<(), Box<dyn std::error::Error>> {
    let (state, store) = slow_state(OverflowPolicy::Reject);
    let sid = session_id("reject");
    let server = start_test_server(state.clone()).await?;

    let mut client = WebSocketClient::connect_retry(&server.ws_url(&sid), WAIT).await?;
    wait_for_connections(&state.hub, &sid, 1, WAIT).await?;

    store.set_latency(Some(Duration::from_millis(150)));
    for sequence in 1..=BURST {
        client
            .send_json(&event(&sid, Action::PlayCard, SeatAlias::Nord, "heartK", sequence))
            .await?;
    }

    let delivered = drain(&mut client).await;
    assert!(!delivered.is_empty());
    assert!(delivered.len() < BURST as usize, "got {delivered:?}");
    assert_eq!(delivered[0], "1");

    store.set_latency(None);
    assert_eq!(state.hub.session_connection_count(&sid).await?, 1);
    client
        .send_json(&event(&sid, Action::PlayCard, SeatAlias::Nord, "heartK", 99))
        .await?;
    let msg = client.recv_json_timeout(WAIT).await?.expect("socket still live");
    assert_eq!(msg["sequence"], "99");

    server.stop().await?;
    state.shutdown().await;
    Ok(())
}

#[actix_web::test]
async fn wait_delivers_the_whole_burst_in_order() -> Result<(), Box<dyn std::error::Error>> {
    let (state, store) = slow_state(OverflowPolicy::Wait);
    let sid = session_id("wait");
    let server = start_test_server(state.clone()).await?;

    let mut client = WebSocketClient::connect_retry(&server.ws_url(&sid), WAIT).await?;
    wait_for_connections(&state.hub, &sid, 1, WAIT).await?;

    store.set_latency(Some(Duration::from_millis(100)));
    for sequence in 1..=BURST {
        client
            .send_json(&event(&sid, Action::PlayCard, SeatAlias::Sud, "spade7", sequence))
            .await?;
    }

    let delivered = drain(&mut client).await;
    let expected: Vec<String> = (1..=BURST).map(|n| n.to_string()).collect();
    assert_eq!(delivered, expected);
    assert_eq!(state.hub.session_connection_count(&sid).await?, 1);

    store.set_latency(None);
    server.stop().await?;
    state.shutdown().await;
    Ok(())
}
