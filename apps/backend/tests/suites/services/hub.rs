use std::sync::Arc;
use std::time::Duration;

use coinche_backend::domain::{Dealer, SeatAlias};
use coinche_backend::repos::ledger::TrickStrictness;
use coinche_backend::services::coordinator::SessionCoordinator;
use coinche_backend::services::persistence::PersistenceConfig;
use coinche_backend::store::MemoryStore;
use coinche_backend::ws::connection::ChannelConnection;
use coinche_backend::ws::protocol::Action;
use coinche_backend::ws::{Hub, HubConfig, HubHandle};
use serde_json::Value;
use tokio::sync::mpsc;
use uuid::Uuid;

use crate::support::fixtures::event;

const WAIT: Duration = Duration::from_secs(1);

fn hub() -> HubHandle {
    let coordinator = Arc::new(SessionCoordinator::start(
        Arc::new(MemoryStore::new()),
        Dealer::default(),
        TrickStrictness::Permissive,
        PersistenceConfig::default(),
    ));
    Hub::start(HubConfig::default(), coordinator)
}

fn attach(
    hub: &HubHandle,
    session_id: &str,
    capacity: usize,
) -> (Arc<ChannelConnection>, mpsc::Receiver<Arc<str>>) {
    let (conn, rx) = ChannelConnection::new(capacity);
    let conn = Arc::new(conn);
    hub.register(Uuid::new_v4(), session_id, conn.clone());
    (conn, rx)
}

async fn next(rx: &mut mpsc::Receiver<Arc<str>>) -> Value {
    let frame = tokio::time::timeout(WAIT, rx.recv())
        .await
        .expect("frame within timeout")
        .expect("channel open");
    serde_json::from_str(&frame).expect("frame is JSON")
}

#[tokio::test]
async fn frames_stay_in_their_session() {
    let hub = hub();
    let (_a1, mut rx_a1) = attach(&hub, "tableA", 8);
    let (_a2, mut rx_a2) = attach(&hub, "tableA", 8);
    let (_b, mut rx_b) = attach(&hub, "tableB", 8);

    hub.submit(event("tableA", Action::PlayCard, SeatAlias::Est, "club7", 1))
        .await
        .expect("accepted");

    for rx in [&mut rx_a1, &mut rx_a2] {
        assert_eq!(next(rx).await["card"], "club7");
    }
    assert!(tokio::time::timeout(Duration::from_millis(200), rx_b.recv())
        .await
        .is_err());

    hub.stop().await;
}

#[tokio::test]
async fn every_peer_sees_the_same_order() {
    let hub = hub();
    let (_c1, mut rx1) = attach(&hub, "order", 64);
    let (_c2, mut rx2) = attach(&hub, "order", 64);

    for sequence in 1..=30u32 {
        hub.submit(event("order", Action::PlayCard, SeatAlias::Nord, "spadeJ", sequence))
            .await
            .expect("accepted");
    }

    for rx in [&mut rx1, &mut rx2] {
        for sequence in 1..=30u32 {
            assert_eq!(next(rx).await["sequence"], sequence.to_string());
        }
    }

    hub.stop().await;
}

#[tokio::test]
async fn a_full_peer_is_dropped_and_others_keep_receiving() {
    let hub = hub();
    let (slow, _rx_slow) = attach(&hub, "slow", 1);
    let (_fast, mut rx_fast) = attach(&hub, "slow", 16);
    assert_eq!(hub.session_connection_count("slow").await, Ok(2));

    for sequence in 1..=3u32 {
        hub.submit(event("slow", Action::PlayCard, SeatAlias::Sud, "heart8", sequence))
            .await
            .expect("accepted");
    }
    for sequence in 1..=3u32 {
        assert_eq!(next(&mut rx_fast).await["sequence"], sequence.to_string());
    }

    assert_eq!(hub.session_connection_count("slow").await, Ok(1));
    assert!(slow.is_closed());

    hub.stop().await;
}
