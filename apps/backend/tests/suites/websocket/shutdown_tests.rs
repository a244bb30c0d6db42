// Hub shutdown

use std::time::Duration;

use coinche_backend::domain::SeatAlias;
use coinche_backend::state::AppState;
use coinche_backend::ws::protocol::Action;
use coinche_backend::ws::HubError;

use crate::support::fixtures::{event, session_id};
use crate::support::test_server::{start_test_server, wait_for_connections};
use crate::support::websocket_client::WebSocketClient;

const WAIT: Duration = Duration::from_secs(2);

#[actix_web::test]
async fn stopping_the_hub_closes_every_connection() -> Result<(), Box<dyn std::error::Error>> {
    let state = AppState::in_memory();
    let sid_a = session_id("stopA");
    let sid_b = session_id("stopB");
    let server = start_test_server(state.clone()).await?;

    let mut a = WebSocketClient::connect_retry(&server.ws_url(&sid_a), WAIT).await?;
    let mut b = WebSocketClient::connect_retry(&server.ws_url(&sid_b), WAIT).await?;
    wait_for_connections(&state.hub, &sid_a, 1, WAIT).await?;
    wait_for_connections(&state.hub, &sid_b, 1, WAIT).await?;

    state.hub.stop().await;

    assert!(a.expect_close(WAIT).await?);
    assert!(b.expect_close(WAIT).await?);
    assert!(state.hub.is_stopped());
    assert_eq!(
        state
            .hub
            .submit(event(&sid_a, Action::PlayCard, SeatAlias::Nord, "heartK", 1))
            .await,
        Err(HubError::Stopped)
    );

    server.stop().await?;
    Ok(())
}

#[actix_web::test]
async fn stop_is_idempotent() {
    let state = AppState::in_memory();
    state.shutdown().await;
    state.shutdown().await;
    assert!(state.hub.is_stopped());
}
