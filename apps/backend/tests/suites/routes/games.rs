use actix_web::test;
use coinche_backend::domain::{GameSession, Player, SeatAlias};
use coinche_backend::state::AppState;
use serde_json::{json, Value};

use crate::common::assert_problem;
use crate::support::app_builder::create_test_app;
use crate::support::fixtures::{seed_session, session_id, setup_body};

#[actix_web::test]
async fn save_then_get_returns_the_session() -> Result<(), Box<dyn std::error::Error>> {
    let state = AppState::in_memory();
    let app = create_test_app(state.clone()).await;
    let sid = session_id("save");

    let req = test::TestRequest::post()
        .uri("/coinche/game/save")
        .set_json(setup_body(&sid))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert!(resp.status().is_success());
    let saved: GameSession = test::read_body_json(resp).await;
    assert_eq!(saved.id, sid);
    assert_eq!(saved.round, 0);
    assert_eq!(saved.seats.len(), 4);

    let req = test::TestRequest::get()
        .uri(&format!("/coinche/game/{sid}"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert!(resp.status().is_success());
    let loaded: GameSession = test::read_body_json(resp).await;
    assert_eq!(loaded, saved);

    state.shutdown().await;
    Ok(())
}

#[actix_web::test]
async fn save_without_id_generates_one() -> Result<(), Box<dyn std::error::Error>> {
    let state = AppState::in_memory();
    let app = create_test_app(state.clone()).await;

    let mut body = setup_body("ignored");
    body["id"] = Value::Null;
    for seat in body["seats"].as_array_mut().into_iter().flatten() {
        seat["player_id"] = Value::Null;
    }

    let req = test::TestRequest::post()
        .uri("/coinche/game/save")
        .set_json(body)
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert!(resp.status().is_success());
    let saved: GameSession = test::read_body_json(resp).await;
    assert_eq!(saved.id.len(), 8);
    assert!(saved.seats.iter().all(|seat| seat.player_id.len() == 8));

    state.shutdown().await;
    Ok(())
}

#[actix_web::test]
async fn distribute_deals_eight_cards_per_player() -> Result<(), Box<dyn std::error::Error>> {
    let state = AppState::in_memory();
    let app = create_test_app(state.clone()).await;
    let sid = session_id("deal");
    seed_session(state.store.as_ref(), &sid).await;

    let req = test::TestRequest::post()
        .uri("/coinche/game/distribute")
        .set_json(json!({ "game_id": sid }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert!(resp.status().is_success());
    let session: GameSession = test::read_body_json(resp).await;
    assert_eq!(session.round, 1);
    assert_eq!(session.shuffled_cards.len(), 32);

    let mut dealt = Vec::new();
    for alias in SeatAlias::ALL {
        let req = test::TestRequest::get()
            .uri(&format!("/coinche/player/{sid}{alias}"))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert!(resp.status().is_success());
        let player: Player = test::read_body_json(resp).await;
        assert_eq!(player.alias, alias);
        assert_eq!(player.game_id, sid);
        assert_eq!(player.distributed_cards.len(), 8);
        dealt.extend(player.distributed_cards.into_keys());
    }
    dealt.sort();
    dealt.dedup();
    assert_eq!(dealt.len(), 32);

    let req = test::TestRequest::post()
        .uri("/coinche/game/distribute")
        .set_json(json!({ "game_id": sid }))
        .to_request();
    let session: GameSession = test::call_and_read_body_json(&app, req).await;
    assert_eq!(session.round, 2);

    state.shutdown().await;
    Ok(())
}

#[actix_web::test]
async fn unknown_game_is_404() -> Result<(), Box<dyn std::error::Error>> {
    let state = AppState::in_memory();
    let app = create_test_app(state.clone()).await;

    let req = test::TestRequest::get()
        .uri("/coinche/game/nosuchgame")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_problem(resp, 404, "GAME_NOT_FOUND").await;

    let req = test::TestRequest::post()
        .uri("/coinche/game/distribute")
        .set_json(json!({ "game_id": "nosuchgame" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_problem(resp, 404, "GAME_NOT_FOUND").await;

    let req = test::TestRequest::get()
        .uri("/coinche/player/nosuchplayer")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_problem(resp, 404, "PLAYER_NOT_FOUND").await;

    state.shutdown().await;
    Ok(())
}

#[actix_web::test]
async fn malformed_ids_are_rejected() -> Result<(), Box<dyn std::error::Error>> {
    let state = AppState::in_memory();
    let app = create_test_app(state.clone()).await;

    let req = test::TestRequest::get()
        .uri("/coinche/game/bad-id")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_problem(resp, 400, "INVALID_SESSION_ID").await;

    let req = test::TestRequest::get()
        .uri("/coinche/player/bad_id")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_problem(resp, 400, "INVALID_PLAYER_ID").await;

    state.shutdown().await;
    Ok(())
}

#[actix_web::test]
async fn malformed_body_is_bad_request() -> Result<(), Box<dyn std::error::Error>> {
    let state = AppState::in_memory();
    let app = create_test_app(state.clone()).await;

    let req = test::TestRequest::post()
        .uri("/coinche/game/save")
        .insert_header(("content-type", "application/json"))
        .set_payload("{\"seats\": [")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_problem(resp, 400, "BAD_REQUEST").await;

    state.shutdown().await;
    Ok(())
}

#[actix_web::test]
async fn incomplete_seating_is_rejected() -> Result<(), Box<dyn std::error::Error>> {
    let state = AppState::in_memory();
    let app = create_test_app(state.clone()).await;
    let sid = session_id("seats");

    let mut body = setup_body(&sid);
    if let Some(seats) = body["seats"].as_array_mut() {
        seats.pop();
    }

    let req = test::TestRequest::post()
        .uri("/coinche/game/save")
        .set_json(body)
        .to_request();
    let resp = test::call_service(&app, req).await;
    let problem = assert_problem(resp, 422, "INVALID_SEAT").await;
    assert!(problem["detail"].as_str().unwrap_or_default().contains("Ouest"));

    state.shutdown().await;
    Ok(())
}
