use actix_web::{web, HttpResponse};
use serde::Deserialize;

use crate::error::AppError;
use crate::extractors::{PlayerId, SessionId};
use crate::services::games::{self, SessionSetup};
use crate::state::app_state::AppState;

async fn save_game(
    body: web::Json<SessionSetup>,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let session = games::save_session(app_state.store.as_ref(), body.into_inner()).await?;
    Ok(HttpResponse::Ok().json(session))
}

async fn get_game(
    session_id: SessionId,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let session = games::load_session(app_state.store.as_ref(), &session_id.0).await?;
    Ok(HttpResponse::Ok().json(session))
}

#[derive(Debug, Deserialize)]
struct DistributeRequest {
    game_id: String,
}

async fn distribute(
    body: web::Json<DistributeRequest>,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let session = app_state.coordinator.redeal(&body.game_id).await?;
    Ok(HttpResponse::Ok().json(session))
}

async fn get_player(
    player_id: PlayerId,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let player = games::load_player(app_state.store.as_ref(), &player_id.0).await?;
    Ok(HttpResponse::Ok().json(player))
}

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(web::resource("/game/save").route(web::post().to(save_game)))
        .service(web::resource("/game/distribute").route(web::post().to(distribute)))
        .service(web::resource("/game/{id}").route(web::get().to(get_game)))
        .service(web::resource("/player/{id}").route(web::get().to(get_player)));
}
