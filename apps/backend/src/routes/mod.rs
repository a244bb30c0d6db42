use actix_web::web;

use crate::error::AppError;
use crate::errors::ErrorCode;

pub mod games;
pub mod health;
pub mod realtime;

/// Malformed JSON bodies come back as problem details like every other error.
fn json_config() -> web::JsonConfig {
    web::JsonConfig::default().error_handler(|err, _req| {
        AppError::bad_request(ErrorCode::BadRequest, format!("Invalid JSON body: {err}")).into()
    })
}

/// Mount every route under `/coinche`. `main.rs` adds the logging
/// middleware around this; tests use it bare.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/coinche")
            .app_data(json_config())
            .configure(health::configure_routes)
            .configure(games::configure_routes)
            .configure(realtime::configure_routes),
    );
}
