use std::future::{ready, Ready};

use actix_web::dev::Payload;
use actix_web::{FromRequest, HttpRequest};

use crate::domain::ids::is_valid_id;
use crate::error::AppError;
use crate::errors::ErrorCode;

fn path_id(req: &HttpRequest, code: ErrorCode, what: &str) -> Result<String, AppError> {
    let raw = req
        .match_info()
        .get("id")
        .ok_or_else(|| AppError::bad_request(code, format!("Missing {what} parameter")))?;

    if !is_valid_id(raw) {
        return Err(AppError::bad_request(code, format!("Invalid {what}: {raw}")));
    }
    Ok(raw.to_string())
}

/// Session id from the `{id}` path segment, letters and digits only.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionId(pub String);

impl FromRequest for SessionId {
    type Error = AppError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        ready(path_id(req, ErrorCode::InvalidSessionId, "session id").map(SessionId))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlayerId(pub String);

impl FromRequest for PlayerId {
    type Error = AppError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        ready(path_id(req, ErrorCode::InvalidPlayerId, "player id").map(PlayerId))
    }
}
