use std::future::{ready, Ready};
use std::time::Instant;

use actix_web::dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform};
use actix_web::http::StatusCode;
use actix_web::{Error as ActixError, HttpMessage};
use futures_util::future::LocalBoxFuture;
use tracing::{debug, error, info, warn};

use crate::trace_ctx::RequestContext;

/// Emits one `request_completed` event per HTTP request. Level follows the
/// status class; health checks stay at debug. A successful websocket
/// handshake is reported as `realtime_upgraded` instead, since the request
/// "completes" when the socket opens.
pub struct StructuredLogger;

impl<S, B> Transform<S, ServiceRequest> for StructuredLogger
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = ActixError>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = ActixError;
    type InitError = ();
    type Transform = StructuredLoggerMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(StructuredLoggerMiddleware { service }))
    }
}

pub struct StructuredLoggerMiddleware<S> {
    service: S,
}

struct Completed {
    method: String,
    path: String,
    ctx: Option<RequestContext>,
    start: Instant,
}

impl<S, B> Service<ServiceRequest> for StructuredLoggerMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = ActixError>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = ActixError;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let completed = Completed {
            method: req.method().to_string(),
            path: req.path().to_string(),
            ctx: req.extensions().get::<RequestContext>().cloned(),
            start: Instant::now(),
        };

        let fut = self.service.call(req);

        Box::pin(async move {
            let result = fut.await;
            let status = match &result {
                Ok(res) => res.status(),
                Err(err) => err.as_response_error().status_code(),
            };
            completed.log(status);
            result
        })
    }
}

impl Completed {
    fn log(&self, status: StatusCode) {
        let duration_us = self.start.elapsed().as_micros() as u64;
        let status_code = status.as_u16();
        let trace_id = self.ctx.as_ref().map_or("unknown", |ctx| ctx.trace_id.as_str());
        let session_id = self
            .ctx
            .as_ref()
            .and_then(|ctx| ctx.session_id.as_deref())
            .unwrap_or("-");
        let (method, path) = (self.method.as_str(), self.path.as_str());

        if status == StatusCode::SWITCHING_PROTOCOLS {
            info!(url.path=%path, session_id=%session_id, duration_us, trace_id=%trace_id, message="realtime_upgraded");
        } else if status.is_server_error() {
            error!(http.method=%method, url.path=%path, http.status_code=status_code, session_id=%session_id, duration_us, trace_id=%trace_id, message="request_completed");
        } else if status.is_client_error() {
            warn!(http.method=%method, url.path=%path, http.status_code=status_code, session_id=%session_id, duration_us, trace_id=%trace_id, message="request_completed");
        } else if path.ends_with("/health") {
            debug!(http.method=%method, url.path=%path, http.status_code=status_code, duration_us, trace_id=%trace_id, message="request_completed");
        } else {
            info!(http.method=%method, url.path=%path, http.status_code=status_code, session_id=%session_id, duration_us, trace_id=%trace_id, message="request_completed");
        }
    }
}
