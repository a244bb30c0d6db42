use std::sync::Arc;
use std::time::{Duration, Instant};

use actix::prelude::*;
use actix_web::{web, Error, HttpRequest, HttpResponse};
use actix_web_actors::ws;
use tracing::{info, warn};
use uuid::Uuid;

use crate::extractors::session_id::SessionId;
use crate::state::app_state::AppState;
use crate::ws::connection::ActorConnection;
use crate::ws::hub::{HubError, HubHandle, OverflowPolicy};
use crate::ws::protocol::RealtimeEvent;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WsConfig {
    pub heartbeat_interval: Duration,
    pub client_timeout: Duration,
}

impl Default for WsConfig {
    fn default() -> Self {
        Self {
            heartbeat_interval: Duration::from_secs(20),
            client_timeout: Duration::from_secs(40),
        }
    }
}

/// Pre-serialized event pushed by the hub.
#[derive(Message)]
#[rtype(result = "()")]
pub struct Deliver(pub Arc<str>);

#[derive(Message)]
#[rtype(result = "()")]
pub struct Shutdown;

pub async fn upgrade(
    req: HttpRequest,
    stream: web::Payload,
    session_id: SessionId,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse, Error> {
    let session = WsSession::new(
        Uuid::new_v4(),
        session_id.0,
        app_state.hub.clone(),
        app_state.config.ws,
    );
    ws::start(session, &req, stream)
}

pub struct WsSession {
    conn_id: Uuid,
    session_id: String,
    hub: HubHandle,
    config: WsConfig,

    last_heartbeat: Instant,
    heartbeat_handle: Option<SpawnHandle>,
}

impl WsSession {
    fn new(conn_id: Uuid, session_id: String, hub: HubHandle, config: WsConfig) -> Self {
        Self {
            conn_id,
            session_id,
            hub,
            config,
            last_heartbeat: Instant::now(),
            heartbeat_handle: None,
        }
    }

    fn close_with(&self, ctx: &mut ws::WebsocketContext<Self>, code: ws::CloseCode, reason: &str) {
        ctx.close(Some(ws::CloseReason {
            code,
            description: Some(reason.to_string()),
        }));
        ctx.stop();
    }

    fn start_heartbeat(&mut self, ctx: &mut ws::WebsocketContext<Self>) {
        let timeout = self.config.client_timeout;
        let handle = ctx.run_interval(self.config.heartbeat_interval, move |actor, ctx| {
            if Instant::now().duration_since(actor.last_heartbeat) > timeout {
                warn!(
                    conn_id = %actor.conn_id,
                    session_id = %actor.session_id,
                    "[WS SESSION] heartbeat timed out"
                );
                ctx.close(Some(ws::CloseReason::from(ws::CloseCode::Normal)));
                ctx.stop();
                return;
            }
            ctx.ping(b"keepalive");
        });
        self.heartbeat_handle = Some(handle);
    }

    fn handle_text(&mut self, text: &str, ctx: &mut ws::WebsocketContext<Self>) {
        let event: RealtimeEvent = match serde_json::from_str(text) {
            Ok(event) => event,
            Err(err) => {
                warn!(
                    conn_id = %self.conn_id,
                    session_id = %self.session_id,
                    error = %err,
                    "[WS SESSION] malformed event"
                );
                self.close_with(ctx, ws::CloseCode::Invalid, "Malformed event");
                return;
            }
        };

        // A socket only speaks for the session in its path.
        if event.session_id != self.session_id {
            warn!(
                conn_id = %self.conn_id,
                session_id = %self.session_id,
                event_session_id = %event.session_id,
                "[WS SESSION] event addressed to another session; dropped"
            );
            return;
        }

        match self.hub.overflow_policy() {
            OverflowPolicy::Reject => {
                if let Err(err) = self.hub.try_submit(event) {
                    self.on_submit_error(err, ctx);
                }
            }
            OverflowPolicy::Wait => {
                // Suspend this connection's inbound stream until the event is queued.
                let hub = self.hub.clone();
                ctx.wait(async move { hub.submit(event).await }.into_actor(self).map(
                    |res, actor, ctx| {
                        if let Err(err) = res {
                            actor.on_submit_error(err, ctx);
                        }
                    },
                ));
            }
        }
    }

    fn on_submit_error(&self, err: HubError, ctx: &mut ws::WebsocketContext<Self>) {
        match err {
            HubError::QueueFull => warn!(
                conn_id = %self.conn_id,
                session_id = %self.session_id,
                "[WS SESSION] hub queue full; event rejected"
            ),
            HubError::Stopped => {
                self.close_with(ctx, ws::CloseCode::Away, "Hub stopped");
            }
        }
    }
}

impl Actor for WsSession {
    type Context = ws::WebsocketContext<Self>;

    fn started(&mut self, ctx: &mut Self::Context) {
        info!(
            conn_id = %self.conn_id,
            session_id = %self.session_id,
            "[WS SESSION] started"
        );

        self.hub.register(
            self.conn_id,
            self.session_id.clone(),
            Arc::new(ActorConnection::new(ctx.address())),
        );
        self.start_heartbeat(ctx);
    }

    fn stopped(&mut self, _ctx: &mut Self::Context) {
        self.hub.deregister(self.conn_id);
        info!(
            conn_id = %self.conn_id,
            session_id = %self.session_id,
            "[WS SESSION] stopped"
        );
    }
}

impl StreamHandler<Result<ws::Message, ws::ProtocolError>> for WsSession {
    fn handle(&mut self, msg: Result<ws::Message, ws::ProtocolError>, ctx: &mut Self::Context) {
        match msg {
            Ok(ws::Message::Ping(payload)) => {
                self.last_heartbeat = Instant::now();
                ctx.pong(&payload);
            }
            Ok(ws::Message::Pong(_)) => {
                self.last_heartbeat = Instant::now();
            }
            Ok(ws::Message::Text(text)) => {
                self.last_heartbeat = Instant::now();
                self.handle_text(&text, ctx);
            }
            Ok(ws::Message::Binary(_)) => {
                self.last_heartbeat = Instant::now();
                self.close_with(ctx, ws::CloseCode::Unsupported, "Binary not supported");
            }
            Ok(ws::Message::Close(reason)) => {
                ctx.close(reason);
                ctx.stop();
            }
            Ok(ws::Message::Continuation(_)) | Ok(ws::Message::Nop) => {
                self.last_heartbeat = Instant::now();
            }
            Err(err) => {
                warn!(
                    conn_id = %self.conn_id,
                    session_id = %self.session_id,
                    error = %err,
                    "[WS SESSION] protocol error"
                );
                ctx.close(Some(ws::CloseReason::from(ws::CloseCode::Error)));
                ctx.stop();
            }
        }
    }
}

impl Handler<Deliver> for WsSession {
    type Result = ();

    fn handle(&mut self, msg: Deliver, ctx: &mut Self::Context) -> Self::Result {
        ctx.text(&*msg.0);
    }
}

impl Handler<Shutdown> for WsSession {
    type Result = ();

    fn handle(&mut self, _msg: Shutdown, ctx: &mut Self::Context) -> Self::Result {
        if let Some(handle) = self.heartbeat_handle.take() {
            ctx.cancel_future(handle);
        }
        ctx.close(Some(ws::CloseReason::from(ws::CloseCode::Away)));
        ctx.stop();
    }
}
