//! Real HTTP server on an ephemeral port for websocket tests.

use std::net::TcpListener;
use std::time::Duration;

use actix_web::{web, App, HttpServer};
use coinche_backend::routes;
use coinche_backend::state::AppState;
use coinche_backend::ws::HubHandle;
use coinche_backend::{RequestTrace, StructuredLogger, TraceSpan};

pub struct TestServer {
    pub handle: actix_web::dev::ServerHandle,
    pub addr: std::net::SocketAddr,
    pub join: tokio::task::JoinHandle<Result<(), std::io::Error>>,
}

impl TestServer {
    pub fn ws_url(&self, session_id: &str) -> String {
        format!("ws://{}/coinche/ws/{}", self.addr, session_id)
    }

    pub async fn stop(self) -> Result<(), Box<dyn std::error::Error>> {
        self.handle.stop(true).await;
        self.join.await??;
        Ok(())
    }
}

pub async fn start_test_server(state: AppState) -> Result<TestServer, Box<dyn std::error::Error>> {
    let listener = TcpListener::bind("127.0.0.1:0")?;
    let addr = listener.local_addr()?;
    let data = web::Data::new(state);

    let server = HttpServer::new(move || {
        App::new()
            .wrap(StructuredLogger)
            .wrap(TraceSpan)
            .wrap(RequestTrace)
            .app_data(data.clone())
            .configure(routes::configure)
    })
    .workers(1)
    .listen(listener)?
    .run();

    let handle = server.handle();
    let join = tokio::spawn(server);
    Ok(TestServer { handle, addr, join })
}

/// Poll the hub until `session_id` has `expected` connections.
pub async fn wait_for_connections(
    hub: &HubHandle,
    session_id: &str,
    expected: usize,
    timeout: Duration,
) -> Result<(), Box<dyn std::error::Error>> {
    let start = tokio::time::Instant::now();
    loop {
        let current = hub.session_connection_count(session_id).await?;
        if current == expected {
            return Ok(());
        }
        if start.elapsed() >= timeout {
            return Err(format!(
                "timeout waiting for {expected} connections on {session_id} (got {current})"
            )
            .into());
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
}
