use std::sync::Arc;

use actix_web::{web, App, HttpServer};
use coinche_backend::config::AppConfig;
use coinche_backend::domain::Dealer;
use coinche_backend::middleware::{RequestTrace, StructuredLogger, TraceSpan};
use coinche_backend::routes;
use coinche_backend::services::games::init_ref_cards;
use coinche_backend::state::AppState;
use coinche_backend::store::{KvStore, MemoryStore, RedisStore};
use tracing::{info, warn};

mod telemetry;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    telemetry::init_tracing();

    let config = match AppConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("❌ Invalid configuration: {e}");
            std::process::exit(1);
        }
    };
    let host = config.host.clone();
    let port = config.port;

    println!("🚀 Starting Coinche Backend on http://{}:{}", host, port);

    let store: Arc<dyn KvStore> = match config.redis_url.as_deref() {
        Some(url) => match RedisStore::connect(url).await {
            Ok(store) => {
                info!("connected to redis");
                Arc::new(store)
            }
            Err(e) => {
                eprintln!("❌ Failed to connect to Redis: {e}");
                std::process::exit(1);
            }
        },
        None => {
            warn!("REDIS_URL not set; state lives in memory and is lost on restart");
            Arc::new(MemoryStore::new())
        }
    };

    if let Err(e) = init_ref_cards(store.as_ref()).await {
        eprintln!("❌ Failed to write card reference table: {e}");
        std::process::exit(1);
    }

    let app_state = AppState::start(config, store, Dealer::with_os_entropy());
    let data = web::Data::new(app_state.clone());

    let result = HttpServer::new(move || {
        App::new()
            .wrap(StructuredLogger)
            .wrap(TraceSpan)
            .wrap(RequestTrace)
            .app_data(data.clone())
            .configure(routes::configure)
    })
    .bind((host.as_str(), port))?
    .run()
    .await;

    app_state.shutdown().await;
    info!("shutdown complete");
    result
}
