//! Test logging.
//!
//! `TEST_LOG` wins over `RUST_LOG`; without either only warnings from the
//! backend are shown and the chatty websocket/http crates stay quiet.

use once_cell::sync::OnceCell;
use tracing_subscriber::{fmt, EnvFilter};

static INSTALLED: OnceCell<()> = OnceCell::new();

const QUIET: &str = "warn,actix_server=error,actix_web_actors=error,tungstenite=error";

fn filter() -> EnvFilter {
    ["TEST_LOG", "RUST_LOG"]
        .iter()
        .find_map(|var| std::env::var(var).ok().filter(|v| !v.trim().is_empty()))
        .map(EnvFilter::new)
        .unwrap_or_else(|| EnvFilter::new(QUIET))
}

/// Install the test subscriber once per process. Safe to call from every
/// test binary and every `ctor` hook.
pub fn init() {
    INSTALLED.get_or_init(|| {
        // Another subscriber may already be global; keep it.
        let _ = fmt()
            .with_env_filter(filter())
            .with_test_writer()
            .without_time()
            .with_target(true)
            .try_init();
    });
}
