//! Environment-driven configuration.
//!
//! Every knob has a default so a bare `coinche-backend` starts against the
//! in-memory store. Unparseable values fail start-up with `AppError::Config`.

use std::env;
use std::str::FromStr;
use std::time::Duration;

use crate::error::AppError;
use crate::repos::ledger::TrickStrictness;
use crate::services::persistence::{PersistenceConfig, RetryPolicy};
use crate::ws::hub::{HubConfig, OverflowPolicy};
use crate::ws::session::WsConfig;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    /// `None` runs against the in-memory store.
    pub redis_url: Option<String>,
    pub hub: HubConfig,
    pub persistence: PersistenceConfig,
    pub trick_strictness: TrickStrictness,
    pub ws: WsConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            redis_url: None,
            hub: HubConfig::default(),
            persistence: PersistenceConfig::default(),
            trick_strictness: TrickStrictness::default(),
            ws: WsConfig::default(),
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Result<Self, AppError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Build from an arbitrary variable source; unset and blank values fall
    /// back to defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, AppError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());
        let defaults = Self::default();

        let overflow_policy = match var("HUB_OVERFLOW_POLICY") {
            Some(raw) => raw
                .parse::<OverflowPolicy>()
                .map_err(|_| invalid("HUB_OVERFLOW_POLICY", &raw, "expected reject or wait"))?,
            None => defaults.hub.overflow_policy,
        };
        let trick_strictness = match var("TRICK_STRICTNESS") {
            Some(raw) => raw.parse::<TrickStrictness>().map_err(|_| {
                invalid(
                    "TRICK_STRICTNESS",
                    &raw,
                    "expected permissive or require_all_seats",
                )
            })?,
            None => defaults.trick_strictness,
        };

        let hub = HubConfig {
            queue_capacity: positive(
                "HUB_QUEUE_CAPACITY",
                parsed(&var, "HUB_QUEUE_CAPACITY", defaults.hub.queue_capacity)?,
            )?,
            overflow_policy,
            enqueue_timeout: millis(&var, "HUB_ENQUEUE_TIMEOUT_MS", defaults.hub.enqueue_timeout)?,
        };

        let retry = RetryPolicy {
            max_attempts: positive(
                "PERSISTENCE_MAX_ATTEMPTS",
                parsed(
                    &var,
                    "PERSISTENCE_MAX_ATTEMPTS",
                    defaults.persistence.retry.max_attempts,
                )?,
            )?,
            initial_backoff: millis(
                &var,
                "PERSISTENCE_INITIAL_BACKOFF_MS",
                defaults.persistence.retry.initial_backoff,
            )?,
            max_backoff: millis(
                &var,
                "PERSISTENCE_MAX_BACKOFF_MS",
                defaults.persistence.retry.max_backoff,
            )?,
            ..defaults.persistence.retry
        };
        if retry.max_backoff < retry.initial_backoff {
            return Err(AppError::config(
                "PERSISTENCE_MAX_BACKOFF_MS must not be below PERSISTENCE_INITIAL_BACKOFF_MS",
            ));
        }

        let persistence = PersistenceConfig {
            queue_capacity: positive(
                "PERSISTENCE_QUEUE_CAPACITY",
                parsed(
                    &var,
                    "PERSISTENCE_QUEUE_CAPACITY",
                    defaults.persistence.queue_capacity,
                )?,
            )?,
            retry,
        };

        let ws = WsConfig {
            heartbeat_interval: secs(&var, "WS_HEARTBEAT_SECS", defaults.ws.heartbeat_interval)?,
            client_timeout: secs(&var, "WS_CLIENT_TIMEOUT_SECS", defaults.ws.client_timeout)?,
        };
        if ws.client_timeout <= ws.heartbeat_interval {
            return Err(AppError::config(
                "WS_CLIENT_TIMEOUT_SECS must be greater than WS_HEARTBEAT_SECS",
            ));
        }

        Ok(Self {
            host: var("BACKEND_HOST").unwrap_or(defaults.host),
            port: parsed(&var, "BACKEND_PORT", defaults.port)?,
            redis_url: var("REDIS_URL"),
            hub,
            persistence,
            trick_strictness,
            ws,
        })
    }
}

fn invalid(name: &str, raw: &str, hint: &str) -> AppError {
    AppError::config(format!("Invalid value '{raw}' for {name}: {hint}"))
}

fn parsed<T, F>(var: &F, name: &str, default: T) -> Result<T, AppError>
where
    T: FromStr,
    F: Fn(&str) -> Option<String>,
{
    match var(name) {
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .map_err(|_| invalid(name, &raw, "not a number")),
        None => Ok(default),
    }
}

fn positive<T: Default + PartialEq>(name: &str, value: T) -> Result<T, AppError> {
    if value == T::default() {
        return Err(AppError::config(format!("{name} must be greater than zero")));
    }
    Ok(value)
}

fn millis<F>(var: &F, name: &str, default: Duration) -> Result<Duration, AppError>
where
    F: Fn(&str) -> Option<String>,
{
    parsed(var, name, default.as_millis() as u64).map(Duration::from_millis)
}

fn secs<F>(var: &F, name: &str, default: Duration) -> Result<Duration, AppError>
where
    F: Fn(&str) -> Option<String>,
{
    let value = positive(name, parsed(var, name, default.as_secs())?)?;
    Ok(Duration::from_secs(value))
}
