//! Connection registry and broadcast hub.
//!
//! A single dispatch task owns the [`ConnectionRegistry`] and drains two
//! queues: an unbounded control queue (register, deregister, counts, stop)
//! and a bounded event queue. Control messages are polled first so a
//! connection registered before it submits always sees its own event.
//! Events are handled strictly one at a time: coordinator side effect, then
//! fan-out to every connection of the event's session.

use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::services::coordinator::SessionCoordinator;
use crate::ws::connection::Connection;
use crate::ws::protocol::RealtimeEvent;
use crate::ws::registry::ConnectionRegistry;

/// What `submit` does when the event queue is full.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OverflowPolicy {
    /// Fail immediately with [`HubError::QueueFull`].
    #[default]
    Reject,
    /// Wait for room up to [`HubConfig::enqueue_timeout`].
    Wait,
}

impl FromStr for OverflowPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "reject" => Ok(Self::Reject),
            "wait" => Ok(Self::Wait),
            other => Err(format!("unknown overflow policy: {other}")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HubConfig {
    pub queue_capacity: usize,
    pub overflow_policy: OverflowPolicy,
    pub enqueue_timeout: Duration,
}

impl Default for HubConfig {
    fn default() -> Self {
        Self {
            queue_capacity: 1024,
            overflow_policy: OverflowPolicy::Reject,
            enqueue_timeout: Duration::from_millis(2000),
        }
    }
}

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum HubError {
    #[error("hub event queue is full")]
    QueueFull,
    #[error("hub is stopped")]
    Stopped,
}

enum Control {
    Register {
        conn_id: Uuid,
        session_id: String,
        connection: Arc<dyn Connection>,
    },
    Deregister {
        conn_id: Uuid,
    },
    Count {
        session_id: Option<String>,
        reply: oneshot::Sender<usize>,
    },
    Stop {
        reply: oneshot::Sender<()>,
    },
}

/// Cloneable front door to a running hub.
#[derive(Clone)]
pub struct HubHandle {
    control: mpsc::UnboundedSender<Control>,
    events: mpsc::Sender<RealtimeEvent>,
    config: HubConfig,
}

impl HubHandle {
    pub fn overflow_policy(&self) -> OverflowPolicy {
        self.config.overflow_policy
    }

    pub fn register(&self, conn_id: Uuid, session_id: impl Into<String>, connection: Arc<dyn Connection>) {
        let session_id = session_id.into();
        if self
            .control
            .send(Control::Register {
                conn_id,
                session_id,
                connection: Arc::clone(&connection),
            })
            .is_err()
        {
            warn!(conn_id = %conn_id, "hub stopped; closing late connection");
            connection.close();
        }
    }

    /// Idempotent.
    pub fn deregister(&self, conn_id: Uuid) {
        let _ = self.control.send(Control::Deregister { conn_id });
    }

    /// Enqueue without waiting; ignores the configured policy.
    pub fn try_submit(&self, event: RealtimeEvent) -> Result<(), HubError> {
        self.events.try_send(event).map_err(|err| match err {
            mpsc::error::TrySendError::Full(_) => HubError::QueueFull,
            mpsc::error::TrySendError::Closed(_) => HubError::Stopped,
        })
    }

    /// Enqueue according to the configured overflow policy.
    pub async fn submit(&self, event: RealtimeEvent) -> Result<(), HubError> {
        match self.config.overflow_policy {
            OverflowPolicy::Reject => self.try_submit(event),
            OverflowPolicy::Wait => {
                match tokio::time::timeout(self.config.enqueue_timeout, self.events.send(event)).await
                {
                    Ok(Ok(())) => Ok(()),
                    Ok(Err(_)) => Err(HubError::Stopped),
                    Err(_) => Err(HubError::QueueFull),
                }
            }
        }
    }

    pub async fn connection_count(&self) -> Result<usize, HubError> {
        self.count(None).await
    }

    pub async fn session_connection_count(&self, session_id: &str) -> Result<usize, HubError> {
        self.count(Some(session_id.to_string())).await
    }

    async fn count(&self, session_id: Option<String>) -> Result<usize, HubError> {
        let (reply, rx) = oneshot::channel();
        self.control
            .send(Control::Count { session_id, reply })
            .map_err(|_| HubError::Stopped)?;
        rx.await.map_err(|_| HubError::Stopped)
    }

    /// Close every registered connection and end the dispatch task. Events
    /// still queued are discarded.
    pub async fn stop(&self) {
        let (reply, rx) = oneshot::channel();
        if self.control.send(Control::Stop { reply }).is_ok() {
            let _ = rx.await;
        }
    }

    pub fn is_stopped(&self) -> bool {
        self.control.is_closed()
    }
}

pub struct Hub {
    registry: ConnectionRegistry,
    coordinator: Arc<SessionCoordinator>,
    control: mpsc::UnboundedReceiver<Control>,
    events: mpsc::Receiver<RealtimeEvent>,
}

enum Flow {
    Continue,
    Stop,
}

impl Hub {
    /// Spawn the dispatch task on the current tokio runtime.
    pub fn start(config: HubConfig, coordinator: Arc<SessionCoordinator>) -> HubHandle {
        Self::spawn(config, coordinator).0
    }

    pub fn spawn(
        config: HubConfig,
        coordinator: Arc<SessionCoordinator>,
    ) -> (HubHandle, JoinHandle<()>) {
        let (control_tx, control_rx) = mpsc::unbounded_channel();
        let (events_tx, events_rx) = mpsc::channel(config.queue_capacity.max(1));

        let hub = Hub {
            registry: ConnectionRegistry::new(),
            coordinator,
            control: control_rx,
            events: events_rx,
        };
        info!(
            queue_capacity = config.queue_capacity,
            overflow_policy = ?config.overflow_policy,
            "hub started"
        );
        let task = tokio::spawn(hub.run());

        (
            HubHandle {
                control: control_tx,
                events: events_tx,
                config,
            },
            task,
        )
    }

    async fn run(mut self) {
        loop {
            tokio::select! {
                biased;
                Some(cmd) = self.control.recv() => {
                    if let Flow::Stop = self.handle_control(cmd) {
                        break;
                    }
                }
                Some(event) = self.events.recv() => self.dispatch(event).await,
                else => break,
            }
        }

        for connection in self.registry.drain() {
            connection.close();
        }
        info!("hub stopped");
    }

    fn handle_control(&mut self, cmd: Control) -> Flow {
        match cmd {
            Control::Register {
                conn_id,
                session_id,
                connection,
            } => {
                debug!(conn_id = %conn_id, session_id = %session_id, "connection registered");
                self.registry.register(conn_id, session_id, connection);
            }
            Control::Deregister { conn_id } => {
                if self.registry.deregister(conn_id).is_some() {
                    debug!(conn_id = %conn_id, "connection deregistered");
                }
            }
            Control::Count { session_id, reply } => {
                let count = match session_id {
                    Some(session_id) => self.registry.session_len(&session_id),
                    None => self.registry.len(),
                };
                let _ = reply.send(count);
            }
            Control::Stop { reply } => {
                let closing = self.registry.len();
                for connection in self.registry.drain() {
                    connection.close();
                }
                info!(closed = closing, "hub stopping");
                let _ = reply.send(());
                return Flow::Stop;
            }
        }
        Flow::Continue
    }

    async fn dispatch(&mut self, event: RealtimeEvent) {
        self.coordinator.apply(&event).await;

        let payload: Arc<str> = match serde_json::to_string(&event) {
            Ok(json) => Arc::from(json),
            Err(err) => {
                error!(session_id = %event.session_id, error = %err, "failed to encode event");
                return;
            }
        };

        let mut failed = Vec::new();
        for (conn_id, connection) in self.registry.peers(&event.session_id) {
            if let Err(err) = connection.send_json(Arc::clone(&payload)) {
                warn!(
                    conn_id = %conn_id,
                    session_id = %event.session_id,
                    error = %err,
                    "delivery failed; dropping connection"
                );
                failed.push(conn_id);
            }
        }

        for conn_id in failed {
            if let Some(connection) = self.registry.deregister(conn_id) {
                connection.close();
            }
        }

        debug!(
            session_id = %event.session_id,
            action = %event.action,
            sequence = %event.sequence,
            "event dispatched"
        );
    }
}
