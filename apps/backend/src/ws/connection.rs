//! Transport abstraction the hub delivers through.
//!
//! The hub only needs to push an already-serialized JSON frame, learn that
//! the push failed, and close. [`ActorConnection`] adapts a websocket actor;
//! [`ChannelConnection`] adapts a plain bounded channel.

use std::sync::Arc;

use actix::prelude::*;
use parking_lot::Mutex;
use thiserror::Error;
use tokio::sync::mpsc;

use crate::ws::session::{Deliver, Shutdown, WsSession};

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeliveryError {
    #[error("connection is closed")]
    Closed,
    #[error("connection outbox is full")]
    Full,
}

pub trait Connection: Send + Sync {
    /// Must not block. `Full` is for transports with a hard outbox bound.
    fn send_json(&self, payload: Arc<str>) -> Result<(), DeliveryError>;

    fn close(&self);
}

pub struct ActorConnection {
    addr: Addr<WsSession>,
}

impl ActorConnection {
    pub fn new(addr: Addr<WsSession>) -> Self {
        Self { addr }
    }
}

/// Frames are queued with `do_send`, which bypasses the actor's bounded
/// mailbox: a burst on a healthy socket must not look like a dead peer.
/// Only a stopped actor counts as a failed write.
impl Connection for ActorConnection {
    fn send_json(&self, payload: Arc<str>) -> Result<(), DeliveryError> {
        if !self.addr.connected() {
            return Err(DeliveryError::Closed);
        }
        self.addr.do_send(Deliver(payload));
        Ok(())
    }

    fn close(&self) {
        self.addr.do_send(Shutdown);
    }
}

/// Channel-backed connection. Closing drops the sender so the receiving
/// side observes end-of-stream.
pub struct ChannelConnection {
    tx: Mutex<Option<mpsc::Sender<Arc<str>>>>,
}

impl ChannelConnection {
    pub fn new(capacity: usize) -> (Self, mpsc::Receiver<Arc<str>>) {
        let (tx, rx) = mpsc::channel(capacity);
        (
            Self {
                tx: Mutex::new(Some(tx)),
            },
            rx,
        )
    }

    pub fn is_closed(&self) -> bool {
        self.tx.lock().is_none()
    }
}

impl Connection for ChannelConnection {
    fn send_json(&self, payload: Arc<str>) -> Result<(), DeliveryError> {
        let guard = self.tx.lock();
        let Some(tx) = guard.as_ref() else {
            return Err(DeliveryError::Closed);
        };
        tx.try_send(payload).map_err(|err| match err {
            mpsc::error::TrySendError::Full(_) => DeliveryError::Full,
            mpsc::error::TrySendError::Closed(_) => DeliveryError::Closed,
        })
    }

    fn close(&self) {
        self.tx.lock().take();
    }
}
