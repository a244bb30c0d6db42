//! Realtime layer: websocket sessions feeding a single broadcast hub.

pub mod connection;
pub mod hub;
pub mod protocol;
pub mod registry;
pub mod session;

pub use hub::{Hub, HubConfig, HubError, HubHandle, OverflowPolicy};
pub use protocol::{Action, RealtimeEvent};
