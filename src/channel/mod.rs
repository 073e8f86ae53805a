//! Reconnecting live-update channels
//!
//! A [`LiveChannel`] owns one WebSocket connection to a named endpoint,
//! delivers inbound text frames to subscribers in arrival order, and keeps
//! reconnecting after transport failures until it is explicitly closed.

mod live;

pub use live::LiveChannel;

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::config::{ChannelConfig, ServerConfig};

/// Immutable location of one WebSocket endpoint
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    host: String,
    port: u16,
    path: String,
    secure: bool,
}

impl Endpoint {
    /// Create a plaintext (ws://) endpoint
    pub fn new(host: impl Into<String>, port: u16, path: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            port,
            path: normalize_path(path.into()),
            secure: false,
        }
    }

    /// Create a TLS (wss://) endpoint
    pub fn secure(host: impl Into<String>, port: u16, path: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            port,
            path: normalize_path(path.into()),
            secure: true,
        }
    }

    /// Build an endpoint for a path on the configured server
    pub fn from_server(server: &ServerConfig, path: &str) -> Self {
        Self {
            host: server.host.clone(),
            port: server.port,
            path: normalize_path(path.to_string()),
            secure: server.secure,
        }
    }

    /// Render the full WebSocket URL
    pub fn url(&self) -> String {
        let scheme = if self.secure { "wss" } else { "ws" };
        format!("{}://{}:{}{}", scheme, self.host, self.port, self.path)
    }

    /// The endpoint path (always with a leading slash)
    pub fn path(&self) -> &str {
        &self.path
    }
}

fn normalize_path(path: String) -> String {
    if path.starts_with('/') {
        path
    } else {
        format!("/{}", path)
    }
}

/// Connection state of a live channel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChannelState {
    /// Handshake in progress
    Connecting,
    /// Connected and able to send
    Open,
    /// Not connected, either transiently or permanently
    Closed,
    /// Waiting out the delay before the next connect attempt
    Reconnecting,
}

impl ChannelState {
    pub(crate) fn as_u8(self) -> u8 {
        match self {
            ChannelState::Connecting => 0,
            ChannelState::Open => 1,
            ChannelState::Closed => 2,
            ChannelState::Reconnecting => 3,
        }
    }

    pub(crate) fn from_u8(value: u8) -> Self {
        match value {
            0 => ChannelState::Connecting,
            1 => ChannelState::Open,
            3 => ChannelState::Reconnecting,
            _ => ChannelState::Closed,
        }
    }
}

/// Event delivered to channel subscribers
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChannelEvent {
    /// The channel completed a handshake
    Connected,
    /// One inbound text frame, in arrival order
    Frame(String),
    /// The transport dropped; the channel will retry unless closed
    Disconnected,
}

/// Tunables for a live channel
#[derive(Debug, Clone)]
pub struct ChannelOptions {
    /// Delay between reconnect attempts
    pub reconnect_delay: Duration,
    /// Timeout for the WebSocket handshake
    pub connect_timeout: Duration,
}

impl Default for ChannelOptions {
    fn default() -> Self {
        Self {
            reconnect_delay: Duration::from_millis(2000),
            connect_timeout: Duration::from_secs(10),
        }
    }
}

impl From<&ChannelConfig> for ChannelOptions {
    fn from(config: &ChannelConfig) -> Self {
        Self {
            reconnect_delay: Duration::from_millis(config.reconnect_delay_ms),
            connect_timeout: Duration::from_secs(config.connect_timeout_secs),
        }
    }
}
