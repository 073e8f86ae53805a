use serde::{Deserialize, Serialize};

// Default configuration values
const DEFAULT_HOST: &str = "localhost";
const DEFAULT_PORT: u16 = 8000;
const DEFAULT_RECONNECT_DELAY_MS: u64 = 2000;
const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;

const DEFAULT_TIMER_PATH: &str = "/ws";
const DEFAULT_CONTROL_PATH: &str = "/control";
const DEFAULT_TIMER_CFG_PATH: &str = "/timer_cfg";

/// Main configuration struct for tipclock
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Location of the timer server
    pub server: ServerConfig,
    /// Live-channel behavior
    pub channel: ChannelConfig,
    /// Endpoint paths on the timer server
    pub endpoints: EndpointConfig,
}

/// Location of the timer server the client connects to
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Hostname of the timer server
    #[serde(default = "default_host")]
    pub host: String,
    /// Port of the timer server
    #[serde(default = "default_port")]
    pub port: u16,
    /// Whether to connect over TLS (wss)
    #[serde(default = "default_secure")]
    pub secure: bool,
}

/// Behavior of the reconnecting live channels
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChannelConfig {
    /// Delay between reconnect attempts in milliseconds
    #[serde(default = "default_reconnect_delay_ms")]
    pub reconnect_delay_ms: u64,
    /// Timeout for the WebSocket handshake in seconds
    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,
}

/// Paths of the three WebSocket endpoints the server exposes
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EndpointConfig {
    /// Remaining-time feed
    #[serde(default = "default_timer_path")]
    pub timer: String,
    /// Command/status channel
    #[serde(default = "default_control_path")]
    pub control: String,
    /// Timer appearance feed
    #[serde(default = "default_timer_cfg_path")]
    pub timer_cfg: String,
}

// Default functions
fn default_host() -> String {
    std::env::var("TIPCLOCK_HOST").unwrap_or_else(|_| DEFAULT_HOST.to_string())
}

fn default_port() -> u16 {
    std::env::var("TIPCLOCK_PORT")
        .ok()
        .and_then(|val| val.parse().ok())
        .unwrap_or(DEFAULT_PORT)
}

fn default_secure() -> bool {
    std::env::var("TIPCLOCK_TLS")
        .ok()
        .and_then(|val| val.parse().ok())
        .unwrap_or(false)
}

fn default_reconnect_delay_ms() -> u64 {
    std::env::var("TIPCLOCK_RECONNECT_MS")
        .ok()
        .and_then(|val| val.parse().ok())
        .unwrap_or(DEFAULT_RECONNECT_DELAY_MS)
}

fn default_connect_timeout_secs() -> u64 {
    std::env::var("TIPCLOCK_CONNECT_TIMEOUT")
        .ok()
        .and_then(|val| val.parse().ok())
        .unwrap_or(DEFAULT_CONNECT_TIMEOUT_SECS)
}

fn default_timer_path() -> String {
    std::env::var("TIPCLOCK_TIMER_PATH").unwrap_or_else(|_| DEFAULT_TIMER_PATH.to_string())
}

fn default_control_path() -> String {
    std::env::var("TIPCLOCK_CONTROL_PATH").unwrap_or_else(|_| DEFAULT_CONTROL_PATH.to_string())
}

fn default_timer_cfg_path() -> String {
    std::env::var("TIPCLOCK_TIMER_CFG_PATH").unwrap_or_else(|_| DEFAULT_TIMER_CFG_PATH.to_string())
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            channel: ChannelConfig::default(),
            endpoints: EndpointConfig::default(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            secure: default_secure(),
        }
    }
}

impl Default for ChannelConfig {
    fn default() -> Self {
        Self {
            reconnect_delay_ms: default_reconnect_delay_ms(),
            connect_timeout_secs: default_connect_timeout_secs(),
        }
    }
}

impl Default for EndpointConfig {
    fn default() -> Self {
        Self {
            timer: default_timer_path(),
            control: default_control_path(),
            timer_cfg: default_timer_cfg_path(),
        }
    }
}

/// Load the application configuration from the environment
pub fn load_config() -> Config {
    Config::default()
}
