use std::fmt;

/// Main error type for the tipclock client
#[derive(Debug, Clone)]
pub struct TipclockError {
    /// Error code for categorization and identification
    pub code: ErrorCode,
    /// Human-readable error message
    pub message: String,
    /// Optional context for more detailed error information
    pub context: Option<String>,
    /// Error severity level
    pub severity: ErrorSeverity,
    /// Optional category for filtering and handling
    pub category: Option<ErrorCategory>,
}

/// Type alias for tipclock results
pub type TipclockResult<T> = Result<T, TipclockError>;

impl fmt::Display for TipclockError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code, self.message)?;
        if let Some(context) = &self.context {
            write!(f, " ({})", context)?;
        }
        Ok(())
    }
}

impl std::error::Error for TipclockError {}

/// Enumeration of error codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    // General errors
    Unknown,
    ConfigInvalid,

    // Channel errors
    ChannelConnectFailed,
    ChannelSendFailed,
    ChannelClosed,

    // Event bus errors
    EventBusPublishFailed,

    // Service errors
    HandlerMissing,
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let code_str = match self {
            // General errors
            ErrorCode::Unknown => "UNKNOWN",
            ErrorCode::ConfigInvalid => "CONFIG_INVALID",

            // Channel errors
            ErrorCode::ChannelConnectFailed => "CHANNEL_CONNECT_FAILED",
            ErrorCode::ChannelSendFailed => "CHANNEL_SEND_FAILED",
            ErrorCode::ChannelClosed => "CHANNEL_CLOSED",

            // Event bus errors
            ErrorCode::EventBusPublishFailed => "EVENT_BUS_PUBLISH_FAILED",

            // Service errors
            ErrorCode::HandlerMissing => "HANDLER_MISSING",
        };
        write!(f, "{}", code_str)
    }
}

/// Error severity level
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorSeverity {
    /// Informational only, not an actual error
    Info,
    /// Warning that doesn't prevent operation
    Warning,
    /// Error that affects functionality but allows continued operation
    Error,
    /// Severe error that prevents further operation
    Critical,
}

/// Error category for filtering and handling
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Network-related errors (connection, timeout, etc.)
    Network,
    /// Configuration-related errors
    Configuration,
    /// Internal errors
    Internal,
}

// Helper functions to create standard errors

/// Create a channel connect failed error
pub fn channel_connect_failed(name: &str, error: impl fmt::Display) -> TipclockError {
    TipclockError {
        code: ErrorCode::ChannelConnectFailed,
        message: format!("Failed to connect channel '{}'", name),
        context: Some(error.to_string()),
        severity: ErrorSeverity::Warning,
        category: Some(ErrorCategory::Network),
    }
}

/// Create a channel send failed error
pub fn channel_send_failed(name: &str) -> TipclockError {
    TipclockError {
        code: ErrorCode::ChannelSendFailed,
        message: format!("Channel '{}' is not open for sending", name),
        context: None,
        severity: ErrorSeverity::Warning,
        category: Some(ErrorCategory::Network),
    }
}

/// Create a channel closed error
pub fn channel_closed(name: &str) -> TipclockError {
    TipclockError {
        code: ErrorCode::ChannelClosed,
        message: format!("Channel '{}' was closed", name),
        context: None,
        severity: ErrorSeverity::Info,
        category: Some(ErrorCategory::Network),
    }
}

/// Create a config invalid error
pub fn config_invalid(detail: impl Into<String>) -> TipclockError {
    TipclockError {
        code: ErrorCode::ConfigInvalid,
        message: detail.into(),
        context: None,
        severity: ErrorSeverity::Critical,
        category: Some(ErrorCategory::Configuration),
    }
}

/// Create an event bus publish failed error
pub fn event_bus_publish_failed(error: impl std::error::Error) -> TipclockError {
    TipclockError {
        code: ErrorCode::EventBusPublishFailed,
        message: "Failed to publish event to event bus".to_string(),
        context: Some(error.to_string()),
        severity: ErrorSeverity::Warning,
        category: Some(ErrorCategory::Internal),
    }
}

/// Create a handler missing error
pub fn handler_missing(source: &str) -> TipclockError {
    TipclockError {
        code: ErrorCode::HandlerMissing,
        message: format!("No frame handler registered for source '{}'", source),
        context: None,
        severity: ErrorSeverity::Warning,
        category: Some(ErrorCategory::Internal),
    }
}
