use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use thiserror::Error;
use tracing::debug;

use crate::channel::LiveChannel;

/// Command keyword understood by the control endpoint
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verb {
    Set,
    Start,
    Stop,
    Reset,
    Coef,
    Color,
    Token,
}

impl Verb {
    /// The wire keyword for this verb
    pub fn keyword(&self) -> &'static str {
        match self {
            Verb::Set => "set",
            Verb::Start => "start",
            Verb::Stop => "stop",
            Verb::Reset => "reset",
            Verb::Coef => "coef",
            Verb::Color => "color",
            Verb::Token => "token",
        }
    }

    /// Parse a wire keyword back into a verb
    pub fn from_keyword(keyword: &str) -> Option<Self> {
        match keyword {
            "set" => Some(Verb::Set),
            "start" => Some(Verb::Start),
            "stop" => Some(Verb::Stop),
            "reset" => Some(Verb::Reset),
            "coef" => Some(Verb::Coef),
            "color" => Some(Verb::Color),
            "token" => Some(Verb::Token),
            _ => None,
        }
    }

    /// Whether this verb requires an explicit confirmation before sending
    pub fn needs_confirmation(&self) -> bool {
        matches!(self, Verb::Set | Verb::Reset)
    }
}

impl fmt::Display for Verb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.keyword())
    }
}

/// Why a command argument was rejected
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// The time argument is not a strict HH:MM:SS string
    #[error("invalid time format, expected HH:MM:SS")]
    InvalidFormat,
    /// The coefficient does not parse as a finite number
    #[error("coefficient is not a number")]
    NotANumber,
    /// The value is empty after trimming
    #[error("value must not be empty")]
    EmptyValue,
    /// The option is not in the allowed set
    #[error("unknown option")]
    UnknownOption,
}

/// A validated control command, immutable once built
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Command {
    verb: Verb,
    argument: Option<String>,
}

impl Command {
    /// Validate a raw argument for the verb and build the command.
    ///
    /// Validation mirrors what the control endpoint will accept so that a
    /// rejected command never reaches the wire.
    pub fn parse(verb: Verb, raw: &str) -> Result<Self, ValidationError> {
        let argument = match verb {
            Verb::Set => {
                let value = raw.trim();
                if !is_clock_format(value) {
                    return Err(ValidationError::InvalidFormat);
                }
                Some(value.to_string())
            }
            Verb::Coef => {
                // The server tolerates a decimal comma; normalize it here
                let normalized = raw.trim().replace(',', ".");
                match normalized.parse::<f64>() {
                    Ok(value) if value.is_finite() => Some(normalized),
                    _ => return Err(ValidationError::NotANumber),
                }
            }
            Verb::Token => {
                let value = raw.trim();
                if value.is_empty() {
                    return Err(ValidationError::EmptyValue);
                }
                Some(value.to_string())
            }
            Verb::Color => {
                let value = raw.trim().to_lowercase();
                if value != "black" && value != "white" {
                    return Err(ValidationError::UnknownOption);
                }
                Some(value)
            }
            Verb::Start | Verb::Stop | Verb::Reset => None,
        };

        Ok(Self { verb, argument })
    }

    /// The verb of this command
    pub fn verb(&self) -> Verb {
        self.verb
    }

    /// The validated argument, if the verb takes one
    pub fn argument(&self) -> Option<&str> {
        self.argument.as_deref()
    }

    /// Serialize to the wire format: `"<verb> <argument>"` or the bare verb
    pub fn wire(&self) -> String {
        match &self.argument {
            Some(argument) => format!("{} {}", self.verb.keyword(), argument),
            None => self.verb.keyword().to_string(),
        }
    }
}

/// Strict HH:MM:SS check: two digits per field, colon separated
fn is_clock_format(value: &str) -> bool {
    let bytes = value.as_bytes();
    bytes.len() == 8
        && bytes[2] == b':'
        && bytes[5] == b':'
        && [0, 1, 3, 4, 6, 7]
            .iter()
            .all(|&i| bytes[i].is_ascii_digit())
}

/// Outcome of submitting a command through the dispatcher
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Dispatch {
    /// The command was validated, confirmed and handed to the channel
    Sent(Command),
    /// The confirmation predicate declined; the command was dropped silently
    Discarded,
    /// The control channel is not open; nothing was sent
    Offline(Command),
}

/// Caller-supplied confirmation predicate for destructive commands
pub type ConfirmFn =
    Arc<dyn Fn(&Command) -> Pin<Box<dyn Future<Output = bool> + Send>> + Send + Sync>;

/// Validates user commands and sends them over the control channel
pub struct CommandDispatcher {
    channel: Arc<LiveChannel>,
    confirm: ConfirmFn,
}

impl CommandDispatcher {
    /// Create a dispatcher that sends every valid command without asking
    pub fn new(channel: Arc<LiveChannel>) -> Self {
        Self {
            channel,
            confirm: Arc::new(|_| Box::pin(async { true })),
        }
    }

    /// Create a dispatcher that confirms set/reset via the given predicate
    pub fn with_confirmation(channel: Arc<LiveChannel>, confirm: ConfirmFn) -> Self {
        Self { channel, confirm }
    }

    /// Validate, confirm and send one command.
    ///
    /// Returns `Err` only for validation failures; transport unavailability
    /// and a declined confirmation are ordinary outcomes, not errors.
    pub async fn submit(&self, verb: Verb, raw: &str) -> Result<Dispatch, ValidationError> {
        let command = Command::parse(verb, raw)?;

        if command.verb().needs_confirmation() && !(self.confirm)(&command).await {
            debug!(verb = %command.verb(), "Command discarded by confirmation");
            return Ok(Dispatch::Discarded);
        }

        if self.channel.send(command.wire()) {
            debug!(verb = %command.verb(), "Command sent");
            Ok(Dispatch::Sent(command))
        } else {
            debug!(verb = %command.verb(), "Control channel not open, command not sent");
            Ok(Dispatch::Offline(command))
        }
    }
}

impl fmt::Debug for CommandDispatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommandDispatcher")
            .field("channel", &self.channel.name())
            .finish()
    }
}
