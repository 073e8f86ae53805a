pub mod channel;
pub mod config;
pub mod control;
pub mod core;
pub mod error;
pub mod render;
pub mod service;

// Re-export core components
pub use crate::channel::{ChannelEvent, ChannelOptions, ChannelState, Endpoint, LiveChannel};
pub use crate::control::{Command, CommandDispatcher, Dispatch, ValidationError, Verb};
pub use crate::core::{EventBus, StreamEvent};
pub use crate::error::{TipclockError, TipclockResult};
pub use crate::render::{FrameHandler, RenderReconciler};
pub use crate::service::PanelService;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
