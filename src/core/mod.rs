//! Core infrastructure shared by the channels and the console views

mod event_bus;

pub use event_bus::{EventBus, EventBusStats, StreamEvent};
