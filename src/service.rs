use std::collections::HashMap;
use std::sync::Arc;

use serde_json::json;
use tokio::sync::broadcast::error::RecvError;
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, info, warn};

use crate::channel::{ChannelEvent, ChannelOptions, Endpoint, LiveChannel};
use crate::config::Config;
use crate::core::{EventBus, StreamEvent};
use crate::render::FrameHandler;

const EVENT_BUS_CAPACITY: usize = 256;

/// Orchestrates the live channels, the event bus and the registered views.
///
/// One service replaces the per-page socket globals of a browser client:
/// channels are attached once, forward their traffic onto the shared bus,
/// and every view consumes from the bus by source name.
pub struct PanelService {
    config: Config,
    event_bus: Arc<EventBus>,
    channels: RwLock<HashMap<String, Arc<LiveChannel>>>,
    handlers: Arc<Mutex<HashMap<String, Box<dyn FrameHandler>>>>,
    tasks: Mutex<Vec<tokio::task::JoinHandle<()>>>,
}

impl PanelService {
    /// Create a new panel service
    pub fn new(config: Config) -> Self {
        Self {
            config,
            event_bus: Arc::new(EventBus::new(EVENT_BUS_CAPACITY)),
            channels: RwLock::new(HashMap::new()),
            handlers: Arc::new(Mutex::new(HashMap::new())),
            tasks: Mutex::new(Vec::new()),
        }
    }

    /// The shared event bus
    pub fn event_bus(&self) -> Arc<EventBus> {
        Arc::clone(&self.event_bus)
    }

    /// The service configuration
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Open a named channel and forward its events onto the bus.
    ///
    /// The returned handle can be used for sending (the control channel);
    /// rendering goes through the bus and the registered handlers.
    pub async fn attach_channel(&self, name: &str, endpoint: Endpoint) -> Arc<LiveChannel> {
        let options = ChannelOptions::from(&self.config.channel);
        let channel = LiveChannel::connect(name, endpoint, options).await;

        let mut events = channel.subscribe();
        let bus = Arc::clone(&self.event_bus);
        let source = name.to_string();

        let forwarder = tokio::spawn(async move {
            loop {
                let event = match events.recv().await {
                    Ok(event) => event,
                    Err(RecvError::Lagged(skipped)) => {
                        warn!(source = %source, skipped, "Event forwarder lagged, frames dropped");
                        continue;
                    }
                    Err(RecvError::Closed) => break,
                };

                let stream_event = match event {
                    ChannelEvent::Frame(text) => {
                        StreamEvent::new(&source, "frame", json!({ "text": text }))
                    }
                    ChannelEvent::Connected => {
                        StreamEvent::new(&source, "channel.connected", json!({}))
                    }
                    ChannelEvent::Disconnected => {
                        StreamEvent::new(&source, "channel.disconnected", json!({}))
                    }
                };

                if let Err(e) = bus.publish(stream_event).await {
                    warn!(source = %source, error = %e, "Failed to forward channel event");
                }
            }
        });

        self.tasks.lock().await.push(forwarder);
        self.channels
            .write()
            .await
            .insert(name.to_string(), Arc::clone(&channel));

        info!(channel = name, "Channel attached");
        channel
    }

    /// Register the handler that consumes one channel's traffic
    pub async fn register_handler(&self, source: &str, handler: Box<dyn FrameHandler>) {
        self.handlers.lock().await.insert(source.to_string(), handler);
    }

    /// Get an attached channel by name
    pub async fn channel(&self, name: &str) -> Option<Arc<LiveChannel>> {
        self.channels.read().await.get(name).cloned()
    }

    /// Start routing bus events to the registered handlers
    pub async fn start(&self) {
        let mut receiver = self.event_bus.subscribe();
        let handlers = Arc::clone(&self.handlers);

        let router = tokio::spawn(async move {
            loop {
                let event = match receiver.recv().await {
                    Ok(event) => event,
                    Err(RecvError::Lagged(skipped)) => {
                        warn!(skipped, "Event router lagged, events dropped");
                        continue;
                    }
                    Err(RecvError::Closed) => break,
                };

                let mut handlers = handlers.lock().await;
                let Some(handler) = handlers.get_mut(event.source()) else {
                    debug!(source = %event.source(), "No handler registered for event source");
                    continue;
                };

                match event.event_type() {
                    "frame" => {
                        if let Some(text) = event.frame_text() {
                            handler.on_frame(text).await;
                        }
                    }
                    "channel.connected" => handler.on_connected().await,
                    "channel.disconnected" => handler.on_disconnected().await,
                    other => debug!(event_type = %other, "Ignoring event type"),
                }
            }
        });

        self.tasks.lock().await.push(router);
        info!("Panel service started");
    }

    /// Close every channel and stop the background tasks
    pub async fn shutdown(&self) {
        for (_, channel) in self.channels.write().await.drain() {
            channel.close().await;
        }

        for task in self.tasks.lock().await.drain(..) {
            task.abort();
        }

        info!("Panel service stopped");
    }
}
