//! Event bus implementation

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{broadcast, RwLock};
use tracing::{error, trace, warn};

use crate::error::TipclockResult;

/// Standardized event structure for all events flowing through the client
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StreamEvent {
    /// Channel that produced the event (e.g., "timer", "control")
    pub source: String,
    /// Type of event (e.g., "frame", "channel.connected")
    pub event_type: String,
    /// Arbitrary JSON payload with event details
    pub payload: serde_json::Value,
    /// Timestamp when the event was created
    pub timestamp: chrono::DateTime<chrono::Utc>,
    /// Message format version for backward compatibility
    #[serde(default = "default_version")]
    pub version: u8,
    /// Unique event ID
    #[serde(default = "generate_uuid")]
    pub id: String,
}

fn default_version() -> u8 {
    1
}

fn generate_uuid() -> String {
    use uuid::Uuid;
    Uuid::new_v4().to_string()
}

impl StreamEvent {
    /// Create a new event
    pub fn new(source: &str, event_type: &str, payload: serde_json::Value) -> Self {
        Self {
            source: source.to_string(),
            event_type: event_type.to_string(),
            payload,
            timestamp: chrono::Utc::now(),
            version: default_version(),
            id: generate_uuid(),
        }
    }

    /// Get the source of this event
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Get the event type
    pub fn event_type(&self) -> &str {
        &self.event_type
    }

    /// Get the payload
    pub fn payload(&self) -> &serde_json::Value {
        &self.payload
    }

    /// Get the frame text carried by a "frame" event, if any
    pub fn frame_text(&self) -> Option<&str> {
        self.payload.get("text").and_then(|v| v.as_str())
    }
}

/// Statistics about event bus activity
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EventBusStats {
    /// Number of events successfully published
    pub events_published: u64,
    /// Number of events dropped (no receivers)
    pub events_dropped: u64,
    /// Count of events by source
    pub source_counts: HashMap<String, u64>,
    /// Count of events by type
    pub type_counts: HashMap<String, u64>,
}

/// Central event bus distributing channel traffic to subscribers
pub struct EventBus {
    /// The broadcast channel sender
    sender: broadcast::Sender<StreamEvent>,
    /// Configured capacity of the channel
    capacity: usize,
    /// Statistics about event bus activity
    stats: Arc<RwLock<EventBusStats>>,
}

impl EventBus {
    /// Create a new event bus with the specified capacity
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self {
            sender,
            capacity,
            stats: Arc::new(RwLock::new(EventBusStats::default())),
        }
    }

    /// Get a receiver to subscribe to events
    pub fn subscribe(&self) -> broadcast::Receiver<StreamEvent> {
        trace!("New subscriber registered to event bus");
        self.sender.subscribe()
    }

    /// Publish an event to all subscribers
    pub async fn publish(&self, event: StreamEvent) -> TipclockResult<usize> {
        let source = event.source.clone();
        let event_type = event.event_type.clone();

        trace!(
            source = %source,
            event_type = %event_type,
            "Publishing event to bus"
        );

        match self.sender.send(event) {
            Ok(receivers) => {
                let mut stats_guard = self.stats.write().await;
                stats_guard.events_published += 1;
                *stats_guard.source_counts.entry(source).or_insert(0) += 1;
                *stats_guard.type_counts.entry(event_type).or_insert(0) += 1;

                trace!(receivers, "Event published successfully");
                Ok(receivers)
            }
            Err(err) => {
                // A send only fails when nobody is listening
                if err.to_string().contains("closed") || self.sender.receiver_count() == 0 {
                    let mut stats_guard = self.stats.write().await;
                    stats_guard.events_dropped += 1;

                    warn!(
                        source = %source,
                        event_type = %event_type,
                        "No receivers for event, message dropped"
                    );
                    Ok(0)
                } else {
                    error!(error = %err, "Failed to publish event");
                    Err(crate::error::event_bus_publish_failed(err))
                }
            }
        }
    }

    /// Get current event bus statistics
    pub async fn get_stats(&self) -> EventBusStats {
        self.stats.read().await.clone()
    }

    /// Reset all statistics counters
    pub async fn reset_stats(&self) {
        *self.stats.write().await = EventBusStats::default();
    }

    /// Get the configured capacity of the event bus
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Get the current number of subscribers
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Clone for EventBus {
    fn clone(&self) -> Self {
        Self {
            sender: self.sender.clone(),
            capacity: self.capacity,
            stats: Arc::clone(&self.stats),
        }
    }
}
