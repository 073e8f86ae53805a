use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;

use futures_util::{SinkExt, StreamExt};
use tokio::sync::{broadcast, mpsc, Mutex};
use tokio::time::{sleep, timeout};
use tokio_tungstenite::{connect_async, tungstenite::protocol::Message};
use tracing::{debug, info, warn};

use super::{ChannelEvent, ChannelOptions, ChannelState, Endpoint};

/// Capacity of the subscriber broadcast channel
const EVENT_CHANNEL_SIZE: usize = 256;
const SHUTDOWN_CHANNEL_SIZE: usize = 1;

/// A reconnecting WebSocket channel to one server endpoint.
///
/// The channel owns at most one live socket at a time. A background worker
/// drives the connect / read / reconnect cycle; subscribers registered via
/// [`LiveChannel::subscribe`] keep receiving events across reconnects without
/// ever re-subscribing. Frames lost while disconnected are not replayed.
#[derive(Debug)]
pub struct LiveChannel {
    name: String,
    endpoint: Endpoint,
    options: ChannelOptions,
    state: AtomicU8,
    events: broadcast::Sender<ChannelEvent>,
    outbound_tx: mpsc::UnboundedSender<String>,
    shutdown_tx: Mutex<Option<mpsc::Sender<()>>>,
    worker: Mutex<Option<tokio::task::JoinHandle<()>>>,
}

impl LiveChannel {
    /// Open a channel to the endpoint and start its connection worker
    pub async fn connect(name: &str, endpoint: Endpoint, options: ChannelOptions) -> Arc<Self> {
        let (events, _) = broadcast::channel(EVENT_CHANNEL_SIZE);
        let (outbound_tx, outbound_rx) = mpsc::unbounded_channel();
        let (shutdown_tx, shutdown_rx) = mpsc::channel(SHUTDOWN_CHANNEL_SIZE);

        let channel = Arc::new(Self {
            name: name.to_string(),
            endpoint,
            options,
            state: AtomicU8::new(ChannelState::Connecting.as_u8()),
            events,
            outbound_tx,
            shutdown_tx: Mutex::new(Some(shutdown_tx)),
            worker: Mutex::new(None),
        });

        let worker_channel = Arc::clone(&channel);
        let handle = tokio::spawn(async move {
            worker_channel.run(outbound_rx, shutdown_rx).await;
        });
        *channel.worker.lock().await = Some(handle);

        channel
    }

    /// The channel name used for logging and event routing
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The endpoint this channel connects to
    pub fn endpoint(&self) -> &Endpoint {
        &self.endpoint
    }

    /// Current connection state
    pub fn state(&self) -> ChannelState {
        ChannelState::from_u8(self.state.load(Ordering::SeqCst))
    }

    /// Subscribe to channel events.
    ///
    /// The subscription survives reconnects; a receiver sees `Connected`,
    /// `Frame` and `Disconnected` events in the order they occur.
    pub fn subscribe(&self) -> broadcast::Receiver<ChannelEvent> {
        self.events.subscribe()
    }

    /// Queue a text frame for sending.
    ///
    /// Returns `true` only when the channel is currently open and the frame
    /// was handed to the socket writer. When the channel is connecting,
    /// reconnecting or closed this is a no-op returning `false`.
    pub fn send(&self, text: impl Into<String>) -> bool {
        if self.state() != ChannelState::Open {
            return false;
        }
        self.outbound_tx.send(text.into()).is_ok()
    }

    /// Close the channel and suppress any further reconnection.
    ///
    /// Cancels a pending reconnect delay, so a closed channel never comes
    /// back on its own.
    pub async fn close(&self) {
        info!(channel = %self.name, "Closing channel");

        if let Some(tx) = self.shutdown_tx.lock().await.take() {
            let _ = tx.send(()).await;
        }

        if let Some(handle) = self.worker.lock().await.take() {
            handle.abort();
            // Wait for the worker to stop so no stale state write survives
            let _ = handle.await;
        }

        self.set_state(ChannelState::Closed);
    }

    fn set_state(&self, state: ChannelState) {
        self.state.store(state.as_u8(), Ordering::SeqCst);
    }

    fn emit(&self, event: ChannelEvent) {
        // A send error only means nobody is subscribed right now
        let _ = self.events.send(event);
    }

    /// Connection worker: connect, pump frames, reconnect after a fixed delay.
    async fn run(
        self: Arc<Self>,
        mut outbound_rx: mpsc::UnboundedReceiver<String>,
        mut shutdown_rx: mpsc::Receiver<()>,
    ) {
        loop {
            self.set_state(ChannelState::Connecting);
            debug!(channel = %self.name, url = %self.endpoint.url(), "Connecting channel");

            let connected = tokio::select! {
                _ = shutdown_rx.recv() => {
                    self.set_state(ChannelState::Closed);
                    return;
                }
                result = timeout(self.options.connect_timeout, connect_async(self.endpoint.url())) => {
                    match result {
                        Ok(Ok((ws_stream, _response))) => Some(ws_stream),
                        Ok(Err(e)) => {
                            warn!(channel = %self.name, error = %e, "WebSocket connect failed");
                            None
                        }
                        Err(_) => {
                            warn!(
                                channel = %self.name,
                                timeout_secs = self.options.connect_timeout.as_secs(),
                                "WebSocket handshake timed out"
                            );
                            None
                        }
                    }
                }
            };

            if let Some(ws_stream) = connected {
                self.set_state(ChannelState::Open);
                self.emit(ChannelEvent::Connected);
                info!(channel = %self.name, "Channel open");

                let (mut ws_sender, mut ws_receiver) = ws_stream.split();

                loop {
                    tokio::select! {
                        _ = shutdown_rx.recv() => {
                            let _ = ws_sender.send(Message::Close(None)).await;
                            self.set_state(ChannelState::Closed);
                            self.emit(ChannelEvent::Disconnected);
                            return;
                        }

                        maybe_text = outbound_rx.recv() => {
                            match maybe_text {
                                Some(text) => {
                                    if let Err(e) = ws_sender.send(Message::Text(text.into())).await {
                                        warn!(channel = %self.name, error = %e, "Send failed, dropping connection");
                                        break;
                                    }
                                }
                                None => break,
                            }
                        }

                        incoming = ws_receiver.next() => {
                            match incoming {
                                Some(Ok(Message::Text(text))) => {
                                    self.emit(ChannelEvent::Frame(text.to_string()));
                                }
                                Some(Ok(Message::Ping(payload))) => {
                                    if ws_sender.send(Message::Pong(payload)).await.is_err() {
                                        break;
                                    }
                                }
                                Some(Ok(Message::Close(_))) => {
                                    info!(channel = %self.name, "Server closed the connection");
                                    break;
                                }
                                Some(Ok(_)) => {
                                    debug!(channel = %self.name, "Ignoring non-text frame");
                                }
                                Some(Err(e)) => {
                                    warn!(channel = %self.name, error = %e, "WebSocket error");
                                    break;
                                }
                                None => {
                                    info!(channel = %self.name, "Connection ended");
                                    break;
                                }
                            }
                        }
                    }
                }

                // The old socket is gone before any new one is created
                self.set_state(ChannelState::Closed);
                self.emit(ChannelEvent::Disconnected);
            } else {
                self.set_state(ChannelState::Closed);
                self.emit(ChannelEvent::Disconnected);
            }

            self.set_state(ChannelState::Reconnecting);
            debug!(
                channel = %self.name,
                delay_ms = self.options.reconnect_delay.as_millis() as u64,
                "Waiting before reconnect"
            );

            tokio::select! {
                _ = shutdown_rx.recv() => {
                    self.set_state(ChannelState::Closed);
                    return;
                }
                _ = sleep(self.options.reconnect_delay) => {}
            }
        }
    }
}
