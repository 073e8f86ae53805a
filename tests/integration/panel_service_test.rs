//! Channel → event bus → handler flow through the panel service

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Mutex;
use tokio::time::sleep;

use tipclock::channel::Endpoint;
use tipclock::config::Config;
use tipclock::render::FrameHandler;
use tipclock::service::PanelService;

use crate::harness::{test_port, TimerServer};

#[derive(Default)]
struct RecordingHandler {
    frames: Arc<Mutex<Vec<String>>>,
    connects: Arc<Mutex<usize>>,
}

#[async_trait]
impl FrameHandler for RecordingHandler {
    async fn on_frame(&mut self, text: &str) {
        self.frames.lock().await.push(text.to_string());
    }

    async fn on_connected(&mut self) {
        *self.connects.lock().await += 1;
    }
}

fn fast_config() -> Config {
    let mut config = Config::default();
    config.channel.reconnect_delay_ms = 100;
    config.channel.connect_timeout_secs = 2;
    config
}

#[tokio::test]
async fn channel_traffic_reaches_the_registered_handler() {
    let port = test_port();
    let server = TimerServer::start(port, Some("00:10:00"), None).await;

    let service = PanelService::new(fast_config());

    let handler = RecordingHandler::default();
    let frames = Arc::clone(&handler.frames);
    let connects = Arc::clone(&handler.connects);
    service.register_handler("timer", Box::new(handler)).await;
    service.start().await;

    service
        .attach_channel("timer", Endpoint::new("127.0.0.1", port, "/ws"))
        .await;

    // Greeting plus one pushed frame flow through bus and handler
    sleep(Duration::from_millis(300)).await;
    server.push("00:09:59");
    sleep(Duration::from_millis(300)).await;

    assert_eq!(*connects.lock().await, 1);
    assert_eq!(
        frames.lock().await.as_slice(),
        ["00:10:00", "00:09:59"]
    );

    service.shutdown().await;
    server.stop().await;
}

#[tokio::test]
async fn reconnect_reaches_the_handler_as_a_second_connect() {
    let port = test_port();
    let server = TimerServer::start(port, Some("00:10:00"), None).await;

    let service = PanelService::new(fast_config());

    let handler = RecordingHandler::default();
    let connects = Arc::clone(&handler.connects);
    service.register_handler("timer", Box::new(handler)).await;
    service.start().await;

    let channel = service
        .attach_channel("timer", Endpoint::new("127.0.0.1", port, "/ws"))
        .await;

    sleep(Duration::from_millis(300)).await;
    assert_eq!(*connects.lock().await, 1);

    server.stop().await;
    let server = TimerServer::start(port, Some("00:09:00"), None).await;
    sleep(Duration::from_millis(800)).await;

    assert_eq!(*connects.lock().await, 2);
    assert_eq!(channel.state(), tipclock::channel::ChannelState::Open);

    service.shutdown().await;
    server.stop().await;
}
