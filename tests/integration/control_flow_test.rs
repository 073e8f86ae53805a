//! End-to-end command flow: dispatcher → channel → server → status line

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::broadcast;
use tokio::time::timeout;

use tipclock::channel::{ChannelEvent, ChannelOptions, ChannelState, Endpoint, LiveChannel};
use tipclock::control::{classify, CommandDispatcher, Dispatch, StatusKind, ValidationError, Verb};

use crate::harness::{control_reply, test_port, TimerServer};

async fn open_control_channel(port: u16) -> Arc<LiveChannel> {
    let channel = LiveChannel::connect(
        "control",
        Endpoint::new("127.0.0.1", port, "/control"),
        ChannelOptions {
            reconnect_delay: Duration::from_millis(100),
            connect_timeout: Duration::from_secs(2),
        },
    )
    .await;

    // Wait for the handshake before submitting anything
    let mut rx = channel.subscribe();
    loop {
        match timeout(Duration::from_secs(2), rx.recv()).await {
            Ok(Ok(ChannelEvent::Connected)) => break,
            Ok(Ok(_)) => continue,
            _ => panic!("control channel did not open"),
        }
    }
    assert_eq!(channel.state(), ChannelState::Open);
    channel
}

async fn next_frame(rx: &mut broadcast::Receiver<ChannelEvent>, timeout_ms: u64) -> Option<String> {
    let deadline = tokio::time::Instant::now() + Duration::from_millis(timeout_ms);
    loop {
        let remaining = deadline.checked_duration_since(tokio::time::Instant::now())?;
        match timeout(remaining, rx.recv()).await {
            Ok(Ok(ChannelEvent::Frame(text))) => return Some(text),
            Ok(Ok(_)) => continue,
            _ => return None,
        }
    }
}

#[tokio::test]
async fn accepted_commands_come_back_as_success_lines() {
    let port = test_port();
    let server = TimerServer::start(port, Some("Connected to control panel"), Some(control_reply)).await;

    let channel = open_control_channel(port).await;
    let mut rx = channel.subscribe();
    // Drain the greeting
    assert_eq!(
        next_frame(&mut rx, 2000).await.as_deref(),
        Some("Connected to control panel")
    );

    let dispatcher = CommandDispatcher::new(Arc::clone(&channel));

    let outcome = dispatcher.submit(Verb::Set, "00:05:00").await.unwrap();
    assert!(matches!(outcome, Dispatch::Sent(_)));
    let reply = next_frame(&mut rx, 2000).await.unwrap();
    assert_eq!(reply, "Установлено время: 00:05:00");
    assert_eq!(classify(&reply), StatusKind::Success);

    // The decimal comma is normalized before it reaches the wire
    let outcome = dispatcher.submit(Verb::Coef, "4,5").await.unwrap();
    assert!(matches!(outcome, Dispatch::Sent(_)));
    let reply = next_frame(&mut rx, 2000).await.unwrap();
    assert_eq!(reply, "Соотношение изменено: 1₽ = 4.5 секунд");
    assert_eq!(classify(&reply), StatusKind::Success);

    channel.close().await;
    server.stop().await;
}

#[tokio::test]
async fn rejected_commands_never_reach_the_server() {
    let port = test_port();
    let server = TimerServer::start(port, None, Some(control_reply)).await;

    let channel = open_control_channel(port).await;
    let mut rx = channel.subscribe();
    let dispatcher = CommandDispatcher::new(Arc::clone(&channel));

    let result = dispatcher.submit(Verb::Set, "5:00").await;
    assert_eq!(result, Err(ValidationError::InvalidFormat));
    assert_eq!(next_frame(&mut rx, 300).await, None);

    let result = dispatcher.submit(Verb::Color, "teal").await;
    assert_eq!(result, Err(ValidationError::UnknownOption));
    assert_eq!(next_frame(&mut rx, 300).await, None);

    channel.close().await;
    server.stop().await;
}

#[tokio::test]
async fn declined_confirmation_sends_nothing() {
    let port = test_port();
    let server = TimerServer::start(port, None, Some(control_reply)).await;

    let channel = open_control_channel(port).await;
    let mut rx = channel.subscribe();
    let dispatcher = CommandDispatcher::with_confirmation(
        Arc::clone(&channel),
        Arc::new(|_| Box::pin(async { false })),
    );

    let outcome = dispatcher.submit(Verb::Reset, "").await.unwrap();
    assert_eq!(outcome, Dispatch::Discarded);
    assert_eq!(next_frame(&mut rx, 300).await, None);

    channel.close().await;
    server.stop().await;
}

#[tokio::test]
async fn unknown_wire_commands_classify_as_errors() {
    let port = test_port();
    let server = TimerServer::start(port, None, Some(control_reply)).await;

    let channel = open_control_channel(port).await;
    let mut rx = channel.subscribe();

    assert!(channel.send("ping"));
    let reply = next_frame(&mut rx, 2000).await.unwrap();
    assert_eq!(reply, "Неизвестная команда: ping");
    assert_eq!(classify(&reply), StatusKind::Error);

    channel.close().await;
    server.stop().await;
}
