//! Live-channel behavior against a real WebSocket server

use std::time::Duration;

use tokio::sync::broadcast;
use tokio::time::timeout;

use tipclock::channel::{ChannelEvent, ChannelOptions, ChannelState, Endpoint, LiveChannel};

use crate::harness::{test_port, TimerServer};

fn fast_options() -> ChannelOptions {
    ChannelOptions {
        reconnect_delay: Duration::from_millis(100),
        connect_timeout: Duration::from_secs(2),
    }
}

async fn next_event(
    rx: &mut broadcast::Receiver<ChannelEvent>,
    timeout_ms: u64,
) -> Option<ChannelEvent> {
    timeout(Duration::from_millis(timeout_ms), rx.recv())
        .await
        .ok()?
        .ok()
}

/// Wait until an event matching the predicate arrives, skipping others
async fn wait_for(
    rx: &mut broadcast::Receiver<ChannelEvent>,
    timeout_ms: u64,
    predicate: impl Fn(&ChannelEvent) -> bool,
) -> Option<ChannelEvent> {
    let deadline = tokio::time::Instant::now() + Duration::from_millis(timeout_ms);
    loop {
        let remaining = deadline
            .checked_duration_since(tokio::time::Instant::now())?
            .as_millis() as u64;
        let event = next_event(rx, remaining.max(1)).await?;
        if predicate(&event) {
            return Some(event);
        }
    }
}

#[tokio::test]
async fn frames_arrive_in_order_and_subscriptions_survive_reconnect() {
    let port = test_port();
    let server = TimerServer::start(port, Some("00:01:00"), None).await;

    let channel = LiveChannel::connect(
        "timer",
        Endpoint::new("127.0.0.1", port, "/ws"),
        fast_options(),
    )
    .await;
    let mut rx = channel.subscribe();

    assert_eq!(next_event(&mut rx, 2000).await, Some(ChannelEvent::Connected));
    assert_eq!(
        next_event(&mut rx, 2000).await,
        Some(ChannelEvent::Frame("00:01:00".to_string()))
    );

    server.push("00:00:59");
    assert_eq!(
        next_event(&mut rx, 2000).await,
        Some(ChannelEvent::Frame("00:00:59".to_string()))
    );

    // Kill the server: the channel reports the outage and starts retrying
    server.stop().await;
    assert!(
        wait_for(&mut rx, 2000, |e| *e == ChannelEvent::Disconnected)
            .await
            .is_some()
    );

    // Bring the server back on the same port; the original subscription
    // keeps delivering without any re-subscribe
    let server = TimerServer::start(port, Some("00:00:58"), None).await;
    assert!(
        wait_for(&mut rx, 3000, |e| *e == ChannelEvent::Connected)
            .await
            .is_some()
    );
    assert_eq!(
        next_event(&mut rx, 2000).await,
        Some(ChannelEvent::Frame("00:00:58".to_string()))
    );

    // Exactly one reconnect per outage: no spurious Connected afterwards
    assert!(
        wait_for(&mut rx, 500, |e| *e == ChannelEvent::Connected)
            .await
            .is_none()
    );

    channel.close().await;
    server.stop().await;
}

#[tokio::test]
async fn close_cancels_reconnection_for_good() {
    let port = test_port();
    let server = TimerServer::start(port, Some("00:01:00"), None).await;

    let channel = LiveChannel::connect(
        "timer",
        Endpoint::new("127.0.0.1", port, "/ws"),
        fast_options(),
    )
    .await;
    let mut rx = channel.subscribe();

    assert_eq!(next_event(&mut rx, 2000).await, Some(ChannelEvent::Connected));

    channel.close().await;
    assert_eq!(channel.state(), ChannelState::Closed);

    // Several reconnect periods pass without a Connecting transition
    assert!(
        wait_for(&mut rx, 500, |e| *e == ChannelEvent::Connected)
            .await
            .is_none()
    );
    assert_eq!(channel.state(), ChannelState::Closed);
    assert!(!channel.send("start"));

    server.stop().await;
}

#[tokio::test]
async fn send_succeeds_only_while_open() {
    let port = test_port();
    let server = TimerServer::start(port, None, Some(|cmd: &str| format!("echo {}", cmd))).await;

    let channel = LiveChannel::connect(
        "control",
        Endpoint::new("127.0.0.1", port, "/control"),
        fast_options(),
    )
    .await;
    let mut rx = channel.subscribe();

    assert_eq!(next_event(&mut rx, 2000).await, Some(ChannelEvent::Connected));
    assert_eq!(channel.state(), ChannelState::Open);

    assert!(channel.send("start"));
    assert_eq!(
        next_event(&mut rx, 2000).await,
        Some(ChannelEvent::Frame("echo start".to_string()))
    );

    server.stop().await;
    assert!(
        wait_for(&mut rx, 2000, |e| *e == ChannelEvent::Disconnected)
            .await
            .is_some()
    );
    assert!(!channel.send("stop"));

    channel.close().await;
}
