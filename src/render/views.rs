//! Console views for the three live channels.
//!
//! Each view replaces one of the original browser pages: the countdown
//! display, the timer appearance feed and the control status log.

use async_trait::async_trait;
use tracing::{info, warn};

use crate::control::status::{classify, StatusKind};

use super::{FrameHandler, RenderReconciler};

/// Renders the remaining time, highlighting donation top-ups
#[derive(Debug, Default)]
pub struct TimerView {
    reconciler: RenderReconciler,
}

impl TimerView {
    pub fn new() -> Self {
        Self::default()
    }

    /// The last rendered time value
    pub fn current(&self) -> Option<&str> {
        self.reconciler.last()
    }
}

#[async_trait]
impl FrameHandler for TimerView {
    async fn on_frame(&mut self, text: &str) {
        let decision = self.reconciler.reconcile(text);
        if decision.should_pulse {
            println!("⏱  {}  (+)", text);
            info!(time = %text, "Timer topped up");
        } else {
            println!("⏱  {}", text);
        }
    }

    async fn on_disconnected(&mut self) {
        println!("⏱  connection lost, retrying...");
    }
}

/// Tracks the timer text color pushed over the appearance feed
#[derive(Debug, Default)]
pub struct ColorView {
    current: Option<String>,
}

impl ColorView {
    pub fn new() -> Self {
        Self::default()
    }

    /// The most recently pushed color
    pub fn current(&self) -> Option<&str> {
        self.current.as_deref()
    }
}

#[async_trait]
impl FrameHandler for ColorView {
    async fn on_frame(&mut self, text: &str) {
        // The feed carries "black"/"white" keywords, but raw CSS color
        // strings pass through untouched
        println!("🎨 timer color: {}", text);
        self.current = Some(text.to_string());
    }
}

/// Logs control status lines with their classified severity
#[derive(Debug, Default)]
pub struct ControlView {
    last: Option<(StatusKind, String)>,
}

impl ControlView {
    pub fn new() -> Self {
        Self::default()
    }

    /// The most recent status line and its classification
    pub fn last_status(&self) -> Option<(StatusKind, &str)> {
        self.last.as_ref().map(|(kind, text)| (*kind, text.as_str()))
    }
}

#[async_trait]
impl FrameHandler for ControlView {
    async fn on_frame(&mut self, text: &str) {
        let kind = classify(text);
        match kind {
            StatusKind::Success => {
                println!("✔ {}", text);
                info!(status = %text, "Control status");
            }
            StatusKind::Error => {
                println!("✘ {}", text);
                warn!(status = %text, "Control error status");
            }
            StatusKind::Info => {
                println!("· {}", text);
            }
        }
        self.last = Some((kind, text.to_string()));
    }

    async fn on_connected(&mut self) {
        info!("Control channel connected");
    }

    async fn on_disconnected(&mut self) {
        println!("✘ control connection lost, retrying...");
    }
}
