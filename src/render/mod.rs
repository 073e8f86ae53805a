//! Render reconciliation and the console views built on it

mod reconcile;
pub mod views;

pub use reconcile::{clock_seconds, Reconciled, RenderReconciler};

use async_trait::async_trait;

/// Consumer of one channel's traffic.
///
/// The panel service routes each channel's frames and connection events to
/// the handler registered for that channel's name.
#[async_trait]
pub trait FrameHandler: Send + Sync {
    /// One inbound text frame, in arrival order
    async fn on_frame(&mut self, text: &str);

    /// The channel completed a handshake
    async fn on_connected(&mut self) {}

    /// The channel lost its transport and will retry
    async fn on_disconnected(&mut self) {}
}
