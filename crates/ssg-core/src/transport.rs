use async_trait::async_trait;
use tokio::sync::mpsc;

use crate::{
    domain::InboundMessage,
    readiness::{ReadinessState, ReadinessTracker},
    Result,
};

/// Lifecycle and message signals published by a transport.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TransportEvent {
    /// A new pairing code is available (observability only).
    Qr(String),
    Ready,
    Authenticated,
    AuthFailure(String),
    Disconnected(String),
    MessageReceived(InboundMessage),
}

impl TransportEvent {
    pub fn name(&self) -> &'static str {
        match self {
            TransportEvent::Qr(_) => "qr",
            TransportEvent::Ready => "ready",
            TransportEvent::Authenticated => "authenticated",
            TransportEvent::AuthFailure(_) => "auth_failure",
            TransportEvent::Disconnected(_) => "disconnected",
            TransportEvent::MessageReceived(_) => "message",
        }
    }
}

/// Port for a stateful messaging session.
///
/// Implementations own their readiness; the core only reads it before sending.
#[async_trait]
pub trait TransportClient: Send + Sync {
    /// Suffix appended to a digits-only number to form a transport address
    /// (`@c.us` for WhatsApp-style sessions, empty for Telegram chat ids).
    fn address_suffix(&self) -> &str;

    fn readiness(&self) -> ReadinessState;

    fn is_ready(&self) -> bool {
        self.readiness().is_ready()
    }

    async fn send_text(&self, address: &str, body: &str) -> Result<()>;
}

/// Where a transport adapter publishes its events.
///
/// Each event first drives the readiness state machine, then lands on the
/// gateway queue, so a `Ready` is visible to senders before it is handled.
#[derive(Clone, Debug)]
pub struct EventSink {
    tracker: ReadinessTracker,
    tx: mpsc::Sender<TransportEvent>,
}

impl EventSink {
    pub fn new(tracker: ReadinessTracker, tx: mpsc::Sender<TransportEvent>) -> Self {
        Self { tracker, tx }
    }

    /// Build a sink plus the receiving end for the gateway.
    pub fn channel(
        tracker: ReadinessTracker,
        capacity: usize,
    ) -> (Self, mpsc::Receiver<TransportEvent>) {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        (Self::new(tracker, tx), rx)
    }

    pub fn tracker(&self) -> &ReadinessTracker {
        &self.tracker
    }

    pub async fn emit(&self, event: TransportEvent) {
        let state = self.tracker.apply(&event);
        tracing::debug!(event = event.name(), %state, "transport event");
        if self.tx.send(event).await.is_err() {
            tracing::debug!("gateway queue closed; dropping transport event");
        }
    }
}
