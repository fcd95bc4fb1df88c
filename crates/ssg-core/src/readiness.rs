use std::{fmt, sync::Arc};

use tokio::sync::watch;

use crate::transport::TransportEvent;

/// Session state of the transport, driven only by its lifecycle events.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum ReadinessState {
    #[default]
    Uninitialized,
    AwaitingPairing,
    Ready,
    Disconnected,
    AuthFailed,
}

impl ReadinessState {
    pub fn is_ready(self) -> bool {
        self == ReadinessState::Ready
    }

    /// Transition for one lifecycle event. `Authenticated` and inbound messages
    /// leave the state untouched.
    pub fn on_event(self, event: &TransportEvent) -> ReadinessState {
        match event {
            TransportEvent::Qr(_) => ReadinessState::AwaitingPairing,
            TransportEvent::Ready => ReadinessState::Ready,
            TransportEvent::AuthFailure(_) => ReadinessState::AuthFailed,
            TransportEvent::Disconnected(_) => ReadinessState::Disconnected,
            TransportEvent::Authenticated | TransportEvent::MessageReceived(_) => self,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ReadinessState::Uninitialized => "uninitialized",
            ReadinessState::AwaitingPairing => "awaiting pairing",
            ReadinessState::Ready => "ready",
            ReadinessState::Disconnected => "disconnected",
            ReadinessState::AuthFailed => "auth failed",
        }
    }
}

impl fmt::Display for ReadinessState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Shared holder of the current [`ReadinessState`].
///
/// Clones observe the same state. Only the transport side calls [`apply`];
/// everything else reads through [`state`].
///
/// [`apply`]: ReadinessTracker::apply
/// [`state`]: ReadinessTracker::state
#[derive(Clone, Debug)]
pub struct ReadinessTracker {
    tx: Arc<watch::Sender<ReadinessState>>,
}

impl Default for ReadinessTracker {
    fn default() -> Self {
        Self::new()
    }
}

impl ReadinessTracker {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(ReadinessState::Uninitialized);
        Self { tx: Arc::new(tx) }
    }

    pub fn state(&self) -> ReadinessState {
        *self.tx.borrow()
    }

    pub fn is_ready(&self) -> bool {
        self.state().is_ready()
    }

    /// Apply the transition for `event` and return the resulting state.
    pub fn apply(&self, event: &TransportEvent) -> ReadinessState {
        let mut next = ReadinessState::Uninitialized;
        self.tx.send_modify(|state| {
            *state = state.on_event(event);
            next = *state;
        });
        next
    }

    /// Suspend until the state becomes `Ready`.
    pub async fn wait_ready(&self) {
        let mut rx = self.tx.subscribe();
        // The sender lives as long as `self`, so this cannot observe a closed channel.
        let _ = rx.wait_for(|s| s.is_ready()).await;
    }
}
