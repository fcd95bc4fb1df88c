use tokio::sync::mpsc;

use crate::{
    dispatcher::{DispatchOutcome, Dispatcher},
    router::MessageRouter,
    transport::TransportEvent,
};

/// Single consumer of transport events.
///
/// Events are handled strictly in arrival order; an inbound message is routed
/// and its reply dispatched (retries included) before the next event is taken.
pub struct Gateway {
    router: MessageRouter,
    dispatcher: Dispatcher,
}

impl Gateway {
    pub fn new(router: MessageRouter, dispatcher: Dispatcher) -> Self {
        Self { router, dispatcher }
    }

    /// Drain `events` until every sender is gone.
    pub async fn run(&self, mut events: mpsc::Receiver<TransportEvent>) {
        while let Some(event) = events.recv().await {
            self.handle_event(event).await;
        }
        tracing::info!("transport event stream closed; gateway stopping");
    }

    /// Handle one event; returns the dispatch outcome when a reply was sent.
    pub async fn handle_event(&self, event: TransportEvent) -> Option<DispatchOutcome> {
        match event {
            TransportEvent::Qr(payload) => {
                tracing::info!(
                    len = payload.len(),
                    "pairing code available; scan it to link the session"
                );
                None
            }
            TransportEvent::Ready => {
                tracing::info!("transport client is ready");
                None
            }
            TransportEvent::Authenticated => {
                tracing::info!("transport authentication successful");
                None
            }
            TransportEvent::AuthFailure(msg) => {
                tracing::error!(reason = %msg, "transport authentication failed");
                None
            }
            TransportEvent::Disconnected(reason) => {
                tracing::warn!(%reason, "transport disconnected");
                None
            }
            TransportEvent::MessageReceived(msg) => {
                tracing::info!(from = %msg.phone_number(), body = %msg.body, "message received");
                let reply = self.router.route(&msg).await?;
                Some(self.dispatcher.dispatch(reply.request).await)
            }
        }
    }
}
