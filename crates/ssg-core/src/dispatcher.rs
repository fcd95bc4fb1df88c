use std::{sync::Arc, time::Duration};

use tokio::time::sleep;

use crate::{
    domain::{digits_only, OutboundRequest},
    errors::DispatchError,
    transport::TransportClient,
    Result,
};

/// Fixed-delay retry budget for one dispatch.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts including the first one.
    pub max_attempts: u32,
    /// Pause after every failed attempt except the last.
    pub delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            delay: Duration::from_secs(1),
        }
    }
}

#[derive(Debug)]
pub enum DispatchOutcome {
    Sent,
    Failed(DispatchError),
}

impl DispatchOutcome {
    pub fn is_sent(&self) -> bool {
        matches!(self, DispatchOutcome::Sent)
    }

    pub fn into_result(self) -> std::result::Result<(), DispatchError> {
        match self {
            DispatchOutcome::Sent => Ok(()),
            DispatchOutcome::Failed(e) => Err(e),
        }
    }
}

/// Delivers one outbound text through the transport, tolerating transient failures.
///
/// Validation and the readiness gate run before the first transport call and
/// never consume the retry budget.
pub struct Dispatcher {
    transport: Arc<dyn TransportClient>,
    policy: RetryPolicy,
}

impl Dispatcher {
    pub fn new(transport: Arc<dyn TransportClient>) -> Self {
        Self::with_policy(transport, RetryPolicy::default())
    }

    pub fn with_policy(transport: Arc<dyn TransportClient>, policy: RetryPolicy) -> Self {
        Self { transport, policy }
    }

    pub async fn send(&self, destination: &str, body: &str) -> DispatchOutcome {
        self.dispatch(OutboundRequest::new(destination, body)).await
    }

    pub async fn dispatch(&self, request: OutboundRequest) -> DispatchOutcome {
        match self.try_dispatch(&request).await {
            Ok(number) => {
                tracing::info!(to = %number, body = %request.body, "message sent");
                DispatchOutcome::Sent
            }
            Err(e) => {
                tracing::error!(to = %request.destination, error = %e, "failed to send message");
                DispatchOutcome::Failed(e)
            }
        }
    }

    async fn try_dispatch(
        &self,
        request: &OutboundRequest,
    ) -> std::result::Result<String, DispatchError> {
        let number = validate(request)?;

        let state = self.transport.readiness();
        if !state.is_ready() {
            return Err(DispatchError::TransportNotReady(state));
        }

        let address = format!("{number}{}", self.transport.address_suffix());
        self.send_with_retry(&address, &request.body)
            .await
            .map_err(DispatchError::DeliveryFailed)?;
        Ok(number)
    }

    async fn send_with_retry(&self, address: &str, body: &str) -> Result<()> {
        let max_attempts = self.policy.max_attempts.max(1);
        let mut attempt = 1;
        loop {
            match self.transport.send_text(address, body).await {
                Ok(()) => return Ok(()),
                Err(e) if attempt < max_attempts => {
                    tracing::warn!(
                        attempt,
                        max_attempts,
                        error = %e,
                        "send attempt failed; retrying"
                    );
                    sleep(self.policy.delay).await;
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }
}

/// Check a request and return its digits-only destination.
pub fn validate(request: &OutboundRequest) -> std::result::Result<String, DispatchError> {
    let number = digits_only(&request.destination);
    if number.is_empty() {
        return Err(DispatchError::InvalidDestination(request.destination.clone()));
    }
    if request.body.trim().is_empty() {
        return Err(DispatchError::EmptyBody);
    }
    Ok(number)
}
