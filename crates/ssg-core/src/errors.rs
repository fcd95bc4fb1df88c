use crate::readiness::ReadinessState;

/// Core error type for the gateway.
///
/// Adapter crates should map their specific errors into this type so the core
/// can treat every transport or AI failure the same way.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("config error: {0}")]
    Config(String),

    #[error("transport error: {0}")]
    Transport(String),

    #[error("ai completion failed: {0}")]
    Ai(String),
}

pub type Result<T> = std::result::Result<T, Error>;

/// Why a single dispatch did not deliver its message.
///
/// Validation and readiness failures happen before any transport call and are
/// never retried. `DeliveryFailed` carries the error of the last attempt.
#[derive(Debug, thiserror::Error)]
pub enum DispatchError {
    #[error("invalid destination: {0:?}")]
    InvalidDestination(String),

    #[error("message body is empty")]
    EmptyBody,

    #[error("transport is not ready ({0})")]
    TransportNotReady(ReadinessState),

    #[error("delivery failed: {0}")]
    DeliveryFailed(#[source] Error),
}
