/// A message received from the transport.
///
/// `sender_id` is transport-native and may carry a domain suffix
/// (`2348012345678@c.us`); `body` is the raw text as received.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct InboundMessage {
    pub sender_id: String,
    pub body: String,
}

impl InboundMessage {
    pub fn new(sender_id: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            sender_id: sender_id.into(),
            body: body.into(),
        }
    }

    /// Sender address with the transport suffix (everything from the first `@`) removed.
    pub fn phone_number(&self) -> &str {
        match self.sender_id.split_once('@') {
            Some((number, _)) => number,
            None => &self.sender_id,
        }
    }
}

/// A single text message to deliver to a single destination.
///
/// Construction does not validate; the dispatcher checks the destination and
/// body before any transport call.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OutboundRequest {
    pub destination: String,
    pub body: String,
}

impl OutboundRequest {
    pub fn new(destination: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            destination: destination.into(),
            body: body.into(),
        }
    }
}

/// Reduce a destination to its digits (`+234 801-234` -> `234801234`).
pub fn digits_only(destination: &str) -> String {
    destination.chars().filter(|c| c.is_ascii_digit()).collect()
}
