//! Fakes for the transport and AI ports, shared by unit tests.

use std::{sync::Mutex, time::Duration};

use async_trait::async_trait;
use tokio::time::Instant;

use crate::{
    ai::AiResponder,
    errors::Error,
    readiness::{ReadinessState, ReadinessTracker},
    transport::{TransportClient, TransportEvent},
    Result,
};

#[derive(Clone, Debug)]
pub struct SentText {
    pub address: String,
    pub body: String,
    pub at: Instant,
}

/// Transport whose first `failures` sends fail.
pub struct FakeTransport {
    pub tracker: ReadinessTracker,
    failures: Mutex<usize>,
    pub calls: Mutex<Vec<SentText>>,
}

impl FakeTransport {
    pub fn ready() -> Self {
        let t = Self::not_ready();
        t.tracker.apply(&TransportEvent::Ready);
        t
    }

    pub fn not_ready() -> Self {
        Self {
            tracker: ReadinessTracker::new(),
            failures: Mutex::new(0),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn failing(self, failures: usize) -> Self {
        *self.failures.lock().unwrap() = failures;
        self
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    pub fn sent(&self) -> Vec<SentText> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl TransportClient for FakeTransport {
    fn address_suffix(&self) -> &str {
        "@c.us"
    }

    fn readiness(&self) -> ReadinessState {
        self.tracker.state()
    }

    async fn send_text(&self, address: &str, body: &str) -> Result<()> {
        let attempt = {
            let mut calls = self.calls.lock().unwrap();
            calls.push(SentText {
                address: address.to_string(),
                body: body.to_string(),
                at: Instant::now(),
            });
            calls.len()
        };

        let mut failures = self.failures.lock().unwrap();
        if *failures > 0 {
            *failures -= 1;
            return Err(Error::Transport(format!("send failed #{attempt}")));
        }
        Ok(())
    }
}

pub enum FakeReply {
    Text(String),
    Fail(String),
    Hang,
}

/// AI responder returning a canned reply and recording prompts.
pub struct FakeResponder {
    reply: FakeReply,
    pub prompts: Mutex<Vec<String>>,
}

impl FakeResponder {
    pub fn new(reply: FakeReply) -> Self {
        Self {
            reply,
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn text(s: &str) -> Self {
        Self::new(FakeReply::Text(s.to_string()))
    }

    pub fn failing(msg: &str) -> Self {
        Self::new(FakeReply::Fail(msg.to_string()))
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }
}

#[async_trait]
impl AiResponder for FakeResponder {
    async fn complete(&self, prompt: &str) -> Result<String> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        match &self.reply {
            FakeReply::Text(s) => Ok(s.clone()),
            FakeReply::Fail(msg) => Err(Error::Ai(msg.clone())),
            FakeReply::Hang => {
                tokio::time::sleep(Duration::from_secs(3600)).await;
                Ok("too late".to_string())
            }
        }
    }
}
