//! Telegram adapter (teloxide).
//!
//! This crate implements the `ssg-core` TransportClient over the Telegram Bot API.
//! Private-chat ids are positive integers, so they double as digits-only
//! destinations and the address suffix is empty.

use async_trait::async_trait;

use teloxide::prelude::*;

pub mod polling;

pub use teloxide::Bot;

use ssg_core::{
    errors::Error,
    readiness::{ReadinessState, ReadinessTracker},
    transport::TransportClient,
    Result,
};

#[derive(Clone)]
pub struct TelegramTransport {
    bot: Bot,
    tracker: ReadinessTracker,
}

impl TelegramTransport {
    pub fn new(bot: Bot, tracker: ReadinessTracker) -> Self {
        Self { bot, tracker }
    }

    fn map_err(e: teloxide::RequestError) -> Error {
        Error::Transport(format!("telegram error: {e}"))
    }
}

/// Parse a transport address into a Telegram chat id.
pub fn parse_chat_id(address: &str) -> Result<teloxide::types::ChatId> {
    address
        .trim()
        .parse::<i64>()
        .map(teloxide::types::ChatId)
        .map_err(|_| Error::Transport(format!("not a telegram chat id: {address:?}")))
}

#[async_trait]
impl TransportClient for TelegramTransport {
    fn address_suffix(&self) -> &str {
        ""
    }

    fn readiness(&self) -> ReadinessState {
        self.tracker.state()
    }

    async fn send_text(&self, address: &str, body: &str) -> Result<()> {
        let chat_id = parse_chat_id(address)?;
        self.bot
            .send_message(chat_id, body.to_string())
            .await
            .map_err(Self::map_err)?;
        Ok(())
    }
}
