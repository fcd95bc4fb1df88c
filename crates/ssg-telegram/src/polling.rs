use std::sync::Arc;

use teloxide::{dispatching::Dispatcher, dptree, prelude::*, RequestError};

use ssg_core::{
    domain::InboundMessage,
    transport::{EventSink, TransportEvent},
};

/// How the startup `get_me` call went.
///
/// `get_me` stands in for session authentication: an API rejection is an auth
/// failure, anything else (network, decoding) a disconnect.
#[derive(Clone, Debug, PartialEq, Eq)]
enum Startup {
    Authenticated,
    Rejected(String),
    Unreachable(String),
}

impl Startup {
    fn from_get_me<T>(result: &Result<T, RequestError>) -> Self {
        match result {
            Ok(_) => Startup::Authenticated,
            Err(RequestError::Api(e)) => Startup::Rejected(e.to_string()),
            Err(e) => Startup::Unreachable(e.to_string()),
        }
    }

    fn events(&self) -> Vec<TransportEvent> {
        match self {
            Startup::Authenticated => vec![TransportEvent::Authenticated, TransportEvent::Ready],
            Startup::Rejected(reason) => vec![TransportEvent::AuthFailure(reason.clone())],
            Startup::Unreachable(reason) => vec![TransportEvent::Disconnected(reason.clone())],
        }
    }
}

/// Connect to Telegram and publish lifecycle + message events until polling stops.
///
/// A failed startup publishes its event and then returns the error.
pub async fn run_polling(bot: Bot, sink: EventSink) -> anyhow::Result<()> {
    let me = bot.get_me().await;
    let startup = Startup::from_get_me(&me);
    for event in startup.events() {
        sink.emit(event).await;
    }

    match startup {
        Startup::Authenticated => {
            if let Ok(me) = &me {
                tracing::info!(username = %me.username(), "telegram bot authenticated");
            }
        }
        Startup::Rejected(reason) => {
            return Err(anyhow::anyhow!("telegram rejected the bot token: {reason}"));
        }
        Startup::Unreachable(reason) => {
            return Err(anyhow::anyhow!("telegram is unreachable: {reason}"));
        }
    }

    let sink = Arc::new(sink);
    let handler = dptree::entry().branch(Update::filter_message().endpoint(handle_message));

    Dispatcher::builder(bot, handler)
        .dependencies(dptree::deps![sink.clone()])
        .build()
        .dispatch()
        .await;

    sink.emit(TransportEvent::Disconnected("polling stopped".to_string())).await;
    Ok(())
}

async fn handle_message(msg: Message, sink: Arc<EventSink>) -> ResponseResult<()> {
    if let Some(inbound) = to_inbound(msg.chat.is_private(), msg.chat.id.0, msg.text()) {
        sink.emit(TransportEvent::MessageReceived(inbound)).await;
    }
    Ok(())
}

/// Only private text chats are forwarded: group chat ids are negative and
/// would not survive digits-only normalization.
fn to_inbound(is_private: bool, chat_id: i64, text: Option<&str>) -> Option<InboundMessage> {
    if !is_private {
        return None;
    }
    Some(InboundMessage::new(chat_id.to_string(), text?))
}
