use std::{sync::Arc, time::Instant};

use ssg_core::{
    config::Config,
    dispatcher::Dispatcher,
    gateway::Gateway,
    readiness::ReadinessTracker,
    router::MessageRouter,
    transport::{EventSink, TransportClient},
};
use ssg_gemini::GeminiClient;
use ssg_telegram::{polling::run_polling, Bot, TelegramTransport};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    ssg_core::logging::init("ssg")?;
    let started = Instant::now();

    let cfg = Config::load()?;

    let tracker = ReadinessTracker::new();
    let bot = Bot::new(cfg.telegram_bot_token.clone());
    let transport: Arc<dyn TransportClient> =
        Arc::new(TelegramTransport::new(bot.clone(), tracker.clone()));

    let ai = Arc::new(GeminiClient::from_config(&cfg)?);
    tracing::info!(model = %ai.model(), "AI responder configured");

    let router = MessageRouter::new(ai, cfg.router_config())?;
    let dispatcher = Dispatcher::with_policy(transport, cfg.retry_policy());
    let gateway = Gateway::new(router, dispatcher);

    let (sink, events) = EventSink::channel(tracker.clone(), cfg.event_queue_capacity);
    let gateway_task = tokio::spawn(async move { gateway.run(events).await });

    tokio::spawn(async move {
        tracker.wait_ready().await;
        tracing::info!(
            elapsed = %format!("{:.2}s", started.elapsed().as_secs_f64()),
            "gateway ready"
        );
    });

    let polled = run_polling(bot, sink).await;
    gateway_task.await?;
    polled
}
