use std::{sync::Arc, time::Duration};

use regex::{Regex, RegexBuilder};

use crate::{
    ai::AiResponder,
    domain::{InboundMessage, OutboundRequest},
    errors::Error,
    Result,
};

pub const DEFAULT_AI_MARKER: &str = "#ai";
pub const DEFAULT_BRAND_NAME: &str = "SnapSend.ng";
pub const DEFAULT_FALLBACK_REPLY: &str = "Sorry, I couldn't process your request at the moment.";

#[derive(Clone, Debug)]
pub struct RouterConfig {
    /// Token that turns a message into an AI prompt (matched case-insensitively).
    pub ai_marker: String,
    pub brand_name: String,
    pub fallback_reply: String,
    /// Upper bound on one AI completion; `None` waits indefinitely.
    pub ai_timeout: Option<Duration>,
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self {
            ai_marker: DEFAULT_AI_MARKER.to_string(),
            brand_name: DEFAULT_BRAND_NAME.to_string(),
            fallback_reply: DEFAULT_FALLBACK_REPLY.to_string(),
            ai_timeout: Some(Duration::from_secs(60)),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ReplyKind {
    /// Text produced by the AI responder.
    Ai,
    /// AI path was triggered but produced nothing usable.
    AiFallback,
    Greeting,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RoutedReply {
    pub request: OutboundRequest,
    pub kind: ReplyKind,
}

impl RoutedReply {
    pub fn is_ai(&self) -> bool {
        matches!(self.kind, ReplyKind::Ai | ReplyKind::AiFallback)
    }
}

/// Decides whether an inbound message gets a reply, and what it says.
///
/// Rules, first match wins:
/// 1. body contains the AI marker: strip it, ask the responder, reply with its text
///    (or the fallback text when the responder fails, times out, or returns nothing);
/// 2. trimmed body is `hi` in any case: reply with a greeting;
/// 3. otherwise no reply.
pub struct MessageRouter {
    ai: Arc<dyn AiResponder>,
    cfg: RouterConfig,
    marker: Regex,
}

impl MessageRouter {
    pub fn new(ai: Arc<dyn AiResponder>, cfg: RouterConfig) -> Result<Self> {
        if cfg.ai_marker.trim().is_empty() {
            return Err(Error::Config("AI marker must not be empty".to_string()));
        }
        let marker = RegexBuilder::new(&regex::escape(&cfg.ai_marker))
            .case_insensitive(true)
            .build()
            .map_err(|e| Error::Config(format!("invalid AI marker: {e}")))?;
        Ok(Self { ai, cfg, marker })
    }

    pub async fn route(&self, message: &InboundMessage) -> Option<RoutedReply> {
        let number = message.phone_number();

        if let Some(prompt) = self.extract_prompt(&message.body) {
            tracing::info!(from = %number, "AI request");
            let (body, kind) = match self.complete(&prompt).await {
                Ok(text) => {
                    tracing::info!(from = %number, "AI response generated");
                    (text, ReplyKind::Ai)
                }
                Err(e) => {
                    tracing::warn!(
                        from = %number,
                        error = %e,
                        "AI request failed; sending fallback reply"
                    );
                    (self.cfg.fallback_reply.clone(), ReplyKind::AiFallback)
                }
            };
            return Some(RoutedReply {
                request: OutboundRequest::new(number, body),
                kind,
            });
        }

        if is_greeting(&message.body) {
            let body = format!("Hello! Welcome to {}, {number}", self.cfg.brand_name);
            return Some(RoutedReply {
                request: OutboundRequest::new(number, body),
                kind: ReplyKind::Greeting,
            });
        }

        None
    }

    /// The prompt inside an AI-triggering body, or `None` when the marker is absent.
    pub fn extract_prompt(&self, body: &str) -> Option<String> {
        if !self.marker.is_match(body) {
            return None;
        }
        Some(self.marker.replace_all(body, "").trim().to_string())
    }

    async fn complete(&self, prompt: &str) -> Result<String> {
        let text = match self.cfg.ai_timeout {
            Some(limit) => tokio::time::timeout(limit, self.ai.complete(prompt))
                .await
                .map_err(|_| Error::Ai(format!("timed out after {}s", limit.as_secs_f64())))??,
            None => self.ai.complete(prompt).await?,
        };
        if text.trim().is_empty() {
            return Err(Error::Ai("no response generated".to_string()));
        }
        Ok(text)
    }
}

fn is_greeting(body: &str) -> bool {
    body.trim().eq_ignore_ascii_case("hi")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{FakeReply, FakeResponder};

    fn router(ai: &Arc<FakeResponder>) -> MessageRouter {
        MessageRouter::new(ai.clone(), RouterConfig::default()).unwrap()
    }

    fn msg(body: &str) -> InboundMessage {
        InboundMessage::new("2348012345678@c.us", body)
    }

    #[tokio::test]
    async fn marker_is_stripped_case_insensitively() {
        let ai = Arc::new(FakeResponder::text("4"));
        let r = router(&ai);

        let reply = r.route(&msg("#AI what is 2+2")).await.unwrap();
        assert_eq!(ai.prompts(), vec!["what is 2+2".to_string()]);
        assert_eq!(reply.kind, ReplyKind::Ai);
        assert!(reply.is_ai());
        assert_eq!(reply.request, OutboundRequest::new("2348012345678", "4"));
    }

    #[tokio::test]
    async fn every_marker_occurrence_is_removed() {
        let ai = Arc::new(FakeResponder::text("ok"));
        let r = router(&ai);

        r.route(&msg("  #ai tell me #Ai a joke #aI ")).await.unwrap();
        assert_eq!(ai.prompts(), vec!["tell me  a joke".to_string()]);
    }

    #[tokio::test]
    async fn bare_marker_with_failing_ai_gets_fallback() {
        let ai = Arc::new(FakeResponder::failing("quota exceeded"));
        let r = router(&ai);

        let reply = r.route(&msg("#ai")).await.unwrap();
        assert_eq!(ai.prompts(), vec![String::new()]);
        assert_eq!(reply.kind, ReplyKind::AiFallback);
        assert_eq!(
            reply.request.body,
            "Sorry, I couldn't process your request at the moment."
        );
    }

    #[tokio::test]
    async fn empty_ai_text_gets_fallback() {
        let ai = Arc::new(FakeResponder::text("  "));
        let r = router(&ai);

        let reply = r.route(&msg("#ai hello?")).await.unwrap();
        assert_eq!(reply.kind, ReplyKind::AiFallback);
        assert_eq!(reply.request.body, DEFAULT_FALLBACK_REPLY);
    }

    #[tokio::test(start_paused = true)]
    async fn ai_timeout_gets_fallback() {
        let ai = Arc::new(FakeResponder::new(FakeReply::Hang));
        let cfg = RouterConfig {
            ai_timeout: Some(Duration::from_secs(5)),
            ..RouterConfig::default()
        };
        let r = MessageRouter::new(ai.clone(), cfg).unwrap();

        let reply = r.route(&msg("#ai are you there")).await.unwrap();
        assert_eq!(reply.kind, ReplyKind::AiFallback);
        assert_eq!(reply.request.body, DEFAULT_FALLBACK_REPLY);
    }

    #[tokio::test]
    async fn hi_in_any_case_gets_greeting_without_ai() {
        let ai = Arc::new(FakeResponder::text("unused"));
        let r = router(&ai);

        for body in ["Hi", "hi", "HI", "  hI \n"] {
            let reply = r.route(&msg(body)).await.unwrap();
            assert_eq!(reply.kind, ReplyKind::Greeting);
            assert!(!reply.is_ai());
            assert_eq!(
                reply.request.body,
                "Hello! Welcome to SnapSend.ng, 2348012345678"
            );
            assert_eq!(reply.request.destination, "2348012345678");
        }
        assert!(ai.prompts().is_empty());
    }

    #[tokio::test]
    async fn marker_rule_takes_priority_over_greeting() {
        let ai = Arc::new(FakeResponder::text("hello from ai"));
        let r = router(&ai);

        let reply = r.route(&msg("#ai hi")).await.unwrap();
        assert_eq!(reply.kind, ReplyKind::Ai);
        assert_eq!(ai.prompts(), vec!["hi".to_string()]);
    }

    #[tokio::test]
    async fn other_messages_are_ignored() {
        let ai = Arc::new(FakeResponder::text("unused"));
        let r = router(&ai);

        for body in ["hello", "hi there", "", "# ai"] {
            assert!(r.route(&msg(body)).await.is_none(), "{body:?}");
        }
        assert!(ai.prompts().is_empty());
    }

    #[test]
    fn custom_marker_is_matched_literally() {
        let ai: Arc<dyn AiResponder> = Arc::new(FakeResponder::text("x"));
        let cfg = RouterConfig {
            ai_marker: "!bot?".to_string(),
            ..RouterConfig::default()
        };
        let r = MessageRouter::new(ai, cfg).unwrap();

        assert_eq!(r.extract_prompt("!BOT? weather"), Some("weather".to_string()));
        assert_eq!(r.extract_prompt("!bo weather"), None);
    }

    #[test]
    fn empty_marker_is_rejected() {
        let ai: Arc<dyn AiResponder> = Arc::new(FakeResponder::text("x"));
        let cfg = RouterConfig {
            ai_marker: " ".to_string(),
            ..RouterConfig::default()
        };
        assert!(MessageRouter::new(ai, cfg).is_err());
    }
}
