use async_trait::async_trait;

use crate::Result;

/// Port for a text-completion backend (Gemini today).
///
/// An `Ok` with empty or whitespace-only text means the backend produced
/// nothing usable; callers decide how to handle it.
#[async_trait]
pub trait AiResponder: Send + Sync {
    async fn complete(&self, prompt: &str) -> Result<String>;
}
