//! LLM abstraction layer

mod ollama;

pub use ollama::OllamaClient;

use anyhow::Result;
use async_trait::async_trait;

use crate::error::StartupError;

/// Canned prompt used to confirm the endpoint answers at all
const PROBE_PROMPT: &str = "Reply with only OK";

/// Trait for LLM backends
#[async_trait]
pub trait Llm: Send + Sync {
    /// Send one prompt and return the raw completion text
    async fn generate(&self, prompt: &str) -> Result<String>;

    /// Get the model name
    fn model(&self) -> &str;
}

/// Startup probe: the endpoint must answer the canned prompt with any text
pub async fn probe(llm: &dyn Llm, url: &str) -> Result<(), StartupError> {
    let reply = llm
        .generate(PROBE_PROMPT)
        .await
        .map_err(|e| StartupError::Model {
            url: url.to_string(),
            reason: format!("{:#}", e),
        })?;

    if reply.trim().is_empty() {
        return Err(StartupError::EmptyReply {
            url: url.to_string(),
        });
    }

    tracing::debug!(model = llm.model(), "model probe answered");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    struct CannedLlm(&'static str);

    #[async_trait]
    impl Llm for CannedLlm {
        async fn generate(&self, _prompt: &str) -> Result<String> {
            Ok(self.0.to_string())
        }

        fn model(&self) -> &str {
            "canned"
        }
    }

    struct DownLlm;

    #[async_trait]
    impl Llm for DownLlm {
        async fn generate(&self, _prompt: &str) -> Result<String> {
            Err(anyhow::anyhow!("connection refused"))
        }

        fn model(&self) -> &str {
            "down"
        }
    }

    #[tokio::test]
    async fn probe_accepts_any_nonempty_reply() {
        assert!(probe(&CannedLlm("OK"), "http://localhost:11434")
            .await
            .is_ok());
    }

    #[tokio::test]
    async fn probe_rejects_an_empty_reply() {
        let err = probe(&CannedLlm("   "), "http://localhost:11434")
            .await
            .unwrap_err();
        assert!(matches!(err, StartupError::EmptyReply { .. }));
    }

    #[tokio::test]
    async fn probe_reports_an_unreachable_endpoint() {
        let err = probe(&DownLlm, "http://localhost:11434").await.unwrap_err();
        match err {
            StartupError::Model { reason, .. } => assert!(reason.contains("connection refused")),
            other => panic!("expected a model error, got {:?}", other),
        }
    }
}
