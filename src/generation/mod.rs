//! Text generation capability
//!
//! Both the model-classification strategy and every specialist phrase their
//! output through a [`TextGenerator`]. Calls are fallible and always bounded
//! by [`generate_with_timeout`].

use crate::error::OrchestrationError;
use crate::Result;
use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

pub mod gemini;
pub use gemini::GeminiClient;

/// Text produced by a generator, with the generator's own confidence if it reports one
#[derive(Debug, Clone, PartialEq)]
pub struct Generation {
    pub text: String,
    pub confidence: Option<f32>,
}

impl Generation {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            confidence: None,
        }
    }
}

/// Trait for LLM-backed text generation
#[async_trait]
pub trait TextGenerator: Send + Sync {
    fn name(&self) -> &'static str;

    async fn generate(&self, system_instruction: &str, prompt: &str) -> Result<Generation>;
}

/// Run a generation call, converting an elapsed deadline into `LlmTimeout`
pub async fn generate_with_timeout(
    generator: &dyn TextGenerator,
    system_instruction: &str,
    prompt: &str,
    timeout: Duration,
) -> Result<Generation> {
    match tokio::time::timeout(timeout, generator.generate(system_instruction, prompt)).await {
        Ok(result) => result,
        Err(_) => Err(OrchestrationError::LlmTimeout(timeout.as_millis() as u64)),
    }
}

/// Always returns the same text. Counts calls so tests can assert on them.
pub struct StaticGenerator {
    reply: String,
    calls: AtomicUsize,
}

impl StaticGenerator {
    pub fn new(reply: impl Into<String>) -> Self {
        Self {
            reply: reply.into(),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::Relaxed)
    }
}

#[async_trait]
impl TextGenerator for StaticGenerator {
    fn name(&self) -> &'static str {
        "static"
    }

    async fn generate(&self, _system_instruction: &str, _prompt: &str) -> Result<Generation> {
        self.calls.fetch_add(1, Ordering::Relaxed);
        Ok(Generation::text(self.reply.clone()))
    }
}

/// Always errors
pub struct FailingGenerator;

#[async_trait]
impl TextGenerator for FailingGenerator {
    fn name(&self) -> &'static str {
        "failing"
    }

    async fn generate(&self, _system_instruction: &str, _prompt: &str) -> Result<Generation> {
        Err(OrchestrationError::LlmError(
            "generator unavailable".to_string(),
        ))
    }
}

/// Never completes; only a timeout gets the caller out
pub struct StallingGenerator;

#[async_trait]
impl TextGenerator for StallingGenerator {
    fn name(&self) -> &'static str {
        "stalling"
    }

    async fn generate(&self, _system_instruction: &str, _prompt: &str) -> Result<Generation> {
        std::future::pending::<Result<Generation>>().await
    }
}

/// Offline stand-in used when no API key is configured.
///
/// Replies with the data section of the prompt so answers still carry the
/// gathered facts. For routing prompts it has nothing useful to say and
/// returns an empty string, which the router treats as unrecognized.
pub struct OfflineGenerator;

pub const DATA_SECTION_MARKER: &str = "Available Data:";

#[async_trait]
impl TextGenerator for OfflineGenerator {
    fn name(&self) -> &'static str {
        "offline"
    }

    async fn generate(&self, _system_instruction: &str, prompt: &str) -> Result<Generation> {
        let text = match prompt.split_once(DATA_SECTION_MARKER) {
            Some((_, data)) => format!(
                "(offline mode, no language model configured)\n\n{}",
                data.trim()
            ),
            None => String::new(),
        };
        Ok(Generation::text(text))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_timeout_converts_to_llm_timeout() {
        let result = generate_with_timeout(
            &StallingGenerator,
            "system",
            "prompt",
            Duration::from_millis(20),
        )
        .await;

        assert!(matches!(result, Err(OrchestrationError::LlmTimeout(20))));
    }

    #[tokio::test]
    async fn test_static_generator_counts_calls() {
        let generator = StaticGenerator::new("hello");
        let out = generate_with_timeout(&generator, "s", "p", Duration::from_secs(1))
            .await
            .unwrap();

        assert_eq!(out.text, "hello");
        assert_eq!(generator.calls(), 1);
    }

    #[tokio::test]
    async fn test_offline_generator_echoes_data_section() {
        let prompt = format!("User Query: hi\n\n{}\n{{\"total\": 3}}", DATA_SECTION_MARKER);
        let out = OfflineGenerator.generate("s", &prompt).await.unwrap();
        assert!(out.text.contains("\"total\": 3"));

        let routing = OfflineGenerator.generate("s", "Label:").await.unwrap();
        assert!(routing.text.is_empty());
    }
}
