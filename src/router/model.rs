//! Model-classification routing
//!
//! Asks a text generator for a single label token. Any error, timeout, or
//! unrecognized output leaves the query undecided.

use super::RoutingStrategy;
use crate::generation::{generate_with_timeout, TextGenerator};
use crate::models::{Classification, FallbackReason, Label, Query};
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

const SYSTEM_INSTRUCTION: &str = "You are the routing component of a retail banking assistant. \
You never answer the customer. You only choose which specialist should handle the message.";

pub struct ModelStrategy {
    generator: Arc<dyn TextGenerator>,
    timeout: Duration,
}

impl ModelStrategy {
    pub fn new(generator: Arc<dyn TextGenerator>, timeout: Duration) -> Self {
        Self { generator, timeout }
    }

    /// Build the classification prompt
    pub fn build_prompt(query: &Query) -> String {
        let labels = Label::ALL
            .iter()
            .map(|label| format!("- {}: {}", label.as_str(), label.description()))
            .collect::<Vec<_>>()
            .join("\n");

        let tokens = Label::ALL
            .iter()
            .map(Label::as_str)
            .collect::<Vec<_>>()
            .join(", ");

        format!(
            r#"Classify the customer message into exactly one specialist.

SPECIALISTS:
{}

CUSTOMER MESSAGE:
{}

Rules:
- Reply with exactly one of: {}
- If several fit, choose the single most relevant one
- No explanation, no punctuation, no other text

Label:"#,
            labels,
            query.text().trim(),
            tokens,
        )
    }
}

#[async_trait]
impl RoutingStrategy for ModelStrategy {
    fn name(&self) -> &'static str {
        "model"
    }

    async fn classify(&self, query: &Query) -> std::result::Result<Classification, FallbackReason> {
        let prompt = Self::build_prompt(query);

        let generation = generate_with_timeout(
            self.generator.as_ref(),
            SYSTEM_INSTRUCTION,
            &prompt,
            self.timeout,
        )
        .await
        .map_err(|e| {
            warn!(generator = self.generator.name(), error = %e, "Routing generation failed");
            FallbackReason::GeneratorFailed
        })?;

        debug!(raw = %generation.text.trim(), "Classifier output");

        let label = Label::parse_token(&generation.text).ok_or_else(|| {
            warn!(raw = %generation.text.trim(), "Classifier returned an unknown label");
            FallbackReason::UnrecognizedToken
        })?;

        let mut classification = Classification::model(label, &generation.text);
        classification.confidence = generation.confidence;
        Ok(classification)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generation::{FailingGenerator, StallingGenerator, StaticGenerator};
    use crate::models::RoutingSource;

    fn strategy(generator: Arc<dyn TextGenerator>) -> ModelStrategy {
        ModelStrategy::new(generator, Duration::from_millis(50))
    }

    #[test]
    fn test_prompt_lists_every_label() {
        let prompt = ModelStrategy::build_prompt(&Query::new("pay off my card"));

        for label in Label::ALL {
            assert!(prompt.contains(label.as_str()));
            assert!(prompt.contains(label.description()));
        }
        assert!(prompt.contains("pay off my card"));
    }

    #[tokio::test]
    async fn test_recognized_token() {
        let s = strategy(Arc::new(StaticGenerator::new(" portfolio\n")));
        let classification = s.classify(&Query::new("pay off my card")).await.unwrap();

        assert_eq!(classification.label, Label::Portfolio);
        assert_eq!(classification.source, RoutingSource::Model);
    }

    #[tokio::test]
    async fn test_unrecognized_token() {
        let s = strategy(Arc::new(StaticGenerator::new("I think this is about mortgages")));
        let result = s.classify(&Query::new("refinance my house")).await;
        assert_eq!(result, Err(FallbackReason::UnrecognizedToken));
    }

    #[tokio::test]
    async fn test_generator_error() {
        let s = strategy(Arc::new(FailingGenerator));
        let result = s.classify(&Query::new("anything")).await;
        assert_eq!(result, Err(FallbackReason::GeneratorFailed));
    }

    #[tokio::test]
    async fn test_generator_timeout() {
        let s = strategy(Arc::new(StallingGenerator));
        let result = s.classify(&Query::new("anything")).await;
        assert_eq!(result, Err(FallbackReason::GeneratorFailed));
    }
}
