//! Orchestrator: route a query, then hand it to the chosen specialist
//!
//! INPUT → ROUTE → DISPATCH → ANSWER

use crate::config::{AppConfig, RoutingStrategyKind};
use crate::data::{DataProvider, MockBankData};
use crate::dispatch::DispatchTable;
use crate::generation::{GeminiClient, OfflineGenerator, TextGenerator};
use crate::metrics::RoutingMetrics;
use crate::models::{Answer, Classification, Query};
use crate::router::{LexicalStrategy, ModelStrategy, Router, RoutingStrategy};
use crate::specialists::create_default_dispatch_table;
use crate::Result;
use serde::Serialize;
use std::sync::Arc;
use std::time::Instant;
use tracing::{info, warn};

/// Outcome of one orchestrated query
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct RoutedAnswer {
    pub classification: Classification,
    pub answer: Answer,
}

pub struct Orchestrator {
    router: Router,
    table: DispatchTable,
    data: Arc<dyn DataProvider>,
    metrics: Arc<RoutingMetrics>,
}

impl Orchestrator {
    /// Fails if the table does not cover every label
    pub fn new(
        router: Router,
        table: DispatchTable,
        data: Arc<dyn DataProvider>,
        metrics: Arc<RoutingMetrics>,
    ) -> Result<Self> {
        table.validate()?;

        Ok(Self {
            router,
            table,
            data,
            metrics,
        })
    }

    /// Wire up generator, router, table and mock data from configuration
    pub fn from_config(config: &AppConfig) -> Result<Self> {
        let generator: Arc<dyn TextGenerator> = match &config.gemini_api_key {
            Some(key) => Arc::new(GeminiClient::new(key.clone(), &config.gemini_model)?),
            None => {
                warn!("No Gemini API key configured, answers will list raw facts");
                Arc::new(OfflineGenerator)
            }
        };

        Self::with_generator(config, generator)
    }

    pub fn with_generator(config: &AppConfig, generator: Arc<dyn TextGenerator>) -> Result<Self> {
        let strategy: Box<dyn RoutingStrategy> = match config.routing_strategy {
            RoutingStrategyKind::Lexical => Box::new(LexicalStrategy::with_default_rules()),
            RoutingStrategyKind::Model => {
                let classifier: Arc<dyn TextGenerator> = match &config.gemini_api_key {
                    // deterministic labels
                    Some(key) => Arc::new(
                        GeminiClient::new(key.clone(), &config.gemini_model)?.with_temperature(0.0),
                    ),
                    None => generator.clone(),
                };
                Box::new(ModelStrategy::new(classifier, config.llm_timeout))
            }
        };

        let router = Router::new(strategy, config.default_label);
        let table = create_default_dispatch_table(generator, config.llm_timeout)?;
        let data = Arc::new(MockBankData::generate(config.mock_data_seed));

        info!(
            strategy = router.strategy_name(),
            default_label = %config.default_label,
            seed = config.mock_data_seed,
            "Orchestrator initialized"
        );

        Self::new(router, table, data, RoutingMetrics::shared())
    }

    pub fn metrics(&self) -> &Arc<RoutingMetrics> {
        &self.metrics
    }

    pub fn router(&self) -> &Router {
        &self.router
    }

    /// Route and answer one query. Only a dispatch-table hole is an error.
    pub async fn run(&self, query: &Query) -> Result<RoutedAnswer> {
        let started = Instant::now();

        let classification = self.router.route(query).await;
        self.metrics.record_route(&classification);

        let answer = self
            .table
            .dispatch(classification.label, query, self.data.as_ref())
            .await?;

        self.metrics.record_answer(answer.status);
        self.metrics.observe_latency(started.elapsed());

        info!(
            query = %query.fingerprint(),
            label = %classification.label,
            status = %answer.status,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Query answered"
        );

        Ok(RoutedAnswer {
            classification,
            answer,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generation::{StallingGenerator, StaticGenerator};
    use crate::models::{AnswerStatus, FallbackReason, Label};
    use std::time::Duration;

    fn config(strategy: RoutingStrategyKind) -> AppConfig {
        AppConfig {
            routing_strategy: strategy,
            llm_timeout: Duration::from_millis(50),
            ..AppConfig::default()
        }
    }

    #[tokio::test]
    async fn test_run_routes_and_answers() {
        let orchestrator = Orchestrator::with_generator(
            &config(RoutingStrategyKind::Lexical),
            Arc::new(StaticGenerator::new("Here are your perks.")),
        )
        .unwrap();

        let result = orchestrator
            .run(&Query::new("Which rewards can I activate?"))
            .await
            .unwrap();

        assert_eq!(result.classification.label, Label::Perks);
        assert_eq!(result.answer.status, AnswerStatus::Answered);
        assert_eq!(result.answer.text, "Here are your perks.");

        let snapshot = orchestrator.metrics().snapshot();
        assert_eq!(snapshot.queries_total, 1);
        assert_eq!(snapshot.routed_by_label["PERKS"], 1);
    }

    #[tokio::test]
    async fn test_offline_generator_keeps_system_usable() {
        let orchestrator =
            Orchestrator::from_config(&config(RoutingStrategyKind::Lexical)).unwrap();

        let result = orchestrator
            .run(&Query::new("What's my net worth?"))
            .await
            .unwrap();

        assert_eq!(result.classification.label, Label::Portfolio);
        assert_eq!(result.answer.status, AnswerStatus::Answered);
        assert!(result.answer.text.contains("net_worth"));
    }

    #[tokio::test]
    async fn test_stalled_model_falls_back_and_still_answers() {
        let orchestrator = Orchestrator::with_generator(
            &config(RoutingStrategyKind::Model),
            Arc::new(StallingGenerator),
        )
        .unwrap();

        let result = orchestrator
            .run(&Query::new("show me my portfolio"))
            .await
            .unwrap();

        assert_eq!(result.classification.label, Label::Spending);
        assert_eq!(
            result.classification.fallback_reason(),
            Some(FallbackReason::GeneratorFailed)
        );
        assert_eq!(result.answer.status, AnswerStatus::GenerationFailed);
        assert_eq!(orchestrator.metrics().snapshot().fallback_total, 1);
    }

    #[test]
    fn test_incomplete_table_is_rejected() {
        let router = Router::new(Box::new(LexicalStrategy::default()), Label::Spending);
        let data = Arc::new(MockBankData::generate(1));

        let err = Orchestrator::new(router, DispatchTable::new(), data, RoutingMetrics::shared())
            .err()
            .unwrap();
        assert!(err.is_misconfiguration());
    }
}
