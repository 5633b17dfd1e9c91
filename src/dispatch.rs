//! Specialist trait and dispatch table
//!
//! The table is filled once at startup and only read afterwards. Lookup is a
//! single hash probe; the table never inspects which specialist it holds.

use crate::data::DataProvider;
use crate::error::OrchestrationError;
use crate::models::{Answer, Label, Query};
use crate::Result;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, error, instrument};

/// Trait for a per-domain responder.
///
/// `handle` is infallible by contract: missing data, blank queries and
/// generator failures all come back as an [`Answer`] with the matching status.
#[async_trait::async_trait]
pub trait Specialist: Send + Sync {
    fn label(&self) -> Label;
    fn name(&self) -> &'static str;
    async fn handle(&self, query: &Query, data: &dyn DataProvider) -> Answer;
}

/// Label → specialist registry
pub struct DispatchTable {
    specialists: HashMap<Label, Arc<dyn Specialist>>,
}

impl DispatchTable {
    pub fn new() -> Self {
        Self {
            specialists: HashMap::with_capacity(Label::ALL.len()),
        }
    }

    /// Startup-time only. A label can be registered once.
    pub fn register(&mut self, label: Label, specialist: Arc<dyn Specialist>) -> Result<()> {
        if specialist.label() != label {
            return Err(OrchestrationError::Configuration(format!(
                "{} handles {} but was registered under {}",
                specialist.name(),
                specialist.label(),
                label
            )));
        }

        if let Some(existing) = self.specialists.get(&label) {
            return Err(OrchestrationError::Configuration(format!(
                "label {} already registered to {}",
                label,
                existing.name()
            )));
        }

        self.specialists.insert(label, specialist);
        Ok(())
    }

    /// Every label in the closed set must have a handler
    pub fn validate(&self) -> Result<()> {
        let missing: Vec<String> = Label::ALL
            .iter()
            .filter(|label| !self.specialists.contains_key(*label))
            .map(|label| label.to_string())
            .collect();

        if missing.is_empty() {
            Ok(())
        } else {
            Err(OrchestrationError::Configuration(format!(
                "no specialist registered for: {}",
                missing.join(", ")
            )))
        }
    }

    pub fn get(&self, label: Label) -> Option<Arc<dyn Specialist>> {
        self.specialists.get(&label).cloned()
    }

    /// Registered labels in canonical order
    pub fn labels(&self) -> Vec<Label> {
        Label::ALL
            .into_iter()
            .filter(|label| self.specialists.contains_key(label))
            .collect()
    }

    #[instrument(skip_all, fields(label = %label, query = %query.fingerprint()))]
    pub async fn dispatch(
        &self,
        label: Label,
        query: &Query,
        data: &dyn DataProvider,
    ) -> Result<Answer> {
        let specialist = self.specialists.get(&label).ok_or_else(|| {
            error!("Dispatch table has no specialist for routed label");
            OrchestrationError::UnroutableLabel(label)
        })?;

        let mut answer = specialist.handle(query, data).await;

        if answer.text.trim().is_empty() {
            debug!(specialist = specialist.name(), "Specialist produced empty text");
            answer = Answer::generation_failed(
                "Sorry, I wasn't able to put an answer together. Please try rephrasing your question.",
                answer.facts.take().unwrap_or(serde_json::Value::Null),
            );
        }

        debug!(
            specialist = specialist.name(),
            status = %answer.status,
            "Specialist answered"
        );

        Ok(answer)
    }
}

impl Default for DispatchTable {
    fn default() -> Self {
        Self::new()
    }
}
