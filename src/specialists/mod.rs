//! Domain specialists
//!
//! Each specialist gathers facts from the [`DataProvider`](crate::data::DataProvider),
//! then asks the text generator to phrase an answer from them. Fact
//! gathering is deterministic; only phrasing touches the LLM.

use crate::dispatch::DispatchTable;
use crate::generation::{generate_with_timeout, TextGenerator, DATA_SECTION_MARKER};
use crate::models::{Answer, Label, Query};
use crate::Result;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tracing::warn;

pub mod advisors;
pub mod goals;
pub mod perks;
pub mod portfolio;
pub mod spending;

pub use advisors::AdvisorsSpecialist;
pub use goals::GoalsSpecialist;
pub use perks::PerksSpecialist;
pub use portfolio::PortfolioSpecialist;
pub use spending::SpendingSpecialist;

/// Shared LLM phrasing step
#[derive(Clone)]
pub struct Phrasing {
    generator: Arc<dyn TextGenerator>,
    timeout: Duration,
}

impl Phrasing {
    pub fn new(generator: Arc<dyn TextGenerator>, timeout: Duration) -> Self {
        Self { generator, timeout }
    }

    /// Phrase an answer from `facts`. Generator errors, timeouts and empty
    /// output become a `GenerationFailed` answer that still carries the facts.
    pub async fn phrase(
        &self,
        label: Label,
        instruction: &str,
        query: &Query,
        facts: Value,
        closing: &str,
    ) -> Answer {
        let prompt = build_prompt(query, &facts, closing);

        match generate_with_timeout(self.generator.as_ref(), instruction, &prompt, self.timeout)
            .await
        {
            Ok(generation) if !generation.text.trim().is_empty() => {
                Answer::answered(generation.text.trim(), facts)
            }
            Ok(_) => {
                warn!(%label, generator = self.generator.name(), "Generator returned empty text");
                Answer::generation_failed(failure_message(label), facts)
            }
            Err(e) => {
                warn!(%label, generator = self.generator.name(), error = %e, "Answer generation failed");
                Answer::generation_failed(failure_message(label), facts)
            }
        }
    }
}

fn build_prompt(query: &Query, facts: &Value, closing: &str) -> String {
    let data = serde_json::to_string_pretty(facts).unwrap_or_else(|_| facts.to_string());

    format!(
        "User Query: {}\n\n{}\n{}\n\n{}",
        query.text().trim(),
        DATA_SECTION_MARKER,
        data,
        closing
    )
}

fn topic(label: Label) -> &'static str {
    match label {
        Label::Spending => "your spending",
        Label::Goals => "your savings goals",
        Label::Portfolio => "your investments and debts",
        Label::Perks => "your perks and rewards",
        Label::Advisors => "our financial advisors",
    }
}

pub(crate) fn failure_message(label: Label) -> String {
    format!(
        "Sorry, I couldn't put together an answer about {} right now. Please try again in a moment.",
        topic(label)
    )
}

/// Answer for a blank query; never calls the generator
pub(crate) fn clarification(label: Label) -> Answer {
    let example = match label {
        Label::Spending => "\"How much did I spend on dining last month?\"",
        Label::Goals => "\"Am I on track for my emergency fund?\"",
        Label::Portfolio => "\"What's the fastest way to pay off my debts?\"",
        Label::Perks => "\"Which perks can I activate?\"",
        Label::Advisors => "\"Who can help me plan for retirement?\"",
    };

    Answer::clarification(format!(
        "I'd be happy to help with {}. Could you tell me a little more about what you'd like to know? For example: {}",
        topic(label),
        example
    ))
}

pub(crate) fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Build the table with one specialist per label and validate it
pub fn create_default_dispatch_table(
    generator: Arc<dyn TextGenerator>,
    timeout: Duration,
) -> Result<DispatchTable> {
    let phrasing = Phrasing::new(generator, timeout);
    let mut table = DispatchTable::new();

    table.register(Label::Spending, Arc::new(SpendingSpecialist::new(phrasing.clone())))?;
    table.register(Label::Goals, Arc::new(GoalsSpecialist::new(phrasing.clone())))?;
    table.register(Label::Portfolio, Arc::new(PortfolioSpecialist::new(phrasing.clone())))?;
    table.register(Label::Perks, Arc::new(PerksSpecialist::new(phrasing.clone())))?;
    table.register(Label::Advisors, Arc::new(AdvisorsSpecialist::new(phrasing)))?;

    table.validate()?;
    Ok(table)
}
