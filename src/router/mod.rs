//! Query router
//!
//! Maps free text to exactly one [`Label`]. Strategies only decide when they
//! can; the [`Router`] owns the fallback policy and turns every undecided
//! case into the configured default label.

use crate::models::{Classification, FallbackReason, Label, Query};
use async_trait::async_trait;
use tracing::{info, instrument, warn};

pub mod lexical;
pub mod model;

pub use lexical::{KeywordRule, LexicalStrategy};
pub use model::ModelStrategy;

/// Trait for a classification strategy.
///
/// Returning `Err` is not a failure of routing: the router resolves it to the
/// default label. Implementations must not panic.
#[async_trait]
pub trait RoutingStrategy: Send + Sync {
    fn name(&self) -> &'static str;

    async fn classify(&self, query: &Query) -> std::result::Result<Classification, FallbackReason>;
}

pub struct Router {
    strategy: Box<dyn RoutingStrategy>,
    default_label: Label,
}

impl Router {
    pub fn new(strategy: Box<dyn RoutingStrategy>, default_label: Label) -> Self {
        Self {
            strategy,
            default_label,
        }
    }

    pub fn default_label(&self) -> Label {
        self.default_label
    }

    pub fn strategy_name(&self) -> &'static str {
        self.strategy.name()
    }

    /// Total over all inputs: always yields one label from the closed set
    #[instrument(skip_all, fields(query = %query.fingerprint(), strategy = self.strategy.name()))]
    pub async fn route(&self, query: &Query) -> Classification {
        if query.is_blank() {
            warn!(default = %self.default_label, "Empty query, routing to default label");
            return Classification::fallback(self.default_label, FallbackReason::EmptyQuery);
        }

        match self.strategy.classify(query).await {
            Ok(classification) => {
                info!(label = %classification.label, "Query routed");
                classification
            }
            Err(reason) => {
                warn!(
                    ?reason,
                    default = %self.default_label,
                    "Classification undecided, routing to default label"
                );
                Classification::fallback(self.default_label, reason)
            }
        }
    }
}
