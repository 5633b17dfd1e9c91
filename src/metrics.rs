//! In-process routing counters, served at `GET /metrics`

use crate::models::{AnswerStatus, Classification, Label, RoutingSource};
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

#[derive(Debug, Default)]
pub struct RoutingMetrics {
    queries_total: AtomicU64,
    routed_by_label: [AtomicU64; 5],
    rule_matches_total: AtomicU64,
    model_decisions_total: AtomicU64,
    fallback_total: AtomicU64,
    generation_failures_total: AtomicU64,
    not_found_total: AtomicU64,
    total_latency_millis: AtomicU64,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct MetricsSnapshot {
    pub queries_total: u64,
    pub routed_by_label: BTreeMap<String, u64>,
    pub rule_matches_total: u64,
    pub model_decisions_total: u64,
    pub fallback_total: u64,
    pub generation_failures_total: u64,
    pub not_found_total: u64,
    pub avg_latency_millis: f64,
}

fn label_index(label: Label) -> usize {
    Label::ALL.iter().position(|l| *l == label).unwrap_or(0)
}

impl RoutingMetrics {
    pub fn shared() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn record_route(&self, classification: &Classification) {
        self.queries_total.fetch_add(1, Ordering::Relaxed);
        self.routed_by_label[label_index(classification.label)].fetch_add(1, Ordering::Relaxed);

        let counter = match classification.source {
            RoutingSource::Rule { .. } => &self.rule_matches_total,
            RoutingSource::Model => &self.model_decisions_total,
            RoutingSource::Fallback { .. } => &self.fallback_total,
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_answer(&self, status: AnswerStatus) {
        match status {
            AnswerStatus::GenerationFailed => {
                self.generation_failures_total.fetch_add(1, Ordering::Relaxed);
            }
            AnswerStatus::NotFound => {
                self.not_found_total.fetch_add(1, Ordering::Relaxed);
            }
            AnswerStatus::Answered | AnswerStatus::Clarification => {}
        }
    }

    pub fn observe_latency(&self, duration: Duration) {
        self.total_latency_millis
            .fetch_add(duration.as_millis() as u64, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        let queries = self.queries_total.load(Ordering::Relaxed);
        let latency = self.total_latency_millis.load(Ordering::Relaxed);

        MetricsSnapshot {
            queries_total: queries,
            routed_by_label: Label::ALL
                .iter()
                .map(|label| {
                    (
                        label.as_str().to_string(),
                        self.routed_by_label[label_index(*label)].load(Ordering::Relaxed),
                    )
                })
                .collect(),
            rule_matches_total: self.rule_matches_total.load(Ordering::Relaxed),
            model_decisions_total: self.model_decisions_total.load(Ordering::Relaxed),
            fallback_total: self.fallback_total.load(Ordering::Relaxed),
            generation_failures_total: self.generation_failures_total.load(Ordering::Relaxed),
            not_found_total: self.not_found_total.load(Ordering::Relaxed),
            avg_latency_millis: if queries == 0 {
                0.0
            } else {
                latency as f64 / queries as f64
            },
        }
    }
}
