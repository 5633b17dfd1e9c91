//! Perks specialist

use super::{clarification, round2, Phrasing};
use crate::data::{DataProvider, Perk, PerkStatus};
use crate::dispatch::Specialist;
use crate::models::{Answer, Label, Query};
use async_trait::async_trait;
use serde::Serialize;
use serde_json::json;
use std::collections::BTreeSet;

const INSTRUCTION: &str = r#"You are a banking perks and benefits specialist at Cymbal Bank. Help users maximize their savings and rewards through available perks and benefits.

When responding:
1. Use only the data provided
2. Highlight the most valuable perks first
3. Show potential savings in dollars
4. Recommend perks based on the user's spending
5. Explain how to make the most of each perk
6. Be enthusiastic about helping users save money

If asked about topics outside perks and benefits, politely redirect to your area of expertise."#;

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct PerkSavings {
    pub current_monthly_savings: f64,
    pub potential_additional_savings: f64,
    pub total_possible_savings: f64,
    pub active_perks_count: usize,
    pub available_perks_count: usize,
}

pub fn perks_with_status(perks: &[Perk], status: PerkStatus) -> Vec<&Perk> {
    perks.iter().filter(|p| p.status == status).collect()
}

pub fn savings_totals(perks: &[Perk]) -> PerkSavings {
    let sum = |status: PerkStatus| -> f64 {
        perks
            .iter()
            .filter(|p| p.status == status)
            .map(|p| p.estimated_savings)
            .sum()
    };

    let active = sum(PerkStatus::Active);
    let potential = sum(PerkStatus::Available);

    PerkSavings {
        current_monthly_savings: round2(active),
        potential_additional_savings: round2(potential),
        total_possible_savings: round2(active + potential),
        active_perks_count: perks_with_status(perks, PerkStatus::Active).len(),
        available_perks_count: perks_with_status(perks, PerkStatus::Available).len(),
    }
}

pub fn perks_by_category<'a>(perks: &'a [Perk], category: &str) -> Vec<&'a Perk> {
    let needle = category.to_lowercase();
    perks
        .iter()
        .filter(|p| p.category.to_lowercase().contains(&needle))
        .collect()
}

/// Categories the customer could be asking about: perk categories plus
/// the categories they actually spend in
fn known_categories(data: &dyn DataProvider) -> BTreeSet<String> {
    data.perks()
        .iter()
        .map(|p| p.category.clone())
        .chain(data.transactions(90).iter().map(|t| t.category.clone()))
        .collect()
}

pub struct PerksSpecialist {
    phrasing: Phrasing,
}

impl PerksSpecialist {
    pub fn new(phrasing: Phrasing) -> Self {
        Self { phrasing }
    }
}

#[async_trait]
impl Specialist for PerksSpecialist {
    fn label(&self) -> Label {
        Label::Perks
    }

    fn name(&self) -> &'static str {
        "perks_specialist"
    }

    async fn handle(&self, query: &Query, data: &dyn DataProvider) -> Answer {
        if query.is_blank() {
            return clarification(Label::Perks);
        }

        let perks = data.perks();
        if perks.is_empty() {
            return Answer::not_found(
                "There are no perks or rewards on your account right now.",
                json!({ "all_perks": [] }),
            );
        }

        let normalized = query.normalized();
        let category_filter = known_categories(data)
            .into_iter()
            .find(|c| normalized.contains(&c.to_lowercase()))
            .map(|category| {
                let matches = perks_by_category(perks, &category);
                if matches.is_empty() {
                    json!({
                        "category": category,
                        "message": format!("No perks found for category: {}", category),
                    })
                } else {
                    json!({ "category": category, "perks": matches })
                }
            });

        let facts = json!({
            "all_perks": perks,
            "active_perks": perks_with_status(perks, PerkStatus::Active),
            "available_perks": perks_with_status(perks, PerkStatus::Available),
            "savings": savings_totals(perks),
            "category_filter": category_filter,
        });

        self.phrasing
            .phrase(
                Label::Perks,
                INSTRUCTION,
                query,
                facts,
                "Please provide a helpful response based on this data. Be enthusiastic about savings opportunities!",
            )
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::MockBankData;
    use crate::generation::StaticGenerator;
    use crate::models::AnswerStatus;
    use chrono::NaiveDate;
    use std::sync::Arc;
    use std::time::Duration;

    fn data() -> MockBankData {
        MockBankData::new(42, NaiveDate::from_ymd_opt(2026, 10, 14).unwrap())
    }

    fn specialist() -> PerksSpecialist {
        PerksSpecialist::new(Phrasing::new(
            Arc::new(StaticGenerator::new("Great news!")),
            Duration::from_secs(1),
        ))
    }

    #[test]
    fn test_savings_totals() {
        let data = data();
        let savings = savings_totals(data.perks());

        assert_eq!(savings.current_monthly_savings, 75.0);
        assert_eq!(savings.potential_additional_savings, 120.0);
        assert_eq!(savings.total_possible_savings, 195.0);
        assert_eq!(savings.active_perks_count, 2);
        assert_eq!(savings.available_perks_count, 1);
    }

    #[test]
    fn test_perks_by_category_is_case_insensitive() {
        let data = data();
        let dining = perks_by_category(data.perks(), "dINING");
        assert_eq!(dining.len(), 1);
        assert_eq!(dining[0].name, "Cashback on Dining");
        assert!(perks_by_category(data.perks(), "Groceries").is_empty());
    }

    #[tokio::test]
    async fn test_category_with_no_perks_is_noted() {
        let answer = specialist()
            .handle(&Query::new("Any rewards for groceries?"), &data())
            .await;

        assert_eq!(answer.status, AnswerStatus::Answered);
        let filter = answer.fact("category_filter").unwrap();
        assert_eq!(filter["category"], "Groceries");
        assert_eq!(filter["message"], "No perks found for category: Groceries");
    }

    #[tokio::test]
    async fn test_travel_category_lists_matching_perks() {
        let answer = specialist()
            .handle(&Query::new("what do I get for travel?"), &data())
            .await;

        let filter = answer.fact("category_filter").unwrap();
        assert_eq!(filter["category"], "Travel");
        assert_eq!(filter["perks"][0]["id"], "perk_2");
    }
}
