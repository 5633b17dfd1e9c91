//! Spending specialist
//!
//! Category totals, recent transactions and month-over-month trends.

use super::{clarification, round2, Phrasing};
use crate::data::{DataProvider, Transaction};
use crate::dispatch::Specialist;
use crate::models::{Answer, Label, Query};
use async_trait::async_trait;
use serde::Serialize;
use serde_json::json;
use std::collections::BTreeMap;

const SUMMARY_WINDOW_DAYS: u32 = 30;
const TREND_WINDOW_DAYS: u32 = 90;
const RECENT_LIMIT: usize = 10;

const INSTRUCTION: &str = r#"You are a spending and transaction specialist at Cymbal Bank. Help users understand their spending patterns, identify savings opportunities, and manage their budgets.

When responding:
1. Use only the data provided
2. Give specific numbers and percentages
3. Offer actionable advice for saving money
4. Be concise but thorough
5. Keep a helpful, encouraging tone

If asked about something outside spending and transactions, politely explain your specialization."#;

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct SpendingSummary {
    pub total: f64,
    pub by_category: BTreeMap<String, f64>,
    pub top_category: Option<String>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct MonthlyTrends {
    pub monthly_totals: BTreeMap<String, f64>,
    pub average_monthly: f64,
}

/// Aggregate transactions by category
pub fn spending_summary(transactions: &[Transaction]) -> SpendingSummary {
    let mut by_category: BTreeMap<String, f64> = BTreeMap::new();
    for txn in transactions {
        *by_category.entry(txn.category.clone()).or_insert(0.0) += txn.amount;
    }

    let total: f64 = by_category.values().sum();

    let top_category = by_category
        .iter()
        .max_by(|a, b| a.1.total_cmp(b.1))
        .map(|(name, _)| name.clone());

    SpendingSummary {
        total: round2(total),
        by_category: by_category
            .into_iter()
            .map(|(k, v)| (k, round2(v)))
            .collect(),
        top_category,
    }
}

/// Totals per calendar month (YYYY-MM)
pub fn monthly_trends(transactions: &[Transaction]) -> MonthlyTrends {
    let mut months: BTreeMap<String, f64> = BTreeMap::new();
    for txn in transactions {
        *months
            .entry(txn.date.format("%Y-%m").to_string())
            .or_insert(0.0) += txn.amount;
    }

    let average_monthly = if months.is_empty() {
        0.0
    } else {
        round2(months.values().sum::<f64>() / months.len() as f64)
    };

    MonthlyTrends {
        monthly_totals: months.into_iter().map(|(k, v)| (k, round2(v))).collect(),
        average_monthly,
    }
}

/// Category named in the query, if any
fn mentioned_category<'a>(summary: &'a SpendingSummary, normalized: &str) -> Option<&'a str> {
    summary
        .by_category
        .keys()
        .find(|category| normalized.contains(&category.to_lowercase()))
        .map(String::as_str)
}

pub struct SpendingSpecialist {
    phrasing: Phrasing,
}

impl SpendingSpecialist {
    pub fn new(phrasing: Phrasing) -> Self {
        Self { phrasing }
    }
}

#[async_trait]
impl Specialist for SpendingSpecialist {
    fn label(&self) -> Label {
        Label::Spending
    }

    fn name(&self) -> &'static str {
        "spending_specialist"
    }

    async fn handle(&self, query: &Query, data: &dyn DataProvider) -> Answer {
        if query.is_blank() {
            return clarification(Label::Spending);
        }

        let window = data.transactions(SUMMARY_WINDOW_DAYS);
        if data.transactions(TREND_WINDOW_DAYS).is_empty() {
            return Answer::not_found(
                "I couldn't find any transactions on your account in the last 90 days.",
                json!({ "transactions": [] }),
            );
        }

        let summary = spending_summary(window);
        let trends = monthly_trends(data.transactions(TREND_WINDOW_DAYS));
        let recent: Vec<&Transaction> = window.iter().take(RECENT_LIMIT).collect();

        let normalized = query.normalized();
        let category_focus = mentioned_category(&summary, &normalized).map(|category| {
            json!({
                "category": category,
                "total_30_days": summary.by_category.get(category).copied().unwrap_or(0.0),
            })
        });

        let facts = json!({
            "summary_30_days": summary,
            "recent_transactions": recent,
            "monthly_trends": trends,
            "category_focus": category_focus,
        });

        self.phrasing
            .phrase(
                Label::Spending,
                INSTRUCTION,
                query,
                facts,
                "Please provide a helpful response based on this data.",
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

    fn txn(date: (i32, u32, u32), category: &str, amount: f64) -> Transaction {
        Transaction {
            date: NaiveDate::from_ymd_opt(date.0, date.1, date.2).unwrap(),
            merchant: "Test Merchant".to_string(),
            category: category.to_string(),
            amount,
            description: "Purchase at Test Merchant".to_string(),
        }
    }

    fn specialist() -> SpendingSpecialist {
        SpendingSpecialist::new(Phrasing::new(
            Arc::new(StaticGenerator::new("You spent a fair bit.")),
            Duration::from_secs(1),
        ))
    }

    #[test]
    fn test_summary_groups_by_category() {
        let txns = vec![
            txn((2026, 10, 1), "Dining", 12.5),
            txn((2026, 10, 2), "Dining", 30.25),
            txn((2026, 10, 3), "Groceries", 80.0),
        ];

        let summary = spending_summary(&txns);
        assert_eq!(summary.total, 122.75);
        assert_eq!(summary.by_category["Dining"], 42.75);
        assert_eq!(summary.by_category["Groceries"], 80.0);
        assert_eq!(summary.top_category.as_deref(), Some("Groceries"));
    }

    #[test]
    fn test_empty_summary() {
        let summary = spending_summary(&[]);
        assert_eq!(summary.total, 0.0);
        assert!(summary.by_category.is_empty());
        assert_eq!(summary.top_category, None);
    }

    #[test]
    fn test_monthly_trends() {
        let txns = vec![
            txn((2026, 8, 31), "Dining", 100.0),
            txn((2026, 9, 1), "Dining", 50.0),
            txn((2026, 9, 15), "Shopping", 25.0),
        ];

        let trends = monthly_trends(&txns);
        assert_eq!(trends.monthly_totals["2026-08"], 100.0);
        assert_eq!(trends.monthly_totals["2026-09"], 75.0);
        assert_eq!(trends.average_monthly, 87.5);
        assert_eq!(monthly_trends(&[]).average_monthly, 0.0);
    }

    #[tokio::test]
    async fn test_dining_question_carries_breakdown() {
        let data = MockBankData::new(42, NaiveDate::from_ymd_opt(2026, 10, 14).unwrap());
        let answer = specialist()
            .handle(&Query::new("How much did I spend on dining last month?"), &data)
            .await;

        assert_eq!(answer.status, AnswerStatus::Answered);

        let summary = answer.fact("summary_30_days").unwrap();
        let total = summary["total"].as_f64().unwrap();
        let by_category = summary["by_category"].as_object().unwrap();
        let sum: f64 = by_category.values().filter_map(|v| v.as_f64()).sum();

        assert!(total > 0.0);
        assert!((total - sum).abs() < 0.05);
        assert_eq!(answer.fact("recent_transactions").unwrap().as_array().unwrap().len(), 10);

        if by_category.contains_key("Dining") {
            assert_eq!(answer.fact("category_focus").unwrap()["category"], "Dining");
        }
    }

    #[tokio::test]
    async fn test_no_transactions_is_not_found() {
        let data = MockBankData::new(42, NaiveDate::from_ymd_opt(2026, 10, 14).unwrap())
            .with_transactions(vec![]);

        let answer = specialist().handle(&Query::new("what did I spend?"), &data).await;
        assert_eq!(answer.status, AnswerStatus::NotFound);
    }
}
