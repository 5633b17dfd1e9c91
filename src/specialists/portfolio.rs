//! Portfolio specialist
//!
//! Investments, net worth, and debt payoff ordering. Payoff strategies are
//! always computed so the answer can compare them.

use super::{clarification, round2, Phrasing};
use crate::data::{DataProvider, Debt, Holding, Investments, Performance};
use crate::dispatch::Specialist;
use crate::models::{Answer, Label, Query};
use async_trait::async_trait;
use serde::Serialize;
use serde_json::json;

const INSTRUCTION: &str = r#"You are an investment portfolio specialist at Cymbal Bank. Help users understand their investments, manage debt, and build wealth through informed decisions.

When responding:
1. Use only the data provided
2. Explain financial concepts in simple terms
3. Give specific recommendations with rationale
4. Compare strategies where relevant (e.g. avalanche vs snowball for debt)
5. Focus on long-term wealth building
6. Note that you provide general guidance, not personalized financial advice

If asked about topics outside investments, debt, or portfolio, politely redirect to your specialty."#;

/// Any single holding above this share is flagged as concentrated
const CONCENTRATION_THRESHOLD_PCT: f64 = 60.0;

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct NetWorth {
    pub total_assets: f64,
    pub total_liabilities: f64,
    pub net_worth: f64,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct DebtSummary {
    pub total_debt: f64,
    pub total_minimum_payment: f64,
    pub debts: Vec<Debt>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct PayoffStep {
    #[serde(rename = "type")]
    pub debt_type: String,
    pub balance: f64,
    pub rate: f64,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct PayoffPlan {
    pub description: &'static str,
    pub order: Vec<PayoffStep>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct PayoffStrategies {
    /// Highest interest rate first
    pub avalanche_method: PayoffPlan,
    /// Lowest balance first
    pub snowball_method: PayoffPlan,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct AllocationAnalysis {
    pub current_allocation: Vec<Holding>,
    pub total_value: f64,
    pub diversification_score: usize,
    pub performance: Performance,
    pub recommendation: String,
}

pub fn net_worth(investments: &Investments, debts: &[Debt]) -> NetWorth {
    let liabilities: f64 = debts.iter().map(|d| d.balance).sum();

    NetWorth {
        total_assets: round2(investments.total_value),
        total_liabilities: round2(liabilities),
        net_worth: round2(investments.total_value - liabilities),
    }
}

pub fn debt_summary(debts: &[Debt]) -> DebtSummary {
    DebtSummary {
        total_debt: round2(debts.iter().map(|d| d.balance).sum()),
        total_minimum_payment: round2(debts.iter().map(|d| d.minimum_payment).sum()),
        debts: debts.to_vec(),
    }
}

fn to_steps(debts: Vec<&Debt>) -> Vec<PayoffStep> {
    debts
        .into_iter()
        .map(|d| PayoffStep {
            debt_type: d.debt_type.clone(),
            balance: d.balance,
            rate: d.interest_rate,
        })
        .collect()
}

/// Stable sorts: ties keep the provider's order
pub fn payoff_strategies(debts: &[Debt]) -> PayoffStrategies {
    let mut avalanche: Vec<&Debt> = debts.iter().collect();
    avalanche.sort_by(|a, b| b.interest_rate.total_cmp(&a.interest_rate));

    let mut snowball: Vec<&Debt> = debts.iter().collect();
    snowball.sort_by(|a, b| a.balance.total_cmp(&b.balance));

    PayoffStrategies {
        avalanche_method: PayoffPlan {
            description: "Pay off highest interest rate debts first (saves the most money)",
            order: to_steps(avalanche),
        },
        snowball_method: PayoffPlan {
            description: "Pay off lowest balance debts first (quick psychological wins)",
            order: to_steps(snowball),
        },
    }
}

pub fn asset_allocation(investments: &Investments) -> AllocationAnalysis {
    let concentrated = investments
        .holdings
        .iter()
        .find(|h| h.allocation > CONCENTRATION_THRESHOLD_PCT);

    let recommendation = match concentrated {
        Some(h) => format!(
            "Your portfolio is concentrated in {} ({:.1}%). Consider spreading across more asset classes.",
            h.asset_type, h.allocation
        ),
        None if investments.holdings.len() < 2 => {
            "Your portfolio holds a single asset class. Consider diversifying.".to_string()
        }
        None => "Your portfolio shows good diversification across asset classes.".to_string(),
    };

    AllocationAnalysis {
        current_allocation: investments.holdings.clone(),
        total_value: investments.total_value,
        diversification_score: investments.holdings.len(),
        performance: investments.performance.clone(),
        recommendation,
    }
}

pub struct PortfolioSpecialist {
    phrasing: Phrasing,
}

impl PortfolioSpecialist {
    pub fn new(phrasing: Phrasing) -> Self {
        Self { phrasing }
    }
}

#[async_trait]
impl Specialist for PortfolioSpecialist {
    fn label(&self) -> Label {
        Label::Portfolio
    }

    fn name(&self) -> &'static str {
        "portfolio_specialist"
    }

    async fn handle(&self, query: &Query, data: &dyn DataProvider) -> Answer {
        if query.is_blank() {
            return clarification(Label::Portfolio);
        }

        let investments = data.investments();
        let debts = data.debts();

        let facts = json!({
            "portfolio_summary": investments,
            "net_worth": net_worth(investments, debts),
            "debt_summary": debt_summary(debts),
            "payoff_strategies": payoff_strategies(debts),
            "asset_allocation": asset_allocation(investments),
        });

        self.phrasing
            .phrase(
                Label::Portfolio,
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
    use crate::generation::FailingGenerator;
    use crate::models::AnswerStatus;
    use chrono::NaiveDate;
    use std::sync::Arc;
    use std::time::Duration;

    fn debt(debt_type: &str, balance: f64, rate: f64, minimum: f64) -> Debt {
        Debt {
            debt_type: debt_type.to_string(),
            balance,
            interest_rate: rate,
            minimum_payment: minimum,
            due_date: NaiveDate::from_ymd_opt(2026, 11, 1).unwrap(),
        }
    }

    fn order(plan: &PayoffPlan) -> Vec<&str> {
        plan.order.iter().map(|s| s.debt_type.as_str()).collect()
    }

    #[test]
    fn test_avalanche_and_snowball_differ() {
        let debts = vec![
            debt("Store Card", 500.0, 24.0, 25.0),
            debt("Mortgage", 200_000.0, 3.1, 1_200.0),
            debt("Car", 9_000.0, 6.5, 300.0),
            debt("Medical", 300.0, 0.0, 50.0),
        ];

        let strategies = payoff_strategies(&debts);
        assert_eq!(
            order(&strategies.avalanche_method),
            vec!["Store Card", "Car", "Mortgage", "Medical"]
        );
        assert_eq!(
            order(&strategies.snowball_method),
            vec!["Medical", "Store Card", "Car", "Mortgage"]
        );
    }

    #[test]
    fn test_net_worth_and_debt_totals() {
        let data = MockBankData::new(42, NaiveDate::from_ymd_opt(2026, 10, 14).unwrap());

        let nw = net_worth(data.investments(), data.debts());
        assert_eq!(nw.total_assets, 45_000.0);
        assert_eq!(nw.total_liabilities, 33_700.0);
        assert_eq!(nw.net_worth, 11_300.0);

        let summary = debt_summary(data.debts());
        assert_eq!(summary.total_debt, 33_700.0);
        assert_eq!(summary.total_minimum_payment, 626.0);
    }

    #[test]
    fn test_allocation_flags_concentration() {
        let data = MockBankData::new(42, NaiveDate::from_ymd_opt(2026, 10, 14).unwrap());
        let analysis = asset_allocation(data.investments());
        assert_eq!(analysis.diversification_score, 4);
        assert!(analysis.recommendation.contains("good diversification"));

        let mut concentrated = data.investments().clone();
        concentrated.holdings[0].allocation = 80.0;
        assert!(asset_allocation(&concentrated)
            .recommendation
            .contains("concentrated in Stocks"));
    }

    #[tokio::test]
    async fn test_facts_survive_generation_failure() {
        let data = MockBankData::new(42, NaiveDate::from_ymd_opt(2026, 10, 14).unwrap());
        let specialist = PortfolioSpecialist::new(Phrasing::new(
            Arc::new(FailingGenerator),
            Duration::from_secs(1),
        ));

        let answer = specialist
            .handle(&Query::new("I want to pay off my credit card fastest"), &data)
            .await;

        assert_eq!(answer.status, AnswerStatus::GenerationFailed);
        let strategies = answer.fact("payoff_strategies").unwrap();
        assert_eq!(strategies["avalanche_method"]["order"][0]["type"], "Credit Card");
        assert_eq!(strategies["snowball_method"]["order"][0]["type"], "Credit Card");
    }
}
