//! Read-only bank data
//!
//! Specialists see the customer's records only through [`DataProvider`].
//! The provider is owned by the transport and passed down explicitly.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

pub mod mock;
pub use mock::MockBankData;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UserProfile {
    pub user_id: String,
    pub name: String,
    pub email: String,
    pub account_type: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Transaction {
    pub date: NaiveDate,
    pub merchant: String,
    pub category: String,
    pub amount: f64,
    pub description: String,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum GoalStatus {
    Active,
    Completed,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SavingsGoal {
    pub id: String,
    pub name: String,
    pub target_amount: f64,
    pub current_amount: f64,
    pub target_date: NaiveDate,
    pub status: GoalStatus,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Holding {
    #[serde(rename = "type")]
    pub asset_type: String,
    pub value: f64,
    pub allocation: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Performance {
    pub ytd_return: f64,
    pub one_year_return: f64,
    pub three_year_return: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Investments {
    pub total_value: f64,
    pub holdings: Vec<Holding>,
    pub performance: Performance,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Debt {
    #[serde(rename = "type")]
    pub debt_type: String,
    pub balance: f64,
    pub interest_rate: f64,
    pub minimum_payment: f64,
    pub due_date: NaiveDate,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum PerkStatus {
    Active,
    Available,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Perk {
    pub id: String,
    pub name: String,
    pub description: String,
    pub estimated_savings: f64,
    pub category: String,
    pub status: PerkStatus,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Advisor {
    pub id: String,
    pub name: String,
    pub specialty: String,
    pub rating: f64,
    pub availability: String,
}

/// Synchronous, infallible access to already-validated records
pub trait DataProvider: Send + Sync {
    fn user_profile(&self) -> &UserProfile;

    /// Transactions from the last `days` days, newest first
    fn transactions(&self, days: u32) -> &[Transaction];

    fn goals(&self) -> &[SavingsGoal];

    fn investments(&self) -> &Investments;

    fn debts(&self) -> &[Debt];

    fn perks(&self) -> &[Perk];

    fn advisors(&self) -> &[Advisor];

    /// Date the snapshot was taken; "today" for date arithmetic
    fn as_of(&self) -> NaiveDate;
}
