//! Goals specialist

use super::{clarification, round2, Phrasing};
use crate::data::{DataProvider, SavingsGoal};
use crate::dispatch::Specialist;
use crate::models::{Answer, Label, Query};
use async_trait::async_trait;
use chrono::NaiveDate;
use lazy_static::lazy_static;
use regex::Regex;
use serde::Serialize;
use serde_json::json;

const INSTRUCTION: &str = r#"You are a financial goals specialist at Cymbal Bank. Help users set, track, and achieve their financial goals through practical planning.

When responding:
1. Use only the data provided
2. Break large goals into manageable monthly amounts
3. Celebrate progress and achievements
4. Offer realistic timelines based on the current savings rate
5. Give specific action steps
6. Be encouraging and supportive

If asked about topics outside financial goals, politely redirect to your area of expertise."#;

lazy_static! {
    // "$6,000 in 12 months", "10k over 2 years", "save 5000 within 18 months"
    static ref SAVINGS_REQUEST: Regex = Regex::new(
        r"(?P<verb>\b(?:save|saving|need|put away|set aside)\s+(?:up\s+)?)?(?P<dollar>\$\s?)?(?P<amount>\d[\d,]*(?:\.\d+)?)\s*(?P<k>k\b)?\s*(?P<dollars>dollars\s*)?(?:in|within|over|by)\s+(?P<count>\d+)\s*(?P<unit>month|year)s?"
    )
    .expect("savings request pattern is valid");
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct GoalProgress {
    pub goal_name: String,
    pub target_amount: f64,
    pub current_amount: f64,
    pub progress_percentage: f64,
    pub amount_remaining: f64,
    pub target_date: NaiveDate,
    pub days_remaining: i64,
    pub monthly_savings_needed: f64,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct SavingsPlan {
    pub target_amount: f64,
    pub time_period_months: u32,
    pub monthly_savings_needed: f64,
    pub weekly_savings_needed: f64,
    pub total_to_save: f64,
}

pub fn goal_progress(goal: &SavingsGoal, today: NaiveDate) -> GoalProgress {
    let progress = if goal.target_amount > 0.0 {
        goal.current_amount / goal.target_amount * 100.0
    } else {
        100.0
    };
    let remaining = (goal.target_amount - goal.current_amount).max(0.0);

    let days_remaining = (goal.target_date - today).num_days();
    // at least one month, even for overdue goals
    let months_remaining = (days_remaining as f64 / 30.0).max(1.0);

    GoalProgress {
        goal_name: goal.name.clone(),
        target_amount: goal.target_amount,
        current_amount: goal.current_amount,
        progress_percentage: (progress * 10.0).round() / 10.0,
        amount_remaining: round2(remaining),
        target_date: goal.target_date,
        days_remaining,
        monthly_savings_needed: round2(remaining / months_remaining),
    }
}

pub fn savings_plan(target_amount: f64, months: u32) -> Option<SavingsPlan> {
    if months == 0 || target_amount <= 0.0 {
        return None;
    }

    let monthly = target_amount / months as f64;

    Some(SavingsPlan {
        target_amount,
        time_period_months: months,
        monthly_savings_needed: round2(monthly),
        weekly_savings_needed: round2(monthly / 4.0),
        total_to_save: target_amount,
    })
}

/// Extract "amount over N months/years" from free text. The amount must
/// read as money: a `$`, a `k` suffix, "dollars", or a saving verb before it.
pub fn parse_savings_request(text: &str) -> Option<(f64, u32)> {
    let lowered = text.to_lowercase();

    SAVINGS_REQUEST.captures_iter(&lowered).find_map(|caps| {
        let is_money = ["verb", "dollar", "k", "dollars"]
            .iter()
            .any(|name| caps.name(name).is_some());
        if !is_money {
            return None;
        }

        let mut amount: f64 = caps.name("amount")?.as_str().replace(',', "").parse().ok()?;
        if caps.name("k").is_some() {
            amount *= 1_000.0;
        }

        let count: u32 = caps.name("count")?.as_str().parse().ok()?;
        let months = match caps.name("unit")?.as_str() {
            "year" => count.checked_mul(12)?,
            _ => count,
        };

        Some((amount, months))
    })
}

/// Goal whose name shares a distinctive word with the query
pub fn find_goal<'a>(goals: &'a [SavingsGoal], normalized_query: &str) -> Option<&'a SavingsGoal> {
    let query_words: Vec<&str> = normalized_query
        .split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .collect();

    goals.iter().find(|goal| {
        goal.name
            .to_lowercase()
            .split_whitespace()
            .filter(|w| w.len() > 4)
            .any(|w| query_words.contains(&w))
    })
}

pub struct GoalsSpecialist {
    phrasing: Phrasing,
}

impl GoalsSpecialist {
    pub fn new(phrasing: Phrasing) -> Self {
        Self { phrasing }
    }
}

#[async_trait]
impl Specialist for GoalsSpecialist {
    fn label(&self) -> Label {
        Label::Goals
    }

    fn name(&self) -> &'static str {
        "goals_specialist"
    }

    async fn handle(&self, query: &Query, data: &dyn DataProvider) -> Answer {
        if query.is_blank() {
            return clarification(Label::Goals);
        }

        let goals = data.goals();
        let plan = parse_savings_request(query.text())
            .and_then(|(amount, months)| savings_plan(amount, months));

        if goals.is_empty() && plan.is_none() {
            return Answer::not_found(
                "You don't have any savings goals set up yet. Tell me what you're saving for and by when, and I can build a plan.",
                json!({ "goals": [] }),
            );
        }

        let today = data.as_of();
        let focused = find_goal(goals, &query.normalized()).map(|g| goal_progress(g, today));
        let progress: Vec<GoalProgress> = goals.iter().map(|g| goal_progress(g, today)).collect();

        let facts = json!({
            "goals": progress,
            "focused_goal": focused,
            "savings_plan": plan,
        });

        self.phrasing
            .phrase(
                Label::Goals,
                INSTRUCTION,
                query,
                facts,
                "Please provide a helpful, encouraging response based on this data.",
            )
            .await
    }
}
