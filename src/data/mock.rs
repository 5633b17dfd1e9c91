//! Seeded mock bank dataset

use super::{
    Advisor, DataProvider, Debt, GoalStatus, Holding, Investments, Performance, Perk, PerkStatus,
    SavingsGoal, Transaction, UserProfile,
};
use chrono::{Duration, Months, NaiveDate, Utc};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

const TRANSACTION_HISTORY_DAYS: u32 = 90;

/// Category → merchants. Order matters for seeded reproducibility.
const MERCHANTS: &[(&str, &[&str])] = &[
    ("Groceries", &["Whole Foods", "Trader Joe's", "Safeway"]),
    ("Dining", &["Chipotle", "Starbucks", "Local Cafe"]),
    ("Transportation", &["Uber", "Gas Station", "Public Transit"]),
    ("Entertainment", &["Netflix", "Movie Theater", "Spotify"]),
    ("Utilities", &["Electric Company", "Water Utility", "Internet Provider"]),
    ("Shopping", &["Amazon", "Target", "Best Buy"]),
];

/// Immutable snapshot of one customer's records
#[derive(Debug, Clone)]
pub struct MockBankData {
    as_of: NaiveDate,
    profile: UserProfile,
    transactions: Vec<Transaction>,
    goals: Vec<SavingsGoal>,
    investments: Investments,
    debts: Vec<Debt>,
    perks: Vec<Perk>,
    advisors: Vec<Advisor>,
}

impl MockBankData {
    /// Snapshot as of today
    pub fn generate(seed: u64) -> Self {
        Self::new(seed, Utc::now().date_naive())
    }

    pub fn new(seed: u64, as_of: NaiveDate) -> Self {
        let mut rng = StdRng::seed_from_u64(seed);

        Self {
            as_of,
            profile: UserProfile {
                user_id: "user_123".to_string(),
                name: "John Doe".to_string(),
                email: "john.doe@example.com".to_string(),
                account_type: "Premium Checking".to_string(),
            },
            transactions: generate_transactions(&mut rng, as_of),
            goals: generate_goals(as_of),
            investments: generate_investments(),
            debts: generate_debts(as_of),
            perks: generate_perks(),
            advisors: generate_advisors(),
        }
    }

    /// Replace the advisor roster (used to exercise empty lookups)
    pub fn with_advisors(mut self, advisors: Vec<Advisor>) -> Self {
        self.advisors = advisors;
        self
    }

    pub fn with_transactions(mut self, mut transactions: Vec<Transaction>) -> Self {
        transactions.sort_by(|a, b| b.date.cmp(&a.date));
        self.transactions = transactions;
        self
    }
}

fn add_months(date: NaiveDate, months: u32) -> NaiveDate {
    date.checked_add_months(Months::new(months)).unwrap_or(date)
}

fn generate_transactions(rng: &mut StdRng, as_of: NaiveDate) -> Vec<Transaction> {
    (0..TRANSACTION_HISTORY_DAYS)
        .map(|i| {
            let (category, merchants) = MERCHANTS[rng.gen_range(0..MERCHANTS.len())];
            let merchant = merchants.choose(&mut *rng).copied().unwrap_or(merchants[0]);
            let cents = rng.gen_range(1_000..=20_000) as f64;

            Transaction {
                date: as_of - Duration::days(i as i64),
                merchant: merchant.to_string(),
                category: category.to_string(),
                amount: cents / 100.0,
                description: format!("Purchase at {}", merchant),
            }
        })
        .collect()
}

fn generate_goals(as_of: NaiveDate) -> Vec<SavingsGoal> {
    vec![
        SavingsGoal {
            id: "goal_1".to_string(),
            name: "Emergency Fund".to_string(),
            target_amount: 10_000.0,
            current_amount: 4_500.0,
            target_date: add_months(as_of, 3),
            status: GoalStatus::Active,
        },
        SavingsGoal {
            id: "goal_2".to_string(),
            name: "Vacation to Italy".to_string(),
            target_amount: 5_000.0,
            current_amount: 2_100.0,
            target_date: add_months(as_of, 8),
            status: GoalStatus::Active,
        },
        SavingsGoal {
            id: "goal_3".to_string(),
            name: "Down Payment".to_string(),
            target_amount: 50_000.0,
            current_amount: 12_000.0,
            target_date: add_months(as_of, 15),
            status: GoalStatus::Active,
        },
    ]
}

fn generate_investments() -> Investments {
    let holding = |asset_type: &str, value: f64, allocation: f64| Holding {
        asset_type: asset_type.to_string(),
        value,
        allocation,
    };

    Investments {
        total_value: 45_000.0,
        holdings: vec![
            holding("Stocks", 25_000.0, 55.6),
            holding("Bonds", 12_000.0, 26.7),
            holding("Real Estate", 5_000.0, 11.1),
            holding("Cash", 3_000.0, 6.7),
        ],
        performance: Performance {
            ytd_return: 8.5,
            one_year_return: 12.3,
            three_year_return: 10.8,
        },
    }
}

fn generate_debts(as_of: NaiveDate) -> Vec<Debt> {
    let next_month = add_months(as_of, 1);

    vec![
        Debt {
            debt_type: "Credit Card".to_string(),
            balance: 3_200.0,
            interest_rate: 18.9,
            minimum_payment: 96.0,
            due_date: next_month,
        },
        Debt {
            debt_type: "Student Loan".to_string(),
            balance: 18_500.0,
            interest_rate: 4.5,
            minimum_payment: 180.0,
            due_date: next_month + Duration::days(5),
        },
        Debt {
            debt_type: "Auto Loan".to_string(),
            balance: 12_000.0,
            interest_rate: 5.2,
            minimum_payment: 350.0,
            due_date: next_month - Duration::days(5),
        },
    ]
}

fn generate_perks() -> Vec<Perk> {
    vec![
        Perk {
            id: "perk_1".to_string(),
            name: "Cashback on Dining".to_string(),
            description: "Get 3% cashback on all dining purchases".to_string(),
            estimated_savings: 45.0,
            category: "Dining".to_string(),
            status: PerkStatus::Active,
        },
        Perk {
            id: "perk_2".to_string(),
            name: "Travel Points Bonus".to_string(),
            description: "Earn 2x points on travel bookings".to_string(),
            estimated_savings: 120.0,
            category: "Travel".to_string(),
            status: PerkStatus::Available,
        },
        Perk {
            id: "perk_3".to_string(),
            name: "Gas Rewards".to_string(),
            description: "Save 5 cents per gallon at partner stations".to_string(),
            estimated_savings: 30.0,
            category: "Transportation".to_string(),
            status: PerkStatus::Active,
        },
    ]
}

fn generate_advisors() -> Vec<Advisor> {
    vec![
        Advisor {
            id: "advisor_1".to_string(),
            name: "Sarah Johnson".to_string(),
            specialty: "Retirement Planning".to_string(),
            rating: 4.8,
            availability: "Available for appointments".to_string(),
        },
        Advisor {
            id: "advisor_2".to_string(),
            name: "Michael Chen".to_string(),
            specialty: "Investment Strategy".to_string(),
            rating: 4.9,
            availability: "Next available: Nov 25".to_string(),
        },
        Advisor {
            id: "advisor_3".to_string(),
            name: "Emily Rodriguez".to_string(),
            specialty: "Debt Management".to_string(),
            rating: 4.7,
            availability: "Available for appointments".to_string(),
        },
    ]
}

impl DataProvider for MockBankData {
    fn user_profile(&self) -> &UserProfile {
        &self.profile
    }

    fn transactions(&self, days: u32) -> &[Transaction] {
        let cutoff = self
            .as_of
            .checked_sub_signed(Duration::days(i64::from(days)))
            .unwrap_or(NaiveDate::MIN);
        let end = self.transactions.partition_point(|t| t.date > cutoff);
        &self.transactions[..end]
    }

    fn goals(&self) -> &[SavingsGoal] {
        &self.goals
    }

    fn investments(&self) -> &Investments {
        &self.investments
    }

    fn debts(&self) -> &[Debt] {
        &self.debts
    }

    fn perks(&self) -> &[Perk] {
        &self.perks
    }

    fn advisors(&self) -> &[Advisor] {
        &self.advisors
    }

    fn as_of(&self) -> NaiveDate {
        self.as_of
    }
}
