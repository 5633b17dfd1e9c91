//! Keyword rule routing
//!
//! Rules are scanned in priority order against the normalized query. The
//! first rule with any matching keyword wins; there is no scoring across
//! rules.

use super::RoutingStrategy;
use crate::models::{Classification, FallbackReason, Label, Query};
use async_trait::async_trait;
use regex::Regex;

/// Inflections accepted after a whole-word keyword ("perk" → "perks")
const WORD_SUFFIXES: &str = "(?:s|es|d|ed|ing|ments?)?";

/// Compile a keyword into a word-bounded pattern. A trailing `*` marks a
/// prefix keyword ("diversif*" matches "diversify", "diversification").
fn keyword_pattern(keyword: &str) -> Regex {
    let pattern = match keyword.strip_suffix('*') {
        Some(prefix) => format!(r"\b{}", regex::escape(prefix)),
        None => format!(r"\b{}{}\b", regex::escape(keyword), WORD_SUFFIXES),
    };

    // escaped literals always compile
    Regex::new(&pattern).expect("escaped keyword pattern is valid")
}

#[derive(Debug, Clone)]
pub struct KeywordRule {
    pub label: Label,
    /// Lowercase keywords or phrases, matched on word boundaries
    pub keywords: Vec<String>,
    patterns: Vec<Regex>,
}

impl KeywordRule {
    pub fn new(label: Label, keywords: &[&str]) -> Self {
        let keywords: Vec<String> = keywords.iter().map(|k| k.to_lowercase()).collect();
        let patterns = keywords.iter().map(|k| keyword_pattern(k)).collect();

        Self {
            label,
            keywords,
            patterns,
        }
    }

    fn first_match(&self, normalized: &str) -> Option<&str> {
        self.keywords
            .iter()
            .zip(&self.patterns)
            .find(|(_, pattern)| pattern.is_match(normalized))
            .map(|(kw, _)| kw.trim_end_matches('*'))
    }
}

/// Static keyword lists. The more specific domains come first so that
/// "perks on my credit card" goes to perks rather than debt payoff.
const ADVISOR_KEYWORDS: &[&str] = &[
    "advisor", "adviser", "financial advice", "meeting", "appointment",
    "consultation", "talk to someone", "speak to someone",
];

const PERK_KEYWORDS: &[&str] = &[
    "perk", "reward", "cashback", "cash back", "benefit", "offer",
    "promotion", "points", "bonus",
];

const PORTFOLIO_KEYWORDS: &[&str] = &[
    "portfolio", "invest", "stock", "bond", "net worth", "asset",
    "allocation", "debt", "loan", "credit card", "pay off", "payoff",
    "interest rate", "diversif*", "retirement account",
];

const GOAL_KEYWORDS: &[&str] = &[
    "goal", "saving for", "save for", "savings target", "savings plan",
    "target amount", "milestone", "on track", "emergency fund", "down payment",
    "vacation",
];

const SPENDING_KEYWORDS: &[&str] = &[
    "spend", "spent", "expense", "transaction", "budget", "purchase",
    "bought", "paid for", "where does my money go", "merchant", "bill",
    "dining", "groceries", "shopping",
];

/// Rule-based strategy: ordered rules, first match wins
#[derive(Debug, Clone)]
pub struct LexicalStrategy {
    rules: Vec<KeywordRule>,
}

impl LexicalStrategy {
    pub fn new(rules: Vec<KeywordRule>) -> Self {
        Self { rules }
    }

    pub fn with_default_rules() -> Self {
        Self::new(vec![
            KeywordRule::new(Label::Advisors, ADVISOR_KEYWORDS),
            KeywordRule::new(Label::Perks, PERK_KEYWORDS),
            KeywordRule::new(Label::Portfolio, PORTFOLIO_KEYWORDS),
            KeywordRule::new(Label::Goals, GOAL_KEYWORDS),
            KeywordRule::new(Label::Spending, SPENDING_KEYWORDS),
        ])
    }

    pub fn rules(&self) -> &[KeywordRule] {
        &self.rules
    }

    /// Synchronous core of [`RoutingStrategy::classify`]
    pub fn match_rules(&self, query: &Query) -> Option<Classification> {
        let normalized = query.normalized();

        self.rules.iter().find_map(|rule| {
            rule.first_match(&normalized)
                .map(|keyword| Classification::rule(rule.label, keyword))
        })
    }
}

impl Default for LexicalStrategy {
    fn default() -> Self {
        Self::with_default_rules()
    }
}

#[async_trait]
impl RoutingStrategy for LexicalStrategy {
    fn name(&self) -> &'static str {
        "lexical"
    }

    async fn classify(&self, query: &Query) -> std::result::Result<Classification, FallbackReason> {
        self.match_rules(query).ok_or(FallbackReason::NoRuleMatched)
    }
}
