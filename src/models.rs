//! Core data models for the banking agent router

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;

//
// ================= Label =================
//

/// Closed set of specialist domains. Declaration order is the canonical order.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "UPPERCASE")]
pub enum Label {
    Spending,
    Goals,
    Portfolio,
    Perks,
    Advisors,
}

impl Label {
    pub const ALL: [Label; 5] = [
        Label::Spending,
        Label::Goals,
        Label::Portfolio,
        Label::Perks,
        Label::Advisors,
    ];

    /// Canonical token, as the model classifier is asked to emit it
    pub fn as_str(&self) -> &'static str {
        match self {
            Label::Spending => "SPENDING",
            Label::Goals => "GOALS",
            Label::Portfolio => "PORTFOLIO",
            Label::Perks => "PERKS",
            Label::Advisors => "ADVISORS",
        }
    }

    /// One-line description presented to the model classifier
    pub fn description(&self) -> &'static str {
        match self {
            Label::Spending => {
                "transactions, spending patterns, budgets, expense tracking, monthly trends"
            }
            Label::Goals => {
                "savings goals and targets, progress, savings plans, goal timelines"
            }
            Label::Portfolio => {
                "investments, portfolio performance, net worth, debt payoff, asset allocation"
            }
            Label::Perks => "banking perks, rewards, cashback, benefits, offers and promotions",
            Label::Advisors => {
                "connecting with financial advisors, advisor specialties, ratings, meetings"
            }
        }
    }

    /// Parse a classifier token. Surrounding whitespace, quotes and
    /// punctuation are ignored, as is case. Anything else is `None`.
    pub fn parse_token(raw: &str) -> Option<Label> {
        let token = raw
            .trim()
            .trim_matches(|c: char| !c.is_ascii_alphanumeric())
            .to_ascii_uppercase();

        Label::ALL.into_iter().find(|label| label.as_str() == token)
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

//
// ================= Query =================
//

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Query {
    text: String,
    session_id: Option<String>,
    user_id: Option<String>,
}

impl Query {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            session_id: None,
            user_id: None,
        }
    }

    pub fn with_session(mut self, session_id: impl Into<String>) -> Self {
        self.session_id = Some(session_id.into());
        self
    }

    pub fn with_user(mut self, user_id: impl Into<String>) -> Self {
        self.user_id = Some(user_id.into());
        self
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn session_id(&self) -> Option<&str> {
        self.session_id.as_deref()
    }

    pub fn user_id(&self) -> Option<&str> {
        self.user_id.as_deref()
    }

    pub fn is_blank(&self) -> bool {
        self.text.trim().is_empty()
    }

    /// Lowercased text with runs of whitespace collapsed
    pub fn normalized(&self) -> String {
        self.text
            .split_whitespace()
            .collect::<Vec<_>>()
            .join(" ")
            .to_lowercase()
    }

    /// Short SHA-256 prefix used in logs in place of the raw text
    pub fn fingerprint(&self) -> String {
        let hash = Sha256::digest(self.text.as_bytes());
        hex::encode(&hash[..6])
    }
}

//
// ================= Classification =================
//

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum FallbackReason {
    EmptyQuery,
    NoRuleMatched,
    UnrecognizedToken,
    GeneratorFailed,
}

/// How a label was chosen
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RoutingSource {
    Rule { keyword: String },
    Model,
    Fallback { reason: FallbackReason },
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Classification {
    pub label: Label,
    pub confidence: Option<f32>,
    pub justification: Option<String>,
    pub source: RoutingSource,
}

impl Classification {
    pub fn rule(label: Label, keyword: &str) -> Self {
        Self {
            label,
            confidence: None,
            justification: Some(format!("matched keyword '{}'", keyword)),
            source: RoutingSource::Rule {
                keyword: keyword.to_string(),
            },
        }
    }

    pub fn model(label: Label, raw_output: &str) -> Self {
        Self {
            label,
            confidence: None,
            justification: Some(format!("model answered '{}'", raw_output.trim())),
            source: RoutingSource::Model,
        }
    }

    pub fn fallback(label: Label, reason: FallbackReason) -> Self {
        Self {
            label,
            confidence: None,
            justification: None,
            source: RoutingSource::Fallback { reason },
        }
    }

    pub fn fallback_reason(&self) -> Option<FallbackReason> {
        match self.source {
            RoutingSource::Fallback { reason } => Some(reason),
            _ => None,
        }
    }

    pub fn is_fallback(&self) -> bool {
        self.fallback_reason().is_some()
    }
}

//
// ================= Answer =================
//

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum AnswerStatus {
    Answered,
    NotFound,
    Clarification,
    GenerationFailed,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Answer {
    pub text: String,
    pub status: AnswerStatus,
    /// Structured facts the specialist gathered. Kept server-side.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub facts: Option<serde_json::Value>,
}

impl Answer {
    pub fn answered(text: impl Into<String>, facts: serde_json::Value) -> Self {
        Self {
            text: text.into(),
            status: AnswerStatus::Answered,
            facts: Some(facts),
        }
    }

    pub fn not_found(message: impl Into<String>, facts: serde_json::Value) -> Self {
        Self {
            text: message.into(),
            status: AnswerStatus::NotFound,
            facts: Some(facts),
        }
    }

    pub fn clarification(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            status: AnswerStatus::Clarification,
            facts: None,
        }
    }

    pub fn generation_failed(message: impl Into<String>, facts: serde_json::Value) -> Self {
        Self {
            text: message.into(),
            status: AnswerStatus::GenerationFailed,
            facts: Some(facts),
        }
    }

    pub fn fact(&self, key: &str) -> Option<&serde_json::Value> {
        self.facts.as_ref().and_then(|f| f.get(key))
    }
}

impl fmt::Display for AnswerStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            AnswerStatus::Answered => "answered",
            AnswerStatus::NotFound => "not_found",
            AnswerStatus::Clarification => "clarification",
            AnswerStatus::GenerationFailed => "generation_failed",
        };
        write!(f, "{}", s)
    }
}
