//! Banking Agent Router
//!
//! Routes a customer's free-text banking question to exactly one of five
//! specialists (spending, goals, portfolio, perks, advisors) and returns
//! that specialist's answer.
//!
//! FLOW:
//! QUERY → ROUTE (lexical rules | model) → DISPATCH → SPECIALIST → ANSWER

pub mod agent;
pub mod api;
pub mod config;
pub mod data;
pub mod dispatch;
pub mod error;
pub mod generation;
pub mod metrics;
pub mod models;
pub mod router;
pub mod specialists;
pub mod telemetry;

pub use error::{OrchestrationError, Result};

// Re-export common types
pub use agent::{Orchestrator, RoutedAnswer};
pub use models::*;
pub use router::Router;
