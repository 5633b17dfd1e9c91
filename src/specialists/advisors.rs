//! Advisors specialist
//!
//! Matches customers with an advisor. A recognised need with nobody to
//! serve it is a `NotFound` answer, not an error.

use super::{clarification, Phrasing};
use crate::data::{Advisor, DataProvider};
use crate::dispatch::Specialist;
use crate::models::{Answer, Label, Query};
use async_trait::async_trait;
use serde_json::json;

const INSTRUCTION: &str = r#"You are a financial advisory services specialist at Cymbal Bank. Connect users with the right financial advisor for their needs and goals.

When responding:
1. Use only the data provided
2. Recommend the most appropriate advisor
3. Explain what users can expect from a meeting
4. Highlight advisor specialties and ratings
5. Be professional and reassuring

If asked about topics outside advisory services, politely redirect to your specialty."#;

/// Need keyword → specialty, checked in order
const NEED_KEYWORDS: &[(&str, &str)] = &[
    ("retirement", "Retirement Planning"),
    ("invest", "Investment Strategy"),
    ("debt", "Debt Management"),
    ("save", "Investment Strategy"),
    ("loan", "Debt Management"),
];

#[derive(Debug, Clone, PartialEq)]
pub enum Recommendation<'a> {
    Matched {
        specialty: &'static str,
        recommended: &'a Advisor,
        other_options: Vec<&'a Advisor>,
    },
    /// The need maps to a specialty nobody on the roster covers
    NoSpecialist { specialty: &'static str },
    /// No recognizable need: show everyone
    General(&'a [Advisor]),
}

pub fn find_advisor_by_specialty<'a>(advisors: &'a [Advisor], specialty: &str) -> Vec<&'a Advisor> {
    let needle = specialty.trim().to_lowercase();
    if needle.is_empty() {
        return Vec::new();
    }

    advisors
        .iter()
        .filter(|a| a.specialty.to_lowercase().contains(&needle))
        .collect()
}

/// Advisor whose first or last name appears as a word in the query
pub fn find_advisor_by_name<'a>(advisors: &'a [Advisor], normalized_query: &str) -> Option<&'a Advisor> {
    let words: Vec<&str> = normalized_query
        .split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .collect();

    advisors.iter().find(|a| {
        a.name
            .to_lowercase()
            .split_whitespace()
            .any(|part| words.contains(&part))
    })
}

pub fn recommend_advisor<'a>(advisors: &'a [Advisor], need: &str) -> Recommendation<'a> {
    let need = need.to_lowercase();

    let Some(specialty) = NEED_KEYWORDS
        .iter()
        .find(|(keyword, _)| need.contains(keyword))
        .map(|(_, specialty)| *specialty)
    else {
        return Recommendation::General(advisors);
    };

    let mut matches = advisors.iter().filter(|a| a.specialty.contains(specialty));

    match matches.next() {
        Some(recommended) => Recommendation::Matched {
            specialty,
            recommended,
            other_options: matches.collect(),
        },
        None => Recommendation::NoSpecialist { specialty },
    }
}

fn no_specialty_answer(specialty: &str) -> Answer {
    Answer::not_found(
        format!("No advisors found with specialty: {}", specialty),
        json!({ "specialty": specialty, "matches": [] }),
    )
}

pub struct AdvisorsSpecialist {
    phrasing: Phrasing,
}

impl AdvisorsSpecialist {
    pub fn new(phrasing: Phrasing) -> Self {
        Self { phrasing }
    }

    /// Lookup by specialty. Nothing matching yields the same `NotFound`
    /// answer on every call.
    pub async fn find_by_specialty(&self, specialty: &str, data: &dyn DataProvider) -> Answer {
        let matches = find_advisor_by_specialty(data.advisors(), specialty);
        if matches.is_empty() {
            return no_specialty_answer(specialty);
        }

        let query = Query::new(format!("Which advisors specialize in {}?", specialty));
        let facts = json!({ "specialty": specialty, "matches": matches });

        self.phrasing
            .phrase(
                Label::Advisors,
                INSTRUCTION,
                &query,
                facts,
                "Please introduce these advisors.",
            )
            .await
    }
}

#[async_trait]
impl Specialist for AdvisorsSpecialist {
    fn label(&self) -> Label {
        Label::Advisors
    }

    fn name(&self) -> &'static str {
        "advisors_specialist"
    }

    async fn handle(&self, query: &Query, data: &dyn DataProvider) -> Answer {
        if query.is_blank() {
            return clarification(Label::Advisors);
        }

        let advisors = data.advisors();
        if advisors.is_empty() {
            return Answer::not_found(
                "No advisors are available right now. Please check back later.",
                json!({ "advisors": [] }),
            );
        }

        let normalized = query.normalized();

        let facts = if let Some(advisor) = find_advisor_by_name(advisors, &normalized) {
            json!({ "advisor_details": advisor })
        } else {
            match recommend_advisor(advisors, &normalized) {
                Recommendation::Matched {
                    specialty,
                    recommended,
                    other_options,
                } => json!({
                    "recommended_advisor": recommended,
                    "reason": format!("Best match for your need: {}", specialty),
                    "other_options": other_options,
                }),
                Recommendation::NoSpecialist { specialty } => {
                    return no_specialty_answer(specialty);
                }
                Recommendation::General(all) => json!({
                    "message": "Here are all available advisors",
                    "advisors": all,
                }),
            }
        };

        self.phrasing
            .phrase(
                Label::Advisors,
                INSTRUCTION,
                query,
                facts,
                "Please provide a helpful, professional response based on this data.",
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

    fn specialist() -> (AdvisorsSpecialist, Arc<StaticGenerator>) {
        let generator = Arc::new(StaticGenerator::new("Meet your advisor."));
        let specialist = AdvisorsSpecialist::new(Phrasing::new(
            generator.clone(),
            Duration::from_secs(1),
        ));
        (specialist, generator)
    }

    #[tokio::test]
    async fn test_unknown_specialty_is_stable_not_found() {
        let (specialist, generator) = specialist();
        let data = data();

        let first = specialist.find_by_specialty("unobtainium", &data).await;
        let second = specialist.find_by_specialty("unobtainium", &data).await;

        assert_eq!(first.status, AnswerStatus::NotFound);
        assert_eq!(first, second);
        assert_eq!(first.text, "No advisors found with specialty: unobtainium");
        assert_eq!(generator.calls(), 0);
    }

    #[tokio::test]
    async fn test_known_specialty_is_phrased() {
        let (specialist, generator) = specialist();
        let answer = specialist.find_by_specialty("retirement", &data()).await;

        assert_eq!(answer.status, AnswerStatus::Answered);
        assert_eq!(answer.fact("matches").unwrap()[0]["name"], "Sarah Johnson");
        assert_eq!(generator.calls(), 1);
    }

    #[test]
    fn test_recommendation_by_need() {
        let data = data();

        match recommend_advisor(data.advisors(), "I need help getting out of debt") {
            Recommendation::Matched { recommended, .. } => {
                assert_eq!(recommended.name, "Emily Rodriguez")
            }
            other => panic!("unexpected recommendation: {:?}", other),
        }

        assert!(matches!(
            recommend_advisor(data.advisors(), "just looking"),
            Recommendation::General(_)
        ));
    }

    #[tokio::test]
    async fn test_need_without_specialist_is_not_found() {
        let roster = vec![Advisor {
            id: "advisor_9".to_string(),
            name: "Pat Lee".to_string(),
            specialty: "Tax Planning".to_string(),
            rating: 4.5,
            availability: "Available for appointments".to_string(),
        }];
        let data = data().with_advisors(roster);
        let (specialist, _) = specialist();

        let answer = specialist
            .handle(&Query::new("I want an advisor for retirement"), &data)
            .await;

        assert_eq!(answer.status, AnswerStatus::NotFound);
        assert!(answer.text.contains("Retirement Planning"));
    }

    #[tokio::test]
    async fn test_name_lookup() {
        let (specialist, _) = specialist();
        let answer = specialist
            .handle(&Query::new("When is Michael Chen available?"), &data())
            .await;

        assert_eq!(answer.fact("advisor_details").unwrap()["id"], "advisor_2");
    }
}
