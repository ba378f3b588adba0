#![deny(warnings)]

//! Core domain models and invariants for the life simulator.
//!
//! This crate defines the serializable types shared by the generator
//! contract, the state machine and persistence, plus the pure stat model.
//! JSON field names follow the camelCase wire contract.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub mod results;
pub mod stats;

pub use results::{ScoreGrade, SimulationResult, TimelineSummary};
pub use stats::{BaseStats, LifeStats, StatChange, INITIAL_STATS};

/// Lowest age a simulation may start at.
pub const MIN_AGE: u32 = 1;
/// Highest age a simulation may target.
pub const MAX_AGE: u32 = 120;

/// Declared gender of the profile owner.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    Male,
    Female,
    #[default]
    Other,
}

/// One of the four directly mutable stat dimensions. Happiness is derived
/// and deliberately has no key.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StatKey {
    Money,
    Health,
    Career,
    Relationships,
}

impl StatKey {
    pub const ALL: [StatKey; 4] = [
        StatKey::Money,
        StatKey::Health,
        StatKey::Career,
        StatKey::Relationships,
    ];

    /// Exact, case-sensitive match against the wire names.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "money" => Some(StatKey::Money),
            "health" => Some(StatKey::Health),
            "career" => Some(StatKey::Career),
            "relationships" => Some(StatKey::Relationships),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            StatKey::Money => "money",
            StatKey::Health => "health",
            StatKey::Career => "career",
            StatKey::Relationships => "relationships",
        }
    }
}

/// Area of life a choice (and the resulting timeline event) touches.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Money,
    Health,
    Career,
    Relationships,
    #[default]
    Life,
}

impl Category {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "money" => Some(Category::Money),
            "health" => Some(Category::Health),
            "career" => Some(Category::Career),
            "relationships" => Some(Category::Relationships),
            "life" => Some(Category::Life),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Category::Money => "money",
            Category::Health => "health",
            Category::Career => "career",
            Category::Relationships => "relationships",
            Category::Life => "life",
        }
    }

    /// Stat that a synthesized change for this category lands on.
    /// "life" has no stat of its own and maps to relationships.
    pub fn stat(self) -> StatKey {
        match self {
            Category::Money => StatKey::Money,
            Category::Health => StatKey::Health,
            Category::Career => StatKey::Career,
            Category::Relationships | Category::Life => StatKey::Relationships,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    Low,
    #[default]
    Medium,
    High,
}

impl RiskLevel {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "low" => Some(RiskLevel::Low),
            "medium" => Some(RiskLevel::Medium),
            "high" => Some(RiskLevel::High),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            RiskLevel::Low => "low",
            RiskLevel::Medium => "medium",
            RiskLevel::High => "high",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Impact {
    Positive,
    Negative,
    #[default]
    Neutral,
}

impl Impact {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "positive" => Some(Impact::Positive),
            "negative" => Some(Impact::Negative),
            "neutral" => Some(Impact::Neutral),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Impact::Positive => "positive",
            Impact::Negative => "negative",
            Impact::Neutral => "neutral",
        }
    }

    /// Signed magnitude of the change synthesized when an outcome carries no
    /// usable stat changes.
    pub fn default_delta(self) -> i32 {
        match self {
            Impact::Positive => 5,
            Impact::Negative => -5,
            Impact::Neutral => 0,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Rarity {
    #[default]
    Common,
    Rare,
    Epic,
    Legendary,
}

impl Rarity {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "common" => Some(Rarity::Common),
            "rare" => Some(Rarity::Rare),
            "epic" => Some(Rarity::Epic),
            "legendary" => Some(Rarity::Legendary),
            _ => None,
        }
    }
}

/// The person being simulated.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub id: String,
    /// Display name, "Anonymous" when left blank.
    pub name: String,
    /// Declared age; tracks the simulated age as the simulation advances.
    pub age: u32,
    pub gender: Gender,
    /// Stable hash input for avatar rendering. Opaque to the core.
    pub avatar_seed: String,
    pub created_at: DateTime<Utc>,
}

/// One selectable option within a scenario.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Choice {
    pub id: String,
    pub text: String,
    pub description: String,
    pub risk_level: RiskLevel,
    pub potential_outcomes: Vec<String>,
    pub category: Category,
}

/// A life decision presented at a given age.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LifeScenario {
    pub id: String,
    pub title: String,
    pub description: String,
    pub context: String,
    pub choices: Vec<Choice>,
}

impl LifeScenario {
    pub fn choice(&self, id: &str) -> Option<&Choice> {
        self.choices.iter().find(|c| c.id == id)
    }
}

/// The validated effect of a chosen option.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Outcome {
    pub title: String,
    pub description: String,
    pub stat_changes: Vec<StatChange>,
    pub impact: Impact,
    /// Always within [1, 5] once validated.
    pub years_to_advance: u32,
}

/// A resolved life event. Never mutated after it is appended to a timeline.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimelineEvent {
    pub id: String,
    /// Simulated calendar year.
    pub year: i32,
    pub age: u32,
    pub title: String,
    pub description: String,
    pub category: Category,
    pub impact: Impact,
    pub stat_changes: Vec<StatChange>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub choice_made: Option<Choice>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Achievement {
    pub id: String,
    pub title: String,
    pub description: String,
    pub icon: String,
    /// Age at which the achievement was unlocked.
    pub unlocked_at: u32,
    pub rarity: Rarity,
}

/// Validation errors for simulation bounds.
#[derive(Debug, Error, PartialEq)]
pub enum ValidationError {
    /// Age outside supported range [1, 120].
    #[error("age {0} is out of supported range [1, 120]")]
    AgeOutOfRange(u32),
    /// Target age must be strictly greater than the start age.
    #[error("target age {target} must be greater than start age {start}")]
    TargetNotAfterStart { start: u32, target: u32 },
}

/// Validate a start/target age pair.
pub fn validate_ages(start: u32, target: u32) -> Result<(), ValidationError> {
    for age in [start, target] {
        if !(MIN_AGE..=MAX_AGE).contains(&age) {
            return Err(ValidationError::AgeOutOfRange(age));
        }
    }
    if target <= start {
        return Err(ValidationError::TargetNotAfterStart { start, target });
    }
    Ok(())
}

/// Truncate to at most `max` characters without splitting a character.
pub fn truncate_chars(s: &str, max: usize) -> String {
    match s.char_indices().nth(max) {
        Some((idx, _)) => s[..idx].to_string(),
        None => s.to_string(),
    }
}
