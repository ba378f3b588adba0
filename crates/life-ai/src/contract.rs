//! Request and response shapes of the three generation calls.
//!
//! Field names are camelCase on the wire so any generator or client that
//! honors the same JSON contract interoperates unchanged.

use life_core::{BaseStats, Category, Choice, Impact, Outcome, Rarity, RiskLevel, TimelineEvent};
use serde::{Deserialize, Serialize};

/// The three kinds of generator interaction.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CallKind {
    Scenario,
    Outcome,
    Insights,
}

impl CallKind {
    pub fn as_str(self) -> &'static str {
        match self {
            CallKind::Scenario => "scenario",
            CallKind::Outcome => "outcome",
            CallKind::Insights => "insights",
        }
    }

    /// Error label returned to HTTP clients when the call fails.
    pub fn failure_message(self) -> &'static str {
        match self {
            CallKind::Scenario => "Failed to generate scenario",
            CallKind::Outcome => "Failed to process choice",
            CallKind::Insights => "Failed to generate insights",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneratedChoice {
    pub text: String,
    pub description: String,
    pub risk_level: RiskLevel,
    pub potential_outcomes: Vec<String>,
    pub category: Category,
}

impl GeneratedChoice {
    /// Bind the choice to an id so it can be presented.
    pub fn into_choice(self, id: String) -> Choice {
        Choice {
            id,
            text: self.text,
            description: self.description,
            risk_level: self.risk_level,
            potential_outcomes: self.potential_outcomes,
            category: self.category,
        }
    }
}

/// A validated scenario before ids are assigned.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneratedScenario {
    pub title: String,
    pub description: String,
    pub context: String,
    pub choices: Vec<GeneratedChoice>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneratedAchievement {
    pub title: String,
    pub description: String,
    pub rarity: Rarity,
}

/// Validated end-of-life insights. Also the HTTP response body.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Insights {
    pub insights: Vec<String>,
    pub life_score: i32,
    pub achievements: Vec<GeneratedAchievement>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateScenarioRequest {
    pub current_age: u32,
    pub stats: BaseStats,
    #[serde(default)]
    pub previous_choices: Vec<String>,
    #[serde(default)]
    pub timeline_context: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GenerateScenarioResponse {
    pub scenario: GeneratedScenario,
}

/// The parts of a choice the outcome call needs.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChoiceSummary {
    #[serde(default)]
    pub id: String,
    pub text: String,
    #[serde(default)]
    pub description: String,
    pub risk_level: RiskLevel,
    pub category: Category,
}

impl From<&Choice> for ChoiceSummary {
    fn from(c: &Choice) -> Self {
        Self {
            id: c.id.clone(),
            text: c.text.clone(),
            description: c.description.clone(),
            risk_level: c.risk_level,
            category: c.category,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessChoiceRequest {
    pub choice: ChoiceSummary,
    pub current_age: u32,
    pub stats: BaseStats,
    #[serde(default)]
    pub timeline_context: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ProcessChoiceResponse {
    pub outcome: Outcome,
}

/// Condensed timeline entry sent with the insights call.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TimelineDigest {
    pub year: i32,
    pub title: String,
    pub impact: Impact,
}

impl From<&TimelineEvent> for TimelineDigest {
    fn from(e: &TimelineEvent) -> Self {
        Self {
            year: e.year,
            title: e.title.clone(),
            impact: e.impact,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateInsightsRequest {
    pub timeline: Vec<TimelineDigest>,
    pub final_stats: BaseStats,
    #[serde(default)]
    pub choices: Vec<String>,
}
