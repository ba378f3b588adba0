//! Canned responses substituted when a generator call fails.
//!
//! This module is the one place that defines what failure looks like for
//! each [`CallKind`](crate::CallKind). Every value it returns is already
//! schema-valid and passes the same invariants as validated output.

use life_core::{BaseStats, Category, Impact, LifeStats, Outcome, RiskLevel, StatChange};
use rand::Rng;

use crate::contract::{ChoiceSummary, GeneratedChoice, GeneratedScenario, Insights};
use crate::validate::life_explorer;

fn choice(
    text: &str,
    description: &str,
    risk_level: RiskLevel,
    outcomes: [&str; 2],
    category: Category,
) -> GeneratedChoice {
    GeneratedChoice {
        text: text.to_string(),
        description: description.to_string(),
        risk_level,
        potential_outcomes: outcomes.iter().map(|s| s.to_string()).collect(),
        category,
    }
}

/// Scenario offered when generation fails: one choice per risk level.
pub fn scenario() -> GeneratedScenario {
    GeneratedScenario {
        title: "A Crossroads Moment".to_string(),
        description: "Life presents you with an important decision.".to_string(),
        context: "Your choices will shape your future.".to_string(),
        choices: vec![
            choice(
                "Take the safe path",
                "A conservative choice with predictable outcomes.",
                RiskLevel::Low,
                ["Stability", "Steady progress"],
                Category::Life,
            ),
            choice(
                "Take a calculated risk",
                "A balanced approach with moderate uncertainty.",
                RiskLevel::Medium,
                ["Potential growth", "Some challenges"],
                Category::Career,
            ),
            choice(
                "Go all in",
                "A bold move that could change everything.",
                RiskLevel::High,
                ["Major success", "Significant setback"],
                Category::Money,
            ),
        ],
    }
}

/// Neutral outcome for `choice`. High-risk choices swing ±10 on a coin flip
/// from `rng`; everything else gains 5.
pub fn outcome<R: Rng + ?Sized>(choice: &ChoiceSummary, rng: &mut R) -> Outcome {
    let change = match choice.risk_level {
        RiskLevel::High => {
            if rng.gen_bool(0.5) {
                10
            } else {
                -10
            }
        }
        RiskLevel::Low | RiskLevel::Medium => 5,
    };
    Outcome {
        title: "Life Goes On".to_string(),
        description: "Your choice has been made. Time moves forward.".to_string(),
        stat_changes: vec![StatChange::new(
            choice.category.stat(),
            change,
            "The result of your decision",
        )],
        impact: Impact::Neutral,
        years_to_advance: 2,
    }
}

/// Insights scored purely from the final stats.
pub fn insights(final_stats: &BaseStats) -> Insights {
    Insights {
        insights: vec![
            "Every choice shapes your destiny.".to_string(),
            "Balance is key to a fulfilling life.".to_string(),
            "The journey matters more than the destination.".to_string(),
        ],
        life_score: LifeStats::from(*final_stats).average(),
        achievements: vec![life_explorer()],
    }
}
