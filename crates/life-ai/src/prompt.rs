//! Prompt builders for the three generator calls.

use std::fmt::Write;

use life_core::{BaseStats, StatKey};

use crate::contract::{GenerateInsightsRequest, GenerateScenarioRequest, ProcessChoiceRequest};

/// Coarse level used to describe a stat in prose.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StatLevel {
    High,
    Medium,
    Low,
}

impl StatLevel {
    pub fn of(value: i32) -> Self {
        if value >= 70 {
            StatLevel::High
        } else if value >= 40 {
            StatLevel::Medium
        } else {
            StatLevel::Low
        }
    }
}

pub fn stat_description(key: StatKey, value: i32) -> &'static str {
    match (key, StatLevel::of(value)) {
        (StatKey::Money, StatLevel::High) => "financially secure",
        (StatKey::Money, StatLevel::Medium) => "getting by",
        (StatKey::Money, StatLevel::Low) => "struggling financially",
        (StatKey::Health, StatLevel::High) => "excellent health",
        (StatKey::Health, StatLevel::Medium) => "decent health",
        (StatKey::Health, StatLevel::Low) => "health concerns",
        (StatKey::Career, StatLevel::High) => "thriving career",
        (StatKey::Career, StatLevel::Medium) => "steady job",
        (StatKey::Career, StatLevel::Low) => "career challenges",
        (StatKey::Relationships, StatLevel::High) => "strong connections",
        (StatKey::Relationships, StatLevel::Medium) => "some close friends",
        (StatKey::Relationships, StatLevel::Low) => "feeling isolated",
    }
}

fn push_stats(out: &mut String, stats: &BaseStats, described: bool) {
    let rows = [
        ("Financial stability", StatKey::Money, stats.money),
        ("Health", StatKey::Health, stats.health),
        ("Career progress", StatKey::Career, stats.career),
        ("Relationships", StatKey::Relationships, stats.relationships),
    ];
    for (label, key, value) in rows {
        if described {
            let _ = writeln!(out, "- {label}: {value}/100 ({})", stat_description(key, value));
        } else {
            let _ = writeln!(out, "- {label}: {value}/100");
        }
    }
}

fn push_numbered(out: &mut String, items: &[String]) {
    for (i, item) in items.iter().enumerate() {
        let _ = writeln!(out, "{}. {item}", i + 1);
    }
}

pub fn scenario_prompt(req: &GenerateScenarioRequest) -> String {
    let mut out = String::new();
    out.push_str("You are a life simulation AI. Generate a realistic life scenario for someone.\n\n");
    out.push_str("Current situation:\n");
    let _ = writeln!(out, "- Age: {} years old", req.current_age);
    push_stats(&mut out, &req.stats, true);

    out.push_str("\nPrevious life choices:\n");
    if req.previous_choices.is_empty() {
        out.push_str("None yet - this is the start of their journey\n");
    } else {
        push_numbered(&mut out, &req.previous_choices);
    }

    out.push_str("\nTimeline context:\n");
    if req.timeline_context.is_empty() {
        out.push_str("Starting fresh\n");
    } else {
        let _ = writeln!(out, "{}", req.timeline_context);
    }

    out.push_str(
        r#"
Generate a scenario with EXACTLY 3 meaningful choices. It must be age-appropriate,
shaped by the current stats, and allow both positive and negative outcomes.

Respond ONLY with valid JSON in this exact format:
{
  "title": "Scenario title (max 50 chars)",
  "description": "Scenario description (2-3 sentences)",
  "context": "What led to this situation (1-2 sentences)",
  "choices": [
    {
      "text": "Choice label (max 30 chars)",
      "description": "What this choice means (1 sentence)",
      "riskLevel": "low|medium|high",
      "potentialOutcomes": ["Possible outcome 1", "Possible outcome 2"],
      "category": "money|health|career|relationships|life"
    }
  ]
}"#,
    );
    out
}

pub fn outcome_prompt(req: &ProcessChoiceRequest) -> String {
    let c = &req.choice;
    let mut out = String::new();
    out.push_str("You are a life simulation AI determining the outcome of a life choice.\n\n");
    let _ = writeln!(out, "The person chose: \"{}\"", c.text);
    let _ = writeln!(out, "Choice details: {}", c.description);
    let _ = writeln!(out, "Risk level: {}", c.risk_level.as_str());
    let _ = writeln!(out, "Category: {}", c.category.as_str());

    out.push_str("\nCurrent situation:\n");
    let _ = writeln!(out, "- Age: {}", req.current_age);
    push_stats(&mut out, &req.stats, false);
    let _ = writeln!(out, "\nContext: {}", req.timeline_context);

    out.push_str(
        r#"
Generate a realistic outcome. Higher risk choices have more variable outcomes and
may carry larger stat changes.

Respond ONLY with valid JSON:
{
  "title": "Outcome title (max 50 chars)",
  "description": "What happened (2-3 sentences, narrative style)",
  "statChanges": [
    {"stat": "money|health|career|relationships", "change": -20 to 20, "reason": "Brief reason"}
  ],
  "impact": "positive|negative|neutral",
  "yearsToAdvance": 1-5
}

Include 1-4 stat changes. "change" must be between -20 and 20 and "yearsToAdvance"
between 1 and 5 depending on the significance of the event."#,
    );
    out
}

pub fn insights_prompt(req: &GenerateInsightsRequest) -> String {
    let mut out = String::new();
    out.push_str("You are a wise life advisor analyzing someone's life simulation results.\n\n");
    out.push_str("Life timeline:\n");
    for e in &req.timeline {
        let _ = writeln!(out, "- Year {}: {} ({})", e.year, e.title, e.impact.as_str());
    }
    out.push_str("\nFinal life stats at end of simulation:\n");
    push_stats(&mut out, &req.final_stats, false);
    out.push_str("\nKey choices made:\n");
    push_numbered(&mut out, &req.choices);

    out.push_str(
        r#"
Provide 3-5 insights from this journey, a life score from 0 to 100 for overall
satisfaction, and 2-4 earned achievements.

Respond ONLY with valid JSON:
{
  "insights": ["Insight 1", "Insight 2", "Insight 3"],
  "lifeScore": 75,
  "achievements": [
    {"title": "Achievement name", "description": "How it was earned", "rarity": "common|rare|epic|legendary"}
  ]
}"#,
    );
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::contract::{ChoiceSummary, TimelineDigest};
    use life_core::{Category, Impact, RiskLevel};

    fn stats() -> BaseStats {
        BaseStats {
            money: 75,
            health: 40,
            career: 39,
            relationships: 70,
        }
    }

    #[test]
    fn stat_levels() {
        assert_eq!(StatLevel::of(70), StatLevel::High);
        assert_eq!(StatLevel::of(69), StatLevel::Medium);
        assert_eq!(StatLevel::of(40), StatLevel::Medium);
        assert_eq!(StatLevel::of(39), StatLevel::Low);
        assert_eq!(stat_description(StatKey::Relationships, 10), "feeling isolated");
    }

    #[test]
    fn scenario_prompt_describes_fresh_start() {
        let p = scenario_prompt(&GenerateScenarioRequest {
            current_age: 25,
            stats: stats(),
            previous_choices: vec![],
            timeline_context: String::new(),
        });
        assert!(p.contains("- Age: 25 years old"));
        assert!(p.contains("75/100 (financially secure)"));
        assert!(p.contains("39/100 (career challenges)"));
        assert!(p.contains("None yet - this is the start of their journey"));
        assert!(p.contains("Starting fresh"));
    }

    #[test]
    fn scenario_prompt_lists_choices() {
        let p = scenario_prompt(&GenerateScenarioRequest {
            current_age: 31,
            stats: stats(),
            previous_choices: vec!["Bought a house".to_string(), "Ran a marathon".to_string()],
            timeline_context: "Settled down: new home.".to_string(),
        });
        assert!(p.contains("1. Bought a house\n2. Ran a marathon"));
        assert!(p.contains("Settled down: new home."));
    }

    #[test]
    fn outcome_prompt_embeds_choice() {
        let p = outcome_prompt(&ProcessChoiceRequest {
            choice: ChoiceSummary {
                id: "x".to_string(),
                text: "Start a company".to_string(),
                description: "Leave the job".to_string(),
                risk_level: RiskLevel::High,
                category: Category::Career,
            },
            current_age: 33,
            stats: stats(),
            timeline_context: "ctx".to_string(),
        });
        assert!(p.contains("\"Start a company\""));
        assert!(p.contains("Risk level: high"));
        assert!(p.contains("Category: career"));
        assert!(p.contains("- Health: 40/100\n"));
    }

    #[test]
    fn insights_prompt_lists_timeline() {
        let p = insights_prompt(&GenerateInsightsRequest {
            timeline: vec![TimelineDigest {
                year: 2031,
                title: "Promotion".to_string(),
                impact: Impact::Positive,
            }],
            final_stats: stats(),
            choices: vec!["Worked late".to_string()],
        });
        assert!(p.contains("- Year 2031: Promotion (positive)"));
        assert!(p.contains("1. Worked late"));
    }
}
