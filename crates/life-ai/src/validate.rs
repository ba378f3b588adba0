//! Normalize untrusted generator payloads into domain values.
//!
//! Every normalizer is total: missing or wrong-typed fields fall back to a
//! fixed default and out-of-range values are clamped. Only text with no
//! extractable JSON object is rejected, by [`crate::extract`].

use life_core::{
    truncate_chars, Category, Impact, Outcome, Rarity, RiskLevel, StatChange, StatKey,
};
use serde_json::Value;

use crate::contract::{GeneratedAchievement, GeneratedChoice, GeneratedScenario, Insights};
use crate::extract::{extract_object, ParseError};

pub const TITLE_MAX_CHARS: usize = 50;
pub const CHOICE_TEXT_MAX_CHARS: usize = 30;
pub const MIN_CHOICES: usize = 2;
pub const MAX_CHOICES: usize = 3;
pub const MAX_POTENTIAL_OUTCOMES: usize = 3;
pub const MAX_INSIGHTS: usize = 5;
pub const MAX_ACHIEVEMENTS: usize = 4;
pub const STAT_DELTA_LIMIT: i32 = 20;
pub const MIN_YEARS: u32 = 1;
pub const MAX_YEARS: u32 = 5;
pub const DEFAULT_YEARS: f64 = 2.0;
pub const DEFAULT_LIFE_SCORE: f64 = 50.0;

fn non_empty_str<'a>(raw: &'a Value, key: &str) -> Option<&'a str> {
    raw.get(key)
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
}

fn text_or(raw: &Value, key: &str, default: &str) -> String {
    non_empty_str(raw, key).unwrap_or(default).to_string()
}

fn truncated_or(raw: &Value, key: &str, max: usize, default: &str) -> String {
    non_empty_str(raw, key)
        .map(|s| truncate_chars(s, max))
        .unwrap_or_else(|| default.to_string())
}

/// Loose numeric coercion: numbers, numeric strings, booleans and null.
fn coerce_number(v: Option<&Value>) -> Option<f64> {
    match v? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => {
            let s = s.trim();
            if s.is_empty() {
                Some(0.0)
            } else {
                s.parse::<f64>().ok()
            }
        }
        Value::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
        Value::Null => Some(0.0),
        Value::Array(_) | Value::Object(_) => None,
    }
}

/// Coerce to a number, substituting `default` for anything absent,
/// non-numeric, NaN or zero.
fn number_or(v: Option<&Value>, default: f64) -> f64 {
    match coerce_number(v) {
        Some(n) if !n.is_nan() && n != 0.0 => n,
        _ => default,
    }
}

fn string_list(v: &Value, max: usize) -> Vec<String> {
    v.as_array()
        .map(|items| {
            items
                .iter()
                .take(max)
                .filter_map(Value::as_str)
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}

/// Low-risk choice appended until a scenario has [`MIN_CHOICES`].
pub fn stay_the_course() -> GeneratedChoice {
    GeneratedChoice {
        text: "Stay the course".to_string(),
        description: "Continue with your current path.".to_string(),
        risk_level: RiskLevel::Low,
        potential_outcomes: vec!["Maintain stability".to_string()],
        category: Category::Life,
    }
}

fn normalize_choice(raw: &Value, index: usize) -> GeneratedChoice {
    let potential_outcomes = match raw.get("potentialOutcomes") {
        Some(v @ Value::Array(_)) => string_list(v, MAX_POTENTIAL_OUTCOMES),
        _ => vec!["Unknown outcome".to_string()],
    };
    GeneratedChoice {
        text: truncated_or(
            raw,
            "text",
            CHOICE_TEXT_MAX_CHARS,
            &format!("Option {}", index + 1),
        ),
        description: text_or(raw, "description", "An interesting path forward."),
        risk_level: raw
            .get("riskLevel")
            .and_then(Value::as_str)
            .and_then(RiskLevel::parse)
            .unwrap_or(RiskLevel::Medium),
        potential_outcomes,
        category: raw
            .get("category")
            .and_then(Value::as_str)
            .and_then(Category::parse)
            .unwrap_or(Category::Life),
    }
}

pub fn normalize_scenario(raw: &Value) -> GeneratedScenario {
    let mut choices: Vec<GeneratedChoice> = raw
        .get("choices")
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .take(MAX_CHOICES)
                .enumerate()
                .map(|(i, c)| normalize_choice(c, i))
                .collect()
        })
        .unwrap_or_default();
    while choices.len() < MIN_CHOICES {
        choices.push(stay_the_course());
    }
    GeneratedScenario {
        title: truncated_or(raw, "title", TITLE_MAX_CHARS, "Life Crossroads"),
        description: text_or(raw, "description", "You face an important decision."),
        context: text_or(raw, "context", "Life has brought you to this moment."),
        choices,
    }
}

fn normalize_stat_change(raw: &Value) -> Option<StatChange> {
    let stat = raw.get("stat").and_then(Value::as_str).and_then(StatKey::parse)?;
    let limit = f64::from(STAT_DELTA_LIMIT);
    let change = number_or(raw.get("change"), 0.0).clamp(-limit, limit).round() as i32;
    Some(StatChange {
        stat,
        change,
        reason: text_or(raw, "reason", "Life happened"),
    })
}

/// Normalize an outcome for a choice of category `origin`. When no usable
/// stat change survives, one is synthesized on the origin's stat with a
/// magnitude taken from the declared impact.
pub fn normalize_outcome(raw: &Value, origin: Category) -> Outcome {
    let impact = raw
        .get("impact")
        .and_then(Value::as_str)
        .and_then(Impact::parse)
        .unwrap_or(Impact::Neutral);
    let mut stat_changes: Vec<StatChange> = raw
        .get("statChanges")
        .and_then(Value::as_array)
        .map(|items| items.iter().filter_map(normalize_stat_change).collect())
        .unwrap_or_default();
    if stat_changes.is_empty() {
        stat_changes.push(StatChange::new(
            origin.stat(),
            impact.default_delta(),
            "The result of your choice",
        ));
    }
    let years = number_or(raw.get("yearsToAdvance"), DEFAULT_YEARS)
        .clamp(f64::from(MIN_YEARS), f64::from(MAX_YEARS))
        .round() as u32;
    Outcome {
        title: truncated_or(raw, "title", TITLE_MAX_CHARS, "The Outcome"),
        description: text_or(raw, "description", "Your choice has shaped your path."),
        stat_changes,
        impact,
        years_to_advance: years,
    }
}

/// Placeholder achievement used when none survive validation.
pub fn life_explorer() -> GeneratedAchievement {
    GeneratedAchievement {
        title: "Life Explorer".to_string(),
        description: "Completed the life simulation".to_string(),
        rarity: Rarity::Common,
    }
}

pub fn normalize_insights(raw: &Value) -> Insights {
    let mut insights = match raw.get("insights") {
        Some(v @ Value::Array(_)) => string_list(v, MAX_INSIGHTS),
        _ => vec!["Your journey was unique.".to_string()],
    };
    if insights.is_empty() {
        insights.push("Every choice matters in the grand scheme of life.".to_string());
    }
    let life_score = number_or(raw.get("lifeScore"), DEFAULT_LIFE_SCORE)
        .clamp(0.0, 100.0)
        .round() as i32;
    let mut achievements: Vec<GeneratedAchievement> = raw
        .get("achievements")
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .take(MAX_ACHIEVEMENTS)
                .map(|a| GeneratedAchievement {
                    title: text_or(a, "title", "Life Experience"),
                    description: text_or(a, "description", "You lived and learned."),
                    rarity: a
                        .get("rarity")
                        .and_then(Value::as_str)
                        .and_then(Rarity::parse)
                        .unwrap_or(Rarity::Common),
                })
                .collect()
        })
        .unwrap_or_default();
    if achievements.is_empty() {
        achievements.push(life_explorer());
    }
    Insights {
        insights,
        life_score,
        achievements,
    }
}

pub fn parse_scenario(text: &str) -> Result<GeneratedScenario, ParseError> {
    extract_object(text).map(|v| normalize_scenario(&v))
}

pub fn parse_outcome(text: &str, origin: Category) -> Result<Outcome, ParseError> {
    extract_object(text).map(|v| normalize_outcome(&v, origin))
}

pub fn parse_insights(text: &str) -> Result<Insights, ParseError> {
    extract_object(text).map(|v| normalize_insights(&v))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use serde_json::json;

    #[test]
    fn empty_object_yields_padded_scenario() {
        let s = normalize_scenario(&json!({}));
        assert_eq!(s.title, "Life Crossroads");
        assert_eq!(s.choices.len(), 2);
        for c in &s.choices {
            assert_eq!(c.text, "Stay the course");
            assert_eq!(c.risk_level, RiskLevel::Low);
            assert_eq!(c.category, Category::Life);
        }
    }

    #[test]
    fn scenario_fields_are_truncated_and_defaulted() {
        let long_title = "T".repeat(80);
        let raw = json!({
            "title": long_title,
            "description": "",
            "choices": [
                {"text": "A very long choice label that keeps going", "riskLevel": "HIGH",
                 "potentialOutcomes": ["a", "b", "c", "d"], "category": "career"},
                {"riskLevel": "high", "potentialOutcomes": "nope", "category": "fame"},
                "not an object",
                {"text": "fourth"}
            ]
        });
        let s = normalize_scenario(&raw);
        assert_eq!(s.title.chars().count(), 50);
        assert_eq!(s.description, "You face an important decision.");
        assert_eq!(s.context, "Life has brought you to this moment.");
        assert_eq!(s.choices.len(), 3);

        let first = &s.choices[0];
        assert_eq!(first.text.chars().count(), 30);
        assert_eq!(first.risk_level, RiskLevel::Medium);
        assert_eq!(first.potential_outcomes, vec!["a", "b", "c"]);
        assert_eq!(first.category, Category::Career);

        let second = &s.choices[1];
        assert_eq!(second.text, "Option 2");
        assert_eq!(second.risk_level, RiskLevel::High);
        assert_eq!(second.potential_outcomes, vec!["Unknown outcome"]);
        assert_eq!(second.category, Category::Life);

        assert_eq!(s.choices[2].text, "Option 3");
        assert_eq!(s.choices[2].description, "An interesting path forward.");
    }

    #[test]
    fn single_choice_is_padded_once() {
        let s = normalize_scenario(&json!({"choices": [{"text": "Go"}]}));
        assert_eq!(s.choices.len(), 2);
        assert_eq!(s.choices[0].text, "Go");
        assert_eq!(s.choices[1].text, "Stay the course");
    }

    #[test]
    fn positive_outcome_without_changes_synthesizes_one() {
        let o = normalize_outcome(&json!({"impact": "positive"}), Category::Money);
        assert_eq!(
            o.stat_changes,
            vec![StatChange::new(StatKey::Money, 5, "The result of your choice")]
        );
        assert_eq!(o.impact, Impact::Positive);
        assert_eq!(o.title, "The Outcome");
        assert_eq!(o.years_to_advance, 2);
    }

    #[test]
    fn life_category_synthesizes_on_relationships() {
        let o = normalize_outcome(&json!({"impact": "negative"}), Category::Life);
        assert_eq!(o.stat_changes[0].stat, StatKey::Relationships);
        assert_eq!(o.stat_changes[0].change, -5);
        let o = normalize_outcome(&json!({"impact": "meh"}), Category::Health);
        assert_eq!(o.impact, Impact::Neutral);
        assert_eq!(o.stat_changes[0].change, 0);
    }

    #[test]
    fn stat_changes_filtered_coerced_and_clamped() {
        let raw = json!({
            "statChanges": [
                {"stat": "money", "change": 45, "reason": "Jackpot"},
                {"stat": "happiness", "change": 10},
                {"stat": "health", "change": "-7"},
                {"stat": "career", "change": "lots"},
                {"stat": "relationships", "change": -99.6}
            ],
            "yearsToAdvance": 9
        });
        let o = normalize_outcome(&raw, Category::Life);
        assert_eq!(
            o.stat_changes,
            vec![
                StatChange::new(StatKey::Money, 20, "Jackpot"),
                StatChange::new(StatKey::Health, -7, "Life happened"),
                StatChange::new(StatKey::Career, 0, "Life happened"),
                StatChange::new(StatKey::Relationships, -20, "Life happened"),
            ]
        );
        assert_eq!(o.years_to_advance, 5);
    }

    #[test]
    fn years_default_and_floor() {
        let o = normalize_outcome(&json!({"yearsToAdvance": 0}), Category::Life);
        assert_eq!(o.years_to_advance, 2);
        let o = normalize_outcome(&json!({"yearsToAdvance": -3}), Category::Life);
        assert_eq!(o.years_to_advance, 1);
        let o = normalize_outcome(&json!({"yearsToAdvance": "4"}), Category::Life);
        assert_eq!(o.years_to_advance, 4);
    }

    #[test]
    fn empty_achievements_yield_life_explorer() {
        let i = normalize_insights(&json!({"achievements": []}));
        assert_eq!(i.achievements.len(), 1);
        assert_eq!(i.achievements[0].title, "Life Explorer");
        assert_eq!(i.achievements[0].rarity, Rarity::Common);
        assert_eq!(i.insights, vec!["Your journey was unique."]);
        assert_eq!(i.life_score, 50);
    }

    #[test]
    fn insights_sliced_and_clamped() {
        let raw = json!({
            "insights": ["1", "2", "3", "4", "5", "6"],
            "lifeScore": 180,
            "achievements": [
                {"title": "A", "rarity": "epic"},
                {"rarity": "mythic"},
                {}, {}, {}
            ]
        });
        let i = normalize_insights(&raw);
        assert_eq!(i.insights.len(), 5);
        assert_eq!(i.life_score, 100);
        assert_eq!(i.achievements.len(), 4);
        assert_eq!(i.achievements[0].rarity, Rarity::Epic);
        assert_eq!(i.achievements[1].title, "Life Experience");
        assert_eq!(i.achievements[1].description, "You lived and learned.");
        assert_eq!(i.achievements[1].rarity, Rarity::Common);
    }

    #[test]
    fn empty_insights_list_gets_fallback_sentence() {
        let i = normalize_insights(&json!({"insights": [], "lifeScore": "72"}));
        assert_eq!(
            i.insights,
            vec!["Every choice matters in the grand scheme of life."]
        );
        assert_eq!(i.life_score, 72);
    }

    #[test]
    fn parse_wrappers_fail_only_without_json() {
        assert!(parse_scenario("the model refused").is_err());
        let o = parse_outcome("Result:\n{\"impact\":\"negative\"}", Category::Career).unwrap();
        assert_eq!(o.stat_changes[0], StatChange::new(StatKey::Career, -5, "The result of your choice"));
        assert!(parse_insights("```{}```").is_ok());
    }

    proptest! {
        #[test]
        fn outcome_changes_always_bounded(change in proptest::num::f64::ANY,
                                          years in proptest::num::f64::ANY) {
            let raw = json!({
                "statChanges": [{"stat": "money", "change": change}],
                "yearsToAdvance": years
            });
            let o = normalize_outcome(&raw, Category::Money);
            for sc in &o.stat_changes {
                prop_assert!((-20..=20).contains(&sc.change));
            }
            prop_assert!((1..=5).contains(&o.years_to_advance));
        }
    }
}
