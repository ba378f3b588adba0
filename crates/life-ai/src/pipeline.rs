//! Prompt, call and validate in one step for each call kind.
//!
//! These functions surface failures to the caller. The HTTP surface turns
//! them into error responses; the simulation runtime substitutes the
//! matching entry from [`crate::fallback`].

use life_core::Outcome;
use thiserror::Error;
use tracing::debug;

use crate::contract::{
    CallKind, GenerateInsightsRequest, GenerateScenarioRequest, GeneratedScenario, Insights,
    ProcessChoiceRequest,
};
use crate::extract::ParseError;
use crate::generator::{GenerationError, Generator};
use crate::prompt;
use crate::validate;

/// Either the collaborator failed or its text held no JSON object.
#[derive(Debug, Error)]
pub enum GenerateError {
    #[error(transparent)]
    Generation(#[from] GenerationError),
    #[error(transparent)]
    Parse(#[from] ParseError),
}

async fn call(generator: &dyn Generator, kind: CallKind, prompt: String) -> Result<String, GenerationError> {
    debug!(call = kind.as_str(), prompt_len = prompt.len(), "requesting generation");
    let raw = generator.generate_content(&prompt).await?;
    debug!(call = kind.as_str(), response_len = raw.len(), "generation returned");
    Ok(raw)
}

pub async fn generate_scenario(
    generator: &dyn Generator,
    req: &GenerateScenarioRequest,
) -> Result<GeneratedScenario, GenerateError> {
    let raw = call(generator, CallKind::Scenario, prompt::scenario_prompt(req)).await?;
    Ok(validate::parse_scenario(&raw)?)
}

pub async fn process_choice(
    generator: &dyn Generator,
    req: &ProcessChoiceRequest,
) -> Result<Outcome, GenerateError> {
    let raw = call(generator, CallKind::Outcome, prompt::outcome_prompt(req)).await?;
    Ok(validate::parse_outcome(&raw, req.choice.category)?)
}

pub async fn generate_insights(
    generator: &dyn Generator,
    req: &GenerateInsightsRequest,
) -> Result<Insights, GenerateError> {
    let raw = call(generator, CallKind::Insights, prompt::insights_prompt(req)).await?;
    Ok(validate::parse_insights(&raw)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::contract::ChoiceSummary;
    use crate::generator::ScriptedGenerator;
    use life_core::{BaseStats, Category, RiskLevel, StatKey};

    fn stats() -> BaseStats {
        BaseStats {
            money: 50,
            health: 80,
            career: 40,
            relationships: 60,
        }
    }

    #[tokio::test]
    async fn scenario_round_trip_through_prompt_and_validator() {
        let g = ScriptedGenerator::from_texts([
            r#"Here: {"title":"New job offer","choices":[{"text":"Accept","riskLevel":"high","category":"career"}]}"#,
        ]);
        let req = GenerateScenarioRequest {
            current_age: 27,
            stats: stats(),
            previous_choices: vec![],
            timeline_context: String::new(),
        };
        let s = generate_scenario(&g, &req).await.unwrap();
        assert_eq!(s.title, "New job offer");
        assert_eq!(s.choices.len(), 2);
        assert!(g.prompts()[0].contains("Age: 27"));
    }

    #[tokio::test]
    async fn outcome_uses_choice_category_for_synthesis() {
        let g = ScriptedGenerator::from_texts([r#"{"impact":"positive"}"#]);
        let req = ProcessChoiceRequest {
            choice: ChoiceSummary {
                id: String::new(),
                text: "Invest".to_string(),
                description: String::new(),
                risk_level: RiskLevel::Medium,
                category: Category::Money,
            },
            current_age: 30,
            stats: stats(),
            timeline_context: String::new(),
        };
        let o = process_choice(&g, &req).await.unwrap();
        assert_eq!(o.stat_changes[0].stat, StatKey::Money);
        assert_eq!(o.stat_changes[0].change, 5);
    }

    #[tokio::test]
    async fn failures_are_classified() {
        let g = ScriptedGenerator::new(vec![
            Err(GenerationError::Empty),
            Ok("I cannot answer that".to_string()),
        ]);
        let req = GenerateInsightsRequest {
            timeline: vec![],
            final_stats: stats(),
            choices: vec![],
        };
        assert!(matches!(
            generate_insights(&g, &req).await,
            Err(GenerateError::Generation(GenerationError::Empty))
        ));
        assert!(matches!(
            generate_insights(&g, &req).await,
            Err(GenerateError::Parse(ParseError::NoObject))
        ));
    }
}
