//! Drives the generator through the state machine.
//!
//! Each generator call goes through the prompt/validate pipeline. Any
//! failure is logged and replaced by the matching [`fallback`] response,
//! so a session always gets a usable scenario, outcome and insight set.
//! When a store is attached the session is saved after every mutation.

use std::sync::Arc;

use life_ai::{
    fallback, generate_insights, generate_scenario, process_choice, CallKind, ChoiceSummary,
    GenerateInsightsRequest, GenerateScenarioRequest, GeneratedScenario, Generator, Insights,
    ProcessChoiceRequest, TimelineDigest,
};
use life_core::{Gender, LifeScenario, Outcome, SimulationResult, TimelineEvent};
use persistence::{SaveStore, DEFAULT_SAVE_KEY};
use tracing::{debug, warn};

use crate::machine::{Continuation, Phase, SimulationStateMachine, TransitionError};

/// What happens after an outcome has been seen.
#[derive(Clone, Debug, PartialEq)]
pub enum Step {
    Scenario(LifeScenario),
    Finished(SimulationResult),
}

/// A resolved choice: the outcome applied and the event it produced.
#[derive(Clone, Debug, PartialEq)]
pub struct Resolution {
    pub outcome: Outcome,
    pub event: TimelineEvent,
    pub age: u32,
}

pub struct Orchestrator {
    machine: SimulationStateMachine,
    generator: Arc<dyn Generator>,
    store: Option<Arc<dyn SaveStore>>,
    save_key: String,
}

fn log_fallback(kind: CallKind, error: &dyn std::fmt::Display) {
    warn!(call = kind.as_str(), error = %error, "generator call failed, using fallback");
}

impl Orchestrator {
    pub fn new(machine: SimulationStateMachine, generator: Arc<dyn Generator>) -> Self {
        Self {
            machine,
            generator,
            store: None,
            save_key: DEFAULT_SAVE_KEY.to_string(),
        }
    }

    pub fn with_store(mut self, store: Arc<dyn SaveStore>, save_key: impl Into<String>) -> Self {
        self.store = Some(store);
        self.save_key = save_key.into();
        self
    }

    pub fn machine(&self) -> &SimulationStateMachine {
        &self.machine
    }

    pub fn phase(&self) -> Phase {
        self.machine.phase()
    }

    async fn save(&self) {
        let Some(store) = &self.store else {
            return;
        };
        if let Err(e) = store.save(&self.save_key, &self.machine.snapshot()).await {
            warn!(key = %self.save_key, error = %e, "failed to save session");
        }
    }

    fn checked<T>(result: Result<T, TransitionError>) -> Result<T, TransitionError> {
        if let Err(e) = &result {
            warn!(error = %e, "transition rejected");
        }
        result
    }

    /// Load the stored session, if any. Returns the phase it resumes in.
    pub async fn resume(&mut self) -> Phase {
        if let Some(store) = &self.store {
            match store.load(&self.save_key).await {
                Ok(Some(saved)) => self.machine.restore(saved),
                Ok(None) => debug!(key = %self.save_key, "no stored session"),
                Err(e) => warn!(key = %self.save_key, error = %e, "failed to load session"),
            }
        }
        self.machine.phase()
    }

    /// Create a profile, start the simulation and fetch the first scenario.
    pub async fn begin(
        &mut self,
        name: &str,
        gender: Gender,
        start_age: u32,
        target_age: u32,
    ) -> Result<LifeScenario, TransitionError> {
        let profile = self.machine.create_profile(name, gender, start_age);
        Self::checked(self.machine.start(profile, start_age, target_age))?;
        self.save().await;
        self.next_scenario().await
    }

    fn bind(&mut self, generated: GeneratedScenario) -> LifeScenario {
        let id = self.machine.next_id("scenario");
        let choices = generated
            .choices
            .into_iter()
            .map(|c| {
                let id = self.machine.next_id("choice");
                c.into_choice(id)
            })
            .collect();
        LifeScenario {
            id,
            title: generated.title,
            description: generated.description,
            context: generated.context,
            choices,
        }
    }

    /// Request a scenario for the current age and make it current. Fails
    /// with [`TransitionError::TargetReached`] once the target age is hit.
    pub async fn next_scenario(&mut self) -> Result<LifeScenario, TransitionError> {
        if self.machine.phase() != Phase::Playing {
            return Self::checked(Err(TransitionError::InvalidPhase {
                op: "next_scenario",
                phase: self.machine.phase(),
            }));
        }
        // At the target only `proceed` may run; it finishes the simulation.
        Self::checked(self.machine.check_below_target())?;
        let state = self.machine.state();
        let req = GenerateScenarioRequest {
            current_age: state.current_age,
            stats: state.stats.base(),
            previous_choices: state.previous_choices(),
            timeline_context: state.timeline_context(),
        };
        let generated = match generate_scenario(self.generator.as_ref(), &req).await {
            Ok(s) => s,
            Err(e) => {
                log_fallback(CallKind::Scenario, &e);
                fallback::scenario()
            }
        };
        let scenario = self.bind(generated);
        Self::checked(self.machine.set_scenario(scenario.clone()))?;
        self.save().await;
        Ok(scenario)
    }

    /// Resolve the choice with `choice_id` on the current scenario and
    /// advance age by the outcome's years.
    pub async fn choose(&mut self, choice_id: &str) -> Result<Resolution, TransitionError> {
        if self.machine.phase() != Phase::Playing {
            return Self::checked(Err(TransitionError::InvalidPhase {
                op: "choose",
                phase: self.machine.phase(),
            }));
        }
        let choice = match self.machine.current_scenario() {
            None => return Self::checked(Err(TransitionError::NoCurrentScenario)),
            Some(s) => match s.choice(choice_id) {
                Some(c) => c.clone(),
                None => {
                    return Self::checked(Err(TransitionError::ChoiceNotInScenario(
                        choice_id.to_string(),
                    )))
                }
            },
        };
        let state = self.machine.state();
        let req = ProcessChoiceRequest {
            choice: ChoiceSummary::from(&choice),
            current_age: state.current_age,
            stats: state.stats.base(),
            timeline_context: state.timeline_context(),
        };
        let outcome = match process_choice(self.generator.as_ref(), &req).await {
            Ok(o) => o,
            Err(e) => {
                log_fallback(CallKind::Outcome, &e);
                fallback::outcome(&req.choice, self.machine.rng())
            }
        };
        let event = Self::checked(self.machine.record_choice(&choice, outcome.clone()))?;
        let age = Self::checked(self.machine.advance_age(outcome.years_to_advance))?;
        self.save().await;
        Ok(Resolution {
            outcome,
            event,
            age,
        })
    }

    async fn insights(&mut self) -> Insights {
        let state = self.machine.state();
        let req = GenerateInsightsRequest {
            timeline: state.timeline.iter().map(TimelineDigest::from).collect(),
            final_stats: state.stats.base(),
            choices: state.previous_choices(),
        };
        match generate_insights(self.generator.as_ref(), &req).await {
            Ok(i) => i,
            Err(e) => {
                log_fallback(CallKind::Insights, &e);
                fallback::insights(&req.final_stats)
            }
        }
    }

    /// Either finish the simulation with insights or fetch the next
    /// scenario.
    pub async fn proceed(&mut self) -> Result<Step, TransitionError> {
        let phase = self.machine.phase();
        if !matches!(phase, Phase::Playing | Phase::Outcome) {
            return Self::checked(Err(TransitionError::InvalidPhase {
                op: "proceed",
                phase,
            }));
        }
        if self.machine.state().reached_target() {
            let insights = self.insights().await;
            Self::checked(self.machine.continue_or_complete())?;
            let result = Self::checked(self.machine.record_insights(insights))?;
            self.save().await;
            return Ok(Step::Finished(result));
        }
        match Self::checked(self.machine.continue_or_complete())? {
            Continuation::Continue => {
                self.save().await;
                Ok(Step::Scenario(self.next_scenario().await?))
            }
            // reached_target was false above
            Continuation::Completed => Err(TransitionError::NotComplete),
        }
    }

    /// Wipe the session and its stored copy.
    pub async fn reset(&mut self) {
        self.machine.reset();
        if let Some(store) = &self.store {
            if let Err(e) = store.clear(&self.save_key).await {
                warn!(key = %self.save_key, error = %e, "failed to clear session");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use life_ai::{GenerationError, OfflineGenerator, ScriptedGenerator};
    use life_core::{Impact, RiskLevel, ScoreGrade, StatKey};
    use persistence::MemorySaveStore;

    const SCENARIO: &str = r#"{"title":"Job offer abroad","choices":[
        {"text":"Move to Lisbon","riskLevel":"high","category":"career"},
        {"text":"Stay home","riskLevel":"low","category":"relationships"}]}"#;
    const OUTCOME: &str = r#"Result: {"title":"New life","statChanges":[{"stat":"career","change":15,"reason":"Promotion"}],"impact":"positive","yearsToAdvance":5}"#;
    const INSIGHTS: &str = r#"{"insights":["You were brave."],"lifeScore":91,"achievements":[{"title":"Globetrotter","rarity":"rare"}]}"#;

    fn orchestrator(generator: Arc<dyn Generator>) -> Orchestrator {
        Orchestrator::new(
            SimulationStateMachine::with_seed(42).with_base_year(2030),
            generator,
        )
    }

    #[tokio::test]
    async fn full_run_with_generated_responses() {
        let g = Arc::new(ScriptedGenerator::from_texts([SCENARIO, OUTCOME, INSIGHTS]));
        let mut o = orchestrator(g.clone());
        let s = o.begin("Ada", Gender::Female, 60, 65).await.unwrap();
        assert_eq!(s.title, "Job offer abroad");
        assert_eq!(s.choices.len(), 2);

        let r = o.choose(&s.choices[0].id).await.unwrap();
        assert_eq!(r.age, 65);
        assert_eq!(r.event.impact, Impact::Positive);
        assert_eq!(o.machine().state().stats.career(), 55);

        let Step::Finished(result) = o.proceed().await.unwrap() else {
            panic!("expected completion");
        };
        assert_eq!(result.life_score, 91);
        assert_eq!(result.grade, ScoreGrade::S);
        assert_eq!(result.achievements[0].title, "Globetrotter");
        assert_eq!(o.phase(), Phase::Results);
        assert!(o.machine().state().simulation_complete);
        assert_eq!(g.remaining(), 0);
        assert!(g.prompts()[1].contains("Move to Lisbon"));
    }

    #[tokio::test]
    async fn failures_fall_back_and_never_stall() {
        let mut o = orchestrator(Arc::new(OfflineGenerator));
        let s = o.begin("", Gender::Other, 25, 30).await.unwrap();
        assert_eq!(s.title, "A Crossroads Moment");
        assert_eq!(s.choices.len(), 3);

        let safe = s
            .choices
            .iter()
            .find(|c| c.risk_level == RiskLevel::Low)
            .unwrap()
            .id
            .clone();
        let r = o.choose(&safe).await.unwrap();
        assert_eq!(r.outcome.title, "Life Goes On");
        assert_eq!(r.outcome.stat_changes[0].stat, StatKey::Relationships);
        assert_eq!(r.age, 27);

        let mut steps = 0;
        let result = loop {
            match o.proceed().await.unwrap() {
                Step::Scenario(s) => {
                    o.choose(&s.choices[0].id).await.unwrap();
                }
                Step::Finished(r) => break r,
            }
            steps += 1;
            assert!(steps < 10);
        };
        let base = o.machine().state().stats.base();
        assert_eq!(result.life_score, fallback::insights(&base).life_score);
        assert_eq!(result.achievements[0].title, "Life Explorer");
        assert_eq!(o.machine().state().current_age, 31);
    }

    #[tokio::test]
    async fn unparseable_text_uses_fallback() {
        let g = Arc::new(ScriptedGenerator::new(vec![
            Ok("no json here".to_string()),
            Err(GenerationError::Status {
                status: 503,
                message: "overloaded".to_string(),
            }),
        ]));
        let mut o = orchestrator(g);
        let s = o.begin("Ada", Gender::Female, 25, 65).await.unwrap();
        assert_eq!(s.title, "A Crossroads Moment");
        let r = o.choose(&s.choices[1].id).await.unwrap();
        assert_eq!(r.outcome.impact, Impact::Neutral);
        assert_eq!(r.outcome.stat_changes[0].change, 5);
    }

    #[tokio::test]
    async fn invalid_calls_are_rejected_without_generation() {
        let g = Arc::new(ScriptedGenerator::from_texts([SCENARIO]));
        let mut o = orchestrator(g.clone());
        assert!(matches!(
            o.next_scenario().await,
            Err(TransitionError::InvalidPhase { .. })
        ));
        assert!(matches!(
            o.choose("nope").await,
            Err(TransitionError::InvalidPhase { .. })
        ));
        o.begin("Ada", Gender::Female, 25, 65).await.unwrap();
        assert_eq!(
            o.choose("nope").await,
            Err(TransitionError::ChoiceNotInScenario("nope".to_string()))
        );
        assert!(g.prompts().len() == 1);
    }

    #[tokio::test]
    async fn saves_after_mutations_and_resumes() {
        let store = Arc::new(MemorySaveStore::new());
        let mut o = orchestrator(Arc::new(OfflineGenerator)).with_store(store.clone(), "test");
        let s = o.begin("Ada", Gender::Female, 25, 65).await.unwrap();
        o.choose(&s.choices[0].id).await.unwrap();

        let saved = store.load("test").await.unwrap().unwrap();
        assert_eq!(saved.timeline.len(), 1);
        assert_eq!(saved.current_age, 27);

        let mut again = orchestrator(Arc::new(OfflineGenerator)).with_store(store.clone(), "test");
        assert_eq!(again.resume().await, Phase::Playing);
        assert!(again.machine().current_scenario().is_none());
        let next = again.next_scenario().await.unwrap();
        assert_eq!(next.choices.len(), 3);

        again.reset().await;
        assert_eq!(again.phase(), Phase::Idle);
        assert_eq!(store.load("test").await.unwrap(), None);
    }

    #[tokio::test]
    async fn resume_at_target_finishes_instead_of_playing_on() {
        let store = Arc::new(MemorySaveStore::new());
        let mut o = orchestrator(Arc::new(OfflineGenerator)).with_store(store.clone(), "late");
        let s = o.begin("Ada", Gender::Female, 25, 27).await.unwrap();
        // Stops after the age advance, before proceed runs.
        assert_eq!(o.choose(&s.choices[0].id).await.unwrap().age, 27);

        let mut again = orchestrator(Arc::new(OfflineGenerator)).with_store(store.clone(), "late");
        assert_eq!(again.resume().await, Phase::Playing);
        assert_eq!(
            again.next_scenario().await,
            Err(TransitionError::TargetReached { age: 27, target: 27 })
        );
        let Step::Finished(result) = again.proceed().await.unwrap() else {
            panic!("expected completion at the target age");
        };
        assert_eq!(result.summary.total, 1);
        let state = again.machine().state();
        assert_eq!(state.current_age, 27);
        assert_eq!(state.timeline.len(), 1);
        assert!(state.simulation_complete);
        assert!(store.load("late").await.unwrap().unwrap().simulation_complete);
    }

    #[tokio::test]
    async fn resume_without_store_stays_idle() {
        let mut o = orchestrator(Arc::new(OfflineGenerator));
        assert_eq!(o.resume().await, Phase::Idle);
    }
}
