//! The simulation aggregate and its transition operations.
//!
//! Every operation checks its phase and returns a [`TransitionError`]
//! instead of mutating when called out of sequence. Successful transitions
//! are announced on a broadcast channel for any observer that subscribed.

use chrono::{Datelike, Utc};
use life_ai::validate::MIN_CHOICES;
use life_ai::Insights;
use life_core::{
    validate_ages, Achievement, Choice, Gender, Impact, LifeScenario, LifeStats, Outcome, ScoreGrade,
    SimulationResult, TimelineEvent, TimelineSummary, UserProfile, ValidationError, INITIAL_STATS,
};
use persistence::PersistedState;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::Serialize;
use thiserror::Error;
use tokio::sync::broadcast;
use tracing::{debug, info};

pub const DEFAULT_START_AGE: u32 = 25;
pub const DEFAULT_TARGET_AGE: u32 = 65;

pub const METER_MIN: i32 = 0;
pub const METER_MAX: i32 = 100;
/// Meter increments are drawn from `METER_STEP_MIN..METER_STEP_END`.
pub const METER_STEP_MIN: i32 = 10;
pub const METER_STEP_END: i32 = 20;

/// Number of trailing events summarized for the generator.
pub const CONTEXT_EVENTS: usize = 3;

const ANONYMOUS: &str = "Anonymous";
const ACHIEVEMENT_ICON: &str = "🏆";
const NOTIFY_CAPACITY: usize = 64;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    /// No simulation running. Also the state after `reset`.
    Idle,
    /// Waiting for a scenario, or for a choice on the current one.
    Playing,
    /// A choice was resolved; age may advance before continuing.
    Outcome,
    Results,
}

/// The aggregate root of one session.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SimulationState {
    pub profile: Option<UserProfile>,
    pub current_age: u32,
    pub start_age: u32,
    pub target_age: u32,
    pub stats: LifeStats,
    pub timeline: Vec<TimelineEvent>,
    pub current_scenario: Option<LifeScenario>,
    pub regret_meter: i32,
    pub reward_meter: i32,
    pub is_simulating: bool,
    pub simulation_complete: bool,
}

impl Default for SimulationState {
    fn default() -> Self {
        Self {
            profile: None,
            current_age: DEFAULT_START_AGE,
            start_age: DEFAULT_START_AGE,
            target_age: DEFAULT_TARGET_AGE,
            stats: INITIAL_STATS,
            timeline: Vec::new(),
            current_scenario: None,
            regret_meter: 0,
            reward_meter: 0,
            is_simulating: false,
            simulation_complete: false,
        }
    }
}

impl SimulationState {
    /// "title: description" of the last few events, space separated.
    pub fn timeline_context(&self) -> String {
        let skip = self.timeline.len().saturating_sub(CONTEXT_EVENTS);
        self.timeline[skip..]
            .iter()
            .map(|e| format!("{}: {}", e.title, e.description))
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Texts of every choice made so far, oldest first.
    pub fn previous_choices(&self) -> Vec<String> {
        self.timeline
            .iter()
            .filter_map(|e| e.choice_made.as_ref().map(|c| c.text.clone()))
            .collect()
    }

    pub fn reached_target(&self) -> bool {
        self.current_age >= self.target_age
    }
}

#[derive(Debug, Error, PartialEq)]
pub enum TransitionError {
    #[error("{op} is not valid in the {phase:?} phase")]
    InvalidPhase { op: &'static str, phase: Phase },
    #[error("no scenario is current")]
    NoCurrentScenario,
    #[error("choice {0} is not part of the current scenario")]
    ChoiceNotInScenario(String),
    #[error(transparent)]
    InvalidAges(#[from] ValidationError),
    #[error("scenario has {0} choices, at least 2 are required")]
    TooFewChoices(usize),
    #[error("age {age} has reached the target age {target}")]
    TargetReached { age: u32, target: u32 },
    #[error("simulation has not completed")]
    NotComplete,
    #[error("results were already recorded")]
    ResultsAlreadyRecorded,
}

/// Notification emitted after each successful transition.
#[derive(Clone, Debug, PartialEq)]
pub enum StateChange {
    Started { start_age: u32, target_age: u32 },
    ScenarioSet { scenario_id: String },
    ChoiceRecorded { event_id: String, impact: Impact },
    AgeAdvanced { from: u32, to: u32 },
    Continued,
    Completed { age: u32 },
    ResultsRecorded { life_score: i32 },
    Restored { phase: Phase },
    Reset,
}

/// Result of [`SimulationStateMachine::continue_or_complete`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Continuation {
    Continue,
    Completed,
}

fn clamp_meter(v: i32) -> i32 {
    v.clamp(METER_MIN, METER_MAX)
}

#[derive(Debug)]
pub struct SimulationStateMachine {
    state: SimulationState,
    phase: Phase,
    result: Option<SimulationResult>,
    rng: ChaCha8Rng,
    base_year: i32,
    notify: broadcast::Sender<StateChange>,
}

impl SimulationStateMachine {
    pub fn new(rng: ChaCha8Rng) -> Self {
        let (notify, _) = broadcast::channel(NOTIFY_CAPACITY);
        Self {
            state: SimulationState::default(),
            phase: Phase::Idle,
            result: None,
            rng,
            base_year: Utc::now().year(),
            notify,
        }
    }

    pub fn with_seed(seed: u64) -> Self {
        Self::new(ChaCha8Rng::seed_from_u64(seed))
    }

    /// Pin the calendar year events are dated from.
    pub fn with_base_year(mut self, year: i32) -> Self {
        self.base_year = year;
        self
    }

    pub fn subscribe(&self) -> broadcast::Receiver<StateChange> {
        self.notify.subscribe()
    }

    pub fn state(&self) -> &SimulationState {
        &self.state
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn result(&self) -> Option<&SimulationResult> {
        self.result.as_ref()
    }

    pub fn current_scenario(&self) -> Option<&LifeScenario> {
        self.state.current_scenario.as_ref()
    }

    pub(crate) fn rng(&mut self) -> &mut ChaCha8Rng {
        &mut self.rng
    }

    pub(crate) fn next_id(&mut self, prefix: &str) -> String {
        format!("{prefix}-{:016x}", self.rng.gen::<u64>())
    }

    fn emit(&self, change: StateChange) {
        // No subscribers is fine.
        let _ = self.notify.send(change);
    }

    fn require(&self, op: &'static str, allowed: &[Phase]) -> Result<(), TransitionError> {
        if allowed.contains(&self.phase) {
            Ok(())
        } else {
            Err(TransitionError::InvalidPhase {
                op,
                phase: self.phase,
            })
        }
    }

    /// Build a profile with ids drawn from the machine's rng.
    pub fn create_profile(&mut self, name: &str, gender: Gender, age: u32) -> UserProfile {
        let name = name.trim();
        UserProfile {
            id: self.next_id("user"),
            name: if name.is_empty() {
                ANONYMOUS.to_string()
            } else {
                name.to_string()
            },
            age,
            gender,
            avatar_seed: format!("{:016x}", self.rng.gen::<u64>()),
            created_at: Utc::now(),
        }
    }

    pub fn start(
        &mut self,
        mut profile: UserProfile,
        start_age: u32,
        target_age: u32,
    ) -> Result<(), TransitionError> {
        self.require("start", &[Phase::Idle, Phase::Results])?;
        validate_ages(start_age, target_age)?;
        profile.age = start_age;
        self.state = SimulationState {
            profile: Some(profile),
            current_age: start_age,
            start_age,
            target_age,
            is_simulating: true,
            ..SimulationState::default()
        };
        self.result = None;
        self.phase = Phase::Playing;
        info!(start_age, target_age, "simulation started");
        self.emit(StateChange::Started {
            start_age,
            target_age,
        });
        Ok(())
    }

    pub(crate) fn check_below_target(&self) -> Result<(), TransitionError> {
        if self.state.reached_target() {
            return Err(TransitionError::TargetReached {
                age: self.state.current_age,
                target: self.state.target_age,
            });
        }
        Ok(())
    }

    /// Replace the current scenario. Only valid below the target age.
    pub fn set_scenario(&mut self, scenario: LifeScenario) -> Result<(), TransitionError> {
        self.require("set_scenario", &[Phase::Playing])?;
        self.check_below_target()?;
        if scenario.choices.len() < MIN_CHOICES {
            return Err(TransitionError::TooFewChoices(scenario.choices.len()));
        }
        debug!(scenario = %scenario.id, choices = scenario.choices.len(), "scenario set");
        let scenario_id = scenario.id.clone();
        self.state.current_scenario = Some(scenario);
        self.emit(StateChange::ScenarioSet { scenario_id });
        Ok(())
    }

    /// Resolve `choice` with `outcome`, appending one timeline event.
    pub fn record_choice(
        &mut self,
        choice: &Choice,
        outcome: Outcome,
    ) -> Result<TimelineEvent, TransitionError> {
        self.require("record_choice", &[Phase::Playing])?;
        let scenario = self
            .state
            .current_scenario
            .as_ref()
            .ok_or(TransitionError::NoCurrentScenario)?;
        if scenario.choice(&choice.id) != Some(choice) {
            return Err(TransitionError::ChoiceNotInScenario(choice.id.clone()));
        }

        let elapsed = self.state.current_age.saturating_sub(self.state.start_age);
        let event = TimelineEvent {
            id: self.next_id("event"),
            year: i32::try_from(elapsed)
                .map(|e| self.base_year.saturating_add(e))
                .unwrap_or(i32::MAX),
            age: self.state.current_age,
            title: outcome.title,
            description: outcome.description,
            category: choice.category,
            impact: outcome.impact,
            stat_changes: outcome.stat_changes,
            choice_made: Some(choice.clone()),
        };
        self.state.stats = self.state.stats.apply_changes(&event.stat_changes);
        match event.impact {
            Impact::Positive => {
                let step = self.rng.gen_range(METER_STEP_MIN..METER_STEP_END);
                self.state.reward_meter = clamp_meter(self.state.reward_meter + step);
            }
            Impact::Negative => {
                let step = self.rng.gen_range(METER_STEP_MIN..METER_STEP_END);
                self.state.regret_meter = clamp_meter(self.state.regret_meter + step);
            }
            Impact::Neutral => {}
        }
        self.state.timeline.push(event.clone());
        self.state.current_scenario = None;
        self.phase = Phase::Outcome;
        debug!(
            event = %event.id,
            impact = event.impact.as_str(),
            regret = self.state.regret_meter,
            reward = self.state.reward_meter,
            "choice recorded"
        );
        self.emit(StateChange::ChoiceRecorded {
            event_id: event.id.clone(),
            impact: event.impact,
        });
        Ok(event)
    }

    /// Move the clock forward. Returns the new age.
    pub fn advance_age(&mut self, years: u32) -> Result<u32, TransitionError> {
        self.require("advance_age", &[Phase::Playing, Phase::Outcome])?;
        let from = self.state.current_age;
        let to = from.saturating_add(years);
        self.state.current_age = to;
        if let Some(profile) = self.state.profile.as_mut() {
            profile.age = to;
        }
        debug!(from, to, "age advanced");
        self.emit(StateChange::AgeAdvanced { from, to });
        Ok(to)
    }

    /// Finish once the target age is reached, otherwise go back to playing.
    pub fn continue_or_complete(&mut self) -> Result<Continuation, TransitionError> {
        self.require("continue_or_complete", &[Phase::Playing, Phase::Outcome])?;
        if self.state.reached_target() {
            self.state.simulation_complete = true;
            self.state.is_simulating = false;
            self.state.current_scenario = None;
            self.phase = Phase::Results;
            info!(age = self.state.current_age, events = self.state.timeline.len(), "simulation complete");
            self.emit(StateChange::Completed {
                age: self.state.current_age,
            });
            Ok(Continuation::Completed)
        } else {
            self.phase = Phase::Playing;
            self.emit(StateChange::Continued);
            Ok(Continuation::Continue)
        }
    }

    /// Freeze the final results of a completed simulation.
    pub fn record_insights(&mut self, insights: Insights) -> Result<SimulationResult, TransitionError> {
        if self.phase != Phase::Results || !self.state.simulation_complete {
            return Err(TransitionError::NotComplete);
        }
        if self.result.is_some() {
            return Err(TransitionError::ResultsAlreadyRecorded);
        }
        let unlocked_at = self.state.current_age;
        let achievements = insights
            .achievements
            .into_iter()
            .map(|a| Achievement {
                id: self.next_id("achievement"),
                title: a.title,
                description: a.description,
                icon: ACHIEVEMENT_ICON.to_string(),
                unlocked_at,
                rarity: a.rarity,
            })
            .collect();
        let result = SimulationResult {
            final_stats: self.state.stats,
            life_score: insights.life_score,
            grade: ScoreGrade::from_score(insights.life_score),
            insights: insights.insights,
            achievements,
            summary: TimelineSummary::from_events(&self.state.timeline),
        };
        info!(life_score = result.life_score, grade = result.grade.label(), "results recorded");
        self.result = Some(result.clone());
        self.emit(StateChange::ResultsRecorded {
            life_score: result.life_score,
        });
        Ok(result)
    }

    /// Back to Idle from any phase.
    pub fn reset(&mut self) {
        self.state = SimulationState::default();
        self.result = None;
        self.phase = Phase::Idle;
        info!("simulation reset");
        self.emit(StateChange::Reset);
    }

    /// Rebuild from a stored session. The scenario is never stored, so an
    /// unfinished session resumes in Playing and needs a fresh one.
    pub fn restore(&mut self, saved: PersistedState) {
        let phase = if saved.simulation_complete {
            Phase::Results
        } else if saved.profile.is_some() {
            Phase::Playing
        } else {
            Phase::Idle
        };
        self.state = SimulationState {
            profile: saved.profile,
            current_age: saved.current_age,
            start_age: saved.start_age,
            target_age: saved.target_age,
            stats: saved.stats,
            timeline: saved.timeline,
            current_scenario: None,
            regret_meter: clamp_meter(saved.regret_meter),
            reward_meter: clamp_meter(saved.reward_meter),
            is_simulating: phase == Phase::Playing,
            simulation_complete: saved.simulation_complete,
        };
        self.result = None;
        self.phase = phase;
        info!(?phase, age = self.state.current_age, "session restored");
        self.emit(StateChange::Restored { phase });
    }

    /// The persisted subset of the current state.
    pub fn snapshot(&self) -> PersistedState {
        PersistedState {
            profile: self.state.profile.clone(),
            timeline: self.state.timeline.clone(),
            stats: self.state.stats,
            current_age: self.state.current_age,
            start_age: self.state.start_age,
            target_age: self.state.target_age,
            regret_meter: self.state.regret_meter,
            reward_meter: self.state.reward_meter,
            simulation_complete: self.state.simulation_complete,
        }
    }
}
