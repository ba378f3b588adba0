#![deny(warnings)]

//! Simulation runtime: the state machine, the orchestration loop that
//! feeds it from a generator, and runtime configuration.

pub mod config;
pub mod machine;
pub mod orchestrator;

pub use config::{ConfigError, LifeSimConfig};
pub use machine::{
    Continuation, Phase, SimulationState, SimulationStateMachine, StateChange, TransitionError,
};
pub use orchestrator::{Orchestrator, Resolution, Step};
