#![deny(warnings)]

//! Generation collaborator contract and response validation.
//!
//! The generator is an untrusted text source. This crate builds prompts,
//! extracts JSON from whatever comes back, and normalizes it into strict
//! domain values with aggressive defaults. Canned responses for failed calls
//! live in [`fallback`].

pub mod contract;
pub mod extract;
pub mod fallback;
pub mod generator;
pub mod http;
pub mod pipeline;
pub mod prompt;
pub mod validate;

pub use contract::{
    CallKind, ChoiceSummary, GenerateInsightsRequest, GenerateScenarioRequest,
    GenerateScenarioResponse, GeneratedAchievement, GeneratedChoice, GeneratedScenario, Insights,
    ProcessChoiceRequest, ProcessChoiceResponse, TimelineDigest,
};
pub use extract::{extract_object, ParseError};
pub use generator::{GenerationError, Generator, OfflineGenerator, ScriptedGenerator};
pub use http::{GeneratorConfig, HttpGenerator};
pub use pipeline::{generate_insights, generate_scenario, process_choice, GenerateError};
