//! End-of-simulation summary types.

use serde::{Deserialize, Serialize};

use crate::{Achievement, Impact, LifeStats, TimelineEvent};

/// Letter grade for a life score.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScoreGrade {
    S,
    A,
    B,
    C,
    D,
    F,
}

impl ScoreGrade {
    pub fn from_score(score: i32) -> Self {
        match score {
            s if s >= 90 => ScoreGrade::S,
            s if s >= 80 => ScoreGrade::A,
            s if s >= 70 => ScoreGrade::B,
            s if s >= 60 => ScoreGrade::C,
            s if s >= 50 => ScoreGrade::D,
            _ => ScoreGrade::F,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ScoreGrade::S => "Legendary Life!",
            ScoreGrade::A => "Amazing Journey!",
            ScoreGrade::B => "Great Life!",
            ScoreGrade::C => "Good Experience",
            ScoreGrade::D => "Life Lessons",
            ScoreGrade::F => "Hard Times",
        }
    }
}

/// Event counts by impact.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimelineSummary {
    pub total: usize,
    pub positive: usize,
    pub negative: usize,
    pub neutral: usize,
}

impl TimelineSummary {
    pub fn from_events(events: &[TimelineEvent]) -> Self {
        let mut s = TimelineSummary {
            total: events.len(),
            ..Default::default()
        };
        for e in events {
            match e.impact {
                Impact::Positive => s.positive += 1,
                Impact::Negative => s.negative += 1,
                Impact::Neutral => s.neutral += 1,
            }
        }
        s
    }
}

/// Final results, produced once when the simulation completes.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SimulationResult {
    pub final_stats: LifeStats,
    pub life_score: i32,
    pub grade: ScoreGrade,
    pub insights: Vec<String>,
    pub achievements: Vec<Achievement>,
    pub summary: TimelineSummary,
}
