//! Stat model: bounded life stats with a derived happiness score.

use serde::{Deserialize, Serialize};

use crate::StatKey;

/// Inclusive lower bound of every stat.
pub const STAT_MIN: i32 = 0;
/// Inclusive upper bound of every stat.
pub const STAT_MAX: i32 = 100;

/// Stats every simulation starts from.
pub const INITIAL_STATS: LifeStats = LifeStats::from_clamped(50, 80, 40, 60);

/// Weighted happiness: 0.2 money + 0.3 health + 0.2 career + 0.3 relationships,
/// rounded half up. Computed in tenths to stay exact.
pub const fn derive_happiness(money: i32, health: i32, career: i32, relationships: i32) -> i32 {
    (2 * money + 3 * health + 2 * career + 3 * relationships + 5) / 10
}

/// One requested stat delta with the reason shown to the user.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatChange {
    pub stat: StatKey,
    pub change: i32,
    pub reason: String,
}

impl StatChange {
    pub fn new(stat: StatKey, change: i32, reason: impl Into<String>) -> Self {
        Self {
            stat,
            change,
            reason: reason.into(),
        }
    }
}

/// The four base stats without happiness, as sent to the generator.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BaseStats {
    pub money: i32,
    pub health: i32,
    pub career: i32,
    pub relationships: i32,
}

/// Life stats. Fields are private so happiness can never drift from the
/// four base dimensions: every constructor and update recomputes it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "BaseStats")]
pub struct LifeStats {
    money: i32,
    health: i32,
    career: i32,
    relationships: i32,
    happiness: i32,
}

impl Default for LifeStats {
    fn default() -> Self {
        INITIAL_STATS
    }
}

impl From<BaseStats> for LifeStats {
    fn from(b: BaseStats) -> Self {
        LifeStats::new(b.money, b.health, b.career, b.relationships)
    }
}

const fn clamp_stat(v: i32) -> i32 {
    if v < STAT_MIN {
        STAT_MIN
    } else if v > STAT_MAX {
        STAT_MAX
    } else {
        v
    }
}

impl LifeStats {
    const fn from_clamped(money: i32, health: i32, career: i32, relationships: i32) -> Self {
        let money = clamp_stat(money);
        let health = clamp_stat(health);
        let career = clamp_stat(career);
        let relationships = clamp_stat(relationships);
        Self {
            money,
            health,
            career,
            relationships,
            happiness: derive_happiness(money, health, career, relationships),
        }
    }

    /// Build stats from raw values; each is clamped to [0, 100].
    pub fn new(money: i32, health: i32, career: i32, relationships: i32) -> Self {
        Self::from_clamped(money, health, career, relationships)
    }

    pub fn money(&self) -> i32 {
        self.money
    }

    pub fn health(&self) -> i32 {
        self.health
    }

    pub fn career(&self) -> i32 {
        self.career
    }

    pub fn relationships(&self) -> i32 {
        self.relationships
    }

    pub fn happiness(&self) -> i32 {
        self.happiness
    }

    pub fn get(&self, key: StatKey) -> i32 {
        match key {
            StatKey::Money => self.money,
            StatKey::Health => self.health,
            StatKey::Career => self.career,
            StatKey::Relationships => self.relationships,
        }
    }

    pub fn base(&self) -> BaseStats {
        BaseStats {
            money: self.money,
            health: self.health,
            career: self.career,
            relationships: self.relationships,
        }
    }

    /// Rounded mean of the four base stats.
    pub fn average(&self) -> i32 {
        (self.money + self.health + self.career + self.relationships + 2) / 4
    }

    /// Apply deltas in order, clamping after each one, and return the new
    /// stats. `self` is left untouched.
    pub fn apply_changes(&self, changes: &[StatChange]) -> LifeStats {
        let mut next = *self;
        for c in changes {
            let slot = match c.stat {
                StatKey::Money => &mut next.money,
                StatKey::Health => &mut next.health,
                StatKey::Career => &mut next.career,
                StatKey::Relationships => &mut next.relationships,
            };
            *slot = clamp_stat(slot.saturating_add(c.change));
        }
        LifeStats::new(next.money, next.health, next.career, next.relationships)
    }
}
