//! Durable learner records: progress, completions, badges and hints

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Badges a learner can unlock
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Badge {
    SpeedRunner,          // Finish a scenario within the time threshold
    HintFreeExpert,       // Finish a scenario without asking for a hint
    Scenario(String),     // Scenario-specific completion badge, by code
}

impl Badge {
    pub const SPEED_RUNNER: &'static str = "speed_runner";
    pub const HINT_FREE_EXPERT: &'static str = "hint_free_expert";

    /// Stable code used as the uniqueness key of an award
    pub fn code(&self) -> &str {
        match self {
            Badge::SpeedRunner => Self::SPEED_RUNNER,
            Badge::HintFreeExpert => Self::HINT_FREE_EXPERT,
            Badge::Scenario(code) => code,
        }
    }

    pub fn from_code(code: &str) -> Self {
        match code {
            Self::SPEED_RUNNER => Badge::SpeedRunner,
            Self::HINT_FREE_EXPERT => Badge::HintFreeExpert,
            other => Badge::Scenario(other.to_string()),
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Badge::SpeedRunner => "Speed Runner",
            Badge::HintFreeExpert => "Hint-Free Expert",
            Badge::Scenario(code) => code,
        }
    }

    pub fn icon(&self) -> &'static str {
        match self {
            Badge::SpeedRunner => "🏃",
            Badge::HintFreeExpert => "🎯",
            Badge::Scenario(_) => "🛡️",
        }
    }
}

/// Completion badge declared by a scenario
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BadgeDefinition {
    pub code: String,
    pub name: String,
    #[serde(default)]
    pub points: i64,
}

/// Proof that a user satisfied a task, created once and never changed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Completion {
    pub user: String,
    pub task_id: String,
    pub scenario_id: String,
    pub score_awarded: i64,
    pub time_ms: u64,
    pub completed_at: DateTime<Utc>,
}

/// A badge granted to a user, unique per (user, badge code)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BadgeAward {
    pub user: String,
    pub badge_code: String,
    pub points_awarded: i64,
    pub awarded_at: DateTime<Utc>,
}

/// A hint the user paid to see
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HintUnlock {
    pub task_id: String,
    pub cost: i64,
    pub unlocked_at: DateTime<Utc>,
}

/// Where a user stands inside one scenario
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScenarioProgress {
    pub scenario_id: String,
    pub task_index: usize,
    pub completed_task_ids: BTreeSet<String>,
}

impl ScenarioProgress {
    pub fn new(scenario_id: &str) -> Self {
        Self {
            scenario_id: scenario_id.to_string(),
            task_index: 0,
            completed_task_ids: BTreeSet::new(),
        }
    }

    /// Move the pointer past `task_id`. Only ever advances by one.
    pub fn advance(&mut self, task_id: &str) {
        if self.completed_task_ids.insert(task_id.to_string()) {
            self.task_index += 1;
        }
    }

    pub fn is_complete(&self, task_count: usize) -> bool {
        self.task_index >= task_count
    }
}
