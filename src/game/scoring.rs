//! Scores and badge rules
//!
//! The total is always recomputed from durable records, never kept as a
//! running counter.

use super::config::EngineConfig;
use super::scenario::Scenario;
use crate::data::*;

pub fn total_score(completions: &[Completion], badges: &[BadgeAward]) -> i64 {
    completions.iter().map(|c| c.score_awarded).sum::<i64>()
        + badges.iter().map(|b| b.points_awarded).sum::<i64>()
}

/// Time spent on a scenario's tasks, summed over completions
pub fn scenario_time_ms(completions: &[Completion], scenario_id: &str) -> u64 {
    completions
        .iter()
        .filter(|c| c.scenario_id == scenario_id)
        .map(|c| c.time_ms)
        .sum()
}

/// How many of the scenario's tasks the user has completed
pub fn completed_count(completions: &[Completion], scenario: &Scenario) -> usize {
    scenario
        .tasks
        .iter()
        .filter(|t| completions.iter().any(|c| c.task_id == t.id))
        .count()
}

/// Inputs for badge rules, gathered at scenario completion
pub struct BadgeContext<'a> {
    pub scenario: &'a Scenario,
    pub completions: &'a [Completion],
    pub hint_requests: u32,
    pub config: &'a EngineConfig,
}

/// Badges whose rule currently holds, with the points each grants.
///
/// Pure: callers rely on store uniqueness to award each at most once.
pub fn earned_badges(ctx: &BadgeContext<'_>) -> Vec<(Badge, i64)> {
    let scenario = ctx.scenario;
    if scenario.tasks.is_empty() || completed_count(ctx.completions, scenario) < scenario.tasks.len() {
        return Vec::new();
    }

    let mut earned = Vec::new();
    if let Some(definition) = &scenario.badge {
        earned.push((Badge::Scenario(definition.code.clone()), definition.points));
    }
    if scenario_time_ms(ctx.completions, &scenario.id) <= ctx.config.speed_run_threshold_ms {
        earned.push((Badge::SpeedRunner, ctx.config.skill_badge_points));
    }
    if ctx.hint_requests == 0 {
        earned.push((Badge::HintFreeExpert, ctx.config.skill_badge_points));
    }
    earned
}
