//! Task progression: which task is active and whether evidence satisfies it
//!
//! Only the task at the progress pointer is ever checked. A match moves the
//! pointer forward by one; the pointer reaching the task count means the
//! scenario is complete.

use super::scenario::Scenario;
use crate::data::*;
use crate::shell::{parse, ParsedCommand};
use crate::vfs::path;
use serde::{Deserialize, Serialize};

/// Where the learner stands, as shown to the UI
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressView {
    pub scenario_id: String,
    pub task_index: usize,
    pub task_count: usize,
    pub completed_task_ids: Vec<String>,
    pub active_task: Option<Task>,
    pub scenario_complete: bool,
}

impl ProgressView {
    pub fn new(scenario: &Scenario, progress: &ScenarioProgress) -> Self {
        Self {
            scenario_id: scenario.id.clone(),
            task_index: progress.task_index,
            task_count: scenario.tasks.len(),
            completed_task_ids: progress.completed_task_ids.iter().cloned().collect(),
            active_task: active_task(scenario, progress).cloned(),
            scenario_complete: progress.is_complete(scenario.tasks.len()),
        }
    }
}

/// Result of moving the pointer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Advanced { next: usize },
    ScenarioComplete,
}

pub fn active_task<'a>(scenario: &'a Scenario, progress: &ScenarioProgress) -> Option<&'a Task> {
    scenario.tasks.get(progress.task_index)
}

/// Advance past `task_id`, which must be the active task
pub fn advance(progress: &mut ScenarioProgress, task_count: usize, task_id: &str) -> Step {
    progress.advance(task_id);
    if progress.is_complete(task_count) {
        Step::ScenarioComplete
    } else {
        Step::Advanced { next: progress.task_index }
    }
}

/// Check evidence against a policy. `cwd` is the working directory the
/// learner was in when they acted.
pub fn evaluate(policy: &CheckPolicy, evidence: &TaskEvidence, cwd: &str) -> bool {
    match (policy, evidence) {
        (CheckPolicy::Interaction { target_tag }, TaskEvidence::InteractionTag(tag)) => target_tag == tag,
        (CheckPolicy::Flag { expected_value }, TaskEvidence::FlagString(value)) => expected_value == value,
        (CheckPolicy::Command { command, expected_args }, TaskEvidence::RawCommand(line)) => {
            matches_command(command, expected_args, &parse(line), cwd)
        }
        _ => false,
    }
}

/// Command-policy matching. Empty `expected` accepts any arguments.
pub fn matches_command(command: &str, expected: &[String], parsed: &ParsedCommand, cwd: &str) -> bool {
    if parsed.command != command {
        return false;
    }
    if expected.is_empty() {
        return true;
    }
    args_equal(expected, &parsed.args)
        || cwd_implied(expected, &parsed.args, cwd)
        || paths_resolve(expected, &parsed.args, cwd)
}

fn args_equal(expected: &[String], args: &[String]) -> bool {
    expected.len() == args.len()
        && expected
            .iter()
            .zip(args)
            .all(|(e, a)| path::trim_trailing_slash(e) == path::trim_trailing_slash(a))
}

/// `cd` with nothing while already standing in the expected directory
fn cwd_implied(expected: &[String], args: &[String], cwd: &str) -> bool {
    args.is_empty()
        && expected.len() == 1
        && path::trim_trailing_slash(&expected[0]) == path::trim_trailing_slash(cwd)
}

fn paths_resolve(expected: &[String], args: &[String], cwd: &str) -> bool {
    expected.len() == args.len()
        && expected.iter().zip(args).all(|(e, a)| {
            if path::looks_like_path(a) {
                path::resolve_path(a, cwd) == path::normalize(e)
            } else {
                path::trim_trailing_slash(e) == path::trim_trailing_slash(a)
            }
        })
}
