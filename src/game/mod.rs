//! Core engine: sessions, task progression and scoring
//!
//! `Engine` is the authoritative entry point the UI talks to. Every call for
//! a user runs under that user's lock, so a command, a submission and its
//! badge evaluation never interleave with another request of the same user.

pub mod config;
pub mod leaderboard;
pub mod progression;
pub mod scenario;
pub mod scoring;
pub mod store;

pub use config::EngineConfig;
pub use leaderboard::{LeaderboardCache, LeaderboardEntry};
pub use progression::{ProgressView, Step};
pub use scenario::{Scenario, ScenarioCatalog};
pub use store::{JsonStore, MemoryStore, ProgressStore, SessionRecord, StoreError};

use crate::data::*;
use crate::shell::{parse, ExecOutput, Executor, Session};
use crate::vfs::{mount, MountOutcome};
use crate::EngineError;
use chrono::Utc;
use scoring::BadgeContext;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// What a command line produced, plus the task check it triggered, if any
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommandOutcome {
    pub output: ExecOutput,
    pub submission: Option<SubmissionOutcome>,
    pub events: Vec<AnalyticsEvent>,
}

/// Answer to a task submission
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionOutcome {
    pub correct: bool,
    pub already_completed: bool,
    pub score_awarded: i64,
    pub new_total_score: i64,
    pub badges_unlocked: Vec<BadgeAward>,
    pub points_awarded: i64,     // Task score plus badge points from this submission
    pub scenario_complete: bool,
    pub events: Vec<AnalyticsEvent>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HintOutcome {
    pub task_id: String,
    pub hint: String,
    pub hint_cost: i64,
    pub events: Vec<AnalyticsEvent>,
}

/// Result of attach/mount/unmount driven from the UI
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceOutcome {
    pub message: String,
    pub events: Vec<AnalyticsEvent>,
}

/// Marks a (user, task) submission as running. Released on drop.
struct InFlight<'a> {
    tasks: &'a Mutex<HashSet<(String, String)>>,
    key: (String, String),
}

impl<'a> InFlight<'a> {
    fn acquire(tasks: &'a Mutex<HashSet<(String, String)>>, user: &str, task_id: &str) -> Result<Self, EngineError> {
        let key = (user.to_string(), task_id.to_string());
        let mut running = tasks.lock().unwrap_or_else(|e| e.into_inner());
        if !running.insert(key.clone()) {
            return Err(EngineError::SubmissionInFlight(task_id.to_string()));
        }
        Ok(Self { tasks, key })
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.tasks.lock().unwrap_or_else(|e| e.into_inner()).remove(&self.key);
    }
}

fn emit(events: &mut Vec<AnalyticsEvent>, event: AnalyticsEvent) {
    log::debug!(
        "event {:?} user={} scenario={} task={:?} success={}",
        event.kind,
        event.user,
        event.scenario_id,
        event.task_id,
        event.success
    );
    events.push(event);
}

fn submission_failed(err: StoreError) -> EngineError {
    log::error!("submission failed: {}", err);
    EngineError::SubmissionFailed(err.to_string())
}

/// The exercise engine
pub struct Engine {
    config: EngineConfig,
    catalog: ScenarioCatalog,
    store: Arc<dyn ProgressStore>,
    user_locks: Mutex<HashMap<String, Arc<Mutex<()>>>>,
    in_flight: Mutex<HashSet<(String, String)>>,
    leaderboard: LeaderboardCache,
}

impl Engine {
    pub fn new(config: EngineConfig, catalog: ScenarioCatalog, store: Arc<dyn ProgressStore>) -> Self {
        let leaderboard = LeaderboardCache::new(Duration::from_secs(config.leaderboard_ttl_secs));
        Self {
            config,
            catalog,
            store,
            user_locks: Mutex::new(HashMap::new()),
            in_flight: Mutex::new(HashSet::new()),
            leaderboard,
        }
    }

    pub fn in_memory(config: EngineConfig, catalog: ScenarioCatalog) -> Self {
        Self::new(config, catalog, Arc::new(MemoryStore::new()))
    }

    /// JSON store in `data_dir` when configured, memory otherwise
    pub fn open(config: EngineConfig, catalog: ScenarioCatalog) -> Result<Self, EngineError> {
        let store: Arc<dyn ProgressStore> = match &config.data_dir {
            Some(dir) => Arc::new(JsonStore::open(dir)?),
            None => Arc::new(MemoryStore::new()),
        };
        Ok(Self::new(config, catalog, store))
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn catalog(&self) -> &ScenarioCatalog {
        &self.catalog
    }

    fn user_lock(&self, user: &str) -> Arc<Mutex<()>> {
        let mut locks = self.user_locks.lock().unwrap_or_else(|e| e.into_inner());
        locks.entry(user.to_string()).or_default().clone()
    }

    fn fresh_record(&self, user: &str, scenario: &Scenario) -> SessionRecord {
        SessionRecord {
            session: scenario.initial_session(user, &self.config.default_home),
            progress: ScenarioProgress::new(&scenario.id),
        }
    }

    fn load_record(&self, user: &str, scenario: &Scenario) -> Result<SessionRecord, EngineError> {
        if let Some(record) = self.store.load_session(user, &scenario.id)? {
            return Ok(record);
        }
        let record = self.fresh_record(user, scenario);
        self.store.save_session(user, &scenario.id, &record)?;
        log::info!("started session for {} in {}", user, scenario.id);
        Ok(record)
    }

    fn execute_in(
        &self,
        record: &mut SessionRecord,
        user: &str,
        scenario: &Scenario,
        line: &str,
    ) -> Result<ExecOutput, EngineError> {
        let devices_before = record.session.devices.clone();
        let output = Executor::new(&scenario.custom_commands).run(&mut record.session, line);
        if output.vfs_mutated || output.new_cwd.is_some() || record.session.devices != devices_before {
            self.store.save_session(user, &scenario.id, record)?;
        }
        Ok(output)
    }

    fn command_event(user: &str, scenario: &Scenario, line: &str, output: &ExecOutput) -> AnalyticsEvent {
        AnalyticsEvent::new(EventKind::CommandExecuted, user, &scenario.id, output.is_ok()).detail(line)
    }

    /// Run a command line without checking it against any task
    pub fn execute_command(&self, user: &str, scenario_id: &str, line: &str) -> Result<CommandOutcome, EngineError> {
        let scenario = self.catalog.require(scenario_id)?;
        let lock = self.user_lock(user);
        let _held = lock.lock().unwrap_or_else(|e| e.into_inner());

        let mut record = self.load_record(user, scenario)?;
        let output = self.execute_in(&mut record, user, scenario, line)?;
        let mut events = Vec::new();
        emit(&mut events, Self::command_event(user, scenario, line, &output));
        Ok(CommandOutcome { output, submission: None, events })
    }

    /// Run a command line and, if it satisfies the active command task,
    /// complete that task. Matching uses the directory the command ran from.
    pub fn run_command(
        &self,
        user: &str,
        scenario_id: &str,
        line: &str,
        time_ms: Option<u64>,
    ) -> Result<CommandOutcome, EngineError> {
        let scenario = self.catalog.require(scenario_id)?;
        let lock = self.user_lock(user);
        let _held = lock.lock().unwrap_or_else(|e| e.into_inner());

        let mut record = self.load_record(user, scenario)?;
        let cwd_before = record.session.cwd.clone();
        let output = self.execute_in(&mut record, user, scenario, line)?;
        let mut events = Vec::new();
        emit(&mut events, Self::command_event(user, scenario, line, &output));

        let mut submission = None;
        if output.is_ok() {
            if let Some(task) = progression::active_task(scenario, &record.progress) {
                if let CheckPolicy::Command { command, expected_args } = &task.check_policy {
                    let parsed = parse(line);
                    if progression::matches_command(command, expected_args, &parsed, &cwd_before) {
                        let position = record.progress.task_index;
                        // a submission already running for this task owns it; the command still ran
                        match InFlight::acquire(&self.in_flight, user, &task.id) {
                            Ok(_flight) => {
                                let mut outcome = self.submit_in(
                                    user,
                                    scenario,
                                    position,
                                    &mut record,
                                    true,
                                    time_ms.unwrap_or(0),
                                )?;
                                events.append(&mut outcome.events);
                                submission = Some(outcome);
                            }
                            Err(EngineError::SubmissionInFlight(_)) => {
                                log::debug!("{} matched {} while a submission was in flight", user, task.id);
                            }
                            Err(err) => return Err(err),
                        }
                    }
                }
            }
        }
        Ok(CommandOutcome { output, submission, events })
    }

    /// Check evidence against a task. Only the active task of its scenario
    /// can be completed; anything else is answered with `correct: false`.
    pub fn submit_task_evidence(
        &self,
        user: &str,
        task_id: &str,
        evidence: TaskEvidence,
        time_ms: Option<u64>,
    ) -> Result<SubmissionOutcome, EngineError> {
        let (scenario, position) = self.catalog.locate_task(task_id)?;
        let _flight = InFlight::acquire(&self.in_flight, user, task_id)?;
        let lock = self.user_lock(user);
        let _held = lock.lock().unwrap_or_else(|e| e.into_inner());

        let mut record = self.load_record(user, scenario)?;
        let task = &scenario.tasks[position];
        let matched = progression::evaluate(&task.check_policy, &evidence, &record.session.cwd);
        log::debug!("{} submitted {} evidence for {}: {}", user, evidence.label(), task_id, matched);
        self.submit_in(user, scenario, position, &mut record, matched, time_ms.unwrap_or(0))
    }

    /// Submission body; the caller holds the user lock and the in-flight guard
    fn submit_in(
        &self,
        user: &str,
        scenario: &Scenario,
        position: usize,
        record: &mut SessionRecord,
        matched: bool,
        time_ms: u64,
    ) -> Result<SubmissionOutcome, EngineError> {
        let task = &scenario.tasks[position];
        let is_active = record.progress.task_index == position;
        let mut outcome = SubmissionOutcome::default();

        if self.store.completion(user, &task.id).map_err(submission_failed)?.is_some() {
            outcome.correct = matched;
            outcome.already_completed = true;
            // after a session reset the learner replays tasks without rescoring
            if is_active && matched {
                let step = progression::advance(&mut record.progress, scenario.tasks.len(), &task.id);
                self.store.save_session(user, &scenario.id, record)?;
                if step == Step::ScenarioComplete {
                    outcome.scenario_complete = true;
                    self.finish_scenario(user, scenario, &mut outcome);
                }
            }
            emit(
                &mut outcome.events,
                AnalyticsEvent::new(EventKind::TaskSubmitted, user, &scenario.id, matched)
                    .task(&task.id)
                    .detail("already completed"),
            );
            outcome.new_total_score = self.store.total_score(user)?;
            return Ok(outcome);
        }

        if !is_active || !matched {
            emit(
                &mut outcome.events,
                AnalyticsEvent::new(EventKind::TaskSubmitted, user, &scenario.id, false).task(&task.id),
            );
            outcome.new_total_score = self.store.total_score(user)?;
            return Ok(outcome);
        }

        let completion = Completion {
            user: user.to_string(),
            task_id: task.id.clone(),
            scenario_id: scenario.id.clone(),
            score_awarded: task.points,
            time_ms,
            completed_at: Utc::now(),
        };
        let mut draft = record.clone();
        let step = progression::advance(&mut draft.progress, scenario.tasks.len(), &task.id);
        if !self.store.commit_submission(user, &scenario.id, completion, &draft).map_err(submission_failed)? {
            outcome.correct = true;
            outcome.already_completed = true;
            outcome.new_total_score = self.store.total_score(user)?;
            return Ok(outcome);
        }
        *record = draft;
        self.leaderboard.invalidate();
        log::info!("{} completed {} (+{})", user, task.id, task.points);

        outcome.correct = true;
        outcome.score_awarded = task.points;
        outcome.points_awarded = task.points;
        emit(
            &mut outcome.events,
            AnalyticsEvent::new(EventKind::TaskSubmitted, user, &scenario.id, true).task(&task.id),
        );
        emit(
            &mut outcome.events,
            AnalyticsEvent::new(EventKind::TaskCompleted, user, &scenario.id, true)
                .task(&task.id)
                .detail(task.points.to_string()),
        );

        if step == Step::ScenarioComplete {
            outcome.scenario_complete = true;
            self.finish_scenario(user, scenario, &mut outcome);
        }
        outcome.new_total_score = self.store.total_score(user)?;
        Ok(outcome)
    }

    /// Scenario rewards. Failures here are logged and never undo the completion.
    fn finish_scenario(&self, user: &str, scenario: &Scenario, outcome: &mut SubmissionOutcome) {
        match self.store.mark_scenario_completed(user, &scenario.id) {
            Ok(true) => {
                log::info!("{} completed scenario {}", user, scenario.id);
                emit(
                    &mut outcome.events,
                    AnalyticsEvent::new(EventKind::ScenarioCompleted, user, &scenario.id, true),
                );
            }
            Ok(false) => {}
            Err(e) => log::warn!("could not mark {} complete for {}: {}", scenario.id, user, e),
        }

        match self.award_badges(user, scenario) {
            Ok(awards) => {
                for award in awards {
                    outcome.points_awarded += award.points_awarded;
                    emit(
                        &mut outcome.events,
                        AnalyticsEvent::new(EventKind::BadgeUnlocked, user, &scenario.id, true)
                            .detail(award.badge_code.clone()),
                    );
                    outcome.badges_unlocked.push(award);
                }
            }
            Err(e) => log::warn!("badge evaluation failed for {} in {}: {}", user, scenario.id, e),
        }
    }

    fn award_badges(&self, user: &str, scenario: &Scenario) -> Result<Vec<BadgeAward>, StoreError> {
        let completions = self.store.completions(user)?;
        let hint_requests = self.store.hint_requests(user, &scenario.id)?;
        let ctx = BadgeContext { scenario, completions: &completions, hint_requests, config: &self.config };

        let mut awarded = Vec::new();
        for (badge, points) in scoring::earned_badges(&ctx) {
            let award = BadgeAward {
                user: user.to_string(),
                badge_code: badge.code().to_string(),
                points_awarded: points,
                awarded_at: Utc::now(),
            };
            match self.store.insert_badge(award.clone()) {
                Ok(true) => {
                    log::info!("{} unlocked {} {}", user, badge.icon(), badge.name());
                    awarded.push(award);
                }
                Ok(false) => {}
                Err(e) => log::warn!("could not award {} to {}: {}", badge.code(), user, e),
            }
        }
        if !awarded.is_empty() {
            self.leaderboard.invalidate();
        }
        Ok(awarded)
    }

    /// Re-run badge rules for a scenario. Already held badges are not returned.
    pub fn evaluate_badges(&self, user: &str, scenario_id: &str) -> Result<Vec<BadgeAward>, EngineError> {
        let scenario = self.catalog.require(scenario_id)?;
        let lock = self.user_lock(user);
        let _held = lock.lock().unwrap_or_else(|e| e.into_inner());
        Ok(self.award_badges(user, scenario)?)
    }

    pub fn attach_device(&self, user: &str, scenario_id: &str, device: Device) -> Result<DeviceOutcome, EngineError> {
        let scenario = self.catalog.require(scenario_id)?;
        let lock = self.user_lock(user);
        let _held = lock.lock().unwrap_or_else(|e| e.into_inner());

        let mut record = self.load_record(user, scenario)?;
        let message = format!("attached {}", device.dev_path());
        let name = device.name.clone();
        record.session.devices.attach(device);
        self.store.save_session(user, &scenario.id, &record)?;
        log::info!("{} attached {} in {}", user, name, scenario.id);

        let mut events = Vec::new();
        emit(&mut events, AnalyticsEvent::new(EventKind::DeviceAttached, user, &scenario.id, true).detail(name));
        Ok(DeviceOutcome { message, events })
    }

    /// Attach one of the scenario's declared devices by name
    pub fn attach_named_device(&self, user: &str, scenario_id: &str, name: &str) -> Result<DeviceOutcome, EngineError> {
        let device = self
            .catalog
            .require(scenario_id)?
            .attachable(name)
            .cloned()
            .ok_or_else(|| EngineError::UnknownDevice(name.to_string()))?;
        self.attach_device(user, scenario_id, device)
    }

    pub fn mount_device(
        &self,
        user: &str,
        scenario_id: &str,
        device_path: &str,
        mount_point: &str,
    ) -> Result<DeviceOutcome, EngineError> {
        let scenario = self.catalog.require(scenario_id)?;
        let lock = self.user_lock(user);
        let _held = lock.lock().unwrap_or_else(|e| e.into_inner());

        let mut record = self.load_record(user, scenario)?;
        let point = record.session.resolve(mount_point);
        let Session { vfs, devices, .. } = &mut record.session;
        let outcome = mount::mount(vfs, devices, device_path, &point)?;
        let mut events = Vec::new();
        if let MountOutcome::Mounted { device, .. } = &outcome {
            self.store.save_session(user, &scenario.id, &record)?;
            emit(
                &mut events,
                AnalyticsEvent::new(EventKind::DeviceMounted, user, &scenario.id, true).detail(device.clone()),
            );
        }
        Ok(DeviceOutcome { message: outcome.message(), events })
    }

    /// Unmount by mount point or `/dev/<name>`
    pub fn unmount_device(&self, user: &str, scenario_id: &str, target: &str) -> Result<DeviceOutcome, EngineError> {
        let scenario = self.catalog.require(scenario_id)?;
        let lock = self.user_lock(user);
        let _held = lock.lock().unwrap_or_else(|e| e.into_inner());

        let mut record = self.load_record(user, scenario)?;
        let target = if target.starts_with("/dev/") { target.to_string() } else { record.session.resolve(target) };
        let name = mount::unmount(&mut record.session.devices, &target)?;
        self.store.save_session(user, &scenario.id, &record)?;

        let mut events = Vec::new();
        emit(
            &mut events,
            AnalyticsEvent::new(EventKind::DeviceUnmounted, user, &scenario.id, true).detail(name.clone()),
        );
        Ok(DeviceOutcome { message: format!("unmounted /dev/{}", name), events })
    }

    /// Reveal a task's hint. A priced hint needs enough points the first
    /// time; once unlocked it stays free. Every fetch counts as a hint used.
    pub fn request_hint(&self, user: &str, task_id: &str) -> Result<HintOutcome, EngineError> {
        let (scenario, position) = self.catalog.locate_task(task_id)?;
        let task = &scenario.tasks[position];
        let lock = self.user_lock(user);
        let _held = lock.lock().unwrap_or_else(|e| e.into_inner());

        if task.hint_cost > 0 && !self.store.hint_unlocked(user, task_id)? {
            let total = self.store.total_score(user)?;
            if total < task.hint_cost {
                return Err(EngineError::InsufficientPoints { cost: task.hint_cost, total });
            }
            self.store.unlock_hint(
                user,
                HintUnlock { task_id: task.id.clone(), cost: task.hint_cost, unlocked_at: Utc::now() },
            )?;
        }
        let used = self.store.record_hint_request(user, &scenario.id)?;
        log::info!("{} fetched hint for {} ({} in {})", user, task_id, used, scenario.id);

        let mut events = Vec::new();
        emit(
            &mut events,
            AnalyticsEvent::new(EventKind::HintRequested, user, &scenario.id, true)
                .task(task_id)
                .detail(task.hint_cost.to_string()),
        );
        Ok(HintOutcome { task_id: task.id.clone(), hint: task.hint.clone(), hint_cost: task.hint_cost, events })
    }

    /// Restore the starting tree, devices and task pointer. Completions and
    /// badges are durable and stay.
    pub fn reset_session(&self, user: &str, scenario_id: &str) -> Result<Vec<AnalyticsEvent>, EngineError> {
        let scenario = self.catalog.require(scenario_id)?;
        let lock = self.user_lock(user);
        let _held = lock.lock().unwrap_or_else(|e| e.into_inner());

        let record = self.fresh_record(user, scenario);
        self.store.save_session(user, &scenario.id, &record)?;
        log::info!("reset session for {} in {}", user, scenario.id);

        let mut events = Vec::new();
        emit(&mut events, AnalyticsEvent::new(EventKind::SessionReset, user, &scenario.id, true));
        Ok(events)
    }

    pub fn progress(&self, user: &str, scenario_id: &str) -> Result<ProgressView, EngineError> {
        let scenario = self.catalog.require(scenario_id)?;
        let lock = self.user_lock(user);
        let _held = lock.lock().unwrap_or_else(|e| e.into_inner());
        let record = self.load_record(user, scenario)?;
        Ok(ProgressView::new(scenario, &record.progress))
    }

    /// Snapshot of the shell state, for display
    pub fn session(&self, user: &str, scenario_id: &str) -> Result<Session, EngineError> {
        let scenario = self.catalog.require(scenario_id)?;
        let lock = self.user_lock(user);
        let _held = lock.lock().unwrap_or_else(|e| e.into_inner());
        Ok(self.load_record(user, scenario)?.session)
    }

    pub fn total_score(&self, user: &str) -> Result<i64, EngineError> {
        Ok(self.store.total_score(user)?)
    }

    pub fn badges(&self, user: &str) -> Result<Vec<BadgeAward>, EngineError> {
        Ok(self.store.badges(user)?)
    }

    /// Top `limit` users by total score, possibly a few seconds stale
    pub fn leaderboard(&self, limit: usize) -> Result<Vec<LeaderboardEntry>, EngineError> {
        let entries = self.leaderboard.get_or_refresh(|| -> Result<Vec<LeaderboardEntry>, StoreError> {
            let mut entries = Vec::new();
            for user in self.store.users()? {
                let completions = self.store.completions(&user)?;
                let badges = self.store.badges(&user)?;
                if completions.is_empty() && badges.is_empty() {
                    continue;
                }
                entries.push(LeaderboardEntry { total_score: scoring::total_score(&completions, &badges), user });
            }
            Ok(entries)
        })?;
        Ok(entries.into_iter().take(limit).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn engine() -> Engine {
        Engine::in_memory(EngineConfig::default(), ScenarioCatalog::bundled().unwrap())
    }

    #[test]
    fn in_flight_guard_rejects_overlap_and_releases_on_drop() {
        let tasks = Mutex::new(HashSet::new());
        let first = InFlight::acquire(&tasks, "ana", "t1").unwrap();
        assert!(matches!(
            InFlight::acquire(&tasks, "ana", "t1"),
            Err(EngineError::SubmissionInFlight(_))
        ));
        assert!(InFlight::acquire(&tasks, "bo", "t1").is_ok());
        drop(first);
        assert!(InFlight::acquire(&tasks, "ana", "t1").is_ok());
    }

    #[test]
    fn matching_command_during_in_flight_submission_still_reports_output() {
        let engine = engine();
        engine
            .submit_task_evidence("ana", "usb_exfil.inspect_laptop", TaskEvidence::InteractionTag("laptop".into()), None)
            .unwrap();
        engine
            .in_flight
            .lock()
            .unwrap()
            .insert(("ana".to_string(), "usb_exfil.open_evidence".to_string()));

        let outcome = engine.run_command("ana", "usb_exfil", "cd ./evidence", None).unwrap();
        assert!(outcome.output.is_ok());
        assert!(outcome.submission.is_none());
        assert!(outcome.events.iter().any(|e| e.kind == EventKind::CommandExecuted));
        assert_eq!(engine.session("ana", "usb_exfil").unwrap().cwd, "/home/user/evidence");
        assert_eq!(engine.progress("ana", "usb_exfil").unwrap().task_index, 1);
    }

    #[test]
    fn sessions_are_per_user() {
        let engine = engine();
        engine.execute_command("ana", "usb_exfil", "mkdir case").unwrap();
        assert!(engine.session("ana", "usb_exfil").unwrap().vfs.exists("/home/user/case"));
        assert!(!engine.session("bo", "usb_exfil").unwrap().vfs.exists("/home/user/case"));
    }

    #[test]
    fn unknown_ids_are_errors() {
        let engine = engine();
        assert!(matches!(engine.execute_command("ana", "nope", "ls"), Err(EngineError::ScenarioNotFound(_))));
        assert!(matches!(
            engine.submit_task_evidence("ana", "nope", TaskEvidence::FlagString("x".into()), None),
            Err(EngineError::TaskNotFound(_))
        ));
        assert!(matches!(
            engine.attach_named_device("ana", "usb_exfil", "floppy"),
            Err(EngineError::UnknownDevice(_))
        ));
    }
}
