//! Scenario definitions for forensic exercises
//!
//! A scenario is static content: the starting filesystem, the devices a
//! learner can plug in, scenario-specific tools and the ordered task list.
//! Definitions are loaded from JSON and never change at runtime.

use crate::data::*;
use crate::shell::{CustomCommand, Session};
use crate::EngineError;
use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::path::Path;

/// Demo scenario compiled into the binary
pub const BUNDLED_SCENARIO: &str = include_str!("../../scenarios/usb_exfil.json");

/// A complete exercise
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Scenario {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub synopsis: String,

    /// Home directory override; the engine default applies otherwise
    #[serde(default)]
    pub home: Option<String>,

    /// Initial tree every session starts from
    #[serde(default)]
    pub filesystem: Node,

    /// Extra environment variables
    #[serde(default)]
    pub env: BTreeMap<String, String>,

    /// Devices attached when a session starts
    #[serde(default)]
    pub devices: Vec<Device>,

    /// Devices the learner can attach later, by name
    #[serde(default)]
    pub attachable: Vec<Device>,

    #[serde(default)]
    pub custom_commands: BTreeMap<String, CustomCommand>,

    pub tasks: Vec<Task>,

    /// Awarded once every task is complete
    #[serde(default)]
    pub badge: Option<BadgeDefinition>,
}

impl Scenario {
    pub fn from_json(raw: &str) -> crate::Result<Self> {
        let scenario: Scenario = serde_json::from_str(raw).context("parsing scenario")?;
        scenario.validate()?;
        Ok(scenario)
    }

    fn validate(&self) -> Result<(), EngineError> {
        if self.id.is_empty() {
            return Err(EngineError::InvalidScenario("scenario id is empty".into()));
        }
        let mut seen = std::collections::HashSet::new();
        for task in &self.tasks {
            if !seen.insert(task.id.as_str()) {
                return Err(EngineError::DuplicateTask {
                    task: task.id.clone(),
                    scenario: self.id.clone(),
                });
            }
        }
        Ok(())
    }

    pub fn task_position(&self, task_id: &str) -> Option<usize> {
        self.tasks.iter().position(|t| t.id == task_id)
    }

    pub fn attachable(&self, name: &str) -> Option<&Device> {
        self.attachable.iter().find(|d| d.name == name)
    }

    /// Fresh shell state for `user`
    pub fn initial_session(&self, user: &str, default_home: &str) -> Session {
        let home = self.home.as_deref().unwrap_or(default_home);
        let mut session = Session::new(self.filesystem.clone(), home, user);
        session.env = self.env.clone();
        for device in &self.devices {
            session.devices.attach(device.clone());
        }
        session
    }

    pub fn total_points(&self) -> i64 {
        self.tasks.iter().map(|t| t.points).sum()
    }
}

/// Every loaded scenario plus a global task index
#[derive(Debug, Clone, Default)]
pub struct ScenarioCatalog {
    scenarios: BTreeMap<String, Scenario>,
    task_index: HashMap<String, (String, usize)>,   // task id -> (scenario id, position)
}

impl ScenarioCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Catalog holding only the compiled-in demo
    pub fn bundled() -> crate::Result<Self> {
        let mut catalog = Self::new();
        catalog.insert(Scenario::from_json(BUNDLED_SCENARIO)?)?;
        Ok(catalog)
    }

    /// Load every `*.json` file in `dir`
    pub fn load_dir(dir: &Path) -> crate::Result<Self> {
        let mut paths: Vec<_> = std::fs::read_dir(dir)
            .with_context(|| format!("reading scenario directory {}", dir.display()))?
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|p| p.extension().map(|ext| ext == "json").unwrap_or(false))
            .collect();
        paths.sort();

        let mut catalog = Self::new();
        for path in paths {
            let raw = std::fs::read_to_string(&path)
                .with_context(|| format!("reading {}", path.display()))?;
            let scenario =
                Scenario::from_json(&raw).with_context(|| format!("loading {}", path.display()))?;
            log::info!("loaded scenario {} from {}", scenario.id, path.display());
            catalog.insert(scenario)?;
        }
        Ok(catalog)
    }

    /// Add a scenario. Task ids must be unique across the whole catalog.
    pub fn insert(&mut self, scenario: Scenario) -> Result<(), EngineError> {
        if self.scenarios.contains_key(&scenario.id) {
            return Err(EngineError::DuplicateScenario(scenario.id));
        }
        if let Some(task) = scenario.tasks.iter().find(|t| self.task_index.contains_key(&t.id)) {
            return Err(EngineError::DuplicateTask {
                task: task.id.clone(),
                scenario: scenario.id.clone(),
            });
        }
        for (position, task) in scenario.tasks.iter().enumerate() {
            self.task_index.insert(task.id.clone(), (scenario.id.clone(), position));
        }
        self.scenarios.insert(scenario.id.clone(), scenario);
        Ok(())
    }

    pub fn get(&self, id: &str) -> Option<&Scenario> {
        self.scenarios.get(id)
    }

    pub fn require(&self, id: &str) -> Result<&Scenario, EngineError> {
        self.get(id).ok_or_else(|| EngineError::ScenarioNotFound(id.to_string()))
    }

    /// Scenario owning `task_id` and the task's position in it
    pub fn locate_task(&self, task_id: &str) -> Result<(&Scenario, usize), EngineError> {
        let (scenario_id, position) = self
            .task_index
            .get(task_id)
            .ok_or_else(|| EngineError::TaskNotFound(task_id.to_string()))?;
        Ok((self.require(scenario_id)?, *position))
    }

    pub fn iter(&self) -> impl Iterator<Item = &Scenario> {
        self.scenarios.values()
    }

    pub fn len(&self) -> usize {
        self.scenarios.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scenarios.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn minimal(id: &str, task_ids: &[&str]) -> Scenario {
        let tasks: Vec<String> = task_ids
            .iter()
            .map(|t| {
                format!(
                    r#"{{"id":"{t}","title":"{t}","points":10,"checkPolicy":{{"kind":"flag","expectedValue":"x"}}}}"#
                )
            })
            .collect();
        Scenario::from_json(&format!(r#"{{"id":"{id}","title":"{id}","tasks":[{}]}}"#, tasks.join(",")))
            .unwrap()
    }

    #[test]
    fn bundled_scenario_loads() {
        let catalog = ScenarioCatalog::bundled().unwrap();
        let scenario = catalog.iter().next().unwrap();
        assert!(!scenario.tasks.is_empty());
        let (found, position) = catalog.locate_task(&scenario.tasks[1].id).unwrap();
        assert_eq!(found.id, scenario.id);
        assert_eq!(position, 1);
    }

    #[test]
    fn task_ids_are_unique_across_catalog() {
        let mut catalog = ScenarioCatalog::new();
        catalog.insert(minimal("a", &["t1", "t2"])).unwrap();
        assert!(matches!(
            catalog.insert(minimal("b", &["t3", "t1"])),
            Err(EngineError::DuplicateTask { .. })
        ));
        assert!(matches!(catalog.insert(minimal("a", &["t9"])), Err(EngineError::DuplicateScenario(_))));
        assert!(catalog.locate_task("t3").is_err());
        assert_eq!(catalog.len(), 1);
    }

    #[test]
    fn duplicate_task_inside_one_scenario_is_rejected() {
        let raw = r#"{"id":"s","title":"s","tasks":[
            {"id":"t","title":"a","points":1,"checkPolicy":{"kind":"flag","expectedValue":"x"}},
            {"id":"t","title":"b","points":1,"checkPolicy":{"kind":"flag","expectedValue":"y"}}]}"#;
        assert!(Scenario::from_json(raw).is_err());
    }

    #[test]
    fn initial_session_uses_scenario_home_env_and_devices() {
        let raw = r#"{"id":"s","title":"s","home":"/root","env":{"CASE":"42"},
            "devices":[{"name":"sdb1","type":"disk","content":{"a.txt":"hi"}}],
            "tasks":[]}"#;
        let scenario = Scenario::from_json(raw).unwrap();
        let session = scenario.initial_session("analyst", "/home/user");
        assert_eq!(session.cwd, "/root");
        assert_eq!(session.environment()["CASE"], "42");
        assert!(session.devices.get("sdb1").is_some());
        assert!(!session.vfs.exists("/home/user"));
    }
}
