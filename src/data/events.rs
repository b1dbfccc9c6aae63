//! Analytics events handed to the UI/analytics collaborators
//!
//! The engine only builds these payloads; shipping them somewhere is the
//! caller's job.

use super::Id;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// What happened
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    CommandExecuted,
    TaskSubmitted,
    TaskCompleted,
    ScenarioCompleted,
    BadgeUnlocked,
    HintRequested,
    DeviceAttached,
    DeviceMounted,
    DeviceUnmounted,
    SessionReset,
}

/// A structured event payload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticsEvent {
    pub id: Id,
    pub kind: EventKind,
    pub user: String,
    pub scenario_id: String,
    pub task_id: Option<String>,
    pub success: bool,
    pub detail: Option<String>,   // Command line, badge code, device name
    pub timestamp: DateTime<Utc>,
}

impl AnalyticsEvent {
    pub fn new(kind: EventKind, user: &str, scenario_id: &str, success: bool) -> Self {
        Self {
            id: Id::new(),
            kind,
            user: user.to_string(),
            scenario_id: scenario_id.to_string(),
            task_id: None,
            success,
            detail: None,
            timestamp: Utc::now(),
        }
    }

    pub fn task(mut self, task_id: &str) -> Self {
        self.task_id = Some(task_id.to_string());
        self
    }

    pub fn detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }
}
