//! Incident Lab: hands-on forensic exercises in a simulated shell
//!
//! Learners explore a virtual filesystem, mount seized devices and run
//! investigative commands while a server-authoritative engine checks each
//! action against the scenario's ordered tasks and awards points and badges.
//!
//! # Architecture
//!
//! - `data` - Plain records: nodes, devices, tasks, completions, events
//! - `vfs` - Path algebra, the in-memory tree and device mounting
//! - `shell` - Command parser and executor
//! - `game` - Scenarios, task progression, scoring, persistence and the `Engine`
//! - `tui` - Terminal console that drives the engine

pub mod data;
pub mod game;
pub mod shell;
pub mod tui;
pub mod vfs;

pub use data::*;
pub use game::{Engine, EngineConfig, ScenarioCatalog};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Result type for application glue
pub type Result<T> = anyhow::Result<T>;

/// Engine failures surfaced to callers
#[derive(thiserror::Error, Debug)]
pub enum EngineError {
    #[error("Scenario not found: {0}")]
    ScenarioNotFound(String),

    #[error("Task not found: {0}")]
    TaskNotFound(String),

    #[error("Duplicate scenario: {0}")]
    DuplicateScenario(String),

    #[error("Duplicate task {task} in scenario {scenario}")]
    DuplicateTask { task: String, scenario: String },

    #[error("Invalid scenario: {0}")]
    InvalidScenario(String),

    #[error("Unknown device: {0}")]
    UnknownDevice(String),

    #[error("Insufficient points: hint costs {cost}, you have {total}")]
    InsufficientPoints { cost: i64, total: i64 },

    #[error("Submission failed: {0}")]
    SubmissionFailed(String),

    #[error("A submission for {0} is already being processed")]
    SubmissionInFlight(String),

    #[error(transparent)]
    Mount(#[from] vfs::MountError),

    #[error("Storage error: {0}")]
    Store(#[from] game::StoreError),
}
