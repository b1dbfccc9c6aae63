//! Per-(user, scenario) shell state: tree, working directory, devices

use crate::data::Node;
use crate::vfs::{path, DeviceTable, Vfs};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Everything a command can read or change. This is also the persisted
/// snapshot of a session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub vfs: Vfs,
    pub cwd: String,
    pub home: String,
    pub user: String,
    #[serde(default)]
    pub env: BTreeMap<String, String>,   // Scenario-declared extras
    #[serde(default)]
    pub devices: DeviceTable,
}

impl Session {
    /// Start a session in `home`, creating it if the tree lacks it
    pub fn new(root: Node, home: &str, user: &str) -> Self {
        let mut vfs = Vfs::from_root(root);
        let home = path::normalize(home);
        let cwd = match vfs.create_dir_all(&home) {
            Ok(()) => home.clone(),
            Err(_) => "/".to_string(),
        };
        Self {
            vfs,
            cwd,
            home,
            user: user.to_string(),
            env: BTreeMap::new(),
            devices: DeviceTable::new(),
        }
    }

    /// Resolve a user-typed path, expanding a leading `~`
    pub fn resolve(&self, raw: &str) -> String {
        if raw == "~" {
            return self.home.clone();
        }
        if let Some(rest) = raw.strip_prefix("~/") {
            return path::resolve_path(rest, &self.home);
        }
        path::resolve_path(raw, &self.cwd)
    }

    /// Environment as `env` prints it
    pub fn environment(&self) -> BTreeMap<String, String> {
        let mut vars = self.env.clone();
        vars.insert("HOME".to_string(), self.home.clone());
        vars.insert("USER".to_string(), self.user.clone());
        vars.insert("PWD".to_string(), self.cwd.clone());
        vars.entry("SHELL".to_string()).or_insert_with(|| "/bin/bash".to_string());
        vars
    }
}
