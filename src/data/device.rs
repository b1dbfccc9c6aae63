//! Block devices that can be attached to a session and mounted into the tree

use super::Node;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Kind of device being attached
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeviceKind {
    Disk,     // USB sticks, drive images
    Remote,   // Network shares
}

impl std::fmt::Display for DeviceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DeviceKind::Disk => write!(f, "disk"),
            DeviceKind::Remote => write!(f, "remote"),
        }
    }
}

/// One entry of device content: plain text becomes a file, a node is grafted as-is
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DeviceEntry {
    Text(String),
    Node(Node),
}

impl DeviceEntry {
    pub fn to_node(&self) -> Node {
        match self {
            DeviceEntry::Text(text) => Node::file(text.clone()),
            DeviceEntry::Node(node) => node.clone(),
        }
    }
}

/// A device record owned by one (user, scenario) session
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Device {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: DeviceKind,
    #[serde(default)]
    pub size: String,            // "16G", "2.0T"
    #[serde(default)]
    pub partition_name: String,
    #[serde(default)]
    pub mounted: bool,
    #[serde(default)]
    pub mount_point: Option<String>,
    #[serde(default)]
    pub content: BTreeMap<String, DeviceEntry>,
}

impl Device {
    pub fn new(name: &str, kind: DeviceKind) -> Self {
        Self {
            name: name.to_string(),
            kind,
            size: String::new(),
            partition_name: String::new(),
            mounted: false,
            mount_point: None,
            content: BTreeMap::new(),
        }
    }

    pub fn with_entry(mut self, segment: &str, entry: DeviceEntry) -> Self {
        self.content.insert(segment.to_string(), entry);
        self
    }

    /// Canonical `/dev/<name>` path
    pub fn dev_path(&self) -> String {
        format!("/dev/{}", self.name)
    }
}
