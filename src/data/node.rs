//! Nodes of the simulated filesystem

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A directory or a file in the virtual tree.
///
/// Serialized as nested JSON: `{"type":"dir","children":{..}}` or
/// `{"type":"file","content":".."}`. Children live in a `BTreeMap` so names
/// are unique and listings come out sorted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Node {
    #[serde(rename = "dir")]
    Directory {
        #[serde(default)]
        children: BTreeMap<String, Node>,
    },
    #[serde(rename = "file")]
    File {
        #[serde(default)]
        content: String,
    },
}

impl Node {
    pub fn dir() -> Self {
        Node::Directory { children: BTreeMap::new() }
    }

    pub fn file(content: impl Into<String>) -> Self {
        Node::File { content: content.into() }
    }

    /// Build a directory from `(name, node)` pairs
    pub fn dir_with<I, S>(entries: I) -> Self
    where
        I: IntoIterator<Item = (S, Node)>,
        S: Into<String>,
    {
        Node::Directory {
            children: entries.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        }
    }

    pub fn is_dir(&self) -> bool {
        matches!(self, Node::Directory { .. })
    }

    pub fn is_file(&self) -> bool {
        matches!(self, Node::File { .. })
    }

    pub fn children(&self) -> Option<&BTreeMap<String, Node>> {
        match self {
            Node::Directory { children } => Some(children),
            Node::File { .. } => None,
        }
    }

    pub fn children_mut(&mut self) -> Option<&mut BTreeMap<String, Node>> {
        match self {
            Node::Directory { children } => Some(children),
            Node::File { .. } => None,
        }
    }

    pub fn content(&self) -> Option<&str> {
        match self {
            Node::File { content } => Some(content),
            Node::Directory { .. } => None,
        }
    }

    /// Byte size for files, entry count for directories
    pub fn size(&self) -> usize {
        match self {
            Node::File { content } => content.len(),
            Node::Directory { children } => children.len(),
        }
    }
}

impl Default for Node {
    fn default() -> Self {
        Node::dir()
    }
}
