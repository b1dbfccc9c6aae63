//! The in-memory tree owned by one session

use super::path::{segments, split_parent};
use crate::data::Node;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Why a tree mutation could not be applied
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FsError {
    NotFound,       // Target or an ancestor is missing
    NotADirectory,  // An ancestor (or the target) is a file
    IsADirectory,   // Expected a file
    Exists,         // Leaf already present
}

/// A rooted virtual filesystem. Paths passed in must already be canonical.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Vfs {
    pub root: Node,
}

impl Vfs {
    pub fn new() -> Self {
        Self { root: Node::dir() }
    }

    pub fn from_root(root: Node) -> Self {
        let root = if root.is_dir() { root } else { Node::dir() };
        Self { root }
    }

    /// Look up a node, `None` if any segment is missing or crosses a file
    pub fn get_node(&self, path: &str) -> Option<&Node> {
        let mut node = &self.root;
        for segment in segments(path) {
            node = node.children()?.get(segment)?;
        }
        Some(node)
    }

    pub fn get_node_mut(&mut self, path: &str) -> Option<&mut Node> {
        let mut node = &mut self.root;
        for segment in segments(path) {
            node = node.children_mut()?.get_mut(segment)?;
        }
        Some(node)
    }

    pub fn exists(&self, path: &str) -> bool {
        self.get_node(path).is_some()
    }

    pub fn is_dir(&self, path: &str) -> bool {
        self.get_node(path).map(Node::is_dir).unwrap_or(false)
    }

    /// Parent directory entries and leaf name of `path`.
    ///
    /// `None` when the path is the root, or when an ancestor is missing or is a file.
    pub fn ensure_parent(&mut self, path: &str) -> Option<(&mut BTreeMap<String, Node>, String)> {
        let (parent, leaf) = split_parent(path)?;
        let children = self.get_node_mut(&parent)?.children_mut()?;
        Some((children, leaf))
    }

    /// Explain why `ensure_parent` would fail for `path`
    pub fn parent_error(&self, path: &str) -> FsError {
        let Some((parent, _)) = split_parent(path) else {
            return FsError::Exists;
        };
        match self.get_node(&parent) {
            Some(node) if !node.is_dir() => FsError::NotADirectory,
            Some(_) => FsError::Exists,
            None => {
                // Find the first segment that is a file, otherwise it's missing
                let mut node = &self.root;
                for segment in segments(&parent) {
                    match node.children().and_then(|c| c.get(segment)) {
                        Some(next) if next.is_file() => return FsError::NotADirectory,
                        Some(next) => node = next,
                        None => return FsError::NotFound,
                    }
                }
                FsError::NotFound
            }
        }
    }

    /// Create a directory; every ancestor must already exist
    pub fn mkdir(&mut self, path: &str) -> Result<(), FsError> {
        if self.exists(path) {
            return Err(FsError::Exists);
        }
        match self.ensure_parent(path) {
            Some((children, leaf)) => {
                children.insert(leaf, Node::dir());
                Ok(())
            }
            None => Err(self.parent_error(path)),
        }
    }

    /// Create every missing directory along `path`
    pub fn create_dir_all(&mut self, path: &str) -> Result<(), FsError> {
        let mut node = &mut self.root;
        for segment in segments(path) {
            let children = node.children_mut().ok_or(FsError::NotADirectory)?;
            node = children.entry(segment.to_string()).or_insert_with(Node::dir);
        }
        if node.is_dir() {
            Ok(())
        } else {
            Err(FsError::NotADirectory)
        }
    }

    /// Create an empty file unless something already lives at `path`
    pub fn touch(&mut self, path: &str) -> Result<bool, FsError> {
        if self.exists(path) {
            return Ok(false);
        }
        match self.ensure_parent(path) {
            Some((children, leaf)) => {
                children.insert(leaf, Node::file(""));
                Ok(true)
            }
            None => Err(self.parent_error(path)),
        }
    }

    /// Write or append file content without creating missing directories
    pub fn write_file(&mut self, path: &str, content: &str, append: bool) -> Result<(), FsError> {
        if self.is_dir(path) {
            return Err(FsError::IsADirectory);
        }
        match self.ensure_parent(path) {
            Some((children, leaf)) => {
                let entry = children.entry(leaf).or_insert_with(|| Node::file(""));
                if let Node::File { content: existing } = entry {
                    if append {
                        existing.push_str(content);
                    } else {
                        *existing = content.to_string();
                    }
                }
                Ok(())
            }
            None => Err(self.parent_error(path)),
        }
    }

    /// Put `node` at `path`, replacing whatever was there
    pub fn insert(&mut self, path: &str, node: Node) -> Result<(), FsError> {
        match self.ensure_parent(path) {
            Some((children, leaf)) => {
                children.insert(leaf, node);
                Ok(())
            }
            None => Err(self.parent_error(path)),
        }
    }

    /// Detach exactly one entry from its parent
    pub fn remove(&mut self, path: &str) -> Result<Node, FsError> {
        match self.ensure_parent(path) {
            Some((children, leaf)) => children.remove(&leaf).ok_or(FsError::NotFound),
            None => Err(FsError::NotFound),
        }
    }
}

impl Default for Vfs {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Vfs {
        Vfs::from_root(Node::dir_with([(
            "home",
            Node::dir_with([(
                "user",
                Node::dir_with([
                    ("notes.txt", Node::file("todo")),
                    ("evidence", Node::dir()),
                ]),
            )]),
        )]))
    }

    #[test]
    fn get_node_walks_directories_only() {
        let vfs = sample();
        assert!(vfs.get_node("/").unwrap().is_dir());
        assert_eq!(vfs.get_node("/home/user/notes.txt").unwrap().content(), Some("todo"));
        assert!(vfs.get_node("/home/user/notes.txt/inner").is_none());
        assert!(vfs.get_node("/nope").is_none());
    }

    #[test]
    fn ensure_parent_requires_existing_directories() {
        let mut vfs = sample();
        let (children, leaf) = vfs.ensure_parent("/home/user/new.txt").unwrap();
        assert_eq!(leaf, "new.txt");
        assert!(children.contains_key("notes.txt"));
        assert!(vfs.ensure_parent("/home/missing/new.txt").is_none());
        assert!(vfs.ensure_parent("/home/user/notes.txt/x").is_none());
        assert!(vfs.ensure_parent("/").is_none());
        assert_eq!(vfs.parent_error("/home/missing/new.txt"), FsError::NotFound);
        assert_eq!(vfs.parent_error("/home/user/notes.txt/x"), FsError::NotADirectory);
        assert_eq!(vfs.parent_error("/home/user/notes.txt/x/y"), FsError::NotADirectory);
    }

    #[test]
    fn mkdir_touch_and_remove() {
        let mut vfs = sample();
        assert_eq!(vfs.mkdir("/a/b"), Err(FsError::NotFound));
        vfs.mkdir("/a").unwrap();
        vfs.mkdir("/a/b").unwrap();
        assert_eq!(vfs.mkdir("/a"), Err(FsError::Exists));
        assert_eq!(vfs.touch("/a/f"), Ok(true));
        assert_eq!(vfs.touch("/a/f"), Ok(false));
        assert!(vfs.remove("/a/f").is_ok());
        assert_eq!(vfs.remove("/a/f"), Err(FsError::NotFound));
    }

    #[test]
    fn create_dir_all_stops_at_files() {
        let mut vfs = sample();
        vfs.create_dir_all("/mnt/usb/docs").unwrap();
        assert!(vfs.is_dir("/mnt/usb/docs"));
        assert_eq!(vfs.create_dir_all("/home/user/notes.txt/x"), Err(FsError::NotADirectory));
        assert_eq!(vfs.create_dir_all("/home/user/notes.txt"), Err(FsError::NotADirectory));
    }

    #[test]
    fn write_file_truncates_or_appends() {
        let mut vfs = sample();
        vfs.write_file("/home/user/out.txt", "hi\n", false).unwrap();
        vfs.write_file("/home/user/out.txt", "bye\n", true).unwrap();
        assert_eq!(vfs.get_node("/home/user/out.txt").unwrap().content(), Some("hi\nbye\n"));
        vfs.write_file("/home/user/out.txt", "x", false).unwrap();
        assert_eq!(vfs.get_node("/home/user/out.txt").unwrap().content(), Some("x"));
        assert_eq!(vfs.write_file("/home/user/evidence", "x", false), Err(FsError::IsADirectory));
        assert_eq!(vfs.write_file("/tmp/out.txt", "x", false), Err(FsError::NotFound));
    }
}
