//! Simulated filesystem: path algebra, the node tree and device mounting

pub mod mount;
pub mod path;
pub mod tree;

pub use mount::{DeviceTable, MountError, MountOutcome};
pub use path::{normalize, resolve_path};
pub use tree::{FsError, Vfs};
