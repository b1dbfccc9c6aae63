//! Data structures shared across the engine
//!
//! Defines filesystem nodes, devices, tasks, learner records and events.

pub mod device;
pub mod events;
pub mod node;
pub mod records;
pub mod task;

pub use device::*;
pub use events::*;
pub use node::*;
pub use records::*;
pub use task::*;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A unique identifier wrapper
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Id(pub Uuid);

impl Id {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for Id {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for Id {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
