//! Engine tunables

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Knobs for scoring, caching and session defaults. Every field has a default
/// so a partial JSON file is enough.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Total task time at or below which Speed Runner is awarded
    pub speed_run_threshold_ms: u64,

    /// Points granted by each skill badge
    pub skill_badge_points: i64,

    /// How long leaderboard totals may be served from cache
    pub leaderboard_ttl_secs: u64,

    pub default_home: String,
    pub default_user: String,

    /// Where the JSON store keeps per-user documents. `None` keeps everything in memory.
    pub data_dir: Option<PathBuf>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            speed_run_threshold_ms: 5 * 60 * 1000,
            skill_badge_points: 50,
            leaderboard_ttl_secs: 5,
            default_home: "/home/user".to_string(),
            default_user: "analyst".to_string(),
            data_dir: None,
        }
    }
}

impl EngineConfig {
    pub fn load(path: &Path) -> crate::Result<Self> {
        use anyhow::Context;
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        let config = serde_json::from_str(&raw)
            .with_context(|| format!("parsing config {}", path.display()))?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_json_falls_back_to_defaults() {
        let config: EngineConfig = serde_json::from_str(r#"{"leaderboard_ttl_secs": 30}"#).unwrap();
        assert_eq!(config.leaderboard_ttl_secs, 30);
        assert_eq!(config.speed_run_threshold_ms, 300_000);
        assert_eq!(config.default_home, "/home/user");
        assert!(config.data_dir.is_none());
    }
}
