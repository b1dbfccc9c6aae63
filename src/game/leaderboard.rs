//! Leaderboard totals behind a short-lived cache

use serde::{Deserialize, Serialize};
use std::sync::Mutex;
use std::time::{Duration, Instant};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaderboardEntry {
    pub user: String,
    pub total_score: i64,
}

/// Highest score first, ties by name
pub fn rank(entries: &mut [LeaderboardEntry]) {
    entries.sort_by(|a, b| b.total_score.cmp(&a.total_score).then_with(|| a.user.cmp(&b.user)));
}

struct Snapshot {
    taken_at: Instant,
    entries: Vec<LeaderboardEntry>,
}

/// Process-wide cache; every score write must call `invalidate`
pub struct LeaderboardCache {
    ttl: Duration,
    snapshot: Mutex<Option<Snapshot>>,
}

impl LeaderboardCache {
    pub fn new(ttl: Duration) -> Self {
        Self { ttl, snapshot: Mutex::new(None) }
    }

    /// Cached entries if fresh, otherwise recompute with `load`
    pub fn get_or_refresh<E>(
        &self,
        load: impl FnOnce() -> Result<Vec<LeaderboardEntry>, E>,
    ) -> Result<Vec<LeaderboardEntry>, E> {
        let mut snapshot = self.snapshot.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(current) = snapshot.as_ref() {
            if current.taken_at.elapsed() < self.ttl {
                return Ok(current.entries.clone());
            }
        }
        let mut entries = load()?;
        rank(&mut entries);
        log::debug!("leaderboard refreshed with {} entries", entries.len());
        *snapshot = Some(Snapshot { taken_at: Instant::now(), entries: entries.clone() });
        Ok(entries)
    }

    pub fn invalidate(&self) {
        *self.snapshot.lock().unwrap_or_else(|e| e.into_inner()) = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::convert::Infallible;

    fn entry(user: &str, total_score: i64) -> LeaderboardEntry {
        LeaderboardEntry { user: user.into(), total_score }
    }

    #[test]
    fn serves_cached_until_invalidated() {
        let cache = LeaderboardCache::new(Duration::from_secs(60));
        let first = cache.get_or_refresh(|| Ok::<_, Infallible>(vec![entry("ana", 10)])).unwrap();
        assert_eq!(first, vec![entry("ana", 10)]);

        let cached = cache.get_or_refresh(|| Ok::<_, Infallible>(vec![entry("ana", 99)])).unwrap();
        assert_eq!(cached[0].total_score, 10);

        cache.invalidate();
        let fresh = cache.get_or_refresh(|| Ok::<_, Infallible>(vec![entry("ana", 99)])).unwrap();
        assert_eq!(fresh[0].total_score, 99);
    }

    #[test]
    fn zero_ttl_always_reloads_and_sorts() {
        let cache = LeaderboardCache::new(Duration::ZERO);
        cache.get_or_refresh(|| Ok::<_, Infallible>(vec![entry("ana", 1)])).unwrap();
        let entries = cache
            .get_or_refresh(|| Ok::<_, Infallible>(vec![entry("bo", 5), entry("cy", 20), entry("al", 5)]))
            .unwrap();
        let users: Vec<_> = entries.iter().map(|e| e.user.as_str()).collect();
        assert_eq!(users, vec!["cy", "al", "bo"]);
    }

    #[test]
    fn failed_refresh_keeps_nothing() {
        let cache = LeaderboardCache::new(Duration::from_secs(60));
        assert!(cache.get_or_refresh(|| Err::<Vec<LeaderboardEntry>, _>("down")).is_err());
        let entries = cache.get_or_refresh(|| Ok::<_, &str>(vec![entry("ana", 3)])).unwrap();
        assert_eq!(entries.len(), 1);
    }
}
