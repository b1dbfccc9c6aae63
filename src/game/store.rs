//! Persistence seam for learner state
//!
//! Everything the engine keeps about a user lives in one `UserDocument`:
//! sessions per scenario, completions, badge awards and hint usage.
//! `MemoryStore` keeps documents in process; `JsonStore` additionally writes
//! one `<user>.json` per user.

use crate::data::*;
use crate::shell::Session;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::path::PathBuf;
use std::sync::{Mutex, MutexGuard};

#[derive(thiserror::Error, Debug)]
pub enum StoreError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Corrupted record: {0}")]
    Corrupted(#[from] serde_json::Error),

    #[error("Store unavailable: {0}")]
    Unavailable(String),
}

/// Shell state and task pointer for one (user, scenario)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionRecord {
    pub session: Session,
    pub progress: ScenarioProgress,
}

/// All durable state of one user
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserDocument {
    pub user: String,
    #[serde(default)]
    pub sessions: BTreeMap<String, SessionRecord>,
    #[serde(default)]
    pub completions: Vec<Completion>,
    #[serde(default)]
    pub badges: Vec<BadgeAward>,
    #[serde(default)]
    pub hint_requests: BTreeMap<String, u32>,   // scenario id -> hints fetched
    #[serde(default)]
    pub hint_unlocks: Vec<HintUnlock>,
    #[serde(default)]
    pub completed_scenarios: BTreeSet<String>,
}

impl UserDocument {
    pub fn new(user: &str) -> Self {
        Self { user: user.to_string(), ..Default::default() }
    }
}

/// Storage operations the engine relies on.
///
/// Inserts are keyed: a second completion for the same (user, task) or a
/// second award of the same badge is refused with `Ok(false)`.
pub trait ProgressStore: Send + Sync {
    fn load_session(&self, user: &str, scenario_id: &str) -> Result<Option<SessionRecord>, StoreError>;
    fn save_session(&self, user: &str, scenario_id: &str, record: &SessionRecord) -> Result<(), StoreError>;

    fn completion(&self, user: &str, task_id: &str) -> Result<Option<Completion>, StoreError>;
    fn completions(&self, user: &str) -> Result<Vec<Completion>, StoreError>;
    fn insert_completion(&self, completion: Completion) -> Result<bool, StoreError>;

    /// Records a completion together with the advanced session in one write.
    /// Nothing is stored when the task was already completed (`Ok(false)`)
    /// or when the write fails.
    fn commit_submission(
        &self,
        user: &str,
        scenario_id: &str,
        completion: Completion,
        record: &SessionRecord,
    ) -> Result<bool, StoreError>;

    fn badges(&self, user: &str) -> Result<Vec<BadgeAward>, StoreError>;
    fn insert_badge(&self, award: BadgeAward) -> Result<bool, StoreError>;

    /// Returns true only the first time a scenario is marked for this user
    fn mark_scenario_completed(&self, user: &str, scenario_id: &str) -> Result<bool, StoreError>;

    fn record_hint_request(&self, user: &str, scenario_id: &str) -> Result<u32, StoreError>;
    fn hint_requests(&self, user: &str, scenario_id: &str) -> Result<u32, StoreError>;
    fn hint_unlocked(&self, user: &str, task_id: &str) -> Result<bool, StoreError>;
    fn unlock_hint(&self, user: &str, unlock: HintUnlock) -> Result<bool, StoreError>;

    fn users(&self) -> Result<Vec<String>, StoreError>;

    /// Σ completion scores + Σ badge points
    fn total_score(&self, user: &str) -> Result<i64, StoreError> {
        let completions = self.completions(user)?;
        let badges = self.badges(user)?;
        Ok(super::scoring::total_score(&completions, &badges))
    }
}

/// Where documents go besides memory
pub trait Persist: Send + Sync {
    fn load(&self, user: &str) -> Result<Option<UserDocument>, StoreError>;
    fn save(&self, doc: &UserDocument) -> Result<(), StoreError>;
    fn users(&self) -> Result<Vec<String>, StoreError>;
}

/// Nowhere: documents live as long as the process
#[derive(Debug, Default)]
pub struct Volatile;

impl Persist for Volatile {
    fn load(&self, _user: &str) -> Result<Option<UserDocument>, StoreError> {
        Ok(None)
    }

    fn save(&self, _doc: &UserDocument) -> Result<(), StoreError> {
        Ok(())
    }

    fn users(&self) -> Result<Vec<String>, StoreError> {
        Ok(Vec::new())
    }
}

/// One pretty-printed JSON file per user
#[derive(Debug)]
pub struct JsonFiles {
    dir: PathBuf,
}

impl JsonFiles {
    fn path(&self, user: &str) -> PathBuf {
        // keep user names from escaping the data directory
        let safe: String = user
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' || c == '.' { c } else { '_' })
            .collect();
        self.dir.join(format!("{}.json", safe.trim_start_matches('.')))
    }
}

impl Persist for JsonFiles {
    fn load(&self, user: &str) -> Result<Option<UserDocument>, StoreError> {
        let path = self.path(user);
        if !path.exists() {
            return Ok(None);
        }
        let raw = std::fs::read_to_string(&path)?;
        Ok(Some(serde_json::from_str(&raw)?))
    }

    fn save(&self, doc: &UserDocument) -> Result<(), StoreError> {
        let path = self.path(&doc.user);
        let tmp = path.with_extension("json.tmp");
        std::fs::write(&tmp, serde_json::to_string_pretty(doc)?)?;
        std::fs::rename(&tmp, &path)?;
        Ok(())
    }

    fn users(&self) -> Result<Vec<String>, StoreError> {
        let mut users = Vec::new();
        for entry in std::fs::read_dir(&self.dir)? {
            let path = entry?.path();
            if path.extension().map(|e| e == "json").unwrap_or(false) {
                if let Some(Ok(doc)) = std::fs::read_to_string(&path)
                    .ok()
                    .map(|raw| serde_json::from_str::<UserDocument>(&raw))
                {
                    users.push(doc.user);
                }
            }
        }
        Ok(users)
    }
}

/// Document cache in front of a `Persist` backend. Writes go to a copy which
/// replaces the cached document only once the backend accepted it.
pub struct DocumentStore<P: Persist> {
    docs: Mutex<HashMap<String, UserDocument>>,
    persist: P,
}

pub type MemoryStore = DocumentStore<Volatile>;
pub type JsonStore = DocumentStore<JsonFiles>;

impl MemoryStore {
    pub fn new() -> Self {
        Self::with_backend(Volatile)
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl JsonStore {
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir)?;
        log::info!("using JSON store in {}", dir.display());
        Ok(Self::with_backend(JsonFiles { dir }))
    }
}

impl<P: Persist> DocumentStore<P> {
    pub fn with_backend(persist: P) -> Self {
        Self { docs: Mutex::new(HashMap::new()), persist }
    }

    fn lock(&self) -> Result<MutexGuard<'_, HashMap<String, UserDocument>>, StoreError> {
        self.docs
            .lock()
            .map_err(|_| StoreError::Unavailable("document cache lock poisoned".into()))
    }

    fn hydrate<'a>(
        &self,
        docs: &'a mut HashMap<String, UserDocument>,
        user: &str,
    ) -> Result<&'a mut UserDocument, StoreError> {
        if !docs.contains_key(user) {
            let doc = self.persist.load(user)?.unwrap_or_else(|| UserDocument::new(user));
            docs.insert(user.to_string(), doc);
        }
        docs.get_mut(user)
            .ok_or_else(|| StoreError::Unavailable(format!("document for {} vanished", user)))
    }

    fn read<R>(&self, user: &str, f: impl FnOnce(&UserDocument) -> R) -> Result<R, StoreError> {
        let mut docs = self.lock()?;
        let doc = self.hydrate(&mut docs, user)?;
        Ok(f(doc))
    }

    fn write<R>(&self, user: &str, f: impl FnOnce(&mut UserDocument) -> R) -> Result<R, StoreError> {
        let mut docs = self.lock()?;
        let doc = self.hydrate(&mut docs, user)?;
        let mut draft = doc.clone();
        let result = f(&mut draft);
        if draft != *doc {
            self.persist.save(&draft)?;
            *doc = draft;
        }
        Ok(result)
    }
}

impl<P: Persist> ProgressStore for DocumentStore<P> {
    fn load_session(&self, user: &str, scenario_id: &str) -> Result<Option<SessionRecord>, StoreError> {
        self.read(user, |doc| doc.sessions.get(scenario_id).cloned())
    }

    fn save_session(&self, user: &str, scenario_id: &str, record: &SessionRecord) -> Result<(), StoreError> {
        self.write(user, |doc| {
            doc.sessions.insert(scenario_id.to_string(), record.clone());
        })
    }

    fn completion(&self, user: &str, task_id: &str) -> Result<Option<Completion>, StoreError> {
        self.read(user, |doc| doc.completions.iter().find(|c| c.task_id == task_id).cloned())
    }

    fn completions(&self, user: &str) -> Result<Vec<Completion>, StoreError> {
        self.read(user, |doc| doc.completions.clone())
    }

    fn insert_completion(&self, completion: Completion) -> Result<bool, StoreError> {
        let user = completion.user.clone();
        self.write(&user, |doc| {
            if doc.completions.iter().any(|c| c.task_id == completion.task_id) {
                return false;
            }
            doc.completions.push(completion);
            true
        })
    }

    fn commit_submission(
        &self,
        user: &str,
        scenario_id: &str,
        completion: Completion,
        record: &SessionRecord,
    ) -> Result<bool, StoreError> {
        self.write(user, |doc| {
            if doc.completions.iter().any(|c| c.task_id == completion.task_id) {
                return false;
            }
            doc.completions.push(completion);
            doc.sessions.insert(scenario_id.to_string(), record.clone());
            true
        })
    }

    fn badges(&self, user: &str) -> Result<Vec<BadgeAward>, StoreError> {
        self.read(user, |doc| doc.badges.clone())
    }

    fn insert_badge(&self, award: BadgeAward) -> Result<bool, StoreError> {
        let user = award.user.clone();
        self.write(&user, |doc| {
            if doc.badges.iter().any(|b| b.badge_code == award.badge_code) {
                return false;
            }
            doc.badges.push(award);
            true
        })
    }

    fn mark_scenario_completed(&self, user: &str, scenario_id: &str) -> Result<bool, StoreError> {
        self.write(user, |doc| doc.completed_scenarios.insert(scenario_id.to_string()))
    }

    fn record_hint_request(&self, user: &str, scenario_id: &str) -> Result<u32, StoreError> {
        self.write(user, |doc| {
            let count = doc.hint_requests.entry(scenario_id.to_string()).or_insert(0);
            *count += 1;
            *count
        })
    }

    fn hint_requests(&self, user: &str, scenario_id: &str) -> Result<u32, StoreError> {
        self.read(user, |doc| doc.hint_requests.get(scenario_id).copied().unwrap_or(0))
    }

    fn hint_unlocked(&self, user: &str, task_id: &str) -> Result<bool, StoreError> {
        self.read(user, |doc| doc.hint_unlocks.iter().any(|h| h.task_id == task_id))
    }

    fn unlock_hint(&self, user: &str, unlock: HintUnlock) -> Result<bool, StoreError> {
        self.write(user, |doc| {
            if doc.hint_unlocks.iter().any(|h| h.task_id == unlock.task_id) {
                return false;
            }
            doc.hint_unlocks.push(unlock);
            true
        })
    }

    fn users(&self) -> Result<Vec<String>, StoreError> {
        let mut users: BTreeSet<String> = self.persist.users()?.into_iter().collect();
        users.extend(self.lock()?.keys().cloned());
        Ok(users.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn completion(user: &str, task_id: &str, score: i64) -> Completion {
        Completion {
            user: user.into(),
            task_id: task_id.into(),
            scenario_id: "s".into(),
            score_awarded: score,
            time_ms: 1_000,
            completed_at: Utc::now(),
        }
    }

    fn badge(user: &str, code: &str, points: i64) -> BadgeAward {
        BadgeAward { user: user.into(), badge_code: code.into(), points_awarded: points, awarded_at: Utc::now() }
    }

    #[test]
    fn completions_and_badges_are_unique() {
        let store = MemoryStore::new();
        assert!(store.insert_completion(completion("ana", "t1", 10)).unwrap());
        assert!(!store.insert_completion(completion("ana", "t1", 10)).unwrap());
        assert!(store.insert_completion(completion("bo", "t1", 10)).unwrap());
        assert!(store.insert_badge(badge("ana", "speed_runner", 50)).unwrap());
        assert!(!store.insert_badge(badge("ana", "speed_runner", 50)).unwrap());
        assert_eq!(store.total_score("ana").unwrap(), 60);
        assert_eq!(store.users().unwrap(), vec!["ana".to_string(), "bo".to_string()]);
    }

    #[test]
    fn hint_counters_and_unlocks() {
        let store = MemoryStore::new();
        assert_eq!(store.hint_requests("ana", "s").unwrap(), 0);
        store.record_hint_request("ana", "s").unwrap();
        assert_eq!(store.record_hint_request("ana", "s").unwrap(), 2);
        let unlock = HintUnlock { task_id: "t1".into(), cost: 5, unlocked_at: Utc::now() };
        assert!(store.unlock_hint("ana", unlock.clone()).unwrap());
        assert!(!store.unlock_hint("ana", unlock).unwrap());
        assert!(store.hint_unlocked("ana", "t1").unwrap());
        assert!(!store.hint_unlocked("ana", "t2").unwrap());
        assert!(store.mark_scenario_completed("ana", "s").unwrap());
        assert!(!store.mark_scenario_completed("ana", "s").unwrap());
    }

    #[test]
    fn json_store_survives_reopen() {
        let dir = std::env::temp_dir().join(format!("incident-lab-store-{}", Id::new()));
        {
            let store = JsonStore::open(&dir).unwrap();
            store.insert_completion(completion("ana", "t1", 10)).unwrap();
            let record = SessionRecord {
                session: Session::new(Node::dir(), "/home/user", "ana"),
                progress: ScenarioProgress::new("s"),
            };
            store.save_session("ana", "s", &record).unwrap();
        }
        let store = JsonStore::open(&dir).unwrap();
        assert_eq!(store.completions("ana").unwrap().len(), 1);
        assert_eq!(store.load_session("ana", "s").unwrap().unwrap().session.cwd, "/home/user");
        assert_eq!(store.users().unwrap(), vec!["ana".to_string()]);
        std::fs::remove_dir_all(&dir).unwrap();
    }

    struct Broken;

    impl Persist for Broken {
        fn load(&self, _user: &str) -> Result<Option<UserDocument>, StoreError> {
            Ok(None)
        }
        fn save(&self, _doc: &UserDocument) -> Result<(), StoreError> {
            Err(StoreError::Unavailable("disk full".into()))
        }
        fn users(&self) -> Result<Vec<String>, StoreError> {
            Ok(Vec::new())
        }
    }

    #[test]
    fn failed_write_leaves_cache_untouched() {
        let store = DocumentStore::with_backend(Broken);
        assert!(store.insert_completion(completion("ana", "t1", 10)).is_err());
        assert!(store.completions("ana").unwrap().is_empty());
    }

    #[test]
    fn submission_commits_completion_and_session_together() {
        let record = SessionRecord {
            session: Session::new(Node::dir(), "/home/user", "ana"),
            progress: ScenarioProgress::new("s"),
        };

        let broken = DocumentStore::with_backend(Broken);
        assert!(broken.commit_submission("ana", "s", completion("ana", "t1", 10), &record).is_err());
        assert!(broken.completions("ana").unwrap().is_empty());
        assert!(broken.load_session("ana", "s").unwrap().is_none());

        let store = MemoryStore::new();
        assert!(store.commit_submission("ana", "s", completion("ana", "t1", 10), &record).unwrap());
        assert_eq!(store.load_session("ana", "s").unwrap(), Some(record.clone()));

        let mut moved = record.clone();
        moved.session.cwd = "/tmp".into();
        assert!(!store.commit_submission("ana", "s", completion("ana", "t1", 10), &moved).unwrap());
        assert_eq!(store.load_session("ana", "s").unwrap().unwrap().session.cwd, "/home/user");
        assert_eq!(store.completions("ana").unwrap().len(), 1);
    }
}
