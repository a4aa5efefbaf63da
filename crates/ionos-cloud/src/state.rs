//! Tracked resource state
//!
//! Keeps `.ionos/state.json` with every resource created through this
//! workspace, so later reads, updates and deletes know the ID, location and
//! last observed attributes. A read that finds the resource gone removes it.

use crate::error::{CloudError, Result};
use crate::resource::{ResourceRef, ResourceStatus};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tokio::fs;

const STATE_VERSION: u32 = 1;
const STATE_DIR: &str = ".ionos";
const STATE_FILE: &str = "state.json";
const STATE_BACKUP: &str = "state.json.backup";
const LOCK_FILE: &str = "lock.json";

/// All tracked resources
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrackedState {
    pub version: u32,

    pub updated_at: DateTime<Utc>,

    /// Resources indexed by `kind:id`
    pub resources: BTreeMap<String, TrackedResource>,
}

impl Default for TrackedState {
    fn default() -> Self {
        Self {
            version: STATE_VERSION,
            updated_at: Utc::now(),
            resources: BTreeMap::new(),
        }
    }
}

impl TrackedState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn key(kind: &str, id: &str) -> String {
        format!("{}:{}", kind, id)
    }

    /// Insert or replace a resource
    pub fn track(&mut self, resource: TrackedResource) {
        let key = Self::key(&resource.kind, &resource.id);
        self.resources.insert(key, resource);
        self.updated_at = Utc::now();
    }

    /// Drop a resource, e.g. after a read reported it deleted out-of-band
    pub fn forget(&mut self, kind: &str, id: &str) -> Option<TrackedResource> {
        let removed = self.resources.remove(&Self::key(kind, id));
        if removed.is_some() {
            self.updated_at = Utc::now();
        }
        removed
    }

    pub fn get(&self, kind: &str, id: &str) -> Option<&TrackedResource> {
        self.resources.get(&Self::key(kind, id))
    }

    pub fn by_kind<'a>(&'a self, kind: &'a str) -> impl Iterator<Item = &'a TrackedResource> {
        self.resources.values().filter(move |r| r.kind == kind)
    }
}

/// One tracked resource
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrackedResource {
    pub kind: String,

    pub id: String,

    #[serde(default)]
    pub location: String,

    pub status: ResourceStatus,

    /// Last observed attributes (endpoints, names, create-only secrets, ...)
    #[serde(default)]
    pub attributes: serde_json::Value,

    pub created_at: DateTime<Utc>,

    pub updated_at: DateTime<Utc>,
}

impl TrackedResource {
    pub fn new(target: &ResourceRef, attributes: serde_json::Value) -> Self {
        let now = Utc::now();
        Self {
            kind: target.kind.to_string(),
            id: target.id.clone(),
            location: target.location.clone(),
            status: ResourceStatus::Available,
            attributes,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn with_status(mut self, status: ResourceStatus) -> Self {
        self.status = status;
        self
    }

    /// Replace attributes after a read or update, keeping the creation time
    pub fn refresh(&mut self, attributes: serde_json::Value, status: ResourceStatus) {
        self.attributes = attributes;
        self.status = status;
        self.updated_at = Utc::now();
    }
}

/// Reads and writes the state file under a project root
pub struct StateManager {
    root: PathBuf,
}

impl StateManager {
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    fn state_dir(&self) -> PathBuf {
        self.root.join(STATE_DIR)
    }

    fn state_path(&self) -> PathBuf {
        self.state_dir().join(STATE_FILE)
    }

    fn backup_path(&self) -> PathBuf {
        self.state_dir().join(STATE_BACKUP)
    }

    fn lock_path(&self) -> PathBuf {
        self.state_dir().join(LOCK_FILE)
    }

    async fn ensure_state_dir(&self) -> Result<()> {
        let dir = self.state_dir();
        if !fs::try_exists(&dir).await? {
            fs::create_dir_all(&dir).await?;
            tracing::debug!("Created state directory: {}", dir.display());
        }
        Ok(())
    }

    pub async fn load(&self) -> Result<TrackedState> {
        let path = self.state_path();
        if !fs::try_exists(&path).await? {
            tracing::debug!("State file not found, starting empty");
            return Ok(TrackedState::new());
        }

        let content = fs::read_to_string(&path).await?;
        let state: TrackedState = serde_json::from_str(&content)?;

        if state.version > STATE_VERSION {
            return Err(CloudError::StateError(format!(
                "State file version {} is newer than supported version {}",
                state.version, STATE_VERSION
            )));
        }

        tracing::debug!(resources = state.resources.len(), "Loaded state");
        Ok(state)
    }

    /// Write the state, keeping the previous file as a backup
    pub async fn save(&self, state: &TrackedState) -> Result<()> {
        self.ensure_state_dir().await?;

        let path = self.state_path();
        if fs::try_exists(&path).await? {
            fs::copy(&path, self.backup_path()).await?;
        }

        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, serde_json::to_string_pretty(state)?).await?;
        fs::rename(&tmp, &path).await?;

        tracing::debug!(resources = state.resources.len(), "Saved state");
        Ok(())
    }

    /// Take the state lock; locks older than an hour are considered stale
    pub async fn acquire_lock(&self) -> Result<StateLock> {
        self.ensure_state_dir().await?;

        let lock_path = self.lock_path();
        if fs::try_exists(&lock_path).await? {
            let content = fs::read_to_string(&lock_path).await?;
            let info: LockInfo = serde_json::from_str(&content)?;

            let age = Utc::now().signed_duration_since(info.acquired_at);
            if age.num_hours() < 1 {
                return Err(CloudError::LockError(format!(
                    "State is locked by {} (pid {}) since {}",
                    info.holder, info.pid, info.acquired_at
                )));
            }
            tracing::warn!("Removing stale lock held by {}", info.holder);
        }

        let info = LockInfo {
            holder: std::env::var("HOSTNAME")
                .or_else(|_| std::env::var("HOST"))
                .unwrap_or_else(|_| "unknown".to_string()),
            pid: std::process::id(),
            acquired_at: Utc::now(),
        };
        fs::write(&lock_path, serde_json::to_string_pretty(&info)?).await?;

        tracing::debug!("Acquired state lock");
        Ok(StateLock {
            lock_path,
            released: false,
        })
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct LockInfo {
    holder: String,
    #[serde(default)]
    pid: u32,
    acquired_at: DateTime<Utc>,
}

/// Guard for the state lock; released on drop if not released explicitly
pub struct StateLock {
    lock_path: PathBuf,
    released: bool,
}

impl StateLock {
    pub async fn release(mut self) -> Result<()> {
        if !self.released {
            if fs::try_exists(&self.lock_path).await? {
                fs::remove_file(&self.lock_path).await?;
                tracing::debug!("Released state lock");
            }
            self.released = true;
        }
        Ok(())
    }
}

impl Drop for StateLock {
    fn drop(&mut self) {
        if !self.released {
            let _ = std::fs::remove_file(&self.lock_path);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn pipeline(id: &str) -> TrackedResource {
        TrackedResource::new(
            &ResourceRef::new("pipeline", id, "de/fra"),
            serde_json::json!({ "name": "logs", "grafana_endpoint": "grafana.example" }),
        )
    }

    #[tokio::test]
    async fn test_state_save_load() {
        let dir = tempdir().unwrap();
        let manager = StateManager::new(dir.path());

        let mut state = TrackedState::new();
        state.track(pipeline("p-1"));
        manager.save(&state).await.unwrap();

        let loaded = manager.load().await.unwrap();
        let tracked = loaded.get("pipeline", "p-1").unwrap();
        assert_eq!(tracked.location, "de/fra");
        assert_eq!(tracked.status, ResourceStatus::Available);
        assert_eq!(tracked.attributes["name"], "logs");
    }

    #[tokio::test]
    async fn test_empty_state() {
        let dir = tempdir().unwrap();
        let state = StateManager::new(dir.path()).load().await.unwrap();
        assert!(state.resources.is_empty());
    }

    #[tokio::test]
    async fn test_save_keeps_backup() {
        let dir = tempdir().unwrap();
        let manager = StateManager::new(dir.path());

        let mut state = TrackedState::new();
        state.track(pipeline("p-1"));
        manager.save(&state).await.unwrap();
        state.track(pipeline("p-2"));
        manager.save(&state).await.unwrap();

        let backup = std::fs::read_to_string(dir.path().join(".ionos/state.json.backup")).unwrap();
        assert!(backup.contains("p-1"));
        assert!(!backup.contains("p-2"));
    }

    #[test]
    fn test_forget() {
        let mut state = TrackedState::new();
        state.track(pipeline("p-1"));
        assert!(state.forget("pipeline", "p-1").is_some());
        assert!(state.forget("pipeline", "p-1").is_none());
        assert_eq!(state.by_kind("pipeline").count(), 0);
    }

    #[tokio::test]
    async fn test_lock_is_exclusive() {
        let dir = tempdir().unwrap();
        let manager = StateManager::new(dir.path());

        let lock = manager.acquire_lock().await.unwrap();
        let err = manager.acquire_lock().await.err().unwrap();
        assert!(matches!(err, CloudError::LockError(_)));

        lock.release().await.unwrap();
        let again = manager.acquire_lock().await.unwrap();
        drop(again);
        assert!(!dir.path().join(".ionos/lock.json").exists());
    }
}
