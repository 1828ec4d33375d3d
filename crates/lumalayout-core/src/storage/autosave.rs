//! Periodic auto-save of the open project.
//!
//! Fire-and-forget with respect to the interaction loop: the shell ticks
//! `maybe_save` on its timer with a serialized snapshot, and nothing in the
//! editing path ever waits on the result. Save outcomes are recorded in an
//! observable status instead of being swallowed.

use super::{Storage, StorageResult};
use crate::project::ProjectDocument;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Default auto-save interval in seconds.
pub const DEFAULT_AUTOSAVE_INTERVAL_SECS: u64 = 30;

/// Key for the "last opened" project used for auto-restore.
pub const LAST_PROJECT_KEY: &str = "__last_project__";

/// Outcome of the most recent save attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaveStatus {
    /// No save attempted yet.
    Idle,
    Saved,
    Failed(String),
}

/// Manages automatic project persistence.
pub struct AutoSaveManager<S: Storage> {
    storage: Arc<S>,
    interval: Duration,
    last_save: Option<Instant>,
    dirty: bool,
    current_project: Option<String>,
    status: SaveStatus,
}

impl<S: Storage> AutoSaveManager<S> {
    pub fn new(storage: Arc<S>) -> Self {
        Self {
            storage,
            interval: Duration::from_secs(DEFAULT_AUTOSAVE_INTERVAL_SECS),
            last_save: None,
            dirty: false,
            current_project: None,
            status: SaveStatus::Idle,
        }
    }

    pub fn set_interval(&mut self, interval: Duration) {
        self.interval = interval;
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Mark the project as having unsaved changes.
    pub fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn set_project_name(&mut self, name: Option<String>) {
        self.current_project = name;
    }

    pub fn project_name(&self) -> Option<&str> {
        self.current_project.as_deref()
    }

    /// Outcome of the most recent save attempt, for the shell and tests.
    pub fn last_status(&self) -> &SaveStatus {
        &self.status
    }

    /// Whether a save is due: dirty and the interval elapsed.
    pub fn should_save(&self) -> bool {
        if !self.dirty {
            return false;
        }
        match self.last_save {
            Some(last) => last.elapsed() >= self.interval,
            None => true,
        }
    }

    /// Save if due. Returns true when a save was performed. Failures are
    /// recorded in the status and do not reach the interaction loop.
    pub async fn maybe_save(&mut self, document: &ProjectDocument) -> bool {
        if !self.should_save() {
            return false;
        }
        let _ = self.save(document).await;
        true
    }

    /// Force a save immediately, recording the outcome.
    pub async fn save(&mut self, document: &ProjectDocument) -> StorageResult<()> {
        let name = self
            .current_project
            .clone()
            .unwrap_or_else(|| LAST_PROJECT_KEY.to_string());

        let result = async {
            self.storage.save(&name, document).await?;
            // Also save under the auto-restore key.
            self.storage.save(LAST_PROJECT_KEY, document).await
        }
        .await;

        self.last_save = Some(Instant::now());
        match &result {
            Ok(()) => {
                self.dirty = false;
                self.status = SaveStatus::Saved;
            }
            Err(err) => {
                log::warn!("auto-save failed: {err}");
                self.status = SaveStatus::Failed(err.to_string());
            }
        }
        result
    }

    /// Load a project by name.
    pub async fn load(&mut self, name: &str) -> StorageResult<ProjectDocument> {
        let doc = self.storage.load(name).await?;
        self.current_project = Some(name.to_string());
        self.dirty = false;
        self.last_save = Some(Instant::now());
        Ok(doc)
    }

    /// Try to restore the last opened project.
    pub async fn load_last(&mut self) -> Option<ProjectDocument> {
        match self.storage.load(LAST_PROJECT_KEY).await {
            Ok(doc) => {
                self.dirty = false;
                self.last_save = Some(Instant::now());
                Some(doc)
            }
            Err(_) => None,
        }
    }

    pub async fn delete(&self, name: &str) -> StorageResult<()> {
        self.storage.delete(name).await
    }

    /// All stored project names, minus the auto-restore key.
    pub async fn list_projects(&self) -> StorageResult<Vec<String>> {
        let mut names = self.storage.list().await?;
        names.retain(|name| name != LAST_PROJECT_KEY);
        Ok(names)
    }

    pub fn storage(&self) -> &Arc<S> {
        &self.storage
    }
}
