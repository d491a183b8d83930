use crate::error::{Result, TaskError};
use crate::models::{Status, Task, normalize_description};
use chrono::{DateTime, SubsecRound, Utc};
use std::collections::BTreeMap;
use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::{debug, info, warn};

/// Default store file, relative to the working directory
pub const DEFAULT_STORE_FILE: &str = "tasks.json";

/// In-memory task mapping backed by a single JSON file.
///
/// Ids are assigned monotonically, so iterating the map by key yields
/// tasks in insertion order.
#[derive(Debug)]
pub struct TaskStore {
    path: PathBuf,
    tasks: BTreeMap<u64, Task>,
    last_id: u64,
}

impl TaskStore {
    /// Load the store from `path`.
    ///
    /// A missing or unparsable file yields an empty store, and the file is
    /// reset to `{}`. Other read failures are returned as errors.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref().to_path_buf();

        let loaded = match fs::read_to_string(&path) {
            Ok(content) => match serde_json::from_str::<BTreeMap<u64, Task>>(&content) {
                Ok(tasks) if tasks.contains_key(&0) => {
                    warn!(path = %path.display(), "store file uses task id 0, starting empty");
                    None
                }
                Ok(tasks) => Some(tasks),
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "store file is malformed, starting empty");
                    None
                }
            },
            Err(e) if e.kind() == ErrorKind::NotFound => {
                info!(path = %path.display(), "store file not found, creating it");
                None
            }
            Err(e) => return Err(e.into()),
        };

        let mut store = TaskStore {
            path,
            tasks: BTreeMap::new(),
            last_id: 0,
        };

        match loaded {
            Some(mut tasks) => {
                for (id, task) in tasks.iter_mut() {
                    task.id = *id;
                }
                store.last_id = tasks.keys().next_back().copied().unwrap_or(0);
                store.tasks = tasks;
                debug!(count = store.tasks.len(), "loaded tasks");
            }
            None => store.save()?,
        }

        Ok(store)
    }

    /// Path of the backing file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Number of tasks held in memory
    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    /// Whether the store holds no tasks
    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Get a task by ID
    pub fn get(&self, id: u64) -> Option<&Task> {
        self.tasks.get(&id)
    }

    // ==================== Task Operations ====================

    /// Add a task, returning its stored description and new id
    pub fn add(&mut self, description: &str) -> Result<(String, u64)> {
        let description = normalize_description(description)?;
        let id = self.next_id()?;

        self.tasks.insert(id, Task::new(id, description.clone(), now()));
        self.last_id = id;
        debug!(id, "added task");

        Ok((description, id))
    }

    /// Replace a task's description, returning the old and new descriptions
    pub fn update(&mut self, id: u64, description: &str) -> Result<(String, String)> {
        let task = self.tasks.get_mut(&id).ok_or(TaskError::NotFound(id))?;
        let description = normalize_description(description)?;

        let old = std::mem::replace(&mut task.description, description.clone());
        task.updated_at = Some(now());
        debug!(id, "updated task");

        Ok((old, description))
    }

    /// Remove a task and return it
    pub fn delete(&mut self, id: u64) -> Result<Task> {
        let task = self.tasks.remove(&id).ok_or(TaskError::NotFound(id))?;
        debug!(id, "deleted task");
        Ok(task)
    }

    /// Change a task's status, returning `(old, new, description)`.
    ///
    /// Marking a task with its current status is rejected with
    /// [`TaskError::NoChange`] and leaves the task untouched.
    pub fn mark_status(&mut self, id: u64, status: Status) -> Result<(Status, Status, String)> {
        let task = self.tasks.get_mut(&id).ok_or(TaskError::NotFound(id))?;

        if task.status == status {
            return Err(TaskError::NoChange { id, status });
        }

        let old = task.status;
        task.status = status;
        task.updated_at = Some(now());
        debug!(id, from = %old, to = %status, "marked task");

        Ok((old, status, task.description.clone()))
    }

    /// List tasks in insertion order, optionally filtered by status
    pub fn list(&self, status: Option<Status>) -> Vec<&Task> {
        self.tasks
            .values()
            .filter(|task| status.is_none_or(|s| task.status == s))
            .collect()
    }

    /// Write the full mapping to the backing file.
    ///
    /// The content goes to a temporary file next to the target which is
    /// then renamed over it, so readers never see a partial write.
    pub fn save(&self) -> Result<()> {
        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        fs::create_dir_all(dir)?;

        let content = serde_json::to_string_pretty(&self.tasks)?;
        let mut file = NamedTempFile::new_in(dir)?;
        file.write_all(content.as_bytes())?;
        file.write_all(b"\n")?;
        file.persist(&self.path).map_err(|e| e.error)?;

        info!(path = %self.path.display(), count = self.tasks.len(), "saved tasks");
        Ok(())
    }

    fn next_id(&self) -> Result<u64> {
        let max_existing = self.tasks.keys().next_back().copied().unwrap_or(0);
        max_existing
            .max(self.last_id)
            .checked_add(1)
            .ok_or(TaskError::IdExhausted)
    }
}

fn now() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(0)
}
