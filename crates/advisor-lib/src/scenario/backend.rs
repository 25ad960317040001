//! Storage backends for the scenario snapshot

use crate::error::{AdvisorError, Result};
use std::fs::{self, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tracing::debug;

/// Where the serialized snapshot lives
pub trait ScenarioBackend: Send + Sync {
    /// Read the stored document, `None` when nothing was written yet
    fn read(&self) -> Result<Option<String>>;

    /// Replace the stored document
    fn write(&self, data: &str) -> Result<()>;
}

/// JSON file written atomically through a temp file and rename
#[derive(Debug, Clone)]
pub struct FileBackend {
    path: PathBuf,
}

impl FileBackend {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ScenarioBackend for FileBackend {
    fn read(&self) -> Result<Option<String>> {
        match fs::read_to_string(&self.path) {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn write(&self, data: &str) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let temp_path = self.path.with_extension("tmp");
        let mut file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(&temp_path)?;
        file.write_all(data.as_bytes())?;
        file.sync_all()?;

        fs::rename(&temp_path, &self.path)?;
        debug!(path = %self.path.display(), bytes = data.len(), "Scenario snapshot written");
        Ok(())
    }
}

/// In-process backend; clones share the same document
///
/// Writes can be made to fail on demand to exercise the store's
/// degraded-capacity retry.
#[derive(Debug, Clone, Default)]
pub struct MemoryBackend {
    data: Arc<Mutex<Option<String>>>,
    failing_writes: Arc<AtomicUsize>,
    successful_writes: Arc<AtomicUsize>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_content(content: impl Into<String>) -> Self {
        let backend = Self::default();
        if let Ok(mut data) = backend.data.lock() {
            *data = Some(content.into());
        }
        backend
    }

    /// Make the next `count` writes fail
    pub fn fail_next_writes(&self, count: usize) {
        self.failing_writes.store(count, Ordering::SeqCst);
    }

    /// Number of writes that reached the document
    pub fn write_count(&self) -> usize {
        self.successful_writes.load(Ordering::SeqCst)
    }

    pub fn content(&self) -> Option<String> {
        self.data.lock().ok().and_then(|d| d.clone())
    }
}

impl ScenarioBackend for MemoryBackend {
    fn read(&self) -> Result<Option<String>> {
        self.data
            .lock()
            .map(|d| d.clone())
            .map_err(|_| AdvisorError::Io(std::io::Error::other("scenario backend poisoned")))
    }

    fn write(&self, data: &str) -> Result<()> {
        let remaining = self.failing_writes.load(Ordering::SeqCst);
        if remaining > 0 {
            self.failing_writes.store(remaining - 1, Ordering::SeqCst);
            return Err(AdvisorError::Io(std::io::Error::other(
                "storage quota exceeded",
            )));
        }

        let mut stored = self
            .data
            .lock()
            .map_err(|_| AdvisorError::Io(std::io::Error::other("scenario backend poisoned")))?;
        *stored = Some(data.to_string());
        self.successful_writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}
