//! Modification polling for the constants table.
//!
//! The library never touches the filesystem on its own; the engine polls
//! the file's modification time and asks the simulation to reload when it
//! changes.

use std::path::{Path, PathBuf};
use std::time::SystemTime;

use tracing::debug;

/// Watches one file for modification-time changes.
#[derive(Debug, Clone)]
pub struct ConstantsWatcher {
    path: PathBuf,
    last_modified: Option<SystemTime>,
}

impl ConstantsWatcher {
    /// Start watching `path`, taking its current modification time as the
    /// baseline.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let last_modified = modified(&path);
        Self {
            path,
            last_modified,
        }
    }

    /// The watched path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Whether the file changed since the previous poll.
    ///
    /// A file that appears, disappears, or gets a new modification time
    /// counts as changed.
    pub fn poll(&mut self) -> bool {
        let current = modified(&self.path);
        if current == self.last_modified {
            return false;
        }
        debug!(path = %self.path.display(), "constants file changed");
        self.last_modified = current;
        true
    }
}

fn modified(path: &Path) -> Option<SystemTime> {
    std::fs::metadata(path).and_then(|meta| meta.modified()).ok()
}
