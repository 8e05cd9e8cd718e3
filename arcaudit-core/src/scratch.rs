//! Scratch extraction directories with probe-based unique naming.

use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

/// Allocates uniquely named extraction directories under a parent directory.
///
/// `acquire` probes `scratch_0`, `scratch_1`, ... and takes the first name
/// not present on disk. Processing is depth-first and single-threaded, so at
/// most one directory per recursion branch is live at a time and the probe
/// cannot race with itself. A concurrent caller would need an atomic
/// reservation scheme instead.
pub struct ScratchSpace {
    parent: PathBuf,
}

/// Handle to one live scratch directory.
///
/// The walker's extraction contract keeps the directory flat: it only ever
/// holds direct child files, never sub-directories.
#[derive(Debug)]
pub struct ScratchDir {
    path: PathBuf,
}

impl ScratchDir {
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ScratchSpace {
    pub fn new(parent: impl AsRef<Path>) -> Self {
        Self {
            parent: parent.as_ref().to_path_buf(),
        }
    }

    /// Create the first unused `scratch_<n>` directory and return its handle.
    pub fn acquire(&self) -> Result<ScratchDir> {
        let mut index = 0usize;
        loop {
            let candidate = self.parent.join(format!("scratch_{index}"));
            if !candidate.exists() {
                fs::create_dir(&candidate).with_context(|| {
                    format!("Failed to create scratch directory {}", candidate.display())
                })?;
                return Ok(ScratchDir { path: candidate });
            }
            index += 1;
        }
    }

    /// Remove every file inside the scratch directory, then the directory
    /// itself.
    ///
    /// A failure here must reach the caller: a leaked directory would be
    /// seen by every later probe and treated as permanently in use.
    pub fn release(&self, dir: ScratchDir) -> Result<()> {
        let entries = fs::read_dir(dir.path()).with_context(|| {
            format!("Failed to list scratch directory {}", dir.path().display())
        })?;
        for entry in entries {
            let entry = entry
                .with_context(|| format!("Failed to read entry in {}", dir.path().display()))?;
            fs::remove_file(entry.path())
                .with_context(|| format!("Failed to remove {}", entry.path().display()))?;
        }
        fs::remove_dir(dir.path()).with_context(|| {
            format!("Failed to remove scratch directory {}", dir.path().display())
        })?;
        Ok(())
    }
}
