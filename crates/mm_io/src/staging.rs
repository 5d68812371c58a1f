//! Staged output trees.
//! - Files are written under a sibling staging directory of the target
//! - `commit` moves every staged file into the target (same filesystem, renames only)
//! - Dropping an uncommitted stage removes it; the target is never touched

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::IoError;

/// `<parent>/.<name>.staging-<pid>` next to `target`.
pub fn staging_path(target: &Path) -> PathBuf {
    let parent = match target.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    let name = target
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "out".to_string());
    parent.join(format!(".{name}.staging-{}", std::process::id()))
}

#[derive(Debug)]
pub struct StagingDir {
    path: PathBuf,
}

impl StagingDir {
    /// Create a fresh staging directory for `target`. Fails if one already exists.
    pub fn create(target: &Path) -> Result<Self, IoError> {
        let path = staging_path(target);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| path_err(parent, e))?;
        }
        fs::create_dir(&path).map_err(|e| path_err(&path, e))?;
        Ok(Self { path })
    }

    #[inline]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Move every staged file into `target`, keeping relative paths.
    /// Returns the number of files moved.
    pub fn commit(self, target: &Path) -> Result<usize, IoError> {
        let mut moved = 0;
        move_tree(&self.path, target, &mut moved).map_err(|e| path_err(target, e))?;
        debug!(target = %target.display(), files = moved, "committed staged output");
        Ok(moved)
    }
}

impl Drop for StagingDir {
    fn drop(&mut self) {
        let _ = fs::remove_dir_all(&self.path);
    }
}

fn move_tree(from: &Path, to: &Path, moved: &mut usize) -> io::Result<()> {
    fs::create_dir_all(to)?;
    for entry in fs::read_dir(from)? {
        let entry = entry?;
        let dest = to.join(entry.file_name());
        if entry.file_type()?.is_dir() {
            move_tree(&entry.path(), &dest, moved)?;
        } else {
            fs::rename(entry.path(), &dest)?;
            *moved += 1;
        }
    }
    Ok(())
}

fn path_err(p: &Path, e: io::Error) -> IoError {
    IoError::Path(format!("{}: {e}", p.display()))
}
