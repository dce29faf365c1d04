use anyhow::Context;
use bytes::Bytes;
use std::path::{Path, PathBuf};

/// Reserved metadata directory name, skipped during tree building
pub const GIT_DIR: &str = ".git";

/// Working directory rooted at the repository path
#[derive(Debug)]
pub struct Workspace {
    path: Box<Path>,
}

impl Workspace {
    pub fn new(path: Box<Path>) -> Self {
        Workspace { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// List the immediate children of a directory, skipping the `.git`
    /// metadata area. Returns absolute paths in filesystem order; callers
    /// that need determinism must sort by name themselves.
    pub fn list_dir(&self, dir_path: &Path) -> anyhow::Result<Vec<PathBuf>> {
        if !dir_path.is_dir() {
            anyhow::bail!("The specified path is not a directory: {:?}", dir_path);
        }

        let entries = std::fs::read_dir(dir_path)
            .context(format!("Unable to read directory {}", dir_path.display()))?
            .collect::<Result<Vec<_>, _>>()
            .context(format!("Unable to list directory {}", dir_path.display()))?;

        Ok(entries
            .into_iter()
            .map(|entry| entry.path())
            .filter(|path| path.file_name().is_none_or(|name| name != GIT_DIR))
            .collect())
    }

    pub fn read_file(&self, path: &Path) -> anyhow::Result<Bytes> {
        let content = std::fs::read(path)
            .context(format!("Unable to read file {}", path.display()))?;

        Ok(Bytes::from(content))
    }
}
