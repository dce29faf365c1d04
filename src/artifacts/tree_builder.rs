//! Recursive workspace snapshotting
//!
//! Walks a working directory bottom-up, storing each file as a blob and
//! each directory as a tree whose entries reference the already-stored
//! children. Entries end up sorted by name through the tree's BTreeMap, so
//! the resulting root id is deterministic regardless of the order the
//! filesystem enumerates children in.

use crate::areas::database::Database;
use crate::areas::workspace::Workspace;
use crate::artifacts::objects::blob::Blob;
use crate::artifacts::objects::entry_mode::{EntryMode, FileMode};
use crate::artifacts::objects::object_id::ObjectId;
use crate::artifacts::objects::tree::Tree;
use crate::errors::GitError;
use anyhow::Context;
use derive_new::new;
use is_executable::IsExecutable;
use std::path::Path;

/// Nesting bound guarding against symlink cycles during the walk
pub const MAX_TREE_DEPTH: usize = 256;

#[derive(Debug, new)]
pub struct TreeBuilder<'a> {
    workspace: &'a Workspace,
    database: &'a Database,
}

impl TreeBuilder<'_> {
    /// Snapshot the whole workspace, returning the root tree id
    ///
    /// Subtrees are stored as soon as they are hashed, so every
    /// successfully written tree remains a valid object even if a sibling
    /// fails later (it is merely unreferenced).
    pub fn build(&self) -> anyhow::Result<ObjectId> {
        self.build_tree(self.workspace.path(), 0)
    }

    fn build_tree(&self, dir_path: &Path, depth: usize) -> anyhow::Result<ObjectId> {
        if depth > MAX_TREE_DEPTH {
            return Err(GitError::IoFailure(format!(
                "directory nesting exceeds {MAX_TREE_DEPTH} levels at {}",
                dir_path.display()
            ))
            .into());
        }

        let mut tree = Tree::default();

        for child_path in self.workspace.list_dir(dir_path)? {
            let name = child_path
                .file_name()
                .and_then(|name| name.to_str())
                .context(format!("Invalid entry name in {}", dir_path.display()))?
                .to_string();

            if child_path.is_dir() {
                let child_oid = self.build_tree(&child_path, depth + 1)?;
                tree.add_entry(name, EntryMode::Directory, child_oid);
            } else {
                let content = self.workspace.read_file(&child_path)?;
                let child_oid = self.database.store(&Blob::new(content))?;
                tree.add_entry(name, Self::file_mode(&child_path).into(), child_oid);
            }
        }

        self.database.store(&tree)
    }

    fn file_mode(path: &Path) -> FileMode {
        if path.is_executable() {
            FileMode::Executable
        } else {
            FileMode::Regular
        }
    }
}
