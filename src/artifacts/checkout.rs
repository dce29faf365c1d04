//! Working-directory reconstruction
//!
//! Given a commit id, resolves its tree and recursively materializes files
//! and directories into a destination path. There is no partial-write
//! recovery: a failure partway leaves a partially populated directory.

use crate::areas::database::Database;
use crate::artifacts::objects::object_id::ObjectId;
use crate::errors::GitError;
use anyhow::Context;
use derive_new::new;
use std::collections::HashSet;
use std::path::Path;

/// Nesting bound matching the tree builder's walk guard
pub const MAX_CHECKOUT_DEPTH: usize = 256;

#[derive(Debug, new)]
pub struct CheckoutEngine<'a> {
    database: &'a Database,
}

impl CheckoutEngine<'_> {
    /// Materialize the tree snapshotted by `commit_id` into `destination`
    pub fn checkout(&self, commit_id: &ObjectId, destination: &Path) -> anyhow::Result<()> {
        let commit = self
            .database
            .parse_object_as_commit(commit_id)?
            .ok_or_else(|| {
                GitError::MalformedCommit(format!("object {commit_id} is not a commit"))
            })?;

        std::fs::create_dir_all(destination).context(format!(
            "Unable to create checkout destination {}",
            destination.display()
        ))?;

        let mut ancestors = HashSet::new();
        self.materialize_tree(commit.tree(), destination, &mut ancestors, 0)
    }

    /// Recursively write out one tree
    ///
    /// Subtree sharing is legal (Merkle DAG), so the cycle guard tracks only
    /// the ids on the current ancestor path, not every tree ever visited.
    fn materialize_tree(
        &self,
        tree_id: &ObjectId,
        directory: &Path,
        ancestors: &mut HashSet<ObjectId>,
        depth: usize,
    ) -> anyhow::Result<()> {
        if depth > MAX_CHECKOUT_DEPTH {
            return Err(GitError::MalformedObject(format!(
                "tree nesting exceeds {MAX_CHECKOUT_DEPTH} levels at {}",
                directory.display()
            ))
            .into());
        }
        if !ancestors.insert(tree_id.clone()) {
            return Err(GitError::MalformedObject(format!(
                "tree {tree_id} references itself as an ancestor"
            ))
            .into());
        }

        let tree = self.database.parse_object_as_tree(tree_id)?.ok_or_else(|| {
            GitError::MalformedObject(format!("object {tree_id} is not a tree"))
        })?;

        for (name, entry) in tree.entries() {
            let target = directory.join(name);

            if entry.mode().is_directory() {
                std::fs::create_dir_all(&target).context(format!(
                    "Unable to create directory {}",
                    target.display()
                ))?;
                self.materialize_tree(entry.oid(), &target, ancestors, depth + 1)?;
            } else {
                let blob = self.database.parse_object_as_blob(entry.oid())?.ok_or_else(
                    || GitError::MalformedObject(format!("object {} is not a blob", entry.oid())),
                )?;

                std::fs::write(&target, blob.content())
                    .context(format!("Unable to write file {}", target.display()))?;

                #[cfg(unix)]
                Self::apply_mode(&target, entry.mode())?;
            }
        }

        ancestors.remove(tree_id);
        Ok(())
    }

    #[cfg(unix)]
    fn apply_mode(
        target: &Path,
        mode: &crate::artifacts::objects::entry_mode::EntryMode,
    ) -> anyhow::Result<()> {
        use crate::artifacts::objects::entry_mode::{EntryMode, FileMode};
        use std::os::unix::fs::PermissionsExt;

        if matches!(mode, EntryMode::File(FileMode::Executable)) {
            std::fs::set_permissions(target, std::fs::Permissions::from_mode(0o755))
                .context(format!("Unable to mark {} executable", target.display()))?;
        }

        Ok(())
    }
}
