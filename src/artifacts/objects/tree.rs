//! Git tree object
//!
//! Trees represent directory snapshots. They contain entries for files
//! (blobs) and subdirectories (other trees), along with their names and
//! modes.
//!
//! ## Format
//!
//! On disk: `tree <size>\0<entries>`
//! Each entry: `<mode> <name>\0<20-byte-sha1>`
//!
//! Entries are encoded in strictly ascending name order; the BTreeMap
//! backing store guarantees this regardless of insertion order, which keeps
//! tree hashing deterministic across filesystem enumeration orders.

use crate::artifacts::objects::entry_mode::EntryMode;
use crate::artifacts::objects::object::Unpackable;
use crate::artifacts::objects::object::{Object, Packable};
use crate::artifacts::objects::object_id::ObjectId;
use crate::artifacts::objects::object_type::ObjectType;
use crate::errors::GitError;
use anyhow::Context;
use bytes::Bytes;
use derive_new::new;
use std::collections::BTreeMap;
use std::io::{BufRead, Write};

/// A single `(mode, child id)` reference held under a name
#[derive(Debug, Clone, PartialEq, Eq, new)]
pub struct TreeEntry {
    mode: EntryMode,
    oid: ObjectId,
}

impl TreeEntry {
    pub fn mode(&self) -> &EntryMode {
        &self.mode
    }

    pub fn oid(&self) -> &ObjectId {
        &self.oid
    }

    fn object_type(&self) -> ObjectType {
        if self.mode.is_directory() {
            ObjectType::Tree
        } else {
            ObjectType::Blob
        }
    }
}

/// Directory snapshot referencing children by content hash
///
/// A tree owns no storage: child ids are content references that may be
/// shared by many trees (Merkle-DAG sharing is expected).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Tree {
    entries: BTreeMap<String, TreeEntry>,
}

impl Tree {
    pub fn add_entry(&mut self, name: String, mode: EntryMode, oid: ObjectId) {
        self.entries.insert(name, TreeEntry::new(mode, oid));
    }

    pub fn entries(&self) -> impl Iterator<Item = (&String, &TreeEntry)> {
        self.entries.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Packable for Tree {
    fn serialize(&self) -> anyhow::Result<Bytes> {
        let mut content_bytes = Vec::new();
        for (name, entry) in &self.entries {
            let header = format!("{:o} {}", entry.mode().as_u32(), name);
            content_bytes.write_all(header.as_bytes())?;
            content_bytes.push(0);
            entry.oid().write_raw_to(&mut content_bytes)?;
        }

        let mut tree_bytes = Vec::new();
        let header = format!("{} {}\0", self.object_type().as_str(), content_bytes.len());
        tree_bytes.write_all(header.as_bytes())?;
        tree_bytes.write_all(&content_bytes)?;

        Ok(Bytes::from(tree_bytes))
    }
}

impl Unpackable for Tree {
    fn deserialize(reader: impl BufRead) -> anyhow::Result<Self> {
        let mut entries = BTreeMap::new();
        let mut reader = reader;

        // Reuse scratch buffers to reduce allocs
        let mut mode_bytes = Vec::new();
        let mut name_bytes = Vec::new();

        loop {
            mode_bytes.clear();
            // Read "mode " (space-delimited)
            let n = reader.read_until(b' ', &mut mode_bytes)?;
            if n == 0 {
                break; // clean EOF: no more entries
            }
            if mode_bytes.pop() != Some(b' ') {
                return Err(
                    GitError::MalformedObject("unexpected EOF in tree entry mode".to_string())
                        .into(),
                );
            }

            let mode_str = std::str::from_utf8(&mode_bytes)
                .map_err(|_| GitError::MalformedObject("non-utf8 tree entry mode".to_string()))?;
            let mode = EntryMode::from_octal_str(mode_str)?;

            // Read "name\0"
            name_bytes.clear();
            let n = reader.read_until(b'\0', &mut name_bytes)?;
            if n == 0 || name_bytes.pop() != Some(b'\0') {
                return Err(
                    GitError::MalformedObject("unexpected EOF in tree entry name".to_string())
                        .into(),
                );
            }
            let name = std::str::from_utf8(&name_bytes)
                .map_err(|_| GitError::MalformedObject("non-utf8 tree entry name".to_string()))?
                .to_owned();

            // Read the raw child object id
            let oid = ObjectId::read_raw_from(&mut reader)
                .context("unexpected EOF in tree entry object id")?;

            entries.insert(name, TreeEntry::new(mode, oid));
        }

        Ok(Tree { entries })
    }
}

impl Object for Tree {
    fn object_type(&self) -> ObjectType {
        ObjectType::Tree
    }

    fn display(&self) -> String {
        self.entries
            .iter()
            .map(|(name, entry)| {
                format!(
                    "{} {} {}\t{}",
                    entry.mode().as_str(),
                    entry.object_type().as_str(),
                    entry.oid().as_ref(),
                    name
                )
            })
            .collect::<Vec<String>>()
            .join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::artifacts::objects::entry_mode::FileMode;
    use pretty_assertions::assert_eq;
    use rstest::{fixture, rstest};

    #[fixture]
    fn child_oid() -> ObjectId {
        ObjectId::hash_of(b"blob 2\0hi").unwrap()
    }

    #[rstest]
    fn entries_serialize_in_ascending_name_order(child_oid: ObjectId) {
        let mut shuffled = Tree::default();
        shuffled.add_entry("zebra.txt".to_string(), FileMode::Regular.into(), child_oid.clone());
        shuffled.add_entry("apple.txt".to_string(), FileMode::Regular.into(), child_oid.clone());
        shuffled.add_entry("mango".to_string(), EntryMode::Directory, child_oid.clone());

        let mut sorted = Tree::default();
        sorted.add_entry("apple.txt".to_string(), FileMode::Regular.into(), child_oid.clone());
        sorted.add_entry("mango".to_string(), EntryMode::Directory, child_oid.clone());
        sorted.add_entry("zebra.txt".to_string(), FileMode::Regular.into(), child_oid);

        assert_eq!(
            shuffled.object_id().unwrap(),
            sorted.object_id().unwrap(),
            "insertion order must not affect the tree hash"
        );

        let names: Vec<_> = shuffled.entries().map(|(name, _)| name.clone()).collect();
        assert_eq!(names, vec!["apple.txt", "mango", "zebra.txt"]);
    }

    #[rstest]
    fn round_trip_preserves_entries(child_oid: ObjectId) {
        let mut tree = Tree::default();
        tree.add_entry("a.txt".to_string(), FileMode::Regular.into(), child_oid.clone());
        tree.add_entry("bin".to_string(), FileMode::Executable.into(), child_oid.clone());
        tree.add_entry("d".to_string(), EntryMode::Directory, child_oid);

        let serialized = tree.serialize().unwrap();
        let nul = serialized.iter().position(|b| *b == 0).unwrap();
        let parsed = Tree::deserialize(&serialized[nul + 1..]).unwrap();

        assert_eq!(parsed, tree);
    }

    #[test]
    fn truncated_entry_is_malformed() {
        let error = Tree::deserialize(&b"100644 a.txt"[..]).unwrap_err();

        assert!(matches!(
            error.downcast_ref::<GitError>(),
            Some(GitError::MalformedObject(_))
        ));
    }
}
