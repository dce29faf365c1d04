//! Git commit object
//!
//! Commits snapshot the repository at a point in time. They contain:
//! - A tree object ID (directory snapshot)
//! - Zero or one parent commit ID
//! - Author and committer information
//! - Commit message
//!
//! ## Format
//!
//! On disk:
//! ```text
//! commit <size>\0
//! tree <tree-sha>
//! parent <parent-sha>
//! author <name> <email> <timestamp> <timezone>
//! committer <name> <email> <timestamp> <timezone>
//!
//! <commit message>
//! ```

use crate::artifacts::objects::object::Unpackable;
use crate::artifacts::objects::object::{Object, Packable};
use crate::artifacts::objects::object_id::ObjectId;
use crate::artifacts::objects::object_type::ObjectType;
use crate::errors::GitError;
use bytes::Bytes;
use std::io::{BufRead, Write};

const DEFAULT_AUTHOR_NAME: &str = "Twig Author";
const DEFAULT_AUTHOR_EMAIL: &str = "author@example.com";

/// Author or committer identity with timestamp
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Author {
    name: String,
    email: String,
    timestamp: chrono::DateTime<chrono::FixedOffset>,
}

impl Author {
    /// Create a new author with the current timestamp
    pub fn new(name: String, email: String) -> Self {
        Author {
            name,
            email,
            timestamp: chrono::Local::now().fixed_offset(),
        }
    }

    pub fn new_with_timestamp(
        name: String,
        email: String,
        timestamp: chrono::DateTime<chrono::FixedOffset>,
    ) -> Self {
        Author {
            name,
            email,
            timestamp,
        }
    }

    /// Load identity from `GIT_AUTHOR_NAME`/`GIT_AUTHOR_EMAIL`, falling back
    /// to a fixed default identity when the environment is not configured
    pub fn load_from_env() -> Self {
        let name = std::env::var("GIT_AUTHOR_NAME")
            .unwrap_or_else(|_| DEFAULT_AUTHOR_NAME.to_string());
        let email = std::env::var("GIT_AUTHOR_EMAIL")
            .unwrap_or_else(|_| DEFAULT_AUTHOR_EMAIL.to_string());

        Author::new(name, email)
    }

    /// Format complete author info as serialized in a commit payload
    ///
    /// `Name <email> <seconds-since-epoch> <±HHMM>`
    pub fn display(&self) -> String {
        format!(
            "{} <{}> {} {}",
            self.name,
            self.email,
            self.timestamp.timestamp(),
            self.timestamp.format("%z")
        )
    }

    pub fn timestamp(&self) -> chrono::DateTime<chrono::FixedOffset> {
        self.timestamp
    }
}

impl TryFrom<&str> for Author {
    type Error = anyhow::Error;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        // Format: "name <email> timestamp timezone"
        // Split from the right to get timezone and timestamp first
        let parts: Vec<&str> = value.rsplitn(3, ' ').collect();
        if parts.len() < 3 {
            return Err(GitError::MalformedCommit(format!("invalid author: {value}")).into());
        }

        let timezone = parts[0];
        let timestamp: i64 = parts[1]
            .parse()
            .map_err(|_| GitError::MalformedCommit(format!("invalid timestamp: {}", parts[1])))?;
        let identity = parts[2];

        let offset = parse_utc_offset(timezone)?;
        let timestamp = chrono::DateTime::from_timestamp(timestamp, 0)
            .ok_or_else(|| {
                GitError::MalformedCommit(format!("timestamp out of range: {}", parts[1]))
            })?
            .with_timezone(&offset);

        let (name, email) = identity
            .split_once(" <")
            .and_then(|(name, rest)| Some((name, rest.strip_suffix('>')?)))
            .ok_or_else(|| GitError::MalformedCommit(format!("invalid identity: {identity}")))?;

        Ok(Author::new_with_timestamp(
            name.to_string(),
            email.to_string(),
            timestamp,
        ))
    }
}

/// Parse a `±HHMM` timezone suffix into a fixed offset
fn parse_utc_offset(timezone: &str) -> anyhow::Result<chrono::FixedOffset> {
    let malformed =
        || GitError::MalformedCommit(format!("invalid timezone offset: {timezone}"));

    if timezone.len() != 5 || !timezone.is_ascii() {
        return Err(malformed().into());
    }
    let sign = match &timezone[..1] {
        "+" => 1,
        "-" => -1,
        _ => return Err(malformed().into()),
    };
    let hours: i32 = timezone[1..3].parse().map_err(|_| malformed())?;
    let minutes: i32 = timezone[3..5].parse().map_err(|_| malformed())?;

    chrono::FixedOffset::east_opt(sign * (hours * 3600 + minutes * 60))
        .ok_or_else(|| malformed().into())
}

/// Snapshot of a single tree with zero or one parent commit
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Commit {
    tree: ObjectId,
    parent: Option<ObjectId>,
    author: Author,
    committer: Author,
    message: String,
}

impl Commit {
    pub fn new(
        tree: ObjectId,
        parent: Option<ObjectId>,
        author: Author,
        message: String,
    ) -> Self {
        let committer = author.clone();
        Commit {
            tree,
            parent,
            author,
            committer,
            message,
        }
    }

    pub fn tree(&self) -> &ObjectId {
        &self.tree
    }

    pub fn parent(&self) -> Option<&ObjectId> {
        self.parent.as_ref()
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl Packable for Commit {
    fn serialize(&self) -> anyhow::Result<Bytes> {
        let mut content_bytes = Vec::new();
        writeln!(content_bytes, "tree {}", self.tree)?;
        if let Some(parent) = &self.parent {
            writeln!(content_bytes, "parent {parent}")?;
        }
        writeln!(content_bytes, "author {}", self.author.display())?;
        writeln!(content_bytes, "committer {}", self.committer.display())?;
        writeln!(content_bytes)?;
        writeln!(content_bytes, "{}", self.message)?;

        let mut commit_bytes = Vec::new();
        let header = format!("{} {}\0", self.object_type().as_str(), content_bytes.len());
        commit_bytes.write_all(header.as_bytes())?;
        commit_bytes.write_all(&content_bytes)?;

        Ok(Bytes::from(commit_bytes))
    }
}

impl Unpackable for Commit {
    fn deserialize(reader: impl BufRead) -> anyhow::Result<Self> {
        let mut tree = None;
        let mut parent = None;
        let mut author = None;
        let mut committer = None;

        let mut lines = reader.lines();
        for line in lines.by_ref() {
            let line = line?;
            if line.is_empty() {
                break; // headers end at the blank line
            }

            match line.split_once(' ') {
                Some(("tree", oid)) => tree = Some(ObjectId::try_parse(oid.to_string())?),
                Some(("parent", oid)) => parent = Some(ObjectId::try_parse(oid.to_string())?),
                Some(("author", rest)) => author = Some(Author::try_from(rest)?),
                Some(("committer", rest)) => committer = Some(Author::try_from(rest)?),
                // Unknown headers (gpgsig, mergetag, ...) are preserved by
                // real git; this client only needs the ones above.
                _ => {}
            }
        }

        let message = lines.collect::<Result<Vec<_>, _>>()?.join("\n");

        let tree = tree.ok_or_else(|| {
            GitError::MalformedCommit("missing tree header line".to_string())
        })?;
        let author = author.ok_or_else(|| {
            GitError::MalformedCommit("missing author header line".to_string())
        })?;
        let committer = committer.unwrap_or_else(|| author.clone());

        Ok(Commit {
            tree,
            parent,
            author,
            committer,
            message,
        })
    }
}

impl Object for Commit {
    fn object_type(&self) -> ObjectType {
        ObjectType::Commit
    }

    fn display(&self) -> String {
        let mut text = format!("tree {}\n", self.tree);
        if let Some(parent) = &self.parent {
            text.push_str(&format!("parent {parent}\n"));
        }
        text.push_str(&format!("author {}\n", self.author.display()));
        text.push_str(&format!("committer {}\n", self.committer.display()));
        text.push('\n');
        text.push_str(&self.message);
        text.push('\n');
        text
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::{fixture, rstest};

    #[fixture]
    fn author() -> Author {
        let timestamp = chrono::DateTime::parse_from_rfc3339("2024-03-01T12:00:00+05:30").unwrap();
        Author::new_with_timestamp(
            "Ada Lovelace".to_string(),
            "ada@example.com".to_string(),
            timestamp,
        )
    }

    #[fixture]
    fn tree_oid() -> ObjectId {
        ObjectId::hash_of(b"tree 0\0").unwrap()
    }

    #[rstest]
    fn serializes_root_commit_without_parent(author: Author, tree_oid: ObjectId) {
        let commit = Commit::new(tree_oid.clone(), None, author, "initial".to_string());

        let serialized = commit.serialize().unwrap();
        let text = String::from_utf8(serialized.to_vec()).unwrap();

        assert!(text.contains(&format!("tree {tree_oid}\n")));
        assert!(!text.contains("parent"));
        assert!(text.contains("author Ada Lovelace <ada@example.com> 1709274600 +0530\n"));
        assert!(text.ends_with("\ninitial\n"));
    }

    #[rstest]
    fn round_trip_preserves_fields(author: Author, tree_oid: ObjectId) {
        let parent = ObjectId::hash_of(b"commit 0\0").unwrap();
        let commit = Commit::new(
            tree_oid,
            Some(parent),
            author,
            "subject line\n\nbody".to_string(),
        );

        let serialized = commit.serialize().unwrap();
        let nul = serialized.iter().position(|b| *b == 0).unwrap();
        let parsed = Commit::deserialize(&serialized[nul + 1..]).unwrap();

        assert_eq!(parsed, commit);
    }

    #[test]
    fn missing_tree_header_is_malformed_commit() {
        let payload = b"author A <a@b.c> 1700000000 +0000\ncommitter A <a@b.c> 1700000000 +0000\n\nmsg\n";

        let error = Commit::deserialize(&payload[..]).unwrap_err();

        assert!(matches!(
            error.downcast_ref::<GitError>(),
            Some(GitError::MalformedCommit(_))
        ));
    }
}
