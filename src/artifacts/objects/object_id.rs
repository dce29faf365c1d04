//! Git object identifier (SHA-1 hash)
//!
//! Object IDs are 40-character hexadecimal strings representing SHA-1 hashes.
//! They uniquely identify all objects (blobs, trees, commits).
//!
//! ## Storage
//!
//! Objects are stored in `<objects>/<first-2-chars>/<remaining-38-chars>`,
//! so the first two characters double as the shard directory name.

use crate::artifacts::objects::{OBJECT_ID_LENGTH, OBJECT_ID_RAW_LENGTH};
use crate::errors::GitError;
use sha1::{Digest, Sha1};
use std::io;
use std::path::PathBuf;

/// A validated 40-character hexadecimal SHA-1 object identifier
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, PartialOrd, Ord)]
pub struct ObjectId(String);

impl ObjectId {
    /// Parse and validate an object ID from a string
    ///
    /// Fails with `MalformedObject` if the string is not exactly 40 hex
    /// characters. Uppercase input is normalized to lowercase so ids always
    /// match the paths `hash_of` produces.
    pub fn try_parse(id: String) -> anyhow::Result<Self> {
        if id.len() != OBJECT_ID_LENGTH {
            return Err(GitError::MalformedObject(format!(
                "invalid object ID length: {}",
                id.len()
            ))
            .into());
        }
        if !id.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(
                GitError::MalformedObject(format!("invalid object ID characters: {id}")).into(),
            );
        }
        Ok(Self(id.to_ascii_lowercase()))
    }

    /// Compute the identity of a serialized object (`<type> <size>\0<content>`)
    pub fn hash_of(content: &[u8]) -> anyhow::Result<Self> {
        let mut hasher = Sha1::new();
        hasher.update(content);

        let oid = hasher.finalize();
        Self::try_parse(format!("{oid:x}"))
    }

    /// Write the object ID in binary format (20 bytes)
    ///
    /// Used when serializing tree entries, which reference children by
    /// raw hash rather than hex.
    pub fn write_raw_to<W: io::Write>(&self, writer: &mut W) -> anyhow::Result<()> {
        // Process a nibble pair at a time
        for i in (0..OBJECT_ID_LENGTH).step_by(2) {
            let byte = u8::from_str_radix(&self.0[i..i + 2], 16)
                .map_err(|_| GitError::MalformedObject("invalid hex digit".to_string()))?;
            writer.write_all(&[byte])?;
        }

        Ok(())
    }

    /// Read an object ID from binary format (20 bytes)
    pub fn read_raw_from<R: io::Read + ?Sized>(reader: &mut R) -> anyhow::Result<Self> {
        let mut hex40 = String::with_capacity(OBJECT_ID_LENGTH);
        let mut buffer = [0; OBJECT_ID_RAW_LENGTH];
        reader.read_exact(&mut buffer)?;

        for byte in buffer {
            hex40.push_str(&format!("{byte:02x}"));
        }

        Self::try_parse(hex40)
    }

    /// Convert to the sharded file system path for object storage
    ///
    /// Splits the hash as `XX/YYYYYY...` where XX is the first 2 chars.
    pub fn to_path(&self) -> PathBuf {
        let (dir, file) = self.0.split_at(2);
        PathBuf::from(dir).join(file)
    }
}

impl AsRef<str> for ObjectId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ObjectId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
