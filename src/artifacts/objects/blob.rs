//! Git blob object
//!
//! Blobs store file content. They contain only the raw bytes, without any
//! metadata like filename or permissions (those are stored in trees).
//!
//! ## Format
//!
//! On disk: `blob <size>\0<content>`

use crate::artifacts::objects::object::Unpackable;
use crate::artifacts::objects::object::{Object, Packable};
use crate::artifacts::objects::object_type::ObjectType;
use bytes::Bytes;
use derive_new::new;
use std::io::{BufRead, Write};

/// File content addressed by its SHA-1 hash
///
/// Content is kept as raw bytes so binary files round-trip verbatim.
#[derive(Debug, Clone, PartialEq, Eq, new)]
pub struct Blob {
    content: Bytes,
}

impl Blob {
    pub fn content(&self) -> &Bytes {
        &self.content
    }
}

impl Packable for Blob {
    fn serialize(&self) -> anyhow::Result<Bytes> {
        let mut blob_bytes = Vec::new();
        let header = format!("{} {}\0", self.object_type().as_str(), self.content.len());
        blob_bytes.write_all(header.as_bytes())?;
        blob_bytes.write_all(&self.content)?;

        Ok(Bytes::from(blob_bytes))
    }
}

impl Unpackable for Blob {
    fn deserialize(reader: impl BufRead) -> anyhow::Result<Self> {
        // the header has already been read
        let content = reader
            .bytes()
            .collect::<Result<Vec<u8>, std::io::Error>>()?;

        Ok(Self::new(Bytes::from(content)))
    }
}

impl Object for Blob {
    fn object_type(&self) -> ObjectType {
        ObjectType::Blob
    }

    fn display(&self) -> String {
        String::from_utf8_lossy(&self.content).to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn serialize_prefixes_canonical_header() {
        let blob = Blob::new(Bytes::from_static(b"hi"));

        assert_eq!(blob.serialize().unwrap(), Bytes::from_static(b"blob 2\0hi"));
    }

    #[test]
    fn round_trip_preserves_binary_content() {
        let content = Bytes::from_static(&[0u8, 159, 146, 150, b'\n']);
        let blob = Blob::new(content.clone());
        let serialized = blob.serialize().unwrap();

        // skip past the header the way the database does
        let nul = serialized.iter().position(|b| *b == 0).unwrap();
        let parsed = Blob::deserialize(&serialized[nul + 1..]).unwrap();

        assert_eq!(parsed.content(), &content);
        assert_eq!(parsed.object_id().unwrap(), blob.object_id().unwrap());
    }
}
