//! Content-addressed object database
//!
//! Objects live under `<objects>/<2-hex-shard>/<38-hex-name>` as
//! zlib-compressed `<type> <size>\0<content>` bytes. Because identity is the
//! SHA-1 of exactly those bytes, writing an id that already exists is a
//! no-op success, and reads trust the store rather than re-verifying the
//! digest (the only writer is `store`).

use crate::artifacts::objects::blob::Blob;
use crate::artifacts::objects::commit::Commit;
use crate::artifacts::objects::object::{Object, ObjectBox, Unpackable};
use crate::artifacts::objects::object_id::ObjectId;
use crate::artifacts::objects::object_type::ObjectType;
use crate::artifacts::objects::tree::Tree;
use crate::errors::GitError;
use anyhow::Context;
use bytes::Bytes;
use fake::rand;
use std::io::{BufRead, Cursor, Read, Write};
use std::path::{Path, PathBuf};

#[derive(Debug)]
pub struct Database {
    path: Box<Path>,
}

impl Database {
    pub fn new(path: Box<Path>) -> Self {
        Database { path }
    }

    pub fn objects_path(&self) -> &Path {
        &self.path
    }

    /// Persist an object, returning its content-derived id
    ///
    /// Idempotent: storing the same `(type, payload)` twice leaves a single
    /// object file on disk.
    pub fn store(&self, object: &impl Object) -> anyhow::Result<ObjectId> {
        let object_content = object.serialize()?;
        let object_id = ObjectId::hash_of(&object_content)?;

        self.write_if_absent(&object_id, &object_content)?;

        Ok(object_id)
    }

    /// Persist a raw `(type, payload)` pair as decoded from a packfile
    pub fn store_raw(&self, object_type: &ObjectType, payload: &[u8]) -> anyhow::Result<ObjectId> {
        let mut object_content = Vec::with_capacity(payload.len() + 16);
        write!(object_content, "{} {}\0", object_type.as_str(), payload.len())?;
        object_content.write_all(payload)?;

        let object_id = ObjectId::hash_of(&object_content)?;
        self.write_if_absent(&object_id, &object_content)?;

        Ok(object_id)
    }

    /// Load the decompressed header+payload bytes of an object
    pub fn load(&self, object_id: &ObjectId) -> anyhow::Result<Bytes> {
        let object_path = self.path.join(object_id.to_path());

        if !object_path.exists() {
            return Err(GitError::ObjectNotFound(object_id.to_string()).into());
        }

        self.read_object(object_path)
    }

    pub fn parse_object(&self, object_id: &ObjectId) -> anyhow::Result<ObjectBox> {
        let (object_type, object_reader) = self.parse_object_as_bytes(object_id)?;

        match object_type {
            ObjectType::Blob => Ok(ObjectBox::Blob(Box::new(Blob::deserialize(object_reader)?))),
            ObjectType::Tree => Ok(ObjectBox::Tree(Box::new(Tree::deserialize(object_reader)?))),
            ObjectType::Commit => Ok(ObjectBox::Commit(Box::new(Commit::deserialize(
                object_reader,
            )?))),
        }
    }

    pub fn parse_object_as_blob(&self, object_id: &ObjectId) -> anyhow::Result<Option<Blob>> {
        let (object_type, object_reader) = self.parse_object_as_bytes(object_id)?;

        match object_type {
            ObjectType::Blob => Ok(Some(Blob::deserialize(object_reader)?)),
            _ => Ok(None),
        }
    }

    pub fn parse_object_as_tree(&self, object_id: &ObjectId) -> anyhow::Result<Option<Tree>> {
        let (object_type, object_reader) = self.parse_object_as_bytes(object_id)?;

        match object_type {
            ObjectType::Tree => Ok(Some(Tree::deserialize(object_reader)?)),
            _ => Ok(None),
        }
    }

    pub fn parse_object_as_commit(&self, object_id: &ObjectId) -> anyhow::Result<Option<Commit>> {
        let (object_type, object_reader) = self.parse_object_as_bytes(object_id)?;

        match object_type {
            ObjectType::Commit => Ok(Some(Commit::deserialize(object_reader)?)),
            _ => Ok(None),
        }
    }

    fn parse_object_as_bytes(
        &self,
        object_id: &ObjectId,
    ) -> anyhow::Result<(ObjectType, impl BufRead)> {
        let object_content = self.load(object_id)?;
        let mut object_reader = Cursor::new(object_content);

        let (object_type, declared_size) = ObjectType::parse_header(&mut object_reader)?;

        let remaining = object_reader.get_ref().len() - object_reader.position() as usize;
        if remaining != declared_size {
            return Err(GitError::MalformedObject(format!(
                "declared size {declared_size} does not match payload size {remaining}"
            ))
            .into());
        }

        Ok((object_type, object_reader))
    }

    fn read_object(&self, object_path: PathBuf) -> anyhow::Result<Bytes> {
        let object_content = std::fs::read(&object_path).context(format!(
            "Unable to read object file {}",
            object_path.display()
        ))?;

        Self::decompress(object_content.into())
    }

    fn write_if_absent(&self, object_id: &ObjectId, object_content: &[u8]) -> anyhow::Result<()> {
        let object_path = self.path.join(object_id.to_path());

        // content addressing guarantees identical bytes for identical ids
        if object_path.exists() {
            return Ok(());
        }

        let object_dir = object_path
            .parent()
            .context(format!("Invalid object path {}", object_path.display()))?;
        // tolerates the shard directory already existing
        std::fs::create_dir_all(object_dir).context(format!(
            "Unable to create object directory {}",
            object_dir.display()
        ))?;

        let temp_object_path = object_dir.join(Self::generate_temp_name());
        let compressed_content = Self::compress(object_content)?;

        let mut file = std::fs::OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(&temp_object_path)
            .context(format!(
                "Unable to open object file {}",
                temp_object_path.display()
            ))?;

        file.write_all(&compressed_content).context(format!(
            "Unable to write object file {}",
            temp_object_path.display()
        ))?;

        // rename the temp file to the object file to make it atomic
        std::fs::rename(&temp_object_path, &object_path).context(format!(
            "Unable to rename object file to {}",
            object_path.display()
        ))?;

        Ok(())
    }

    fn compress(data: &[u8]) -> anyhow::Result<Bytes> {
        let mut encoder =
            flate2::write::ZlibEncoder::new(Vec::new(), flate2::Compression::default());
        encoder
            .write_all(data)
            .map_err(|e| GitError::CompressionFailure(e.to_string()))?;

        encoder
            .finish()
            .map(|compressed_content| compressed_content.into())
            .map_err(|e| GitError::CompressionFailure(e.to_string()).into())
    }

    fn decompress(data: Bytes) -> anyhow::Result<Bytes> {
        let mut decoder = flate2::read::ZlibDecoder::new(&*data);
        let mut decompressed_content = Vec::new();
        decoder
            .read_to_end(&mut decompressed_content)
            .map_err(|e| GitError::CompressionFailure(e.to_string()))?;

        Ok(decompressed_content.into())
    }

    fn generate_temp_name() -> String {
        format!("tmp-obj-{}", rand::random::<u32>())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::artifacts::objects::blob::Blob;
    use pretty_assertions::assert_eq;
    use rstest::{fixture, rstest};

    #[fixture]
    fn database() -> (tempfile::TempDir, Database) {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        let database = Database::new(dir.path().join("objects").into_boxed_path());
        (dir, database)
    }

    #[rstest]
    fn store_then_load_round_trips(database: (tempfile::TempDir, Database)) {
        let (_guard, database) = database;
        let blob = Blob::new(Bytes::from_static(b"hello world\n"));

        let oid = database.store(&blob).unwrap();
        let parsed = database.parse_object_as_blob(&oid).unwrap().unwrap();

        assert_eq!(parsed, blob);
    }

    #[rstest]
    fn store_is_idempotent(database: (tempfile::TempDir, Database)) {
        let (_guard, database) = database;
        let blob = Blob::new(Bytes::from_static(b"same bytes"));

        let first = database.store(&blob).unwrap();
        let second = database.store(&blob).unwrap();

        assert_eq!(first, second);

        let shard_dir = database.objects_path().join(&first.as_ref()[..2]);
        let files: Vec<_> = std::fs::read_dir(shard_dir).unwrap().collect();
        assert_eq!(files.len(), 1, "duplicate store must not add files");
    }

    #[rstest]
    fn store_raw_matches_typed_store(database: (tempfile::TempDir, Database)) {
        let (_guard, database) = database;
        let blob = Blob::new(Bytes::from_static(b"payload"));

        let typed = database.store(&blob).unwrap();
        let raw = database.store_raw(&ObjectType::Blob, b"payload").unwrap();

        assert_eq!(typed, raw);
    }

    #[rstest]
    fn missing_object_is_not_found(database: (tempfile::TempDir, Database)) {
        let (_guard, database) = database;
        let absent = ObjectId::hash_of(b"never stored").unwrap();

        let error = database.load(&absent).unwrap_err();

        assert!(matches!(
            error.downcast_ref::<GitError>(),
            Some(GitError::ObjectNotFound(_))
        ));
    }
}
