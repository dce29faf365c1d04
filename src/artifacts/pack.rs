//! Packfile container parsing
//!
//! A packfile is `"PACK" <4-byte version> <4-byte BE object count>` followed
//! by that many back-to-back records. Each record carries a variable-length
//! header (low 4 bits of the first byte seed the size, bits 4-6 hold the
//! type tag, the high bit marks continuation; continuation bytes contribute
//! 7 size bits each) and a zlib stream whose inflated length must equal the
//! declared size. Records have no padding, so decompression must stop at
//! exactly that boundary to leave the cursor on the next record.
//!
//! Delta records (ofs-delta/ref-delta) are not resolved; they fail with
//! `UnsupportedDeltaObject`. The trailing pack checksum is not verified.

use crate::areas::database::Database;
use crate::artifacts::objects::object_id::ObjectId;
use crate::artifacts::objects::object_type::ObjectType;
use crate::errors::GitError;
use anyhow::Context;
use byteorder::{BigEndian, ReadBytesExt};
use bytes::Bytes;
use derive_new::new;
use flate2::{Decompress, FlushDecompress, Status};
use std::io::{Cursor, Read};

pub const PACK_MAGIC: &[u8; 4] = b"PACK";

/// Pack record type tags
const OBJ_COMMIT: u8 = 1;
const OBJ_TREE: u8 = 2;
const OBJ_BLOB: u8 = 3;
const OBJ_OFS_DELTA: u8 = 6;
const OBJ_REF_DELTA: u8 = 7;

#[derive(Debug, new)]
pub struct PackDecoder<'a> {
    database: &'a Database,
}

impl PackDecoder<'_> {
    /// Decode a raw packfile stream, materializing every object into the
    /// database. Returns the stored ids in record order.
    pub fn decode(&self, pack: &[u8]) -> anyhow::Result<Vec<ObjectId>> {
        let mut cursor = Cursor::new(pack);

        let mut magic = [0u8; 4];
        cursor
            .read_exact(&mut magic)
            .context("truncated packfile header")?;
        if &magic != PACK_MAGIC {
            return Err(GitError::MalformedObject(format!(
                "bad packfile signature: {:?}",
                String::from_utf8_lossy(&magic)
            ))
            .into());
        }

        let version = cursor
            .read_u32::<BigEndian>()
            .context("truncated packfile version")?;
        if version != 2 && version != 3 {
            return Err(GitError::MalformedObject(format!(
                "unsupported packfile version: {version}"
            ))
            .into());
        }

        let object_count = cursor
            .read_u32::<BigEndian>()
            .context("truncated packfile object count")?;

        let mut stored = Vec::with_capacity(object_count as usize);
        for _ in 0..object_count {
            let (object_type, size) = Self::read_record_header(&mut cursor)?;
            let payload = Self::inflate_record(&mut cursor, size)?;
            stored.push(self.database.store_raw(&object_type, &payload)?);
        }

        // the trailing 20-byte pack checksum is left unverified

        Ok(stored)
    }

    /// Parse a record's variable-length type/size header
    fn read_record_header(cursor: &mut Cursor<&[u8]>) -> anyhow::Result<(ObjectType, usize)> {
        let mut byte = cursor.read_u8().context("truncated pack record header")?;

        let type_tag = (byte >> 4) & 0x07;
        let mut size = (byte & 0x0f) as usize;
        let mut shift = 4;

        while byte & 0x80 != 0 {
            if shift >= usize::BITS as usize {
                return Err(GitError::MalformedObject(
                    "pack record size varint too long".to_string(),
                )
                .into());
            }
            byte = cursor.read_u8().context("truncated pack record header")?;
            size |= ((byte & 0x7f) as usize) << shift;
            shift += 7;
        }

        let object_type = match type_tag {
            OBJ_COMMIT => ObjectType::Commit,
            OBJ_TREE => ObjectType::Tree,
            OBJ_BLOB => ObjectType::Blob,
            OBJ_OFS_DELTA | OBJ_REF_DELTA => {
                return Err(GitError::UnsupportedDeltaObject(type_tag).into());
            }
            other => {
                return Err(GitError::MalformedObject(format!(
                    "unknown pack record type: {other}"
                ))
                .into());
            }
        };

        Ok((object_type, size))
    }

    /// Inflate exactly one record's zlib stream
    ///
    /// The stream ends at its own terminator, not at end of input; the
    /// cursor is advanced by the number of compressed bytes consumed so the
    /// next record starts right after.
    fn inflate_record(cursor: &mut Cursor<&[u8]>, declared_size: usize) -> anyhow::Result<Bytes> {
        let input = &cursor.get_ref()[cursor.position() as usize..];
        let mut inflater = Decompress::new(true);
        let mut payload = Vec::with_capacity(declared_size);

        loop {
            let consumed = inflater.total_in() as usize;
            let status = inflater
                .decompress_vec(&input[consumed..], &mut payload, FlushDecompress::None)
                .map_err(|e| GitError::CompressionFailure(e.to_string()))?;

            match status {
                Status::StreamEnd => break,
                Status::Ok | Status::BufError => {
                    if inflater.total_in() as usize == input.len()
                        && payload.len() < payload.capacity()
                    {
                        return Err(GitError::CompressionFailure(
                            "truncated pack record stream".to_string(),
                        )
                        .into());
                    }
                    if payload.len() == payload.capacity() {
                        // declared size was too small for this stream; grow
                        // so the mismatch is reported below rather than
                        // looping forever
                        payload.reserve(512);
                    }
                }
            }
        }

        if payload.len() != declared_size {
            return Err(GitError::CompressionFailure(format!(
                "inflated record size {} does not match declared size {declared_size}",
                payload.len()
            ))
            .into());
        }

        cursor.set_position(cursor.position() + inflater.total_in());
        Ok(Bytes::from(payload))
    }
}
