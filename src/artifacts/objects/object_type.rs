use crate::errors::GitError;
use std::io::BufRead;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ObjectType {
    Blob,
    Tree,
    Commit,
}

impl ObjectType {
    pub fn as_str(&self) -> &str {
        match self {
            ObjectType::Blob => "blob",
            ObjectType::Tree => "tree",
            ObjectType::Commit => "commit",
        }
    }

    /// Parse the `<type> <size>\0` header of a decompressed object
    ///
    /// Returns the object type and the declared payload length, leaving the
    /// reader positioned at the first payload byte. The caller is expected
    /// to check the declared length against the bytes that remain.
    pub fn parse_header(data_reader: &mut impl BufRead) -> anyhow::Result<(ObjectType, usize)> {
        let mut tag = Vec::new();
        data_reader.read_until(b' ', &mut tag)?;
        if tag.pop() != Some(b' ') {
            return Err(
                GitError::MalformedObject("missing space after type tag".to_string()).into(),
            );
        }

        let tag = std::str::from_utf8(&tag)
            .map_err(|_| GitError::MalformedObject("non-utf8 type tag".to_string()))?;
        let object_type = ObjectType::try_from(tag)?;

        let mut size = Vec::new();
        data_reader.read_until(b'\0', &mut size)?;
        if size.pop() != Some(b'\0') {
            return Err(GitError::MalformedObject("missing NUL after size".to_string()).into());
        }

        let size = std::str::from_utf8(&size)
            .ok()
            .and_then(|s| s.parse::<usize>().ok())
            .ok_or_else(|| GitError::MalformedObject("invalid size in header".to_string()))?;

        Ok((object_type, size))
    }
}

impl TryFrom<&str> for ObjectType {
    type Error = anyhow::Error;

    fn try_from(value: &str) -> anyhow::Result<Self> {
        match value {
            "blob" => Ok(ObjectType::Blob),
            "tree" => Ok(ObjectType::Tree),
            "commit" => Ok(ObjectType::Commit),
            other => {
                Err(GitError::MalformedObject(format!("invalid object type: {other}")).into())
            }
        }
    }
}

impl std::fmt::Display for ObjectType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
