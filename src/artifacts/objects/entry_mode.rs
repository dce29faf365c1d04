use crate::errors::GitError;

/// Mode of a regular file entry
#[derive(Debug, Clone, Eq, Ord, Default, PartialEq, PartialOrd)]
pub enum FileMode {
    #[default]
    Regular,
    Executable,
}

/// File-type/permission tag carried by a tree entry
#[derive(Debug, Clone, Eq, Ord, Default, PartialEq, PartialOrd)]
pub enum EntryMode {
    File(FileMode),
    #[default]
    Directory,
}

impl EntryMode {
    pub fn as_str(&self) -> &str {
        match self {
            EntryMode::File(FileMode::Regular) => "100644",
            EntryMode::File(FileMode::Executable) => "100755",
            EntryMode::Directory => "40000",
        }
    }

    pub fn as_u32(&self) -> u32 {
        match self {
            EntryMode::File(FileMode::Regular) => 0o100644,
            EntryMode::File(FileMode::Executable) => 0o100755,
            EntryMode::Directory => 0o40000,
        }
    }

    pub fn is_directory(&self) -> bool {
        matches!(self, EntryMode::Directory)
    }

    /// Parse a mode as serialized inside a tree payload (e.g. "100644")
    pub fn from_octal_str(mode: &str) -> anyhow::Result<Self> {
        let mode = u32::from_str_radix(mode, 8)
            .map_err(|_| GitError::MalformedObject(format!("invalid entry mode: {mode}")))?;

        match mode {
            0o100644 => Ok(EntryMode::File(FileMode::Regular)),
            0o100755 => Ok(EntryMode::File(FileMode::Executable)),
            0o40000 => Ok(EntryMode::Directory),
            other => {
                Err(GitError::MalformedObject(format!("invalid entry mode: {other:o}")).into())
            }
        }
    }
}

impl From<FileMode> for EntryMode {
    fn from(mode: FileMode) -> Self {
        EntryMode::File(mode)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    #[rstest]
    #[case("100644", EntryMode::File(FileMode::Regular))]
    #[case("100755", EntryMode::File(FileMode::Executable))]
    #[case("40000", EntryMode::Directory)]
    fn octal_round_trip(#[case] text: &str, #[case] mode: EntryMode) {
        assert_eq!(EntryMode::from_octal_str(text).unwrap(), mode);
        assert_eq!(mode.as_str(), text);
        assert_eq!(format!("{:o}", mode.as_u32()), text);
    }

    #[test]
    fn rejects_unknown_mode() {
        assert!(EntryMode::from_octal_str("120000").is_err());
        assert!(EntryMode::from_octal_str("not-octal").is_err());
    }
}
