//! Git object types and operations
//!
//! All content is stored as objects identified by SHA-1 hashes. Three kinds
//! are supported:
//!
//! - **Blob**: file content (raw bytes)
//! - **Tree**: directory listing (modes, names, and object IDs)
//! - **Commit**: snapshot with metadata (tree, parent, author, message)
//!
//! All objects serialize to the canonical format `<type> <size>\0<content>`,
//! and their SHA-1 over exactly those bytes is their identity.

pub mod blob;
pub mod commit;
pub mod entry_mode;
pub mod object;
pub mod object_id;
pub mod object_type;
pub mod tree;

/// Length of a SHA-1 hash in hexadecimal format
pub const OBJECT_ID_LENGTH: usize = 40;

/// Length of a SHA-1 hash in raw binary format
pub const OBJECT_ID_RAW_LENGTH: usize = 20;
