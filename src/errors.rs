//! Failure taxonomy shared by the object database, transport and checkout
//!
//! Every fallible operation returns `anyhow::Result`, but failures that a
//! caller may want to branch on are raised as `GitError` variants so they
//! stay inspectable through `Error::downcast_ref::<GitError>()`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum GitError {
    /// The object header or payload does not follow the canonical encoding.
    #[error("malformed object: {0}")]
    MalformedObject(String),

    /// No object file exists at the sharded path derived from the id.
    #[error("object {0} not found in object database")]
    ObjectNotFound(String),

    /// A filesystem operation failed while walking or writing a workspace.
    #[error("io failure: {0}")]
    IoFailure(String),

    /// An HTTP request to the remote failed or returned a bad status.
    #[error("transport failure: {0}")]
    TransportFailure(String),

    /// The ref advertisement contained no line naming HEAD.
    #[error("remote advertised no HEAD ref")]
    NoHeadRef,

    /// A commit payload is missing required header lines.
    #[error("malformed commit: {0}")]
    MalformedCommit(String),

    /// The packfile contains a delta-encoded record, which this client
    /// does not resolve.
    #[error("unsupported delta object in packfile (pack type {0})")]
    UnsupportedDeltaObject(u8),

    /// Zlib compression or decompression failed, or an inflated payload
    /// did not match its declared length.
    #[error("compression failure: {0}")]
    CompressionFailure(String),
}
