//! Core repository components
//!
//! - `database`: content-addressed object store (blobs, trees, commits)
//! - `repository`: high-level repository operations and coordination
//! - `workspace`: working directory file system operations

pub mod database;
pub mod repository;
pub mod workspace;
