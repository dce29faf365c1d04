//! Domain artifacts built on top of the object database
//!
//! - `objects`: the three object kinds and their canonical byte encoding
//! - `tree_builder`: recursive workspace snapshotting into tree objects
//! - `transport`: pkt-line framing and the smart-HTTP upload-pack client
//! - `pack`: packfile container parsing and object materialization
//! - `checkout`: working-directory reconstruction from a commit

pub mod checkout;
pub mod objects;
pub mod pack;
pub mod transport;
pub mod tree_builder;
