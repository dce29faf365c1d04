//! twig - a minimal git implementation with a smart-HTTP fetch client
//!
//! The crate is split into:
//!
//! - `areas`: the repository root, the object database and the workspace
//! - `artifacts`: the object model (blob/tree/commit), the tree builder,
//!   the pack transport client and decoder, and the checkout engine
//! - `errors`: the failure taxonomy raised through `anyhow`

pub mod areas;
pub mod artifacts;
pub mod errors;
