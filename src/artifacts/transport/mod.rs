//! Smart-HTTP upload-pack transport
//!
//! - `pkt_line`: the length-prefixed line framing the protocol speaks
//! - `client`: ref discovery, negotiation and side-band demultiplexing

pub mod client;
pub mod pkt_line;
