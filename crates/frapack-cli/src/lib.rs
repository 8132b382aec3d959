//! frapack CLI library.
//!
//! This crate provides the pieces behind the `frapack` binary: project
//! document loading, PNG decoding and the `export` / `inspect` commands.

pub mod commands;
pub mod decode;
pub mod input;
