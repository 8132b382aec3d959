//! frapack End-to-End Test Infrastructure
//!
//! This crate provides integration tests for the export pipeline:
//!
//! - Export: project document -> `.fra` container
//! - Container layout: length prefix, header formats, payload offsets
//! - **Determinism**: byte-identical containers across runs
//! - Packer invariants under arbitrary insertion sequences
//!
//! ## Running Tests
//!
//! ```bash
//! cargo test -p frapack-tests
//! ```

pub mod determinism;
pub mod fixtures;

// Re-export commonly used items
pub use determinism::{verify_determinism, DeterminismResult};
pub use fixtures::{block, entity_json, image_keyframe, image_symbol, png_bytes, ProjectFixture};
