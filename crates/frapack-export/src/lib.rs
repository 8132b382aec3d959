//! frapack Exporter
//!
//! This crate turns a project into a `.fra` resource container: a
//! length-prefixed JSON header followed by one binary region holding every
//! spritesheet, image, audio clip and binary blob.
//!
//! # Pipeline
//!
//! 1. **Media**: every image asset is decoded concurrently, each under a timeout
//! 2. **Animations**: entities are flattened one at a time; image symbols are
//!    packed into spritesheets and tweened keyframes are expanded
//! 3. **Write**: sheets are PNG-encoded and all payloads are appended in a
//!    fixed section order, then the header is written with sorted keys
//!
//! Recoverable problems (missing references, missing images, oversized
//! images, failed decodes) become [`frapack_model::ExportWarning`]s. Only
//! broken container invariants are errors.
//!
//! # Example
//!
//! ```
//! use frapack_export::{export_decoded, read_container, ExportOptions, MediaLibrary, ProgressReporter};
//! use frapack_model::{AssetHeader, BinaryAsset, Project};
//!
//! let project = Project {
//!     binary_assets: vec![BinaryAsset { header: AssetHeader::new("g1", "level_data") }],
//!     ..Project::default()
//! };
//! let mut library = MediaLibrary::new();
//! library.insert_source("g1", "level.bin", vec![1u8, 2, 3]);
//!
//! let report = export_decoded(
//!     &project,
//!     &library,
//!     &ExportOptions::default(),
//!     &mut ProgressReporter::silent(),
//! )
//! .unwrap();
//!
//! let view = read_container(&report.bytes).unwrap();
//! assert_eq!(view.header["binary"][0]["bytesLength"], 3);
//! assert_eq!(view.region, &[1, 2, 3]);
//! ```

pub mod assets;
pub mod container;
pub mod easing;
pub mod error;
pub mod flatten;
pub mod media;
pub mod pipeline;
pub mod progress;

pub use container::{read_container, BinaryRegion, ContainerSerializer, ContainerView};
pub use error::{ContainerError, ExportError};
pub use flatten::AnimationFlattener;
pub use media::{decode_images, MediaDecoder, MediaLibrary, MediaOptions, MediaSource};
pub use pipeline::{export, export_decoded, ExportOptions, ExportReport};
pub use progress::{overall_percent, Phase, ProgressReporter};
