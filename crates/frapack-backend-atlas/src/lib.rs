//! frapack Texture Atlas Backend
//!
//! This crate packs decoded images into spritesheets for the frapack
//! exporter. Output is deterministic: the same images placed in the same
//! order produce byte-identical sheets.
//!
//! # Features
//!
//! - **Pixel buffers**: RGBA8 bitmaps with visible-bounds search, cropping, and blitting
//! - **Trimming**: Transparent borders are removed before packing
//! - **Deduplication**: Images with identical trimmed pixels share one placement
//! - **Growable sheets**: Sheets double per axis up to a maximum, then roll over
//! - **Deterministic PNG**: Fixed encoder settings plus an optional recompression profile
//!
//! # Example
//!
//! ```
//! use frapack_backend_atlas::{AtlasPacker, PackerConfig, PixelBuffer};
//!
//! let mut packer = AtlasPacker::new(PackerConfig::default());
//! let image = PixelBuffer::filled(10, 10, [255, 0, 0, 255]);
//! let frame = packer.place_image("guid-1", "red.png", &image, "default");
//! assert_eq!(frame.frame_index, 0);
//! assert_eq!(packer.sheets().len(), 1);
//! ```

pub mod packer;
pub mod pixel;
pub mod png;

pub use packer::{AtlasPacker, PackerConfig, SheetWriteState, SpriteFrame, TrimOffset};
pub use pixel::{PixelBuffer, PixelError, Rect};
pub use png::{PngConfig, PngError};
