//! frapack project and resource model
//!
//! This crate provides the types shared by the frapack exporter: the project
//! input model handed over by the host editor, the resource container header
//! model, export configuration, the resource manifest, and stable-key JSON.
//!
//! # Overview
//!
//! A project is a set of library assets. Sprite entities carry an animation
//! graph (animations, layers, keyframes, symbols) addressed by string id. The
//! exporter flattens that graph into [`resource::ResourceData`], the header of
//! a `.fra` resource container.
//!
//! # Example
//!
//! ```
//! use frapack_model::{ExportConfig, JsonFormat, ProjectDocument};
//!
//! let doc = ProjectDocument::from_json(r#"{"imageAssets": []}"#).unwrap();
//! assert!(doc.project.image_assets.is_empty());
//!
//! let config = ExportConfig::default().with_json_format(JsonFormat::Prettify);
//! assert!(!config.recompress_images);
//! ```
//!
//! # Modules
//!
//! - [`project`]: Library asset types and plugin metadata helpers
//! - [`entity`]: Sprite entity timeline types and id lookup
//! - [`resource`]: Container header records
//! - [`config`]: Export options
//! - [`manifest`]: Resource manifest parsing
//! - [`canonical`]: Stable-key JSON writer
//! - [`error`]: Error and warning types

pub mod canonical;
pub mod config;
pub mod entity;
pub mod error;
pub mod manifest;
pub mod project;
pub mod resource;

// Re-export commonly used types at the crate root
pub use config::{ExportConfig, JsonFormat};
pub use entity::{
    CollisionBodySymbol, CollisionBoxSymbol, EntityIndex, ImageSymbol, Keyframe, KeyframeKind,
    Layer, LayerKind, LineSegmentSymbol, PointSymbol, PolygonSymbol, SpriteAnimation,
    SpriteEntityAsset, Symbol, SymbolKeyframe, SymbolKind, SymbolType, TilemapSymbol, Transform,
    TweenType,
};
pub use error::{ExportWarning, ManifestError, ModelError, WarningCode};
pub use manifest::{ContentType, ManifestContent, ResourceManifest};
pub use project::{
    AssetHeader, AudioAsset, BinaryAsset, ImageAsset, NineSliceAsset, PaletteCollectionAsset,
    PaletteColor, PaletteMap, PaletteMapColor, PluginMetadata, Project, ProjectDocument,
    ScriptAsset, DEFAULT_SPRITESHEET_GROUP, METADATA_NAMESPACE,
};
pub use resource::{
    AnimationRecord, AudioRecord, BinaryRecord, EntityRecord, KeyframeRecord, LayerRecord,
    NineSliceRecord, ResourceData, ScriptRecord, SpriteSheetRecord, SymbolRecord, ASSET_VERSION,
    SPRITESHEET_VERSION,
};
