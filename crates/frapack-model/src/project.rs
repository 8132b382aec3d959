//! Project input model.
//!
//! A project is the set of library assets the host hands to the exporter:
//! one metadata list per asset kind. Raw asset bytes travel separately and
//! are looked up by guid.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::entity::SpriteEntityAsset;

/// Plugin namespace whose metadata is carried into the resource container.
pub const METADATA_NAMESPACE: &str = "com.fraymakers.FraymakersMetadata";

/// Reserved metadata key selecting the spritesheet group of an asset.
pub const SPRITESHEET_GROUP_KEY: &str = "spritesheetGroup";

/// Spritesheet group used when an asset does not declare one.
pub const DEFAULT_SPRITESHEET_GROUP: &str = "default";

/// Plugin metadata bags keyed by plugin id. Contents are opaque.
pub type PluginMetadata = BTreeMap<String, Value>;

/// Returns the exported metadata object for a plugin metadata map.
///
/// Only the [`METADATA_NAMESPACE`] bag is exported; anything else (or a
/// non-object bag) yields an empty object.
pub fn namespaced_metadata(plugin_metadata: &PluginMetadata) -> Value {
    match plugin_metadata.get(METADATA_NAMESPACE) {
        Some(Value::Object(map)) => Value::Object(map.clone()),
        _ => Value::Object(serde_json::Map::new()),
    }
}

/// Returns the spritesheet group selected by plugin metadata.
pub fn spritesheet_group(plugin_metadata: &PluginMetadata) -> String {
    plugin_metadata
        .get(METADATA_NAMESPACE)
        .and_then(|bag| bag.get(SPRITESHEET_GROUP_KEY))
        .and_then(Value::as_str)
        .filter(|group| !group.is_empty())
        .unwrap_or(DEFAULT_SPRITESHEET_GROUP)
        .to_string()
}

/// Fields shared by every library asset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssetHeader {
    /// Stable identity of the asset within the project.
    pub guid: String,

    /// Runtime id. Assets without one are not exported.
    #[serde(default)]
    pub id: String,

    /// Asset format version.
    #[serde(default)]
    pub version: u32,

    /// Whether the asset is marked for export.
    #[serde(default)]
    pub export: bool,

    /// Free-form tags.
    #[serde(default)]
    pub tags: Vec<String>,

    /// Plugin metadata bags.
    #[serde(default)]
    pub plugin_metadata: PluginMetadata,
}

impl AssetHeader {
    /// Creates an exported header with the given guid and id.
    pub fn new(guid: impl Into<String>, id: impl Into<String>) -> Self {
        Self {
            guid: guid.into(),
            id: id.into(),
            version: 0,
            export: true,
            tags: Vec::new(),
            plugin_metadata: PluginMetadata::new(),
        }
    }

    /// Sets the export flag.
    pub fn with_export(mut self, export: bool) -> Self {
        self.export = export;
        self
    }

    /// Adds a tag.
    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tags.push(tag.into());
        self
    }

    /// Sets a key in the exported metadata namespace.
    pub fn with_metadata(mut self, key: impl Into<String>, value: Value) -> Self {
        let bag = self
            .plugin_metadata
            .entry(METADATA_NAMESPACE.to_string())
            .or_insert_with(|| Value::Object(serde_json::Map::new()));
        if let Value::Object(map) = bag {
            map.insert(key.into(), value);
        }
        self
    }

    /// Returns true if the asset is marked for export and has an id.
    pub fn is_exportable(&self) -> bool {
        self.export && !self.id.is_empty()
    }

    /// Returns the exported metadata object.
    pub fn metadata(&self) -> Value {
        namespaced_metadata(&self.plugin_metadata)
    }

    /// Returns the spritesheet group of this asset.
    pub fn spritesheet_group(&self) -> String {
        spritesheet_group(&self.plugin_metadata)
    }
}

/// An image library asset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageAsset {
    #[serde(flatten)]
    pub header: AssetHeader,
}

/// An audio library asset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AudioAsset {
    #[serde(flatten)]
    pub header: AssetHeader,
}

/// An opaque binary library asset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BinaryAsset {
    #[serde(flatten)]
    pub header: AssetHeader,
}

/// A script library asset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScriptAsset {
    #[serde(flatten)]
    pub header: AssetHeader,

    /// Script source text.
    #[serde(default)]
    pub script: String,

    /// Declared script language.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
}

/// A palette collection: source colors plus named recolor maps.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaletteCollectionAsset {
    #[serde(flatten)]
    pub header: AssetHeader,

    /// Source colors that maps recolor.
    #[serde(default)]
    pub colors: Vec<PaletteColor>,

    /// Recolor maps, in display order.
    #[serde(default)]
    pub maps: Vec<PaletteMap>,
}

/// A source color of a palette collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaletteColor {
    #[serde(rename = "$id")]
    pub id: String,
    /// Color literal, e.g. `0xFF00FF00`.
    pub color: String,
}

/// A named recolor map.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaletteMap {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub colors: Vec<PaletteMapColor>,
    #[serde(default)]
    pub plugin_metadata: PluginMetadata,
}

/// One source-to-target entry of a recolor map.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaletteMapColor {
    pub palette_color_id: String,
    pub target_color: String,
}

/// A nine-slice asset: an image plus stretch borders.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NineSliceAsset {
    #[serde(flatten)]
    pub header: AssetHeader,

    /// Guid of the image asset being sliced.
    pub image_asset: String,

    #[serde(default)]
    pub border_left: f64,
    #[serde(default)]
    pub border_top: f64,
    #[serde(default)]
    pub border_right: Option<f64>,
    #[serde(default)]
    pub border_bottom: Option<f64>,
}

/// Every asset list the exporter consumes.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    #[serde(default)]
    pub sprite_entity_assets: Vec<SpriteEntityAsset>,
    #[serde(default)]
    pub image_assets: Vec<ImageAsset>,
    #[serde(default)]
    pub audio_assets: Vec<AudioAsset>,
    #[serde(default)]
    pub binary_assets: Vec<BinaryAsset>,
    #[serde(default)]
    pub script_assets: Vec<ScriptAsset>,
    #[serde(default)]
    pub palette_collection_assets: Vec<PaletteCollectionAsset>,
    #[serde(default)]
    pub nine_slice_assets: Vec<NineSliceAsset>,
}

impl Project {
    /// Finds a script asset by runtime id.
    pub fn script_by_id(&self, id: &str) -> Option<&ScriptAsset> {
        self.script_assets.iter().find(|s| s.header.id == id)
    }
}

/// A project together with the on-disk location of each asset's bytes.
///
/// This is the document the command-line front end reads. `files` maps
/// asset guid to a path relative to the document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProjectDocument {
    #[serde(default)]
    pub files: BTreeMap<String, String>,

    #[serde(flatten)]
    pub project: Project,
}

impl ProjectDocument {
    /// Parses a project document from JSON text.
    pub fn from_json(json: &str) -> Result<Self, crate::error::ModelError> {
        Ok(serde_json::from_str(json)?)
    }
}
