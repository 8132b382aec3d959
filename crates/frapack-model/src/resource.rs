//! Resource container header model.
//!
//! These records are what the header JSON carries. Byte offsets are relative
//! to the start of the binary region that follows the header.

use serde::Serialize;
use serde_json::Value;

/// Version string written at the top of every header.
pub const ASSET_VERSION: &str = "0.0.17";

/// Version written into every spritesheet record.
pub const SPRITESHEET_VERSION: u32 = 0;

/// Root of the header JSON.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceData {
    pub version: String,
    pub spritesheets: Vec<SpriteSheetRecord>,
    pub images: Vec<BinaryRecord>,
    pub audio: Vec<AudioRecord>,
    pub binary: Vec<BinaryRecord>,
    pub scripts: Vec<ScriptRecord>,
    pub entities: Vec<EntityRecord>,
    pub nine_slices: Vec<NineSliceRecord>,
}

impl Default for ResourceData {
    fn default() -> Self {
        Self {
            version: ASSET_VERSION.to_string(),
            spritesheets: Vec::new(),
            images: Vec::new(),
            audio: Vec::new(),
            binary: Vec::new(),
            scripts: Vec::new(),
            entities: Vec::new(),
            nine_slices: Vec::new(),
        }
    }
}

/// An encoded sheet and the rectangles of its frames.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SpriteSheetRecord {
    pub version: u32,
    pub bytes_offset: u64,
    pub bytes_length: u64,
    /// Flat `[x, y, w, h, ...]` list in frame index order.
    pub frames: Vec<u32>,
    pub group: String,
}

/// A record whose payload is a byte range of the binary region.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BinaryRecord {
    pub version: u32,
    pub id: String,
    pub guid: String,
    pub bytes_offset: u64,
    pub bytes_length: u64,
    pub tags: Vec<String>,
    pub metadata: Value,
}

/// An audio payload record.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AudioRecord {
    #[serde(flatten)]
    pub record: BinaryRecord,
    /// Source file extension, without the dot.
    pub format: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScriptRecord {
    pub version: u32,
    pub id: String,
    pub guid: String,
    pub value: String,
    pub language: Option<String>,
    pub tags: Vec<String>,
    pub metadata: Value,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EntityRecord {
    pub version: u32,
    pub id: String,
    pub guid: String,
    pub tags: Vec<String>,
    pub metadata: Value,
    pub animations: Vec<AnimationRecord>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnimationRecord {
    pub name: String,
    pub layers: Vec<LayerRecord>,
    pub metadata: Value,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LayerRecord {
    pub name: String,
    #[serde(rename = "type")]
    pub layer_type: String,
    pub keyframes: Vec<KeyframeRecord>,
    pub metadata: Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tile_width: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tile_height: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tileset: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct KeyframeRecord {
    pub length: u32,
    pub metadata: Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    /// Outer `None`: not a symbol keyframe. `Some(None)`: serialized as null.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub symbol: Option<Option<SymbolRecord>>,
}

impl KeyframeRecord {
    /// Returns the resolved symbol, if any.
    pub fn resolved_symbol(&self) -> Option<&SymbolRecord> {
        self.symbol.as_ref().and_then(Option::as_ref)
    }
}

/// A symbol flattened to a fixed-order numeric array.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SymbolRecord {
    pub data: Vec<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub points: Option<Vec<f64>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tiles: Option<Vec<Value>>,
    pub metadata: Value,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NineSliceRecord {
    pub version: u32,
    pub id: String,
    pub guid: String,
    pub tags: Vec<String>,
    pub sheet_index: u32,
    pub frame_index: u32,
    pub border_left: f64,
    pub border_top: f64,
    pub border_right: Option<f64>,
    pub border_bottom: Option<f64>,
}
