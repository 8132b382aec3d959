//! Sprite entity timeline types.
//!
//! An entity owns flat tables of layers, keyframes, and symbols. Animations
//! reference layers by id, layers reference keyframes by id, and keyframes
//! reference at most one symbol by id. [`EntityIndex`] turns those tables into
//! id lookups.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::project::{AssetHeader, PluginMetadata};

/// A sprite entity asset with its animation graph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpriteEntityAsset {
    #[serde(flatten)]
    pub header: AssetHeader,

    #[serde(default)]
    pub animations: Vec<SpriteAnimation>,
    #[serde(default)]
    pub layers: Vec<Layer>,
    #[serde(default)]
    pub keyframes: Vec<Keyframe>,
    #[serde(default)]
    pub symbols: Vec<Symbol>,
}

impl SpriteEntityAsset {
    /// Builds id lookup tables over this entity's layers, keyframes, and symbols.
    pub fn index(&self) -> EntityIndex<'_> {
        EntityIndex::new(self)
    }
}

/// A named animation: an ordered list of layer ids.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpriteAnimation {
    #[serde(rename = "$id", default)]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub layers: Vec<String>,
    #[serde(default)]
    pub plugin_metadata: PluginMetadata,
}

/// A timeline layer: an ordered list of keyframe ids.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Layer {
    #[serde(rename = "$id")]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(flatten)]
    pub kind: LayerKind,
    #[serde(default)]
    pub keyframes: Vec<String>,
    #[serde(default)]
    pub plugin_metadata: PluginMetadata,
}

/// Layer kind plus kind-specific settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LayerKind {
    Image,
    CollisionBox,
    CollisionBody,
    LineSegment,
    Point,
    Polygon,
    Label,
    FrameScript {
        #[serde(default)]
        language: Option<String>,
    },
    Tilemap {
        #[serde(rename = "tileWidth", default)]
        tile_width: f64,
        #[serde(rename = "tileHeight", default)]
        tile_height: f64,
    },
}

impl LayerKind {
    /// Returns the wire name of the layer kind.
    pub fn type_name(&self) -> &'static str {
        match self {
            LayerKind::Image => "IMAGE",
            LayerKind::CollisionBox => "COLLISION_BOX",
            LayerKind::CollisionBody => "COLLISION_BODY",
            LayerKind::LineSegment => "LINE_SEGMENT",
            LayerKind::Point => "POINT",
            LayerKind::Polygon => "POLYGON",
            LayerKind::Label => "LABEL",
            LayerKind::FrameScript { .. } => "FRAME_SCRIPT",
            LayerKind::Tilemap { .. } => "TILEMAP",
        }
    }
}

fn default_length() -> u32 {
    1
}

/// A keyframe: a duration plus kind-specific content.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Keyframe {
    #[serde(rename = "$id")]
    pub id: String,
    /// Duration in frames.
    #[serde(default = "default_length")]
    pub length: u32,
    #[serde(flatten)]
    pub kind: KeyframeKind,
    #[serde(default)]
    pub plugin_metadata: PluginMetadata,
}

/// Keyframe kind plus kind-specific content.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum KeyframeKind {
    Image(SymbolKeyframe),
    CollisionBox(SymbolKeyframe),
    CollisionBody(SymbolKeyframe),
    LineSegment(SymbolKeyframe),
    Point(SymbolKeyframe),
    Polygon(SymbolKeyframe),
    Tilemap(SymbolKeyframe),
    FrameScript {
        #[serde(default)]
        code: String,
    },
    Label {
        #[serde(default)]
        name: String,
    },
}

impl KeyframeKind {
    /// Returns the symbol kind and symbol reference of a symbol-bearing keyframe.
    pub fn symbol_keyframe(&self) -> Option<(SymbolType, &SymbolKeyframe)> {
        match self {
            KeyframeKind::Image(k) => Some((SymbolType::Image, k)),
            KeyframeKind::CollisionBox(k) => Some((SymbolType::CollisionBox, k)),
            KeyframeKind::CollisionBody(k) => Some((SymbolType::CollisionBody, k)),
            KeyframeKind::LineSegment(k) => Some((SymbolType::LineSegment, k)),
            KeyframeKind::Point(k) => Some((SymbolType::Point, k)),
            KeyframeKind::Polygon(k) => Some((SymbolType::Polygon, k)),
            KeyframeKind::Tilemap(k) => Some((SymbolType::Tilemap, k)),
            KeyframeKind::FrameScript { .. } | KeyframeKind::Label { .. } => None,
        }
    }
}

/// Content of a symbol-bearing keyframe.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SymbolKeyframe {
    /// Id of the symbol shown on this keyframe.
    #[serde(default)]
    pub symbol: Option<String>,
    /// Interpolate toward the next keyframe's symbol.
    #[serde(default)]
    pub tweened: bool,
    /// Easing curve used when tweened.
    #[serde(default)]
    pub tween_type: TweenType,
}

/// Easing curve of a tweened keyframe.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TweenType {
    #[default]
    Linear,
    EaseInQuad,
    EaseOutQuad,
    EaseInOutQuad,
    EaseInCubic,
    EaseOutCubic,
    EaseInOutCubic,
    EaseInQuart,
    EaseOutQuart,
    EaseInOutQuart,
    EaseInQuint,
    EaseOutQuint,
    EaseInOutQuint,
    EaseInSine,
    EaseOutSine,
    EaseInOutSine,
    EaseInExpo,
    EaseOutExpo,
    EaseInOutExpo,
    EaseInCirc,
    EaseOutCirc,
    EaseInOutCirc,
    EaseInBack,
    EaseOutBack,
    EaseInOutBack,
    EaseInElastic,
    EaseOutElastic,
    EaseInOutElastic,
    EaseInBounce,
    EaseOutBounce,
    EaseInOutBounce,
}

/// The closed set of symbol kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SymbolType {
    Image,
    CollisionBox,
    CollisionBody,
    LineSegment,
    Point,
    Polygon,
    Tilemap,
}

impl SymbolType {
    /// Returns the wire name of the symbol kind.
    pub fn as_str(&self) -> &'static str {
        match self {
            SymbolType::Image => "IMAGE",
            SymbolType::CollisionBox => "COLLISION_BOX",
            SymbolType::CollisionBody => "COLLISION_BODY",
            SymbolType::LineSegment => "LINE_SEGMENT",
            SymbolType::Point => "POINT",
            SymbolType::Polygon => "POLYGON",
            SymbolType::Tilemap => "TILEMAP",
        }
    }
}

impl std::fmt::Display for SymbolType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A symbol placed on keyframes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Symbol {
    #[serde(rename = "$id")]
    pub id: String,
    #[serde(flatten)]
    pub kind: SymbolKind,
    #[serde(default)]
    pub plugin_metadata: PluginMetadata,
}

/// Symbol variants, each carrying only its own fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SymbolKind {
    Image(ImageSymbol),
    CollisionBox(CollisionBoxSymbol),
    CollisionBody(CollisionBodySymbol),
    LineSegment(LineSegmentSymbol),
    Point(PointSymbol),
    Polygon(PolygonSymbol),
    Tilemap(TilemapSymbol),
}

impl SymbolKind {
    /// Returns the kind tag of this symbol.
    pub fn symbol_type(&self) -> SymbolType {
        match self {
            SymbolKind::Image(_) => SymbolType::Image,
            SymbolKind::CollisionBox(_) => SymbolType::CollisionBox,
            SymbolKind::CollisionBody(_) => SymbolType::CollisionBody,
            SymbolKind::LineSegment(_) => SymbolType::LineSegment,
            SymbolKind::Point(_) => SymbolType::Point,
            SymbolKind::Polygon(_) => SymbolType::Polygon,
            SymbolKind::Tilemap(_) => SymbolType::Tilemap,
        }
    }
}

fn one() -> f64 {
    1.0
}

/// Affine placement shared by image, collision box, and tilemap symbols.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transform {
    #[serde(default)]
    pub x: f64,
    #[serde(default)]
    pub y: f64,
    #[serde(default = "one")]
    pub alpha: f64,
    #[serde(default)]
    pub pivot_x: f64,
    #[serde(default)]
    pub pivot_y: f64,
    /// Rotation in degrees.
    #[serde(default)]
    pub rotation: f64,
    #[serde(default = "one")]
    pub scale_x: f64,
    #[serde(default = "one")]
    pub scale_y: f64,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            alpha: 1.0,
            pivot_x: 0.0,
            pivot_y: 0.0,
            rotation: 0.0,
            scale_x: 1.0,
            scale_y: 1.0,
        }
    }
}

impl Transform {
    /// Returns a transform at the given position.
    pub fn at(x: f64, y: f64) -> Self {
        Self {
            x,
            y,
            ..Self::default()
        }
    }
}

/// An image placed on the timeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageSymbol {
    /// Guid of the image asset.
    pub image_asset: String,
    #[serde(flatten)]
    pub transform: Transform,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CollisionBoxSymbol {
    #[serde(default)]
    pub color: String,
    #[serde(flatten)]
    pub transform: Transform,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CollisionBodySymbol {
    #[serde(default)]
    pub color: String,
    #[serde(default)]
    pub head: f64,
    #[serde(default)]
    pub hip_width: f64,
    #[serde(default)]
    pub hip_x_offset: f64,
    #[serde(default)]
    pub hip_y_offset: f64,
    #[serde(default)]
    pub foot: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineSegmentSymbol {
    #[serde(default)]
    pub color: String,
    #[serde(default = "one")]
    pub alpha: f64,
    /// Flat `[x0, y0, x1, y1, ...]` list.
    #[serde(default)]
    pub points: Vec<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PointSymbol {
    #[serde(default)]
    pub color: String,
    #[serde(default)]
    pub x: f64,
    #[serde(default)]
    pub y: f64,
    #[serde(default = "one")]
    pub alpha: f64,
    #[serde(default)]
    pub rotation: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PolygonSymbol {
    #[serde(default)]
    pub color: String,
    #[serde(default)]
    pub x: f64,
    #[serde(default)]
    pub y: f64,
    #[serde(default = "one")]
    pub alpha: f64,
    #[serde(default)]
    pub rotation: f64,
    /// Flat `[x0, y0, x1, y1, ...]` list.
    #[serde(default)]
    pub points: Vec<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TilemapSymbol {
    #[serde(flatten)]
    pub transform: Transform,
    /// Tile indices, row-major.
    #[serde(default)]
    pub tiles: Vec<serde_json::Value>,
}

/// Id lookup tables over one entity.
///
/// When ids repeat, the first record wins.
#[derive(Debug)]
pub struct EntityIndex<'a> {
    layers: HashMap<&'a str, &'a Layer>,
    keyframes: HashMap<&'a str, &'a Keyframe>,
    symbols: HashMap<&'a str, &'a Symbol>,
}

impl<'a> EntityIndex<'a> {
    /// Indexes the tables of an entity.
    pub fn new(entity: &'a SpriteEntityAsset) -> Self {
        let mut layers = HashMap::with_capacity(entity.layers.len());
        for layer in &entity.layers {
            layers.entry(layer.id.as_str()).or_insert(layer);
        }
        let mut keyframes = HashMap::with_capacity(entity.keyframes.len());
        for keyframe in &entity.keyframes {
            keyframes.entry(keyframe.id.as_str()).or_insert(keyframe);
        }
        let mut symbols = HashMap::with_capacity(entity.symbols.len());
        for symbol in &entity.symbols {
            symbols.entry(symbol.id.as_str()).or_insert(symbol);
        }
        Self {
            layers,
            keyframes,
            symbols,
        }
    }

    pub fn layer(&self, id: &str) -> Option<&'a Layer> {
        self.layers.get(id).copied()
    }

    pub fn keyframe(&self, id: &str) -> Option<&'a Keyframe> {
        self.keyframes.get(id).copied()
    }

    pub fn symbol(&self, id: &str) -> Option<&'a Symbol> {
        self.symbols.get(id).copied()
    }
}
