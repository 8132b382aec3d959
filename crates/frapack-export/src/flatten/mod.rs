//! Animation flattening.
//!
//! Walks each entity's animation graph by id and emits compact records:
//! every symbol becomes a fixed-order numeric array, every image symbol is
//! packed into the atlas, and tweened keyframes are expanded into one
//! keyframe per frame.
//!
//! Missing layers, keyframes and symbols are warnings. A missing layer drops
//! the layer, a missing keyframe drops the keyframe, and a missing symbol
//! leaves the keyframe in place with a null symbol.

mod position;
mod tween;

pub use position::trim_corrected_position;
pub use tween::{tween_symbol, tween_transform};

use frapack_backend_atlas::{AtlasPacker, PixelBuffer, SpriteFrame};
use frapack_model::project::namespaced_metadata;
use frapack_model::{
    AnimationRecord, EntityIndex, EntityRecord, ExportWarning, KeyframeKind, KeyframeRecord,
    Layer, LayerKind, LayerRecord, PluginMetadata, SpriteAnimation, SpriteEntityAsset, Symbol,
    SymbolKeyframe, SymbolKind, SymbolRecord, SymbolType, WarningCode,
};
use tracing::{debug, warn};

use crate::media::{placeholder_image, MediaLibrary, PLACEHOLDER_FILENAME, PLACEHOLDER_GUID};

/// Default language of frame script layers.
pub const DEFAULT_SCRIPT_LANGUAGE: &str = "hscript";

/// Flattens entities into resource records, packing images as it goes.
///
/// Entities must be flattened one at a time, in export order; the packer's
/// placement depends on call order.
#[derive(Debug)]
pub struct AnimationFlattener<'p> {
    packer: &'p mut AtlasPacker,
    media: &'p MediaLibrary,
    placeholder: Option<PixelBuffer>,
    warnings: Vec<ExportWarning>,
}

impl<'p> AnimationFlattener<'p> {
    pub fn new(packer: &'p mut AtlasPacker, media: &'p MediaLibrary) -> Self {
        Self {
            packer,
            media,
            placeholder: None,
            warnings: Vec::new(),
        }
    }

    /// Flatten one entity.
    ///
    /// `on_animation` is called after each animation has been flattened.
    pub fn flatten_entity<F>(
        &mut self,
        entity: &SpriteEntityAsset,
        mut on_animation: F,
    ) -> EntityRecord
    where
        F: FnMut(),
    {
        debug!("Writing SpriteEntity: {}", entity.header.id);
        let index = entity.index();
        let group = entity.header.spritesheet_group();

        let mut animations = Vec::with_capacity(entity.animations.len());
        for animation in &entity.animations {
            animations.push(self.flatten_animation(&index, animation, &group));
            on_animation();
        }

        EntityRecord {
            version: entity.header.version,
            id: entity.header.id.clone(),
            guid: entity.header.guid.clone(),
            tags: entity.header.tags.clone(),
            metadata: entity.header.metadata(),
            animations,
        }
    }

    /// Flatten one animation of an entity.
    pub fn flatten_animation(
        &mut self,
        index: &EntityIndex<'_>,
        animation: &SpriteAnimation,
        group: &str,
    ) -> AnimationRecord {
        debug!("Writing SpriteAnimation: {}", animation.name);

        let mut layers = Vec::with_capacity(animation.layers.len());
        for layer_id in &animation.layers {
            match index.layer(layer_id) {
                Some(layer) => layers.push(self.flatten_layer(index, layer, group)),
                None => self.warn(
                    WarningCode::MissingReference,
                    format!(
                        "Could not find layer id: {} (animation {})",
                        layer_id, animation.name
                    ),
                ),
            }
        }

        AnimationRecord {
            name: animation.name.clone(),
            layers,
            metadata: namespaced_metadata(&animation.plugin_metadata),
        }
    }

    /// Flatten one layer, expanding tweened keyframes.
    pub fn flatten_layer(
        &mut self,
        index: &EntityIndex<'_>,
        layer: &Layer,
        group: &str,
    ) -> LayerRecord {
        debug!("Writing Layer: {}", layer.name);

        let mut record = LayerRecord {
            name: layer.name.clone(),
            layer_type: layer.kind.type_name().to_string(),
            keyframes: Vec::with_capacity(layer.keyframes.len()),
            metadata: namespaced_metadata(&layer.plugin_metadata),
            language: None,
            tile_width: None,
            tile_height: None,
            tileset: None,
        };
        match &layer.kind {
            LayerKind::FrameScript { language } => {
                record.language = Some(
                    language
                        .clone()
                        .unwrap_or_else(|| DEFAULT_SCRIPT_LANGUAGE.to_string()),
                );
            }
            LayerKind::Tilemap {
                tile_width,
                tile_height,
            } => {
                record.tile_width = Some(*tile_width);
                record.tile_height = Some(*tile_height);
                record.tileset = Some(0);
            }
            _ => {}
        }

        for (slot, keyframe_id) in layer.keyframes.iter().enumerate() {
            let Some(keyframe) = index.keyframe(keyframe_id) else {
                self.warn(
                    WarningCode::MissingReference,
                    format!(
                        "Could not find keyframe id: {} (layer {})",
                        keyframe_id, layer.name
                    ),
                );
                continue;
            };

            let mut current = KeyframeRecord {
                length: keyframe.length,
                metadata: namespaced_metadata(&keyframe.plugin_metadata),
                name: None,
                code: None,
                symbol: None,
            };

            match &keyframe.kind {
                KeyframeKind::Label { name } => {
                    current.name = Some(name.clone());
                    record.keyframes.push(current);
                }
                KeyframeKind::FrameScript { code } => {
                    current.code = Some(code.clone());
                    record.keyframes.push(current);
                }
                kind => {
                    // Every remaining kind carries a symbol reference
                    let Some((expected, content)) = kind.symbol_keyframe() else {
                        continue;
                    };
                    let symbol = self.resolve_symbol(index, expected, content);
                    let frame = symbol.and_then(|s| self.frame_for(&s.kind, group));
                    current.symbol = Some(
                        symbol.map(|s| symbol_record(&s.kind, &s.plugin_metadata, frame.as_ref())),
                    );

                    match symbol {
                        Some(symbol) if content.tweened => {
                            let next = self.next_symbol(index, layer, slot, symbol);
                            self.push_tweened(
                                &mut record.keyframes,
                                current,
                                symbol,
                                next,
                                content,
                                frame.as_ref(),
                            );
                        }
                        _ => record.keyframes.push(current),
                    }
                }
            }
        }

        record
    }

    /// Frame of an image asset in a group, packing it on first use.
    ///
    /// Images without decoded pixels are replaced by the placeholder.
    pub fn image_frame(&mut self, guid: &str, group: &str) -> SpriteFrame {
        let frame = match self.media.image(guid) {
            Some(pixels) => self
                .packer
                .place_image(guid, self.media.filename(guid), pixels, group),
            None => {
                self.warn(
                    WarningCode::MissingAsset,
                    format!("Missing image asset: {}. Will use placeholder...", guid),
                );
                let placeholder = self.placeholder.get_or_insert_with(placeholder_image);
                self.packer
                    .place_image(PLACEHOLDER_GUID, PLACEHOLDER_FILENAME, placeholder, group)
            }
        };
        self.warnings.extend(self.packer.take_warnings());
        frame
    }

    /// Warnings raised so far, in the order they were found.
    pub fn into_warnings(self) -> Vec<ExportWarning> {
        self.warnings
    }

    fn frame_for(&mut self, kind: &SymbolKind, group: &str) -> Option<SpriteFrame> {
        match kind {
            SymbolKind::Image(image) => Some(self.image_frame(&image.image_asset, group)),
            _ => None,
        }
    }

    fn resolve_symbol<'a>(
        &mut self,
        index: &EntityIndex<'a>,
        expected: SymbolType,
        content: &SymbolKeyframe,
    ) -> Option<&'a Symbol> {
        let id = content.symbol.as_deref()?;
        let Some(symbol) = index.symbol(id) else {
            self.warn(
                WarningCode::MissingReference,
                format!("Could not find {} symbol id: {}", expected, id),
            );
            return None;
        };
        let found = symbol.kind.symbol_type();
        if found != expected {
            self.warn(
                WarningCode::SymbolTypeMismatch,
                format!("Symbol {} is {}, expected {}", id, found, expected),
            );
            return None;
        }
        Some(symbol)
    }

    /// Symbol of the following keyframe, wrapping to the first keyframe of
    /// the layer when the following one has none.
    fn next_symbol<'a>(
        &mut self,
        index: &EntityIndex<'a>,
        layer: &Layer,
        slot: usize,
        current: &Symbol,
    ) -> Option<&'a Symbol> {
        let lookup = |keyframe_id: Option<&String>| -> Option<&'a Symbol> {
            let keyframe = index.keyframe(keyframe_id?)?;
            let (_, content) = keyframe.kind.symbol_keyframe()?;
            index.symbol(content.symbol.as_deref()?)
        };

        let next = lookup(layer.keyframes.get(slot + 1))
            .or_else(|| lookup(layer.keyframes.first()))?;
        let expected = current.kind.symbol_type();
        if next.kind.symbol_type() != expected {
            self.warn(
                WarningCode::SymbolTypeMismatch,
                format!(
                    "Cannot tween {} symbol {} into {} symbol {}",
                    expected,
                    current.id,
                    next.kind.symbol_type(),
                    next.id
                ),
            );
            return None;
        }
        Some(next)
    }

    /// Push a resolved keyframe and, when it tweens, one synthetic keyframe
    /// for each remaining frame of its length.
    fn push_tweened(
        &mut self,
        out: &mut Vec<KeyframeRecord>,
        mut current: KeyframeRecord,
        symbol: &Symbol,
        next: Option<&Symbol>,
        content: &SymbolKeyframe,
        frame: Option<&SpriteFrame>,
    ) {
        let Some(next) = next else {
            out.push(current);
            return;
        };

        let length = current.length;
        if length > 1 {
            current.length = 1;
        }
        let template = current.clone();
        out.push(current);

        for i in 1..length {
            let t = f64::from(i) / f64::from(length);
            let Some(tweened) = tween_symbol(&symbol.kind, &next.kind, t, content.tween_type) else {
                break;
            };
            let mut keyframe = template.clone();
            keyframe.symbol = Some(Some(symbol_record(&tweened, &symbol.plugin_metadata, frame)));
            out.push(keyframe);
        }
        debug!(
            "Tweened symbol {} -> {} over {} frame(s)",
            symbol.id, next.id, length
        );
    }

    fn warn(&mut self, code: WarningCode, message: String) {
        warn!("{}", message);
        self.warnings.push(ExportWarning::new(code, message));
    }
}

/// The compact record of a symbol.
///
/// Image symbols need the frame their image was packed into; their position
/// is corrected for the frame's trim offset.
pub fn symbol_record(
    kind: &SymbolKind,
    plugin_metadata: &PluginMetadata,
    frame: Option<&SpriteFrame>,
) -> SymbolRecord {
    let mut record = SymbolRecord {
        data: Vec::new(),
        color: None,
        points: None,
        tiles: None,
        metadata: namespaced_metadata(plugin_metadata),
    };

    match kind {
        SymbolKind::Image(image) => {
            let t = &image.transform;
            let trim = frame.map(|f| f.trim_offset).unwrap_or_default();
            let (x, y) = trim_corrected_position(t, trim);
            let (sheet, index) = frame.map_or((0, 0), |f| (f.sheet_index, f.frame_index));
            record.data = vec![
                x,
                y,
                t.alpha,
                t.pivot_x,
                t.pivot_y,
                t.rotation,
                t.scale_x,
                t.scale_y,
                f64::from(sheet),
                f64::from(index),
            ];
        }
        SymbolKind::CollisionBox(bbox) => {
            record.data = transform_data(&bbox.transform);
            record.color = Some(bbox.color.clone());
        }
        SymbolKind::Tilemap(tilemap) => {
            record.data = transform_data(&tilemap.transform);
            record.tiles = Some(tilemap.tiles.clone());
        }
        SymbolKind::CollisionBody(body) => {
            record.data = vec![
                body.head,
                body.hip_width,
                body.hip_x_offset,
                body.hip_y_offset,
                body.foot,
            ];
            record.color = Some(body.color.clone());
        }
        SymbolKind::LineSegment(line) => {
            record.data = vec![line.alpha];
            record.color = Some(line.color.clone());
            record.points = Some(line.points.clone());
        }
        SymbolKind::Point(point) => {
            record.data = vec![point.x, point.y, point.alpha, point.rotation];
            record.color = Some(point.color.clone());
        }
        SymbolKind::Polygon(polygon) => {
            record.data = vec![polygon.x, polygon.y, polygon.alpha, polygon.rotation];
            record.color = Some(polygon.color.clone());
            record.points = Some(polygon.points.clone());
        }
    }
    record
}

fn transform_data(t: &frapack_model::Transform) -> Vec<f64> {
    vec![
        t.x, t.y, t.alpha, t.pivot_x, t.pivot_y, t.rotation, t.scale_x, t.scale_y,
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use frapack_backend_atlas::{PackerConfig, TrimOffset};
    use frapack_model::{
        AssetHeader, CollisionBoxSymbol, ImageSymbol, Keyframe, PointSymbol, Transform, TweenType,
    };
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn symbol_keyframe(id: &str, length: u32, symbol: Option<&str>, tweened: bool) -> Keyframe {
        Keyframe {
            id: id.to_string(),
            length,
            kind: KeyframeKind::CollisionBox(SymbolKeyframe {
                symbol: symbol.map(str::to_string),
                tweened,
                tween_type: TweenType::Linear,
            }),
            plugin_metadata: PluginMetadata::new(),
        }
    }

    fn collision_box(id: &str, x: f64, y: f64) -> Symbol {
        Symbol {
            id: id.to_string(),
            kind: SymbolKind::CollisionBox(CollisionBoxSymbol {
                color: "0x00ff00".to_string(),
                transform: Transform::at(x, y),
            }),
            plugin_metadata: PluginMetadata::new(),
        }
    }

    fn layer(id: &str, kind: LayerKind, keyframes: &[&str]) -> Layer {
        Layer {
            id: id.to_string(),
            name: id.to_string(),
            kind,
            keyframes: keyframes.iter().map(|k| k.to_string()).collect(),
            plugin_metadata: PluginMetadata::new(),
        }
    }

    fn sprite_entity(layers: Vec<Layer>, keyframes: Vec<Keyframe>, symbols: Vec<Symbol>) -> SpriteEntityAsset {
        let layer_ids = layers.iter().map(|l| l.id.clone()).collect();
        SpriteEntityAsset {
            header: AssetHeader::new("entity-guid", "hero"),
            animations: vec![SpriteAnimation {
                id: "a1".to_string(),
                name: "idle".to_string(),
                layers: layer_ids,
                plugin_metadata: PluginMetadata::new(),
            }],
            layers,
            keyframes,
            symbols,
        }
    }

    fn flatten(entity: &SpriteEntityAsset, media: &MediaLibrary) -> (EntityRecord, Vec<ExportWarning>, AtlasPacker) {
        let mut packer = AtlasPacker::new(PackerConfig::default());
        let (record, warnings) = {
            let mut flattener = AnimationFlattener::new(&mut packer, media);
            let record = flattener.flatten_entity(entity, || {});
            (record, flattener.into_warnings())
        };
        (record, warnings, packer)
    }

    #[test]
    fn test_collision_box_tween_over_four_frames() {
        let entity = sprite_entity(
            vec![layer("l1", LayerKind::CollisionBox, &["k1", "k2"])],
            vec![
                symbol_keyframe("k1", 4, Some("s1"), true),
                symbol_keyframe("k2", 1, Some("s2"), false),
            ],
            vec![collision_box("s1", 10.0, 20.0), collision_box("s2", 50.0, 20.0)],
        );
        let (record, warnings, _) = flatten(&entity, &MediaLibrary::new());
        assert!(warnings.is_empty());

        let keyframes = &record.animations[0].layers[0].keyframes;
        let xs: Vec<f64> = keyframes
            .iter()
            .map(|k| k.resolved_symbol().unwrap().data[0])
            .collect();
        assert_eq!(xs, vec![10.0, 20.0, 30.0, 40.0, 50.0]);
        assert!(keyframes.iter().all(|k| k.length == 1));
    }

    #[test]
    fn test_tween_wraps_to_first_keyframe() {
        let entity = sprite_entity(
            vec![layer("l1", LayerKind::CollisionBox, &["k1", "k2"])],
            vec![
                symbol_keyframe("k1", 1, Some("s1"), false),
                symbol_keyframe("k2", 2, Some("s2"), true),
            ],
            vec![collision_box("s1", 0.0, 0.0), collision_box("s2", 10.0, 0.0)],
        );
        let (record, _, _) = flatten(&entity, &MediaLibrary::new());
        let keyframes = &record.animations[0].layers[0].keyframes;
        assert_eq!(keyframes.len(), 3);
        assert_eq!(keyframes[2].resolved_symbol().unwrap().data[0], 5.0);
    }

    #[test]
    fn test_single_keyframe_tweens_into_itself() {
        let entity = sprite_entity(
            vec![layer("l1", LayerKind::CollisionBox, &["k1"])],
            vec![symbol_keyframe("k1", 3, Some("s1"), true)],
            vec![collision_box("s1", 0.0, 0.0)],
        );
        let (record, _, _) = flatten(&entity, &MediaLibrary::new());
        let keyframes = &record.animations[0].layers[0].keyframes;
        // The only keyframe wraps to itself
        assert_eq!(keyframes.len(), 3);
        assert_eq!(keyframes[0].length, 1);
    }

    #[test]
    fn test_missing_symbol_is_null() {
        let entity = sprite_entity(
            vec![layer("l1", LayerKind::CollisionBox, &["k1"])],
            vec![symbol_keyframe("k1", 2, Some("nope"), true)],
            vec![],
        );
        let (record, warnings, _) = flatten(&entity, &MediaLibrary::new());
        let keyframe = &record.animations[0].layers[0].keyframes[0];
        assert_eq!(keyframe.length, 2);
        assert_eq!(keyframe.symbol, Some(None));
        assert_eq!(warnings[0].code, WarningCode::MissingReference);
    }

    #[test]
    fn test_missing_layer_and_keyframe_are_skipped() {
        let mut entity = sprite_entity(
            vec![layer("l1", LayerKind::CollisionBox, &["k1", "ghost"])],
            vec![symbol_keyframe("k1", 1, None, false)],
            vec![],
        );
        entity.animations[0].layers.push("missing-layer".to_string());

        let (record, warnings, _) = flatten(&entity, &MediaLibrary::new());
        let layers = &record.animations[0].layers;
        assert_eq!(layers.len(), 1);
        assert_eq!(layers[0].keyframes.len(), 1);
        assert_eq!(layers[0].keyframes[0].symbol, Some(None));
        assert_eq!(warnings.len(), 2);
        assert!(warnings.iter().all(|w| w.code == WarningCode::MissingReference));
    }

    #[test]
    fn test_symbol_type_mismatch() {
        let point = Symbol {
            id: "p".to_string(),
            kind: SymbolKind::Point(PointSymbol {
                color: String::new(),
                x: 0.0,
                y: 0.0,
                alpha: 1.0,
                rotation: 0.0,
            }),
            plugin_metadata: PluginMetadata::new(),
        };
        let entity = sprite_entity(
            vec![layer("l1", LayerKind::CollisionBox, &["k1"])],
            vec![symbol_keyframe("k1", 1, Some("p"), false)],
            vec![point],
        );
        let (record, warnings, _) = flatten(&entity, &MediaLibrary::new());
        assert_eq!(record.animations[0].layers[0].keyframes[0].symbol, Some(None));
        assert_eq!(warnings[0].code, WarningCode::SymbolTypeMismatch);
    }

    #[test]
    fn test_label_and_script_keyframes() {
        let keyframes = vec![
            Keyframe {
                id: "k1".to_string(),
                length: 2,
                kind: KeyframeKind::Label {
                    name: "start".to_string(),
                },
                plugin_metadata: PluginMetadata::new(),
            },
            Keyframe {
                id: "k2".to_string(),
                length: 1,
                kind: KeyframeKind::FrameScript {
                    code: "self.stop();".to_string(),
                },
                plugin_metadata: PluginMetadata::new(),
            },
        ];
        let entity = sprite_entity(
            vec![
                layer("labels", LayerKind::Label, &["k1"]),
                layer("scripts", LayerKind::FrameScript { language: None }, &["k2"]),
            ],
            keyframes,
            vec![],
        );
        let (record, _, _) = flatten(&entity, &MediaLibrary::new());
        let layers = serde_json::to_value(&record.animations[0].layers).unwrap();
        assert_eq!(
            layers,
            json!([
                {"name": "labels", "type": "LABEL", "metadata": {},
                 "keyframes": [{"length": 2, "metadata": {}, "name": "start"}]},
                {"name": "scripts", "type": "FRAME_SCRIPT", "metadata": {}, "language": "hscript",
                 "keyframes": [{"length": 1, "metadata": {}, "code": "self.stop();"}]}
            ])
        );
    }

    #[test]
    fn test_tilemap_layer_fields() {
        let entity = sprite_entity(
            vec![layer(
                "tiles",
                LayerKind::Tilemap {
                    tile_width: 16.0,
                    tile_height: 16.0,
                },
                &[],
            )],
            vec![],
            vec![],
        );
        let (record, _, _) = flatten(&entity, &MediaLibrary::new());
        let layer = &record.animations[0].layers[0];
        assert_eq!(layer.tile_width, Some(16.0));
        assert_eq!(layer.tileset, Some(0));
    }

    #[test]
    fn test_image_symbol_uses_trim_offset() {
        let mut pixels = PixelBuffer::new(20, 20);
        for y in 5..10 {
            for x in 4..8 {
                pixels.set_pixel(x, y, [255, 255, 255, 255]);
            }
        }
        let mut media = MediaLibrary::new();
        media.insert_image("img", pixels);

        let image = Symbol {
            id: "s1".to_string(),
            kind: SymbolKind::Image(ImageSymbol {
                image_asset: "img".to_string(),
                transform: Transform {
                    scale_x: 2.0,
                    ..Transform::at(100.0, 100.0)
                },
            }),
            plugin_metadata: PluginMetadata::new(),
        };
        let keyframe = Keyframe {
            id: "k1".to_string(),
            length: 1,
            kind: KeyframeKind::Image(SymbolKeyframe {
                symbol: Some("s1".to_string()),
                ..SymbolKeyframe::default()
            }),
            plugin_metadata: PluginMetadata::new(),
        };
        let entity = sprite_entity(vec![layer("l1", LayerKind::Image, &["k1"])], vec![keyframe], vec![image]);
        let (record, warnings, packer) = flatten(&entity, &media);

        assert!(warnings.is_empty());
        let data = &record.animations[0].layers[0].keyframes[0]
            .resolved_symbol()
            .unwrap()
            .data;
        assert_eq!(data[0], 108.0);
        assert_eq!(data[1], 105.0);
        assert_eq!(&data[8..], &[0.0, 0.0]);
        assert_eq!(packer.sheets()[0].rects()[0].width, 4);
    }

    fn image_symbol(id: &str, guid: &str, transform: Transform) -> Symbol {
        Symbol {
            id: id.to_string(),
            kind: SymbolKind::Image(ImageSymbol {
                image_asset: guid.to_string(),
                transform,
            }),
            plugin_metadata: PluginMetadata::new(),
        }
    }

    fn image_keyframe(id: &str, length: u32, symbol: &str, tweened: bool) -> Keyframe {
        Keyframe {
            id: id.to_string(),
            length,
            kind: KeyframeKind::Image(SymbolKeyframe {
                symbol: Some(symbol.to_string()),
                tweened,
                tween_type: TweenType::Linear,
            }),
            plugin_metadata: PluginMetadata::new(),
        }
    }

    #[test]
    fn test_tweened_image_uses_eased_transform_and_current_frame() {
        // Visible block at (4, 5) inside a 20x20 canvas
        let mut trimmed = PixelBuffer::new(20, 20);
        for y in 5..10 {
            for x in 4..8 {
                trimmed.set_pixel(x, y, [255, 255, 255, 255]);
            }
        }
        let mut media = MediaLibrary::new();
        media.insert_image("img-a", trimmed);
        media.insert_image("img-b", PixelBuffer::filled(3, 3, [0, 0, 255, 255]));

        let from = Transform {
            scale_x: 2.0,
            scale_y: 1.5,
            ..Transform::at(100.0, 50.0)
        };
        let to = Transform {
            rotation: 90.0,
            scale_x: 3.0,
            scale_y: 0.5,
            ..Transform::at(130.0, 80.0)
        };
        let entity = sprite_entity(
            vec![layer("l1", LayerKind::Image, &["k1", "k2"])],
            vec![
                image_keyframe("k1", 3, "s1", true),
                image_keyframe("k2", 1, "s2", false),
            ],
            vec![
                image_symbol("s1", "img-a", from),
                image_symbol("s2", "img-b", to),
            ],
        );

        let (record, warnings, _) = flatten(&entity, &media);
        assert!(warnings.is_empty(), "{:?}", warnings);

        let keyframes = &record.animations[0].layers[0].keyframes;
        assert_eq!(keyframes.len(), 4);
        for (i, keyframe) in keyframes.iter().take(3).enumerate() {
            assert_eq!(keyframe.length, 1);
            let data = &keyframe.resolved_symbol().unwrap().data;
            let eased = tween_transform(&from, &to, i as f64 / 3.0, TweenType::Linear);
            let (x, y) = trim_corrected_position(&eased, TrimOffset { x: 4, y: 5 });
            assert!((data[0] - x).abs() < 1e-9, "frame {} x {} != {}", i, data[0], x);
            assert!((data[1] - y).abs() < 1e-9, "frame {} y {} != {}", i, data[1], y);
            assert!((data[5] - 30.0 * i as f64).abs() < 1e-9);
            assert!((data[6] - eased.scale_x).abs() < 1e-9);
            // Still the starting symbol's frame
            assert_eq!(&data[8..10], &[0.0, 0.0]);
        }

        let last = &keyframes[3].resolved_symbol().unwrap().data;
        assert_eq!(&last[..2], &[130.0, 80.0]);
        assert_eq!(&last[8..10], &[0.0, 1.0]);
    }

    #[test]
    fn test_warnings_keep_discovery_order() {
        let mut media = MediaLibrary::new();
        media.insert_image("huge", PixelBuffer::filled(40, 2, [9, 9, 9, 255]));
        let entity = sprite_entity(
            vec![layer("l1", LayerKind::Image, &["k1", "ghost"])],
            vec![image_keyframe("k1", 1, "s1", false)],
            vec![image_symbol("s1", "huge", Transform::default())],
        );

        let mut packer = AtlasPacker::new(PackerConfig {
            default_width: 16,
            default_height: 16,
            max_width: 32,
            max_height: 32,
            padding: 1,
        });
        let warnings = {
            let mut flattener = AnimationFlattener::new(&mut packer, &media);
            flattener.flatten_entity(&entity, || {});
            flattener.into_warnings()
        };
        let codes: Vec<_> = warnings.iter().map(|w| w.code).collect();
        assert_eq!(
            codes,
            vec![WarningCode::OversizedAsset, WarningCode::MissingReference]
        );
    }

    #[test]
    fn test_missing_image_uses_placeholder() {
        let mut packer = AtlasPacker::new(PackerConfig::default());
        let media = MediaLibrary::new();
        let warnings = {
            let mut flattener = AnimationFlattener::new(&mut packer, &media);
            let first = flattener.image_frame("gone", "default");
            let second = flattener.image_frame("also-gone", "default");
            assert_eq!(first.frame_rect, second.frame_rect);
            flattener.into_warnings()
        };
        assert_eq!(warnings.len(), 2);
        assert!(warnings.iter().all(|w| w.code == WarningCode::MissingAsset));
        assert!(packer.frame("default", PLACEHOLDER_GUID).is_some());
        assert_eq!(packer.sheets()[0].rects()[0].width, 100);
    }

    #[test]
    fn test_entity_group_from_metadata() {
        let mut media = MediaLibrary::new();
        media.insert_image("img", PixelBuffer::filled(2, 2, [1, 1, 1, 255]));
        let image = Symbol {
            id: "s1".to_string(),
            kind: SymbolKind::Image(ImageSymbol {
                image_asset: "img".to_string(),
                transform: Transform::default(),
            }),
            plugin_metadata: PluginMetadata::new(),
        };
        let keyframe = Keyframe {
            id: "k1".to_string(),
            length: 1,
            kind: KeyframeKind::Image(SymbolKeyframe {
                symbol: Some("s1".to_string()),
                ..SymbolKeyframe::default()
            }),
            plugin_metadata: PluginMetadata::new(),
        };
        let mut entity = sprite_entity(vec![layer("l1", LayerKind::Image, &["k1"])], vec![keyframe], vec![image]);
        entity.header = entity
            .header
            .with_metadata("spritesheetGroup", json!("hero-sheets"));

        let (record, _, packer) = flatten(&entity, &media);
        assert_eq!(packer.sheets()[0].group(), "hero-sheets");
        assert_eq!(record.metadata, json!({"spritesheetGroup": "hero-sheets"}));
    }

    #[test]
    fn test_symbol_record_layouts() {
        let metadata = PluginMetadata::new();
        let point = symbol_record(
            &SymbolKind::Point(PointSymbol {
                color: "c".to_string(),
                x: 1.0,
                y: 2.0,
                alpha: 0.5,
                rotation: 45.0,
            }),
            &metadata,
            None,
        );
        assert_eq!(
            serde_json::to_value(&point).unwrap(),
            json!({"data": [1.0, 2.0, 0.5, 45.0], "color": "c", "metadata": {}})
        );

        let bbox = symbol_record(&collision_box("b", 3.0, 4.0).kind, &metadata, None);
        assert_eq!(bbox.data, vec![3.0, 4.0, 1.0, 0.0, 0.0, 0.0, 1.0, 1.0]);
    }
}
