//! Records for scripts, palette collections and nine-slices.

use std::collections::BTreeMap;

use frapack_model::project::METADATA_NAMESPACE;
use frapack_model::{NineSliceAsset, NineSliceRecord, PaletteCollectionAsset, ScriptAsset, ScriptRecord};
use serde::Serialize;
use serde_json::Value;

use crate::error::ExportError;
use crate::flatten::AnimationFlattener;

/// Language recorded for palette collection scripts.
pub const PALETTE_LANGUAGE: &str = "json";

/// Audio format taken from a file name: the text after the last dot.
///
/// # Example
/// ```
/// use frapack_export::assets::audio_format;
///
/// assert_eq!(audio_format("sfx/jump.ogg"), "ogg");
/// assert_eq!(audio_format("noext"), "");
/// ```
pub fn audio_format(filename: &str) -> String {
    filename
        .rfind('.')
        .map(|dot| filename[dot + 1..].to_string())
        .unwrap_or_default()
}

/// Declared language of a script, else `hscript` for `.hx` files.
pub fn script_language(asset: &ScriptAsset, filename: &str) -> Option<String> {
    asset.language.clone().or_else(|| {
        filename
            .ends_with(".hx")
            .then(|| crate::flatten::DEFAULT_SCRIPT_LANGUAGE.to_string())
    })
}

pub fn script_record(asset: &ScriptAsset, filename: &str) -> ScriptRecord {
    ScriptRecord {
        version: asset.header.version,
        id: asset.header.id.clone(),
        guid: asset.header.guid.clone(),
        value: asset.script.clone(),
        language: script_language(asset, filename),
        tags: asset.header.tags.clone(),
        metadata: asset.header.metadata(),
    }
}

#[derive(Debug, Serialize)]
struct IndexedPalettes {
    base: i64,
    red: i64,
    green: i64,
    blue: i64,
}

#[derive(Debug, Serialize)]
struct PaletteEntry<'a> {
    name: &'a str,
    colors: BTreeMap<&'a str, &'a str>,
}

#[derive(Debug, Serialize)]
struct PaletteData<'a> {
    indexed: IndexedPalettes,
    palettes: Vec<PaletteEntry<'a>>,
}

/// A palette collection as a JSON script record.
///
/// Each map becomes a `{source color: target color}` table. Maps flagged
/// `isBase` or with a `teamColor` of `RED`, `GREEN` or `BLUE` are indexed
/// by position; unflagged slots stay at -1.
pub fn palette_record(asset: &PaletteCollectionAsset) -> Result<ScriptRecord, ExportError> {
    let mut data = PaletteData {
        indexed: IndexedPalettes {
            base: -1,
            red: -1,
            green: -1,
            blue: -1,
        },
        palettes: Vec::with_capacity(asset.maps.len()),
    };

    for (index, map) in asset.maps.iter().enumerate() {
        let colors = map
            .colors
            .iter()
            .filter_map(|entry| {
                asset
                    .colors
                    .iter()
                    .find(|color| color.id == entry.palette_color_id)
                    .map(|source| (source.color.as_str(), entry.target_color.as_str()))
            })
            .collect();
        data.palettes.push(PaletteEntry {
            name: &map.name,
            colors,
        });

        let index = index as i64;
        let Some(bag) = map.plugin_metadata.get(METADATA_NAMESPACE) else {
            continue;
        };
        if bag.get("isBase").is_some_and(is_truthy) {
            data.indexed.base = index;
        }
        match bag.get("teamColor").and_then(Value::as_str) {
            Some("RED") => data.indexed.red = index,
            Some("GREEN") => data.indexed.green = index,
            Some("BLUE") => data.indexed.blue = index,
            _ => {}
        }
    }

    Ok(ScriptRecord {
        version: asset.header.version,
        id: asset.header.id.clone(),
        guid: asset.header.guid.clone(),
        value: serde_json::to_string(&data)?,
        language: Some(PALETTE_LANGUAGE.to_string()),
        tags: asset.header.tags.clone(),
        metadata: Value::Object(serde_json::Map::new()),
    })
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// A nine-slice record, packing its image under the nine-slice's group.
pub fn nine_slice_record(
    asset: &NineSliceAsset,
    flattener: &mut AnimationFlattener<'_>,
) -> NineSliceRecord {
    let group = asset.header.spritesheet_group();
    let frame = flattener.image_frame(&asset.image_asset, &group);
    NineSliceRecord {
        version: asset.header.version,
        id: asset.header.id.clone(),
        guid: asset.header.guid.clone(),
        tags: asset.header.tags.clone(),
        sheet_index: frame.sheet_index,
        frame_index: frame.frame_index,
        border_left: asset.border_left,
        border_top: asset.border_top,
        border_right: asset.border_right,
        border_bottom: asset.border_bottom,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use frapack_backend_atlas::{AtlasPacker, PackerConfig, PixelBuffer};
    use frapack_model::{AssetHeader, PaletteColor, PaletteMap, PaletteMapColor, PluginMetadata};
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use crate::media::MediaLibrary;

    fn palette_map(name: &str, pairs: &[(&str, &str)], metadata: Option<Value>) -> PaletteMap {
        let mut plugin_metadata = PluginMetadata::new();
        if let Some(bag) = metadata {
            plugin_metadata.insert(METADATA_NAMESPACE.to_string(), bag);
        }
        PaletteMap {
            name: name.to_string(),
            colors: pairs
                .iter()
                .map(|(id, target)| PaletteMapColor {
                    palette_color_id: id.to_string(),
                    target_color: target.to_string(),
                })
                .collect(),
            plugin_metadata,
        }
    }

    #[test]
    fn test_palette_record() {
        let asset = PaletteCollectionAsset {
            header: AssetHeader::new("pal-guid", "hero_palettes").with_metadata("ignored", json!(1)),
            colors: vec![
                PaletteColor {
                    id: "c1".to_string(),
                    color: "0xFF000000".to_string(),
                },
                PaletteColor {
                    id: "c2".to_string(),
                    color: "0xFFFFFFFF".to_string(),
                },
            ],
            maps: vec![
                palette_map("Default", &[("c1", "0xFF000000")], Some(json!({"isBase": true}))),
                palette_map(
                    "Red Team",
                    &[("c2", "0xFFFF0000"), ("gone", "0xFF00FF00")],
                    Some(json!({"teamColor": "RED"})),
                ),
                palette_map("Alt", &[], None),
            ],
        };

        let record = palette_record(&asset).unwrap();
        assert_eq!(record.language.as_deref(), Some("json"));
        assert_eq!(record.metadata, json!({}));

        let value: Value = serde_json::from_str(&record.value).unwrap();
        assert_eq!(
            value,
            json!({
                "indexed": {"base": 0, "red": 1, "green": -1, "blue": -1},
                "palettes": [
                    {"name": "Default", "colors": {"0xFF000000": "0xFF000000"}},
                    {"name": "Red Team", "colors": {"0xFFFFFFFF": "0xFFFF0000"}},
                    {"name": "Alt", "colors": {}}
                ]
            })
        );
    }

    #[test]
    fn test_palette_value_is_compact() {
        let asset = PaletteCollectionAsset {
            header: AssetHeader::new("g", "p"),
            colors: vec![],
            maps: vec![],
        };
        let record = palette_record(&asset).unwrap();
        assert_eq!(
            record.value,
            r#"{"indexed":{"base":-1,"red":-1,"green":-1,"blue":-1},"palettes":[]}"#
        );
    }

    #[test]
    fn test_script_language() {
        let mut asset = ScriptAsset {
            header: AssetHeader::new("g", "script"),
            script: "trace(1);".to_string(),
            language: None,
        };
        assert_eq!(script_language(&asset, "Script.hx").as_deref(), Some("hscript"));
        assert_eq!(script_language(&asset, "notes.txt"), None);

        asset.language = Some("lua".to_string());
        assert_eq!(script_language(&asset, "Script.hx").as_deref(), Some("lua"));

        let record = script_record(&asset, "Script.hx");
        assert_eq!(record.value, "trace(1);");
        assert_eq!(record.id, "script");
    }

    #[test]
    fn test_nine_slice_record() {
        let mut media = MediaLibrary::new();
        media.insert_image("panel", PixelBuffer::filled(8, 8, [9, 9, 9, 255]));
        let asset = NineSliceAsset {
            header: AssetHeader::new("ns-guid", "panel_9s").with_metadata("spritesheetGroup", json!("ui")),
            image_asset: "panel".to_string(),
            border_left: 2.0,
            border_top: 3.0,
            border_right: None,
            border_bottom: Some(1.0),
        };

        let mut packer = AtlasPacker::new(PackerConfig::default());
        let record = {
            let mut flattener = AnimationFlattener::new(&mut packer, &media);
            nine_slice_record(&asset, &mut flattener)
        };
        assert_eq!((record.sheet_index, record.frame_index), (0, 0));
        assert_eq!(packer.sheets()[0].group(), "ui");
        assert_eq!(
            serde_json::to_value(&record).unwrap()["borderRight"],
            Value::Null
        );
    }
}
