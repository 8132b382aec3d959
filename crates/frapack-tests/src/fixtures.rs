//! Test fixture utilities for building project documents on disk.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use frapack_backend_atlas::png::{encode_rgba, PngConfig};
use frapack_backend_atlas::PixelBuffer;
use frapack_cli::decode::ImageDecoder;
use frapack_cli::input::{load_project, LoadedProject};
use frapack_export::{export, ExportOptions, ExportReport};
use frapack_model::ExportConfig;
use serde_json::{json, Map, Value};
use tempfile::TempDir;

/// Transparent canvas with an opaque block at (x, y).
pub fn block(canvas: (u32, u32), x: u32, y: u32, w: u32, h: u32, color: [u8; 4]) -> PixelBuffer {
    let mut buffer = PixelBuffer::new(canvas.0, canvas.1);
    for yy in y..y + h {
        for xx in x..x + w {
            buffer.set_pixel(xx, yy, color);
        }
    }
    buffer
}

/// PNG encoding of `pixels`.
pub fn png_bytes(pixels: &PixelBuffer) -> Vec<u8> {
    encode_rgba(pixels, &PngConfig::default()).expect("Failed to encode PNG")
}

/// A project document in a temporary directory.
///
/// Every asset added is marked for export unless stated otherwise, and its
/// file is written under `assets/`.
pub struct ProjectFixture {
    pub root: TempDir,
    document: Map<String, Value>,
    files: Map<String, Value>,
}

impl ProjectFixture {
    /// Create a fixture whose manifest names `resource_id`.
    pub fn new(resource_id: &str) -> Self {
        let root = TempDir::new().expect("Failed to create temp dir");
        fs::create_dir_all(root.path().join("assets")).expect("Failed to create assets dir");
        let mut fixture = Self {
            root,
            document: Map::new(),
            files: Map::new(),
        };
        let manifest = json!({"resourceId": resource_id, "content": []}).to_string();
        fixture.push(
            "scriptAssets",
            json!({"guid": "manifest-guid", "id": "manifest", "script": manifest}),
        );
        fixture
    }

    /// Get the fixture root path.
    pub fn path(&self) -> &Path {
        self.root.path()
    }

    fn push(&mut self, list: &str, asset: Value) {
        self.document
            .entry(list)
            .or_insert_with(|| Value::Array(Vec::new()))
            .as_array_mut()
            .expect("asset lists are arrays")
            .push(asset);
    }

    fn add_file(&mut self, guid: &str, filename: &str, bytes: &[u8]) {
        let relative = format!("assets/{}", filename);
        fs::write(self.root.path().join(&relative), bytes).expect("Failed to write asset file");
        self.files.insert(guid.to_string(), Value::String(relative));
    }

    /// Add an image asset stored as PNG.
    pub fn image(mut self, guid: &str, id: &str, pixels: &PixelBuffer) -> Self {
        self.add_file(guid, &format!("{}.png", guid), &png_bytes(pixels));
        self.push("imageAssets", json!({"guid": guid, "id": id, "export": true}));
        self
    }

    /// Add an image asset that symbols may use but that is not exported itself.
    pub fn hidden_image(mut self, guid: &str, id: &str, pixels: &PixelBuffer) -> Self {
        self.add_file(guid, &format!("{}.png", guid), &png_bytes(pixels));
        self.push("imageAssets", json!({"guid": guid, "id": id, "export": false}));
        self
    }

    /// Add an audio asset.
    pub fn audio(mut self, guid: &str, id: &str, filename: &str, bytes: &[u8]) -> Self {
        self.add_file(guid, filename, bytes);
        self.push("audioAssets", json!({"guid": guid, "id": id, "export": true}));
        self
    }

    /// Add an opaque binary asset.
    pub fn binary(mut self, guid: &str, id: &str, bytes: &[u8]) -> Self {
        self.add_file(guid, &format!("{}.bin", guid), bytes);
        self.push("binaryAssets", json!({"guid": guid, "id": id, "export": true}));
        self
    }

    /// Add a sprite entity given as project JSON.
    pub fn entity(mut self, entity: Value) -> Self {
        self.push("spriteEntityAssets", entity);
        self
    }

    /// Add any asset JSON to the named list.
    pub fn asset(mut self, list: &str, asset: Value) -> Self {
        self.push(list, asset);
        self
    }

    /// Write `project.json` and return its path.
    pub fn write(&self) -> PathBuf {
        let mut document = self.document.clone();
        document.insert("files".to_string(), Value::Object(self.files.clone()));
        let path = self.root.path().join("project.json");
        fs::write(&path, Value::Object(document).to_string()).expect("Failed to write project");
        path
    }

    /// Write and load the project through the CLI loader.
    pub fn load(&self) -> LoadedProject {
        load_project(&self.write()).expect("Failed to load project")
    }

    /// Write, load and export with `config`.
    pub fn export(&self, config: ExportConfig) -> ExportReport {
        let LoadedProject {
            project, library, ..
        } = self.load();
        export(
            &project,
            &library,
            Arc::new(ImageDecoder),
            &ExportOptions::new(config),
            |_| {},
        )
        .expect("Export failed")
    }
}

/// A one-animation entity with one layer, as project JSON.
///
/// `keyframes` and `symbols` are given in project JSON form; the layer
/// lists the keyframes in the order given.
pub fn entity_json(
    guid: &str,
    id: &str,
    layer_type: &str,
    keyframes: Vec<Value>,
    symbols: Vec<Value>,
) -> Value {
    let keyframe_ids: Vec<Value> = keyframes
        .iter()
        .map(|k| k.get("$id").cloned().unwrap_or(Value::Null))
        .collect();
    json!({
        "guid": guid,
        "id": id,
        "export": true,
        "animations": [{"$id": "anim-1", "name": "idle", "layers": ["layer-1"]}],
        "layers": [{"$id": "layer-1", "name": "main", "type": layer_type, "keyframes": keyframe_ids}],
        "keyframes": keyframes,
        "symbols": symbols
    })
}

/// An image keyframe pointing at `symbol`.
pub fn image_keyframe(id: &str, length: u32, symbol: &str) -> Value {
    json!({"$id": id, "type": "IMAGE", "length": length, "symbol": symbol})
}

/// An image symbol placing `image_guid` at (x, y).
pub fn image_symbol(id: &str, image_guid: &str, x: f64, y: f64) -> Value {
    json!({"$id": id, "type": "IMAGE", "imageAsset": image_guid, "x": x, "y": y})
}
