//! The export pipeline.
//!
//! Phases run strictly in order: media decoding, entity flattening, then
//! container writing. Entities are flattened one at a time because image
//! placement depends on call order. Every cache lives inside one call and
//! is dropped when it returns.

use std::sync::Arc;

use frapack_backend_atlas::{AtlasPacker, PackerConfig};
use frapack_model::{AssetHeader, ExportConfig, ExportWarning, Project, WarningCode};
use tracing::{debug, info, warn};

use crate::assets::{audio_format, nine_slice_record, palette_record, script_record};
use crate::container::ContainerSerializer;
use crate::error::ExportError;
use crate::flatten::AnimationFlattener;
use crate::media::{decode_images, MediaDecoder, MediaLibrary, MediaOptions};
use crate::progress::{Phase, ProgressReporter};

/// Everything that shapes one export.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExportOptions {
    pub config: ExportConfig,
    pub packer: PackerConfig,
    pub media: MediaOptions,
}

impl ExportOptions {
    pub fn new(config: ExportConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }
}

/// Result of a successful export.
#[derive(Debug, Clone)]
pub struct ExportReport {
    /// The complete container.
    pub bytes: Vec<u8>,
    /// Recoverable problems, in the order they were found.
    pub warnings: Vec<ExportWarning>,
    /// Number of spritesheets written.
    pub spritesheets: usize,
    /// Number of entities written.
    pub entities: usize,
}

impl ExportReport {
    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }
}

/// Decode all images, then export.
///
/// Decoded pixels are kept in a copy of `library` owned by this call, so
/// the caller's library is never modified.
///
/// `on_progress` receives a non-decreasing percentage ending at 100.
pub fn export(
    project: &Project,
    library: &MediaLibrary,
    decoder: Arc<dyn MediaDecoder>,
    options: &ExportOptions,
    on_progress: impl FnMut(u8),
) -> Result<ExportReport, ExportError> {
    let mut progress = ProgressReporter::new(on_progress);
    let mut media = library.clone();
    info!("Loading media...");
    let mut warnings = decode_images(project, &mut media, decoder, &options.media, &mut progress)?;

    let mut report = export_decoded(project, &media, options, &mut progress)?;
    warnings.append(&mut report.warnings);
    report.warnings = warnings;
    Ok(report)
}

/// Export a project whose images are already decoded into `library`.
pub fn export_decoded(
    project: &Project,
    library: &MediaLibrary,
    options: &ExportOptions,
    progress: &mut ProgressReporter<'_>,
) -> Result<ExportReport, ExportError> {
    progress.report(Phase::Media, 0, 0);

    let entities: Vec<_> = project
        .sprite_entity_assets
        .iter()
        .filter(|entity| exportable(&entity.header, "sprite entity", library))
        .collect();
    let total_animations: usize = entities.iter().map(|e| e.animations.len()).sum();

    let mut packer = AtlasPacker::new(options.packer);
    let mut serializer = ContainerSerializer::new();

    let mut warnings = {
        let mut flattener = AnimationFlattener::new(&mut packer, library);
        let data = serializer.data_mut();

        info!("Writing SpriteEntity objects...");
        let mut done = 0;
        for entity in &entities {
            let record = flattener.flatten_entity(entity, || {
                done += 1;
                progress.report(Phase::Animations, done, total_animations);
            });
            info!("Added sprite entity data: {}", record.id);
            data.entities.push(record);
        }
        progress.report(Phase::Animations, done, total_animations);

        info!("Writing scripts objects...");
        for script in &project.script_assets {
            if exportable(&script.header, "script", library) {
                let filename = library.filename(&script.header.guid);
                data.scripts.push(script_record(script, filename));
                debug!("Added script: {}", script.header.id);
            }
        }

        info!("Writing palette collection data...");
        for palette in &project.palette_collection_assets {
            if exportable(&palette.header, "palette collection", library) {
                data.scripts.push(palette_record(palette)?);
                debug!("Added palette collection script: {}", palette.header.id);
            }
        }

        info!("Writing nine slice assets...");
        for nine_slice in &project.nine_slice_assets {
            if exportable(&nine_slice.header, "nine slice", library) {
                data.nine_slices
                    .push(nine_slice_record(nine_slice, &mut flattener));
                debug!("Added nine slice data: {}", nine_slice.header.id);
            }
        }

        flattener.into_warnings()
    };

    let sheets = packer.into_sheets();
    let spritesheets = sheets.len();
    info!("Writing binary spritesheet data...");
    for (i, sheet) in sheets.iter().enumerate() {
        serializer.write_sheet(sheet, options.config.recompress_images)?;
        progress.report(Phase::Write, i + 1, spritesheets);
    }
    drop(sheets);

    info!("Writing binary image data...");
    for image in &project.image_assets {
        if exportable(&image.header, "image", library) {
            let bytes = source_bytes(&image.header, library, &mut warnings);
            serializer.write_image(&image.header, &bytes);
        }
    }

    info!("Writing binary audio data...");
    for audio in &project.audio_assets {
        if exportable(&audio.header, "audio", library) {
            let bytes = source_bytes(&audio.header, library, &mut warnings);
            let format = audio_format(library.filename(&audio.header.guid));
            serializer.write_audio(&audio.header, format, &bytes);
        }
    }

    info!("Writing other binary data...");
    for binary in &project.binary_assets {
        if exportable(&binary.header, "binary", library) {
            let bytes = source_bytes(&binary.header, library, &mut warnings);
            serializer.write_binary(&binary.header, &bytes);
        }
    }

    let entities = serializer.data().entities.len();
    let bytes = serializer.finish(options.config.json_format)?;
    progress.complete();
    info!(
        "Export complete: {} bytes, {} spritesheet(s), {} warning(s)",
        bytes.len(),
        spritesheets,
        warnings.len()
    );

    Ok(ExportReport {
        bytes,
        warnings,
        spritesheets,
        entities,
    })
}

/// Whether an asset is written, logging why it is skipped.
fn exportable(header: &AssetHeader, kind: &str, library: &MediaLibrary) -> bool {
    if !header.export {
        debug!(
            "Skipping {} not marked for export: {}",
            kind,
            library.filename(&header.guid)
        );
        return false;
    }
    if header.id.is_empty() {
        warn!(
            "Skipping {} lacking an id: {}",
            kind,
            library.filename(&header.guid)
        );
        return false;
    }
    true
}

fn source_bytes(
    header: &AssetHeader,
    library: &MediaLibrary,
    warnings: &mut Vec<ExportWarning>,
) -> Arc<[u8]> {
    match library.source(&header.guid) {
        Some(source) => Arc::clone(&source.bytes),
        None => {
            let message = format!("No source bytes for asset {}; writing empty payload", header.id);
            warn!("{}", message);
            warnings.push(ExportWarning::new(WarningCode::MissingAsset, message));
            Arc::from(Vec::<u8>::new())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::container::read_container;
    use frapack_backend_atlas::PixelBuffer;
    use frapack_model::{
        AudioAsset, BinaryAsset, ImageAsset, ImageSymbol, JsonFormat, Keyframe, KeyframeKind,
        Layer, LayerKind, PluginMetadata, ScriptAsset, SpriteAnimation, SpriteEntityAsset,
        Symbol, SymbolKeyframe, SymbolKind, Transform,
    };
    use serde_json::json;

    fn fake_decoder(_: &str, bytes: &[u8]) -> Result<PixelBuffer, String> {
        Ok(PixelBuffer::filled(bytes.len() as u32, 2, [10, 20, 30, 255]))
    }

    fn sample_project() -> Project {
        Project {
            image_assets: vec![
                ImageAsset {
                    header: AssetHeader::new("img-1", "sword"),
                },
                ImageAsset {
                    header: AssetHeader::new("img-2", "hidden").with_export(false),
                },
            ],
            audio_assets: vec![AudioAsset {
                header: AssetHeader::new("snd-1", "swing"),
            }],
            binary_assets: vec![BinaryAsset {
                header: AssetHeader::new("bin-1", ""),
            }],
            script_assets: vec![ScriptAsset {
                header: AssetHeader::new("scr-1", "hero_script"),
                script: "// hi".to_string(),
                language: None,
            }],
            ..Project::default()
        }
    }

    fn sample_library() -> MediaLibrary {
        let mut library = MediaLibrary::new();
        library.insert_source("img-1", "sword.png", vec![1u8, 2, 3]);
        library.insert_source("img-2", "hidden.png", vec![4u8, 5]);
        library.insert_source("snd-1", "swing.wav", vec![6u8, 7, 8, 9]);
        library.insert_source("bin-1", "data.bin", vec![0u8; 16]);
        library.insert_source("scr-1", "Script.hx", Vec::<u8>::new());
        library
    }

    #[test]
    fn test_export_writes_exportable_assets_only() {
        let project = sample_project();
        let library = sample_library();
        let mut seen = Vec::new();
        let report = export(
            &project,
            &library,
            Arc::new(fake_decoder),
            &ExportOptions::default(),
            |p| seen.push(p),
        )
        .unwrap();

        let view = read_container(&report.bytes).unwrap();
        let header = &view.header;
        assert_eq!(header["images"].as_array().unwrap().len(), 1);
        assert_eq!(header["images"][0]["id"], json!("sword"));
        assert_eq!(header["audio"][0]["format"], json!("wav"));
        assert_eq!(header["audio"][0]["bytesOffset"], json!(3));
        assert_eq!(header["binary"], json!([]));
        assert_eq!(header["scripts"][0]["language"], json!("hscript"));
        assert_eq!(view.region, &[1, 2, 3, 6, 7, 8, 9]);

        assert!(!report.has_warnings());
        assert_eq!(report.spritesheets, 0);
        assert_eq!(seen.last(), Some(&100));
        assert!(seen.windows(2).all(|w| w[0] <= w[1]));
    }

    #[test]
    fn test_export_is_deterministic() {
        let project = sample_project();
        let run = || {
            let library = sample_library();
            export(
                &project,
                &library,
                Arc::new(fake_decoder),
                &ExportOptions::new(ExportConfig::default().with_json_format(JsonFormat::Base64)),
                |_| {},
            )
            .unwrap()
            .bytes
        };
        assert_eq!(run(), run());
    }

    #[test]
    fn test_missing_source_bytes_warns() {
        let project = Project {
            binary_assets: vec![BinaryAsset {
                header: AssetHeader::new("bin-x", "blob"),
            }],
            ..Project::default()
        };
        let library = MediaLibrary::new();
        let report = export_decoded(
            &project,
            &library,
            &ExportOptions::default(),
            &mut ProgressReporter::silent(),
        )
        .unwrap();

        assert_eq!(report.warnings.len(), 1);
        assert_eq!(report.warnings[0].code, WarningCode::MissingAsset);
        let view = read_container(&report.bytes).unwrap();
        assert_eq!(view.header["binary"][0]["bytesLength"], json!(0));
    }

    fn image_entity() -> SpriteEntityAsset {
        SpriteEntityAsset {
            header: AssetHeader::new("ent-1", "hero"),
            animations: vec![SpriteAnimation {
                id: "a1".to_string(),
                name: "idle".to_string(),
                layers: vec!["l1".to_string()],
                plugin_metadata: PluginMetadata::new(),
            }],
            layers: vec![Layer {
                id: "l1".to_string(),
                name: "main".to_string(),
                kind: LayerKind::Image,
                keyframes: vec!["k1".to_string()],
                plugin_metadata: PluginMetadata::new(),
            }],
            keyframes: vec![Keyframe {
                id: "k1".to_string(),
                length: 1,
                kind: KeyframeKind::Image(SymbolKeyframe {
                    symbol: Some("s1".to_string()),
                    ..SymbolKeyframe::default()
                }),
                plugin_metadata: PluginMetadata::new(),
            }],
            symbols: vec![Symbol {
                id: "s1".to_string(),
                kind: SymbolKind::Image(ImageSymbol {
                    image_asset: "img".to_string(),
                    transform: Transform::default(),
                }),
                plugin_metadata: PluginMetadata::new(),
            }],
        }
    }

    #[test]
    fn test_export_leaves_library_untouched() {
        let project = Project {
            image_assets: vec![ImageAsset {
                header: AssetHeader::new("img", "sprite").with_export(false),
            }],
            sprite_entity_assets: vec![image_entity()],
            ..Project::default()
        };
        let mut library = MediaLibrary::new();
        library.insert_source("img", "img.png", vec![0u8; 3]);

        let frames = |library: &MediaLibrary| {
            let report = export(
                &project,
                library,
                Arc::new(fake_decoder),
                &ExportOptions::default(),
                |_| {},
            )
            .unwrap();
            read_container(&report.bytes).unwrap().header["spritesheets"][0]["frames"].clone()
        };

        assert_eq!(frames(&library), json!([0, 0, 3, 2]));
        assert!(library.image("img").is_none());

        // Replaced source bytes are decoded afresh
        library.insert_source("img", "img.png", vec![0u8; 7]);
        assert_eq!(frames(&library), json!([0, 0, 7, 2]));
    }

    #[test]
    fn test_write_phase_reported_per_sheet() {
        let project = Project {
            sprite_entity_assets: vec![image_entity()],
            ..Project::default()
        };
        let mut library = MediaLibrary::new();
        library.insert_image("img", PixelBuffer::filled(4, 4, [1, 2, 3, 255]));

        let mut seen = Vec::new();
        {
            let mut progress = ProgressReporter::new(|p| seen.push(p));
            export_decoded(&project, &library, &ExportOptions::default(), &mut progress).unwrap();
        }
        // Media, one animation, one sheet, then completion
        assert_eq!(seen, vec![30, 99, 99, 100, 100]);
    }
}
