//! Loading project documents and their asset files from disk.
//!
//! A project document is the JSON project model plus a `files` table that
//! maps asset guid to a path relative to the document. Every listed file is
//! read into a [`MediaLibrary`] so the exporter never touches the disk.

use anyhow::{Context, Result};
use frapack_export::MediaLibrary;
use frapack_model::{ExportConfig, Project, ProjectDocument};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// A loaded project with its asset bytes.
#[derive(Debug)]
pub struct LoadedProject {
    pub project: Project,
    pub library: MediaLibrary,
    /// Directory the `files` paths were resolved against.
    pub base_dir: PathBuf,
}

/// Reads a project document and every asset file it lists.
///
/// Files that cannot be read are logged and left out of the library; the
/// exporter reports the affected assets as missing.
pub fn load_project(path: &Path) -> Result<LoadedProject> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("Failed to read project document: {}", path.display()))?;
    let ProjectDocument { files, project } = ProjectDocument::from_json(&text)
        .with_context(|| format!("Failed to parse project document: {}", path.display()))?;

    let base_dir = path
        .parent()
        .map(Path::to_path_buf)
        .unwrap_or_default();

    let mut library = MediaLibrary::new();
    for (guid, relative) in &files {
        let file_path = base_dir.join(relative);
        match fs::read(&file_path) {
            Ok(bytes) => {
                debug!("Loaded {} ({} bytes)", file_path.display(), bytes.len());
                library.insert_source(guid.as_str(), file_name(relative), bytes);
            }
            Err(e) => warn!("Could not read {}: {}", file_path.display(), e),
        }
    }

    Ok(LoadedProject {
        project,
        library,
        base_dir,
    })
}

/// Reads an export configuration file.
pub fn load_config(path: &Path) -> Result<ExportConfig> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;
    serde_json::from_str(&text)
        .with_context(|| format!("Failed to parse config file: {}", path.display()))
}

fn file_name(relative: &str) -> &str {
    relative
        .rsplit(|c| c == '/' || c == '\\')
        .next()
        .unwrap_or(relative)
}

#[cfg(test)]
mod tests {
    use super::*;
    use frapack_model::JsonFormat;

    #[test]
    fn test_file_name() {
        assert_eq!(file_name("sprites/hero.png"), "hero.png");
        assert_eq!(file_name("sfx\\jump.ogg"), "jump.ogg");
        assert_eq!(file_name("plain.bin"), "plain.bin");
    }

    #[test]
    fn test_load_project_resolves_files() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir(dir.path().join("assets")).unwrap();
        fs::write(dir.path().join("assets/data.bin"), [1u8, 2, 3]).unwrap();
        let doc = dir.path().join("project.json");
        fs::write(
            &doc,
            r#"{
                "files": {"bin-1": "assets/data.bin", "gone": "assets/missing.bin"},
                "binaryAssets": [{"guid": "bin-1", "id": "data"}]
            }"#,
        )
        .unwrap();

        let loaded = load_project(&doc).unwrap();
        assert_eq!(loaded.project.binary_assets.len(), 1);
        let source = loaded.library.source("bin-1").unwrap();
        assert_eq!(source.filename, "data.bin");
        assert_eq!(&source.bytes[..], &[1, 2, 3]);
        assert!(loaded.library.source("gone").is_none());
    }

    #[test]
    fn test_load_project_rejects_bad_json() {
        let dir = tempfile::tempdir().unwrap();
        let doc = dir.path().join("project.json");
        fs::write(&doc, "{not json").unwrap();
        let err = load_project(&doc).unwrap_err();
        assert!(err.to_string().contains("Failed to parse project document"));
    }

    #[test]
    fn test_load_config_accepts_legacy_names() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, r#"{"jsonCompression": "base64", "pngCompression": true}"#).unwrap();
        let config = load_config(&path).unwrap();
        assert_eq!(config.json_format, JsonFormat::Base64);
        assert!(config.recompress_images);
    }
}
