//! Resource manifest.
//!
//! The manifest is a script asset with id `manifest` whose text is JSON. It
//! names the resource (and therefore the output file) and lists the content
//! the resource provides.

use serde::{Deserialize, Serialize};

use crate::error::ManifestError;
use crate::project::Project;

/// Id of the script asset holding the manifest.
pub const MANIFEST_SCRIPT_ID: &str = "manifest";

/// File extension of resource containers.
pub const RESOURCE_EXTENSION: &str = "fra";

/// Kind of a manifest content entry.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ContentType {
    Character,
    Projectile,
    CustomGameObject,
    Stage,
    Platform,
    Music,
    #[default]
    #[serde(rename = "")]
    Unspecified,
}

/// One piece of content provided by the resource.
///
/// Kind-specific fields (script ids, music loop points, ...) are kept in
/// `extra` untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ManifestContent {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(rename = "type", default)]
    pub content_type: ContentType,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceManifest {
    pub resource_id: String,
    #[serde(default)]
    pub content: Vec<ManifestContent>,
}

impl ResourceManifest {
    /// Parses manifest JSON text.
    pub fn from_json(json: &str) -> Result<Self, ManifestError> {
        let manifest: ResourceManifest = serde_json::from_str(json)?;
        if manifest.resource_id.is_empty() {
            return Err(ManifestError::EmptyResourceId);
        }
        Ok(manifest)
    }

    /// Reads the manifest script of a project.
    pub fn from_project(project: &Project) -> Result<Self, ManifestError> {
        let script = project
            .script_by_id(MANIFEST_SCRIPT_ID)
            .ok_or_else(|| ManifestError::Missing(MANIFEST_SCRIPT_ID.to_string()))?;
        Self::from_json(&script.script)
    }

    /// Returns the output file name, e.g. `mychar.fra`.
    pub fn output_filename(&self) -> String {
        format!("{}.{}", self.resource_id, RESOURCE_EXTENSION)
    }
}
