//! Export configuration.

use serde::{Deserialize, Serialize};

/// How the header JSON is written into the container.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JsonFormat {
    /// Compact UTF-8 JSON.
    #[default]
    Raw,
    /// Compact JSON, base64 encoded.
    Base64,
    /// JSON indented with two spaces.
    Prettify,
}

impl JsonFormat {
    /// Returns the format name used on the command line and in config files.
    pub fn as_str(&self) -> &'static str {
        match self {
            JsonFormat::Raw => "raw",
            JsonFormat::Base64 => "base64",
            JsonFormat::Prettify => "prettify",
        }
    }
}

impl std::fmt::Display for JsonFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Output options of one export.
///
/// The legacy plugin setting names `jsonCompression` and `pngCompression`
/// are accepted as aliases.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportConfig {
    /// Header text layout.
    #[serde(default, alias = "jsonCompression")]
    pub json_format: JsonFormat,

    /// Re-encode each sheet PNG with the maximum-compression profile.
    #[serde(default, alias = "pngCompression")]
    pub recompress_images: bool,
}

impl ExportConfig {
    /// Sets the header format.
    pub fn with_json_format(mut self, json_format: JsonFormat) -> Self {
        self.json_format = json_format;
        self
    }

    /// Enables or disables sheet recompression.
    pub fn with_recompress_images(mut self, recompress: bool) -> Self {
        self.recompress_images = recompress;
        self
    }
}
