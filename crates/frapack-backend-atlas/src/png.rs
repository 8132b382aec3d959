//! Deterministic PNG encoding for finished sheets.
//!
//! Uses fixed compression settings so the same pixels always encode to the
//! same bytes. [`recompress`] re-encodes an existing PNG with the
//! maximum-compression profile.

use std::io::Write;

use png::{BitDepth, ColorType, Compression, Decoder, Encoder, FilterType, Transformations};
use thiserror::Error;

use crate::pixel::{PixelBuffer, PixelError};

/// Errors from PNG operations.
#[derive(Debug, Error)]
pub enum PngError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("PNG encoding error: {0}")]
    Encoding(#[from] png::EncodingError),

    #[error("PNG decoding error: {0}")]
    Decoding(#[from] png::DecodingError),

    #[error("Invalid dimensions: {0}")]
    InvalidDimensions(String),

    #[error("Unsupported PNG layout: {0}")]
    Unsupported(String),
}

impl From<PixelError> for PngError {
    fn from(err: PixelError) -> Self {
        PngError::InvalidDimensions(err.to_string())
    }
}

/// PNG export configuration for deterministic output.
#[derive(Debug, Clone)]
pub struct PngConfig {
    /// Deflate level. Use a fixed value for determinism.
    pub compression: Compression,
    /// Row filter. Use a fixed value for determinism.
    pub filter: FilterType,
}

impl Default for PngConfig {
    fn default() -> Self {
        Self {
            compression: Compression::Default,
            filter: FilterType::NoFilter,
        }
    }
}

impl PngConfig {
    /// Secondary compression profile: Up filter, maximum deflate level.
    pub fn recompress() -> Self {
        Self {
            compression: Compression::Best,
            filter: FilterType::Up,
        }
    }
}

/// Encode an RGBA buffer to PNG bytes.
pub fn encode_rgba(buffer: &PixelBuffer, config: &PngConfig) -> Result<Vec<u8>, PngError> {
    let mut out = Vec::new();
    write_rgba_to_writer(buffer, &mut out, config)?;
    Ok(out)
}

/// Write an RGBA buffer as PNG to any writer.
pub fn write_rgba_to_writer<W: Write>(
    buffer: &PixelBuffer,
    writer: W,
    config: &PngConfig,
) -> Result<(), PngError> {
    if buffer.width() == 0 || buffer.height() == 0 {
        return Err(PngError::InvalidDimensions(format!(
            "{}x{}",
            buffer.width(),
            buffer.height()
        )));
    }

    let mut encoder = Encoder::new(writer, buffer.width(), buffer.height());
    encoder.set_color(ColorType::Rgba);
    encoder.set_depth(BitDepth::Eight);
    encoder.set_compression(config.compression);
    encoder.set_filter(config.filter);

    // The png crate writes no timestamps or other variable chunks
    let mut png_writer = encoder.write_header()?;
    png_writer.write_image_data(buffer.as_rgba8())?;

    Ok(())
}

/// Decode PNG bytes to an RGBA8 buffer.
///
/// Palette, low bit depth, and 16-bit images are normalized to 8-bit
/// channels; gray and RGB gain an opaque alpha channel.
pub fn decode_rgba(bytes: &[u8]) -> Result<PixelBuffer, PngError> {
    let mut decoder = Decoder::new(bytes);
    decoder.set_transformations(Transformations::EXPAND | Transformations::STRIP_16);
    let mut reader = decoder.read_info()?;
    let mut buf = vec![0; reader.output_buffer_size()];
    let info = reader.next_frame(&mut buf)?;
    let data = &buf[..info.buffer_size()];

    let (color, depth) = reader.output_color_type();
    if depth != BitDepth::Eight {
        return Err(PngError::Unsupported(format!("bit depth {:?}", depth)));
    }

    let rgba = match color {
        ColorType::Rgba => data.to_vec(),
        ColorType::Rgb => data
            .chunks_exact(3)
            .flat_map(|p| [p[0], p[1], p[2], 255])
            .collect(),
        ColorType::GrayscaleAlpha => data
            .chunks_exact(2)
            .flat_map(|p| [p[0], p[0], p[0], p[1]])
            .collect(),
        ColorType::Grayscale => data.iter().flat_map(|&g| [g, g, g, 255]).collect(),
        ColorType::Indexed => {
            return Err(PngError::Unsupported("unexpanded palette".to_string()));
        }
    };

    Ok(PixelBuffer::from_rgba8(info.width, info.height, rgba)?)
}

/// Re-encode PNG bytes with the [`PngConfig::recompress`] profile.
pub fn recompress(bytes: &[u8]) -> Result<Vec<u8>, PngError> {
    let pixels = decode_rgba(bytes)?;
    encode_rgba(&pixels, &PngConfig::recompress())
}
