//! Image decoding through the `image` crate.

use frapack_backend_atlas::PixelBuffer;
use frapack_export::MediaDecoder;
use image::GenericImageView;

/// Decodes any format the `image` crate was built with into RGBA pixels.
#[derive(Debug, Clone, Copy, Default)]
pub struct ImageDecoder;

impl MediaDecoder for ImageDecoder {
    fn decode(&self, filename: &str, bytes: &[u8]) -> Result<PixelBuffer, String> {
        let img = image::load_from_memory(bytes)
            .map_err(|e| format!("failed to decode {}: {}", filename, e))?;
        let (width, height) = img.dimensions();
        let rgba = img.to_rgba8();
        PixelBuffer::from_rgba8(width, height, rgba.into_raw()).map_err(|e| e.to_string())
    }
}
