//! Resource container layout.
//!
//! A container is a big-endian `u32` header length, the header JSON, and a
//! binary region holding every payload back to back:
//!
//! ```text
//! +-----------+----------------------+-----------------------------------+
//! | u32 BE    | header (len bytes)   | sheets | images | audio | binary  |
//! +-----------+----------------------+-----------------------------------+
//! ```
//!
//! Each record's `bytesOffset` is relative to the start of the binary region.

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use frapack_backend_atlas::png::{encode_rgba, recompress, PngConfig};
use frapack_backend_atlas::SheetWriteState;
use frapack_model::canonical::{to_stable_pretty_string, to_stable_string};
use frapack_model::{
    AssetHeader, AudioRecord, BinaryRecord, JsonFormat, ResourceData, SpriteSheetRecord,
    SPRITESHEET_VERSION,
};
use serde_json::Value;
use tracing::{debug, info};

use crate::error::{ContainerError, ExportError};

/// Size of the header length prefix.
pub const LENGTH_PREFIX_SIZE: usize = 4;

/// Append-only byte region with offset bookkeeping.
#[derive(Debug, Default)]
pub struct BinaryRegion {
    bytes: Vec<u8>,
}

impl BinaryRegion {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a payload and return its `(offset, length)`.
    pub fn append(&mut self, payload: &[u8]) -> (u64, u64) {
        let offset = self.bytes.len() as u64;
        self.bytes.extend_from_slice(payload);
        (offset, payload.len() as u64)
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }
}

/// Builds the header and binary region of one container.
///
/// Payloads must be written section by section: all sheets, then images,
/// then audio, then other binary assets.
#[derive(Debug, Default)]
pub struct ContainerSerializer {
    data: ResourceData,
    region: BinaryRegion,
}

impl ContainerSerializer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Header records written so far.
    pub fn data_mut(&mut self) -> &mut ResourceData {
        &mut self.data
    }

    pub fn data(&self) -> &ResourceData {
        &self.data
    }

    /// Encode each sheet to PNG and append it.
    pub fn write_sheets(
        &mut self,
        sheets: &[SheetWriteState],
        recompress_images: bool,
    ) -> Result<(), ExportError> {
        for sheet in sheets {
            self.write_sheet(sheet, recompress_images)?;
        }
        Ok(())
    }

    /// PNG-encode one sheet and append it.
    pub fn write_sheet(
        &mut self,
        sheet: &SheetWriteState,
        recompress_images: bool,
    ) -> Result<(), ExportError> {
        let encoded = encode_rgba(sheet.pixels(), &PngConfig::default())?;
        let original_len = encoded.len();
        let bytes = if recompress_images {
            recompress(&encoded)?
        } else {
            encoded
        };

        let (bytes_offset, bytes_length) = self.region.append(&bytes);
        info!(
            "Wrote sprite sheet no. {}, group: {} ({}x{}, compressed {}->{} bytes)",
            self.data.spritesheets.len(),
            sheet.group(),
            sheet.pixels().width(),
            sheet.pixels().height(),
            original_len,
            bytes_length
        );
        self.data.spritesheets.push(SpriteSheetRecord {
            version: SPRITESHEET_VERSION,
            bytes_offset,
            bytes_length,
            frames: sheet.frame_data(),
            group: sheet.group().to_string(),
        });
        Ok(())
    }

    /// Append the source bytes of an image asset.
    pub fn write_image(&mut self, header: &AssetHeader, bytes: &[u8]) {
        let record = self.binary_record(header, bytes);
        debug!("Wrote image: {} ({} bytes)", header.id, record.bytes_length);
        self.data.images.push(record);
    }

    /// Append the source bytes of an audio asset.
    pub fn write_audio(&mut self, header: &AssetHeader, format: String, bytes: &[u8]) {
        let record = self.binary_record(header, bytes);
        debug!("Wrote audio: {} ({} bytes)", header.id, record.bytes_length);
        self.data.audio.push(AudioRecord { record, format });
    }

    /// Append the bytes of an opaque binary asset.
    pub fn write_binary(&mut self, header: &AssetHeader, bytes: &[u8]) {
        let record = self.binary_record(header, bytes);
        debug!("Wrote binary data: {} ({} bytes)", header.id, record.bytes_length);
        self.data.binary.push(record);
    }

    fn binary_record(&mut self, header: &AssetHeader, bytes: &[u8]) -> BinaryRecord {
        let (bytes_offset, bytes_length) = self.region.append(bytes);
        BinaryRecord {
            version: header.version,
            id: header.id.clone(),
            guid: header.guid.clone(),
            bytes_offset,
            bytes_length,
            tags: header.tags.clone(),
            metadata: header.metadata(),
        }
    }

    /// Verify offsets, encode the header, and assemble the container.
    pub fn finish(self, format: JsonFormat) -> Result<Vec<u8>, ExportError> {
        verify_offsets(&self.data, self.region.len() as u64)?;
        let header = encode_header(&self.data, format)?;
        assemble(&header, &self.region.into_bytes())
    }
}

/// Check that payload ranges tile the binary region in section order.
pub fn verify_offsets(data: &ResourceData, region_len: u64) -> Result<(), ExportError> {
    let ranges = data
        .spritesheets
        .iter()
        .map(|s| ("spritesheet", s.bytes_offset, s.bytes_length))
        .chain(data.images.iter().map(|r| ("image", r.bytes_offset, r.bytes_length)))
        .chain(
            data.audio
                .iter()
                .map(|a| ("audio", a.record.bytes_offset, a.record.bytes_length)),
        )
        .chain(data.binary.iter().map(|r| ("binary", r.bytes_offset, r.bytes_length)));

    let mut expected = 0u64;
    for (section, offset, length) in ranges {
        if offset != expected {
            return Err(ExportError::Serialization(format!(
                "{} record at offset {} but previous payload ended at {}",
                section, offset, expected
            )));
        }
        expected = offset + length;
    }
    if expected != region_len {
        return Err(ExportError::Serialization(format!(
            "payloads cover {} bytes but binary region holds {}",
            expected, region_len
        )));
    }
    Ok(())
}

/// Header bytes with stably ordered keys in the requested layout.
pub fn encode_header(data: &ResourceData, format: JsonFormat) -> Result<Vec<u8>, ExportError> {
    let value = serde_json::to_value(data)?;
    let text = match format {
        JsonFormat::Raw => to_stable_string(&value),
        JsonFormat::Base64 => STANDARD.encode(to_stable_string(&value)),
        JsonFormat::Prettify => to_stable_pretty_string(&value),
    };
    Ok(text.into_bytes())
}

/// Prefix the header with its length and append the binary region.
pub fn assemble(header: &[u8], region: &[u8]) -> Result<Vec<u8>, ExportError> {
    let header_len = u32::try_from(header.len()).map_err(|_| {
        ExportError::Serialization(format!("header of {} bytes exceeds u32 range", header.len()))
    })?;

    let mut out = Vec::with_capacity(LENGTH_PREFIX_SIZE + header.len() + region.len());
    out.extend_from_slice(&header_len.to_be_bytes());
    out.extend_from_slice(header);
    out.extend_from_slice(region);
    Ok(out)
}

/// A container split back into its parts.
#[derive(Debug, Clone)]
pub struct ContainerView<'a> {
    /// Header bytes as stored.
    pub raw_header: &'a [u8],
    /// Header JSON, base64-decoded if needed.
    pub header: Value,
    /// Whether the header was stored as base64.
    pub base64: bool,
    /// The binary region.
    pub region: &'a [u8],
}

impl ContainerView<'_> {
    /// Payload bytes of a record.
    pub fn payload(&self, offset: u64, length: u64) -> Option<&[u8]> {
        let start = usize::try_from(offset).ok()?;
        let end = start.checked_add(usize::try_from(length).ok()?)?;
        self.region.get(start..end)
    }
}

/// Split and parse a container.
///
/// Headers that do not start with `{` after optional whitespace are treated
/// as base64.
pub fn read_container(bytes: &[u8]) -> Result<ContainerView<'_>, ContainerError> {
    if bytes.len() < LENGTH_PREFIX_SIZE {
        return Err(ContainerError::Truncated {
            expected: LENGTH_PREFIX_SIZE,
            actual: bytes.len(),
        });
    }
    let mut prefix = [0u8; LENGTH_PREFIX_SIZE];
    prefix.copy_from_slice(&bytes[..LENGTH_PREFIX_SIZE]);
    let header_len = u32::from_be_bytes(prefix) as usize;

    let header_end = LENGTH_PREFIX_SIZE + header_len;
    if bytes.len() < header_end {
        return Err(ContainerError::Truncated {
            expected: header_end,
            actual: bytes.len(),
        });
    }
    let raw_header = &bytes[LENGTH_PREFIX_SIZE..header_end];

    let base64 = raw_header
        .iter()
        .find(|b| !b.is_ascii_whitespace())
        .is_some_and(|&b| b != b'{');
    let text = if base64 {
        String::from_utf8(STANDARD.decode(raw_header)?)?
    } else {
        String::from_utf8(raw_header.to_vec())?
    };

    Ok(ContainerView {
        raw_header,
        header: serde_json::from_str(&text)?,
        base64,
        region: &bytes[header_end..],
    })
}
