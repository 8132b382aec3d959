//! End-to-End Container Layout Tests for frapack
//!
//! Tests verify:
//! - Payload records tile the binary region with no gaps, in section order
//! - The length prefix matches the header for every header format
//! - Every header format decodes to the same JSON
//!
//! ## Running Tests
//!
//! ```bash
//! cargo test -p frapack-tests --test e2e_container
//! ```

use frapack_export::{read_container, ContainerError};
use frapack_model::{ExportConfig, JsonFormat};
use frapack_tests::fixtures::{block, entity_json, image_keyframe, image_symbol, ProjectFixture};
use pretty_assertions::assert_eq;
use serde_json::Value;

const FORMATS: [JsonFormat; 3] = [JsonFormat::Raw, JsonFormat::Base64, JsonFormat::Prettify];

fn rich_project() -> ProjectFixture {
    ProjectFixture::new("layout")
        .image("img-1", "icon", &block((12, 12), 1, 1, 10, 10, [200, 10, 10, 255]))
        .image("img-2", "badge", &block((6, 9), 0, 2, 6, 5, [10, 200, 10, 255]))
        .audio("snd-1", "hit", "hit.wav", &[1, 2, 3, 4, 5])
        .audio("snd-2", "miss", "miss.ogg", &[6, 7])
        .binary("bin-1", "table", &[42; 17])
        .entity(entity_json(
            "ent-1",
            "player",
            "IMAGE",
            vec![image_keyframe("k1", 2, "s1"), image_keyframe("k2", 1, "s2")],
            vec![
                image_symbol("s1", "img-1", 3.0, -2.0),
                image_symbol("s2", "img-2", 0.0, 0.0),
            ],
        ))
}

/// `(offset, length)` of every payload record in section order.
fn payload_ranges(header: &Value) -> Vec<(u64, u64)> {
    ["spritesheets", "images", "audio", "binary"]
        .iter()
        .flat_map(|section| header[*section].as_array().cloned().unwrap_or_default())
        .map(|record| {
            (
                record["bytesOffset"].as_u64().expect("bytesOffset"),
                record["bytesLength"].as_u64().expect("bytesLength"),
            )
        })
        .collect()
}

#[test]
fn test_payloads_tile_the_region() {
    let report = rich_project().export(ExportConfig::default());
    let view = read_container(&report.bytes).unwrap();

    let ranges = payload_ranges(&view.header);
    // 1 sheet, 2 images, 2 audio clips, 1 binary blob
    assert_eq!(ranges.len(), 6);
    assert_eq!(ranges[0].0, 0);
    for pair in ranges.windows(2) {
        assert_eq!(pair[0].0 + pair[0].1, pair[1].0, "gap between {:?}", pair);
    }
    let total: u64 = ranges.iter().map(|(_, len)| len).sum();
    assert_eq!(total, view.region.len() as u64);

    // Audio and binary payloads come through untouched
    assert_eq!(view.payload(ranges[3].0, ranges[3].1), Some(&[1u8, 2, 3, 4, 5][..]));
    assert_eq!(view.payload(ranges[5].0, ranges[5].1), Some(&[42u8; 17][..]));
}

#[test]
fn test_sheet_payload_is_png() {
    let report = rich_project().export(ExportConfig::default());
    let view = read_container(&report.bytes).unwrap();
    let (offset, length) = payload_ranges(&view.header)[0];
    let sheet = view.payload(offset, length).unwrap();
    assert_eq!(&sheet[..8], b"\x89PNG\r\n\x1a\n");
}

#[test]
fn test_length_prefix_matches_header_in_every_format() {
    let project = rich_project();
    let mut headers = Vec::new();

    for format in FORMATS {
        let report = project.export(ExportConfig::default().with_json_format(format));
        let bytes = &report.bytes;

        let prefix = u32::from_be_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]) as usize;
        let view = read_container(bytes).unwrap();
        assert_eq!(prefix, view.raw_header.len(), "{} prefix", format);
        assert_eq!(bytes.len(), 4 + prefix + view.region.len(), "{} total", format);
        assert_eq!(view.base64, format == JsonFormat::Base64);

        headers.push((view.header.clone(), view.region.to_vec()));
    }

    // Same content regardless of header layout
    assert_eq!(headers[0], headers[1]);
    assert_eq!(headers[0], headers[2]);
}

#[test]
fn test_prettified_header_is_indented() {
    let report = rich_project().export(ExportConfig::default().with_json_format(JsonFormat::Prettify));
    let view = read_container(&report.bytes).unwrap();
    let text = std::str::from_utf8(view.raw_header).unwrap();
    assert!(text.starts_with("{\n  \""));
}

#[test]
fn test_recompressed_sheets_keep_layout() {
    let project = rich_project();
    let plain = project.export(ExportConfig::default());
    let packed = project.export(ExportConfig::default().with_recompress_images(true));

    let plain_view = read_container(&plain.bytes).unwrap();
    let packed_view = read_container(&packed.bytes).unwrap();
    assert_eq!(
        plain_view.header["spritesheets"][0]["frames"],
        packed_view.header["spritesheets"][0]["frames"]
    );
    assert_eq!(plain_view.header["entities"], packed_view.header["entities"]);
}

#[test]
fn test_truncated_container_is_rejected() {
    let report = rich_project().export(ExportConfig::default());
    let cut = &report.bytes[..10];
    assert!(matches!(
        read_container(cut),
        Err(ContainerError::Truncated { .. })
    ));
    assert!(matches!(
        read_container(&report.bytes[..2]),
        Err(ContainerError::Truncated { expected: 4, actual: 2 })
    ));
}
