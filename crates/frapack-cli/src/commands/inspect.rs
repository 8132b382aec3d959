//! Inspect command implementation
//!
//! Prints the layout of a `.fra` resource container.

use anyhow::{Context, Result};
use colored::Colorize;
use frapack_export::{read_container, ContainerView};
use serde_json::Value;
use std::fs;
use std::process::ExitCode;

/// Header sections, in the order they are printed.
const SECTIONS: &[&str] = &[
    "spritesheets",
    "images",
    "audio",
    "binary",
    "scripts",
    "entities",
    "nineSlices",
];

/// Sections whose records point into the binary region.
const PAYLOAD_SECTIONS: &[&str] = &["spritesheets", "images", "audio", "binary"];

/// Run the inspect command
///
/// # Arguments
/// * `file` - Path to the container
/// * `show_header` - Also print the decoded header JSON
///
/// # Returns
/// Exit code: 0 if every payload lies inside the binary region, 1 otherwise
pub fn run(file: &str, show_header: bool) -> Result<ExitCode> {
    let bytes = fs::read(file).with_context(|| format!("Failed to read container: {}", file))?;
    let view =
        read_container(&bytes).with_context(|| format!("Failed to parse container: {}", file))?;

    println!("{} {}", "Inspecting:".cyan().bold(), file);
    println!(
        "  {} {} bytes{}",
        "header:".dimmed(),
        view.raw_header.len(),
        if view.base64 { " (base64)" } else { "" }
    );
    if let Some(version) = view.header.get("version").and_then(Value::as_str) {
        println!("  {} {}", "version:".dimmed(), version);
    }
    for section in SECTIONS {
        println!("  {} {}", format!("{}:", section).dimmed(), section_len(&view.header, section));
    }
    println!("  {} {} bytes", "region:".dimmed(), view.region.len());

    if show_header {
        println!("{}", serde_json::to_string_pretty(&view.header)?);
    }

    let broken = out_of_range(&view);
    if broken.is_empty() {
        println!("{}", "All payloads in range".green());
        Ok(ExitCode::SUCCESS)
    } else {
        for (section, id) in &broken {
            println!("  {} {} '{}' points outside the region", "error:".red(), section, id);
        }
        Ok(ExitCode::from(1))
    }
}

fn section_len(header: &Value, section: &str) -> usize {
    header
        .get(section)
        .and_then(Value::as_array)
        .map_or(0, Vec::len)
}

/// `(section, id)` of every record whose payload is not inside the region.
fn out_of_range(view: &ContainerView<'_>) -> Vec<(&'static str, String)> {
    let mut broken = Vec::new();
    for &section in PAYLOAD_SECTIONS {
        let Some(records) = view.header.get(section).and_then(Value::as_array) else {
            continue;
        };
        for record in records {
            let offset = record.get("bytesOffset").and_then(Value::as_u64);
            let length = record.get("bytesLength").and_then(Value::as_u64);
            let in_range = match (offset, length) {
                (Some(offset), Some(length)) => view.payload(offset, length).is_some(),
                _ => false,
            };
            if !in_range {
                let id = record
                    .get("id")
                    .and_then(Value::as_str)
                    .unwrap_or("?")
                    .to_string();
                broken.push((section, id));
            }
        }
    }
    broken
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn container(header: &Value, region: &[u8]) -> Vec<u8> {
        let text = header.to_string();
        let mut bytes = (text.len() as u32).to_be_bytes().to_vec();
        bytes.extend_from_slice(text.as_bytes());
        bytes.extend_from_slice(region);
        bytes
    }

    #[test]
    fn test_out_of_range_detects_bad_record() {
        let header = json!({
            "images": [
                {"id": "ok", "bytesOffset": 0, "bytesLength": 2},
                {"id": "bad", "bytesOffset": 2, "bytesLength": 5}
            ]
        });
        let bytes = container(&header, &[1, 2, 3]);
        let view = read_container(&bytes).unwrap();
        assert_eq!(out_of_range(&view), vec![("images", "bad".to_string())]);
    }

    #[test]
    fn test_section_len_missing_section() {
        let header = json!({"audio": [{}, {}]});
        assert_eq!(section_len(&header, "audio"), 2);
        assert_eq!(section_len(&header, "binary"), 0);
    }

    #[test]
    fn test_run_on_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty.fra");
        let header = json!({"version": "0.0.17", "binary": [{"id": "b", "bytesOffset": 0, "bytesLength": 1}]});
        fs::write(&path, container(&header, &[0])).unwrap();
        run(path.to_str().unwrap(), true).unwrap();
    }
}
