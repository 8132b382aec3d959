//! Export command implementation
//!
//! Loads a project document, exports it and writes `<resourceId>.fra`.

use anyhow::{Context, Result};
use colored::Colorize;
use frapack_export::{export, ExportOptions};
use frapack_model::{ExportConfig, JsonFormat, ResourceManifest};
use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Instant;
use tracing::debug;

use crate::decode::ImageDecoder;
use crate::input::{load_config, load_project, LoadedProject};

/// Arguments of one export run.
#[derive(Debug, Clone, Default)]
pub struct ExportArgs {
    /// Path to the project document.
    pub project: String,
    /// Output directory; the document's directory when absent.
    pub out_dir: Option<String>,
    /// Optional export configuration file.
    pub config: Option<String>,
    /// Header format override.
    pub json_format: Option<JsonFormat>,
    /// Force sheet recompression on.
    pub recompress_images: bool,
}

/// Run the export command
///
/// # Returns
/// Exit code: 0 on success (warnings included)
pub fn run(args: &ExportArgs) -> Result<ExitCode> {
    let start = Instant::now();
    let project_path = Path::new(&args.project);

    println!("{} {}", "Exporting:".cyan().bold(), args.project);

    let LoadedProject {
        project,
        library,
        base_dir,
    } = load_project(project_path)?;

    let manifest = ResourceManifest::from_project(&project)
        .with_context(|| format!("Problem reading manifest of {}", args.project))?;

    let config = resolve_config(args)?;
    println!(
        "{} {} (header: {}{})",
        "Resource:".dimmed(),
        manifest.resource_id,
        config.json_format,
        if config.recompress_images {
            ", recompressed sheets"
        } else {
            ""
        }
    );

    let options = ExportOptions::new(config);
    let report = export(
        &project,
        &library,
        Arc::new(ImageDecoder),
        &options,
        |percent| debug!("Export progress: {}%", percent),
    )
    .context("Export failed")?;

    for warning in &report.warnings {
        println!("  {} {}", "warning:".yellow(), warning);
    }

    let out_dir = args
        .out_dir
        .as_ref()
        .map(PathBuf::from)
        .unwrap_or(base_dir);
    fs::create_dir_all(&out_dir)
        .with_context(|| format!("Failed to create output directory: {}", out_dir.display()))?;
    let out_path = out_dir.join(manifest.output_filename());
    fs::write(&out_path, &report.bytes)
        .with_context(|| format!("Failed to write {}", out_path.display()))?;

    let hash = blake3::hash(&report.bytes);
    println!("{} {}", "Wrote:".green().bold(), out_path.display());
    println!("  {} {}", "blake3:".dimmed(), hash.to_hex());
    println!("  {} {} bytes", "size:".dimmed(), report.bytes.len());
    println!(
        "  {} {} entit{}, {} spritesheet{}",
        "contents:".dimmed(),
        report.entities,
        if report.entities == 1 { "y" } else { "ies" },
        report.spritesheets,
        if report.spritesheets == 1 { "" } else { "s" }
    );

    let summary = format!("{} warning(s)", report.warnings.len());
    println!(
        "{} in {:.2?}, {}",
        "Done".green().bold(),
        start.elapsed(),
        if report.has_warnings() {
            summary.yellow()
        } else {
            summary.normal()
        }
    );

    Ok(ExitCode::SUCCESS)
}

/// Config file values, then command-line overrides.
fn resolve_config(args: &ExportArgs) -> Result<ExportConfig> {
    let mut config = match &args.config {
        Some(path) => load_config(Path::new(path))?,
        None => ExportConfig::default(),
    };
    if let Some(format) = args.json_format {
        config = config.with_json_format(format);
    }
    if args.recompress_images {
        config = config.with_recompress_images(true);
    }
    Ok(config)
}
