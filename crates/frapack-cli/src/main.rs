//! frapack CLI - Command-line interface for resource container export
//!
//! This binary exports project documents to `.fra` containers and inspects
//! existing containers.

use clap::{Parser, Subcommand, ValueEnum};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

// Use modules from the library crate
use frapack_cli::commands;
use frapack_cli::commands::export::ExportArgs;
use frapack_model::JsonFormat;

/// frapack - Sprite and media resource packer
#[derive(Parser)]
#[command(name = "frapack")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Enable debug logging (RUST_LOG overrides)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Header layout written into the container.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum HeaderFormat {
    Raw,
    Base64,
    Prettify,
}

impl From<HeaderFormat> for JsonFormat {
    fn from(format: HeaderFormat) -> Self {
        match format {
            HeaderFormat::Raw => JsonFormat::Raw,
            HeaderFormat::Base64 => JsonFormat::Base64,
            HeaderFormat::Prettify => JsonFormat::Prettify,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Export a project document to a .fra resource container
    Export {
        /// Path to the project document (JSON)
        #[arg(short, long)]
        project: String,

        /// Output directory (default: the project document's directory)
        #[arg(short, long)]
        out_dir: Option<String>,

        /// Export configuration file (JSON)
        #[arg(short, long)]
        config: Option<String>,

        /// Header format, overriding the config file
        #[arg(long, value_enum)]
        json_format: Option<HeaderFormat>,

        /// Re-encode spritesheet PNGs with maximum compression
        #[arg(long)]
        recompress_images: bool,
    },

    /// Print the layout of a .fra resource container
    Inspect {
        /// Path to the container
        file: String,

        /// Also print the decoded header JSON
        #[arg(long)]
        header: bool,
    },
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match cli.command {
        Commands::Export {
            project,
            out_dir,
            config,
            json_format,
            recompress_images,
        } => commands::export::run(&ExportArgs {
            project,
            out_dir,
            config,
            json_format: json_format.map(JsonFormat::from),
            recompress_images,
        }),
        Commands::Inspect { file, header } => commands::inspect::run(&file, header),
    };

    match result {
        Ok(code) => code,
        Err(e) => {
            eprintln!("{}: {:#}", colored::Colorize::red("error"), e);
            ExitCode::from(1)
        }
    }
}
