//! Media sources and concurrent image decoding.
//!
//! The host supplies raw asset bytes keyed by guid. Images are decoded once,
//! all at the same time, before flattening starts. Each decode runs on a
//! blocking worker thread under a timeout; a decode that fails or never
//! finishes is logged and the asset is treated as missing.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use frapack_backend_atlas::PixelBuffer;
use frapack_model::{ExportWarning, Project, WarningCode};
use futures_util::stream::{FuturesUnordered, StreamExt};
use tokio::time::timeout;
use tracing::{debug, info, warn};

use crate::error::ExportError;
use crate::progress::{Phase, ProgressReporter};

/// Guid of the image substituted for missing image assets.
pub const PLACEHOLDER_GUID: &str = "__placeholder__";

/// File name reported for the placeholder image.
pub const PLACEHOLDER_FILENAME: &str = "placeholder.png";

/// Default per-asset decode timeout.
pub const DEFAULT_DECODE_TIMEOUT: Duration = Duration::from_millis(5000);

/// The 100x100 opaque deep pink image used in place of missing images.
pub fn placeholder_image() -> PixelBuffer {
    PixelBuffer::filled(100, 100, [0xff, 0x14, 0x93, 0xff])
}

/// Decodes encoded image bytes into pixels.
pub trait MediaDecoder: Send + Sync {
    /// Decode `bytes`. `filename` is for diagnostics and format sniffing.
    fn decode(&self, filename: &str, bytes: &[u8]) -> Result<PixelBuffer, String>;
}

impl<F> MediaDecoder for F
where
    F: Fn(&str, &[u8]) -> Result<PixelBuffer, String> + Send + Sync,
{
    fn decode(&self, filename: &str, bytes: &[u8]) -> Result<PixelBuffer, String> {
        self(filename, bytes)
    }
}

/// Media loading options.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MediaOptions {
    /// Upper bound on one image decode.
    pub decode_timeout: Duration,
}

impl Default for MediaOptions {
    fn default() -> Self {
        Self {
            decode_timeout: DEFAULT_DECODE_TIMEOUT,
        }
    }
}

/// Raw bytes of one asset.
#[derive(Debug, Clone)]
pub struct MediaSource {
    pub filename: String,
    pub bytes: Arc<[u8]>,
}

/// Raw asset bytes and decoded images, keyed by asset guid.
#[derive(Debug, Clone, Default)]
pub struct MediaLibrary {
    sources: HashMap<String, MediaSource>,
    images: HashMap<String, Arc<PixelBuffer>>,
}

impl MediaLibrary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the raw bytes of an asset.
    ///
    /// Pixels previously decoded for the same guid are discarded.
    pub fn insert_source(
        &mut self,
        guid: impl Into<String>,
        filename: impl Into<String>,
        bytes: impl Into<Arc<[u8]>>,
    ) {
        let guid = guid.into();
        self.images.remove(&guid);
        self.sources.insert(
            guid,
            MediaSource {
                filename: filename.into(),
                bytes: bytes.into(),
            },
        );
    }

    /// Register already decoded pixels of an image asset.
    pub fn insert_image(&mut self, guid: impl Into<String>, pixels: PixelBuffer) {
        self.images.insert(guid.into(), Arc::new(pixels));
    }

    pub fn source(&self, guid: &str) -> Option<&MediaSource> {
        self.sources.get(guid)
    }

    pub fn image(&self, guid: &str) -> Option<&Arc<PixelBuffer>> {
        self.images.get(guid)
    }

    /// File name of an asset, or its guid if no source was registered.
    pub fn filename<'a>(&'a self, guid: &'a str) -> &'a str {
        self.sources
            .get(guid)
            .map(|s| s.filename.as_str())
            .unwrap_or(guid)
    }
}

struct DecodeJob {
    /// Position in project order.
    order: usize,
    /// Whether the asset is exported and so counts toward progress.
    counted: bool,
    guid: String,
    filename: String,
    bytes: Arc<[u8]>,
}

enum DecodeOutcome {
    Decoded(PixelBuffer),
    Failed(String),
    TimedOut,
}

/// Decode every image asset of a project into the library.
///
/// Images that already have pixels are skipped. Every image is decoded, but
/// only exported images and exported audio count toward media progress.
///
/// # Returns
/// Warnings for decodes that failed or timed out, in project order.
pub fn decode_images(
    project: &Project,
    library: &mut MediaLibrary,
    decoder: Arc<dyn MediaDecoder>,
    options: &MediaOptions,
    progress: &mut ProgressReporter<'_>,
) -> Result<Vec<ExportWarning>, ExportError> {
    let jobs: Vec<DecodeJob> = project
        .image_assets
        .iter()
        .filter(|asset| library.image(&asset.header.guid).is_none())
        .filter_map(|asset| {
            let guid = &asset.header.guid;
            match library.source(guid) {
                Some(source) => Some((asset.header.is_exportable(), guid.clone(), source.clone())),
                None => {
                    debug!(guid = %guid, "image asset has no source bytes");
                    None
                }
            }
        })
        .enumerate()
        .map(|(order, (counted, guid, source))| DecodeJob {
            order,
            counted,
            guid,
            filename: source.filename,
            bytes: source.bytes,
        })
        .collect();

    let audio: Vec<&str> = project
        .audio_assets
        .iter()
        .filter(|asset| asset.header.is_exportable())
        .map(|asset| asset.header.guid.as_str())
        .collect();

    let total = jobs.iter().filter(|job| job.counted).count() + audio.len();
    let mut done = 0;
    info!("Decoding {} image(s)...", jobs.len());

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_time()
        .build()
        .map_err(|e| ExportError::Runtime(e.to_string()))?;

    let limit = options.decode_timeout;
    let mut outcomes: Vec<(DecodeJob, DecodeOutcome)> = runtime.block_on(async {
        let mut pending: FuturesUnordered<_> = jobs
            .into_iter()
            .map(|job| {
                let decoder = Arc::clone(&decoder);
                let name = job.filename.clone();
                let bytes = Arc::clone(&job.bytes);
                async move {
                    let task = tokio::task::spawn_blocking(move || decoder.decode(&name, &bytes));
                    let outcome = match timeout(limit, task).await {
                        Ok(Ok(Ok(pixels))) => DecodeOutcome::Decoded(pixels),
                        Ok(Ok(Err(message))) => DecodeOutcome::Failed(message),
                        Ok(Err(join_error)) => DecodeOutcome::Failed(join_error.to_string()),
                        Err(_) => DecodeOutcome::TimedOut,
                    };
                    (job, outcome)
                }
            })
            .collect();

        let mut finished = Vec::new();
        while let Some(result) = pending.next().await {
            if result.0.counted {
                done += 1;
                progress.report(Phase::Media, done, total);
            }
            finished.push(result);
        }
        finished
    });
    // Timed-out decodes may still be running; do not wait for them
    runtime.shutdown_background();

    outcomes.sort_by_key(|(job, _)| job.order);
    let mut warnings = Vec::new();
    for (job, outcome) in outcomes {
        let filename = job.filename;
        match outcome {
            DecodeOutcome::Decoded(pixels) => {
                debug!(filename = %filename, "decoded {}x{}", pixels.width(), pixels.height());
                library.insert_image(job.guid, pixels);
            }
            DecodeOutcome::Failed(message) => {
                let message = format!("Failed to process asset: {} ({})", filename, message);
                warn!("{}", message);
                warnings.push(ExportWarning::new(WarningCode::DecodeFailed, message));
            }
            DecodeOutcome::TimedOut => {
                let message = format!(
                    "Failed to process asset: {} (no result after {} ms)",
                    filename,
                    limit.as_millis()
                );
                warn!("{}", message);
                warnings.push(ExportWarning::new(WarningCode::DecodeTimeout, message));
            }
        }
    }

    for guid in audio {
        if library.source(guid).is_none() {
            debug!(guid, "audio asset has no source bytes");
        }
        done += 1;
        progress.report(Phase::Media, done, total);
    }
    if total == 0 {
        progress.report(Phase::Media, 0, 0);
    }

    Ok(warnings)
}
