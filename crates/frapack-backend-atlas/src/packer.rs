//! Texture atlas packer.
//!
//! Images are trimmed to their visible bounds, deduplicated by pixel content,
//! and written left to right into rows of a growable sheet. Sheets belong to
//! a named spritesheet group; groups never share sheets.
//!
//! Placement is order-dependent: the same images placed in the same order
//! always produce the same sheets.

use std::collections::HashMap;
use std::sync::Arc;

use frapack_model::{ExportWarning, WarningCode};
use tracing::{debug, warn};

use crate::pixel::{PixelBuffer, Rect};

/// Sheet sizing and spacing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PackerConfig {
    /// Width of a freshly opened sheet. Must be a power of two.
    pub default_width: u32,
    /// Height of a freshly opened sheet. Must be a power of two.
    pub default_height: u32,
    /// Largest sheet width. Must be a power of two.
    pub max_width: u32,
    /// Largest sheet height. Must be a power of two.
    pub max_height: u32,
    /// Gap between neighbouring frames, in pixels.
    pub padding: u32,
}

impl Default for PackerConfig {
    fn default() -> Self {
        Self {
            default_width: 128,
            default_height: 128,
            max_width: 4096,
            max_height: 4096,
            padding: 1,
        }
    }
}

/// Top-left of the trimmed region within the untrimmed source image.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct TrimOffset {
    pub x: u32,
    pub y: u32,
}

/// Where an image ended up in the atlas.
#[derive(Debug, Clone, PartialEq)]
pub struct SpriteFrame {
    /// Sheet index within the frame's spritesheet group.
    pub sheet_index: u32,
    /// Frame index within the sheet.
    pub frame_index: u32,
    /// Placement rectangle in sheet pixel space.
    pub frame_rect: Rect,
    /// Offset of the trimmed region in the source image.
    pub trim_offset: TrimOffset,
    /// Trimmed pixels, shared between deduplicated frames.
    pub pixels: Arc<PixelBuffer>,
}

/// The write state of one sheet.
///
/// Only the newest sheet of a group accepts frames. Older ones are frozen
/// and wait for encoding.
#[derive(Debug, Clone)]
pub struct SheetWriteState {
    group: String,
    group_sheet_index: u32,
    pixels: PixelBuffer,
    cursor_x: u32,
    cursor_y: u32,
    max_y: u32,
    frame_index: u32,
    rects: Vec<Rect>,
}

impl SheetWriteState {
    fn new(group: &str, group_sheet_index: u32, config: &PackerConfig) -> Self {
        Self {
            group: group.to_string(),
            group_sheet_index,
            pixels: PixelBuffer::new(config.default_width, config.default_height),
            cursor_x: 0,
            cursor_y: 0,
            max_y: 0,
            frame_index: 0,
            rects: Vec::new(),
        }
    }

    /// Spritesheet group this sheet belongs to.
    pub fn group(&self) -> &str {
        &self.group
    }

    /// Index of this sheet within its group.
    pub fn sheet_index(&self) -> u32 {
        self.group_sheet_index
    }

    pub fn pixels(&self) -> &PixelBuffer {
        &self.pixels
    }

    /// Placement rectangles, in frame index order.
    pub fn rects(&self) -> &[Rect] {
        &self.rects
    }

    /// Flat `[x, y, w, h, ...]` list of the placement rectangles.
    pub fn frame_data(&self) -> Vec<u32> {
        self.rects
            .iter()
            .flat_map(|r| [r.x, r.y, r.width, r.height])
            .collect()
    }

    fn fits(&self, width: u32, height: u32) -> bool {
        self.cursor_x + width <= self.pixels.width()
            && self.cursor_y + height <= self.pixels.height()
    }

    /// Double each overflowing axis independently while it stays within the
    /// maximum.
    fn grow_to_fit(&mut self, width: u32, height: u32, config: &PackerConfig) {
        let mut new_width = self.pixels.width();
        let mut new_height = self.pixels.height();
        while self.cursor_x + width > new_width && new_width * 2 <= config.max_width {
            new_width *= 2;
        }
        while self.cursor_y + height > new_height && new_height * 2 <= config.max_height {
            new_height *= 2;
        }
        if new_width != self.pixels.width() || new_height != self.pixels.height() {
            debug!(
                group = %self.group,
                sheet = self.group_sheet_index,
                "growing sheet {}x{} -> {}x{}",
                self.pixels.width(),
                self.pixels.height(),
                new_width,
                new_height
            );
            self.pixels = self.pixels.enlarged(new_width, new_height);
        }
    }
}

/// Deduplicating, trimming atlas packer.
///
/// One packer serves one export. Its caches are dropped with it.
#[derive(Debug, Default)]
pub struct AtlasPacker {
    config: PackerConfig,
    /// group -> asset guid -> placed frame
    frames: HashMap<String, HashMap<String, SpriteFrame>>,
    /// group -> (width, height) -> frames with distinct pixels
    by_size: HashMap<String, HashMap<(u32, u32), Vec<SpriteFrame>>>,
    /// group -> index of its open sheet in `sheets`
    active: HashMap<String, usize>,
    sheets: Vec<SheetWriteState>,
    warnings: Vec<ExportWarning>,
}

impl AtlasPacker {
    pub fn new(config: PackerConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    pub fn config(&self) -> &PackerConfig {
        &self.config
    }

    /// Returns the frame previously placed for an asset in a group.
    pub fn frame(&self, group: &str, guid: &str) -> Option<&SpriteFrame> {
        self.frames.get(group).and_then(|frames| frames.get(guid))
    }

    /// Place an image and return its frame.
    ///
    /// Placing the same guid twice in a group returns the cached frame.
    /// An image whose trimmed pixels equal an already placed image of the
    /// same size reuses that placement and keeps its own trim offset.
    ///
    /// # Arguments
    /// * `guid` - Identity of the source asset
    /// * `filename` - Source name, used in diagnostics only
    /// * `source` - Decoded source pixels
    /// * `group` - Spritesheet group
    pub fn place_image(
        &mut self,
        guid: &str,
        filename: &str,
        source: &PixelBuffer,
        group: &str,
    ) -> SpriteFrame {
        if let Some(frame) = self.frame(group, guid) {
            debug!(filename, group, "reusing placed image");
            return frame.clone();
        }

        let trim = self.trim_rect(filename, source);
        let trimmed = source.crop(trim);
        let trim_offset = TrimOffset {
            x: trim.x,
            y: trim.y,
        };

        let frame = match self.find_duplicate(group, &trimmed) {
            Some(existing) => {
                debug!(filename, group, "deduplicated by pixel content");
                SpriteFrame {
                    trim_offset,
                    ..existing
                }
            }
            None => {
                let frame = self.write_to_sheet(group, trimmed, trim_offset);
                self.by_size
                    .entry(group.to_string())
                    .or_default()
                    .entry((frame.frame_rect.width, frame.frame_rect.height))
                    .or_default()
                    .push(frame.clone());
                frame
            }
        };

        self.frames
            .entry(group.to_string())
            .or_default()
            .insert(guid.to_string(), frame.clone());
        frame
    }

    /// Visible bounds of the source, at least 1x1, clamped to the maximum
    /// sheet size.
    fn trim_rect(&mut self, filename: &str, source: &PixelBuffer) -> Rect {
        let mut rect = source
            .visible_bounds()
            .unwrap_or_else(|| Rect::new(0, 0, 1, 1));

        if rect.width > self.config.max_width {
            let message = format!(
                "image '{}' width {} exceeds maximum sheet width {}",
                filename, rect.width, self.config.max_width
            );
            warn!("{}", message);
            self.warnings
                .push(ExportWarning::new(WarningCode::OversizedAsset, message));
            rect.width = self.config.max_width;
        }
        if rect.height > self.config.max_height {
            let message = format!(
                "image '{}' height {} exceeds maximum sheet height {}",
                filename, rect.height, self.config.max_height
            );
            warn!("{}", message);
            self.warnings
                .push(ExportWarning::new(WarningCode::OversizedAsset, message));
            rect.height = self.config.max_height;
        }
        rect
    }

    fn find_duplicate(&self, group: &str, trimmed: &PixelBuffer) -> Option<SpriteFrame> {
        self.by_size
            .get(group)?
            .get(&(trimmed.width(), trimmed.height()))?
            .iter()
            .find(|frame| *frame.pixels == *trimmed)
            .cloned()
    }

    fn open_sheet(&mut self, group: &str) -> usize {
        let next_index = match self.active.get(group) {
            Some(&i) => self.sheets[i].group_sheet_index + 1,
            None => 0,
        };
        debug!(group, sheet = next_index, "opening sheet");
        self.sheets
            .push(SheetWriteState::new(group, next_index, &self.config));
        let index = self.sheets.len() - 1;
        self.active.insert(group.to_string(), index);
        index
    }

    fn write_to_sheet(
        &mut self,
        group: &str,
        trimmed: PixelBuffer,
        trim_offset: TrimOffset,
    ) -> SpriteFrame {
        let config = self.config;
        let (width, height) = (trimmed.width(), trimmed.height());

        let mut index = match self.active.get(group) {
            Some(&i) => i,
            None => self.open_sheet(group),
        };

        {
            let sheet = &mut self.sheets[index];
            if sheet.cursor_x + width > config.max_width {
                sheet.cursor_x = 0;
                sheet.cursor_y = sheet.max_y + config.padding;
            }
            sheet.grow_to_fit(width, height, &config);
        }

        if !self.sheets[index].fits(width, height) {
            index = self.open_sheet(group);
            self.sheets[index].grow_to_fit(width, height, &config);
        }

        let sheet = &mut self.sheets[index];
        let rect = Rect::new(sheet.cursor_x, sheet.cursor_y, width, height);
        sheet.pixels.blit(&trimmed, rect.x, rect.y);
        sheet.rects.push(rect);
        sheet.max_y = sheet.max_y.max(rect.bottom());
        sheet.cursor_x += width + config.padding;

        let frame = SpriteFrame {
            sheet_index: sheet.group_sheet_index,
            frame_index: sheet.frame_index,
            frame_rect: rect,
            trim_offset,
            pixels: Arc::new(trimmed),
        };
        sheet.frame_index += 1;
        frame
    }

    /// Sheets in creation order across all groups.
    pub fn sheets(&self) -> &[SheetWriteState] {
        &self.sheets
    }

    /// Drain warnings recorded since the last call.
    pub fn take_warnings(&mut self) -> Vec<ExportWarning> {
        std::mem::take(&mut self.warnings)
    }

    /// Consume the packer, releasing all caches, and return its sheets.
    pub fn into_sheets(self) -> Vec<SheetWriteState> {
        self.sheets
    }
}
