//! Configuration for bundle assembly.
//!
//! This module collects everything the caller decides up front: the ordered
//! sections, the caption metadata rendered at the top of the index, the
//! page-number stamp settings, the watermark flag, and the volume page cap.
//! It also hoists every fixed layout dimension into a single [`LayoutConfig`]
//! value so the index layout, the renderer, and the annotator all read the
//! same numbers.

use anyhow::{Result, bail};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::section::Section;

/// Default page cap for volume splitting.
pub const DEFAULT_VOLUME_PAGE_CAP: usize = 350;

/// Position of the running page-number stamp on each content page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PageNumberPosition {
    /// Top-left corner.
    TopLeft,
    /// Top edge, horizontally centered.
    TopCenter,
    /// Top-right corner.
    TopRight,
    /// Bottom-left corner.
    BottomLeft,
    /// Bottom edge, horizontally centered (default).
    #[default]
    BottomCenter,
    /// Bottom-right corner.
    BottomRight,
}

impl PageNumberPosition {
    /// Whether the stamp sits at the top edge of the page.
    pub fn is_top(&self) -> bool {
        matches!(self, Self::TopLeft | Self::TopCenter | Self::TopRight)
    }
}

impl FromStr for PageNumberPosition {
    type Err = crate::BundleError;

    /// Parse a stamp position from string.
    ///
    /// # Arguments
    ///
    /// * `s` - One of "top-left", "top-center", "top-right", "bottom-left",
    ///   "bottom-center", "bottom-right"
    ///
    /// # Errors
    ///
    /// Returns an error if the string doesn't match a valid position.
    fn from_str(s: &str) -> crate::Result<Self> {
        match s.to_lowercase().as_str() {
            "top-left" => Ok(Self::TopLeft),
            "top-center" => Ok(Self::TopCenter),
            "top-right" => Ok(Self::TopRight),
            "bottom-left" => Ok(Self::BottomLeft),
            "bottom-center" => Ok(Self::BottomCenter),
            "bottom-right" => Ok(Self::BottomRight),
            _ => Err(crate::BundleError::invalid_config(format!(
                "Invalid page number position: {s}. Must be one of: top-left, top-center, \
                 top-right, bottom-left, bottom-center, bottom-right"
            ))),
        }
    }
}

/// Settings for the running page-number stamps.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageNumberSettings {
    /// Where on the page the label is drawn.
    pub position: PageNumberPosition,

    /// Font size of the stamp in points.
    pub font_size: f32,

    /// Draw the stamp in bold.
    pub bold: bool,
}

impl Default for PageNumberSettings {
    fn default() -> Self {
        Self {
            position: PageNumberPosition::BottomCenter,
            font_size: 10.0,
            bold: false,
        }
    }
}

/// Caption metadata rendered in the index header block.
///
/// Consumed only by the index renderer; none of these fields affect
/// pagination of the content pages.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BundleMetadata {
    /// Case caption (e.g. "Smith v. Jones").
    pub case_caption: String,

    /// Court name.
    pub court: Option<String>,

    /// Hearing or filing date, preformatted by the caller.
    pub date: Option<String>,

    /// Party descriptions, one line each.
    pub parties: Vec<String>,
}

/// Fixed layout dimensions, in PDF points.
///
/// Every magic number in index layout, stamping, and watermarking lives
/// here. The index layout pass and the annotator both read this value, so
/// the link rectangles land exactly on the rendered rows.
#[derive(Debug, Clone, PartialEq)]
pub struct LayoutConfig {
    /// Page width of generated pages (A4).
    pub page_width: f32,
    /// Page height of generated pages (A4).
    pub page_height: f32,
    /// Left page margin.
    pub margin_left: f32,
    /// Right page margin.
    pub margin_right: f32,
    /// Top page margin.
    pub margin_top: f32,
    /// Bottom page margin; the vertical cursor never crosses it.
    pub margin_bottom: f32,
    /// Vertical step consumed by a section-header row.
    pub section_row_step: f32,
    /// Vertical step consumed by a document row.
    pub document_row_step: f32,
    /// Vertical step for each caption line in the first-page header.
    pub caption_line_step: f32,
    /// Gap between the caption block and the index title.
    pub caption_gap: f32,
    /// Gap between the column-header row and the first table row.
    pub table_header_gap: f32,
    /// Font size for index rows.
    pub row_font_size: f32,
    /// Font size for the caption block.
    pub caption_font_size: f32,
    /// Extra left indent applied to document rows.
    pub row_indent: f32,
    /// Width reserved for the date column.
    pub date_column_width: f32,
    /// Width reserved for the right-aligned page-label column.
    pub label_column_width: f32,
    /// Horizontal gap kept between a truncated title and the date column.
    pub column_gap: f32,
    /// Font size for generated divider pages.
    pub divider_font_size: f32,
    /// Distance of page-number stamps from the page edges.
    pub stamp_margin: f32,
    /// Font size of the diagonal watermark caption.
    pub watermark_font_size: f32,
    /// Watermark opacity (0 transparent, 1 opaque).
    pub watermark_alpha: f32,
    /// Watermark rotation, counter-clockwise degrees.
    pub watermark_angle_degrees: f32,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            page_width: 595.28,
            page_height: 841.89,
            margin_left: 54.0,
            margin_right: 54.0,
            margin_top: 54.0,
            margin_bottom: 54.0,
            section_row_step: 26.0,
            document_row_step: 18.0,
            caption_line_step: 16.0,
            caption_gap: 10.0,
            table_header_gap: 6.0,
            row_font_size: 10.5,
            caption_font_size: 13.0,
            row_indent: 18.0,
            date_column_width: 72.0,
            label_column_width: 86.0,
            column_gap: 8.0,
            divider_font_size: 28.0,
            stamp_margin: 28.0,
            watermark_font_size: 52.0,
            watermark_alpha: 0.18,
            watermark_angle_degrees: 45.0,
        }
    }
}

impl LayoutConfig {
    /// Usable width between the left and right margins.
    pub fn text_width(&self) -> f32 {
        self.page_width - self.margin_left - self.margin_right
    }
}

/// Complete configuration for one bundle assembly run.
#[derive(Debug, Clone)]
pub struct BundleConfig {
    /// Identifier used in volume manifests and archive entries.
    pub case_id: String,

    /// Ordered sections of the bundle.
    pub sections: Vec<Section>,

    /// Caption metadata for the index header.
    pub metadata: BundleMetadata,

    /// Page-number stamp settings.
    pub page_numbers: PageNumberSettings,

    /// Stamp a preview watermark on every page.
    pub watermark: bool,

    /// Maximum pages per volume before the bundle is split.
    pub volume_page_cap: usize,

    /// Number of parallel workers for source resolution (None = auto).
    pub workers: Option<usize>,

    /// Layout dimensions; `LayoutConfig::default()` is the canonical layout.
    pub layout: LayoutConfig,
}

impl BundleConfig {
    /// Create a configuration with default settings for the given sections.
    pub fn new(case_id: impl Into<String>, sections: Vec<Section>) -> Self {
        Self {
            case_id: case_id.into(),
            sections,
            metadata: BundleMetadata::default(),
            page_numbers: PageNumberSettings::default(),
            watermark: false,
            volume_page_cap: DEFAULT_VOLUME_PAGE_CAP,
            workers: None,
            layout: LayoutConfig::default(),
        }
    }

    /// Validate the configuration.
    ///
    /// Label-prefix uniqueness across sections is the caller's
    /// responsibility and is deliberately not checked here.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The volume page cap is zero
    /// - The stamp font size is outside a sensible range
    /// - A section has an empty prefix or a zero start number
    /// - The worker count is zero
    pub fn validate(&self) -> Result<()> {
        if self.volume_page_cap == 0 {
            bail!("Volume page cap must be at least 1");
        }

        if !(4.0..=36.0).contains(&self.page_numbers.font_size) {
            bail!(
                "Page number font size {} out of range (4-36)",
                self.page_numbers.font_size
            );
        }

        if let Some(workers) = self.workers
            && workers == 0
        {
            bail!("Number of workers must be at least 1");
        }

        for section in &self.sections {
            if section.prefix.is_empty() {
                bail!("Section '{}' has an empty label prefix", section.name);
            }
            if section.start_number == 0 {
                bail!(
                    "Section '{}' has start number 0; page numbering starts at 1",
                    section.name
                );
            }
        }

        Ok(())
    }

    /// Get the effective number of parallel resolution workers.
    pub fn effective_workers(&self) -> usize {
        self.workers.unwrap_or_else(|| {
            std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(1)
        })
    }
}
