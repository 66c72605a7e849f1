//! The index layout model.
//!
//! [`IndexLayout::compute`] is the only vertical-cursor implementation in
//! the crate. It walks the entries top to bottom, stepping the cursor by the
//! section-header or document-row height, breaking to a new page whenever
//! the next row would cross the bottom margin. The first page reserves room
//! for the full caption block; continuation pages reserve room for the
//! redrawn table header only.
//!
//! The computed page count is also the measurement the two-phase resolution
//! needs: the index's size depends only on the entries' text, never on
//! their link targets, so the layout stays valid after the target shift.

use crate::config::{BundleMetadata, LayoutConfig};
use crate::plan::IndexEntry;

/// Vertical padding added around a row's baseline to form its link
/// rectangle.
const ROW_RECT_PADDING: f32 = 2.0;

/// Placement of a single index row.
#[derive(Debug, Clone, PartialEq)]
pub struct RowPlacement {
    /// Index of the entry this row renders.
    pub entry: usize,

    /// 0-based index page the row lands on.
    pub page: usize,

    /// Baseline y coordinate of the row text.
    pub baseline: f32,

    /// Link rectangle `[x1, y1, x2, y2]` spanning the full text width.
    pub rect: [f32; 4],
}

/// The complete layout of the index: every row placed, page count known.
#[derive(Debug, Clone, PartialEq)]
pub struct IndexLayout {
    /// Row placements in entry order.
    pub rows: Vec<RowPlacement>,

    /// Number of index pages the layout occupies (at least 1).
    pub page_count: usize,
}

impl IndexLayout {
    /// Lay out the given entries.
    pub fn compute(
        entries: &[IndexEntry],
        metadata: &BundleMetadata,
        cfg: &LayoutConfig,
    ) -> Self {
        let mut rows = Vec::with_capacity(entries.len());
        let mut page = 0usize;
        let mut y = cfg.page_height - cfg.margin_top - first_header_height(metadata, cfg);

        for (i, entry) in entries.iter().enumerate() {
            let step = if entry.is_section_header {
                cfg.section_row_step
            } else {
                cfg.document_row_step
            };

            if y - step < cfg.margin_bottom {
                page += 1;
                y = cfg.page_height - cfg.margin_top - continuation_header_height(cfg);
            }

            y -= step;
            rows.push(RowPlacement {
                entry: i,
                page,
                baseline: y,
                rect: [
                    cfg.margin_left,
                    y - ROW_RECT_PADDING,
                    cfg.page_width - cfg.margin_right,
                    y + cfg.row_font_size + ROW_RECT_PADDING,
                ],
            });
        }

        Self {
            rows,
            page_count: page + 1,
        }
    }

    /// Rows placed on the given index page.
    pub fn rows_on_page(&self, page: usize) -> impl Iterator<Item = &RowPlacement> {
        self.rows.iter().filter(move |r| r.page == page)
    }
}

/// Height of the first-page header block: caption lines, gap, index title,
/// and the column-header row.
pub fn first_header_height(metadata: &BundleMetadata, cfg: &LayoutConfig) -> f32 {
    let mut caption_lines = 1; // case caption
    if metadata.court.is_some() {
        caption_lines += 1;
    }
    if metadata.date.is_some() {
        caption_lines += 1;
    }
    caption_lines += metadata.parties.len();

    caption_lines as f32 * cfg.caption_line_step
        + cfg.caption_gap
        + cfg.section_row_step // "INDEX" title
        + cfg.section_row_step // column headers
        + cfg.table_header_gap
}

/// Height of the redrawn table header on continuation pages.
pub fn continuation_header_height(cfg: &LayoutConfig) -> f32 {
    cfg.section_row_step + cfg.table_header_gap
}
