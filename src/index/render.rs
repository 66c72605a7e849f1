//! Index page rendering.
//!
//! Draws the caption block, the column headers, and the table rows into a
//! standalone document of A4 pages. Row positions come from the precomputed
//! [`IndexLayout`]; the renderer never re-derives them. Links are not
//! attached here: at render time the target pages do not exist yet, so the
//! annotator adds them after assembly using the same layout value.

use lopdf::content::{Content, Operation};
use lopdf::{Document, Object, Stream, dictionary};

use crate::config::{BundleMetadata, LayoutConfig};
use crate::error::Result;
use crate::index::layout::IndexLayout;
use crate::plan::IndexEntry;
use crate::text::{text_width, truncate_to_width};

/// Resource name of the regular face on index pages.
const FONT_REGULAR: &str = "F1";
/// Resource name of the bold face on index pages.
const FONT_BOLD: &str = "F2";

/// Title drawn above the table.
const INDEX_TITLE: &str = "INDEX";

/// Renderer for the table-of-contents pages.
pub struct IndexRenderer;

impl IndexRenderer {
    /// Create a new renderer.
    pub fn new() -> Self {
        Self
    }

    /// Render the index into a standalone document.
    ///
    /// The produced document has exactly `layout.page_count` pages.
    ///
    /// # Errors
    ///
    /// Returns an error if a content stream cannot be encoded.
    pub fn render(
        &self,
        entries: &[IndexEntry],
        metadata: &BundleMetadata,
        layout: &IndexLayout,
        cfg: &LayoutConfig,
    ) -> Result<Document> {
        let mut doc = Document::with_version("1.7");
        let pages_id = doc.new_object_id();

        let regular_id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Helvetica",
        });
        let bold_id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Helvetica-Bold",
        });
        let resources_id = doc.add_object(dictionary! {
            "Font" => dictionary! {
                FONT_REGULAR => regular_id,
                FONT_BOLD => bold_id,
            },
        });

        let mut kids: Vec<Object> = Vec::new();
        for page in 0..layout.page_count {
            let mut ops: Vec<Operation> = Vec::new();

            if page == 0 {
                self.draw_caption_block(&mut ops, metadata, cfg);
            } else {
                let y = cfg.page_height - cfg.margin_top - cfg.section_row_step;
                self.draw_column_headers(&mut ops, cfg, y);
            }

            for row in layout.rows_on_page(page) {
                self.draw_row(&mut ops, &entries[row.entry], row.baseline, cfg);
            }

            let content = Content { operations: ops };
            let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode()?));
            let page_id = doc.add_object(dictionary! {
                "Type" => "Page",
                "Parent" => pages_id,
                "MediaBox" => media_box(cfg),
                "Contents" => content_id,
                "Resources" => resources_id,
            });
            kids.push(page_id.into());
        }

        let count = layout.page_count as i64;
        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => kids,
                "Count" => count,
            }),
        );
        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);

        Ok(doc)
    }

    /// Draw the first-page header: caption lines, the index title, and the
    /// column headers. Consumes exactly
    /// [`layout::first_header_height`](crate::index::layout::first_header_height).
    fn draw_caption_block(
        &self,
        ops: &mut Vec<Operation>,
        metadata: &BundleMetadata,
        cfg: &LayoutConfig,
    ) {
        let mut y = cfg.page_height - cfg.margin_top;

        y -= cfg.caption_line_step;
        self.draw_centered(ops, FONT_BOLD, cfg.caption_font_size, y, &metadata.case_caption, cfg);

        if let Some(ref court) = metadata.court {
            y -= cfg.caption_line_step;
            self.draw_centered(ops, FONT_REGULAR, cfg.caption_font_size, y, court, cfg);
        }
        if let Some(ref date) = metadata.date {
            y -= cfg.caption_line_step;
            self.draw_centered(ops, FONT_REGULAR, cfg.caption_font_size, y, date, cfg);
        }
        for party in &metadata.parties {
            y -= cfg.caption_line_step;
            self.draw_centered(ops, FONT_REGULAR, cfg.caption_font_size, y, party, cfg);
        }

        y -= cfg.caption_gap;

        y -= cfg.section_row_step;
        self.draw_centered(ops, FONT_BOLD, cfg.caption_font_size, y, INDEX_TITLE, cfg);

        y -= cfg.section_row_step;
        self.draw_column_headers(ops, cfg, y);
    }

    /// Draw the table column headers at the given baseline.
    fn draw_column_headers(&self, ops: &mut Vec<Operation>, cfg: &LayoutConfig, y: f32) {
        push_text(ops, FONT_BOLD, cfg.row_font_size, cfg.margin_left, y, "Document");
        push_text(ops, FONT_BOLD, cfg.row_font_size, date_column_x(cfg), y, "Date");

        let heading_width = text_width("Page", cfg.row_font_size);
        push_text(
            ops,
            FONT_BOLD,
            cfg.row_font_size,
            cfg.page_width - cfg.margin_right - heading_width,
            y,
            "Page",
        );
    }

    /// Draw one table row at its precomputed baseline.
    fn draw_row(&self, ops: &mut Vec<Operation>, entry: &IndexEntry, y: f32, cfg: &LayoutConfig) {
        let font = if entry.is_section_header {
            FONT_BOLD
        } else {
            FONT_REGULAR
        };

        let title_x = cfg.margin_left + if entry.indented { cfg.row_indent } else { 0.0 };
        let available = date_column_x(cfg) - cfg.column_gap - title_x;
        let title = truncate_to_width(&entry.title, available, cfg.row_font_size);
        push_text(ops, font, cfg.row_font_size, title_x, y, &title);

        if let Some(ref date) = entry.date {
            push_text(ops, FONT_REGULAR, cfg.row_font_size, date_column_x(cfg), y, date);
        }

        let range = entry.range_text();
        if !range.is_empty() {
            let w = text_width(&range, cfg.row_font_size);
            push_text(
                ops,
                font,
                cfg.row_font_size,
                cfg.page_width - cfg.margin_right - w,
                y,
                &range,
            );
        }
    }

    /// Draw horizontally centered text at the given baseline.
    fn draw_centered(
        &self,
        ops: &mut Vec<Operation>,
        font: &str,
        size: f32,
        y: f32,
        text: &str,
        cfg: &LayoutConfig,
    ) {
        let x = (cfg.page_width - text_width(text, size)) / 2.0;
        push_text(ops, font, size, x, y, text);
    }
}

impl Default for IndexRenderer {
    fn default() -> Self {
        Self::new()
    }
}

/// Left edge of the date column.
fn date_column_x(cfg: &LayoutConfig) -> f32 {
    cfg.page_width - cfg.margin_right - cfg.label_column_width - cfg.date_column_width
}

/// MediaBox array for a generated index page.
fn media_box(cfg: &LayoutConfig) -> Vec<Object> {
    vec![
        0.into(),
        0.into(),
        Object::Real(cfg.page_width),
        Object::Real(cfg.page_height),
    ]
}

/// Append a single positioned text run.
fn push_text(ops: &mut Vec<Operation>, font: &str, size: f32, x: f32, y: f32, text: &str) {
    ops.push(Operation::new("BT", vec![]));
    ops.push(Operation::new("Tf", vec![font.into(), Object::Real(size)]));
    ops.push(Operation::new("Td", vec![Object::Real(x), Object::Real(y)]));
    ops.push(Operation::new("Tj", vec![Object::string_literal(text)]));
    ops.push(Operation::new("ET", vec![]));
}
