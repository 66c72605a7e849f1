//! Navigation and stamping on the assembled document.
//!
//! Three passes, all driven by the same entry list and the same
//! [`IndexLayout`] value the renderer consumed; nothing here re-derives a
//! row position:
//!
//! - one link annotation per index row, its rectangle taken verbatim from
//!   the row placement, its destination the entry's (already shifted)
//!   target page;
//! - a flat bookmark chain mirroring the index, preceded by a synthetic
//!   "Index" node;
//! - a page-number stamp on every labelled page, honoring the page's own
//!   media box.

use lopdf::content::{Content, Operation};
use lopdf::{Document, Object, ObjectId, dictionary};

use crate::assemble::AssembledBundle;
use crate::config::{LayoutConfig, PageNumberSettings};
use crate::error::{BundleError, Result};
use crate::index::IndexLayout;
use crate::plan::IndexEntry;
use crate::text::text_width;
use crate::utils::{add_page_resource, append_page_annotation, append_page_content, page_media_box};

/// Resource name used for the stamp font on content pages.
const STAMP_FONT: &str = "Fstamp";

/// Title of the synthetic leading bookmark.
const INDEX_BOOKMARK_TITLE: &str = "Index";

/// Counts of what the annotator attached.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AnnotationSummary {
    /// Link annotations added to index pages.
    pub links: usize,
    /// Bookmark nodes added (including the leading "Index" node).
    pub bookmarks: usize,
    /// Page-number stamps drawn.
    pub stamps: usize,
}

/// Annotator for links, bookmarks, and page-number stamps.
pub struct Annotator;

impl Annotator {
    /// Create a new annotator.
    pub fn new() -> Self {
        Self
    }

    /// Attach links, bookmarks, and stamps to the assembled bundle.
    ///
    /// Entry targets must already be in final-document coordinates.
    ///
    /// # Errors
    ///
    /// Returns an error if an entry's target page does not exist in the
    /// document. That means the index shift went wrong, and the bundle
    /// must not be emitted.
    pub fn annotate(
        &self,
        bundle: &mut AssembledBundle,
        entries: &[IndexEntry],
        layout: &IndexLayout,
        settings: &PageNumberSettings,
        cfg: &LayoutConfig,
    ) -> Result<AnnotationSummary> {
        let page_ids: Vec<ObjectId> = bundle.document.get_pages().into_values().collect();

        let links = self.add_links(&mut bundle.document, entries, layout, &page_ids)?;
        let bookmarks = self.add_bookmarks(&mut bundle.document, entries, &page_ids)?;
        let stamps = self.add_stamps(&mut bundle.document, &bundle.labels, &page_ids, settings, cfg)?;

        Ok(AnnotationSummary {
            links,
            bookmarks,
            stamps,
        })
    }

    /// Add one link annotation per index row.
    fn add_links(
        &self,
        doc: &mut Document,
        entries: &[IndexEntry],
        layout: &IndexLayout,
        page_ids: &[ObjectId],
    ) -> Result<usize> {
        let mut added = 0;

        for row in &layout.rows {
            let entry = &entries[row.entry];
            let target_id = *page_ids.get(entry.target_page).ok_or_else(|| {
                BundleError::annotation_failed(format!(
                    "link target page {} does not exist ({} pages)",
                    entry.target_page,
                    page_ids.len()
                ))
            })?;
            let index_page_id = *page_ids.get(row.page).ok_or_else(|| {
                BundleError::annotation_failed(format!(
                    "index page {} does not exist ({} pages)",
                    row.page,
                    page_ids.len()
                ))
            })?;

            let [x1, y1, x2, y2] = row.rect;
            let annotation_id = doc.add_object(dictionary! {
                "Type" => "Annot",
                "Subtype" => "Link",
                "Rect" => vec![
                    Object::Real(x1),
                    Object::Real(y1),
                    Object::Real(x2),
                    Object::Real(y2),
                ],
                "Border" => vec![0.into(), 0.into(), 0.into()],
                "Dest" => vec![
                    target_id.into(),
                    "XYZ".into(),
                    Object::Null,
                    Object::Null,
                    Object::Null,
                ],
            });

            append_page_annotation(doc, index_page_id, annotation_id)?;
            added += 1;
        }

        Ok(added)
    }

    /// Build the flat bookmark chain: "Index" first, then one node per
    /// entry, linked as siblings with no nesting.
    fn add_bookmarks(
        &self,
        doc: &mut Document,
        entries: &[IndexEntry],
        page_ids: &[ObjectId],
    ) -> Result<usize> {
        let Some(&first_page) = page_ids.first() else {
            return Ok(0);
        };

        let mut items: Vec<(String, ObjectId)> =
            vec![(INDEX_BOOKMARK_TITLE.to_string(), first_page)];
        for entry in entries {
            let target_id = *page_ids.get(entry.target_page).ok_or_else(|| {
                BundleError::annotation_failed(format!(
                    "bookmark target page {} does not exist",
                    entry.target_page
                ))
            })?;
            items.push((entry.title.clone(), target_id));
        }

        let outline_id = doc.new_object_id();

        let mut item_ids = Vec::with_capacity(items.len());
        for (title, page_id) in &items {
            let dest = vec![
                Object::Reference(*page_id),
                "XYZ".into(),
                Object::Null,
                Object::Null,
                Object::Null,
            ];
            let item_id = doc.add_object(dictionary! {
                "Title" => Object::string_literal(title.as_str()),
                "Parent" => outline_id,
                "Dest" => dest,
            });
            item_ids.push(item_id);
        }

        for i in 0..item_ids.len() {
            if let Ok(Object::Dictionary(dict)) = doc.get_object_mut(item_ids[i]) {
                if i > 0 {
                    dict.set("Prev", Object::Reference(item_ids[i - 1]));
                }
                if i < item_ids.len() - 1 {
                    dict.set("Next", Object::Reference(item_ids[i + 1]));
                }
            }
        }

        let mut outline = dictionary! {
            "Type" => "Outlines",
            "Count" => item_ids.len() as i64,
        };
        outline.set("First", Object::Reference(item_ids[0]));
        outline.set("Last", Object::Reference(*item_ids.last().unwrap()));
        doc.objects.insert(outline_id, Object::Dictionary(outline));

        doc.catalog_mut()?
            .set("Outlines", Object::Reference(outline_id));

        Ok(item_ids.len())
    }

    /// Stamp the running page label on every labelled page.
    ///
    /// Index pages have empty labels and are skipped.
    fn add_stamps(
        &self,
        doc: &mut Document,
        labels: &[String],
        page_ids: &[ObjectId],
        settings: &PageNumberSettings,
        cfg: &LayoutConfig,
    ) -> Result<usize> {
        let base_font = if settings.bold {
            "Helvetica-Bold"
        } else {
            "Helvetica"
        };
        let font_id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => base_font,
        });

        let mut stamped = 0;
        for (page_index, label) in labels.iter().enumerate() {
            if label.is_empty() {
                continue;
            }
            let page_id = *page_ids.get(page_index).ok_or_else(|| {
                BundleError::annotation_failed(format!("page {page_index} missing from document"))
            })?;

            let media_box = page_media_box(doc, page_id);
            let (x, y) = stamp_position(label, &media_box, settings, cfg);

            let content = Content {
                operations: vec![
                    Operation::new("q", vec![]),
                    Operation::new("BT", vec![]),
                    Operation::new(
                        "Tf",
                        vec![STAMP_FONT.into(), Object::Real(settings.font_size)],
                    ),
                    Operation::new("Td", vec![Object::Real(x), Object::Real(y)]),
                    Operation::new("Tj", vec![Object::string_literal(label.as_str())]),
                    Operation::new("ET", vec![]),
                    Operation::new("Q", vec![]),
                ],
            };

            add_page_resource(doc, page_id, "Font", STAMP_FONT, font_id)?;
            append_page_content(doc, page_id, &content)?;
            stamped += 1;
        }

        Ok(stamped)
    }
}

impl Default for Annotator {
    fn default() -> Self {
        Self::new()
    }
}

/// Compute the stamp's text origin for the configured corner.
fn stamp_position(
    label: &str,
    media_box: &[f32; 4],
    settings: &PageNumberSettings,
    cfg: &LayoutConfig,
) -> (f32, f32) {
    use crate::config::PageNumberPosition::*;

    let width = text_width(label, settings.font_size);
    let [x1, y1, x2, y2] = *media_box;

    let x = match settings.position {
        TopLeft | BottomLeft => x1 + cfg.stamp_margin,
        TopCenter | BottomCenter => (x1 + x2) / 2.0 - width / 2.0,
        TopRight | BottomRight => x2 - cfg.stamp_margin - width,
    };
    let y = if settings.position.is_top() {
        y2 - cfg.stamp_margin - settings.font_size
    } else {
        y1 + cfg.stamp_margin
    };

    (x, y)
}
