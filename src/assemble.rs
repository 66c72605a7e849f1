//! Document assembly.
//!
//! Two passes share the lopdf merge idiom (renumber the incoming document
//! past the target's highest object id, move its objects across, append its
//! page ids to the target's Kids array):
//!
//! 1. [`Assembler::build_content`] concatenates the plan's page blocks
//!    (generated divider pages and each resolved document's effective pages)
//!    into the content-only document.
//! 2. [`Assembler::assemble`] prepends the rendered index pages and produces
//!    the final document together with the authoritative page→label array.

use lopdf::content::{Content, Operation};
use lopdf::{Document, Object, ObjectId, Stream, dictionary};

use crate::config::LayoutConfig;
use crate::error::{BundleError, Result};
use crate::plan::{PageBlock, PagePlan};
use crate::progress::CancellationToken;
use crate::source::ResolvedDocument;
use crate::text::{text_width, truncate_to_width};

/// The assembled final document with its page labels.
#[derive(Debug)]
pub struct AssembledBundle {
    /// The final document: index pages followed by content pages.
    pub document: Document,

    /// Label of every physical page; empty string for index pages.
    /// Always `labels.len() == total_pages`.
    pub labels: Vec<String>,

    /// Total physical page count.
    pub total_pages: usize,

    /// Number of index pages at the front of the document.
    pub index_page_count: usize,
}

/// Assembler that concatenates page blocks into documents.
pub struct Assembler;

impl Assembler {
    /// Create a new assembler.
    pub fn new() -> Self {
        Self
    }

    /// Build the content-only document from the plan's page blocks.
    ///
    /// The cancellation token is checked before each block is copied.
    /// `on_copied` is invoked with `(block_index, block_count)` after each
    /// block lands in the document.
    ///
    /// # Errors
    ///
    /// Returns an error if the run was cancelled or the page tree of an
    /// incoming document is malformed.
    pub fn build_content<F>(
        &self,
        plan: &PagePlan,
        resolved: &[ResolvedDocument],
        cfg: &LayoutConfig,
        cancel: &CancellationToken,
        mut on_copied: F,
    ) -> Result<Document>
    where
        F: FnMut(usize, usize),
    {
        let mut target = Document::with_version("1.7");
        let pages_id = target.new_object_id();
        let mut kids: Vec<Object> = Vec::new();
        let mut divider_resources: Option<ObjectId> = None;

        let block_count = plan.blocks.len();
        for (block_index, block) in plan.blocks.iter().enumerate() {
            cancel.check()?;

            match block {
                PageBlock::Divider { section_name, .. } => {
                    let resources_id = *divider_resources.get_or_insert_with(|| {
                        let font_id = target.add_object(dictionary! {
                            "Type" => "Font",
                            "Subtype" => "Type1",
                            "BaseFont" => "Helvetica-Bold",
                        });
                        target.add_object(dictionary! {
                            "Font" => dictionary! { "Fd" => font_id },
                        })
                    });
                    let page_id =
                        divider_page(&mut target, pages_id, resources_id, section_name, cfg)?;
                    kids.push(page_id.into());
                }
                PageBlock::DocumentPages { resolved_index } => {
                    let source = resolved.get(*resolved_index).ok_or_else(|| {
                        BundleError::assembly_failed(format!(
                            "page block references unknown document {resolved_index}"
                        ))
                    })?;
                    let page_ids = merge_pages(&mut target, source)?;
                    kids.extend(page_ids.into_iter().map(Object::from));
                }
            }

            on_copied(block_index, block_count);
        }

        let count = kids.len() as i64;
        target.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => kids,
                "Count" => count,
            }),
        );
        let catalog_id = target.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        target.trailer.set("Root", catalog_id);

        Ok(target)
    }

    /// Merge index and content documents into the final bundle.
    ///
    /// The index pages come first, then the content pages verbatim in
    /// order. The returned label array is the authoritative page→label map.
    ///
    /// # Errors
    ///
    /// Returns an error if the content page count does not equal the number
    /// of labels the planner emitted. That would mean the plan and the
    /// assembly diverged, and a mis-assembled bundle must never be emitted.
    pub fn assemble(
        &self,
        index_doc: Document,
        content_doc: Document,
        plan: &PagePlan,
    ) -> Result<AssembledBundle> {
        let mut merged = index_doc;
        let index_page_count = merged.get_pages().len();

        let mut content = content_doc;
        content.renumber_objects_with(merged.max_id + 1);
        merged.max_id = content.max_id;

        let content_pages: Vec<ObjectId> = content.get_pages().into_values().collect();
        if content_pages.len() != plan.labels.len() {
            return Err(BundleError::assembly_failed(format!(
                "planned {} labels but assembled {} content pages",
                plan.labels.len(),
                content_pages.len()
            )));
        }

        merged.objects.extend(content.objects);
        add_pages_to_tree(&mut merged, &content_pages)?;

        merged.prune_objects();
        merged.renumber_objects();

        let mut labels = vec![String::new(); index_page_count];
        labels.extend(plan.labels.iter().cloned());

        let total_pages = merged.get_pages().len();
        if total_pages != labels.len() {
            return Err(BundleError::assembly_failed(format!(
                "final document has {total_pages} pages but {} labels were produced",
                labels.len()
            )));
        }

        Ok(AssembledBundle {
            document: merged,
            labels,
            total_pages,
            index_page_count,
        })
    }
}

impl Default for Assembler {
    fn default() -> Self {
        Self::new()
    }
}

/// Copy a resolved document's effective pages into the target document.
///
/// Returns the (renumbered) page ids in contribution order.
fn merge_pages(target: &mut Document, source: &ResolvedDocument) -> Result<Vec<ObjectId>> {
    let mut doc = source.document.clone();
    trim_to_pages(&mut doc, &source.page_ids)?;

    doc.renumber_objects_with(target.max_id + 1);
    target.max_id = doc.max_id;

    let page_ids: Vec<ObjectId> = doc.get_pages().into_values().collect();
    target.objects.extend(doc.objects);

    Ok(page_ids)
}

/// Restrict a document's root page tree to the given pages, in order.
fn trim_to_pages(doc: &mut Document, page_ids: &[ObjectId]) -> Result<()> {
    let pages_id = {
        let catalog = doc.catalog()?;
        catalog.get(b"Pages").and_then(Object::as_reference)?
    };

    let pages_obj = doc.get_object_mut(pages_id)?;
    if let Object::Dictionary(dict) = pages_obj {
        let kids: Vec<Object> = page_ids.iter().map(|&id| Object::Reference(id)).collect();
        dict.set("Kids", Object::Array(kids));
        dict.set("Count", Object::Integer(page_ids.len() as i64));
    } else {
        return Err(BundleError::assembly_failed(
            "Pages object is not a dictionary",
        ));
    }

    Ok(())
}

/// Append pages to the target document's root page tree.
fn add_pages_to_tree(doc: &mut Document, page_ids: &[ObjectId]) -> Result<()> {
    let pages_id = {
        let catalog = doc.catalog()?;
        catalog.get(b"Pages").and_then(Object::as_reference)?
    };

    let pages_obj = doc.get_object_mut(pages_id)?;
    if let Object::Dictionary(dict) = pages_obj {
        let kids = dict
            .get_mut(b"Kids")
            .map_err(|_| BundleError::assembly_failed("Pages dictionary missing Kids array"))?;

        if let Object::Array(kids_array) = kids {
            for &page_id in page_ids {
                kids_array.push(Object::Reference(page_id));
            }
        } else {
            return Err(BundleError::assembly_failed("Kids is not an array"));
        }

        let current = dict.get(b"Count").and_then(Object::as_i64).unwrap_or(0);
        dict.set("Count", Object::Integer(current + page_ids.len() as i64));
    } else {
        return Err(BundleError::assembly_failed(
            "Pages object is not a dictionary",
        ));
    }

    Ok(())
}

/// Create a divider page bearing the section name, centered.
fn divider_page(
    doc: &mut Document,
    pages_id: ObjectId,
    resources_id: ObjectId,
    section_name: &str,
    cfg: &LayoutConfig,
) -> Result<ObjectId> {
    let max_width = cfg.text_width();
    let name = truncate_to_width(section_name, max_width, cfg.divider_font_size);
    let x = (cfg.page_width - text_width(&name, cfg.divider_font_size)) / 2.0;
    let y = cfg.page_height * 0.55;

    let content = Content {
        operations: vec![
            Operation::new("BT", vec![]),
            Operation::new("Tf", vec!["Fd".into(), Object::Real(cfg.divider_font_size)]),
            Operation::new("Td", vec![Object::Real(x), Object::Real(y)]),
            Operation::new("Tj", vec![Object::string_literal(name)]),
            Operation::new("ET", vec![]),
        ],
    };
    let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode()?));

    Ok(doc.add_object(dictionary! {
        "Type" => "Page",
        "Parent" => pages_id,
        "MediaBox" => vec![
            0.into(),
            0.into(),
            Object::Real(cfg.page_width),
            Object::Real(cfg.page_height),
        ],
        "Contents" => content_id,
        "Resources" => resources_id,
    }))
}
