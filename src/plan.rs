//! Content layout planning.
//!
//! The planner walks the ordered sections and produces the content-only page
//! sequence: one label per physical content page, the index entries that
//! describe it, and the page blocks the assembler will concatenate. Entry
//! targets are expressed in content-only coordinates; the pipeline shifts
//! them into final coordinates once the index page count is known.

use crate::error::{BundleError, Result};
use crate::section::Section;
use crate::source::ResolvedDocument;

/// Largest page number a label can carry.
///
/// Labels are zero-padded to three digits and widen naturally to four when a
/// section grows past 999 pages. Beyond four digits the engine refuses with
/// an explicit error instead of producing ever-wider labels.
pub const MAX_LABEL_NUMBER: usize = 9_999;

/// One row of the generated index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexEntry {
    /// Display title (section name or document title).
    pub title: String,

    /// First label of the row's page range; empty for a section header
    /// without a divider.
    pub start_label: String,

    /// Last label of the row's page range.
    pub end_label: String,

    /// Target page index of the row's jump link. Content-only coordinates
    /// until [`PagePlan::shift_targets`] has been applied; final-document
    /// coordinates afterwards.
    pub target_page: usize,

    /// True for section-header rows.
    pub is_section_header: bool,

    /// True for document rows, which render with an extra left indent.
    pub indented: bool,

    /// Date string for the date column.
    pub date: Option<String>,
}

impl IndexEntry {
    /// Text of the page-range column: a single label, a "start-end" range,
    /// or nothing.
    pub fn range_text(&self) -> String {
        if self.start_label.is_empty() {
            String::new()
        } else if self.start_label == self.end_label {
            self.start_label.clone()
        } else {
            format!("{}-{}", self.start_label, self.end_label)
        }
    }
}

/// One block of consecutive pages in the content-only document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageBlock {
    /// A generated divider page bearing the section name.
    Divider {
        /// Section name drawn on the page.
        section_name: String,
        /// Label assigned to the divider page.
        label: String,
    },

    /// The effective pages of one resolved document.
    DocumentPages {
        /// Index into the flattened resolved-document list.
        resolved_index: usize,
    },
}

/// Output of the planning pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PagePlan {
    /// One label per content page, in page order.
    pub labels: Vec<String>,

    /// Index entries in display order.
    pub entries: Vec<IndexEntry>,

    /// Page blocks in assembly order.
    pub blocks: Vec<PageBlock>,
}

impl PagePlan {
    /// Total number of content pages (equals the number of labels emitted).
    pub fn content_page_count(&self) -> usize {
        self.labels.len()
    }

    /// Shift every entry's target page by the index page count, converting
    /// content-only coordinates into final-document coordinates.
    pub fn shift_targets(&mut self, index_page_count: usize) {
        for entry in &mut self.entries {
            entry.target_page += index_page_count;
        }
    }
}

/// Format a page label: prefix plus the page number zero-padded to three
/// digits.
///
/// Numbers above 999 widen the field to four digits; numbers above
/// [`MAX_LABEL_NUMBER`] are a hard error, never wrapped or truncated.
pub fn format_label(prefix: &str, number: usize) -> Result<String> {
    if number > MAX_LABEL_NUMBER {
        return Err(BundleError::LabelCapacityExceeded {
            prefix: prefix.to_string(),
            number,
        });
    }
    Ok(format!("{prefix}{number:03}"))
}

/// Planner that turns sections plus resolved documents into a [`PagePlan`].
pub struct LayoutPlanner;

impl LayoutPlanner {
    /// Create a new planner.
    pub fn new() -> Self {
        Self
    }

    /// Plan the content-only page sequence.
    ///
    /// `resolved` must contain the resolved documents of all sections,
    /// flattened in section order, the order produced by resolving
    /// `sections.iter().flat_map(|s| &s.documents)`.
    ///
    /// # Errors
    ///
    /// Returns an error if a section's page numbering exceeds the label
    /// capacity, or if `resolved` doesn't match the section structure.
    pub fn plan(&self, sections: &[Section], resolved: &[ResolvedDocument]) -> Result<PagePlan> {
        let mut labels = Vec::new();
        let mut entries = Vec::new();
        let mut blocks = Vec::new();
        let mut cursor = 0usize;

        for section in sections {
            if !section.contributes() {
                continue;
            }

            let mut counter = section.start_number;
            let section_first_page = labels.len();
            let mut divider_label = String::new();

            if section.divider {
                let label = format_label(&section.prefix, counter)?;
                counter += 1;
                blocks.push(PageBlock::Divider {
                    section_name: section.name.clone(),
                    label: label.clone(),
                });
                labels.push(label.clone());
                divider_label = label;
            }

            entries.push(IndexEntry {
                title: section.name.clone(),
                start_label: divider_label.clone(),
                end_label: divider_label,
                target_page: section_first_page,
                is_section_header: true,
                indented: false,
                date: None,
            });

            for _ in &section.documents {
                let doc = resolved.get(cursor).ok_or_else(|| {
                    BundleError::assembly_failed(
                        "resolved document list does not match section structure",
                    )
                })?;

                let first_page = labels.len();
                let start = format_label(&section.prefix, counter)?;
                let end = format_label(&section.prefix, counter + doc.page_count.saturating_sub(1))?;
                for i in 0..doc.page_count {
                    labels.push(format_label(&section.prefix, counter + i)?);
                }
                counter += doc.page_count;

                blocks.push(PageBlock::DocumentPages {
                    resolved_index: cursor,
                });
                entries.push(IndexEntry {
                    title: doc.title.clone(),
                    start_label: start,
                    end_label: end,
                    target_page: first_page,
                    is_section_header: false,
                    indented: true,
                    date: doc.date.clone(),
                });
                cursor += 1;
            }
        }

        Ok(PagePlan {
            labels,
            entries,
            blocks,
        })
    }
}

impl Default for LayoutPlanner {
    fn default() -> Self {
        Self::new()
    }
}
