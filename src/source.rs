//! Source document resolution.
//!
//! This module turns raw [`SourceDocument`] byte buffers into parsed
//! [`ResolvedDocument`]s with their effective page list applied. Resolution
//! of independent documents is a pure function of each document alone, so a
//! batch can run concurrently; results always come back in input order and
//! any failure names the document that caused it.
//!
//! # Examples
//!
//! ```no_run
//! use pdfbundle::source::SourceResolver;
//! use pdfbundle::section::SourceDocument;
//!
//! # async fn example(bytes: Vec<u8>) -> Result<(), Box<dyn std::error::Error>> {
//! let resolver = SourceResolver::new();
//! let doc = SourceDocument::new("exhibit-1", bytes);
//! let resolved = resolver.resolve(&doc)?;
//! println!("{} contributes {} pages", resolved.document_id, resolved.page_count);
//! # Ok(())
//! # }
//! ```

use lopdf::{Document, ObjectId};

use crate::error::{BundleError, Result};
use crate::section::{EffectiveSource, SourceDocument};

/// A parsed source document with its effective page selection applied.
#[derive(Debug)]
pub struct ResolvedDocument {
    /// The parsed PDF.
    pub document: Document,

    /// Object ids of the effective pages, in contribution order.
    pub page_ids: Vec<ObjectId>,

    /// Effective page count (`page_ids.len()`).
    pub page_count: usize,

    /// Identifier of the source document.
    pub document_id: String,

    /// Display title for the index row.
    pub title: String,

    /// Date string for the index date column.
    pub date: Option<String>,
}

/// Result of resolving a single document.
pub type ResolveResult = Result<ResolvedDocument>;

/// Resolver that parses source documents and applies override precedence.
#[derive(Debug, Clone)]
pub struct SourceResolver {
    /// Whether to reject documents with zero pages.
    verify: bool,
}

impl SourceResolver {
    /// Create a new resolver with default settings.
    pub fn new() -> Self {
        Self { verify: true }
    }

    /// Create a resolver that accepts zero-page documents.
    pub fn without_verification() -> Self {
        Self { verify: false }
    }

    /// Resolve a single source document.
    ///
    /// Applies the override precedence from
    /// [`SourceDocument::effective_source`], parses the winning byte buffer,
    /// and validates the page subset before any layout begins.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The bytes are not a parsable PDF (`UnreadableDocument`)
    /// - The document has no pages (`UnreadableDocument`)
    /// - The subset is empty or contains an out-of-range index
    ///   (`InvalidPageSubset`)
    pub fn resolve(&self, source: &SourceDocument) -> ResolveResult {
        let (bytes, subset) = match source.effective_source() {
            EffectiveSource::Edited(bytes) => (bytes, None),
            EffectiveSource::Subset(bytes, pages) => (bytes, Some(pages)),
            EffectiveSource::Full(bytes) => (bytes, None),
        };

        let document = Document::load_mem(bytes)
            .map_err(|e| BundleError::unreadable(&source.id, e.to_string()))?;

        let all_pages: Vec<ObjectId> = document.get_pages().into_values().collect();

        if self.verify && all_pages.is_empty() {
            return Err(BundleError::unreadable(&source.id, "PDF has no pages"));
        }

        let page_ids = match subset {
            Some(pages) => {
                if pages.is_empty() {
                    return Err(BundleError::invalid_subset(&source.id, "subset is empty"));
                }
                let mut ids = Vec::with_capacity(pages.len());
                for &index in pages {
                    match all_pages.get(index) {
                        Some(&id) => ids.push(id),
                        None => {
                            return Err(BundleError::invalid_subset(
                                &source.id,
                                format!(
                                    "page index {index} out of range (document has {} pages)",
                                    all_pages.len()
                                ),
                            ));
                        }
                    }
                }
                ids
            }
            None => all_pages,
        };

        let page_count = page_ids.len();

        Ok(ResolvedDocument {
            document,
            page_ids,
            page_count,
            document_id: source.id.clone(),
            title: source.display_title().to_string(),
            date: source.date.clone(),
        })
    }

    /// Resolve multiple documents concurrently.
    ///
    /// Results are returned in the same order as the input. Resolution of
    /// each document is independent, so failures don't stop the batch here;
    /// the caller decides whether to abort (the pipeline always does).
    ///
    /// # Arguments
    ///
    /// * `sources` - Documents to resolve
    /// * `workers` - Maximum number of documents resolved at once
    pub async fn resolve_all(&self, sources: &[&SourceDocument], workers: usize) -> Vec<ResolveResult> {
        self.resolve_all_with_progress(sources, workers, |_, _| {}).await
    }

    /// Resolve multiple documents concurrently with a progress callback.
    ///
    /// The callback receives the input index and the result of each
    /// resolution, in input order.
    pub async fn resolve_all_with_progress<F>(
        &self,
        sources: &[&SourceDocument],
        workers: usize,
        mut on_progress: F,
    ) -> Vec<ResolveResult>
    where
        F: FnMut(usize, &ResolveResult),
    {
        use futures::stream::{self, StreamExt};

        let workers = workers.max(1);

        let tasks = sources.iter().enumerate().map(|(idx, source)| {
            let resolver = self.clone();
            async move { (idx, resolver.resolve(source)) }
        });

        let mut indexed: Vec<(usize, ResolveResult)> = stream::iter(tasks)
            .buffer_unordered(workers)
            .collect::<Vec<_>>()
            .await;

        indexed.sort_by_key(|(idx, _)| *idx);

        let mut results = Vec::with_capacity(sources.len());
        for (idx, result) in indexed {
            on_progress(idx, &result);
            results.push(result);
        }

        results
    }
}

impl Default for SourceResolver {
    fn default() -> Self {
        Self::new()
    }
}
