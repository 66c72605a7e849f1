//! The assembly pipeline.
//!
//! [`Bundler`] drives the whole state machine: resolve sources, plan the
//! content pages, measure the index, shift entry targets, assemble, annotate,
//! optionally watermark, and optionally split into volumes. Stages run
//! strictly in sequence (each stage's page-position data is a hard input to
//! the next) and a failure at any stage aborts the run with no partial
//! output.
//!
//! The circular dependency between index size and content placement is
//! resolved as an explicit fixed-point computation: the index layout depends
//! only on the entries' text, never on their link targets, so shifting the
//! targets by the measured page count cannot change the page count and one
//! iteration always converges. The loop is still capped defensively.

use std::time::{Duration, Instant};

use serde::Serialize;
use tracing::{debug, info};

use crate::annotate::Annotator;
use crate::assemble::Assembler;
use crate::config::BundleConfig;
use crate::error::{BundleError, Result};
use crate::index::{IndexLayout, IndexRenderer};
use crate::plan::{LayoutPlanner, PagePlan};
use crate::progress::{CancellationToken, ProgressEvent, Stage};
use crate::section::SourceDocument;
use crate::source::{ResolvedDocument, SourceResolver};
use crate::volume::{VolumeManifest, VolumeSplitter, write_archive};
use crate::watermark::WatermarkStamper;

/// Caption drawn by the preview watermark.
const WATERMARK_CAPTION: &str = "PREVIEW";

/// Defensive cap on index layout passes. One pass always suffices, because
/// the index's size is invariant under the target shift.
const MAX_LAYOUT_ITERATIONS: usize = 3;

/// Statistics about a completed assembly run.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BundleStatistics {
    /// Number of contributing sections.
    pub sections: usize,

    /// Number of source documents merged.
    pub documents: usize,

    /// Content pages (divider pages included).
    pub content_pages: usize,

    /// Index pages at the front of the bundle.
    pub index_pages: usize,

    /// Total physical pages.
    pub total_pages: usize,

    /// Label of every physical page; empty string for index pages.
    pub page_labels: Vec<String>,

    /// Link annotations added.
    pub links_added: usize,

    /// Bookmark nodes added.
    pub bookmarks_added: usize,

    /// Page-number stamps drawn.
    pub stamps_added: usize,

    /// Number of volumes in the output (1 when not split).
    pub volumes: usize,

    /// Wall-clock time of the whole run.
    pub assembly_time: Duration,
}

/// Output of a bundle assembly run.
#[derive(Debug)]
pub enum BundleOutput {
    /// The bundle fit within the volume cap: a single PDF.
    Single {
        /// The assembled PDF bytes.
        pdf: Vec<u8>,
        /// Run statistics.
        statistics: BundleStatistics,
    },

    /// The bundle exceeded the cap: a zip archive of volumes.
    Volumes {
        /// The zip archive bytes (volume PDFs plus `manifest.txt`).
        archive: Vec<u8>,
        /// Manifest of the volume ranges.
        manifest: VolumeManifest,
        /// Run statistics.
        statistics: BundleStatistics,
    },
}

impl BundleOutput {
    /// Statistics of the run, regardless of output shape.
    pub fn statistics(&self) -> &BundleStatistics {
        match self {
            Self::Single { statistics, .. } => statistics,
            Self::Volumes { statistics, .. } => statistics,
        }
    }
}

/// The bundle assembly engine.
///
/// Stateless between runs: every invocation builds and consumes its own
/// intermediate structures.
pub struct Bundler {
    resolver: SourceResolver,
    planner: LayoutPlanner,
    renderer: IndexRenderer,
    assembler: Assembler,
    annotator: Annotator,
    stamper: WatermarkStamper,
    splitter: VolumeSplitter,
    cancel: CancellationToken,
}

impl Bundler {
    /// Create a bundler with default components.
    pub fn new() -> Self {
        Self::with_cancellation(CancellationToken::new())
    }

    /// Create a bundler observing the given cancellation token.
    pub fn with_cancellation(cancel: CancellationToken) -> Self {
        Self {
            resolver: SourceResolver::new(),
            planner: LayoutPlanner::new(),
            renderer: IndexRenderer::new(),
            assembler: Assembler::new(),
            annotator: Annotator::new(),
            stamper: WatermarkStamper::new(),
            splitter: VolumeSplitter::new(),
            cancel,
        }
    }

    /// A clone of this bundler's cancellation token.
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Assemble a bundle.
    ///
    /// # Errors
    ///
    /// Any stage failure aborts the whole pipeline; see
    /// [`BundleError`] for the taxonomy.
    pub async fn assemble(&self, config: &BundleConfig) -> Result<BundleOutput> {
        self.assemble_with_progress(config, |_| {}).await
    }

    /// Assemble a bundle, reporting progress between stages and per
    /// document.
    pub async fn assemble_with_progress<F>(
        &self,
        config: &BundleConfig,
        mut progress: F,
    ) -> Result<BundleOutput>
    where
        F: FnMut(ProgressEvent),
    {
        let start = Instant::now();

        config
            .validate()
            .map_err(|e| BundleError::invalid_config(e.to_string()))?;

        // Resolve all source documents; abort on the first failure.
        let resolved = self.resolve_sources(config, &mut progress).await?;
        self.cancel.check()?;

        // Plan the content-only page sequence.
        let provisional = self.planner.plan(&config.sections, &resolved)?;
        progress(ProgressEvent::Stage(Stage::Planned));
        debug!(
            content_pages = provisional.labels.len(),
            entries = provisional.entries.len(),
            "content planned"
        );

        // Two-phase index resolution: measure, shift, verify fixed point.
        let (plan, layout) = self.resolve_index_layout(provisional, config, &mut progress)?;
        let index_page_count = layout.page_count;

        // Render the index and assemble the final document.
        let index_doc =
            self.renderer
                .render(&plan.entries, &config.metadata, &layout, &config.layout)?;
        let content_doc = self.assembler.build_content(
            &plan,
            &resolved,
            &config.layout,
            &self.cancel,
            |index, total| progress(ProgressEvent::DocumentCopied { index, total }),
        )?;
        let mut bundle = self.assembler.assemble(index_doc, content_doc, &plan)?;

        if bundle.index_page_count != index_page_count {
            return Err(BundleError::assembly_failed(format!(
                "measured {index_page_count} index pages but rendered {}",
                bundle.index_page_count
            )));
        }
        progress(ProgressEvent::Stage(Stage::Assembled));
        debug!(total_pages = bundle.total_pages, "document assembled");

        // Links, bookmarks, page-number stamps.
        let summary = self.annotator.annotate(
            &mut bundle,
            &plan.entries,
            &layout,
            &config.page_numbers,
            &config.layout,
        )?;
        progress(ProgressEvent::Stage(Stage::Annotated));

        if config.watermark {
            self.stamper
                .stamp(&mut bundle.document, WATERMARK_CAPTION, &config.layout)?;
            progress(ProgressEvent::Stage(Stage::Watermarked));
        }

        self.cancel.check()?;

        let title = (!config.metadata.case_caption.is_empty())
            .then_some(config.metadata.case_caption.as_str());
        crate::utils::set_document_info(&mut bundle.document, title)?;

        let mut statistics = BundleStatistics {
            sections: config.sections.iter().filter(|s| s.contributes()).count(),
            documents: resolved.len(),
            content_pages: plan.labels.len(),
            index_pages: bundle.index_page_count,
            total_pages: bundle.total_pages,
            page_labels: bundle.labels.clone(),
            links_added: summary.links,
            bookmarks_added: summary.bookmarks,
            stamps_added: summary.stamps,
            volumes: 1,
            assembly_time: Duration::ZERO,
        };

        // Output: single PDF, or page-capped volumes in an archive.
        let output = if bundle.total_pages > config.volume_page_cap {
            let set =
                self.splitter
                    .split(&bundle.document, config.volume_page_cap, &config.case_id)?;
            let archive = write_archive(&set)?;
            statistics.volumes = set.manifest.volumes.len();
            progress(ProgressEvent::Stage(Stage::Split));
            statistics.assembly_time = start.elapsed();
            info!(
                total_pages = statistics.total_pages,
                volumes = statistics.volumes,
                "bundle split into volumes"
            );
            BundleOutput::Volumes {
                archive,
                manifest: set.manifest,
                statistics,
            }
        } else {
            bundle.document.compress();
            let mut pdf = Vec::new();
            bundle.document.save_to(&mut pdf)?;
            statistics.assembly_time = start.elapsed();
            info!(
                total_pages = statistics.total_pages,
                "bundle assembled"
            );
            BundleOutput::Single { pdf, statistics }
        };

        progress(ProgressEvent::Stage(Stage::Done));
        Ok(output)
    }

    /// Resolve every section's documents, in order, aborting on the first
    /// failure.
    async fn resolve_sources<F>(
        &self,
        config: &BundleConfig,
        progress: &mut F,
    ) -> Result<Vec<ResolvedDocument>>
    where
        F: FnMut(ProgressEvent),
    {
        let sources: Vec<&SourceDocument> = config
            .sections
            .iter()
            .flat_map(|s| &s.documents)
            .collect();
        let total = sources.len();

        let results = self
            .resolver
            .resolve_all_with_progress(&sources, config.effective_workers(), |index, _| {
                progress(ProgressEvent::DocumentResolved { index, total })
            })
            .await;

        let mut resolved = Vec::with_capacity(results.len());
        for result in results {
            resolved.push(result?);
        }
        Ok(resolved)
    }

    /// Measure the index, shift entry targets into final coordinates, and
    /// verify the layout reached a fixed point.
    fn resolve_index_layout<F>(
        &self,
        provisional: PagePlan,
        config: &BundleConfig,
        progress: &mut F,
    ) -> Result<(PagePlan, IndexLayout)>
    where
        F: FnMut(ProgressEvent),
    {
        let mut index_page_count =
            IndexLayout::compute(&provisional.entries, &config.metadata, &config.layout)
                .page_count;
        progress(ProgressEvent::Stage(Stage::Measured));
        debug!(index_pages = index_page_count, "index measured");

        let mut iterations = 1;
        loop {
            let mut shifted = provisional.clone();
            shifted.shift_targets(index_page_count);

            let layout =
                IndexLayout::compute(&shifted.entries, &config.metadata, &config.layout);
            if layout.page_count == index_page_count {
                progress(ProgressEvent::Stage(Stage::Shifted));
                return Ok((shifted, layout));
            }

            iterations += 1;
            if iterations > MAX_LAYOUT_ITERATIONS {
                return Err(BundleError::LayoutNotConverged { iterations });
            }
            index_page_count = layout.page_count;
        }
    }
}

impl Default for Bundler {
    fn default() -> Self {
        Self::new()
    }
}
