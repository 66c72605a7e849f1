//! pdfbundle - Assemble PDF documents into a paginated legal bundle.
//!
//! This library merges independently-uploaded PDF documents into a single
//! bundle with a generated table of contents, section-prefixed page labels
//! (`A001`, `B015`, ...), optional divider pages, clickable index links, a
//! bookmark tree, running page-number stamps, an optional preview watermark,
//! and page-capped volume splitting for oversized bundles. It supports:
//!
//! - Per-document overrides (edited bytes, explicit page subsets)
//! - Deterministic two-phase index/pagination resolution
//! - Link rectangles computed from the same layout the renderer draws
//! - Progress reporting and cooperative cancellation
//! - Zip packaging of page-capped volumes with a plain-text manifest
//!
//! # Examples
//!
//! ## Basic bundle
//!
//! ```no_run
//! use pdfbundle::{BundleConfig, BundleOutput, Bundler, Section, SourceDocument};
//!
//! # async fn example(claim: Vec<u8>, reply: Vec<u8>) -> Result<(), Box<dyn std::error::Error>> {
//! let sections = vec![
//!     Section::new("s1", "Statements of Case", "A")
//!         .with_divider()
//!         .with_document(SourceDocument::new("claim", claim).with_title("Claim form")),
//!     Section::new("s2", "Correspondence", "B")
//!         .with_document(SourceDocument::new("reply", reply)),
//! ];
//!
//! let config = BundleConfig::new("smith-v-jones", sections);
//! let output = Bundler::new().assemble(&config).await?;
//!
//! match output {
//!     BundleOutput::Single { pdf, statistics } => {
//!         println!("{} pages", statistics.total_pages);
//!         std::fs::write("bundle.pdf", pdf)?;
//!     }
//!     BundleOutput::Volumes { archive, manifest, .. } => {
//!         println!("{} volumes", manifest.volumes.len());
//!         std::fs::write("bundle.zip", archive)?;
//!     }
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Progress and cancellation
//!
//! ```no_run
//! use pdfbundle::{BundleConfig, Bundler, ProgressEvent};
//!
//! # async fn example(config: BundleConfig) -> Result<(), Box<dyn std::error::Error>> {
//! let bundler = Bundler::new();
//! let token = bundler.cancellation_token();
//!
//! let output = bundler
//!     .assemble_with_progress(&config, |event| {
//!         if let ProgressEvent::Stage(stage) = event {
//!             println!("stage complete: {stage}");
//!         }
//!     })
//!     .await?;
//! # let _ = (token, output);
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod annotate;
pub mod assemble;
pub mod config;
pub mod error;
pub mod index;
pub mod pipeline;
pub mod plan;
pub mod progress;
pub mod section;
pub mod source;
pub mod text;
pub mod utils;
pub mod volume;
pub mod watermark;

// Re-export commonly used types
pub use config::{BundleConfig, BundleMetadata, LayoutConfig, PageNumberPosition, PageNumberSettings};
pub use error::{BundleError, Result};
pub use pipeline::{BundleOutput, BundleStatistics, Bundler};
pub use progress::{CancellationToken, ProgressEvent, Stage};
pub use section::{Section, SourceDocument};
pub use volume::{Volume, VolumeManifest};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name.
pub const NAME: &str = env!("CARGO_PKG_NAME");
