//! Progress reporting and cancellation.
//!
//! The pipeline is strictly sequential, so instead of concurrency it offers
//! an explicit hook: a callback invoked when each stage completes and as
//! individual documents are resolved or copied. Cancellation is cooperative
//! and checked at document-copy granularity; a cancelled run aborts with
//! [`BundleError::Cancelled`](crate::BundleError::Cancelled) and produces no
//! partial output.

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::error::{BundleError, Result};

/// Pipeline stages, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    /// Content page sequence and index entries planned.
    Planned,
    /// Index page count measured.
    Measured,
    /// Entry targets shifted into final coordinates.
    Shifted,
    /// Final document assembled.
    Assembled,
    /// Links, bookmarks, and stamps attached.
    Annotated,
    /// Preview watermark applied (only when requested).
    Watermarked,
    /// Bundle split into volumes (only when over the cap).
    Split,
    /// Output bytes produced.
    Done,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Planned => "planned",
            Self::Measured => "measured",
            Self::Shifted => "shifted",
            Self::Assembled => "assembled",
            Self::Annotated => "annotated",
            Self::Watermarked => "watermarked",
            Self::Split => "split",
            Self::Done => "done",
        };
        f.write_str(name)
    }
}

/// A single progress notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProgressEvent {
    /// A pipeline stage completed.
    Stage(Stage),

    /// One source document finished resolving.
    DocumentResolved {
        /// Input index of the document.
        index: usize,
        /// Total number of documents.
        total: usize,
    },

    /// One page block was copied into the content document.
    DocumentCopied {
        /// Index of the block.
        index: usize,
        /// Total number of blocks.
        total: usize,
    },
}

/// Cooperative cancellation flag, cheap to clone and share across threads.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    inner: Arc<AtomicBool>,
}

impl CancellationToken {
    /// Create a token in the not-cancelled state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation.
    pub fn cancel(&self) {
        self.inner.store(true, Ordering::Relaxed);
    }

    /// Whether cancellation has been requested.
    pub fn is_cancelled(&self) -> bool {
        self.inner.load(Ordering::Relaxed)
    }

    /// Fail with [`BundleError::Cancelled`] if cancellation was requested.
    pub fn check(&self) -> Result<()> {
        if self.is_cancelled() {
            Err(BundleError::Cancelled)
        } else {
            Ok(())
        }
    }
}
