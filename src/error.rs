//! Error types for pdfbundle.
//!
//! All failures surface as a single [`BundleError`]. The taxonomy separates
//! problems in the caller's input (unreadable documents, bad page subsets,
//! invalid configuration) from internal assembly failures. Stage errors are
//! never retried and nothing is recovered silently: a refused bundle is
//! always preferable to a mis-assembled one.

use std::io;
use thiserror::Error;

/// Result type alias for pdfbundle operations.
pub type Result<T> = std::result::Result<T, BundleError>;

/// Main error type for bundle assembly.
#[derive(Debug, Error)]
pub enum BundleError {
    /// A source document's bytes could not be parsed as a PDF.
    #[error("Cannot read document '{document_id}': {reason}")]
    UnreadableDocument {
        /// Identifier of the document that failed to parse.
        document_id: String,
        /// Underlying parse failure.
        reason: String,
    },

    /// A document's explicit page subset is empty or out of range.
    #[error("Invalid page subset for document '{document_id}': {detail}")]
    InvalidPageSubset {
        /// Identifier of the document with the bad subset.
        document_id: String,
        /// What is wrong with the subset.
        detail: String,
    },

    /// A section grew past what the page-label field can represent.
    #[error(
        "Label capacity exceeded: section '{prefix}' reached page number {number}, \
         which cannot be represented as a page label"
    )]
    LabelCapacityExceeded {
        /// Label prefix of the offending section.
        prefix: String,
        /// First page number that no longer fits.
        number: usize,
    },

    /// The two-phase index layout did not reach a fixed point.
    #[error("Index layout did not converge after {iterations} iteration(s)")]
    LayoutNotConverged {
        /// Number of layout passes attempted.
        iterations: usize,
    },

    /// Invalid bundle configuration.
    #[error("Invalid configuration: {message}")]
    InvalidConfig {
        /// Description of what is wrong with the configuration.
        message: String,
    },

    /// Document assembly failed.
    #[error("Assembly failed: {reason}")]
    AssemblyFailed {
        /// Description of what went wrong.
        reason: String,
    },

    /// Link, bookmark, or stamp generation failed.
    #[error("Annotation failed: {reason}")]
    AnnotationFailed {
        /// Description of what went wrong.
        reason: String,
    },

    /// Volume splitting failed.
    #[error("Volume split failed: {reason}")]
    SplitFailed {
        /// Description of what went wrong.
        reason: String,
    },

    /// The volume archive could not be written.
    #[error("Failed to build volume archive: {source}")]
    ArchiveFailed {
        /// Underlying zip error.
        #[from]
        source: zip::result::ZipError,
    },

    /// The caller cancelled the assembly.
    #[error("Bundle assembly cancelled")]
    Cancelled,

    /// Low-level PDF error.
    #[error("PDF error: {0}")]
    Pdf(#[from] lopdf::Error),

    /// Generic I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

impl BundleError {
    /// Create an UnreadableDocument error.
    pub fn unreadable(document_id: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::UnreadableDocument {
            document_id: document_id.into(),
            reason: reason.into(),
        }
    }

    /// Create an InvalidPageSubset error.
    pub fn invalid_subset(document_id: impl Into<String>, detail: impl Into<String>) -> Self {
        Self::InvalidPageSubset {
            document_id: document_id.into(),
            detail: detail.into(),
        }
    }

    /// Create an InvalidConfig error.
    pub fn invalid_config(message: impl Into<String>) -> Self {
        Self::InvalidConfig {
            message: message.into(),
        }
    }

    /// Create an AssemblyFailed error.
    pub fn assembly_failed(reason: impl Into<String>) -> Self {
        Self::AssemblyFailed {
            reason: reason.into(),
        }
    }

    /// Create an AnnotationFailed error.
    pub fn annotation_failed(reason: impl Into<String>) -> Self {
        Self::AnnotationFailed {
            reason: reason.into(),
        }
    }

    /// Create a SplitFailed error.
    pub fn split_failed(reason: impl Into<String>) -> Self {
        Self::SplitFailed {
            reason: reason.into(),
        }
    }

    /// Check if this error was caused by the caller's input.
    ///
    /// Input errors are actionable by the user (fix the document, the subset,
    /// or the configuration); everything else is an internal assembly fault.
    pub fn is_input_error(&self) -> bool {
        matches!(
            self,
            Self::UnreadableDocument { .. }
                | Self::InvalidPageSubset { .. }
                | Self::LabelCapacityExceeded { .. }
                | Self::InvalidConfig { .. }
        )
    }
}
