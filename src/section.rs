//! Input data model: sections and source documents.
//!
//! A bundle is an ordered list of [`Section`]s, each holding ordered
//! [`SourceDocument`]s. Documents arrive as raw PDF bytes with up to two
//! overrides: a full replacement byte buffer (an edited copy of the file)
//! and an explicit subset of page indices. [`SourceDocument::effective_source`]
//! is the single place that resolves the precedence between them.

/// The byte source and page selection a document effectively contributes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EffectiveSource<'a> {
    /// An edited replacement file; all of its pages are used.
    Edited(&'a [u8]),
    /// The original file restricted to an explicit, ordered page subset.
    Subset(&'a [u8], &'a [usize]),
    /// The original file, all pages.
    Full(&'a [u8]),
}

/// One uploaded document inside a section.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SourceDocument {
    /// Stable identifier, used in error reporting.
    pub id: String,

    /// Original uploaded bytes.
    pub original: Vec<u8>,

    /// Edited replacement bytes, if the document was modified after upload.
    pub edited: Option<Vec<u8>>,

    /// Explicit subset of 0-based page indices to include, in the order
    /// they should appear. Applies to the original bytes only.
    pub selected_pages: Option<Vec<usize>>,

    /// Custom display title for the index row.
    pub title: Option<String>,

    /// Preformatted date string shown in the index date column.
    pub date: Option<String>,
}

impl SourceDocument {
    /// Create a document from original bytes with no overrides.
    pub fn new(id: impl Into<String>, original: Vec<u8>) -> Self {
        Self {
            id: id.into(),
            original,
            edited: None,
            selected_pages: None,
            title: None,
            date: None,
        }
    }

    /// Set the edited replacement bytes.
    pub fn with_edited(mut self, edited: Vec<u8>) -> Self {
        self.edited = Some(edited);
        self
    }

    /// Set the explicit page subset (0-based indices, order preserved).
    pub fn with_selected_pages(mut self, pages: Vec<usize>) -> Self {
        self.selected_pages = Some(pages);
        self
    }

    /// Set the display title.
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Set the date string.
    pub fn with_date(mut self, date: impl Into<String>) -> Self {
        self.date = Some(date.into());
        self
    }

    /// Resolve which bytes and which pages this document contributes.
    ///
    /// Precedence: edited bytes beat the page subset, which beats the full
    /// original. When an edited override and a page subset are both present
    /// the subset is ignored; the subset was chosen against the original
    /// file and its indices are meaningless in the edited one.
    pub fn effective_source(&self) -> EffectiveSource<'_> {
        if let Some(ref edited) = self.edited {
            return EffectiveSource::Edited(edited);
        }
        if let Some(ref pages) = self.selected_pages {
            return EffectiveSource::Subset(&self.original, pages);
        }
        EffectiveSource::Full(&self.original)
    }

    /// Title shown in the index, falling back to the document id.
    pub fn display_title(&self) -> &str {
        self.title.as_deref().unwrap_or(&self.id)
    }
}

/// A named group of documents sharing a label prefix and pagination start.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Section {
    /// Stable identifier.
    pub id: String,

    /// Display name, used for the index header row and the divider page.
    pub name: String,

    /// Ordered documents in this section.
    pub documents: Vec<SourceDocument>,

    /// Insert a divider page bearing the section name before the documents.
    pub divider: bool,

    /// Page-label prefix (letters), unique within a bundle by caller
    /// convention.
    pub prefix: String,

    /// First page number for this section's labels, usually 1.
    pub start_number: usize,
}

impl Section {
    /// Create a section with the given prefix, starting at page 1.
    pub fn new(id: impl Into<String>, name: impl Into<String>, prefix: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            documents: Vec::new(),
            divider: false,
            prefix: prefix.into(),
            start_number: 1,
        }
    }

    /// Add a document to the section.
    pub fn with_document(mut self, document: SourceDocument) -> Self {
        self.documents.push(document);
        self
    }

    /// Enable the divider page.
    pub fn with_divider(mut self) -> Self {
        self.divider = true;
        self
    }

    /// Whether this section contributes any pages or index rows at all.
    pub fn contributes(&self) -> bool {
        self.divider || !self.documents.is_empty()
    }
}
