//! Volume splitting and archive packaging.
//!
//! A bundle over the page cap is partitioned into contiguous page-capped
//! volumes. Each volume is produced by deleting the out-of-range pages from
//! a copy of the final document and pruning the orphaned objects, so every
//! volume is a standalone PDF. Index links whose targets fall outside their
//! volume become unresolvable; that is accepted, not fixed, since court page
//! limits trump cross-volume navigation.

use std::io::{Cursor, Write};

use lopdf::Document;
use serde::{Deserialize, Serialize};
use zip::ZipWriter;
use zip::write::SimpleFileOptions;

use crate::error::{BundleError, Result};

/// One page-capped volume of a split bundle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Volume {
    /// Sequential volume number, starting at 1.
    pub number: usize,

    /// First page of the volume, 0-based, in final-document coordinates.
    pub start_page: usize,

    /// Last page of the volume, 0-based inclusive.
    pub end_page: usize,

    /// Number of pages in the volume.
    pub page_count: usize,
}

impl Volume {
    /// File name of this volume inside the archive.
    pub fn file_name(&self) -> String {
        format!("volume_{:02}.pdf", self.number)
    }
}

/// Manifest describing a split bundle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VolumeManifest {
    /// Case identifier of the bundle.
    pub case_id: String,

    /// Volume ranges, in order.
    pub volumes: Vec<Volume>,
}

impl VolumeManifest {
    /// Render the manifest as pretty-printed JSON.
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self)
            .map_err(|e| BundleError::split_failed(format!("manifest serialization: {e}")))
    }

    /// Render the plain-text manifest included in the archive.
    pub fn render_text(&self) -> String {
        let mut out = String::new();
        out.push_str(&format!("Bundle: {}\n", self.case_id));
        out.push_str(&format!("Volumes: {}\n\n", self.volumes.len()));
        for volume in &self.volumes {
            out.push_str(&format!(
                "Volume {}: pages {}-{} ({} pages)\n",
                volume.number,
                volume.start_page + 1,
                volume.end_page + 1,
                volume.page_count
            ));
        }
        out
    }
}

/// A split bundle: the manifest plus one PDF byte buffer per volume.
#[derive(Debug)]
pub struct VolumeSet {
    /// Manifest of the volume ranges.
    pub manifest: VolumeManifest,

    /// Saved volume documents, in manifest order.
    pub documents: Vec<Vec<u8>>,
}

/// Partition `[0, total_pages)` into contiguous ranges of at most `cap`
/// pages. Returns inclusive `(start, end)` pairs.
pub fn split_ranges(total_pages: usize, cap: usize) -> Vec<(usize, usize)> {
    let mut ranges = Vec::new();
    let mut start = 0;
    while start < total_pages {
        let end = (start + cap - 1).min(total_pages - 1);
        ranges.push((start, end));
        start = end + 1;
    }
    ranges
}

/// Splitter that copies page ranges into standalone documents.
pub struct VolumeSplitter;

impl VolumeSplitter {
    /// Create a new splitter.
    pub fn new() -> Self {
        Self
    }

    /// Split the document into page-capped volumes.
    ///
    /// A document within the cap yields a single volume whose bytes are the
    /// document saved unchanged.
    ///
    /// # Errors
    ///
    /// Returns an error if the document has no pages, the cap is zero, or a
    /// volume cannot be saved.
    pub fn split(&self, document: &Document, cap: usize, case_id: &str) -> Result<VolumeSet> {
        if cap == 0 {
            return Err(BundleError::split_failed("page cap must be at least 1"));
        }

        let total_pages = document.get_pages().len();
        if total_pages == 0 {
            return Err(BundleError::split_failed("document has no pages"));
        }

        let ranges = split_ranges(total_pages, cap);
        let mut volumes = Vec::with_capacity(ranges.len());
        let mut documents = Vec::with_capacity(ranges.len());

        for (i, &(start, end)) in ranges.iter().enumerate() {
            let bytes = if ranges.len() == 1 {
                save_document(&mut document.clone())?
            } else {
                self.extract_range(document, start, end)?
            };

            volumes.push(Volume {
                number: i + 1,
                start_page: start,
                end_page: end,
                page_count: end - start + 1,
            });
            documents.push(bytes);
        }

        Ok(VolumeSet {
            manifest: VolumeManifest {
                case_id: case_id.to_string(),
                volumes,
            },
            documents,
        })
    }

    /// Copy an inclusive 0-based page range into a standalone document.
    fn extract_range(&self, document: &Document, start: usize, end: usize) -> Result<Vec<u8>> {
        let total_pages = document.get_pages().len();
        let mut volume = document.clone();

        // delete_pages works on 1-based page numbers; delete in reverse so
        // earlier numbers stay valid.
        let delete: Vec<u32> = (1..=total_pages as u32)
            .filter(|&p| {
                let index = (p - 1) as usize;
                index < start || index > end
            })
            .rev()
            .collect();
        for page_number in delete {
            volume.delete_pages(&[page_number]);
        }

        let remaining = volume.get_pages().len();
        let expected = end - start + 1;
        if remaining != expected {
            return Err(BundleError::split_failed(format!(
                "volume {start}-{end} kept {remaining} pages, expected {expected}"
            )));
        }

        volume.prune_objects();
        save_document(&mut volume)
    }
}

impl Default for VolumeSplitter {
    fn default() -> Self {
        Self::new()
    }
}

/// Save a document to bytes, compressed.
fn save_document(document: &mut Document) -> Result<Vec<u8>> {
    document.compress();
    let mut bytes = Vec::new();
    document.save_to(&mut bytes)?;
    Ok(bytes)
}

/// Package a volume set into a zip archive.
///
/// Volumes are stored uncompressed (PDF streams are already deflated); the
/// plain-text manifest is deflated.
pub fn write_archive(set: &VolumeSet) -> Result<Vec<u8>> {
    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));

    let options_stored =
        SimpleFileOptions::default().compression_method(zip::CompressionMethod::Stored);
    let options_deflated =
        SimpleFileOptions::default().compression_method(zip::CompressionMethod::Deflated);

    for (volume, bytes) in set.manifest.volumes.iter().zip(&set.documents) {
        zip.start_file(volume.file_name(), options_stored)?;
        zip.write_all(bytes)?;
    }

    zip.start_file("manifest.txt", options_deflated)?;
    zip.write_all(set.manifest.render_text().as_bytes())?;

    let cursor = zip.finish()?;
    Ok(cursor.into_inner())
}
