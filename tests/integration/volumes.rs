//! Volume splitting and archive packaging across the full pipeline.

use std::io::{Cursor, Read};

use pdfbundle::{BundleConfig, BundleOutput, Bundler, Section, SourceDocument};

use crate::common::{page_count, page_texts, sample_pdf};

/// One section whose content yields a 400-page final document (399 content
/// pages plus one index page).
fn oversized_config() -> BundleConfig {
    let sections = vec![
        Section::new("s1", "Section A", "A")
            .with_document(SourceDocument::new("d1", sample_pdf(399, "a"))),
    ];
    BundleConfig::new("big-case", sections)
}

#[tokio::test]
async fn test_default_cap_splits_400_pages_into_two_volumes() {
    let output = Bundler::new().assemble(&oversized_config()).await.unwrap();

    let BundleOutput::Volumes {
        manifest,
        statistics,
        ..
    } = output
    else {
        panic!("expected volumes");
    };

    assert_eq!(statistics.total_pages, 400);
    assert_eq!(manifest.case_id, "big-case");
    assert_eq!(manifest.volumes.len(), 2);

    assert_eq!(manifest.volumes[0].start_page, 0);
    assert_eq!(manifest.volumes[0].end_page, 349);
    assert_eq!(manifest.volumes[0].page_count, 350);

    assert_eq!(manifest.volumes[1].start_page, 350);
    assert_eq!(manifest.volumes[1].end_page, 399);
    assert_eq!(manifest.volumes[1].page_count, 50);

    let total: usize = manifest.volumes.iter().map(|v| v.page_count).sum();
    assert_eq!(total, statistics.total_pages);
}

#[tokio::test]
async fn test_archive_contains_volume_pdfs_and_manifest() {
    let output = Bundler::new().assemble(&oversized_config()).await.unwrap();
    let BundleOutput::Volumes {
        archive, manifest, ..
    } = output
    else {
        panic!("expected volumes");
    };

    let mut zip = zip::ZipArchive::new(Cursor::new(archive)).unwrap();
    let names: Vec<String> = (0..zip.len())
        .map(|i| zip.by_index(i).unwrap().name().to_string())
        .collect();
    assert_eq!(
        names,
        vec!["volume_01.pdf", "volume_02.pdf", "manifest.txt"]
    );

    // Each archived volume is a standalone PDF of the manifested size.
    for (i, volume) in manifest.volumes.iter().enumerate() {
        let mut bytes = Vec::new();
        zip.by_index(i).unwrap().read_to_end(&mut bytes).unwrap();
        assert_eq!(page_count(&bytes), volume.page_count);
    }

    let mut manifest_text = String::new();
    zip.by_name("manifest.txt")
        .unwrap()
        .read_to_string(&mut manifest_text)
        .unwrap();
    assert!(manifest_text.contains("Bundle: big-case"));
    assert!(manifest_text.contains("Volume 1: pages 1-350 (350 pages)"));
    assert!(manifest_text.contains("Volume 2: pages 351-400 (50 pages)"));
}

#[tokio::test]
async fn test_volume_concatenation_reproduces_page_sequence() {
    let sections = vec![
        Section::new("s1", "Section A", "A")
            .with_document(SourceDocument::new("d1", sample_pdf(9, "a"))),
    ];
    let mut config = BundleConfig::new("case-1", sections);
    config.volume_page_cap = 4;

    let output = Bundler::new().assemble(&config).await.unwrap();
    let BundleOutput::Volumes { archive, manifest, .. } = output else {
        panic!("expected volumes");
    };

    // 10 final pages with cap 4: volumes of 4, 4, and 2 pages.
    let counts: Vec<usize> = manifest.volumes.iter().map(|v| v.page_count).collect();
    assert_eq!(counts, vec![4, 4, 2]);

    let mut zip = zip::ZipArchive::new(Cursor::new(archive)).unwrap();
    let mut texts = Vec::new();
    for i in 0..manifest.volumes.len() {
        let mut bytes = Vec::new();
        zip.by_index(i).unwrap().read_to_end(&mut bytes).unwrap();
        texts.extend(page_texts(&bytes));
    }

    assert_eq!(texts.len(), 10);
    // Page 0 is the index; content pages follow in original order.
    assert!(texts[0].contains("INDEX"));
    for (i, text) in texts.iter().skip(1).enumerate() {
        assert!(
            text.contains(&format!("a page {}", i + 1)),
            "volume concatenation reordered page {i}"
        );
    }
}

#[tokio::test]
async fn test_bundle_at_cap_is_not_split() {
    let sections = vec![
        Section::new("s1", "Section A", "A")
            .with_document(SourceDocument::new("d1", sample_pdf(9, "a"))),
    ];
    let mut config = BundleConfig::new("case-1", sections);
    config.volume_page_cap = 10;

    let output = Bundler::new().assemble(&config).await.unwrap();
    assert!(matches!(output, BundleOutput::Single { .. }));
    assert_eq!(output.statistics().volumes, 1);
}
