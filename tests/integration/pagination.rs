//! Pagination and labelling behavior across the full pipeline.

use pdfbundle::{BundleConfig, BundleOutput, Bundler, Section, SourceDocument};

use crate::common::{page_count, page_texts, sample_pdf};

#[tokio::test]
async fn test_two_sections_without_dividers() {
    // Section A (prefix "A", start 1) with a 3-page document; Section B
    // (prefix "B", start 1) with a 2-page document; the index fits on one
    // page. Final document: 6 pages.
    let sections = vec![
        Section::new("s1", "Section A", "A")
            .with_document(SourceDocument::new("d1", sample_pdf(3, "a"))),
        Section::new("s2", "Section B", "B")
            .with_document(SourceDocument::new("d2", sample_pdf(2, "b"))),
    ];
    let config = BundleConfig::new("case-1", sections);

    let output = Bundler::new().assemble(&config).await.unwrap();
    let BundleOutput::Single { pdf, statistics } = output else {
        panic!("expected a single document");
    };

    assert_eq!(page_count(&pdf), 6);
    assert_eq!(
        statistics.page_labels,
        vec!["", "A001", "A002", "A003", "B001", "B002"]
    );
}

#[tokio::test]
async fn test_page_subset_contributes_in_given_order() {
    // selected_pages = [2, 4] of a 5-page document: exactly 2 labels, in
    // the order given.
    let sections = vec![
        Section::new("s1", "Exhibits", "X").with_document(
            SourceDocument::new("d1", sample_pdf(5, "x")).with_selected_pages(vec![2, 4]),
        ),
    ];
    let config = BundleConfig::new("case-1", sections);

    let output = Bundler::new().assemble(&config).await.unwrap();
    let BundleOutput::Single { pdf, statistics } = output else {
        panic!("expected a single document");
    };

    assert_eq!(statistics.page_labels, vec!["", "X001", "X002"]);

    let texts = page_texts(&pdf);
    assert!(texts[1].contains("x page 3"));
    assert!(texts[2].contains("x page 5"));
}

#[tokio::test]
async fn test_edited_override_beats_page_subset() {
    let sections = vec![
        Section::new("s1", "Exhibits", "X").with_document(
            SourceDocument::new("d1", sample_pdf(5, "orig"))
                .with_edited(sample_pdf(2, "edited"))
                .with_selected_pages(vec![0]),
        ),
    ];
    let config = BundleConfig::new("case-1", sections);

    let output = Bundler::new().assemble(&config).await.unwrap();
    let BundleOutput::Single { pdf, statistics } = output else {
        panic!("expected a single document");
    };

    // Both pages of the edited file, subset ignored.
    assert_eq!(statistics.page_labels, vec!["", "X001", "X002"]);
    let texts = page_texts(&pdf);
    assert!(texts[1].contains("edited page 1"));
    assert!(texts[2].contains("edited page 2"));
}

#[tokio::test]
async fn test_custom_start_number_carries_through() {
    let mut section = Section::new("s1", "Continued", "A")
        .with_document(SourceDocument::new("d1", sample_pdf(2, "a")));
    section.start_number = 100;
    let config = BundleConfig::new("case-1", vec![section]);

    let output = Bundler::new().assemble(&config).await.unwrap();
    assert_eq!(
        output.statistics().page_labels,
        vec!["", "A100", "A101"]
    );
}

#[tokio::test]
async fn test_long_title_truncated_with_ellipsis() {
    let long_title = "A comprehensively detailed description of an exhibit whose title \
                      is far wider than the index column could ever accommodate";
    let sections = vec![
        Section::new("s1", "Exhibits", "X").with_document(
            SourceDocument::new("d1", sample_pdf(1, "x")).with_title(long_title),
        ),
    ];
    let config = BundleConfig::new("case-1", sections);

    let output = Bundler::new().assemble(&config).await.unwrap();
    let BundleOutput::Single { pdf, .. } = output else {
        panic!("expected a single document");
    };

    let texts = page_texts(&pdf);
    assert!(texts[0].contains("..."));
    assert!(!texts[0].contains(long_title));
}

#[tokio::test]
async fn test_large_bundle_index_overflows_to_multiple_pages() {
    // Enough documents that the index itself needs several pages; every
    // label must still line up after the shift.
    let mut section = Section::new("s1", "Exhibits", "X");
    for i in 0..120 {
        section = section.with_document(
            SourceDocument::new(format!("d{i}"), sample_pdf(1, &format!("doc{i}")))
                .with_title(format!("Exhibit {i}")),
        );
    }
    let config = BundleConfig::new("case-1", vec![section]);

    let output = Bundler::new().assemble(&config).await.unwrap();
    let stats = output.statistics();

    assert!(stats.index_pages > 1, "index should span multiple pages");
    assert_eq!(stats.content_pages, 120);
    assert_eq!(stats.total_pages, stats.index_pages + 120);

    // Labels still start right after the index pages.
    for i in 0..stats.index_pages {
        assert_eq!(stats.page_labels[i], "");
    }
    assert_eq!(stats.page_labels[stats.index_pages], "X001");
    assert_eq!(*stats.page_labels.last().unwrap(), "X120");
}

#[tokio::test]
async fn test_regeneration_is_idempotent() {
    let sections = vec![
        Section::new("s1", "Section A", "A")
            .with_divider()
            .with_document(SourceDocument::new("d1", sample_pdf(4, "a"))),
        Section::new("s2", "Section B", "B")
            .with_document(SourceDocument::new("d2", sample_pdf(3, "b"))),
    ];
    let config = BundleConfig::new("case-1", sections);
    let bundler = Bundler::new();

    let first = bundler.assemble(&config).await.unwrap();
    let second = bundler.assemble(&config).await.unwrap();

    assert_eq!(
        first.statistics().total_pages,
        second.statistics().total_pages
    );
    assert_eq!(
        first.statistics().page_labels,
        second.statistics().page_labels
    );
}
