//! Error handling across the full pipeline: every failure aborts the run
//! with a typed error and no partial output.

use pdfbundle::{
    BundleConfig, BundleError, Bundler, CancellationToken, Section, SourceDocument,
};

use crate::common::sample_pdf;

#[tokio::test]
async fn test_corrupt_document_names_the_culprit() {
    let sections = vec![
        Section::new("s1", "Section A", "A")
            .with_document(SourceDocument::new("good", sample_pdf(2, "a")))
            .with_document(SourceDocument::new("exhibit-7", b"%PDF-garbage".to_vec())),
    ];
    let config = BundleConfig::new("case-1", sections);

    let err = Bundler::new().assemble(&config).await.unwrap_err();
    assert!(err.is_input_error());
    match err {
        BundleError::UnreadableDocument { document_id, .. } => {
            assert_eq!(document_id, "exhibit-7");
        }
        other => panic!("expected UnreadableDocument, got {other:?}"),
    }
}

#[tokio::test]
async fn test_empty_subset_rejected_before_layout() {
    let sections = vec![
        Section::new("s1", "Section A", "A").with_document(
            SourceDocument::new("d1", sample_pdf(3, "a")).with_selected_pages(vec![]),
        ),
    ];
    let config = BundleConfig::new("case-1", sections);

    let err = Bundler::new().assemble(&config).await.unwrap_err();
    assert!(matches!(err, BundleError::InvalidPageSubset { .. }));
}

#[tokio::test]
async fn test_out_of_range_subset_rejected() {
    let sections = vec![
        Section::new("s1", "Section A", "A").with_document(
            SourceDocument::new("d1", sample_pdf(3, "a")).with_selected_pages(vec![0, 5]),
        ),
    ];
    let config = BundleConfig::new("case-1", sections);

    let err = Bundler::new().assemble(&config).await.unwrap_err();
    match err {
        BundleError::InvalidPageSubset { document_id, detail } => {
            assert_eq!(document_id, "d1");
            assert!(detail.contains("5"));
        }
        other => panic!("expected InvalidPageSubset, got {other:?}"),
    }
}

#[tokio::test]
async fn test_label_capacity_exceeded() {
    // Starting at 9999, a 3-page document would need labels past 10000.
    let mut section = Section::new("s1", "Section A", "A")
        .with_document(SourceDocument::new("d1", sample_pdf(3, "a")));
    section.start_number = 9_999;
    let config = BundleConfig::new("case-1", vec![section]);

    let err = Bundler::new().assemble(&config).await.unwrap_err();
    match err {
        BundleError::LabelCapacityExceeded { prefix, number } => {
            assert_eq!(prefix, "A");
            assert!(number > 9_999);
        }
        other => panic!("expected LabelCapacityExceeded, got {other:?}"),
    }
}

#[tokio::test]
async fn test_invalid_configuration_rejected() {
    let sections = vec![
        Section::new("s1", "Section A", "A")
            .with_document(SourceDocument::new("d1", sample_pdf(1, "a"))),
    ];
    let mut config = BundleConfig::new("case-1", sections);
    config.sections[0].prefix.clear();

    let err = Bundler::new().assemble(&config).await.unwrap_err();
    assert!(matches!(err, BundleError::InvalidConfig { .. }));
}

#[tokio::test]
async fn test_cancellation_aborts_without_output() {
    let sections = vec![
        Section::new("s1", "Section A", "A")
            .with_document(SourceDocument::new("d1", sample_pdf(2, "a"))),
    ];
    let config = BundleConfig::new("case-1", sections);

    let token = CancellationToken::new();
    let bundler = Bundler::with_cancellation(token.clone());
    token.cancel();

    let err = bundler.assemble(&config).await.unwrap_err();
    assert!(matches!(err, BundleError::Cancelled));
}

#[tokio::test]
async fn test_first_failure_wins_in_document_order() {
    // Two broken documents: the earlier one is reported.
    let sections = vec![
        Section::new("s1", "Section A", "A")
            .with_document(SourceDocument::new("first-bad", b"junk".to_vec()))
            .with_document(SourceDocument::new("second-bad", b"junk".to_vec())),
    ];
    let config = BundleConfig::new("case-1", sections);

    let err = Bundler::new().assemble(&config).await.unwrap_err();
    match err {
        BundleError::UnreadableDocument { document_id, .. } => {
            assert_eq!(document_id, "first-bad");
        }
        other => panic!("expected UnreadableDocument, got {other:?}"),
    }
}
