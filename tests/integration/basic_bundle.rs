//! End-to-end assembly of a realistic small bundle.

use lopdf::{Document, Object};
use pdfbundle::{
    BundleConfig, BundleMetadata, BundleOutput, Bundler, Section, SourceDocument,
};

use crate::common::{page_texts, sample_pdf};

fn realistic_config() -> BundleConfig {
    let sections = vec![
        Section::new("s1", "Statements of Case", "A")
            .with_divider()
            .with_document(
                SourceDocument::new("claim", sample_pdf(3, "claim"))
                    .with_title("Claim form")
                    .with_date("01/02/2025"),
            )
            .with_document(
                SourceDocument::new("defence", sample_pdf(2, "defence")).with_title("Defence"),
            ),
        Section::new("s2", "Correspondence", "B").with_document(
            SourceDocument::new("letter", sample_pdf(1, "letter"))
                .with_title("Letter before action"),
        ),
    ];

    let mut config = BundleConfig::new("smith-v-jones", sections);
    config.metadata = BundleMetadata {
        case_caption: "Smith v. Jones".to_string(),
        court: Some("High Court of Justice".to_string()),
        date: Some("12 March 2025".to_string()),
        parties: vec![
            "Claimant: John Smith".to_string(),
            "Defendant: Mary Jones".to_string(),
        ],
    };
    config
}

#[tokio::test]
async fn test_full_bundle_structure() {
    let output = Bundler::new().assemble(&realistic_config()).await.unwrap();

    let BundleOutput::Single { pdf, statistics } = output else {
        panic!("expected a single document");
    };

    // 1 divider + 3 + 2 + 1 content pages, plus the index.
    assert_eq!(statistics.content_pages, 7);
    assert_eq!(statistics.index_pages, 1);
    assert_eq!(statistics.total_pages, 8);
    assert_eq!(
        statistics.page_labels,
        vec!["", "A001", "A002", "A003", "A004", "A005", "A006", "B001"]
    );

    let texts = page_texts(&pdf);
    assert_eq!(texts.len(), 8);

    // Index first, with caption and rows.
    assert!(texts[0].contains("Smith v. Jones"));
    assert!(texts[0].contains("INDEX"));
    assert!(texts[0].contains("Claim form"));
    assert!(texts[0].contains("A002-A004"));

    // Divider page bears the section name, then content in order.
    assert!(texts[1].contains("Statements of Case"));
    assert!(texts[2].contains("claim page 1"));
    assert!(texts[6].contains("defence page 2"));
    assert!(texts[7].contains("letter page 1"));

    // The caption lands in the document Info dictionary.
    let doc = Document::load_mem(&pdf).unwrap();
    let info_id = doc.trailer.get(b"Info").unwrap().as_reference().unwrap();
    let info = doc.get_object(info_id).unwrap().as_dict().unwrap();
    assert_eq!(
        info.get(b"Title").unwrap().as_str().unwrap(),
        b"Smith v. Jones"
    );
}

#[tokio::test]
async fn test_bundle_has_clickable_index_links() {
    let output = Bundler::new().assemble(&realistic_config()).await.unwrap();
    let BundleOutput::Single { pdf, statistics } = output else {
        panic!("expected a single document");
    };

    let doc = Document::load_mem(&pdf).unwrap();
    let page_ids: Vec<_> = doc.get_pages().into_values().collect();

    let index_page = doc.get_object(page_ids[0]).unwrap().as_dict().unwrap();
    let annots = index_page.get(b"Annots").unwrap().as_array().unwrap();

    // One link per index row: 2 section headers + 3 documents.
    assert_eq!(annots.len(), 5);
    assert_eq!(statistics.links_added, 5);

    for annot_ref in annots {
        let annot = doc
            .get_object(annot_ref.as_reference().unwrap())
            .unwrap()
            .as_dict()
            .unwrap();
        assert_eq!(annot.get(b"Subtype").unwrap().as_name().unwrap(), b"Link");

        let dest = annot.get(b"Dest").unwrap().as_array().unwrap();
        let target = dest[0].as_reference().unwrap();
        assert!(page_ids.contains(&target));
    }
}

#[tokio::test]
async fn test_bundle_has_bookmark_tree() {
    let output = Bundler::new().assemble(&realistic_config()).await.unwrap();
    let BundleOutput::Single { pdf, statistics } = output else {
        panic!("expected a single document");
    };

    // "Index" + 2 section headers + 3 documents.
    assert_eq!(statistics.bookmarks_added, 6);

    let doc = Document::load_mem(&pdf).unwrap();
    let catalog = doc.catalog().unwrap();
    let outline_id = catalog.get(b"Outlines").unwrap().as_reference().unwrap();
    let outline = doc.get_object(outline_id).unwrap().as_dict().unwrap();
    assert_eq!(outline.get(b"Count").unwrap().as_i64().unwrap(), 6);

    // Flat chain: no node has children.
    let mut current = outline.get(b"First").unwrap().as_reference().unwrap();
    loop {
        let node = doc.get_object(current).unwrap().as_dict().unwrap();
        assert!(!node.has(b"First"));
        match node.get(b"Next") {
            Ok(Object::Reference(next)) => current = *next,
            _ => break,
        }
    }
}

#[tokio::test]
async fn test_bundle_stamps_content_pages_only() {
    let output = Bundler::new().assemble(&realistic_config()).await.unwrap();
    let BundleOutput::Single { pdf, statistics } = output else {
        panic!("expected a single document");
    };

    assert_eq!(statistics.stamps_added, 7);

    let texts = page_texts(&pdf);
    // The divider page is a content page and carries its label.
    assert!(texts[1].contains("A001"));
    assert!(texts[7].contains("B001"));
}

#[tokio::test]
async fn test_output_round_trips_through_disk() {
    let output = Bundler::new().assemble(&realistic_config()).await.unwrap();
    let BundleOutput::Single { pdf, statistics } = output else {
        panic!("expected a single document");
    };

    let dir = tempfile::TempDir::new().unwrap();
    let path = dir.path().join("bundle.pdf");
    std::fs::write(&path, &pdf).unwrap();

    let reloaded = Document::load(&path).unwrap();
    assert_eq!(reloaded.get_pages().len(), statistics.total_pages);
}

#[tokio::test]
async fn test_watermarked_preview_output() {
    let mut config = realistic_config();
    config.watermark = true;

    let output = Bundler::new().assemble(&config).await.unwrap();
    let BundleOutput::Single { pdf, statistics } = output else {
        panic!("expected a single document");
    };

    assert_eq!(statistics.total_pages, 8);
    for text in page_texts(&pdf) {
        assert!(text.contains("PREVIEW"));
    }
}
