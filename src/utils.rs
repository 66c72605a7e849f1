//! Shared lopdf page helpers.
//!
//! Merged documents keep their original page dictionaries, so anything that
//! draws on an existing page has to respect two PDF realities: attributes
//! like `MediaBox` and `Resources` may be inherited from ancestor nodes in
//! the page tree, and `Contents` may be a single stream or an array.

use lopdf::content::Content;
use lopdf::{Dictionary, Document, Object, ObjectId, Stream};

use crate::error::{BundleError, Result};

/// Depth cap when walking `/Parent` links, to survive malformed trees.
const MAX_PARENT_DEPTH: usize = 10;

/// Resolve a page attribute, walking up the page tree if it is inherited.
///
/// Returns `None` when neither the page nor any ancestor carries the key.
pub fn inherited_attribute(doc: &Document, page_id: ObjectId, key: &[u8]) -> Option<Object> {
    let mut current = page_id;
    for _ in 0..MAX_PARENT_DEPTH {
        let dict = match doc.get_object(current) {
            Ok(Object::Dictionary(dict)) => dict,
            _ => return None,
        };

        if let Ok(value) = dict.get(key) {
            // Resolve one level of indirection.
            return match value {
                Object::Reference(id) => doc.get_object(*id).ok().cloned(),
                other => Some(other.clone()),
            };
        }

        match dict.get(b"Parent") {
            Ok(Object::Reference(parent)) => current = *parent,
            _ => return None,
        }
    }
    None
}

/// Media box of a page, `[x1, y1, x2, y2]` in points.
///
/// Falls back to US Letter when the box is missing or malformed.
pub fn page_media_box(doc: &Document, page_id: ObjectId) -> [f32; 4] {
    if let Some(Object::Array(arr)) = inherited_attribute(doc, page_id, b"MediaBox")
        && arr.len() == 4
    {
        let values: Vec<f32> = arr.iter().filter_map(|o| o.as_float().ok()).collect();
        if values.len() == 4 {
            return [values[0], values[1], values[2], values[3]];
        }
    }
    [0.0, 0.0, 612.0, 792.0]
}

/// Register a named resource on a page, preserving everything the page
/// already has.
///
/// The page's effective `Resources` dictionary (own or inherited) is
/// materialized as a direct dictionary on the page, so inheritance is never
/// silently lost, and the new entry is merged into the given category
/// (`Font`, `ExtGState`, ...).
pub fn add_page_resource(
    doc: &mut Document,
    page_id: ObjectId,
    category: &str,
    name: &str,
    resource_id: ObjectId,
) -> Result<()> {
    let mut resources = match inherited_attribute(doc, page_id, b"Resources") {
        Some(Object::Dictionary(dict)) => dict,
        _ => Dictionary::new(),
    };

    let mut entries = match resources.get(category.as_bytes()) {
        Ok(Object::Dictionary(dict)) => dict.clone(),
        Ok(Object::Reference(id)) => match doc.get_object(*id) {
            Ok(Object::Dictionary(dict)) => dict.clone(),
            _ => Dictionary::new(),
        },
        _ => Dictionary::new(),
    };
    entries.set(name, Object::Reference(resource_id));
    resources.set(category, Object::Dictionary(entries));

    match doc.get_object_mut(page_id)? {
        Object::Dictionary(page_dict) => {
            page_dict.set("Resources", Object::Dictionary(resources));
            Ok(())
        }
        _ => Err(BundleError::annotation_failed(
            "page object is not a dictionary",
        )),
    }
}

/// Append a content stream to a page, after its existing content.
pub fn append_page_content(doc: &mut Document, page_id: ObjectId, content: &Content) -> Result<()> {
    let encoded = content.encode()?;
    let content_id = doc.add_object(Stream::new(Dictionary::new(), encoded));

    let page = doc.get_object_mut(page_id)?;
    let Object::Dictionary(dict) = page else {
        return Err(BundleError::annotation_failed(
            "page object is not a dictionary",
        ));
    };

    let existing = dict.get(b"Contents").ok().cloned();
    match existing {
        Some(Object::Reference(existing_id)) => {
            dict.set(
                "Contents",
                Object::Array(vec![
                    Object::Reference(existing_id),
                    Object::Reference(content_id),
                ]),
            );
        }
        Some(Object::Array(mut arr)) => {
            arr.push(Object::Reference(content_id));
            dict.set("Contents", Object::Array(arr));
        }
        _ => {
            dict.set("Contents", Object::Reference(content_id));
        }
    }

    Ok(())
}

/// Set the output document's Info dictionary.
///
/// The title (the case caption, when present) and a Producer entry are
/// written; an existing Info dictionary is updated in place.
pub fn set_document_info(doc: &mut Document, title: Option<&str>) -> Result<()> {
    let info_id = if let Ok(id) = doc.trailer.get(b"Info").and_then(Object::as_reference) {
        id
    } else {
        let id = doc.new_object_id();
        doc.objects.insert(id, Object::Dictionary(Dictionary::new()));
        doc.trailer.set("Info", Object::Reference(id));
        id
    };

    if !matches!(doc.get_object(info_id), Ok(Object::Dictionary(_))) {
        doc.objects.insert(info_id, Object::Dictionary(Dictionary::new()));
    }
    let Ok(Object::Dictionary(dict)) = doc.get_object_mut(info_id) else {
        return Err(BundleError::assembly_failed(
            "Info object is not a dictionary",
        ));
    };

    if let Some(title) = title {
        dict.set("Title", Object::string_literal(title));
    }
    dict.set(
        "Producer",
        Object::string_literal(concat!("pdfbundle ", env!("CARGO_PKG_VERSION"))),
    );
    Ok(())
}

/// Append an annotation reference to a page's `/Annots` array.
pub fn append_page_annotation(
    doc: &mut Document,
    page_id: ObjectId,
    annotation_id: ObjectId,
) -> Result<()> {
    let existing = match doc.get_object(page_id)? {
        Object::Dictionary(dict) => dict.get(b"Annots").ok().cloned(),
        _ => {
            return Err(BundleError::annotation_failed(
                "page object is not a dictionary",
            ));
        }
    };

    let annots = match existing {
        Some(Object::Array(mut arr)) => {
            arr.push(Object::Reference(annotation_id));
            arr
        }
        Some(Object::Reference(id)) => {
            let mut arr = doc.get_object(id)?.as_array()?.clone();
            arr.push(Object::Reference(annotation_id));
            arr
        }
        _ => vec![Object::Reference(annotation_id)],
    };

    match doc.get_object_mut(page_id)? {
        Object::Dictionary(dict) => {
            dict.set("Annots", Object::Array(annots));
            Ok(())
        }
        _ => Err(BundleError::annotation_failed(
            "page object is not a dictionary",
        )),
    }
}
