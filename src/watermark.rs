//! Preview watermark stamping.
//!
//! A stateless pass over every page of the assembled document: the caption
//! string is drawn once per page, rotated and semi-transparent, centered on
//! the page's own media box. The watermark has no effect on pagination,
//! labels, or link targets, so it can run after annotation without
//! disturbing anything the earlier stages computed.

use lopdf::content::{Content, Operation};
use lopdf::{Document, Object, dictionary};

use crate::config::LayoutConfig;
use crate::error::Result;
use crate::text::text_width;
use crate::utils::{add_page_resource, append_page_content, page_media_box};

/// Resource name of the watermark font.
const WATERMARK_FONT: &str = "Fwm";
/// Resource name of the watermark transparency graphics state.
const WATERMARK_GSTATE: &str = "GSwm";

/// Gray level of the watermark text.
const WATERMARK_GRAY: f32 = 0.55;

/// Stamper that overlays a diagonal translucent caption on every page.
pub struct WatermarkStamper;

impl WatermarkStamper {
    /// Create a new stamper.
    pub fn new() -> Self {
        Self
    }

    /// Draw the caption on every page of the document.
    ///
    /// # Errors
    ///
    /// Returns an error if a page's content cannot be extended.
    pub fn stamp(&self, doc: &mut Document, caption: &str, cfg: &LayoutConfig) -> Result<usize> {
        let font_id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Helvetica-Bold",
        });
        let gstate_id = doc.add_object(dictionary! {
            "Type" => "ExtGState",
            "ca" => Object::Real(cfg.watermark_alpha),
            "CA" => Object::Real(cfg.watermark_alpha),
        });

        let angle = cfg.watermark_angle_degrees.to_radians();
        let (sin, cos) = angle.sin_cos();
        let width = text_width(caption, cfg.watermark_font_size);

        let page_ids: Vec<_> = doc.get_pages().into_values().collect();
        for page_id in &page_ids {
            let [x1, y1, x2, y2] = page_media_box(doc, *page_id);
            let center_x = (x1 + x2) / 2.0;
            let center_y = (y1 + y2) / 2.0;

            // Text matrix: rotate around the text origin, then translate so
            // the run is centered on the page.
            let tx = center_x - cos * width / 2.0;
            let ty = center_y - sin * width / 2.0;

            let content = Content {
                operations: vec![
                    Operation::new("q", vec![]),
                    Operation::new("gs", vec![WATERMARK_GSTATE.into()]),
                    Operation::new(
                        "rg",
                        vec![
                            Object::Real(WATERMARK_GRAY),
                            Object::Real(WATERMARK_GRAY),
                            Object::Real(WATERMARK_GRAY),
                        ],
                    ),
                    Operation::new("BT", vec![]),
                    Operation::new(
                        "Tf",
                        vec![WATERMARK_FONT.into(), Object::Real(cfg.watermark_font_size)],
                    ),
                    Operation::new(
                        "Tm",
                        vec![
                            Object::Real(cos),
                            Object::Real(sin),
                            Object::Real(-sin),
                            Object::Real(cos),
                            Object::Real(tx),
                            Object::Real(ty),
                        ],
                    ),
                    Operation::new("Tj", vec![Object::string_literal(caption)]),
                    Operation::new("ET", vec![]),
                    Operation::new("Q", vec![]),
                ],
            };

            add_page_resource(doc, *page_id, "Font", WATERMARK_FONT, font_id)?;
            add_page_resource(doc, *page_id, "ExtGState", WATERMARK_GSTATE, gstate_id)?;
            append_page_content(doc, *page_id, &content)?;
        }

        Ok(page_ids.len())
    }
}

impl Default for WatermarkStamper {
    fn default() -> Self {
        Self::new()
    }
}
