//! Text measurement for the built-in Helvetica face.
//!
//! The index renderer and annotator never embed fonts; they rely on the
//! base-14 Helvetica family and measure text with the standard AFM advance
//! widths (thousandths of an em). Only the printable ASCII range is tabled;
//! anything else falls back to the average lowercase width, which keeps
//! truncation conservative.

/// Advance widths for Helvetica, characters 0x20..=0x7E, in 1/1000 em.
const HELVETICA_WIDTHS: [u16; 95] = [
    278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278, // ' '..'/'
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, // '0'..'9'
    278, 278, 584, 584, 584, 556, 1015, // ':'..'@'
    667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833, 722, 778, 667, // 'A'..'P'
    778, 722, 667, 611, 722, 667, 944, 667, 667, 611, // 'Q'..'Z'
    278, 278, 278, 469, 556, 333, // '['..'`'
    556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833, 556, 556, 556, // 'a'..'p'
    556, 333, 500, 278, 556, 500, 722, 500, 500, 500, // 'q'..'z'
    334, 260, 334, 584, // '{'..'~'
];

/// Fallback advance width for characters outside the tabled range.
const FALLBACK_WIDTH: u16 = 556;

/// Ellipsis appended to truncated titles.
pub const ELLIPSIS: &str = "...";

/// Advance width of a single character in 1/1000 em.
fn glyph_width(c: char) -> u16 {
    let code = c as u32;
    if (0x20..=0x7E).contains(&code) {
        HELVETICA_WIDTHS[(code - 0x20) as usize]
    } else {
        FALLBACK_WIDTH
    }
}

/// Width of a string at the given font size, in points.
pub fn text_width(text: &str, font_size: f32) -> f32 {
    let units: u32 = text.chars().map(|c| u32::from(glyph_width(c))).sum();
    units as f32 * font_size / 1000.0
}

/// Truncate a string so it fits within `max_width` points.
///
/// If the text already fits it is returned unchanged. Otherwise characters
/// are dropped from the end and [`ELLIPSIS`] is appended, such that
/// `truncated_width + ellipsis_width <= max_width`.
pub fn truncate_to_width(text: &str, max_width: f32, font_size: f32) -> String {
    if text_width(text, font_size) <= max_width {
        return text.to_string();
    }

    let ellipsis_width = text_width(ELLIPSIS, font_size);
    let budget = max_width - ellipsis_width;

    let mut kept = String::new();
    let mut width = 0.0f32;
    for c in text.chars() {
        let w = f32::from(glyph_width(c)) * font_size / 1000.0;
        if width + w > budget {
            break;
        }
        kept.push(c);
        width += w;
    }

    kept.push_str(ELLIPSIS);
    kept
}
