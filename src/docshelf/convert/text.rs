use super::pdf::{PdfWriter, PlacedLine, PT_PER_MM};
use super::{describe, text_pdf_filename, ConversionResult};
use tracing::debug;

const FONT_SIZE: f32 = 12.0;
const LEFT_MARGIN_MM: f32 = 15.0;
const TOP_MM: f32 = 20.0;
const BOTTOM_MM: f32 = 20.0;
const LINE_HEIGHT_MM: f32 = 7.0;
const HORIZONTAL_MARGINS_MM: f32 = 30.0;

/// Lays out plain text on A4 pages in Courier 12pt.
///
/// Fails on empty or whitespace-only input. The output filename is derived
/// from `original_filename` (`notes.txt` → `notes.pdf`).
pub fn text_to_pdf(text: &str, original_filename: &str) -> ConversionResult {
    if text.trim().is_empty() {
        return ConversionResult::failed("Cannot convert empty text to PDF");
    }

    let pages = layout_pages(text);
    let mut writer = PdfWriter::a4();
    for page in &pages {
        if let Err(e) = writer.add_text_page(page, FONT_SIZE) {
            return ConversionResult::failed(format!("Failed to create PDF: {}", describe(&e)));
        }
    }

    match writer.finish() {
        Ok(bytes) => {
            debug!(pages = pages.len(), bytes = bytes.len(), "text converted to PDF");
            ConversionResult::succeeded(bytes, text_pdf_filename(original_filename))
        }
        Err(e) => ConversionResult::failed(format!("Failed to create PDF: {}", describe(&e))),
    }
}

/// Positions wrapped lines on pages, all measurements in points from the top.
fn layout_pages(text: &str) -> Vec<Vec<PlacedLine>> {
    let page_width = super::pdf::A4_WIDTH_PT;
    let page_height = super::pdf::A4_HEIGHT_PT;
    let x = LEFT_MARGIN_MM * PT_PER_MM;
    let top = TOP_MM * PT_PER_MM;
    let bottom_limit = page_height - BOTTOM_MM * PT_PER_MM;
    let line_height = LINE_HEIGHT_MM * PT_PER_MM;
    let max_width = page_width - HORIZONTAL_MARGINS_MM * PT_PER_MM;

    let mut pages = Vec::new();
    let mut current = Vec::new();
    let mut y = top;

    for line in PdfWriter::split_text_to_size(text, max_width, FONT_SIZE) {
        if y > bottom_limit {
            pages.push(std::mem::take(&mut current));
            y = top;
        }
        current.push(PlacedLine { x, y, text: line });
        y += line_height;
    }
    pages.push(current);
    pages
}
