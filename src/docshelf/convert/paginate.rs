//! Cuts a tall rendered image into A4 pages and assembles the PDF.
//!
//! Both Word paths share this: the image is split into page-height crops
//! from the top, each crop is JPEG-encoded and placed at the top of its own
//! A4 page, scaled to the page width. The last crop keeps its natural height.

use super::pdf::{PdfWriter, A4_HEIGHT_PT, A4_WIDTH_PT};
use crate::error::{DocshelfError, Result};
use image::codecs::jpeg::JpegEncoder;
use image::imageops;
use image::RgbImage;
use tracing::debug;

/// 210mm at 96 DPI.
pub const PAGE_WIDTH_PX: u32 = 794;
/// 297mm at 96 DPI.
pub const PAGE_HEIGHT_PX: u32 = 1123;

pub fn slice_pages(image: &RgbImage, page_height: u32) -> Vec<RgbImage> {
    let page_height = page_height.max(1);
    let (width, height) = image.dimensions();
    let mut pages = Vec::new();
    let mut top = 0;
    while top < height {
        let slice_height = page_height.min(height - top);
        pages.push(imageops::crop_imm(image, 0, top, width, slice_height).to_image());
        top += slice_height;
    }
    pages
}

pub fn encode_jpeg(image: &RgbImage, quality: u8) -> Result<Vec<u8>> {
    let mut buffer = Vec::new();
    JpegEncoder::new_with_quality(&mut buffer, quality.clamp(1, 100))
        .encode_image(image)
        .map_err(|e| DocshelfError::Conversion(format!("Could not encode page image: {}", e)))?;
    Ok(buffer)
}

/// One PDF page per `page_height` slice of `image`.
pub fn image_to_pdf(image: &RgbImage, page_height: u32, quality: u8) -> Result<Vec<u8>> {
    let slices = slice_pages(image, page_height);
    if slices.is_empty() {
        return Err(DocshelfError::Conversion(
            "Rendered document is empty".to_string(),
        ));
    }

    let mut writer = PdfWriter::a4();
    for slice in &slices {
        let (width, height) = slice.dimensions();
        let draw_height = height as f32 * A4_WIDTH_PT / width as f32;
        let jpeg = encode_jpeg(slice, quality)?;
        writer.add_image_page(jpeg, width, height, A4_WIDTH_PT, draw_height.min(A4_HEIGHT_PT))?;
    }
    debug!(pages = slices.len(), "assembled rasterized PDF");
    writer.finish()
}
