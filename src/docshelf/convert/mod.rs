//! # Conversion Engine
//!
//! Turns stored Word documents and plain text into PDF bytes.
//!
//! ## Paths
//!
//! - **Text** ([`text::text_to_pdf`]): lays out Courier text directly on A4
//!   pages. Synchronous.
//! - **Word, basic**: DOCX → HTML ([`HtmlExtractor`]) → raster image
//!   ([`Rasterizer`]) → JPEG page slices → PDF.
//! - **Word, advanced**: same pipeline, but the HTML comes from a
//!   [`DocumentRenderer`] that also keeps headers, footers and footnotes. Any
//!   failure falls back to the basic path, and the outcome records which path
//!   actually produced the result ([`Attempted`]).
//!
//! ## Failures
//!
//! Conversion failures are data, not errors: every path returns a
//! [`ConversionResult`] with `success: false` and a message. Nothing is
//! partially written.
//!
//! ## Threading
//!
//! Extraction, rasterization and PDF assembly are CPU-bound and run on the
//! tokio blocking pool. The capabilities are therefore `Send + Sync` and
//! shared through `Arc`.

use crate::config::ShelfConfig;
use crate::error::{DocshelfError, Result};
use crate::input::FileInput;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

pub mod docx;
pub mod html;
pub mod paginate;
pub mod pdf;
pub mod raster;
pub mod text;
mod word;

pub use docx::{DocxHtmlExtractor, DocxRenderer};
pub use raster::{BitmapRasterizer, RasterImage, StyleSheet};
pub use text::text_to_pdf;

/// Which Word conversion pipeline to request.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Quality {
    Basic,
    #[default]
    Advanced,
}

impl fmt::Display for Quality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Quality::Basic => f.write_str("basic"),
            Quality::Advanced => f.write_str("advanced"),
        }
    }
}

impl FromStr for Quality {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "basic" => Ok(Quality::Basic),
            "advanced" => Ok(Quality::Advanced),
            other => Err(format!(
                "Unknown quality: {} (expected basic or advanced)",
                other
            )),
        }
    }
}

/// Outcome of a single conversion.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConversionResult {
    pub success: bool,
    pub data: Option<Vec<u8>>,
    pub filename: Option<String>,
    pub error: Option<String>,
}

impl ConversionResult {
    pub fn succeeded(data: Vec<u8>, filename: impl Into<String>) -> Self {
        Self {
            success: true,
            data: Some(data),
            filename: Some(filename.into()),
            error: None,
        }
    }

    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            filename: None,
            error: Some(error.into()),
        }
    }

    /// The PDF bytes and filename, or the failure as a [`DocshelfError::Conversion`].
    pub fn into_output(self) -> Result<(Vec<u8>, String)> {
        match (self.success, self.data, self.filename) {
            (true, Some(data), Some(filename)) => Ok((data, filename)),
            _ => Err(DocshelfError::Conversion(
                self.error
                    .unwrap_or_else(|| "Conversion produced no output".to_string()),
            )),
        }
    }
}

/// The pipeline that produced a Word conversion result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Attempted {
    Advanced,
    Basic,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WordConversion {
    pub attempted: Attempted,
    pub result: ConversionResult,
    /// Why the advanced pipeline was not used, when it was requested
    pub fallback_reason: Option<String>,
}

/// Extracts body HTML from DOCX bytes.
pub trait HtmlExtractor: Send + Sync {
    fn extract_html(&self, docx: &[u8]) -> Result<String>;
}

/// Renders DOCX bytes to HTML including headers, footers and footnotes.
pub trait DocumentRenderer: Send + Sync {
    fn render_html(&self, docx: &[u8]) -> Result<String>;
}

/// Lays out HTML at a fixed pixel width and draws it into one tall image.
pub trait Rasterizer: Send + Sync {
    fn render(&self, html: &str, width_px: u32) -> Result<RasterImage>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConverterOptions {
    /// Pause between producing HTML and rasterizing it
    pub settle_delay: Duration,
    pub jpeg_quality: u8,
}

impl Default for ConverterOptions {
    fn default() -> Self {
        Self {
            settle_delay: Duration::from_millis(100),
            jpeg_quality: 85,
        }
    }
}

impl From<&ShelfConfig> for ConverterOptions {
    fn from(config: &ShelfConfig) -> Self {
        Self {
            settle_delay: Duration::from_millis(config.settle_delay_ms),
            jpeg_quality: config.jpeg_quality.clamp(1, 100),
        }
    }
}

/// Holds the conversion capabilities and options.
///
/// The default engine uses the DOCX extractor and renderer from [`docx`] and
/// the bitmap rasterizer from [`raster`]. Tests swap individual capabilities
/// with the `with_*` builders.
#[derive(Clone)]
pub struct ConversionEngine {
    extractor: Arc<dyn HtmlExtractor>,
    renderer: Option<Arc<dyn DocumentRenderer>>,
    rasterizer: Arc<dyn Rasterizer>,
    options: ConverterOptions,
}

impl Default for ConversionEngine {
    fn default() -> Self {
        Self::new(ConverterOptions::default())
    }
}

impl ConversionEngine {
    pub fn new(options: ConverterOptions) -> Self {
        Self {
            extractor: Arc::new(DocxHtmlExtractor),
            renderer: Some(Arc::new(DocxRenderer)),
            rasterizer: Arc::new(BitmapRasterizer::default()),
            options,
        }
    }

    pub fn from_config(config: &ShelfConfig) -> Self {
        let engine = Self::new(ConverterOptions::from(config));
        if config.advanced_renderer {
            engine
        } else {
            engine.with_renderer(None)
        }
    }

    pub fn with_extractor(mut self, extractor: Arc<dyn HtmlExtractor>) -> Self {
        self.extractor = extractor;
        self
    }

    pub fn with_renderer(mut self, renderer: Option<Arc<dyn DocumentRenderer>>) -> Self {
        self.renderer = renderer;
        self
    }

    pub fn with_rasterizer(mut self, rasterizer: Arc<dyn Rasterizer>) -> Self {
        self.rasterizer = rasterizer;
        self
    }

    pub fn options(&self) -> &ConverterOptions {
        &self.options
    }

    pub fn has_renderer(&self) -> bool {
        self.renderer.is_some()
    }

    pub fn text_to_pdf(&self, text: &str, original_filename: &str) -> ConversionResult {
        text::text_to_pdf(text, original_filename)
    }

    /// Converts a Word file with the requested pipeline.
    pub async fn convert_word(&self, file: &dyn FileInput, quality: Quality) -> WordConversion {
        match quality {
            Quality::Basic => WordConversion {
                attempted: Attempted::Basic,
                result: self.word_to_pdf_basic(file).await,
                fallback_reason: None,
            },
            Quality::Advanced => self.word_to_pdf_advanced(file).await,
        }
    }
}

/// `report.docx` → `report.pdf`; names without a Word extension get `.pdf` appended.
pub fn word_pdf_filename(name: &str) -> String {
    replace_extension(name, &[".docx", ".doc"])
}

/// `notes.txt` → `notes.pdf`; names without `.txt` get `.pdf` appended.
pub fn text_pdf_filename(name: &str) -> String {
    replace_extension(name, &[".txt"])
}

fn replace_extension(name: &str, extensions: &[&str]) -> String {
    let lower = name.to_ascii_lowercase();
    for ext in extensions {
        if lower.ends_with(ext) && name.is_char_boundary(name.len() - ext.len()) {
            return format!("{}.pdf", &name[..name.len() - ext.len()]);
        }
    }
    format!("{}.pdf", name)
}

/// Message for a failed step, without the error-kind prefix.
pub(crate) fn describe(err: &DocshelfError) -> String {
    match err {
        DocshelfError::Conversion(msg) => msg.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn word_filenames() {
        assert_eq!(word_pdf_filename("Report.docx"), "Report.pdf");
        assert_eq!(word_pdf_filename("OLD.DOC"), "OLD.pdf");
        assert_eq!(word_pdf_filename("Minutes"), "Minutes.pdf");
        assert_eq!(word_pdf_filename("a.docx.bak"), "a.docx.bak.pdf");
    }

    #[test]
    fn text_filenames() {
        assert_eq!(text_pdf_filename("notes.txt"), "notes.pdf");
        assert_eq!(text_pdf_filename("NOTES.TXT"), "NOTES.pdf");
        assert_eq!(text_pdf_filename("My Notes"), "My Notes.pdf");
    }

    #[test]
    fn quality_parses_and_displays() {
        assert_eq!("Basic".parse::<Quality>().unwrap(), Quality::Basic);
        assert_eq!(Quality::default(), Quality::Advanced);
        assert_eq!(Quality::Advanced.to_string(), "advanced");
        assert!("best".parse::<Quality>().is_err());
    }

    #[test]
    fn failed_result_maps_to_conversion_error() {
        let err = ConversionResult::failed("boom").into_output().unwrap_err();
        assert!(matches!(err, DocshelfError::Conversion(ref m) if m == "boom"));

        let (data, name) = ConversionResult::succeeded(vec![1], "a.pdf")
            .into_output()
            .unwrap();
        assert_eq!((data, name.as_str()), (vec![1], "a.pdf"));
    }

    #[test]
    fn options_follow_config() {
        let mut config = ShelfConfig::default();
        config.settle_delay_ms = 0;
        config.jpeg_quality = 50;
        config.advanced_renderer = false;

        let engine = ConversionEngine::from_config(&config);
        assert_eq!(engine.options().settle_delay, Duration::ZERO);
        assert_eq!(engine.options().jpeg_quality, 50);
        assert!(!engine.has_renderer());
    }
}
