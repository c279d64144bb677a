use super::html::has_visible_text;
use super::paginate::{image_to_pdf, PAGE_HEIGHT_PX, PAGE_WIDTH_PX};
use super::{
    describe, word_pdf_filename, Attempted, ConversionEngine, ConversionResult, DocumentRenderer,
    WordConversion,
};
use crate::error::{DocshelfError, Result};
use crate::input::FileInput;
use std::sync::Arc;
use tracing::{debug, warn};

const NO_CONTENT: &str = "No content could be extracted from the document";

impl ConversionEngine {
    /// Word → HTML body → raster → paged PDF.
    pub async fn word_to_pdf_basic(&self, file: &dyn FileInput) -> ConversionResult {
        let filename = word_pdf_filename(file.name());
        match self.run_basic(file).await {
            Ok(bytes) => ConversionResult::succeeded(bytes, filename),
            Err(e) => {
                debug!(file = file.name(), error = %e, "basic conversion failed");
                ConversionResult::failed(format!("Failed to convert document: {}", describe(&e)))
            }
        }
    }

    /// Tries the full-page renderer first and falls back to the basic path.
    pub async fn word_to_pdf_advanced(&self, file: &dyn FileInput) -> WordConversion {
        let Some(renderer) = self.renderer.clone() else {
            debug!("no advanced renderer configured, using basic conversion");
            return WordConversion {
                attempted: Attempted::Basic,
                result: self.word_to_pdf_basic(file).await,
                fallback_reason: Some("Advanced renderer is not available".to_string()),
            };
        };

        match self.run_advanced(renderer, file).await {
            Ok(bytes) => WordConversion {
                attempted: Attempted::Advanced,
                result: ConversionResult::succeeded(bytes, word_pdf_filename(file.name())),
                fallback_reason: None,
            },
            Err(e) => {
                let reason = describe(&e);
                warn!(file = file.name(), error = %reason, "advanced conversion failed, falling back to basic");
                WordConversion {
                    attempted: Attempted::Basic,
                    result: self.word_to_pdf_basic(file).await,
                    fallback_reason: Some(reason),
                }
            }
        }
    }

    async fn run_basic(&self, file: &dyn FileInput) -> Result<Vec<u8>> {
        let bytes = file.read()?;
        let extractor = Arc::clone(&self.extractor);
        let html = blocking(move || extractor.extract_html(&bytes)).await?;
        self.render_pages(html).await
    }

    async fn run_advanced(
        &self,
        renderer: Arc<dyn DocumentRenderer>,
        file: &dyn FileInput,
    ) -> Result<Vec<u8>> {
        let bytes = file.read()?;
        let html = blocking(move || renderer.render_html(&bytes)).await?;
        self.render_pages(html).await
    }

    async fn render_pages(&self, html: String) -> Result<Vec<u8>> {
        if !has_visible_text(&html) {
            return Err(DocshelfError::Conversion(NO_CONTENT.to_string()));
        }

        if !self.options.settle_delay.is_zero() {
            tokio::time::sleep(self.options.settle_delay).await;
        }

        let rasterizer = Arc::clone(&self.rasterizer);
        let quality = self.options.jpeg_quality;
        blocking(move || {
            let image = rasterizer.render(&html, PAGE_WIDTH_PX)?;
            debug!(width = image.width(), height = image.height(), "rasterized document");
            image_to_pdf(&image, PAGE_HEIGHT_PX, quality)
        })
        .await
    }
}

async fn blocking<T, F>(work: F) -> Result<T>
where
    F: FnOnce() -> Result<T> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(work)
        .await
        .map_err(|e| DocshelfError::Conversion(format!("Conversion task failed: {}", e)))?
}
