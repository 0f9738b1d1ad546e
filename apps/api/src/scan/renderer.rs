//! Document Renderer — rasterizes the first page of an uploaded document
//! into a single JPEG suitable for the multimodal inference request.
//!
//! Only the first page is rendered; later pages are intentionally ignored.
//! pdfium is not async-safe, so callers must run `render_first_page` on the
//! blocking pool (`tokio::task::spawn_blocking`).

use std::io::Cursor;

use anyhow::anyhow;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use image::ImageFormat;
use pdfium_render::prelude::*;

use crate::errors::AppError;

/// Target pixel width of the rendered page. Roughly 150 dpi for A4/letter —
/// enough for the model to read body text without inflating the payload.
const RENDER_TARGET_WIDTH: i32 = 1240;
const RENDER_MAX_HEIGHT: i32 = 1754;

/// A single encoded page image, base64-wrapped for the inference request
/// body. Request-scoped; discarded after the inference call.
#[derive(Debug, Clone)]
pub struct RenderedPage {
    pub mime_type: String,
    /// Base64-encoded JPEG bytes.
    pub data: String,
}

/// Renders the first page of `bytes` as a base64 JPEG.
///
/// Fails with `EmptyInput` when no bytes were supplied and
/// `UnsupportedDocument` when the bytes cannot be decoded as a paginated
/// document or contain zero pages. No filesystem side effects.
pub fn render_first_page(bytes: &[u8]) -> Result<RenderedPage, AppError> {
    if bytes.is_empty() {
        return Err(AppError::EmptyInput);
    }

    let bindings = Pdfium::bind_to_system_library()
        .map_err(|e| AppError::Internal(anyhow!("pdfium library unavailable: {e}")))?;
    let pdfium = Pdfium::new(bindings);

    let document = pdfium
        .load_pdf_from_byte_slice(bytes, None)
        .map_err(|e| AppError::UnsupportedDocument(format!("not a readable document: {e}")))?;

    let page = document.pages().first().map_err(|_| {
        AppError::UnsupportedDocument("document contains no pages".to_string())
    })?;

    let render_config = PdfRenderConfig::new()
        .set_target_width(RENDER_TARGET_WIDTH)
        .set_maximum_height(RENDER_MAX_HEIGHT);

    let bitmap = page
        .render_with_config(&render_config)
        .map_err(|e| AppError::UnsupportedDocument(format!("page could not be rendered: {e}")))?;

    // JPEG has no alpha channel; flatten before encoding.
    let image = bitmap.as_image().into_rgb8();

    let mut encoded = Cursor::new(Vec::new());
    image
        .write_to(&mut encoded, ImageFormat::Jpeg)
        .map_err(|e| AppError::Internal(anyhow!("JPEG encoding failed: {e}")))?;

    Ok(RenderedPage {
        mime_type: "image/jpeg".to_string(),
        data: STANDARD.encode(encoded.into_inner()),
    })
}
