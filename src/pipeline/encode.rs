//! Image encoding for the OCR engines.
//!
//! Both engines take PNG: tesseract reads it from a scratch file, the vision
//! backend receives it base64-wrapped in an `ImageData`. PNG is lossless, so
//! the glyph edges the OCR engine sees are exactly what pdfium rendered.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use edgequake_llm::ImageData;
use image::DynamicImage;
use std::io::Cursor;
use tracing::debug;

/// Encode an image as PNG bytes.
pub fn encode_png(img: &DynamicImage) -> Result<Vec<u8>, image::ImageError> {
    let mut buf = Vec::new();
    img.write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)?;
    debug!(
        "Encoded {}x{} page → {} bytes PNG",
        img.width(),
        img.height(),
        buf.len()
    );
    Ok(buf)
}

/// Encode a page as a base64 PNG ready for a multimodal API.
///
/// `detail: "high"` keeps fine print (grade tables, footnotes) legible to
/// models that tile large images.
pub fn encode_page(img: &DynamicImage) -> Result<ImageData, image::ImageError> {
    let b64 = STANDARD.encode(encode_png(img)?);
    Ok(ImageData::new(b64, "image/png").with_detail("high"))
}
