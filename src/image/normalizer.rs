use crate::models::{MimeType, NormalizedPayload, UploadedImage};
use crate::{Error, Result};
use base64::Engine as _;
use image::codecs::jpeg::JpegEncoder;
use image::{DynamicImage, ImageFormat};
use std::io::Cursor;

pub const JPEG_QUALITY: u8 = 85;

/// Decode an upload and re-encode it as PNG (PNG sources) or JPEG (everything else).
pub fn normalize(upload: &UploadedImage) -> Result<NormalizedPayload> {
    let format = image::guess_format(&upload.bytes)?;
    let img = image::load_from_memory_with_format(&upload.bytes, format)?;

    let (mime_type, bytes) = if format == ImageFormat::Png {
        (MimeType::Png, encode_png(&img)?)
    } else {
        (MimeType::Jpeg, encode_jpeg(img)?)
    };

    tracing::debug!(
        "Normalized {:?} upload ({} bytes) to {} ({} bytes)",
        format,
        upload.bytes.len(),
        mime_type,
        bytes.len()
    );

    Ok(NormalizedPayload {
        mime_type,
        data: base64::engine::general_purpose::STANDARD.encode(bytes),
    })
}

/// [`normalize`] on tokio's blocking pool.
pub async fn normalize_blocking(upload: UploadedImage) -> Result<NormalizedPayload> {
    tokio::task::spawn_blocking(move || normalize(&upload))
        .await
        .map_err(|e| Error::Unexpected(format!("Image normalization task join error: {}", e)))?
}

fn encode_png(img: &DynamicImage) -> Result<Vec<u8>> {
    let mut bytes = Vec::new();
    img.write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)?;
    Ok(bytes)
}

fn encode_jpeg(img: DynamicImage) -> Result<Vec<u8>> {
    // JPEG has no alpha channel; palettes are already expanded by the decoder
    let img = match img {
        DynamicImage::ImageLuma8(_) | DynamicImage::ImageRgb8(_) => img,
        other => DynamicImage::ImageRgb8(other.to_rgb8()),
    };

    let mut bytes = Vec::new();
    img.write_with_encoder(JpegEncoder::new_with_quality(&mut bytes, JPEG_QUALITY))?;
    Ok(bytes)
}
