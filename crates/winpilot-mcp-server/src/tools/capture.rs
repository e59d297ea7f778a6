//! Capture tool implementation

use super::ToolResult;
use crate::coords;
use crate::errors::ToolError;
use crate::platform::Desktop;
use crate::requests::{CaptureRequest, ImageFormat};
use base64::Engine;
use image::codecs::jpeg::JpegEncoder;
use image::imageops::{self, FilterType};
use image::{DynamicImage, RgbaImage};
use rmcp::model::Content;
use serde_json::json;
use std::io::Cursor;

/// Size that fits inside `max_width`×`max_height` with the same aspect ratio.
///
/// Images already inside the bounds keep their size; nothing is upscaled.
pub fn fit_within(width: u32, height: u32, max_width: u32, max_height: u32) -> (u32, u32) {
    if width == 0 || height == 0 || (width <= max_width && height <= max_height) {
        return (width, height);
    }
    let scale = f64::min(
        f64::from(max_width) / f64::from(width),
        f64::from(max_height) / f64::from(height),
    );
    let w = ((f64::from(width) * scale).round() as u32).clamp(1, max_width);
    let h = ((f64::from(height) * scale).round() as u32).clamp(1, max_height);
    (w, h)
}

/// Encoded image ready to be sent
#[derive(Debug)]
pub struct EncodedImage {
    pub data: String,
    pub mime_type: &'static str,
    pub width: u32,
    pub height: u32,
}

/// Downscale and encode a captured image as base64
pub fn encode(
    pixels: RgbaImage,
    format: ImageFormat,
    quality: u8,
    max_width: u32,
    max_height: u32,
) -> Result<EncodedImage, ToolError> {
    let (width, height) = fit_within(pixels.width(), pixels.height(), max_width, max_height);
    let pixels = if (width, height) == pixels.dimensions() {
        pixels
    } else {
        imageops::resize(&pixels, width, height, FilterType::Triangle)
    };

    // Captured alpha is always opaque, so both formats are encoded as RGB
    let rgb = DynamicImage::ImageRgba8(pixels).to_rgb8();
    let mut buffer = Vec::new();
    match format {
        ImageFormat::Png => {
            rgb.write_to(&mut Cursor::new(&mut buffer), image::ImageFormat::Png)?;
        }
        ImageFormat::Jpeg => {
            JpegEncoder::new_with_quality(&mut buffer, quality).encode_image(&rgb)?;
        }
    }

    Ok(EncodedImage {
        data: base64::engine::general_purpose::STANDARD.encode(&buffer),
        mime_type: format.mime_type(),
        width,
        height,
    })
}

/// Capture the target rect and return it as an image
pub fn run<D: Desktop + ?Sized>(
    desktop: &D,
    request: CaptureRequest,
    default_class: Option<&str>,
) -> Result<ToolResult, ToolError> {
    let target = request.window_target(default_class);
    let rect = coords::rect_for(desktop, request.target, &target)?;
    let pixels = desktop.capture(rect)?;
    let encoded = encode(
        pixels,
        request.format,
        request.quality,
        request.max_width,
        request.max_height,
    )?;

    tracing::debug!(
        "Captured {:?} as {}x{} {}",
        rect,
        encoded.width,
        encoded.height,
        encoded.mime_type
    );

    let text = format!(
        "capture ok: target={} rect=({},{},{},{}) size={}x{} (x,y are normalized [0..1] within this rect)",
        request.target.as_str(),
        rect.left,
        rect.top,
        rect.right,
        rect.bottom,
        encoded.width,
        encoded.height
    );
    let metadata = json!({
        "target": request.target.as_str(),
        "rect": rect,
        "width": encoded.width,
        "height": encoded.height,
        "mimeType": encoded.mime_type,
    });

    Ok(ToolResult::new(
        vec![
            Content::text(text),
            Content::image(encoded.data, encoded.mime_type),
        ],
        metadata,
    ))
}
