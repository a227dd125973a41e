//! Cosmetic post-processing: downsizing and watermark overlays.
//!
//! All transforms here are pure functions over encoded image bytes: decode,
//! transform, re-encode, return new bytes. Nothing is written to disk and
//! nothing is retried; callers decide what to do with the result.

use std::io::Cursor;
use std::path::PathBuf;

use ab_glyph::{FontVec, PxScale};
use image::imageops::FilterType;
use image::{DynamicImage, ImageFormat, Rgba, RgbaImage};
use imageproc::drawing::{draw_text_mut, text_size};
use qrcode::{Color as QrColor, QrCode};

use crate::error::CoreError;
use crate::types::ImageArtifact;

/// Default maximum output dimension. A 4000x3000 input becomes 2560x1920.
pub const DEFAULT_MAX_DIM: u32 = 2560;

/// Fixed distance in pixels between an overlay and the image edge.
pub const PADDING_PX: u32 = 16;

/// Default text label height in pixels.
pub const DEFAULT_TEXT_PX: f32 = 32.0;

/// Default label opacity.
pub const DEFAULT_OPACITY: f32 = 0.5;

/// Default edge length of one QR module in pixels.
pub const DEFAULT_QR_MODULE_PX: u32 = 4;

/// Corner an overlay is anchored to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Anchor {
    TopLeft,
    TopRight,
    BottomLeft,
    BottomRight,
}

/// Translucent text label configuration.
#[derive(Debug, Clone)]
pub struct TextLabel {
    pub text: String,
    /// Path to a TTF/OTF font file. A missing file is an IO error surfaced
    /// to the caller; we never fall back to a bundled font.
    pub font_path: PathBuf,
    /// Glyph height in pixels.
    pub px_height: f32,
    /// Blend factor in `[0, 1]`.
    pub opacity: f32,
    /// Label color (alpha comes from `opacity`).
    pub color: [u8; 3],
    pub anchor: Anchor,
}

impl TextLabel {
    pub fn new(text: impl Into<String>, font_path: impl Into<PathBuf>) -> Self {
        Self {
            text: text.into(),
            font_path: font_path.into(),
            px_height: DEFAULT_TEXT_PX,
            opacity: DEFAULT_OPACITY,
            color: [255, 255, 255],
            anchor: Anchor::BottomRight,
        }
    }
}

/// QR code tile configuration.
#[derive(Debug, Clone)]
pub struct QrTag {
    /// Content encoded into the QR code, typically a URL.
    pub url: String,
    /// Edge length of one QR module in pixels.
    pub module_px: u32,
    pub anchor: Anchor,
}

impl QrTag {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            module_px: DEFAULT_QR_MODULE_PX,
            anchor: Anchor::BottomLeft,
        }
    }
}

/// What to stamp onto a generated image.
///
/// An empty spec makes [`apply_watermark`] the identity function.
#[derive(Debug, Clone, Default)]
pub struct WatermarkSpec {
    pub text: Option<TextLabel>,
    pub qr: Option<QrTag>,
}

impl WatermarkSpec {
    pub fn is_empty(&self) -> bool {
        self.text.is_none() && self.qr.is_none()
    }
}

/// Downsize an image so neither dimension exceeds `max_dim`.
///
/// Images already within bounds are returned byte-identical. Oversized
/// images are scaled by `min(max_dim/width, max_dim/height)` so that
/// exactly one output dimension equals `max_dim` and the aspect ratio is
/// preserved within rounding. Output is re-encoded as PNG.
pub fn resize_to_max(bytes: &[u8], max_dim: u32) -> Result<ImageArtifact, CoreError> {
    let img = image::load_from_memory(bytes)?;
    let (w, h) = (img.width(), img.height());

    if w <= max_dim && h <= max_dim {
        return Ok(ImageArtifact::new(bytes.to_vec(), w, h));
    }

    // Scale the longer edge to exactly max_dim.
    let (new_w, new_h) = if w >= h {
        let new_h = ((h as f64) * (max_dim as f64) / (w as f64)).round() as u32;
        (max_dim, new_h.max(1))
    } else {
        let new_w = ((w as f64) * (max_dim as f64) / (h as f64)).round() as u32;
        (new_w.max(1), max_dim)
    };

    let resized = img.resize_exact(new_w, new_h, FilterType::Lanczos3);
    Ok(ImageArtifact::new(encode_png(&resized)?, new_w, new_h))
}

/// Stamp the configured text label and/or QR tile onto an image.
///
/// With an empty spec the input bytes are returned unchanged, so repeated
/// application with identical inputs is idempotent.
pub fn apply_watermark(bytes: &[u8], spec: &WatermarkSpec) -> Result<ImageArtifact, CoreError> {
    let img = image::load_from_memory(bytes)?;
    let (w, h) = (img.width(), img.height());

    if spec.is_empty() {
        return Ok(ImageArtifact::new(bytes.to_vec(), w, h));
    }

    let mut canvas = img.to_rgba8();

    if let Some(qr) = &spec.qr {
        stamp_qr(&mut canvas, qr)?;
    }
    if let Some(label) = &spec.text {
        stamp_text(&mut canvas, label)?;
    }

    let out = encode_png(&DynamicImage::ImageRgba8(canvas))?;
    Ok(ImageArtifact::new(out, w, h))
}

// ---------------------------------------------------------------------------
// Overlay helpers
// ---------------------------------------------------------------------------

/// Top-left coordinate for an overlay of size `(ow, oh)` anchored to a
/// corner of a `(w, h)` canvas with [`PADDING_PX`] of padding. Clamped to
/// the canvas so oversized overlays degrade to the corner itself.
fn anchor_position(anchor: Anchor, w: u32, h: u32, ow: u32, oh: u32) -> (i64, i64) {
    let pad = PADDING_PX as i64;
    let (w, h) = (w as i64, h as i64);
    let (ow, oh) = (ow as i64, oh as i64);

    let x = match anchor {
        Anchor::TopLeft | Anchor::BottomLeft => pad,
        Anchor::TopRight | Anchor::BottomRight => (w - ow - pad).max(0),
    };
    let y = match anchor {
        Anchor::TopLeft | Anchor::TopRight => pad,
        Anchor::BottomLeft | Anchor::BottomRight => (h - oh - pad).max(0),
    };
    (x, y)
}

/// Render `label` into a transparent buffer, scale its alpha by the
/// configured opacity, and composite it onto `canvas`.
fn stamp_text(canvas: &mut RgbaImage, label: &TextLabel) -> Result<(), CoreError> {
    let font_bytes = std::fs::read(&label.font_path)?;
    let font = FontVec::try_from_vec(font_bytes).map_err(|_| {
        CoreError::Validation(format!(
            "'{}' is not a usable TTF/OTF font",
            label.font_path.display()
        ))
    })?;

    let scale = PxScale::from(label.px_height);
    let (text_w, text_h) = text_size(scale, &font, &label.text);
    let (text_w, text_h) = ((text_w as u32).max(1), (text_h as u32).max(1));

    let [r, g, b] = label.color;
    let mut overlay = RgbaImage::new(text_w, text_h);
    draw_text_mut(&mut overlay, Rgba([r, g, b, 255]), 0, 0, scale, &font, &label.text);

    let opacity = label.opacity.clamp(0.0, 1.0);
    for px in overlay.pixels_mut() {
        px.0[3] = (px.0[3] as f32 * opacity) as u8;
    }

    let (x, y) = anchor_position(
        label.anchor,
        canvas.width(),
        canvas.height(),
        text_w,
        text_h,
    );
    image::imageops::overlay(canvas, &overlay, x, y);
    Ok(())
}

/// Render the QR tile (white background, two quiet-zone modules) and
/// composite it onto `canvas`.
fn stamp_qr(canvas: &mut RgbaImage, tag: &QrTag) -> Result<(), CoreError> {
    let code = QrCode::new(tag.url.as_bytes())
        .map_err(|e| CoreError::Validation(format!("QR content not encodable: {e}")))?;

    let modules = code.width();
    let colors = code.to_colors();
    let quiet = 2usize;
    let module_px = tag.module_px.max(1);
    let tile_px = ((modules + 2 * quiet) as u32) * module_px;

    let mut tile = RgbaImage::from_pixel(tile_px, tile_px, Rgba([255, 255, 255, 255]));
    for my in 0..modules {
        for mx in 0..modules {
            if colors[my * modules + mx] == QrColor::Dark {
                let x0 = ((mx + quiet) as u32) * module_px;
                let y0 = ((my + quiet) as u32) * module_px;
                for dy in 0..module_px {
                    for dx in 0..module_px {
                        tile.put_pixel(x0 + dx, y0 + dy, Rgba([0, 0, 0, 255]));
                    }
                }
            }
        }
    }

    let (x, y) = anchor_position(tag.anchor, canvas.width(), canvas.height(), tile_px, tile_px);
    image::imageops::overlay(canvas, &tile, x, y);
    Ok(())
}

/// Re-encode an image as PNG.
fn encode_png(img: &DynamicImage) -> Result<Vec<u8>, CoreError> {
    let mut out = Cursor::new(Vec::new());
    img.write_to(&mut out, ImageFormat::Png)?;
    Ok(out.into_inner())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    fn png_bytes(w: u32, h: u32) -> Vec<u8> {
        let img = RgbaImage::from_pixel(w, h, Rgba([120, 40, 200, 255]));
        let mut out = Cursor::new(Vec::new());
        DynamicImage::ImageRgba8(img)
            .write_to(&mut out, ImageFormat::Png)
            .unwrap();
        out.into_inner()
    }

    // -- Resize --

    #[test]
    fn resize_is_noop_for_images_within_bounds() {
        let input = png_bytes(100, 80);
        let out = resize_to_max(&input, 2560).unwrap();
        assert_eq!(out.bytes, input);
        assert_eq!((out.width, out.height), (100, 80));
    }

    #[test]
    fn resize_noop_at_exact_boundary() {
        let input = png_bytes(200, 200);
        let out = resize_to_max(&input, 200).unwrap();
        assert_eq!(out.bytes, input);
    }

    #[test]
    fn resize_landscape_sets_width_to_max() {
        let input = png_bytes(4000, 3000);
        let out = resize_to_max(&input, 2560).unwrap();
        assert_eq!((out.width, out.height), (2560, 1920));
    }

    #[test]
    fn resize_portrait_sets_height_to_max() {
        let input = png_bytes(300, 400);
        let out = resize_to_max(&input, 200).unwrap();
        assert_eq!((out.width, out.height), (150, 200));
    }

    #[test]
    fn resize_preserves_aspect_within_rounding() {
        let input = png_bytes(1013, 771);
        let out = resize_to_max(&input, 500).unwrap();
        assert_eq!(out.width, 500);
        // 771 * 500 / 1013 = 380.55... -> 381
        assert_eq!(out.height, 381);
    }

    #[test]
    fn resize_rejects_garbage_bytes() {
        assert_matches!(
            resize_to_max(b"definitely not an image", 2560),
            Err(CoreError::Image(_))
        );
    }

    // -- Watermark --

    #[test]
    fn empty_spec_returns_input_unchanged() {
        let input = png_bytes(64, 64);
        let out = apply_watermark(&input, &WatermarkSpec::default()).unwrap();
        assert_eq!(out.bytes, input);
    }

    #[test]
    fn empty_spec_is_idempotent() {
        let input = png_bytes(64, 64);
        let spec = WatermarkSpec::default();
        let once = apply_watermark(&input, &spec).unwrap();
        let twice = apply_watermark(&once.bytes, &spec).unwrap();
        assert_eq!(once.bytes, twice.bytes);
    }

    #[test]
    fn qr_overlay_changes_pixels_but_not_dimensions() {
        let input = png_bytes(256, 256);
        let spec = WatermarkSpec {
            text: None,
            qr: Some(QrTag {
                module_px: 2,
                ..QrTag::new("https://example.com/claim/abc123")
            }),
        };
        let out = apply_watermark(&input, &spec).unwrap();
        assert_eq!((out.width, out.height), (256, 256));
        assert_ne!(out.bytes, input);

        // Quiet-zone modules are opaque white: sample inside the tile.
        let img = image::load_from_memory(&out.bytes).unwrap().to_rgba8();
        let x = PADDING_PX + 1;
        let y = 256 - PADDING_PX - 2;
        assert_eq!(*img.get_pixel(x, y), Rgba([255, 255, 255, 255]));
    }

    #[test]
    fn missing_font_is_an_io_error() {
        let input = png_bytes(64, 64);
        let spec = WatermarkSpec {
            text: Some(TextLabel::new("fotomat", "/nonexistent/font.ttf")),
            qr: None,
        };
        assert_matches!(apply_watermark(&input, &spec), Err(CoreError::Io(_)));
    }

    #[test]
    fn invalid_font_bytes_are_a_validation_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bogus.ttf");
        std::fs::write(&path, b"not a font").unwrap();

        let input = png_bytes(64, 64);
        let spec = WatermarkSpec {
            text: Some(TextLabel::new("fotomat", &path)),
            qr: None,
        };
        assert_matches!(apply_watermark(&input, &spec), Err(CoreError::Validation(_)));
    }

    // -- Anchoring --

    #[test]
    fn anchor_positions_respect_padding() {
        assert_eq!(anchor_position(Anchor::TopLeft, 400, 300, 50, 20), (16, 16));
        assert_eq!(
            anchor_position(Anchor::TopRight, 400, 300, 50, 20),
            (334, 16)
        );
        assert_eq!(
            anchor_position(Anchor::BottomLeft, 400, 300, 50, 20),
            (16, 264)
        );
        assert_eq!(
            anchor_position(Anchor::BottomRight, 400, 300, 50, 20),
            (334, 264)
        );
    }

    #[test]
    fn anchor_clamps_oversized_overlays() {
        let (x, y) = anchor_position(Anchor::BottomRight, 30, 30, 100, 100);
        assert_eq!((x, y), (0, 0));
    }
}
