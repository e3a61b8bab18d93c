use std::cmp::Ordering;

use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use image::{DynamicImage, GrayImage, ImageEncoder, RgbImage, RgbaImage};
use log::{debug, warn};

use crate::config::ProcessingConfig;
use crate::crop::padded_crop_region;
use crate::detector::{FaceBounds, FaceDetector};
use crate::outcome::{ProcessedThumbnail, ProcessingOutcome};

/// Run the full per-image pipeline: decode, detect, select, crop, resize,
/// adaptive encode. Every failure comes back as a [`ProcessingOutcome`]
/// variant; nothing escapes the per-image boundary.
pub(crate) fn process(
    detector: &dyn FaceDetector,
    config: &ProcessingConfig,
    input: &[u8],
) -> ProcessingOutcome {
    let decoded = match image::load_from_memory(input) {
        Ok(image) => image,
        Err(e) => return ProcessingOutcome::InvalidInput(format!("failed to decode image: {e}")),
    };
    let (img_w, img_h) = (decoded.width(), decoded.height());
    if img_w == 0 || img_h == 0 {
        return ProcessingOutcome::InvalidInput("image dimensions are zero".into());
    }

    let faces = detect_faces(detector, &decoded, config.intermediate_size);
    let best = match faces.into_iter().max_by(|a, b| {
        a.confidence
            .partial_cmp(&b.confidence)
            .unwrap_or(Ordering::Equal)
    }) {
        Some(face) => face,
        None => return ProcessingOutcome::NoFaceDetected,
    };
    if best.confidence < config.min_face_confidence {
        return ProcessingOutcome::LowConfidence(best.confidence);
    }

    let region = match padded_crop_region(
        &best,
        img_w,
        img_h,
        config.padding_width_factor,
        config.padding_height_factor,
    ) {
        Some(region) => region,
        None => return ProcessingOutcome::CropError,
    };

    // Square output by design: the downstream thumbnail attribute expects a
    // fixed-size square, so the resize is deliberately non-aspect-preserving.
    let cropped = decoded.crop_imm(region.x, region.y, region.width, region.height);
    let resized = cropped.resize_exact(config.target_size, config.target_size, FilterType::Lanczos3);
    let rgb = flatten_alpha(&resized);

    match encode_under_ceiling(&rgb, config) {
        Some((data, quality)) => ProcessingOutcome::Success(ProcessedThumbnail {
            data,
            width: rgb.width(),
            height: rgb.height(),
            quality,
            confidence: best.confidence,
        }),
        None => ProcessingOutcome::EncodingFailed,
    }
}

/// Detect faces, downscaling the detector input so its longest side does not
/// exceed `intermediate_size`. Boxes are mapped back to source coordinates,
/// so the pre-scale is invisible to the rest of the pipeline.
pub(crate) fn detect_faces(
    detector: &dyn FaceDetector,
    image: &DynamicImage,
    intermediate_size: u32,
) -> Vec<FaceBounds> {
    let gray: GrayImage = image::imageops::grayscale(image);
    let longest = gray.width().max(gray.height());

    if longest <= intermediate_size {
        return detector.detect(gray.as_raw(), gray.width(), gray.height());
    }

    let scale = intermediate_size as f64 / longest as f64;
    let scaled_w = ((gray.width() as f64 * scale).round() as u32).max(1);
    let scaled_h = ((gray.height() as f64 * scale).round() as u32).max(1);
    let scaled = image::imageops::resize(&gray, scaled_w, scaled_h, FilterType::Triangle);

    detector
        .detect(scaled.as_raw(), scaled_w, scaled_h)
        .into_iter()
        .map(|face| face.scaled(1.0 / scale))
        .collect()
}

/// Flatten any alpha channel by compositing onto a white background. JPEG
/// has no transparency, so translucent PNG input must be blended before
/// encoding.
pub(crate) fn flatten_alpha(image: &DynamicImage) -> RgbImage {
    let rgba: RgbaImage = image.to_rgba8();
    let mut rgb = RgbImage::new(rgba.width(), rgba.height());

    for (x, y, pixel) in rgba.enumerate_pixels() {
        let [r, g, b, a] = pixel.0;
        let alpha = a as f32 / 255.0;
        // Composite over white: out = channel * a + 255 * (1 - a).
        let over_white = |channel: u8| (channel as f32 * alpha + 255.0 * (1.0 - alpha)).round() as u8;
        rgb.put_pixel(x, y, image::Rgb([over_white(r), over_white(g), over_white(b)]));
    }

    rgb
}

/// Walk the quality ladder from `jpeg_quality_start` down by
/// `jpeg_quality_step` until the encoded bytes fit the ceiling. Returns the
/// bytes and the quality that met the budget, or `None` when the floor is
/// reached without fitting; an oversized thumbnail is never returned.
pub(crate) fn encode_under_ceiling(
    rgb: &RgbImage,
    config: &ProcessingConfig,
) -> Option<(Vec<u8>, u8)> {
    let ceiling = config.max_file_size_bytes();
    let mut quality = config.jpeg_quality_start;

    loop {
        let data = match encode_jpeg(rgb, quality) {
            Ok(data) => data,
            Err(e) => {
                warn!("jpeg encode failed at quality {quality}: {e}");
                return None;
            }
        };
        if data.len() <= ceiling {
            return Some((data, quality));
        }
        debug!(
            "encoded {} bytes at quality {quality}, ceiling is {ceiling}; stepping down",
            data.len()
        );
        // Stop before the ladder would drop below the floor.
        if quality - config.jpeg_quality_min < config.jpeg_quality_step {
            return None;
        }
        quality -= config.jpeg_quality_step;
    }
}

fn encode_jpeg(rgb: &RgbImage, quality: u8) -> Result<Vec<u8>, image::ImageError> {
    let mut buffer = Vec::new();
    JpegEncoder::new_with_quality(&mut buffer, quality).write_image(
        rgb.as_raw(),
        rgb.width(),
        rgb.height(),
        image::ExtendedColorType::Rgb8,
    )?;
    Ok(buffer)
}
