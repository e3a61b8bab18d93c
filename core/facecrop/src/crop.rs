use crate::detector::FaceBounds;

/// Share of the vertical expansion placed above the face box. The rest goes
/// below, so the crop keeps headroom above the hairline while reaching down
/// past the chin for the shoulders.
const TOP_EXPANSION_SHARE: f64 = 1.0 / 3.0;

/// A clamped crop region is rejected when either side falls below this.
const MIN_CROP_SIDE: u32 = 4;

/// Crop region within the source image. Always lies fully inside the image
/// it was computed against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CropRegion {
    /// Left edge in pixels.
    pub x: u32,
    /// Top edge in pixels.
    pub y: u32,
    /// Region width in pixels.
    pub width: u32,
    /// Region height in pixels.
    pub height: u32,
}

/// Compute the head-and-shoulders crop region for a detected face.
///
/// The face box grows by `width × pad_width_factor` horizontally (split
/// evenly) and `height × pad_height_factor` vertically (one third above, two
/// thirds below). Edges that would leave the image are clipped, never
/// wrapped. Returns `None` when clamping leaves a near-zero region; the
/// caller reports that as a crop error rather than emitting a degenerate
/// thumbnail.
pub fn padded_crop_region(
    face: &FaceBounds,
    img_w: u32,
    img_h: u32,
    pad_width_factor: f64,
    pad_height_factor: f64,
) -> Option<CropRegion> {
    let extra_w = face.width * pad_width_factor;
    let extra_h = face.height * pad_height_factor;

    let left = face.x - extra_w / 2.0;
    let right = face.x + face.width + extra_w / 2.0;
    let top = face.y - extra_h * TOP_EXPANSION_SHARE;
    let bottom = face.y + face.height + extra_h * (1.0 - TOP_EXPANSION_SHARE);

    let left = left.round().clamp(0.0, img_w as f64) as u32;
    let right = right.round().clamp(0.0, img_w as f64) as u32;
    let top = top.round().clamp(0.0, img_h as f64) as u32;
    let bottom = bottom.round().clamp(0.0, img_h as f64) as u32;

    let width = right.saturating_sub(left);
    let height = bottom.saturating_sub(top);
    if width < MIN_CROP_SIDE || height < MIN_CROP_SIDE {
        return None;
    }

    Some(CropRegion {
        x: left,
        y: top,
        width,
        height,
    })
}
