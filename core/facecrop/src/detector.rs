/// Bounding box of a detected face within an image.
///
/// Coordinates are in source-image pixels. `confidence` is the detector's
/// probability that the region is a genuine face, normalized to `[0, 1]`.
#[derive(Debug, Clone)]
pub struct FaceBounds {
    /// X coordinate of the top-left corner (pixels).
    pub x: f64,
    /// Y coordinate of the top-left corner (pixels).
    pub y: f64,
    /// Width of the bounding box (pixels).
    pub width: f64,
    /// Height of the bounding box (pixels).
    pub height: f64,
    /// Detection confidence score in `[0, 1]`.
    pub confidence: f64,
}

impl FaceBounds {
    /// Rescale the bounding box by `factor` (used to map detections made on
    /// a downscaled image back to source coordinates).
    pub(crate) fn scaled(&self, factor: f64) -> FaceBounds {
        FaceBounds {
            x: self.x * factor,
            y: self.y * factor,
            width: self.width * factor,
            height: self.height * factor,
            confidence: self.confidence,
        }
    }
}

/// Pluggable face detection backend.
///
/// Implement this trait to provide a custom detector (ONNX, dlib, etc.) and
/// pass it to [`crate::FaceCropEngine::new`]. Implementations must be usable
/// from multiple worker threads; backends whose underlying model is not
/// thread-safe should wrap it in a `Mutex` internally.
pub trait FaceDetector: Send + Sync {
    /// Detect faces in a row-major grayscale buffer of `width` × `height` bytes.
    ///
    /// Returns zero or more candidates; the engine picks the one with the
    /// highest confidence.
    fn detect(&self, gray: &[u8], width: u32, height: u32) -> Vec<FaceBounds>;
}
