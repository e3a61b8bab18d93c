use std::path::Path;

use crate::detector::{FaceBounds, FaceDetector};
use crate::error::ModelError;

/// SeetaFace scores are unbounded (typical real faces land in the 2–30
/// range); raw scores are divided by this and clamped into [0, 1] so the
/// engine's confidence threshold works on the same scale as other backends.
const SCORE_NORMALIZATION: f64 = 30.0;

/// Face detector backed by the `rustface` crate (SeetaFace engine).
///
/// The model file is read once at construction. The `rustface` detector
/// object itself is not `Send`, so each `detect` call builds a detector from
/// a clone of the parsed model; the clone is cheap next to inference and
/// keeps the backend usable from any worker thread.
pub struct RustfaceDetector {
    model: rustface::Model,
}

impl RustfaceDetector {
    /// Load a SeetaFace model from `path`.
    pub fn from_model_path<P: AsRef<Path>>(path: P) -> Result<Self, ModelError> {
        let path = path.as_ref();
        let path_str = path
            .to_str()
            .ok_or_else(|| ModelError::Parse(format!("non-UTF-8 model path: {path:?}")))?;
        let model = rustface::load_model(path_str)?;
        Ok(Self { model })
    }
}

impl FaceDetector for RustfaceDetector {
    fn detect(&self, gray: &[u8], width: u32, height: u32) -> Vec<FaceBounds> {
        let mut detector = rustface::create_detector_with_model(self.model.clone());
        detector.set_min_face_size(20);
        detector.set_score_thresh(2.0);
        detector.set_pyramid_scale_factor(0.8);
        detector.set_slide_window_step(4, 4);

        let faces = detector.detect(&rustface::ImageData::new(gray, width, height));

        faces
            .iter()
            .map(|face| {
                let bbox = face.bbox();
                FaceBounds {
                    x: bbox.x() as f64,
                    y: bbox.y() as f64,
                    width: bbox.width() as f64,
                    height: bbox.height() as f64,
                    confidence: (face.score() / SCORE_NORMALIZATION).clamp(0.0, 1.0),
                }
            })
            .collect()
    }
}
