use serde::Deserialize;

use crate::error::ConfigError;

/// Immutable per-run configuration for the crop pipeline.
///
/// Read once at engine construction and shared read-only by every call in a
/// run. All fields have serde defaults, so a partial JSON config file only
/// needs to name the values it overrides.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ProcessingConfig {
    /// Output edge length in pixels; thumbnails are always square.
    pub target_size: u32,

    /// Hard ceiling on the encoded output, in kilobytes.
    pub max_file_size_kb: u32,

    /// Longest-side cap applied to the image handed to the detector. Larger
    /// inputs are downscaled before detection and the resulting boxes are
    /// mapped back to source coordinates; detection semantics are unchanged.
    pub intermediate_size: u32,

    /// Extra crop width as a fraction of the face box width, split evenly
    /// left and right.
    pub padding_width_factor: f64,

    /// Extra crop height as a fraction of the face box height. The split is
    /// asymmetric: one third above the box, two thirds below, so the crop
    /// captures headroom and shoulders rather than a centered tight box.
    pub padding_height_factor: f64,

    /// Minimum confidence for a detection to be trusted. Best candidates
    /// below this produce [`crate::ProcessingOutcome::LowConfidence`].
    pub min_face_confidence: f64,

    /// JPEG quality for the first encode attempt (1–100).
    pub jpeg_quality_start: u8,

    /// Lowest JPEG quality tried before giving up with
    /// [`crate::ProcessingOutcome::EncodingFailed`].
    pub jpeg_quality_min: u8,

    /// Quality decrement per re-encode attempt.
    pub jpeg_quality_step: u8,

    /// Number of images submitted to the worker pool per chunk.
    pub batch_size: usize,
}

impl Default for ProcessingConfig {
    fn default() -> Self {
        Self {
            target_size: 96,
            max_file_size_kb: 100,
            intermediate_size: 640,
            padding_width_factor: 0.6,
            padding_height_factor: 1.5,
            min_face_confidence: 0.5,
            jpeg_quality_start: 95,
            jpeg_quality_min: 10,
            jpeg_quality_step: 5,
            batch_size: 50,
        }
    }
}

impl ProcessingConfig {
    /// Check that every field is usable. Called by
    /// [`crate::FaceCropEngine::new`] so per-image processing never has to
    /// re-validate.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.target_size == 0 {
            return Err(ConfigError::ZeroTargetSize);
        }
        if self.max_file_size_kb == 0 {
            return Err(ConfigError::ZeroSizeCeiling);
        }
        if self.intermediate_size == 0 {
            return Err(ConfigError::ZeroIntermediateSize);
        }
        for factor in [self.padding_width_factor, self.padding_height_factor] {
            if !factor.is_finite() || factor < 0.0 {
                return Err(ConfigError::InvalidPaddingFactor(factor));
            }
        }
        if !(0.0..=1.0).contains(&self.min_face_confidence) {
            return Err(ConfigError::InvalidConfidenceThreshold(
                self.min_face_confidence,
            ));
        }
        let ladder_ok = self.jpeg_quality_min >= 1
            && self.jpeg_quality_min <= self.jpeg_quality_start
            && self.jpeg_quality_start <= 100
            && self.jpeg_quality_step >= 1;
        if !ladder_ok {
            return Err(ConfigError::InvalidQualityLadder {
                start: self.jpeg_quality_start,
                min: self.jpeg_quality_min,
                step: self.jpeg_quality_step,
            });
        }
        if self.batch_size == 0 {
            return Err(ConfigError::ZeroBatchSize);
        }
        Ok(())
    }

    /// The output ceiling in bytes.
    pub fn max_file_size_bytes(&self) -> usize {
        self.max_file_size_kb as usize * 1024
    }
}
