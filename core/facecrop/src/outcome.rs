use serde::Serialize;

/// Final output for one successfully processed image: a square thumbnail
/// at the configured target size, encoded under the byte ceiling.
#[derive(Debug, Clone)]
pub struct ProcessedThumbnail {
    /// Encoded JPEG bytes, `len() <= max_file_size_kb * 1024`.
    pub data: Vec<u8>,

    /// Output width in pixels (equals the configured target size).
    pub width: u32,

    /// Output height in pixels (equals the configured target size).
    pub height: u32,

    /// JPEG quality the adaptive encoder settled on.
    pub quality: u8,

    /// Confidence of the face the crop was built from.
    pub confidence: f64,
}

/// Per-image result of [`crate::FaceCropEngine::process`].
///
/// Every failure mode is data, not an error: nothing in the pipeline is
/// allowed to abort a batch, so the driver routes files and counts outcomes
/// from this value alone.
#[derive(Debug, Clone)]
pub enum ProcessingOutcome {
    /// A face was found, cropped, and encoded within the size ceiling.
    Success(ProcessedThumbnail),

    /// The detector returned zero candidates.
    NoFaceDetected,

    /// A face was found geometrically but its confidence is below the
    /// configured threshold. Carries the detector's score for audit and
    /// threshold tuning.
    LowConfidence(f64),

    /// Clamping the padded region against the image bounds left near-zero
    /// area. Rare; points at a pathological detection box.
    CropError,

    /// The encoded output still exceeded the ceiling at minimum quality.
    EncodingFailed,

    /// The input could not be decoded, or decoded to degenerate dimensions.
    InvalidInput(String),
}

impl ProcessingOutcome {
    /// The outcome's kind, for counters and routing.
    pub fn kind(&self) -> OutcomeKind {
        match self {
            ProcessingOutcome::Success(_) => OutcomeKind::Success,
            ProcessingOutcome::NoFaceDetected => OutcomeKind::NoFaceDetected,
            ProcessingOutcome::LowConfidence(_) => OutcomeKind::LowConfidence,
            ProcessingOutcome::CropError => OutcomeKind::CropError,
            ProcessingOutcome::EncodingFailed => OutcomeKind::EncodingFailed,
            ProcessingOutcome::InvalidInput(_) => OutcomeKind::InvalidInput,
        }
    }

    /// True for [`ProcessingOutcome::Success`].
    pub fn is_success(&self) -> bool {
        matches!(self, ProcessingOutcome::Success(_))
    }
}

/// Discriminant of [`ProcessingOutcome`], used for aggregate counters and
/// failure routing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OutcomeKind {
    /// Thumbnail produced.
    Success,
    /// Zero detections.
    NoFaceDetected,
    /// Best detection below the confidence threshold.
    LowConfidence,
    /// Degenerate crop region after clamping.
    CropError,
    /// Size ceiling unreachable at minimum quality.
    EncodingFailed,
    /// Undecodable or degenerate input.
    InvalidInput,
}

impl OutcomeKind {
    /// Stable lowercase label for logs and reports.
    pub fn as_str(&self) -> &'static str {
        match self {
            OutcomeKind::Success => "success",
            OutcomeKind::NoFaceDetected => "no_face",
            OutcomeKind::LowConfidence => "low_confidence",
            OutcomeKind::CropError => "crop_error",
            OutcomeKind::EncodingFailed => "encoding_failed",
            OutcomeKind::InvalidInput => "invalid_input",
        }
    }
}
