use thiserror::Error;

/// Rejected [`crate::ProcessingConfig`] values, reported once at engine
/// construction so a bad config never fails image-by-image mid-batch.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// `target_size` was zero.
    #[error("target_size must be > 0")]
    ZeroTargetSize,

    /// `max_file_size_kb` was zero.
    #[error("max_file_size_kb must be > 0")]
    ZeroSizeCeiling,

    /// `intermediate_size` was zero.
    #[error("intermediate_size must be > 0")]
    ZeroIntermediateSize,

    /// A padding factor was negative, NaN, or infinite.
    #[error("padding factor must be finite and >= 0, got {0}")]
    InvalidPaddingFactor(f64),

    /// `min_face_confidence` fell outside `[0, 1]`.
    #[error("min_face_confidence must be within [0, 1], got {0}")]
    InvalidConfidenceThreshold(f64),

    /// The quality start/floor/step values do not form a usable ladder.
    #[error("jpeg quality ladder invalid: start={start} min={min} step={step} (need 1 <= min <= start <= 100, step >= 1)")]
    InvalidQualityLadder {
        /// Configured starting quality.
        start: u8,
        /// Configured quality floor.
        min: u8,
        /// Configured step per retry.
        step: u8,
    },

    /// `batch_size` was zero.
    #[error("batch_size must be > 0")]
    ZeroBatchSize,
}

/// Failure to load a face-detection model at backend construction.
#[derive(Debug, Error)]
pub enum ModelError {
    /// The model file could not be opened or read.
    #[error("failed to read model file: {0}")]
    Io(#[from] std::io::Error),

    /// The model file was read but its contents were unusable.
    #[error("failed to parse model data: {0}")]
    Parse(String),
}
