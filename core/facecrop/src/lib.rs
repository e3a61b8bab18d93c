//! Badge-photo thumbnail pipeline: detect the best face in a photo, crop a
//! head-and-shoulders region, and encode a fixed-size square JPEG under a
//! hard byte ceiling.
//!
//! # Example
//!
//! ```no_run
//! use facecrop::{FaceCropEngine, ProcessingConfig, ProcessingOutcome, RustfaceDetector};
//!
//! let detector = RustfaceDetector::from_model_path("models/seeta_fd_frontal_v1.0.bin").unwrap();
//! let engine = FaceCropEngine::new(Box::new(detector), ProcessingConfig::default()).unwrap();
//!
//! let bytes = std::fs::read("photo.jpg").unwrap();
//! match engine.process(&bytes) {
//!     ProcessingOutcome::Success(thumb) => {
//!         println!("{} bytes at quality {}", thumb.data.len(), thumb.quality)
//!     }
//!     other => println!("skipped: {:?}", other.kind()),
//! }
//! ```
#![warn(missing_docs)]

pub mod batch;
mod config;
mod crop;
/// Face detection trait and bounding-box type.
pub mod detector;
mod error;
mod outcome;
mod pipeline;
#[cfg(feature = "rustface")]
/// Built-in SeetaFace-based face detector backend.
pub mod rustface_backend;

pub use batch::{run_batch, BatchStats, JobOutcome, PhotoJob};
pub use config::ProcessingConfig;
pub use crop::{padded_crop_region, CropRegion};
pub use detector::{FaceBounds, FaceDetector};
pub use error::{ConfigError, ModelError};
pub use outcome::{OutcomeKind, ProcessedThumbnail, ProcessingOutcome};
#[cfg(feature = "rustface")]
pub use rustface_backend::RustfaceDetector;

/// Stateless per-call face-crop engine.
///
/// Construction validates the configuration and takes ownership of the
/// detector, so the expensive model load happens once and is reused for
/// every image in a run. `process` takes `&self` and shares no mutable
/// state between calls; one engine can serve a whole worker pool.
pub struct FaceCropEngine {
    detector: Box<dyn FaceDetector>,
    config: ProcessingConfig,
}

impl FaceCropEngine {
    /// Create an engine from a detector and a validated configuration.
    pub fn new(
        detector: Box<dyn FaceDetector>,
        config: ProcessingConfig,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self { detector, config })
    }

    /// The configuration this engine was built with.
    pub fn config(&self) -> &ProcessingConfig {
        &self.config
    }

    /// Process one image: decode, detect, select the highest-confidence
    /// face, crop with padding, resize to the target square, and encode
    /// under the size ceiling. Failures are returned as data; this never
    /// panics past the per-image boundary.
    pub fn process(&self, input: &[u8]) -> ProcessingOutcome {
        pipeline::process(self.detector.as_ref(), &self.config, input)
    }
}
