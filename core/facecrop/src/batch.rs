//! Batch driver for the crop engine.
//!
//! Images are independent, so jobs run on a rayon worker pool in
//! `batch_size` chunks; the chunk boundary is also the cancellation unit for
//! callers that stop submitting. One engine is shared read-only by every
//! worker. No cross-image ordering is promised by the pipeline, but results
//! come back in job order for stable reports.

use std::fs;
use std::path::{Path, PathBuf};

use log::{info, warn};
use rayon::prelude::*;
use serde::Serialize;

use crate::outcome::{OutcomeKind, ProcessingOutcome};
use crate::FaceCropEngine;

/// One unit of work: an identifier (the output filename stem, passed through
/// untouched) and the source image path.
#[derive(Debug, Clone)]
pub struct PhotoJob {
    /// Pass-through key used to name the output thumbnail.
    pub id: String,
    /// Source image file.
    pub path: PathBuf,
}

impl PhotoJob {
    /// Build a job from a file path, using the filename stem as the
    /// identifier. Returns `None` for paths without a usable stem.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Option<Self> {
        let path = path.as_ref();
        let id = path.file_stem()?.to_str()?.to_string();
        Some(Self {
            id,
            path: path.to_path_buf(),
        })
    }
}

/// Outcome of one job, tagged with its identifier and source path so the
/// caller can route the file.
#[derive(Debug)]
pub struct JobOutcome {
    /// The job's pass-through identifier.
    pub id: String,
    /// Source image file the outcome belongs to.
    pub path: PathBuf,
    /// What the engine produced.
    pub outcome: ProcessingOutcome,
}

/// Aggregate counters per outcome kind, accumulated over a run and consumed
/// by the audit report.
#[derive(Debug, Default, Clone, Serialize)]
pub struct BatchStats {
    /// Total images processed.
    pub total: u64,
    /// Thumbnails produced.
    pub success: u64,
    /// Images with zero detections.
    pub no_face: u64,
    /// Images whose best detection was below the threshold.
    pub low_confidence: u64,
    /// Images with a degenerate crop region.
    pub crop_error: u64,
    /// Images that could not meet the size ceiling.
    pub encoding_failed: u64,
    /// Unreadable or undecodable images.
    pub invalid_input: u64,
}

impl BatchStats {
    /// Count one outcome.
    pub fn record(&mut self, kind: OutcomeKind) {
        self.total += 1;
        match kind {
            OutcomeKind::Success => self.success += 1,
            OutcomeKind::NoFaceDetected => self.no_face += 1,
            OutcomeKind::LowConfidence => self.low_confidence += 1,
            OutcomeKind::CropError => self.crop_error += 1,
            OutcomeKind::EncodingFailed => self.encoding_failed += 1,
            OutcomeKind::InvalidInput => self.invalid_input += 1,
        }
    }

    /// Fraction of processed images that produced a thumbnail, in percent.
    pub fn success_rate(&self) -> f64 {
        if self.total == 0 {
            return 0.0;
        }
        self.success as f64 / self.total as f64 * 100.0
    }
}

/// Process every job against a shared engine and return per-job outcomes in
/// job order, plus the aggregate counters.
///
/// Each chunk of `batch_size` jobs runs in parallel; a failure of any one
/// image is captured in its outcome and never aborts the run. Unreadable
/// files are reported as `InvalidInput`.
pub fn run_batch(engine: &FaceCropEngine, jobs: &[PhotoJob]) -> (Vec<JobOutcome>, BatchStats) {
    let mut results = Vec::with_capacity(jobs.len());
    let chunk_size = engine.config().batch_size;

    for (index, chunk) in jobs.chunks(chunk_size).enumerate() {
        info!(
            "processing chunk {}/{} ({} image(s))",
            index + 1,
            jobs.len().div_ceil(chunk_size),
            chunk.len()
        );
        let chunk_results: Vec<JobOutcome> = chunk
            .par_iter()
            .map(|job| {
                let outcome = match fs::read(&job.path) {
                    Ok(bytes) => engine.process(&bytes),
                    Err(e) => {
                        ProcessingOutcome::InvalidInput(format!("failed to read file: {e}"))
                    }
                };
                log_outcome(job, &outcome);
                JobOutcome {
                    id: job.id.clone(),
                    path: job.path.clone(),
                    outcome,
                }
            })
            .collect();
        results.extend(chunk_results);
    }

    let mut stats = BatchStats::default();
    for result in &results {
        stats.record(result.outcome.kind());
    }
    (results, stats)
}

fn log_outcome(job: &PhotoJob, outcome: &ProcessingOutcome) {
    match outcome {
        ProcessingOutcome::Success(thumb) => info!(
            "{}: quality {}, {:.1} KB, confidence {:.2}",
            job.id,
            thumb.quality,
            thumb.data.len() as f64 / 1024.0,
            thumb.confidence
        ),
        ProcessingOutcome::LowConfidence(score) => {
            warn!("{}: {} (score {score:.2})", job.id, outcome.kind().as_str())
        }
        ProcessingOutcome::InvalidInput(reason) => {
            warn!("{}: invalid_input ({reason})", job.id)
        }
        other => warn!("{}: {}", job.id, other.kind().as_str()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ProcessingConfig;
    use crate::detector::{FaceBounds, FaceDetector};
    use image::{ImageEncoder, RgbImage};

    struct FixedDetector {
        faces: Vec<FaceBounds>,
    }

    impl FaceDetector for FixedDetector {
        fn detect(&self, _gray: &[u8], _width: u32, _height: u32) -> Vec<FaceBounds> {
            self.faces.clone()
        }
    }

    fn write_png(path: &Path, width: u32, height: u32) {
        let mut img = RgbImage::new(width, height);
        for (x, y, pixel) in img.enumerate_pixels_mut() {
            *pixel = image::Rgb([(x % 256) as u8, (y % 256) as u8, 64]);
        }
        let mut buffer = Vec::new();
        image::codecs::png::PngEncoder::new(&mut buffer)
            .write_image(img.as_raw(), width, height, image::ExtendedColorType::Rgb8)
            .unwrap();
        fs::write(path, buffer).unwrap();
    }

    fn engine_with_face() -> FaceCropEngine {
        let detector = FixedDetector {
            faces: vec![FaceBounds {
                x: 60.0,
                y: 40.0,
                width: 80.0,
                height: 100.0,
                confidence: 0.9,
            }],
        };
        FaceCropEngine::new(Box::new(detector), ProcessingConfig::default()).unwrap()
    }

    #[test]
    fn job_id_is_the_filename_stem() {
        let job = PhotoJob::from_path("/photos/1a2b3c4d.jpg").unwrap();
        assert_eq!(job.id, "1a2b3c4d");
    }

    #[test]
    fn batch_preserves_job_order_and_counts_outcomes() {
        let dir = tempfile::tempdir().unwrap();
        let good = dir.path().join("good-1.png");
        let bad = dir.path().join("bad-1.png");
        write_png(&good, 320, 240);
        fs::write(&bad, b"corrupt").unwrap();

        let jobs = vec![
            PhotoJob::from_path(&good).unwrap(),
            PhotoJob::from_path(&bad).unwrap(),
        ];
        let engine = engine_with_face();
        let (results, stats) = run_batch(&engine, &jobs);

        assert_eq!(results.len(), 2);
        assert_eq!(results[0].id, "good-1");
        assert!(results[0].outcome.is_success());
        assert_eq!(results[1].id, "bad-1");
        assert!(matches!(
            results[1].outcome,
            ProcessingOutcome::InvalidInput(_)
        ));

        assert_eq!(stats.total, 2);
        assert_eq!(stats.success, 1);
        assert_eq!(stats.invalid_input, 1);
        assert!((stats.success_rate() - 50.0).abs() < f64::EPSILON);
    }

    #[test]
    fn missing_file_is_invalid_input_not_a_panic() {
        let engine = engine_with_face();
        let jobs = vec![PhotoJob::from_path("/nonexistent/x.png").unwrap()];
        let (results, stats) = run_batch(&engine, &jobs);

        assert!(matches!(
            results[0].outcome,
            ProcessingOutcome::InvalidInput(_)
        ));
        assert_eq!(stats.invalid_input, 1);
    }

    #[test]
    fn small_chunks_process_every_job() {
        let dir = tempfile::tempdir().unwrap();
        let mut jobs = Vec::new();
        for i in 0..5 {
            let path = dir.path().join(format!("photo-{i}.png"));
            write_png(&path, 200, 160);
            jobs.push(PhotoJob::from_path(&path).unwrap());
        }

        let detector = FixedDetector {
            faces: vec![FaceBounds {
                x: 50.0,
                y: 30.0,
                width: 60.0,
                height: 70.0,
                confidence: 0.8,
            }],
        };
        let config = ProcessingConfig {
            batch_size: 2,
            ..Default::default()
        };
        let engine = FaceCropEngine::new(Box::new(detector), config).unwrap();
        let (results, stats) = run_batch(&engine, &jobs);

        assert_eq!(results.len(), 5);
        assert_eq!(stats.success, 5);
        for (i, result) in results.iter().enumerate() {
            assert_eq!(result.id, format!("photo-{i}"));
        }
    }

    #[test]
    fn success_rate_of_empty_batch_is_zero() {
        assert_eq!(BatchStats::default().success_rate(), 0.0);
    }
}
