//! Batch driver for the facecrop pipeline.
//!
//! Enumerates a directory of badge photos (filename stem = directory object
//! identifier), runs every image through a shared [`FaceCropEngine`], writes
//! thumbnails to the output directory, copies failures aside for manual
//! review, and emits a plain-text audit report.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use log::{info, warn};
use walkdir::WalkDir;

use facecrop::{
    run_batch, BatchStats, FaceCropEngine, JobOutcome, PhotoJob, ProcessingConfig,
    ProcessingOutcome, RustfaceDetector,
};

#[derive(Debug, Parser)]
#[command(author, version, about)]
struct Args {
    /// Directory of input photos; each filename stem is the pass-through
    /// object identifier.
    #[arg(short, long)]
    input: PathBuf,

    /// Directory that receives cropped thumbnails as `<identifier>.jpg`.
    #[arg(short, long)]
    output: PathBuf,

    /// Directory where unprocessable photos are copied for manual review.
    #[arg(short, long)]
    failed: PathBuf,

    /// JSON configuration file. Fields not present fall back to defaults;
    /// omit the flag entirely to run on defaults.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Path to the SeetaFace detection model file.
    #[arg(short, long)]
    model: PathBuf,

    /// Write a plain-text processing report to this path.
    #[arg(short, long)]
    report: Option<PathBuf>,

    /// Write the aggregate counters as JSON to this path, for downstream
    /// audit tooling.
    #[arg(short, long)]
    stats_json: Option<PathBuf>,

    /// Enable debug logging.
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.verbose);

    let config = load_config(args.config.as_deref())?;
    let detector = RustfaceDetector::from_model_path(&args.model)
        .with_context(|| format!("failed to load model {}", args.model.display()))?;
    let engine = FaceCropEngine::new(Box::new(detector), config)?;

    let jobs = collect_jobs(&args.input)?;
    if jobs.is_empty() {
        warn!("no input images found in {}", args.input.display());
        return Ok(());
    }
    info!("found {} image(s) to process", jobs.len());

    fs::create_dir_all(&args.output)
        .with_context(|| format!("failed to create {}", args.output.display()))?;
    fs::create_dir_all(&args.failed)
        .with_context(|| format!("failed to create {}", args.failed.display()))?;

    let (results, stats) = run_batch(&engine, &jobs);
    route_results(&results, &args.output, &args.failed);

    if let Some(path) = &args.report {
        let report = render_report(&results, &stats);
        fs::write(path, report)
            .with_context(|| format!("failed to write report {}", path.display()))?;
        info!("report written to {}", path.display());
    }
    if let Some(path) = &args.stats_json {
        let json = serde_json::to_string_pretty(&stats).context("failed to serialize stats")?;
        fs::write(path, json)
            .with_context(|| format!("failed to write stats {}", path.display()))?;
    }

    info!(
        "done: {}/{} successful ({:.1}%)",
        stats.success,
        stats.total,
        stats.success_rate()
    );
    Ok(())
}

fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();
}

fn load_config(path: Option<&Path>) -> Result<ProcessingConfig> {
    match path {
        None => Ok(ProcessingConfig::default()),
        Some(path) => {
            let raw = fs::read_to_string(path)
                .with_context(|| format!("failed to read config {}", path.display()))?;
            serde_json::from_str(&raw)
                .with_context(|| format!("invalid config {}", path.display()))
        }
    }
}

/// Enumerate supported images under `input`, sorted by path for a stable
/// processing and report order.
fn collect_jobs(input: &Path) -> Result<Vec<PhotoJob>> {
    let mut paths = Vec::new();
    for entry in WalkDir::new(input).min_depth(1) {
        let entry = entry.with_context(|| format!("failed to scan {}", input.display()))?;
        if !entry.file_type().is_file() {
            continue;
        }
        let path = entry.into_path();
        if has_supported_extension(&path) {
            paths.push(path);
        }
    }
    paths.sort();
    Ok(paths.iter().filter_map(PhotoJob::from_path).collect())
}

fn has_supported_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| {
            let ext = ext.to_ascii_lowercase();
            matches!(ext.as_str(), "jpg" | "jpeg" | "png")
        })
        .unwrap_or(false)
}

/// Write successful thumbnails as `<id>.jpg` and copy failed sources into
/// the review directory. Routing problems are logged, never fatal.
fn route_results(results: &[JobOutcome], output: &Path, failed: &Path) {
    for result in results {
        match &result.outcome {
            ProcessingOutcome::Success(thumb) => {
                let dest = output.join(format!("{}.jpg", result.id));
                if let Err(e) = fs::write(&dest, &thumb.data) {
                    warn!("failed to write {}: {e}", dest.display());
                }
            }
            _ => {
                let dest = failed.join(
                    result
                        .path
                        .file_name()
                        .map(PathBuf::from)
                        .unwrap_or_else(|| PathBuf::from(&result.id)),
                );
                if let Err(e) = fs::copy(&result.path, &dest) {
                    warn!("failed to copy {} to review: {e}", result.path.display());
                }
            }
        }
    }
}

fn render_report(results: &[JobOutcome], stats: &BatchStats) -> String {
    use std::fmt::Write;

    let mut report = String::new();
    let _ = writeln!(report, "=== Face Processing Report ===");
    let _ = writeln!(report);
    let _ = writeln!(report, "Total images:     {}", stats.total);
    let _ = writeln!(report, "Successful:       {}", stats.success);
    let _ = writeln!(report, "No face:          {}", stats.no_face);
    let _ = writeln!(report, "Low confidence:   {}", stats.low_confidence);
    let _ = writeln!(report, "Crop errors:      {}", stats.crop_error);
    let _ = writeln!(report, "Encoding failed:  {}", stats.encoding_failed);
    let _ = writeln!(report, "Invalid input:    {}", stats.invalid_input);
    let _ = writeln!(report, "Success rate:     {:.1}%", stats.success_rate());
    let _ = writeln!(report);
    let _ = writeln!(report, "=== Details ===");
    for result in results {
        match &result.outcome {
            ProcessingOutcome::Success(thumb) => {
                let _ = writeln!(
                    report,
                    "{}: success (quality {}, {:.1} KB, confidence {:.2})",
                    result.id,
                    thumb.quality,
                    thumb.data.len() as f64 / 1024.0,
                    thumb.confidence
                );
            }
            ProcessingOutcome::LowConfidence(score) => {
                let _ = writeln!(report, "{}: low_confidence (score {score:.2})", result.id);
            }
            ProcessingOutcome::InvalidInput(reason) => {
                let _ = writeln!(report, "{}: invalid_input ({reason})", result.id);
            }
            other => {
                let _ = writeln!(report, "{}: {}", result.id, other.kind().as_str());
            }
        }
    }
    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use facecrop::ProcessedThumbnail;

    #[test]
    fn collects_only_supported_extensions() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["a.jpg", "b.PNG", "c.jpeg", "notes.txt", "d.webp"] {
            fs::write(dir.path().join(name), b"x").unwrap();
        }

        let jobs = collect_jobs(dir.path()).unwrap();
        let ids: Vec<&str> = jobs.iter().map(|j| j.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b", "c"]);
    }

    #[test]
    fn empty_directory_yields_no_jobs() {
        let dir = tempfile::tempdir().unwrap();
        assert!(collect_jobs(dir.path()).unwrap().is_empty());
    }

    #[test]
    fn missing_config_flag_uses_defaults() {
        let config = load_config(None).unwrap();
        assert_eq!(config.target_size, 96);
    }

    #[test]
    fn partial_config_file_overrides_named_fields() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, r#"{ "target_size": 128, "jpeg_quality_start": 90 }"#).unwrap();

        let config = load_config(Some(&path)).unwrap();
        assert_eq!(config.target_size, 128);
        assert_eq!(config.jpeg_quality_start, 90);
        assert_eq!(config.max_file_size_kb, 100);
    }

    #[test]
    fn malformed_config_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, "{ not json").unwrap();
        assert!(load_config(Some(&path)).is_err());
    }

    #[test]
    fn routing_writes_thumbnails_and_copies_failures() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("cropped");
        let failed = dir.path().join("failed");
        fs::create_dir_all(&output).unwrap();
        fs::create_dir_all(&failed).unwrap();

        let source = dir.path().join("badface.jpg");
        fs::write(&source, b"original bytes").unwrap();

        let results = vec![
            JobOutcome {
                id: "goodface".into(),
                path: dir.path().join("goodface.jpg"),
                outcome: ProcessingOutcome::Success(ProcessedThumbnail {
                    data: vec![0xFF, 0xD8, 0xFF],
                    width: 96,
                    height: 96,
                    quality: 95,
                    confidence: 0.9,
                }),
            },
            JobOutcome {
                id: "badface".into(),
                path: source.clone(),
                outcome: ProcessingOutcome::NoFaceDetected,
            },
        ];

        route_results(&results, &output, &failed);

        assert_eq!(
            fs::read(output.join("goodface.jpg")).unwrap(),
            vec![0xFF, 0xD8, 0xFF]
        );
        assert_eq!(
            fs::read(failed.join("badface.jpg")).unwrap(),
            b"original bytes"
        );
    }

    #[test]
    fn report_summarizes_counts_and_details() {
        let mut stats = BatchStats::default();
        stats.record(facecrop::OutcomeKind::Success);
        stats.record(facecrop::OutcomeKind::NoFaceDetected);

        let results = vec![
            JobOutcome {
                id: "one".into(),
                path: PathBuf::from("one.jpg"),
                outcome: ProcessingOutcome::Success(ProcessedThumbnail {
                    data: vec![0; 2048],
                    width: 96,
                    height: 96,
                    quality: 90,
                    confidence: 0.88,
                }),
            },
            JobOutcome {
                id: "two".into(),
                path: PathBuf::from("two.jpg"),
                outcome: ProcessingOutcome::NoFaceDetected,
            },
        ];

        let report = render_report(&results, &stats);
        assert!(report.contains("Total images:     2"));
        assert!(report.contains("Success rate:     50.0%"));
        assert!(report.contains("one: success (quality 90, 2.0 KB, confidence 0.88)"));
        assert!(report.contains("two: no_face"));
    }
}
