//! # Batch Conversion
//!
//! Runs the conversion pipeline over a set of exported activity documents and
//! writes one GPX file per activity.
//!
//! Each document is converted independently. Errors never cross activity
//! boundaries: an unreadable, malformed or position-less document is logged,
//! counted as skipped, and the batch moves on. Only failures that affect the
//! whole batch (an unreadable input directory, an output directory that cannot
//! be created) are returned as errors.

use crate::activity::Activity;
use crate::track::{convert_activity, ConvertOptions};
use crate::{ExportError, Result};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// Outcome counts for one batch run.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct BatchReport {
    /// Documents considered
    pub total: usize,
    /// GPX files written
    pub converted: usize,
    /// Documents left out by the runs-only filter
    pub filtered: usize,
    /// Documents that failed, with the reason
    pub skipped: Vec<(PathBuf, String)>,
    pub elapsed: Duration,
}

/// Batch settings.
#[derive(Debug, Clone, Default)]
pub struct BatchOptions {
    pub convert: ConvertOptions,
    pub runs_only: bool,
}

/// Expand input paths into the list of activity documents to convert.
///
/// Files are taken as given. Directories contribute their `.json` entries,
/// sorted by name so runs are reproducible.
pub fn collect_inputs(paths: &[PathBuf]) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for path in paths {
        if path.is_dir() {
            let mut entries: Vec<PathBuf> = fs::read_dir(path)?
                .filter_map(|entry| entry.ok().map(|e| e.path()))
                .filter(|p| p.is_file() && p.extension().is_some_and(|ext| ext == "json"))
                .collect();
            entries.sort();
            debug!(dir = %path.display(), count = entries.len(), "collected activity files");
            files.extend(entries);
        } else {
            files.push(path.clone());
        }
    }
    Ok(files)
}

/// Read and parse one activity document.
pub fn read_activity(path: &Path) -> Result<Activity> {
    let bytes = fs::read(path)?;
    Activity::from_slice(&bytes)
}

/// Output file name for an activity, refusing ids that would escape the
/// output directory.
pub fn output_file_name(activity_id: &str) -> Result<String> {
    let valid = !activity_id.is_empty()
        && activity_id != "."
        && activity_id != ".."
        && !activity_id.contains(['/', '\\']);
    if valid {
        Ok(format!("{activity_id}.gpx"))
    } else {
        Err(ExportError::MalformedInput(format!(
            "activity id {activity_id:?} is not usable as a file name"
        )))
    }
}

/// Convert every document under `inputs`, writing GPX files to `output_dir`.
pub fn run(inputs: &[PathBuf], output_dir: &Path, options: &BatchOptions) -> Result<BatchReport> {
    let started = Instant::now();
    let files = collect_inputs(inputs)?;
    fs::create_dir_all(output_dir)?;
    info!(
        count = files.len(),
        output = %output_dir.display(),
        "parsing activity JSON files"
    );

    let mut report = BatchReport {
        total: files.len(),
        ..BatchReport::default()
    };

    for file in &files {
        match convert_one(file, output_dir, options) {
            Ok(true) => report.converted += 1,
            Ok(false) => report.filtered += 1,
            Err(err) => {
                match &err {
                    ExportError::MissingPositionData { activity_id } => warn!(
                        file = %file.display(),
                        %activity_id,
                        "activity doesn't contain latitude/longitude information"
                    ),
                    other => warn!(file = %file.display(), error = %other, "skipping activity"),
                }
                report.skipped.push((file.clone(), err.to_string()));
            }
        }
    }

    report.elapsed = started.elapsed();
    info!(
        converted = report.converted,
        total = report.total,
        filtered = report.filtered,
        skipped = report.skipped.len(),
        elapsed_s = report.elapsed.as_secs_f64(),
        "batch finished"
    );
    Ok(report)
}

/// Returns `Ok(false)` when the runs-only filter drops the activity.
fn convert_one(file: &Path, output_dir: &Path, options: &BatchOptions) -> Result<bool> {
    let activity = read_activity(file)?;
    if options.runs_only && (!activity.is_run() || activity.is_manual()) {
        debug!(activity_id = %activity.id, kind = ?activity.kind, "not a recorded run, skipping");
        return Ok(false);
    }

    let gpx = convert_activity(&activity, &options.convert)?;
    let target = output_dir.join(output_file_name(&activity.id)?);
    fs::write(&target, gpx)?;
    debug!(activity_id = %activity.id, path = %target.display(), "saved GPX");
    Ok(true)
}
