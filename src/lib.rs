//! # NRC Exporter Core Library
//!
//! This library converts Nike Run Club activity records into GPX documents.
//! An activity arrives as a bag of independently sampled metric streams
//! (latitude, longitude, ascent, heart rate), each on its own time axis and at
//! its own rate. The library fuses them into one time-ordered trackpoint
//! sequence and serializes that sequence as GPX 1.1.
//!
//! ## Design Philosophy
//!
//! ### Pure Core
//! - **No I/O in the pipeline**: extraction, alignment and emission operate on
//!   records already in memory and return a `String`
//! - **Deterministic output**: the same record always yields the same bytes
//! - **Explicit failures**: every unusable activity surfaces as an
//!   [`ExportError`] instead of a silent default
//!
//! ### Data Flow
//! 1. **Parse**: activity JSON → [`activity::Activity`]
//! 2. **Extract**: pick the position, elevation and heart-rate streams
//! 3. **Pair**: join latitude and longitude samples on their fix time
//! 4. **Hold**: sample-and-hold auxiliary values onto the position timeline
//! 5. **Emit**: write one track, one segment, one `trkpt` per fused point
//!
//! The [`batch`] module wraps this pipeline for directories of exported JSON
//! files; it is the only part of the library that touches the filesystem.
//!
//! ## Core Types
//!
//! - [`Sample`]: one measurement with its validity interval
//! - [`track::Trackpoint`]: one fused output point

use serde::{Deserialize, Serialize};

pub mod activity;
pub mod align;
pub mod batch;
pub mod config;
pub mod error;
pub mod extract;
pub mod gpx;
pub mod track;

pub use error::{ExportError, Result};

/// A single measurement from a metric stream.
///
/// The value holds over the half-open interval
/// `[start_epoch_ms, end_epoch_ms)`. Position samples only use
/// `start_epoch_ms`, which is the exact fix time.
///
/// # Example
/// ```
/// use nrc_export_lib::Sample;
///
/// let hr = Sample { value: 142.0, start_epoch_ms: 1_000, end_epoch_ms: 6_000 };
/// assert!(hr.covers(5_999));
/// assert!(!hr.covers(6_000));
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    pub value: f64,
    pub start_epoch_ms: i64,
    pub end_epoch_ms: i64,
}

impl Sample {
    /// True if `epoch_ms` falls inside this sample's validity interval.
    pub fn covers(&self, epoch_ms: i64) -> bool {
        self.start_epoch_ms <= epoch_ms && epoch_ms < self.end_epoch_ms
    }
}
