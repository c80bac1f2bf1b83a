//! # Track Fusion
//!
//! Builds the fused trackpoint sequence from extracted metric streams and
//! hands it to the GPX writer.
//!
//! The position fixes define the timeline. Elevation and heart rate never add
//! or remove points; they only fill the optional fields of points that
//! already exist, through [`align::hold_align`].

use crate::activity::Activity;
use crate::align::{self, PairingPolicy};
use crate::extract::{self, DuplicatePolicy};
use crate::gpx::TrackDocument;
use crate::{ExportError, Result, Sample};
use chrono::{DateTime, Utc};
use tracing::info;

/// Creator string written into the GPX root when none is configured
pub const DEFAULT_CREATOR: &str = "nrc-exporter";

/// One fused output point.
#[derive(Clone, Debug, PartialEq)]
pub struct Trackpoint {
    pub latitude: f64,
    pub longitude: f64,
    pub time: DateTime<Utc>,
    pub elevation: Option<f64>,
    /// Beats per minute
    pub heart_rate: Option<u16>,
}

/// Knobs for a single activity conversion.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ConvertOptions {
    pub duplicate_policy: DuplicatePolicy,
    pub pairing_policy: PairingPolicy,
    pub creator: String,
}

impl Default for ConvertOptions {
    fn default() -> Self {
        ConvertOptions {
            duplicate_policy: DuplicatePolicy::default(),
            pairing_policy: PairingPolicy::default(),
            creator: DEFAULT_CREATOR.to_string(),
        }
    }
}

/// Convert Unix epoch milliseconds to a UTC timestamp.
pub fn epoch_to_utc(epoch_ms: i64) -> Result<DateTime<Utc>> {
    DateTime::<Utc>::from_timestamp_millis(epoch_ms).ok_or(ExportError::InvalidTimestamp(epoch_ms))
}

/// Fuse position and auxiliary streams into trackpoints.
///
/// Output order is the order of the paired position fixes, which is
/// chronological whenever the position streams are.
pub fn fuse(
    latitude: &[Sample],
    longitude: &[Sample],
    elevation: Option<&[Sample]>,
    heart_rate: Option<&[Sample]>,
    pairing: PairingPolicy,
) -> Result<Vec<Trackpoint>> {
    let fixes = align::pair_positions(latitude, longitude, pairing)?;
    let times = || fixes.iter().map(|f| f.epoch_ms);

    let elevations = elevation.map(|stream| align::hold_align(times(), stream));
    let heart_rates = heart_rate.map(|stream| align::hold_align(times(), stream));

    fixes
        .iter()
        .enumerate()
        .map(|(i, fix)| {
            Ok(Trackpoint {
                latitude: fix.latitude,
                longitude: fix.longitude,
                time: epoch_to_utc(fix.epoch_ms)?,
                elevation: elevations.as_ref().and_then(|e| e[i]),
                heart_rate: heart_rates.as_ref().and_then(|h| h[i]).map(bpm),
            })
        })
        .collect()
}

fn bpm(value: f64) -> u16 {
    value.round().clamp(0.0, f64::from(u16::MAX)) as u16
}

/// Fuse the given streams and serialize them as a single-track GPX document.
pub fn fuse_and_emit(
    title: &str,
    latitude: &[Sample],
    longitude: &[Sample],
    elevation: Option<&[Sample]>,
    heart_rate: Option<&[Sample]>,
    options: &ConvertOptions,
) -> Result<String> {
    let points = fuse(
        latitude,
        longitude,
        elevation,
        heart_rate,
        options.pairing_policy,
    )?;
    TrackDocument::new(&options.creator, title, points).to_xml()
}

/// Run extraction and fusion for one activity.
pub fn convert_activity(activity: &Activity, options: &ConvertOptions) -> Result<String> {
    let streams = extract::extract(activity, options.duplicate_policy)?;
    let gpx = fuse_and_emit(
        activity.title(),
        streams.latitude,
        streams.longitude,
        streams.elevation,
        streams.heart_rate,
        options,
    )?;
    info!(activity_id = %activity.id, "activity successfully parsed");
    Ok(gpx)
}
