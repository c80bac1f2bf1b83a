//! Errors raised while converting a single activity.
//!
//! Every variant is local to one activity: the batch driver logs it, counts
//! the activity as skipped and moves on to the next one.

use std::io;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ExportError {
    /// The activity has no latitude or no longitude stream
    #[error("activity {activity_id} has no latitude/longitude data")]
    MissingPositionData { activity_id: String },

    /// Latitude and longitude samples at the same index disagree on fix time
    #[error(
        "latitude/longitude timestamps disagree at index {index}: {latitude_ms} != {longitude_ms}"
    )]
    TimestampMismatch {
        index: usize,
        latitude_ms: i64,
        longitude_ms: i64,
    },

    /// Latitude and longitude streams have different lengths
    #[error("latitude has {latitude} samples but longitude has {longitude}")]
    PositionLengthMismatch { latitude: usize, longitude: usize },

    /// The same metric type appears more than once and duplicates are rejected
    #[error("activity {activity_id} contains duplicate `{metric}` streams")]
    DuplicateMetric { activity_id: String, metric: String },

    /// The record could not be parsed into an activity
    #[error("malformed activity record: {0}")]
    MalformedInput(String),

    /// Epoch milliseconds outside the range chrono can represent
    #[error("timestamp {0} ms is out of range")]
    InvalidTimestamp(i64),

    /// GPX writer failure
    #[error("GPX write failed: {0}")]
    Xml(String),

    /// Reading inputs or writing outputs failed
    #[error("IO: {0}")]
    Io(#[from] io::Error),
}

impl From<serde_json::Error> for ExportError {
    fn from(err: serde_json::Error) -> Self {
        ExportError::MalformedInput(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, ExportError>;
