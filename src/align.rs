//! # Time-Series Alignment
//!
//! Two joins turn independent metric streams into one position timeline:
//!
//! 1. [`pair_positions`] joins latitude and longitude samples into fixes.
//!    NRC records both at the same instants, so a healthy activity pairs
//!    one-to-one; how disagreements are handled is a [`PairingPolicy`].
//! 2. [`hold_align`] projects a slower auxiliary stream (elevation, heart
//!    rate) onto the fix times with sample-and-hold semantics.
//!
//! Both are single forward passes over inputs that are already ordered by
//! `start_epoch_ms`. Neither re-sorts.

use crate::{ExportError, Result, Sample};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;
use tracing::warn;

/// A latitude/longitude pair at one fix time.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PositionFix {
    pub epoch_ms: i64,
    pub latitude: f64,
    pub longitude: f64,
}

/// How latitude and longitude samples are paired.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PairingPolicy {
    /// Join on equal fix times; unmatched samples are dropped
    #[default]
    Merge,
    /// Require index-aligned streams of equal length
    Strict,
    /// Pair by index and only warn on disagreement
    Positional,
}

impl FromStr for PairingPolicy {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "merge" => Ok(PairingPolicy::Merge),
            "strict" => Ok(PairingPolicy::Strict),
            "positional" => Ok(PairingPolicy::Positional),
            other => Err(format!(
                "unknown pairing policy `{other}` (expected merge, strict or positional)"
            )),
        }
    }
}

impl fmt::Display for PairingPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            PairingPolicy::Merge => "merge",
            PairingPolicy::Strict => "strict",
            PairingPolicy::Positional => "positional",
        })
    }
}

/// Join latitude and longitude samples into position fixes.
///
/// For equal-length, index-aligned streams every policy returns one fix per
/// sample, in input order.
pub fn pair_positions(
    latitude: &[Sample],
    longitude: &[Sample],
    policy: PairingPolicy,
) -> Result<Vec<PositionFix>> {
    match policy {
        PairingPolicy::Merge => Ok(merge_on_time(latitude, longitude)),
        PairingPolicy::Strict => {
            if latitude.len() != longitude.len() {
                return Err(ExportError::PositionLengthMismatch {
                    latitude: latitude.len(),
                    longitude: longitude.len(),
                });
            }
            latitude
                .iter()
                .zip(longitude)
                .enumerate()
                .map(|(index, (lat, lon))| {
                    if lat.start_epoch_ms == lon.start_epoch_ms {
                        Ok(fix(lat, lon))
                    } else {
                        Err(ExportError::TimestampMismatch {
                            index,
                            latitude_ms: lat.start_epoch_ms,
                            longitude_ms: lon.start_epoch_ms,
                        })
                    }
                })
                .collect()
        }
        PairingPolicy::Positional => {
            if latitude.len() != longitude.len() {
                warn!(
                    latitude = latitude.len(),
                    longitude = longitude.len(),
                    "position streams differ in length, extra samples ignored"
                );
            }
            Ok(latitude
                .iter()
                .zip(longitude)
                .enumerate()
                .map(|(index, (lat, lon))| {
                    if lat.start_epoch_ms != lon.start_epoch_ms {
                        warn!(
                            index,
                            latitude_ms = lat.start_epoch_ms,
                            longitude_ms = lon.start_epoch_ms,
                            "latitude and longitude data is out of order"
                        );
                    }
                    fix(lat, lon)
                })
                .collect())
        }
    }
}

fn fix(lat: &Sample, lon: &Sample) -> PositionFix {
    PositionFix {
        epoch_ms: lat.start_epoch_ms,
        latitude: lat.value,
        longitude: lon.value,
    }
}

fn merge_on_time(latitude: &[Sample], longitude: &[Sample]) -> Vec<PositionFix> {
    let mut fixes = Vec::with_capacity(latitude.len().min(longitude.len()));
    let (mut i, mut j) = (0, 0);

    while i < latitude.len() && j < longitude.len() {
        let (lat, lon) = (&latitude[i], &longitude[j]);
        match lat.start_epoch_ms.cmp(&lon.start_epoch_ms) {
            Ordering::Equal => {
                fixes.push(fix(lat, lon));
                i += 1;
                j += 1;
            }
            Ordering::Less => i += 1,
            Ordering::Greater => j += 1,
        }
    }

    let unmatched_lat = latitude.len() - fixes.len();
    let unmatched_lon = longitude.len() - fixes.len();
    if unmatched_lat > 0 || unmatched_lon > 0 {
        warn!(
            unmatched_lat,
            unmatched_lon,
            kept = fixes.len(),
            "dropped position samples without a matching timestamp"
        );
    }

    fixes
}

/// Sample-and-hold `aux` onto a non-decreasing sequence of `times`.
///
/// Walks both sequences once with a cursor into `aux`. The cursor advances
/// while the current time is at or past the end of the cursor's interval and
/// stops at the last sample, so once `aux` is exhausted every remaining time
/// holds its final value. A time that falls in a gap between two samples
/// holds the earlier one. Times before the first sample starts get `None`.
///
/// Returns one entry per time. If `times` ever decreases the cursor does not
/// move back.
pub fn hold_align<I>(times: I, aux: &[Sample]) -> Vec<Option<f64>>
where
    I: IntoIterator<Item = i64>,
{
    let times = times.into_iter();
    let mut held = Vec::with_capacity(times.size_hint().0);

    let Some(last) = aux.len().checked_sub(1) else {
        held.extend(times.map(|_| None));
        return held;
    };

    let mut cursor = 0;
    for t in times {
        while cursor < last && t >= aux[cursor].end_epoch_ms {
            cursor += 1;
        }
        let value = if t >= aux[cursor].start_epoch_ms {
            Some(aux[cursor].value)
        } else if cursor > 0 {
            Some(aux[cursor - 1].value)
        } else {
            None
        };
        held.push(value);
    }

    held
}
