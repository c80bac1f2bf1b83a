//! # Metric Extraction
//!
//! Locates the metric streams the exporter needs inside an [`Activity`].
//! Type names are matched exactly and case-sensitively; anything that is not
//! one of `latitude`, `longitude`, `ascent` or `heart_rate` is ignored.
//!
//! NRC documents occasionally list the same metric type twice. Which block
//! wins is decided by [`DuplicatePolicy`] rather than by scan order.

use crate::activity::Activity;
use crate::{ExportError, Result, Sample};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tracing::debug;

/// Metric types consumed by the exporter.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MetricKind {
    Latitude,
    Longitude,
    /// Carried as `ascent` in NRC documents
    Elevation,
    HeartRate,
}

impl MetricKind {
    const ALL: [MetricKind; 4] = [
        MetricKind::Latitude,
        MetricKind::Longitude,
        MetricKind::Elevation,
        MetricKind::HeartRate,
    ];

    pub fn from_type_name(name: &str) -> Option<Self> {
        match name {
            "latitude" => Some(MetricKind::Latitude),
            "longitude" => Some(MetricKind::Longitude),
            "ascent" => Some(MetricKind::Elevation),
            "heart_rate" => Some(MetricKind::HeartRate),
            _ => None,
        }
    }

    /// Type name as it appears in the activity document.
    pub fn type_name(self) -> &'static str {
        match self {
            MetricKind::Latitude => "latitude",
            MetricKind::Longitude => "longitude",
            MetricKind::Elevation => "ascent",
            MetricKind::HeartRate => "heart_rate",
        }
    }

    fn slot(self) -> usize {
        self as usize
    }
}

/// How to resolve a metric type that appears more than once.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DuplicatePolicy {
    /// Keep the first block of each type
    First,
    /// Keep the last block of each type
    #[default]
    Last,
    /// Fail the activity with [`ExportError::DuplicateMetric`]
    Reject,
}

impl FromStr for DuplicatePolicy {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "first" => Ok(DuplicatePolicy::First),
            "last" => Ok(DuplicatePolicy::Last),
            "reject" => Ok(DuplicatePolicy::Reject),
            other => Err(format!(
                "unknown duplicate policy `{other}` (expected first, last or reject)"
            )),
        }
    }
}

impl fmt::Display for DuplicatePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            DuplicatePolicy::First => "first",
            DuplicatePolicy::Last => "last",
            DuplicatePolicy::Reject => "reject",
        })
    }
}

/// Streams borrowed out of an activity, ready for fusion.
#[derive(Clone, Copy, Debug)]
pub struct MetricStreams<'a> {
    pub latitude: &'a [Sample],
    pub longitude: &'a [Sample],
    pub elevation: Option<&'a [Sample]>,
    pub heart_rate: Option<&'a [Sample]>,
}

/// Pick the position, elevation and heart-rate streams out of `activity`.
///
/// Scans the metric list once. Fails with
/// [`ExportError::MissingPositionData`] when either the latitude or the
/// longitude stream is absent.
pub fn extract(activity: &Activity, policy: DuplicatePolicy) -> Result<MetricStreams<'_>> {
    let mut found: [Option<&[Sample]>; 4] = [None; 4];

    for metric in &activity.metrics {
        let Some(kind) = MetricKind::from_type_name(&metric.kind) else {
            continue;
        };
        let slot = &mut found[kind.slot()];
        if slot.is_some() {
            debug!(
                activity_id = %activity.id,
                metric = kind.type_name(),
                %policy,
                "duplicate metric stream"
            );
            match policy {
                DuplicatePolicy::First => continue,
                DuplicatePolicy::Last => {}
                DuplicatePolicy::Reject => {
                    return Err(ExportError::DuplicateMetric {
                        activity_id: activity.id.clone(),
                        metric: kind.type_name().to_string(),
                    })
                }
            }
        }
        *slot = Some(metric.values.as_slice());
    }

    let present: Vec<&str> = MetricKind::ALL
        .iter()
        .filter(|k| found[k.slot()].is_some())
        .map(|k| k.type_name())
        .collect();
    debug!(
        activity_id = %activity.id,
        metric_types = ?activity.metric_types,
        found = ?present,
        "scanned activity metrics"
    );

    match (
        found[MetricKind::Latitude.slot()],
        found[MetricKind::Longitude.slot()],
    ) {
        (Some(latitude), Some(longitude)) => Ok(MetricStreams {
            latitude,
            longitude,
            elevation: found[MetricKind::Elevation.slot()],
            heart_rate: found[MetricKind::HeartRate.slot()],
        }),
        _ => Err(ExportError::MissingPositionData {
            activity_id: activity.id.clone(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::activity::Metric;
    use std::collections::BTreeMap;

    fn metric(kind: &str, values: &[f64]) -> Metric {
        Metric {
            kind: kind.to_string(),
            values: values
                .iter()
                .enumerate()
                .map(|(i, &value)| Sample {
                    value,
                    start_epoch_ms: i as i64 * 1000,
                    end_epoch_ms: i as i64 * 1000,
                })
                .collect(),
        }
    }

    fn activity(metrics: Vec<Metric>) -> Activity {
        Activity {
            id: "test".to_string(),
            kind: Some("run".to_string()),
            tags: BTreeMap::new(),
            metric_types: metrics.iter().map(|m| m.kind.clone()).collect(),
            metrics,
        }
    }

    #[test]
    fn test_extracts_all_known_streams() {
        let a = activity(vec![
            metric("speed", &[3.0]),
            metric("latitude", &[1.0, 1.1]),
            metric("longitude", &[2.0, 2.1]),
            metric("ascent", &[10.0]),
            metric("heart_rate", &[140.0]),
        ]);
        let streams = extract(&a, DuplicatePolicy::default()).unwrap();
        assert_eq!(streams.latitude.len(), 2);
        assert_eq!(streams.longitude[1].value, 2.1);
        assert_eq!(streams.elevation.unwrap()[0].value, 10.0);
        assert_eq!(streams.heart_rate.unwrap()[0].value, 140.0);
    }

    #[test]
    fn test_auxiliary_streams_are_optional() {
        let a = activity(vec![metric("latitude", &[1.0]), metric("longitude", &[2.0])]);
        let streams = extract(&a, DuplicatePolicy::default()).unwrap();
        assert!(streams.elevation.is_none());
        assert!(streams.heart_rate.is_none());
    }

    #[test]
    fn test_type_names_are_case_sensitive() {
        let a = activity(vec![metric("Latitude", &[1.0]), metric("longitude", &[2.0])]);
        let err = extract(&a, DuplicatePolicy::default()).unwrap_err();
        assert!(matches!(err, ExportError::MissingPositionData { .. }));
    }

    #[test]
    fn test_latitude_only_is_missing_position() {
        let a = activity(vec![metric("latitude", &[1.0]), metric("heart_rate", &[150.0])]);
        match extract(&a, DuplicatePolicy::default()) {
            Err(ExportError::MissingPositionData { activity_id }) => {
                assert_eq!(activity_id, "test")
            }
            other => panic!("expected MissingPositionData, got {other:?}"),
        }
    }

    #[test]
    fn test_longitude_only_is_missing_position() {
        let a = activity(vec![metric("longitude", &[2.0])]);
        assert!(extract(&a, DuplicatePolicy::default()).is_err());
    }

    #[test]
    fn test_duplicate_policies() {
        let a = activity(vec![
            metric("latitude", &[1.0]),
            metric("longitude", &[2.0]),
            metric("latitude", &[9.0]),
        ]);

        let last = extract(&a, DuplicatePolicy::Last).unwrap();
        assert_eq!(last.latitude[0].value, 9.0);

        let first = extract(&a, DuplicatePolicy::First).unwrap();
        assert_eq!(first.latitude[0].value, 1.0);

        match extract(&a, DuplicatePolicy::Reject) {
            Err(ExportError::DuplicateMetric { metric, .. }) => assert_eq!(metric, "latitude"),
            other => panic!("expected DuplicateMetric, got {other:?}"),
        }
    }

    #[test]
    fn test_policy_parsing() {
        assert_eq!("first".parse::<DuplicatePolicy>(), Ok(DuplicatePolicy::First));
        assert_eq!("reject".parse::<DuplicatePolicy>(), Ok(DuplicatePolicy::Reject));
        assert!("newest".parse::<DuplicatePolicy>().is_err());
        assert_eq!(DuplicatePolicy::Last.to_string(), "last");
    }
}
