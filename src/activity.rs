//! # Activity Records
//!
//! Serde model of a Nike Run Club activity document, as returned by the
//! activity details endpoint with `metrics=ALL`. Only the fields the exporter
//! reads are modelled; everything else in the document is ignored.
//!
//! ```json
//! {
//!   "id": "8d5e...",
//!   "type": "run",
//!   "tags": { "com.nike.name": "Sunday Run" },
//!   "metric_types": ["latitude", "longitude", "heart_rate"],
//!   "metrics": [
//!     { "type": "latitude",
//!       "values": [{ "value": 52.1, "start_epoch_ms": 0, "end_epoch_ms": 0 }] }
//!   ]
//! }
//! ```

use crate::{ExportError, Result, Sample};
use serde::Deserialize;
use serde_json::Value;
use std::collections::BTreeMap;

/// Tag holding the user-visible activity title
pub const TITLE_TAG: &str = "com.nike.name";

/// Tag distinguishing GPS-recorded runs from manually entered ones
pub const RUN_TYPE_TAG: &str = "com.nike.running.runtype";

/// One activity as exported by NRC.
#[derive(Clone, Debug, Deserialize)]
pub struct Activity {
    pub id: String,
    /// Activity kind, e.g. `"run"`
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
    #[serde(default)]
    pub tags: BTreeMap<String, Value>,
    #[serde(default)]
    pub metrics: Vec<Metric>,
    /// Names of the metric types present. Informational only.
    #[serde(default)]
    pub metric_types: Vec<String>,
}

/// One typed metric block inside an activity.
#[derive(Clone, Debug, Deserialize)]
pub struct Metric {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub values: Vec<Sample>,
}

impl Activity {
    /// Parse an activity from its JSON text.
    pub fn from_json(text: &str) -> Result<Self> {
        serde_json::from_str(text).map_err(ExportError::from)
    }

    /// Parse an activity from raw JSON bytes.
    pub fn from_slice(bytes: &[u8]) -> Result<Self> {
        serde_json::from_slice(bytes).map_err(ExportError::from)
    }

    /// Activity title, or an empty string when the tag is absent.
    pub fn title(&self) -> &str {
        self.tags
            .get(TITLE_TAG)
            .and_then(Value::as_str)
            .unwrap_or_default()
    }

    /// True for activities recorded as runs.
    pub fn is_run(&self) -> bool {
        self.kind.as_deref() == Some("run")
    }

    /// Manually logged runs carry no telemetry worth exporting.
    pub fn is_manual(&self) -> bool {
        self.tags.get(RUN_TYPE_TAG).and_then(Value::as_str) == Some("manual")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DOC: &str = r#"{
        "id": "abc-123",
        "type": "run",
        "app_id": "com.nike.sport.running.ios",
        "tags": { "com.nike.name": "Tuesday Tempo", "location": "outdoors" },
        "metric_types": ["latitude", "heart_rate"],
        "metrics": [
            { "type": "latitude", "unit": "DEG", "values": [
                { "value": 52.5, "start_epoch_ms": 1000, "end_epoch_ms": 1000 }
            ]},
            { "type": "heart_rate", "values": [] }
        ]
    }"#;

    #[test]
    fn test_parse_activity_document() {
        let activity = Activity::from_json(DOC).unwrap();
        assert_eq!(activity.id, "abc-123");
        assert_eq!(activity.title(), "Tuesday Tempo");
        assert_eq!(activity.metrics.len(), 2);
        assert_eq!(activity.metrics[0].kind, "latitude");
        assert_eq!(activity.metrics[0].values[0].value, 52.5);
        assert_eq!(activity.metric_types, vec!["latitude", "heart_rate"]);
        assert!(activity.is_run());
        assert!(!activity.is_manual());
    }

    #[test]
    fn test_missing_title_is_empty() {
        let activity = Activity::from_json(r#"{"id": "x", "tags": {}}"#).unwrap();
        assert_eq!(activity.title(), "");
        assert!(activity.metrics.is_empty());
        assert!(!activity.is_run());
    }

    #[test]
    fn test_manual_run_detected() {
        let activity = Activity::from_json(
            r#"{"id": "m", "type": "run", "tags": {"com.nike.running.runtype": "manual"}}"#,
        )
        .unwrap();
        assert!(activity.is_manual());
    }

    #[test]
    fn test_malformed_input() {
        let err = Activity::from_json("{ not json").unwrap_err();
        assert!(matches!(err, ExportError::MalformedInput(_)));

        // Structurally valid JSON missing the id is still malformed
        let err = Activity::from_slice(br#"{"metrics": []}"#).unwrap_err();
        assert!(matches!(err, ExportError::MalformedInput(_)));
    }
}
