//! JSON contract of the analysis service response.
//!
//! Only the outer shape is decoded strictly (the body must be JSON). The
//! `events` array is kept as raw values so that one malformed record cannot
//! reject its neighbours, and `report` is dropped rather than failing the
//! response when it does not match [`RunSummary`].

use std::collections::BTreeMap;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use tracing::debug;

/// One `alerts[]` entry of an event record
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawAlert {
    #[serde(rename = "type", default, deserialize_with = "lenient")]
    pub kind: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub confidence: Option<f64>,
}

/// One `tools[]` entry of an event record
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawTool {
    #[serde(default, deserialize_with = "lenient")]
    pub bbox: Option<[f64; 4]>,
}

/// An event record as sent by the service, before validation.
///
/// Every field is optional and a field of the wrong type reads as absent,
/// so only a bad `time` can reject the record.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawEvent {
    #[serde(default, deserialize_with = "lenient")]
    pub time: Option<f64>,
    #[serde(default, deserialize_with = "lenient_vec")]
    pub alerts: Option<Vec<RawAlert>>,
    #[serde(default, deserialize_with = "lenient_vec")]
    pub tools: Option<Vec<RawTool>>,
    #[serde(default, deserialize_with = "lenient")]
    pub crit_region: Option<[f64; 4]>,
    #[serde(default, deserialize_with = "lenient")]
    pub visibility: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub vis_score: Option<f64>,
    #[serde(default, deserialize_with = "lenient")]
    pub vis_reason: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub risk_level: Option<String>,
    #[serde(default, deserialize_with = "lenient_vec")]
    pub safety_flags: Option<Vec<String>>,
}

/// Optional field: `null` or a value of the wrong type becomes `None`.
fn lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = Value::deserialize(deserializer)?;
    if value.is_null() {
        return Ok(None);
    }
    Ok(serde_json::from_value(value)
        .map_err(|err| debug!(%err, "ignoring mistyped event field"))
        .ok())
}

/// Optional list: a non-array becomes `None`, mistyped elements are skipped.
fn lenient_vec<'de, D, T>(deserializer: D) -> Result<Option<Vec<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let Value::Array(items) = Value::deserialize(deserializer)? else {
        return Ok(None);
    };
    let parsed = items
        .into_iter()
        .filter_map(|item| {
            serde_json::from_value(item)
                .map_err(|err| debug!(%err, "skipping mistyped list element"))
                .ok()
        })
        .collect();
    Ok(Some(parsed))
}

/// Share of the video per visibility class
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VisibilityBreakdown {
    #[serde(default)]
    pub good: f64,
    #[serde(default)]
    pub moderate: f64,
    #[serde(default)]
    pub poor: f64,
}

/// Run-level `report` block. Consumed by reporting only.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RunSummary {
    #[serde(default)]
    pub duration_sec: f64,
    #[serde(default)]
    pub vis_breakdown: VisibilityBreakdown,
    /// Per-category counts, keyed by category tag
    #[serde(default)]
    pub event_counts: BTreeMap<String, u64>,
    #[serde(default)]
    pub total_risk_events: u64,
    #[serde(default)]
    pub reduced_visibility_risk: f64,
    #[serde(default)]
    pub overall_risk: Option<String>,
}

/// Decoded analysis response
#[derive(Debug, Clone, Default)]
pub struct AnalysisResponse {
    /// Raw event records; empty when `events` was absent or not an array
    pub events: Vec<Value>,
    pub overall_visibility: Option<String>,
    pub report: Option<RunSummary>,
}

impl AnalysisResponse {
    /// Decode a response body. Fails only if the body is not JSON.
    pub fn from_json(body: &str) -> serde_json::Result<Self> {
        let value: Value = serde_json::from_str(body)?;
        Ok(Self::from_value(value))
    }

    pub fn from_value(value: Value) -> Self {
        let Value::Object(mut root) = value else {
            debug!("response is not a JSON object, treating as empty");
            return Self::default();
        };

        let events = match root.remove("events") {
            Some(Value::Array(records)) => records,
            Some(other) => {
                debug!(kind = json_kind(&other), "`events` is not an array, no alerts");
                Vec::new()
            }
            None => Vec::new(),
        };

        let overall_visibility = root
            .remove("overall_visibility")
            .and_then(|v| v.as_str().map(str::to_string));

        let report = root
            .remove("report")
            .filter(|v| !v.is_null())
            .and_then(|v| match serde_json::from_value::<RunSummary>(v) {
                Ok(summary) => Some(summary),
                Err(err) => {
                    debug!(%err, "ignoring malformed report");
                    None
                }
            });

        Self {
            events,
            overall_visibility,
            report,
        }
    }
}

fn json_kind(v: &Value) -> &'static str {
    match v {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
