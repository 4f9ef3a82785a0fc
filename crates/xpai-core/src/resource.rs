use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

use crate::catalog::ResourceKind;
use crate::path;
use crate::types::ReadyStatus;

/// Provider tag for the composition and package API groups.
pub const PLATFORM_PROVIDER: &str = "platform";

/// Provider tag when the API group carries no provider segment.
pub const UNKNOWN_PROVIDER: &str = "unknown";

/// API groups owned by the platform itself rather than a cloud provider.
pub const PLATFORM_GROUPS: [&str; 2] = ["apiextensions.crossplane.io", "pkg.crossplane.io"];

// ---------------------------------------------------------------------------
// ResourceRecord
// ---------------------------------------------------------------------------

/// Normalized view of one cluster object. Built fresh on every discovery
/// pass from the live API response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResourceRecord {
    pub name: String,
    #[serde(default)]
    pub namespace: String,
    /// Plural resource name from the catalog entry, e.g. `dbinstances`.
    pub kind: String,
    pub provider: String,
    pub status: ReadyStatus,
    /// Coarse age such as `2h15m`; empty when the creation time is unknown.
    #[serde(default)]
    pub age: String,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub labels: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub raw_spec: Option<Value>,
}

impl ResourceRecord {
    /// `name` qualified by namespace when the resource is namespaced.
    pub fn display_name(&self) -> String {
        if self.namespace.is_empty() {
            self.name.clone()
        } else {
            format!("{}/{}", self.namespace, self.name)
        }
    }
}

// ---------------------------------------------------------------------------
// Classification
// ---------------------------------------------------------------------------

/// Derive a [`ResourceRecord`] from a raw API object.
///
/// Never fails: missing metadata becomes empty strings, a missing or
/// unrecognized status becomes [`ReadyStatus::Unknown`], and a missing or
/// unparsable creation timestamp leaves `age` empty.
pub fn classify(raw: &Value, kind: &ResourceKind, now: DateTime<Utc>) -> ResourceRecord {
    let labels = path::get_object(raw, "metadata.labels")
        .map(|m| {
            m.iter()
                .filter_map(|(k, v)| v.as_str().map(|s| (k.clone(), s.to_string())))
                .collect()
        })
        .unwrap_or_default();

    let age = path::get_str(raw, "metadata.creationTimestamp")
        .and_then(|ts| DateTime::parse_from_rfc3339(ts).ok())
        .map(|created| format_age(now.signed_duration_since(created.with_timezone(&Utc))))
        .unwrap_or_default();

    ResourceRecord {
        name: path::get_str(raw, "metadata.name")
            .unwrap_or_default()
            .to_string(),
        namespace: path::get_str(raw, "metadata.namespace")
            .unwrap_or_default()
            .to_string(),
        kind: kind.plural.clone(),
        provider: infer_provider(&kind.group),
        status: infer_status(raw),
        age,
        labels,
        raw_spec: path::get(raw, "spec").cloned(),
    }
}

/// Provider tag for an API group: the platform groups map to
/// [`PLATFORM_PROVIDER`]; `<service>.<provider>.<rest>` maps to `<provider>`;
/// anything with fewer than two segments is [`UNKNOWN_PROVIDER`].
pub fn infer_provider(group: &str) -> String {
    if PLATFORM_GROUPS.iter().any(|g| *g == group) {
        return PLATFORM_PROVIDER.to_string();
    }
    let mut segments = group.split('.');
    match (segments.next(), segments.next()) {
        (Some(_), Some(provider)) => provider.to_string(),
        _ => UNKNOWN_PROVIDER.to_string(),
    }
}

/// Readiness, first match wins: `status.ready` as a boolean, then the
/// `Ready` entry of `status.conditions`, then unknown.
pub fn infer_status(raw: &Value) -> ReadyStatus {
    if let Some(ready) = path::get_bool(raw, "status.ready") {
        return if ready {
            ReadyStatus::Ready
        } else {
            ReadyStatus::NotReady
        };
    }

    let ready_condition = path::get_array(raw, "status.conditions").and_then(|conditions| {
        conditions
            .iter()
            .find(|c| path::get_str(c, "type") == Some("Ready"))
    });

    match ready_condition {
        Some(c) if path::get_str(c, "status") == Some("True") => ReadyStatus::Ready,
        Some(_) => ReadyStatus::NotReady,
        None => ReadyStatus::Unknown,
    }
}

/// Minute-resolution age: `<1m`, `45m`, `2h`, `2h15m`, `3d`, `3d4h`.
/// Negative durations (clock skew) render as `<1m`.
pub fn format_age(age: Duration) -> String {
    let minutes = age.num_minutes();
    if minutes < 1 {
        return "<1m".to_string();
    }
    let (days, hours, mins) = (minutes / 1440, (minutes % 1440) / 60, minutes % 60);
    match (days, hours, mins) {
        (0, 0, m) => format!("{m}m"),
        (0, h, 0) => format!("{h}h"),
        (0, h, m) => format!("{h}h{m}m"),
        (d, 0, _) => format!("{d}d"),
        (d, h, _) => format!("{d}d{h}h"),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
