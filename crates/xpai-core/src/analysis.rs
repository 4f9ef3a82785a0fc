use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::resource::ResourceRecord;
use crate::types::{Priority, ReadyStatus, Severity};

/// Score below which the collection is flagged for investigation.
pub const HEALTHY_THRESHOLD: u32 = 80;

// ---------------------------------------------------------------------------
// Result types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Issue {
    pub severity: Severity,
    pub description: String,
    pub related_resource: String,
    pub suggested_resolution: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    pub title: String,
    pub description: String,
    pub priority: Priority,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub impact: Option<String>,
}

impl Recommendation {
    fn new(title: &str, description: &str, priority: Priority, impact: &str) -> Self {
        Self {
            title: title.to_string(),
            description: description.to_string(),
            priority,
            impact: Some(impact.to_string()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub total_count: usize,
    pub healthy_count: usize,
    pub issue_count: usize,
    /// `round(100 * healthy / total)`; 0 for an empty collection.
    pub health_score: u32,
    pub issues: Vec<Issue>,
    pub recommendations: Vec<Recommendation>,
}

// ---------------------------------------------------------------------------
// Analysis
// ---------------------------------------------------------------------------

/// Deterministic health analysis of a record collection.
///
/// Every NotReady record yields a [`Severity::Warning`] issue. With
/// `health_check`, every Unknown record additionally yields an
/// [`Severity::Info`] issue.
pub fn analyze(records: &[ResourceRecord], health_check: bool) -> AnalysisResult {
    let total = records.len();
    let healthy = records.iter().filter(|r| r.status.is_ready()).count();

    let issues: Vec<Issue> = records
        .iter()
        .filter_map(|r| match r.status {
            ReadyStatus::NotReady => Some(Issue {
                severity: Severity::Warning,
                description: format!("Resource {} is in {} state", r.display_name(), r.status),
                related_resource: r.name.clone(),
                suggested_resolution: "Check resource events and provider status".to_string(),
            }),
            ReadyStatus::Unknown if health_check => Some(Issue {
                severity: Severity::Info,
                description: format!(
                    "Resource {} ({}) does not report a readiness condition",
                    r.display_name(),
                    r.kind
                ),
                related_resource: r.name.clone(),
                suggested_resolution: "Verify the provider populates status conditions".to_string(),
            }),
            _ => None,
        })
        .collect();

    let score = health_score(healthy, total);
    let recommendations = recommend(records, score, health_check);

    AnalysisResult {
        total_count: total,
        healthy_count: healthy,
        issue_count: issues.len(),
        health_score: score,
        issues,
        recommendations,
    }
}

/// `round(100 * healthy / total)` with halves rounding up; 0 when `total`
/// is 0.
pub fn health_score(healthy: usize, total: usize) -> u32 {
    if total == 0 {
        return 0;
    }
    ((200 * healthy + total) / (2 * total)) as u32
}

fn recommend(records: &[ResourceRecord], score: u32, health_check: bool) -> Vec<Recommendation> {
    if records.is_empty() {
        return vec![Recommendation::new(
            "Install Crossplane Providers",
            "No Crossplane resources found. Install providers and create compositions to get started.",
            Priority::High,
            "Enable infrastructure management through Crossplane",
        )];
    }

    let mut out = Vec::new();

    if score < HEALTHY_THRESHOLD {
        out.push(Recommendation::new(
            "Investigate Resource Issues",
            "Some resources are not in ready state. Check logs and events for troubleshooting.",
            Priority::High,
            "Improve system reliability and performance",
        ));
    }

    if provider_counts(records).len() > 2 {
        out.push(Recommendation::new(
            "Multi-Cloud Management",
            "Consider implementing consistent policies across multiple cloud providers.",
            Priority::Medium,
            "Better governance and cost optimization",
        ));
    }

    out.push(Recommendation::new(
        "Enable Monitoring and Alerting",
        "Set up monitoring for your Crossplane resources to track health and performance.",
        Priority::Medium,
        "Proactive issue detection and resolution",
    ));

    if health_check && records.iter().any(|r| r.status == ReadyStatus::Unknown) {
        out.push(Recommendation::new(
            "Add Readiness Conditions",
            "Some resources report no Ready condition, so their health cannot be assessed.",
            Priority::Low,
            "Complete health coverage across all resources",
        ));
    }

    out
}

/// Record count per provider tag, sorted by provider.
pub fn provider_counts(records: &[ResourceRecord]) -> BTreeMap<String, usize> {
    let mut counts = BTreeMap::new();
    for r in records {
        *counts.entry(r.provider.clone()).or_insert(0) += 1;
    }
    counts
}

/// Record count per readiness status.
pub fn status_counts(records: &[ResourceRecord]) -> BTreeMap<ReadyStatus, usize> {
    let mut counts = BTreeMap::new();
    for r in records {
        *counts.entry(r.status).or_insert(0) += 1;
    }
    counts
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
