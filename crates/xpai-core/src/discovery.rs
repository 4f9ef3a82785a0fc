//! Cluster-wide resource discovery.
//!
//! An [`Aggregator`] walks a fixed kind catalog against a [`ResourceSource`]
//! and classifies every returned object. The source is pinged once up front;
//! after that, a kind that fails to list is skipped rather than failing the
//! pass.

use chrono::Utc;
use serde_json::Value;
use std::future::Future;
use std::time::Duration;
use thiserror::Error;

use crate::catalog::ResourceKind;
use crate::error::{Result, XpaiError};
use crate::resource::{classify, ResourceRecord};

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

// ---------------------------------------------------------------------------
// ResourceSource
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("kind {0} is not served by the cluster")]
    NotFound(String),

    #[error("api request failed: {0}")]
    Api(String),

    #[error("cannot decode object: {0}")]
    Decode(String),

    #[error("cluster unreachable: {0}")]
    Unreachable(String),
}

/// Read-only access to raw cluster objects.
pub trait ResourceSource {
    /// Cheap reachability check performed once per discovery pass.
    fn ping(&self) -> impl Future<Output = std::result::Result<(), SourceError>>;

    /// Every object of `kind` across all namespaces, in API response order.
    fn list(
        &self,
        kind: &ResourceKind,
    ) -> impl Future<Output = std::result::Result<Vec<Value>, SourceError>>;
}

// ---------------------------------------------------------------------------
// ResourceFilter
// ---------------------------------------------------------------------------

/// Conjunctive equality filter. `None` or an empty string leaves that field
/// unconstrained.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResourceFilter {
    pub name: Option<String>,
    pub provider: Option<String>,
    pub namespace: Option<String>,
}

fn constraint(field: &Option<String>) -> Option<&str> {
    field.as_deref().filter(|s| !s.is_empty())
}

impl ResourceFilter {
    pub fn is_empty(&self) -> bool {
        constraint(&self.name).is_none()
            && constraint(&self.provider).is_none()
            && constraint(&self.namespace).is_none()
    }

    pub fn matches(&self, record: &ResourceRecord) -> bool {
        constraint(&self.name).map_or(true, |n| record.name == n)
            && constraint(&self.provider).map_or(true, |p| record.provider == p)
            && constraint(&self.namespace).map_or(true, |ns| record.namespace == ns)
    }

    /// Keep matching records, preserving order.
    pub fn apply(&self, records: Vec<ResourceRecord>) -> Vec<ResourceRecord> {
        if self.is_empty() {
            return records;
        }
        records.into_iter().filter(|r| self.matches(r)).collect()
    }
}

// ---------------------------------------------------------------------------
// Aggregator
// ---------------------------------------------------------------------------

pub struct Aggregator<S> {
    source: S,
    catalog: Vec<ResourceKind>,
    timeout: Duration,
}

impl<S: ResourceSource> Aggregator<S> {
    pub fn new(source: S, catalog: Vec<ResourceKind>) -> Self {
        Self {
            source,
            catalog,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Bound for one whole discovery pass, ping included.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn catalog(&self) -> &[ResourceKind] {
        &self.catalog
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    /// Every object of every catalog kind, in catalog order then API order.
    ///
    /// Fails only when the ping fails ([`XpaiError::ClusterUnreachable`]) or
    /// the pass exceeds the timeout ([`XpaiError::DiscoveryTimeout`]).
    pub async fn list_all(&self) -> Result<Vec<ResourceRecord>> {
        match tokio::time::timeout(self.timeout, self.discover()).await {
            Ok(result) => result,
            Err(_) => Err(XpaiError::DiscoveryTimeout(self.timeout)),
        }
    }

    pub async fn list_filtered(&self, filter: &ResourceFilter) -> Result<Vec<ResourceRecord>> {
        Ok(filter.apply(self.list_all().await?))
    }

    async fn discover(&self) -> Result<Vec<ResourceRecord>> {
        self.source
            .ping()
            .await
            .map_err(|e| XpaiError::ClusterUnreachable(e.to_string()))?;

        let mut records = Vec::new();
        for kind in &self.catalog {
            match self.source.list(kind).await {
                Ok(items) => {
                    tracing::debug!(kind = %kind, count = items.len(), "listed kind");
                    let now = Utc::now();
                    records.extend(items.iter().map(|raw| classify(raw, kind, now)));
                }
                Err(e) => {
                    tracing::debug!(kind = %kind, error = %e, "skipping kind");
                }
            }
        }
        Ok(records)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
