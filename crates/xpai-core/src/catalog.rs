use serde::{Deserialize, Serialize};
use std::fmt;

use crate::config::CrossplaneConfig;
use crate::resource::{infer_provider, PLATFORM_PROVIDER};

// ---------------------------------------------------------------------------
// ResourceKind
// ---------------------------------------------------------------------------

/// Group/version/plural triple identifying one listable resource type.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ResourceKind {
    pub group: String,
    pub version: String,
    pub plural: String,
}

impl ResourceKind {
    pub fn new(group: impl Into<String>, version: impl Into<String>, plural: impl Into<String>) -> Self {
        Self {
            group: group.into(),
            version: version.into(),
            plural: plural.into(),
        }
    }

    pub fn api_version(&self) -> String {
        if self.group.is_empty() {
            self.version.clone()
        } else {
            format!("{}/{}", self.group, self.version)
        }
    }

    /// Provider tag every object of this kind will carry.
    pub fn provider(&self) -> String {
        infer_provider(&self.group)
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.group.is_empty() {
            write!(f, "{}.{}", self.plural, self.version)
        } else {
            write!(f, "{}.{}.{}", self.plural, self.version, self.group)
        }
    }
}

// ---------------------------------------------------------------------------
// Catalog tables
// ---------------------------------------------------------------------------

const DEFAULT_KINDS: &[(&str, &str, &str)] = &[
    // Composition and package kinds
    ("apiextensions.crossplane.io", "v1", "compositions"),
    ("apiextensions.crossplane.io", "v1", "compositeresourcedefinitions"),
    ("pkg.crossplane.io", "v1", "providers"),
    ("pkg.crossplane.io", "v1", "configurations"),
    // AWS
    ("rds.aws.crossplane.io", "v1alpha1", "dbinstances"),
    ("ec2.aws.crossplane.io", "v1alpha1", "instances"),
    ("s3.aws.crossplane.io", "v1alpha1", "buckets"),
    ("eks.aws.crossplane.io", "v1alpha1", "clusters"),
    // GCP
    ("sql.gcp.crossplane.io", "v1alpha1", "databaseinstances"),
    ("compute.gcp.crossplane.io", "v1alpha1", "instances"),
    ("storage.gcp.crossplane.io", "v1alpha1", "buckets"),
    // Azure
    ("sql.azure.crossplane.io", "v1alpha1", "servers"),
    ("compute.azure.crossplane.io", "v1alpha1", "virtualmachines"),
    ("storage.azure.crossplane.io", "v1alpha1", "accounts"),
];

/// The built-in kind table, in discovery order.
pub fn default_catalog() -> Vec<ResourceKind> {
    DEFAULT_KINDS
        .iter()
        .map(|(g, v, p)| ResourceKind::new(*g, *v, *p))
        .collect()
}

/// Build the discovery table from configuration.
///
/// `kinds` replaces the built-in table when non-empty. `resource_types`
/// keeps only the listed plurals and `providers` keeps only the listed
/// provider tags; an empty list leaves that dimension unconstrained, and
/// platform kinds are never dropped by the provider list.
pub fn from_config(cfg: &CrossplaneConfig) -> Vec<ResourceKind> {
    let base = if cfg.kinds.is_empty() {
        default_catalog()
    } else {
        cfg.kinds.clone()
    };

    base.into_iter()
        .filter(|k| cfg.resource_types.is_empty() || cfg.resource_types.contains(&k.plural))
        .filter(|k| {
            let provider = k.provider();
            cfg.providers.is_empty()
                || provider == PLATFORM_PROVIDER
                || cfg.providers.contains(&provider)
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
