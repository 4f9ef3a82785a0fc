//! Embedded sample cluster and example manifests.
//!
//! [`SampleSource`] serves a small synthetic multi-cloud cluster as raw API
//! objects, so offline runs go through the same classifier as live ones.

use chrono::{Duration, Utc};
use serde_json::{json, Value};

use crate::catalog::ResourceKind;
use crate::discovery::{ResourceSource, SourceError};

// ---------------------------------------------------------------------------
// Sample objects
// ---------------------------------------------------------------------------

struct SampleObject {
    group: &'static str,
    plural: &'static str,
    kind: &'static str,
    name: &'static str,
    age_minutes: i64,
    ready: bool,
}

const SAMPLE_OBJECTS: &[SampleObject] = &[
    SampleObject {
        group: "apiextensions.crossplane.io",
        plural: "compositions",
        kind: "Composition",
        name: "sample-database-composition",
        age_minutes: 120,
        ready: true,
    },
    SampleObject {
        group: "apiextensions.crossplane.io",
        plural: "compositeresourcedefinitions",
        kind: "CompositeResourceDefinition",
        name: "xdatabases.example.org",
        age_minutes: 120,
        ready: true,
    },
    SampleObject {
        group: "pkg.crossplane.io",
        plural: "providers",
        kind: "Provider",
        name: "provider-aws",
        age_minutes: 60,
        ready: true,
    },
    SampleObject {
        group: "pkg.crossplane.io",
        plural: "providers",
        kind: "Provider",
        name: "provider-gcp",
        age_minutes: 60,
        ready: true,
    },
    SampleObject {
        group: "pkg.crossplane.io",
        plural: "providers",
        kind: "Provider",
        name: "provider-azure",
        age_minutes: 60,
        ready: true,
    },
    SampleObject {
        group: "rds.aws.crossplane.io",
        plural: "dbinstances",
        kind: "DBInstance",
        name: "sample-database-instance",
        age_minutes: 30,
        ready: true,
    },
    SampleObject {
        group: "ec2.aws.crossplane.io",
        plural: "instances",
        kind: "Instance",
        name: "web-server-instance",
        age_minutes: 45,
        ready: true,
    },
    SampleObject {
        group: "s3.aws.crossplane.io",
        plural: "buckets",
        kind: "Bucket",
        name: "data-storage-bucket",
        age_minutes: 60,
        ready: true,
    },
    SampleObject {
        group: "sql.gcp.crossplane.io",
        plural: "databaseinstances",
        kind: "DatabaseInstance",
        name: "gcp-database-instance",
        age_minutes: 20,
        ready: true,
    },
    SampleObject {
        group: "storage.azure.crossplane.io",
        plural: "accounts",
        kind: "Account",
        name: "azure-storage-account",
        age_minutes: 35,
        ready: true,
    },
    SampleObject {
        group: "ec2.aws.crossplane.io",
        plural: "instances",
        kind: "Instance",
        name: "failing-test-resource",
        age_minutes: 5,
        ready: false,
    },
];

impl SampleObject {
    fn to_raw(&self, version: &str, now: chrono::DateTime<Utc>) -> Value {
        let created = now - Duration::minutes(self.age_minutes);
        let ready = if self.ready {
            json!({"type": "Ready", "status": "True", "reason": "Available"})
        } else {
            json!({
                "type": "Ready",
                "status": "False",
                "reason": "ReconcileError",
                "message": "cannot create instance: InvalidSubnetID.NotFound"
            })
        };
        json!({
            "apiVersion": format!("{}/{}", self.group, version),
            "kind": self.kind,
            "metadata": {
                "name": self.name,
                "creationTimestamp": created.to_rfc3339_opts(chrono::SecondsFormat::Secs, true),
                "labels": {"app.kubernetes.io/managed-by": "crossplane"}
            },
            "spec": {"providerConfigRef": {"name": "default"}},
            "status": {"conditions": [
                {"type": "Synced", "status": "True", "reason": "ReconcileSuccess"},
                ready
            ]}
        })
    }
}

// ---------------------------------------------------------------------------
// SampleSource
// ---------------------------------------------------------------------------

/// Offline [`ResourceSource`]: always reachable, serves [`SAMPLE_OBJECTS`]
/// for whichever catalog kinds match by group and plural.
#[derive(Debug, Clone, Copy, Default)]
pub struct SampleSource;

impl SampleSource {
    pub fn new() -> Self {
        Self
    }

    pub fn object_count() -> usize {
        SAMPLE_OBJECTS.len()
    }
}

impl ResourceSource for SampleSource {
    async fn ping(&self) -> Result<(), SourceError> {
        Ok(())
    }

    async fn list(&self, kind: &ResourceKind) -> Result<Vec<Value>, SourceError> {
        let now = Utc::now();
        Ok(SAMPLE_OBJECTS
            .iter()
            .filter(|o| o.group == kind.group && o.plural == kind.plural)
            .map(|o| o.to_raw(&kind.version, now))
            .collect())
    }
}

// ---------------------------------------------------------------------------
// Example manifests
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy)]
pub struct ExampleManifest {
    pub name: &'static str,
    pub file_name: &'static str,
    pub description: &'static str,
    pub content: &'static str,
}

const COMPOSITION: &str = r#"apiVersion: apiextensions.crossplane.io/v1
kind: Composition
metadata:
  name: xdatabases.example.org
  labels:
    provider: aws
    service: rds
spec:
  compositeTypeRef:
    apiVersion: example.org/v1alpha1
    kind: XDatabase
  resources:
    - name: rds-instance
      base:
        apiVersion: rds.aws.crossplane.io/v1alpha1
        kind: DBInstance
        spec:
          forProvider:
            dbInstanceClass: db.t3.micro
            engine: postgres
            engineVersion: "13.7"
            allocatedStorage: 20
            storageType: gp2
      patches:
        - type: FromCompositeFieldPath
          fromFieldPath: spec.parameters.storageGB
          toFieldPath: spec.forProvider.allocatedStorage
"#;

const XRD: &str = r#"apiVersion: apiextensions.crossplane.io/v1
kind: CompositeResourceDefinition
metadata:
  name: xdatabases.example.org
spec:
  group: example.org
  names:
    kind: XDatabase
    plural: xdatabases
  versions:
  - name: v1alpha1
    served: true
    referenceable: true
    schema:
      openAPIV3Schema:
        type: object
        properties:
          spec:
            type: object
            properties:
              parameters:
                type: object
                properties:
                  storageGB:
                    type: integer
                    default: 20
                required:
                - storageGB
            required:
            - parameters
"#;

const CLAIM: &str = r#"apiVersion: example.org/v1alpha1
kind: XDatabase
metadata:
  name: my-database
spec:
  parameters:
    storageGB: 50
  compositionRef:
    name: xdatabases.example.org
"#;

const PROVIDER: &str = r#"apiVersion: pkg.crossplane.io/v1
kind: Provider
metadata:
  name: provider-aws
spec:
  package: xpkg.upbound.io/crossplane-contrib/provider-aws:v0.44.0
"#;

/// The example manifests in a fixed order.
pub fn example_manifests() -> &'static [ExampleManifest] {
    const EXAMPLES: &[ExampleManifest] = &[
        ExampleManifest {
            name: "composition",
            file_name: "xdatabase-composition.yaml",
            description: "Composition backing XDatabase with an RDS instance",
            content: COMPOSITION,
        },
        ExampleManifest {
            name: "xrd",
            file_name: "xdatabase-definition.yaml",
            description: "CompositeResourceDefinition for XDatabase",
            content: XRD,
        },
        ExampleManifest {
            name: "claim",
            file_name: "database-claim.yaml",
            description: "XDatabase claim requesting 50GB of storage",
            content: CLAIM,
        },
        ExampleManifest {
            name: "provider",
            file_name: "provider-aws.yaml",
            description: "AWS provider package installation",
            content: PROVIDER,
        },
    ];
    EXAMPLES
}
