//! Template manifests for `generate`.

use serde::Deserialize;

use crate::error::Result;

/// Provider used when none (or `auto`) is requested.
pub const DEFAULT_PROVIDER: &str = "aws";

struct TemplateRule {
    id: &'static str,
    keywords: &'static [&'static str],
    render: fn(&Request) -> String,
}

struct Request<'a> {
    description: &'a str,
    lower: String,
    provider: &'a str,
}

impl Request<'_> {
    fn mentions(&self, word: &str) -> bool {
        self.lower.contains(word)
    }
}

fn rules() -> [TemplateRule; 4] {
    [
        TemplateRule {
            id: "database",
            keywords: &["database", "postgres", "mysql"],
            render: database,
        },
        TemplateRule {
            id: "storage",
            keywords: &["storage", "bucket", "s3"],
            render: storage,
        },
        TemplateRule {
            id: "network",
            keywords: &["network", "vpc", "subnet"],
            render: network,
        },
        TemplateRule {
            id: "compute",
            keywords: &["compute", "instance", "server"],
            render: compute,
        },
    ]
}

/// Normalize a requested provider. Blank, `auto`, or anything outside
/// `[a-z0-9-]` means [`DEFAULT_PROVIDER`]; the result is spliced into API
/// group names.
pub fn resolve_provider(provider: &str) -> String {
    let p = provider.trim().to_ascii_lowercase();
    if p.is_empty() || p == "auto" {
        return DEFAULT_PROVIDER.to_string();
    }
    if !p.bytes().all(|b| b.is_ascii_lowercase() || b.is_ascii_digit() || b == b'-') {
        tracing::debug!(provider = %p, "unsupported provider name, using default");
        return DEFAULT_PROVIDER.to_string();
    }
    p
}

/// Template id `description` selects (`composition` when nothing matches).
pub fn template_for(description: &str) -> &'static str {
    let lower = description.to_lowercase();
    rules()
        .iter()
        .find(|rule| rule.keywords.iter().any(|k| lower.contains(k)))
        .map(|rule| rule.id)
        .unwrap_or("composition")
}

/// Render a YAML manifest for a free-text description.
pub fn generate(description: &str, provider: &str) -> String {
    let provider = resolve_provider(provider);
    let req = Request {
        description,
        lower: description.to_lowercase(),
        provider: &provider,
    };
    let render = rules()
        .into_iter()
        .find(|rule| rule.keywords.iter().any(|k| req.mentions(k)))
        .map(|rule| rule.render)
        .unwrap_or(composition);
    render(&req)
}

/// Convert a (possibly multi-document) YAML manifest to pretty JSON. A single
/// document becomes an object; several become an array.
pub fn to_json(yaml: &str) -> Result<String> {
    let mut docs = Vec::new();
    for doc in serde_yaml::Deserializer::from_str(yaml) {
        let value = serde_json::Value::deserialize(doc)?;
        if !value.is_null() {
            docs.push(value);
        }
    }
    let out = match docs.len() {
        1 => docs.remove(0),
        _ => serde_json::Value::Array(docs),
    };
    Ok(serde_json::to_string_pretty(&out)?)
}

// ---------------------------------------------------------------------------
// Templates
// ---------------------------------------------------------------------------

fn database(req: &Request) -> String {
    let (engine, version) = if req.mentions("mysql") {
        ("mysql", "8.0")
    } else {
        ("postgres", "15.4")
    };
    format!(
        r#"# Database instance generated by crossplane-ai
apiVersion: rds.{provider}.crossplane.io/v1alpha1
kind: DBInstance
metadata:
  name: my-database
  labels:
    generated-by: crossplane-ai
spec:
  forProvider:
    region: us-east-1
    dbInstanceClass: db.t3.micro
    engine: {engine}
    engineVersion: "{version}"
    allocatedStorage: 20
    dbName: myapp
    masterUsername: admin
    autoMinorVersionUpgrade: true
    backupRetentionPeriod: 7
    storageEncrypted: true
    publiclyAccessible: false
  providerConfigRef:
    name: default
  writeConnectionSecretToRef:
    name: my-database-connection
    namespace: crossplane-system
"#,
        provider = req.provider,
    )
}

fn storage(req: &Request) -> String {
    let versioning = if req.mentions("version") { "Enabled" } else { "Suspended" };
    format!(
        r#"# Storage bucket generated by crossplane-ai
apiVersion: s3.{provider}.crossplane.io/v1beta1
kind: Bucket
metadata:
  name: my-storage-bucket
  labels:
    generated-by: crossplane-ai
spec:
  forProvider:
    locationConstraint: us-east-1
    versioningConfiguration:
      status: {versioning}
    serverSideEncryptionConfiguration:
      rules:
      - applyServerSideEncryptionByDefault:
          sseAlgorithm: AES256
    publicAccessBlockConfiguration:
      blockPublicAcls: true
      blockPublicPolicy: true
      ignorePublicAcls: true
      restrictPublicBuckets: true
  providerConfigRef:
    name: default
"#,
        provider = req.provider,
    )
}

fn network(req: &Request) -> String {
    format!(
        r#"# Network generated by crossplane-ai
apiVersion: ec2.{provider}.crossplane.io/v1beta1
kind: VPC
metadata:
  name: my-vpc
  labels:
    generated-by: crossplane-ai
    name: my-vpc
spec:
  forProvider:
    region: us-east-1
    cidrBlock: 10.0.0.0/16
    enableDnsHostNames: true
    enableDnsSupport: true
  providerConfigRef:
    name: default
---
apiVersion: ec2.{provider}.crossplane.io/v1beta1
kind: Subnet
metadata:
  name: my-subnet-private
  labels:
    generated-by: crossplane-ai
spec:
  forProvider:
    region: us-east-1
    availabilityZone: us-east-1a
    cidrBlock: 10.0.1.0/24
    mapPublicIPOnLaunch: false
    vpcIdSelector:
      matchLabels:
        name: my-vpc
  providerConfigRef:
    name: default
"#,
        provider = req.provider,
    )
}

fn compute(req: &Request) -> String {
    format!(
        r#"# Compute instance generated by crossplane-ai
apiVersion: ec2.{provider}.crossplane.io/v1alpha1
kind: Instance
metadata:
  name: my-instance
  labels:
    generated-by: crossplane-ai
spec:
  forProvider:
    region: us-east-1
    instanceType: t3.micro
    imageId: ami-0abcdef1234567890
    tags:
      - key: Name
        value: my-instance
      - key: GeneratedBy
        value: crossplane-ai
  providerConfigRef:
    name: default
"#,
        provider = req.provider,
    )
}

fn composition(req: &Request) -> String {
    let summary = req.description.replace(['\n', '\r'], " ");
    format!(
        r#"# Composition generated by crossplane-ai for: {summary}
apiVersion: apiextensions.crossplane.io/v1
kind: Composition
metadata:
  name: my-composition
  labels:
    generated-by: crossplane-ai
    provider: {provider}
spec:
  compositeTypeRef:
    apiVersion: example.org/v1alpha1
    kind: XResource
  resources:
  - name: resource
    base:
      apiVersion: example.org/v1alpha1
      kind: Resource
      spec:
        forProvider:
          region: us-east-1
    patches:
    - type: FromCompositeFieldPath
      fromFieldPath: spec.region
      toFieldPath: spec.forProvider.region
"#,
        provider = req.provider,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(yaml: &str) -> serde_yaml::Value {
        serde_yaml::from_str(yaml).unwrap()
    }

    #[test]
    fn keyword_selects_template() {
        assert_eq!(template_for("a Postgres database"), "database");
        assert_eq!(template_for("S3 bucket with versioning"), "storage");
        assert_eq!(template_for("VPC with two subnets"), "network");
        assert_eq!(template_for("a web server"), "compute");
        assert_eq!(template_for("something else"), "composition");
        // database wins over compute when both appear
        assert_eq!(template_for("mysql database instance"), "database");
    }

    #[test]
    fn auto_provider_defaults_to_aws() {
        assert_eq!(resolve_provider(""), "aws");
        assert_eq!(resolve_provider("auto"), "aws");
        assert_eq!(resolve_provider("GCP"), "gcp");
        let yaml = generate("mysql database", "auto");
        let doc = parse(&yaml);
        assert_eq!(doc["apiVersion"].as_str(), Some("rds.aws.crossplane.io/v1alpha1"));
        assert_eq!(doc["spec"]["forProvider"]["engine"].as_str(), Some("mysql"));
    }

    #[test]
    fn unsafe_provider_falls_back_to_default() {
        assert_eq!(resolve_provider("a: b"), "aws");
        assert_eq!(resolve_provider("aws.evil/x"), "aws");
        assert_eq!(resolve_provider("upjet-aws"), "upjet-aws");

        let yaml = generate("postgres database", "a: b");
        let doc = parse(&yaml);
        assert_eq!(doc["apiVersion"].as_str(), Some("rds.aws.crossplane.io/v1alpha1"));
        assert!(to_json(&yaml).is_ok());
    }

    #[test]
    fn provider_lands_in_api_group() {
        let doc = parse(&generate("storage bucket with versioning", "gcp"));
        assert_eq!(doc["apiVersion"].as_str(), Some("s3.gcp.crossplane.io/v1beta1"));
        assert_eq!(
            doc["spec"]["forProvider"]["versioningConfiguration"]["status"].as_str(),
            Some("Enabled")
        );
    }

    #[test]
    fn fallback_composition_quotes_description_on_one_line() {
        let yaml = generate("a queue\nfor events", "azure");
        assert!(yaml.starts_with("# Composition generated by crossplane-ai for: a queue for events"));
        let doc = parse(&yaml);
        assert_eq!(doc["kind"].as_str(), Some("Composition"));
        assert_eq!(doc["metadata"]["labels"]["provider"].as_str(), Some("azure"));
    }

    #[test]
    fn to_json_single_and_multi_document() {
        let single: serde_json::Value =
            serde_json::from_str(&to_json(&generate("compute", "")).unwrap()).unwrap();
        assert_eq!(single["kind"], "Instance");

        let multi: serde_json::Value =
            serde_json::from_str(&to_json(&generate("vpc", "")).unwrap()).unwrap();
        let docs = multi.as_array().unwrap();
        assert_eq!(docs.len(), 2);
        assert_eq!(docs[1]["kind"], "Subnet");
    }

    #[test]
    fn to_json_rejects_invalid_yaml() {
        assert!(to_json("key: [unclosed").is_err());
    }
}
