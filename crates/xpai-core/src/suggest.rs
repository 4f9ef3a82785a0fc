use serde::{Deserialize, Serialize};

use crate::resource::{ResourceRecord, PLATFORM_PROVIDER};
use crate::types::{Priority, ReadyStatus};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Suggestion {
    pub title: String,
    pub description: String,
    #[serde(default = "default_priority")]
    pub priority: Priority,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub example: Option<String>,
}

fn default_priority() -> Priority {
    Priority::Medium
}

impl Suggestion {
    fn new(title: &str, description: impl Into<String>, priority: Priority, category: &str) -> Self {
        Self {
            title: title.to_string(),
            description: description.into(),
            priority,
            category: Some(category.to_string()),
            example: None,
        }
    }

    fn with_example(mut self, example: &str) -> Self {
        self.example = Some(example.to_string());
        self
    }
}

// ---------------------------------------------------------------------------
// Inventory
// ---------------------------------------------------------------------------

/// Counts over a record collection that suggestion templates quote.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Inventory {
    pub total: usize,
    pub not_ready: usize,
    /// Distinct cloud providers, platform kinds excluded.
    pub providers: usize,
    pub databases: usize,
    pub storage: usize,
    pub compute: usize,
    pub network: usize,
}

const DATABASE_KINDS: &[&str] = &["db", "database"];
const COMPUTE_KINDS: &[&str] = &["instances", "virtualmachines", "clusters"];

fn kind_has(record: &ResourceRecord, needles: &[&str]) -> bool {
    needles.iter().any(|n| record.kind.contains(n))
}

fn count_kinds(records: &[ResourceRecord], needles: &[&str]) -> usize {
    records.iter().filter(|r| kind_has(r, needles)).count()
}

impl Inventory {
    pub fn from_records(records: &[ResourceRecord]) -> Self {
        let mut providers: Vec<&str> = records
            .iter()
            .map(|r| r.provider.as_str())
            .filter(|p| *p != PLATFORM_PROVIDER)
            .collect();
        providers.sort_unstable();
        providers.dedup();

        Self {
            total: records.len(),
            not_ready: records
                .iter()
                .filter(|r| r.status == ReadyStatus::NotReady)
                .count(),
            providers: providers.len(),
            databases: count_kinds(records, DATABASE_KINDS),
            storage: count_kinds(records, &["bucket", "account", "storage"]),
            compute: records
                .iter()
                .filter(|r| kind_has(r, COMPUTE_KINDS) && !kind_has(r, DATABASE_KINDS))
                .count(),
            network: count_kinds(records, &["vpc", "subnet", "network", "securitygroup"]),
        }
    }
}

fn plural(n: usize, noun: &str) -> String {
    if n == 1 {
        format!("{n} {noun}")
    } else {
        format!("{n} {noun}s")
    }
}

// ---------------------------------------------------------------------------
// Category rules
// ---------------------------------------------------------------------------

pub struct CategoryRule {
    pub id: &'static str,
    pub keywords: &'static [&'static str],
    pub build: fn(&Inventory) -> Vec<Suggestion>,
}

const BACKUP_EXAMPLE: &str = "spec:\n  forProvider:\n    backupRetentionPeriod: 7\n    preferredBackupWindow: \"03:00-04:00\"";
const ENCRYPTION_EXAMPLE: &str = "spec:\n  forProvider:\n    storageEncrypted: true";
const CREDENTIALS_EXAMPLE: &str = "apiVersion: aws.crossplane.io/v1beta1\nkind: ProviderConfig\nspec:\n  credentials:\n    source: Secret\n    secretRef:\n      namespace: crossplane-system\n      name: aws-creds\n      key: creds";
const SUBNET_EXAMPLE: &str = "spec:\n  forProvider:\n    mapPublicIPOnLaunch: false\n    cidrBlock: 10.0.10.0/24";

fn database(inv: &Inventory) -> Vec<Suggestion> {
    vec![
        Suggestion::new(
            "Enable Automated Backups",
            format!(
                "Configure automated backups for your {} to ensure data protection",
                plural(inv.databases, "database instance")
            ),
            Priority::High,
            "Reliability",
        )
        .with_example(BACKUP_EXAMPLE),
        Suggestion::new(
            "Implement Read Replicas",
            "Add read replicas to distribute read traffic and improve performance",
            Priority::Medium,
            "Performance",
        ),
        Suggestion::new(
            "Enable Storage Encryption",
            "Encrypt database storage at rest; most providers require this at creation time",
            Priority::High,
            "Security",
        )
        .with_example(ENCRYPTION_EXAMPLE),
    ]
}

fn security(inv: &Inventory) -> Vec<Suggestion> {
    vec![
        Suggestion::new(
            "Enable Encryption at Rest",
            format!(
                "Encrypt your {} and {} to enhance security",
                plural(inv.databases, "database resource"),
                plural(inv.storage, "storage resource")
            ),
            Priority::High,
            "Security",
        ),
        Suggestion::new(
            "Review IAM Policies",
            "Audit and tighten IAM policies to follow the principle of least privilege",
            Priority::High,
            "Security",
        ),
        Suggestion::new(
            "Rotate Provider Credentials",
            format!(
                "Store credentials for your {} in Secrets and rotate them regularly",
                plural(inv.providers, "cloud provider")
            ),
            Priority::Medium,
            "Security",
        )
        .with_example(CREDENTIALS_EXAMPLE),
    ]
}

fn optimize(inv: &Inventory) -> Vec<Suggestion> {
    let mut out = vec![
        Suggestion::new(
            "Right-size Resources",
            format!(
                "Analyze utilization of your {} and adjust instance sizes accordingly",
                plural(inv.compute, "compute resource")
            ),
            Priority::Medium,
            "Cost",
        ),
        Suggestion::new(
            "Implement Auto-scaling",
            "Configure auto-scaling groups to optimize resource usage",
            Priority::Medium,
            "Performance",
        ),
    ];
    if inv.not_ready > 0 {
        out.push(Suggestion::new(
            "Clean Up Failing Resources",
            format!(
                "{} not ready and may still incur cost; fix or delete them",
                if inv.not_ready == 1 {
                    "1 resource is".to_string()
                } else {
                    format!("{} resources are", inv.not_ready)
                }
            ),
            Priority::High,
            "Cost",
        ));
    }
    out
}

fn network(inv: &Inventory) -> Vec<Suggestion> {
    vec![
        Suggestion::new(
            "Use Private Subnets",
            format!(
                "Place databases and compute in private subnets; {} currently managed",
                plural(inv.network, "network resource")
            ),
            Priority::High,
            "Security",
        )
        .with_example(SUBNET_EXAMPLE),
        Suggestion::new(
            "Restrict Security Group Ingress",
            "Limit inbound rules to known CIDR ranges and required ports",
            Priority::High,
            "Security",
        ),
        Suggestion::new(
            "Add VPC Endpoints",
            "Route traffic to managed services through VPC endpoints to avoid NAT charges",
            Priority::Medium,
            "Cost",
        ),
    ]
}

fn general(inv: &Inventory) -> Vec<Suggestion> {
    let mut out = vec![Suggestion::new(
        "Health Check Resources",
        format!(
            "Run regular health checks on all {}",
            plural(inv.total, "Crossplane resource")
        ),
        Priority::Medium,
        "Monitoring",
    )];
    if inv.not_ready > 0 {
        out.push(Suggestion::new(
            "Resolve Not Ready Resources",
            format!(
                "Investigate {} that did not reach Ready",
                plural(inv.not_ready, "resource")
            ),
            Priority::High,
            "Reliability",
        ));
    }
    out.push(Suggestion::new(
        "Update Providers",
        "Keep your Crossplane providers up to date for latest features and security fixes",
        Priority::Low,
        "Maintenance",
    ));
    out.push(Suggestion::new(
        "Adopt Compositions",
        "Wrap managed resources in compositions so teams consume stable abstractions",
        Priority::Medium,
        "Architecture",
    ));
    out
}

/// Category table, first keyword match wins. Anything unmatched uses
/// [`general`].
pub fn default_rules() -> Vec<CategoryRule> {
    vec![
        CategoryRule {
            id: "database",
            keywords: &["database", "db"],
            build: database,
        },
        CategoryRule {
            id: "security",
            keywords: &["security"],
            build: security,
        },
        CategoryRule {
            id: "optimize",
            keywords: &["optimize", "optimization", "cost"],
            build: optimize,
        },
        CategoryRule {
            id: "network",
            keywords: &["network", "networking"],
            build: network,
        },
    ]
}

fn find_rule(category: &str) -> Option<CategoryRule> {
    let key = category.trim().to_ascii_lowercase();
    default_rules()
        .into_iter()
        .find(|rule| rule.keywords.iter().any(|k| *k == key))
}

/// Normalized category id for `category` (`general` when unmatched).
pub fn resolve_category(category: &str) -> &'static str {
    find_rule(category).map(|rule| rule.id).unwrap_or("general")
}

/// Template suggestions for `category`, quoting counts from `records`.
pub fn suggest(category: &str, records: &[ResourceRecord]) -> Vec<Suggestion> {
    let inv = Inventory::from_records(records);
    match find_rule(category) {
        Some(rule) => (rule.build)(&inv),
        None => general(&inv),
    }
}

/// Every accepted category keyword, for help output.
pub fn categories() -> Vec<&'static str> {
    let mut out: Vec<&'static str> = default_rules()
        .iter()
        .flat_map(|rule| rule.keywords.iter().copied())
        .collect();
    out.push("general");
    out
}
