use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum XpaiError {
    #[error("config file not found: {}", .0.display())]
    ConfigNotFound(PathBuf),

    #[error("invalid output format '{0}': expected table, json, or yaml")]
    InvalidOutputFormat(String),

    #[error("invalid readiness status: {0}")]
    InvalidStatus(String),

    #[error("invalid priority: {0}")]
    InvalidPriority(String),

    #[error("invalid severity: {0}")]
    InvalidSeverity(String),

    #[error("failed to initialize cluster client: {0}")]
    ClusterInit(String),

    #[error("cannot reach the cluster API server: {0}")]
    ClusterUnreachable(String),

    #[error("resource discovery timed out after {}s", .0.as_secs())]
    DiscoveryTimeout(Duration),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, XpaiError>;
