use kube::api::{Api, ApiResource, DynamicObject, GroupVersionKind, ListParams};
use kube::config::{KubeConfigOptions, Kubeconfig};
use serde_json::Value;
use std::path::PathBuf;

use crate::catalog::ResourceKind;
use crate::config::KubernetesConfig;
use crate::discovery::{ResourceSource, SourceError};
use crate::error::{Result, XpaiError};

/// How to reach the cluster.
#[derive(Debug, Clone, Default)]
pub struct KubeOptions {
    /// Explicit kubeconfig file. When absent, `$KUBECONFIG` and
    /// `~/.kube/config` are tried before falling back to in-cluster config.
    pub kubeconfig: Option<PathBuf>,
    pub context: Option<String>,
}

impl KubeOptions {
    pub fn from_config(cfg: &KubernetesConfig) -> Self {
        Self {
            kubeconfig: cfg.kubeconfig.clone(),
            context: cfg.context.clone(),
        }
    }

    async fn client_config(&self) -> Result<kube::Config> {
        let options = KubeConfigOptions {
            context: self.context.clone(),
            ..Default::default()
        };

        let kubeconfig = match &self.kubeconfig {
            Some(path) => Some(
                Kubeconfig::read_from(path)
                    .map_err(|e| XpaiError::ClusterInit(format!("{}: {e}", path.display())))?,
            ),
            None => match Kubeconfig::read() {
                Ok(kc) => Some(kc),
                Err(e) => {
                    tracing::debug!(error = %e, "no kubeconfig, trying in-cluster config");
                    None
                }
            },
        };

        match kubeconfig {
            Some(kc) => kube::Config::from_custom_kubeconfig(kc, &options)
                .await
                .map_err(|e| XpaiError::ClusterInit(e.to_string())),
            None => kube::Config::infer()
                .await
                .map_err(|e| XpaiError::ClusterInit(e.to_string())),
        }
    }
}

/// [`ResourceSource`] backed by the Kubernetes API server.
#[derive(Clone)]
pub struct KubeSource {
    client: kube::Client,
}

impl KubeSource {
    pub async fn connect(options: &KubeOptions) -> Result<Self> {
        let config = options.client_config().await?;
        tracing::debug!(cluster = %config.cluster_url, "building cluster client");
        let client = kube::Client::try_from(config).map_err(|e| XpaiError::ClusterInit(e.to_string()))?;
        Ok(Self { client })
    }
}

impl ResourceSource for KubeSource {
    async fn ping(&self) -> std::result::Result<(), SourceError> {
        let info = self
            .client
            .apiserver_version()
            .await
            .map_err(|e| SourceError::Unreachable(e.to_string()))?;
        tracing::debug!(version = %info.git_version, "api server reachable");
        Ok(())
    }

    async fn list(&self, kind: &ResourceKind) -> std::result::Result<Vec<Value>, SourceError> {
        let gvk = GroupVersionKind::gvk(&kind.group, &kind.version, "");
        let resource = ApiResource::from_gvk_with_plural(&gvk, &kind.plural);
        let api: Api<DynamicObject> = Api::all_with(self.client.clone(), &resource);

        let list = api.list(&ListParams::default()).await.map_err(|e| match e {
            kube::Error::Api(resp) if resp.code == 404 => SourceError::NotFound(kind.to_string()),
            other => SourceError::Api(other.to_string()),
        })?;

        list.items
            .iter()
            .map(|obj| serde_json::to_value(obj).map_err(|e| SourceError::Decode(e.to_string())))
            .collect()
    }
}
