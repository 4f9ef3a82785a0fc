use anyhow::Context;
use serde_json::Value;
use std::future::Future;
use std::io::IsTerminal;
use std::path::PathBuf;
use xpai_core::catalog::ResourceKind;
use xpai_core::config::{self, Config};
use xpai_core::discovery::{Aggregator, ResourceFilter, ResourceSource, SourceError};
use xpai_core::kube_source::{KubeOptions, KubeSource};
use xpai_core::resource::ResourceRecord;
use xpai_core::router::Responder;
use xpai_core::sample::SampleSource;
use xpai_core::types::OutputFormat;

// ---------------------------------------------------------------------------
// ClusterSource
// ---------------------------------------------------------------------------

/// The two places resources come from: a live API server or the embedded
/// sample cluster.
pub enum ClusterSource {
    Kube(KubeSource),
    Sample(SampleSource),
}

impl ResourceSource for ClusterSource {
    async fn ping(&self) -> Result<(), SourceError> {
        match self {
            ClusterSource::Kube(s) => s.ping().await,
            ClusterSource::Sample(s) => s.ping().await,
        }
    }

    async fn list(&self, kind: &ResourceKind) -> Result<Vec<Value>, SourceError> {
        match self {
            ClusterSource::Kube(s) => s.list(kind).await,
            ClusterSource::Sample(s) => s.list(kind).await,
        }
    }
}

// ---------------------------------------------------------------------------
// GlobalOpts
// ---------------------------------------------------------------------------

/// Flags shared by every subcommand.
#[derive(Debug, Clone, Default)]
pub struct GlobalOpts {
    pub kubeconfig: Option<PathBuf>,
    pub context: Option<String>,
    pub mock: bool,
    pub output: Option<OutputFormat>,
}

// ---------------------------------------------------------------------------
// Session
// ---------------------------------------------------------------------------

/// Per-invocation state: configuration, a current-thread runtime, the
/// responder, and a lazily connected discovery aggregator.
pub struct Session {
    pub config: Config,
    pub output: OutputFormat,
    pub mock: bool,
    pub color: bool,
    kube: KubeOptions,
    runtime: tokio::runtime::Runtime,
    responder: Responder,
    aggregator: Option<Aggregator<ClusterSource>>,
}

impl Session {
    pub fn new(opts: &GlobalOpts, config: Config) -> anyhow::Result<Self> {
        let mock = opts.mock || config::mock_requested_by_env();
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .context("failed to start async runtime")?;

        let mut kube = KubeOptions::from_config(&config.kubernetes);
        if let Some(path) = &opts.kubeconfig {
            kube.kubeconfig = Some(path.clone());
        }
        if let Some(context) = &opts.context {
            kube.context = Some(context.clone());
        }

        let responder = Responder::from_config(&config, mock);
        tracing::debug!(mock, completion = responder.uses_completion(), "session ready");

        Ok(Self {
            output: opts.output.unwrap_or(config.cli.output_format),
            color: config.cli.color && std::io::stdout().is_terminal(),
            config,
            mock,
            kube,
            runtime,
            responder,
            aggregator: None,
        })
    }

    pub fn responder(&self) -> &Responder {
        &self.responder
    }

    pub fn block_on<F: Future>(&self, future: F) -> F::Output {
        self.runtime.block_on(future)
    }

    fn connect(&self) -> anyhow::Result<Aggregator<ClusterSource>> {
        let source = if self.mock {
            ClusterSource::Sample(SampleSource::new())
        } else {
            let source = self.block_on(KubeSource::connect(&self.kube))?;
            ClusterSource::Kube(source)
        };
        Ok(Aggregator::new(source, self.config.catalog()).with_timeout(self.config.analysis.timeout()))
    }

    /// Run one discovery pass, connecting on first use.
    pub fn records(&mut self, filter: &ResourceFilter) -> anyhow::Result<Vec<ResourceRecord>> {
        let aggregator = match self.aggregator.take() {
            Some(a) => a,
            None => self.connect()?,
        };
        let result = self.block_on(aggregator.list_filtered(filter));
        self.aggregator = Some(aggregator);
        result.context("failed to get resources")
    }

    /// `namespace` from the flag, else the configured default. Provider names
    /// are inferred lower-case, so the flag is lower-cased to match.
    pub fn filter(
        &self,
        name: Option<String>,
        provider: Option<String>,
        namespace: Option<String>,
    ) -> ResourceFilter {
        ResourceFilter {
            name,
            provider: provider.map(|p| p.trim().to_ascii_lowercase()),
            namespace: namespace.or_else(|| self.config.kubernetes.namespace.clone()),
        }
    }
}
