use crate::catalog::{self, ResourceKind};
use crate::error::{Result, XpaiError};
use crate::types::OutputFormat;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const CONFIG_FILE: &str = ".crossplane-ai.yaml";

/// Set to `mock` to run against the embedded sample cluster.
pub const MODE_ENV: &str = "CROSSPLANE_AI_MODE";

/// Fallback source for the completion-service credential.
pub const API_KEY_ENV: &str = "OPENAI_API_KEY";

/// True when [`MODE_ENV`] is set to `mock`.
pub fn mock_requested_by_env() -> bool {
    std::env::var(MODE_ENV)
        .map(|v| v.trim().eq_ignore_ascii_case("mock"))
        .unwrap_or(false)
}

// ---------------------------------------------------------------------------
// ConfigWarning / WarnLevel
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigWarning {
    pub level: WarnLevel,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WarnLevel {
    Warning,
    Error,
}

// ---------------------------------------------------------------------------
// AiConfig
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AiConfig {
    /// `mock` (templates only) or `openai`.
    #[serde(default = "default_ai_provider")]
    pub provider: String,
    /// Literal key, or `${VAR}` to read it from the environment.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub api_key: String,
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
}

fn default_ai_provider() -> String {
    "mock".to_string()
}

fn default_model() -> String {
    openai_chat::DEFAULT_MODEL.to_string()
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            provider: default_ai_provider(),
            api_key: String::new(),
            model: default_model(),
            base_url: None,
        }
    }
}

// ---------------------------------------------------------------------------
// KubernetesConfig
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct KubernetesConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kubeconfig: Option<PathBuf>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,
    /// Default namespace filter for commands that accept `--namespace`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,
}

// ---------------------------------------------------------------------------
// CrossplaneConfig
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CrossplaneConfig {
    /// Provider allow-list (e.g. `aws`, `gcp`). Empty = all.
    #[serde(default)]
    pub providers: Vec<String>,
    /// Plural allow-list (e.g. `buckets`). Empty = all.
    #[serde(default)]
    pub resource_types: Vec<String>,
    /// Replaces the built-in kind table when non-empty.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub kinds: Vec<ResourceKind>,
}

// ---------------------------------------------------------------------------
// CliConfig
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CliConfig {
    #[serde(default)]
    pub output_format: OutputFormat,
    #[serde(default)]
    pub verbose: bool,
    #[serde(default = "default_true")]
    pub color: bool,
}

fn default_true() -> bool {
    true
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            output_format: OutputFormat::Table,
            verbose: false,
            color: true,
        }
    }
}

// ---------------------------------------------------------------------------
// AnalysisConfig
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisConfig {
    /// Seconds allowed for one discovery pass and for one completion call.
    #[serde(default = "default_timeout")]
    pub timeout: u64,
    /// Upper bound on `suggest --limit`.
    #[serde(default = "default_max_suggestions")]
    pub max_suggestions: usize,
    /// Include the resource listing in table-mode analysis reports.
    #[serde(default = "default_true")]
    pub detailed: bool,
}

fn default_timeout() -> u64 {
    30
}

fn default_max_suggestions() -> usize {
    10
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            timeout: default_timeout(),
            max_suggestions: default_max_suggestions(),
            detailed: true,
        }
    }
}

impl AnalysisConfig {
    /// Effective timeout. Zero is rejected by `validate()` and treated as the
    /// default here.
    pub fn timeout(&self) -> Duration {
        if self.timeout == 0 {
            tracing::warn!(default = default_timeout(), "analysis.timeout is 0, using default");
            return Duration::from_secs(default_timeout());
        }
        Duration::from_secs(self.timeout)
    }
}

// ---------------------------------------------------------------------------
// Config (top-level)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub ai: AiConfig,
    #[serde(default)]
    pub kubernetes: KubernetesConfig,
    #[serde(default)]
    pub crossplane: CrossplaneConfig,
    #[serde(default)]
    pub cli: CliConfig,
    #[serde(default)]
    pub analysis: AnalysisConfig,
}

impl Config {
    /// Load configuration.
    ///
    /// Lookup order:
    /// 1. `explicit` (from `--config`); it is an error if that file is missing
    /// 2. `./.crossplane-ai.yaml`
    /// 3. `$HOME/.crossplane-ai.yaml`
    /// 4. built-in defaults
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            if !path.exists() {
                return Err(XpaiError::ConfigNotFound(path.to_path_buf()));
            }
            return Self::load_from(path);
        }

        match Self::discover() {
            Some(path) => Self::load_from(&path),
            None => Ok(Self::default()),
        }
    }

    /// First existing config file in the default lookup locations.
    pub fn discover() -> Option<PathBuf> {
        let cwd = std::env::current_dir().ok().map(|d| d.join(CONFIG_FILE));
        let home = home::home_dir().map(|h| h.join(CONFIG_FILE));
        [cwd, home].into_iter().flatten().find(|p| p.is_file())
    }

    /// Default location written by `config init`.
    pub fn default_path() -> Option<PathBuf> {
        home::home_dir().map(|h| h.join(CONFIG_FILE))
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let data = std::fs::read_to_string(path)?;
        if data.trim().is_empty() {
            return Ok(Self::default());
        }
        let cfg: Config = serde_yaml::from_str(&data)?;
        tracing::debug!(path = %path.display(), "loaded config");
        Ok(cfg)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let data = serde_yaml::to_string(self)?;
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        std::fs::write(path, data)?;
        Ok(())
    }

    /// The kind table discovery should iterate.
    pub fn catalog(&self) -> Vec<ResourceKind> {
        catalog::from_config(&self.crossplane)
    }

    // -----------------------------------------------------------------------
    // Credentials
    // -----------------------------------------------------------------------

    pub fn resolve_api_key(&self) -> Option<String> {
        self.resolve_api_key_with(|name| std::env::var(name).ok())
    }

    /// Resolve the completion credential: `${VAR}` expands through `env`, a
    /// literal key is used as-is, and an empty key falls back to
    /// [`API_KEY_ENV`]. Blank results count as absent.
    pub fn resolve_api_key_with(&self, env: impl Fn(&str) -> Option<String>) -> Option<String> {
        let key = self.ai.api_key.trim();
        let resolved = if key.is_empty() {
            env(API_KEY_ENV)
        } else if let Some(var) = key.strip_prefix("${").and_then(|k| k.strip_suffix('}')) {
            env(var)
        } else {
            Some(key.to_string())
        };
        resolved.filter(|k| !k.trim().is_empty())
    }

    pub fn completion_config(&self) -> Option<openai_chat::ClientConfig> {
        self.completion_config_with(|name| std::env::var(name).ok())
    }

    /// Client settings for the completion service, or `None` when the
    /// configured provider is not `openai` or no credential resolves.
    pub fn completion_config_with(
        &self,
        env: impl Fn(&str) -> Option<String>,
    ) -> Option<openai_chat::ClientConfig> {
        if !self.ai.provider.eq_ignore_ascii_case("openai") {
            return None;
        }
        let api_key = self.resolve_api_key_with(env)?;
        let defaults = openai_chat::ClientConfig::default();
        Some(openai_chat::ClientConfig {
            api_key,
            model: self.ai.model.clone(),
            base_url: self.ai.base_url.clone().unwrap_or(defaults.base_url),
            timeout: self.analysis.timeout(),
            ..defaults
        })
    }

    /// Copy safe to print: a literal API key is masked, `${VAR}` references
    /// are kept.
    pub fn redacted(&self) -> Self {
        let mut cfg = self.clone();
        if !cfg.ai.api_key.is_empty() && !cfg.ai.api_key.starts_with("${") {
            cfg.ai.api_key = "********".to_string();
        }
        cfg
    }

    // -----------------------------------------------------------------------
    // Validation
    // -----------------------------------------------------------------------

    pub fn validate(&self) -> Vec<ConfigWarning> {
        self.validate_with(|name| std::env::var(name).ok())
    }

    pub fn validate_with(&self, env: impl Fn(&str) -> Option<String>) -> Vec<ConfigWarning> {
        let mut warnings = Vec::new();

        // 1. AI provider must be one we know how to drive
        let provider = self.ai.provider.to_ascii_lowercase();
        if provider != "mock" && provider != "openai" {
            warnings.push(ConfigWarning {
                level: WarnLevel::Error,
                message: format!(
                    "unknown ai.provider '{}': expected 'mock' or 'openai'",
                    self.ai.provider
                ),
            });
        }

        // 2. openai without a credential silently degrades to templates
        if provider == "openai" && self.resolve_api_key_with(&env).is_none() {
            warnings.push(ConfigWarning {
                level: WarnLevel::Warning,
                message: format!(
                    "ai.provider is 'openai' but no API key resolves (set ai.api_key or {API_KEY_ENV}); \
                     template answers will be used"
                ),
            });
        }

        // 3. A zero timeout would fail every discovery pass
        if self.analysis.timeout == 0 {
            warnings.push(ConfigWarning {
                level: WarnLevel::Error,
                message: "analysis.timeout must be greater than 0".to_string(),
            });
        }

        // 4. Explicit kinds need all three coordinates
        for kind in &self.crossplane.kinds {
            if kind.version.trim().is_empty() || kind.plural.trim().is_empty() {
                warnings.push(ConfigWarning {
                    level: WarnLevel::Error,
                    message: format!("crossplane.kinds entry '{kind}' is missing a version or plural"),
                });
            }
        }

        // 5. Allow-lists that filter everything out
        if self.catalog().is_empty() {
            warnings.push(ConfigWarning {
                level: WarnLevel::Warning,
                message: "crossplane allow-lists exclude every kind; discovery will find nothing"
                    .to_string(),
            });
        }

        // 6. Explicit kubeconfig that does not exist
        if let Some(path) = &self.kubernetes.kubeconfig {
            if !path.exists() {
                warnings.push(ConfigWarning {
                    level: WarnLevel::Warning,
                    message: format!("kubernetes.kubeconfig '{}' does not exist", path.display()),
                });
            }
        }

        warnings
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn no_env(_: &str) -> Option<String> {
        None
    }

    #[test]
    fn default_config_roundtrip() {
        let cfg = Config::default();
        let yaml = serde_yaml::to_string(&cfg).unwrap();
        let parsed: Config = serde_yaml::from_str(&yaml).unwrap();
        assert_eq!(parsed.ai.provider, "mock");
        assert_eq!(parsed.ai.model, "gpt-4");
        assert_eq!(parsed.cli.output_format, OutputFormat::Table);
        assert_eq!(parsed.analysis.timeout, 30);
        assert!(!yaml.contains("api_key"));
    }

    #[test]
    fn partial_yaml_fills_defaults() {
        let yaml = "ai:\n  provider: openai\ncli:\n  output_format: json\n";
        let cfg: Config = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(cfg.ai.provider, "openai");
        assert_eq!(cfg.ai.model, "gpt-4");
        assert_eq!(cfg.cli.output_format, OutputFormat::Json);
        assert!(cfg.cli.color);
        assert_eq!(cfg.analysis.max_suggestions, 10);
    }

    #[test]
    fn kinds_table_from_yaml() {
        let yaml = r#"
crossplane:
  kinds:
    - group: network.aws.crossplane.io
      version: v1beta1
      plural: vpcs
"#;
        let cfg: Config = serde_yaml::from_str(yaml).unwrap();
        let catalog = cfg.catalog();
        assert_eq!(catalog.len(), 1);
        assert_eq!(catalog[0].plural, "vpcs");
    }

    #[test]
    fn explicit_missing_file_is_an_error() {
        let dir = TempDir::new().unwrap();
        let err = Config::load(Some(&dir.path().join("nope.yaml"))).unwrap_err();
        assert!(matches!(err, XpaiError::ConfigNotFound(_)));
    }

    #[test]
    fn save_then_load() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join(CONFIG_FILE);
        let mut cfg = Config::default();
        cfg.crossplane.providers = vec!["aws".into()];
        cfg.save(&path).unwrap();

        let loaded = Config::load(Some(&path)).unwrap();
        assert_eq!(loaded.crossplane.providers, vec!["aws".to_string()]);
    }

    #[test]
    fn empty_file_yields_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(CONFIG_FILE);
        std::fs::write(&path, "\n").unwrap();
        let cfg = Config::load_from(&path).unwrap();
        assert_eq!(cfg.ai.provider, "mock");
    }

    #[test]
    fn api_key_literal_and_env_reference() {
        let mut cfg = Config::default();
        cfg.ai.api_key = "sk-literal".into();
        assert_eq!(cfg.resolve_api_key_with(no_env).as_deref(), Some("sk-literal"));

        cfg.ai.api_key = "${MY_KEY}".into();
        let env = |name: &str| (name == "MY_KEY").then(|| "sk-from-env".to_string());
        assert_eq!(cfg.resolve_api_key_with(env).as_deref(), Some("sk-from-env"));
        assert_eq!(cfg.resolve_api_key_with(no_env), None);
    }

    #[test]
    fn api_key_falls_back_to_openai_env() {
        let cfg = Config::default();
        let env = |name: &str| (name == API_KEY_ENV).then(|| "sk-env".to_string());
        assert_eq!(cfg.resolve_api_key_with(env).as_deref(), Some("sk-env"));
        let blank = |_: &str| Some("   ".to_string());
        assert_eq!(cfg.resolve_api_key_with(blank), None);
    }

    #[test]
    fn completion_requires_openai_provider_and_key() {
        let env = |name: &str| (name == API_KEY_ENV).then(|| "sk".to_string());
        let mut cfg = Config::default();
        assert!(cfg.completion_config_with(env).is_none());

        cfg.ai.provider = "openai".into();
        cfg.analysis.timeout = 7;
        cfg.ai.base_url = Some("http://localhost:9999/v1".into());
        let cc = cfg.completion_config_with(env).unwrap();
        assert_eq!(cc.api_key, "sk");
        assert_eq!(cc.base_url, "http://localhost:9999/v1");
        assert_eq!(cc.timeout, Duration::from_secs(7));

        assert!(cfg.completion_config_with(no_env).is_none());
    }

    #[test]
    fn redacted_masks_literal_keys_only() {
        let mut cfg = Config::default();
        cfg.ai.api_key = "sk-secret".into();
        assert_eq!(cfg.redacted().ai.api_key, "********");
        cfg.ai.api_key = "${OPENAI_API_KEY}".into();
        assert_eq!(cfg.redacted().ai.api_key, "${OPENAI_API_KEY}");
    }

    #[test]
    fn validate_default_config_is_clean() {
        assert!(Config::default().validate_with(no_env).is_empty());
    }

    #[test]
    fn validate_flags_problems() {
        let mut cfg = Config::default();
        cfg.ai.provider = "anthropic".into();
        cfg.analysis.timeout = 0;
        cfg.crossplane.resource_types = vec!["nothing-matches".into()];
        let warnings = cfg.validate_with(no_env);
        assert!(warnings
            .iter()
            .any(|w| w.level == WarnLevel::Error && w.message.contains("anthropic")));
        assert!(warnings.iter().any(|w| w.message.contains("timeout")));
        assert!(warnings.iter().any(|w| w.message.contains("exclude every kind")));
    }

    #[test]
    fn zero_timeout_falls_back_to_default() {
        let mut cfg = Config::default();
        cfg.analysis.timeout = 0;
        assert_eq!(cfg.analysis.timeout(), Duration::from_secs(30));
        cfg.ai.provider = "openai".into();
        cfg.ai.api_key = "sk-test".into();
        let cc = cfg.completion_config_with(no_env).unwrap();
        assert_eq!(cc.timeout, Duration::from_secs(30));
    }

    #[test]
    fn validate_warns_openai_without_key() {
        let mut cfg = Config::default();
        cfg.ai.provider = "openai".into();
        let warnings = cfg.validate_with(no_env);
        assert_eq!(warnings.len(), 1);
        assert_eq!(warnings[0].level, WarnLevel::Warning);
    }
}
