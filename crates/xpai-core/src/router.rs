//! Request routing and response generation.
//!
//! [`Router`] is an ordered keyword rule table producing deterministic
//! template answers. [`Responder`] puts an optional completion client in
//! front of it and falls back to the router whenever the client fails.

use serde::{Deserialize, Serialize};

use crate::analysis::{self, provider_counts, AnalysisResult};
use crate::config::Config;
use crate::manifest;
use crate::resource::ResourceRecord;
use crate::suggest::{self, Suggestion};
use crate::types::ReadyStatus;

/// Records listed by name in a template answer before truncating.
const LIST_LIMIT: usize = 10;

// ---------------------------------------------------------------------------
// RouteContext
// ---------------------------------------------------------------------------

pub struct RouteContext<'a> {
    /// Request exactly as the user typed it.
    pub request: &'a str,
    pub lower: String,
    pub records: &'a [ResourceRecord],
}

impl<'a> RouteContext<'a> {
    pub fn new(request: &'a str, records: &'a [ResourceRecord]) -> Self {
        Self {
            request,
            lower: request.to_lowercase(),
            records,
        }
    }

    fn has(&self, word: &str) -> bool {
        self.lower.contains(word)
    }

    fn ready(&self) -> usize {
        self.records.iter().filter(|r| r.status.is_ready()).count()
    }
}

// ---------------------------------------------------------------------------
// RouteRule / Router
// ---------------------------------------------------------------------------

pub struct RouteRule {
    pub id: &'static str,
    pub condition: fn(&RouteContext) -> bool,
    pub answer: fn(&RouteContext) -> String,
}

pub const FALLBACK_ROUTE: &str = "general";

/// Keyword rules in priority order; the first match wins.
pub fn default_rules() -> Vec<RouteRule> {
    vec![
        RouteRule {
            id: "summary",
            condition: |ctx| ctx.has("what") && ctx.has("resources"),
            answer: summary,
        },
        RouteRule {
            id: "aws",
            condition: |ctx| ctx.has("aws"),
            answer: aws,
        },
        RouteRule {
            id: "database",
            condition: |ctx| ctx.has("database") || ctx.has("db"),
            answer: database,
        },
        RouteRule {
            id: "troubleshoot",
            condition: |ctx| ctx.has("not ready") || ctx.has("failed"),
            answer: troubleshoot,
        },
        RouteRule {
            id: "cost",
            condition: |ctx| ctx.has("cost") || ctx.has("expensive"),
            answer: cost,
        },
    ]
}

pub struct Router {
    rules: Vec<RouteRule>,
    fallback: RouteRule,
}

impl Default for Router {
    fn default() -> Self {
        Self::new(default_rules())
    }
}

impl Router {
    pub fn new(rules: Vec<RouteRule>) -> Self {
        Self {
            rules,
            fallback: RouteRule {
                id: FALLBACK_ROUTE,
                condition: |_| true,
                answer: general,
            },
        }
    }

    fn select(&self, ctx: &RouteContext) -> &RouteRule {
        self.rules
            .iter()
            .find(|rule| (rule.condition)(ctx))
            .unwrap_or(&self.fallback)
    }

    /// The rule `request` routes to.
    pub fn route(&self, request: &str) -> &RouteRule {
        self.select(&RouteContext::new(request, &[]))
    }

    pub fn answer(&self, request: &str, records: &[ResourceRecord]) -> String {
        let ctx = RouteContext::new(request, records);
        let rule = self.select(&ctx);
        tracing::debug!(route = rule.id, "template answer");
        (rule.answer)(&ctx)
    }
}

// ---------------------------------------------------------------------------
// Templates
// ---------------------------------------------------------------------------

fn bullet_list(records: &[&ResourceRecord]) -> String {
    let mut out = String::new();
    for r in records.iter().take(LIST_LIMIT) {
        out.push_str(&format!("  - {} ({}): {}\n", r.display_name(), r.kind, r.status));
    }
    if records.len() > LIST_LIMIT {
        out.push_str(&format!("  ... and {} more\n", records.len() - LIST_LIMIT));
    }
    out
}

fn summary(ctx: &RouteContext) -> String {
    if ctx.records.is_empty() {
        return "Resource Summary:\n\n\
                No Crossplane resources were found in the cluster.\n\
                Install a provider and create a composition to get started, or run\n\
                'crossplane-ai examples' for sample manifests."
            .to_string();
    }
    let mut out = format!(
        "Resource Summary:\n\nYour cluster has {} Crossplane resources, {} ready.\n",
        ctx.records.len(),
        ctx.ready()
    );
    for (provider, count) in provider_counts(ctx.records) {
        out.push_str(&format!("  - {provider}: {count}\n"));
    }
    out.push_str(
        "\nQuick tips:\n\
         - Use 'crossplane-ai analyze' for a detailed health check\n\
         - Run 'crossplane-ai suggest optimize' for optimization recommendations\n\
         - Try 'crossplane-ai ask \"show me failed resources\"' for troubleshooting",
    );
    out
}

fn aws(ctx: &RouteContext) -> String {
    let records: Vec<_> = ctx.records.iter().filter(|r| r.provider == "aws").collect();
    if records.is_empty() {
        return "AWS Resources:\n\nNo AWS resources managed by Crossplane were found.".to_string();
    }
    let ready = records.iter().filter(|r| r.status.is_ready()).count();
    format!(
        "AWS Resources:\n\nFound {} AWS resources managed by Crossplane, {} ready:\n{}\n\
         Check RDS instances for performance optimization opportunities.",
        records.len(),
        ready,
        bullet_list(&records)
    )
}

fn database(ctx: &RouteContext) -> String {
    let records: Vec<_> = ctx
        .records
        .iter()
        .filter(|r| r.kind.contains("db") || r.kind.contains("database"))
        .collect();
    let mut out = String::from("Database Analysis:\n\n");
    if records.is_empty() {
        out.push_str("No database instances were found.\n");
    } else {
        out.push_str(&format!("Found {} database instances:\n", records.len()));
        out.push_str(&bullet_list(&records));
    }
    out.push_str(
        "\nInsights:\n\
         - Enable automated backups for production databases\n\
         - Review connection pooling settings for better performance\n\
         - Keep storage encryption on for data at rest",
    );
    out
}

fn troubleshoot(ctx: &RouteContext) -> String {
    let failing: Vec<_> = ctx
        .records
        .iter()
        .filter(|r| r.status == ReadyStatus::NotReady)
        .collect();
    let mut out = String::from("Troubleshooting Not Ready Resources:\n\n");
    if failing.is_empty() {
        out.push_str("All resources report Ready or no readiness condition.\n");
    } else {
        out.push_str(&format!("{} resources are not ready:\n", failing.len()));
        out.push_str(&bullet_list(&failing));
    }
    out.push_str(
        "\nSteps:\n\
         1. Check resource events for error messages\n\
         2. Verify provider credentials are valid\n\
         3. Ensure required dependencies are available\n\
         4. Check network connectivity to cloud provider APIs",
    );
    out
}

fn cost(ctx: &RouteContext) -> String {
    let compute = ctx
        .records
        .iter()
        .filter(|r| r.kind.contains("instances") || r.kind.contains("virtualmachines"))
        .count();
    format!(
        "Cost Optimization Insights:\n\n\
         {compute} compute and database instances are candidates for review:\n\
         - Use spot instances for non-critical workloads\n\
         - Review instance sizes; some might be over-provisioned\n\
         - Enable auto-scaling to optimize resource usage\n\
         - Use reserved instances for predictable workloads"
    )
}

fn general(ctx: &RouteContext) -> String {
    let providers = provider_counts(ctx.records);
    format!(
        "I understand you're asking about: {}\n\n\
         Your cluster has {} Crossplane resources across {} providers, {} ready.\n\
         - Run 'crossplane-ai analyze' for detailed insights\n\
         - Run 'crossplane-ai suggest' for recommendations\n\n\
         Ask more specific questions about AWS, databases, failed resources, or cost.",
        ctx.request,
        ctx.records.len(),
        providers.len(),
        ctx.ready()
    )
}

// ---------------------------------------------------------------------------
// Responder
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnswerSource {
    Completion,
    Template,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Answer {
    pub text: String,
    pub source: AnswerSource,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Analysis {
    #[serde(flatten)]
    pub result: AnalysisResult,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub narrative: Option<String>,
}

/// Answers requests through the completion service when one is configured,
/// and through [`Router`] templates otherwise or on any completion error.
pub struct Responder {
    router: Router,
    client: Option<openai_chat::Client>,
}

impl Responder {
    pub fn templates_only() -> Self {
        Self {
            router: Router::default(),
            client: None,
        }
    }

    pub fn with_client(client: openai_chat::Client) -> Self {
        Self {
            router: Router::default(),
            client: Some(client),
        }
    }

    /// Completion is used only when `mock` is off and the config resolves a
    /// client; otherwise the responder is template-only.
    pub fn from_config(cfg: &Config, mock: bool) -> Self {
        if mock {
            return Self::templates_only();
        }
        let Some(client_config) = cfg.completion_config() else {
            return Self::templates_only();
        };
        match openai_chat::Client::new(client_config) {
            Ok(client) => Self::with_client(client),
            Err(e) => {
                tracing::warn!(error = %e, "completion client unavailable, using templates");
                Self::templates_only()
            }
        }
    }

    pub fn uses_completion(&self) -> bool {
        self.client.is_some()
    }

    pub fn router(&self) -> &Router {
        &self.router
    }

    /// Run `prompt` through the client, logging and discarding any error.
    async fn complete(&self, prompt: &str) -> Option<String> {
        let client = self.client.as_ref()?;
        match client.ask(prompt).await {
            Ok(text) if !text.trim().is_empty() => Some(text),
            Ok(_) => {
                tracing::info!("completion returned blank text, using template");
                None
            }
            Err(e) => {
                tracing::info!(error = %e, "completion failed, using template");
                None
            }
        }
    }

    pub async fn answer(&self, request: &str, records: &[ResourceRecord]) -> Answer {
        if self.client.is_some() {
            let prompt = format!(
                "Query: {request}\n\nCrossplane Resources Context:\n{}\n\n\
                 Please analyze these resources and respond to the query.",
                snapshot(records)
            );
            if let Some(text) = self.complete(&prompt).await {
                return Answer {
                    text,
                    source: AnswerSource::Completion,
                };
            }
        }
        Answer {
            text: self.router.answer(request, records),
            source: AnswerSource::Template,
        }
    }

    /// The result is always computed locally; the completion service only
    /// adds narrative text.
    pub async fn analyze(&self, records: &[ResourceRecord], health_check: bool) -> Analysis {
        let result = analysis::analyze(records, health_check);
        let narrative = if self.client.is_some() && !records.is_empty() {
            let focus = if health_check {
                "Focus on health issues and readiness."
            } else {
                "Give a brief overview."
            };
            let prompt = format!(
                "Analyze these Crossplane resources. Health score is {}/100 with {} issues. {focus}\n\n{}",
                result.health_score,
                result.issue_count,
                snapshot(records)
            );
            self.complete(&prompt).await
        } else {
            None
        };
        Analysis { result, narrative }
    }

    pub async fn suggest(&self, category: &str, records: &[ResourceRecord]) -> Vec<Suggestion> {
        if self.client.is_some() {
            let prompt = format!(
                "Generate {} suggestions for these Crossplane resources. Respond with only a \
                 JSON array of objects with fields title, description, priority (High, Medium, \
                 Low), category, and optional example.\n\n{}",
                suggest::resolve_category(category),
                snapshot(records)
            );
            if let Some(text) = self.complete(&prompt).await {
                return parse_suggestions(&text);
            }
        }
        suggest::suggest(category, records)
    }

    pub async fn generate_manifest(&self, description: &str, provider: &str) -> String {
        if self.client.is_some() {
            let prompt = format!(
                "Generate a Crossplane manifest for: {description}\n\n\
                 Requirements:\n\
                 - Use provider: {}\n\
                 - Create valid Crossplane YAML with metadata, spec, and labels\n\n\
                 Respond with only the YAML manifest.",
                manifest::resolve_provider(provider)
            );
            if let Some(text) = self.complete(&prompt).await {
                return strip_fences(&text).to_string();
            }
        }
        manifest::generate(description, provider)
    }
}

/// JSON view of the records handed to the completion service.
fn snapshot(records: &[ResourceRecord]) -> String {
    serde_json::to_string_pretty(records).unwrap_or_else(|_| "[]".to_string())
}

/// Drop a surrounding Markdown code fence, if any.
fn strip_fences(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let body = rest.split_once('\n').map_or("", |(_, body)| body);
    body.strip_suffix("```").unwrap_or(body).trim()
}

/// A JSON array of suggestions, or the whole text as one suggestion.
fn parse_suggestions(text: &str) -> Vec<Suggestion> {
    match serde_json::from_str::<Vec<Suggestion>>(strip_fences(text)) {
        Ok(list) if !list.is_empty() => list,
        _ => vec![Suggestion {
            title: "AI Recommendations".to_string(),
            description: text.trim().to_string(),
            priority: crate::types::Priority::Medium,
            category: Some("General".to_string()),
            example: None,
        }],
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;
    use std::time::Duration;

    fn record(name: &str, kind: &str, provider: &str, status: ReadyStatus) -> ResourceRecord {
        ResourceRecord {
            name: name.to_string(),
            namespace: String::new(),
            kind: kind.to_string(),
            provider: provider.to_string(),
            status,
            age: "1h".to_string(),
            labels: BTreeMap::new(),
            raw_spec: None,
        }
    }

    fn fleet() -> Vec<ResourceRecord> {
        vec![
            record("orders", "dbinstances", "aws", ReadyStatus::Ready),
            record("web", "instances", "aws", ReadyStatus::NotReady),
            record("analytics", "databaseinstances", "gcp", ReadyStatus::Ready),
        ]
    }

    #[test]
    fn route_priority_order() {
        let router = Router::default();
        assert_eq!(router.route("what resources do I have").id, "summary");
        assert_eq!(router.route("show me aws database issues").id, "aws");
        assert_eq!(router.route("list my DB instances").id, "database");
        assert_eq!(router.route("why is this Not Ready").id, "troubleshoot");
        assert_eq!(router.route("anything failed?").id, "troubleshoot");
        assert_eq!(router.route("what is expensive").id, "cost");
        assert_eq!(router.route("hello there").id, FALLBACK_ROUTE);
    }

    #[test]
    fn fallback_quotes_request_verbatim() {
        let text = Router::default().answer("Tell Me About Widgets", &fleet());
        assert!(text.starts_with("I understand you're asking about: Tell Me About Widgets"));
        assert!(text.contains("3 Crossplane resources across 2 providers, 2 ready"));
    }

    #[test]
    fn templates_quote_live_records() {
        let router = Router::default();
        let aws = router.answer("aws", &fleet());
        assert!(aws.contains("Found 2 AWS resources"));
        assert!(aws.contains("web (instances): Not Ready"));

        let failing = router.answer("what failed", &fleet());
        assert!(failing.contains("1 resources are not ready"));

        let empty = router.answer("what resources exist", &[]);
        assert!(empty.contains("No Crossplane resources were found"));
    }

    #[test]
    fn custom_rule_table() {
        let router = Router::new(vec![RouteRule {
            id: "greeting",
            condition: |ctx| ctx.lower.starts_with("hi"),
            answer: |_| "hello".to_string(),
        }]);
        assert_eq!(router.answer("Hi!", &[]), "hello");
        assert_eq!(router.route("aws").id, FALLBACK_ROUTE);
    }

    #[test]
    fn strip_fences_handles_language_tags() {
        assert_eq!(strip_fences("```yaml\nkind: X\n```"), "kind: X");
        assert_eq!(strip_fences("  kind: X  "), "kind: X");
    }

    #[test]
    fn unparsable_suggestions_become_one_item() {
        let out = parse_suggestions("Just add backups.");
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].description, "Just add backups.");

        let parsed = parse_suggestions(
            "```json\n[{\"title\": \"A\", \"description\": \"B\", \"priority\": \"high\"}]\n```",
        );
        assert_eq!(parsed[0].title, "A");
        assert_eq!(parsed[0].priority, crate::types::Priority::High);
    }

    // ─── Responder ────────────────────────────────────────────────────────

    fn client_for(server: &mockito::ServerGuard) -> openai_chat::Client {
        openai_chat::Client::new(openai_chat::ClientConfig {
            api_key: "sk-test".into(),
            base_url: server.url(),
            timeout: Duration::from_secs(5),
            ..Default::default()
        })
        .unwrap()
    }

    fn completion_body(content: &str) -> String {
        serde_json::json!({
            "choices": [{"index": 0, "message": {"role": "assistant", "content": content}}]
        })
        .to_string()
    }

    #[tokio::test]
    async fn template_only_responder() {
        let responder = Responder::templates_only();
        assert!(!responder.uses_completion());
        let answer = responder.answer("show me aws", &fleet()).await;
        assert_eq!(answer.source, AnswerSource::Template);
        assert!(answer.text.starts_with("AWS Resources"));
    }

    #[tokio::test]
    async fn completion_answer_is_used_when_available() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/chat/completions")
            .match_body(mockito::Matcher::Regex("orders".into()))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(completion_body("You have one failing instance."))
            .create_async()
            .await;

        let responder = Responder::with_client(client_for(&server));
        let answer = responder.answer("how am I doing?", &fleet()).await;
        mock.assert_async().await;
        assert_eq!(answer.source, AnswerSource::Completion);
        assert_eq!(answer.text, "You have one failing instance.");
    }

    #[tokio::test]
    async fn server_error_falls_back_to_template() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/chat/completions")
            .with_status(500)
            .with_body("upstream exploded")
            .create_async()
            .await;

        let responder = Responder::with_client(client_for(&server));
        let answer = responder.answer("show me aws database issues", &fleet()).await;
        assert_eq!(answer.source, AnswerSource::Template);
        assert_eq!(answer.text, Router::default().answer("show me aws database issues", &fleet()));

        let manifest = responder.generate_manifest("postgres database", "auto").await;
        assert_eq!(manifest, manifest::generate("postgres database", "auto"));

        let suggestions = responder.suggest("db", &fleet()).await;
        assert_eq!(suggestions, suggest::suggest("db", &fleet()));
    }

    #[tokio::test]
    async fn analysis_result_is_local_even_with_completion() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/chat/completions")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(completion_body("Mostly healthy."))
            .create_async()
            .await;

        let responder = Responder::with_client(client_for(&server));
        let analysis = responder.analyze(&fleet(), false).await;
        assert_eq!(analysis.result, analysis::analyze(&fleet(), false));
        assert_eq!(analysis.narrative.as_deref(), Some("Mostly healthy."));
    }

    #[tokio::test]
    async fn completion_manifest_is_unfenced() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/chat/completions")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(completion_body("```yaml\nkind: Bucket\n```"))
            .create_async()
            .await;

        let responder = Responder::with_client(client_for(&server));
        assert_eq!(responder.generate_manifest("bucket", "").await, "kind: Bucket");
    }

    #[test]
    fn mock_mode_disables_completion() {
        let mut cfg = Config::default();
        cfg.ai.provider = "openai".into();
        cfg.ai.api_key = "sk-literal".into();
        assert!(!Responder::from_config(&cfg, true).uses_completion());
        assert!(Responder::from_config(&cfg, false).uses_completion());
    }
}
