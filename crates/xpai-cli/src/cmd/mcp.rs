use crate::session::Session;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::io::{BufRead, Write};
use xpai_core::path::{get_bool, get_str};
use xpai_core::resource::ResourceRecord;
use xpai_core::suggest::resolve_category;

// ---------------------------------------------------------------------------
// JSON-RPC 2.0 protocol types
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct JsonRpcRequest {
    #[allow(dead_code)]
    pub jsonrpc: String,
    pub id: Option<Value>,
    pub method: String,
    pub params: Option<Value>,
}

#[derive(Debug, Serialize)]
pub struct JsonRpcResponse {
    pub jsonrpc: &'static str,
    pub id: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<JsonRpcError>,
}

#[derive(Debug, Serialize)]
pub struct JsonRpcError {
    pub code: i32,
    pub message: String,
}

const PARSE_ERROR: i32 = -32700;
const INVALID_REQUEST: i32 = -32600;
const METHOD_NOT_FOUND: i32 = -32601;
const INVALID_PARAMS: i32 = -32602;
const INTERNAL_ERROR: i32 = -32603;

impl JsonRpcResponse {
    fn ok(id: Option<Value>, result: Value) -> Self {
        Self {
            jsonrpc: "2.0",
            id,
            result: Some(result),
            error: None,
        }
    }

    fn err(id: Option<Value>, code: i32, message: impl Into<String>) -> Self {
        Self {
            jsonrpc: "2.0",
            id,
            result: None,
            error: Some(JsonRpcError {
                code,
                message: message.into(),
            }),
        }
    }
}

// ---------------------------------------------------------------------------
// Tools
// ---------------------------------------------------------------------------

/// One callable tool. `call` receives the `arguments` object (or `null`) and
/// returns the text content; an `Err` becomes an `isError` result.
pub struct McpTool {
    pub name: &'static str,
    pub description: &'static str,
    schema: fn() -> Value,
    call: fn(&mut Session, &Value) -> anyhow::Result<String>,
}

pub fn all_tools() -> Vec<McpTool> {
    vec![
        McpTool {
            name: "crossplane_ask",
            description: "Ask questions about Crossplane resources using natural language",
            schema: || {
                json!({
                    "type": "object",
                    "properties": {
                        "question": {"type": "string", "description": "Natural language question about Crossplane resources"},
                        "provider": {"type": "string", "description": "Optional provider filter (aws, gcp, azure)"},
                        "namespace": {"type": "string", "description": "Optional namespace filter"}
                    },
                    "required": ["question"]
                })
            },
            call: call_ask,
        },
        McpTool {
            name: "crossplane_analyze",
            description: "Analyze Crossplane resource health and get recommendations",
            schema: || {
                json!({
                    "type": "object",
                    "properties": {
                        "health_check": {"type": "boolean", "description": "Also report resources without a readiness condition", "default": true},
                        "provider": {"type": "string", "description": "Optional provider filter (aws, gcp, azure)"},
                        "namespace": {"type": "string", "description": "Optional namespace filter"}
                    }
                })
            },
            call: call_analyze,
        },
        McpTool {
            name: "crossplane_suggest",
            description: "Get suggestions for Crossplane resources",
            schema: || {
                json!({
                    "type": "object",
                    "properties": {
                        "suggestion_type": {"type": "string", "description": "database, security, optimize, network, or general", "default": "optimize"}
                    }
                })
            },
            call: call_suggest,
        },
        McpTool {
            name: "crossplane_generate",
            description: "Generate a Crossplane manifest from a description",
            schema: || {
                json!({
                    "type": "object",
                    "properties": {
                        "description": {"type": "string", "description": "Infrastructure to create"},
                        "provider": {"type": "string", "description": "Target provider (aws, gcp, azure)", "default": "aws"}
                    },
                    "required": ["description"]
                })
            },
            call: call_generate,
        },
        McpTool {
            name: "crossplane_list_resources",
            description: "List Crossplane resources in the cluster",
            schema: || {
                json!({
                    "type": "object",
                    "properties": {
                        "resource_type": {"type": "string", "description": "Optional kind filter (compositions, providers, buckets, ...)"},
                        "provider": {"type": "string", "description": "Optional provider filter (aws, gcp, azure)"}
                    }
                })
            },
            call: call_list_resources,
        },
    ]
}

fn records(session: &mut Session, args: &Value) -> anyhow::Result<Vec<ResourceRecord>> {
    let filter = session.filter(
        None,
        get_str(args, "provider").map(str::to_string),
        get_str(args, "namespace").map(str::to_string),
    );
    session.records(&filter)
}

fn call_ask(session: &mut Session, args: &Value) -> anyhow::Result<String> {
    let Some(question) = get_str(args, "question").filter(|q| !q.trim().is_empty()) else {
        anyhow::bail!("question is required");
    };
    let records = records(session, args)?;
    let answer = session.block_on(session.responder().answer(question, &records));
    Ok(answer.text)
}

fn call_analyze(session: &mut Session, args: &Value) -> anyhow::Result<String> {
    let health_check = get_bool(args, "health_check").unwrap_or(true);
    let records = records(session, args)?;
    let analysis = session.block_on(session.responder().analyze(&records, health_check));
    let r = &analysis.result;

    let mut out = format!(
        "Crossplane Analysis\n\n\
         Total resources: {}\nHealthy resources: {}\nIssues found: {}\nHealth score: {}/100\n",
        r.total_count, r.healthy_count, r.issue_count, r.health_score
    );
    if !r.issues.is_empty() {
        out.push_str("\nIssues:\n");
        for issue in &r.issues {
            out.push_str(&format!("- {}: {}\n", issue.severity, issue.description));
        }
    }
    if !r.recommendations.is_empty() {
        out.push_str("\nRecommendations:\n");
        for rec in &r.recommendations {
            out.push_str(&format!("- {}: {}\n", rec.title, rec.description));
        }
    }
    if let Some(narrative) = &analysis.narrative {
        out.push_str(&format!("\n{}\n", narrative.trim_end()));
    }
    Ok(out)
}

fn call_suggest(session: &mut Session, args: &Value) -> anyhow::Result<String> {
    let category = get_str(args, "suggestion_type").unwrap_or("optimize").to_string();
    let records = records(session, args)?;
    let limit = session.config.analysis.max_suggestions;
    let mut suggestions = session.block_on(session.responder().suggest(&category, &records));
    suggestions.truncate(limit);

    let mut out = format!("Crossplane {} suggestions:\n", resolve_category(&category));
    for (i, s) in suggestions.iter().enumerate() {
        out.push_str(&format!(
            "\n{}. {}\n   {}\n   Priority: {}\n",
            i + 1,
            s.title,
            s.description,
            s.priority
        ));
    }
    Ok(out)
}

fn call_generate(session: &mut Session, args: &Value) -> anyhow::Result<String> {
    let Some(description) = get_str(args, "description").filter(|d| !d.trim().is_empty()) else {
        anyhow::bail!("description is required");
    };
    let provider = get_str(args, "provider").unwrap_or("auto");
    let manifest = session.block_on(session.responder().generate_manifest(description, provider));
    Ok(format!("```yaml\n{}\n```", manifest.trim_end()))
}

fn call_list_resources(session: &mut Session, args: &Value) -> anyhow::Result<String> {
    let kind = get_str(args, "resource_type").filter(|k| !k.is_empty());
    let records: Vec<ResourceRecord> = records(session, args)?
        .into_iter()
        .filter(|r| kind.map_or(true, |k| r.kind == k))
        .collect();

    if records.is_empty() {
        return Ok("No Crossplane resources found.".to_string());
    }
    let mut out = format!("Crossplane resources ({}):\n", records.len());
    for (i, r) in records.iter().enumerate() {
        out.push_str(&format!(
            "{}. {} ({}, {}) - {}\n",
            i + 1,
            r.display_name(),
            r.kind,
            r.provider,
            r.status.label()
        ));
    }
    Ok(out)
}

// ---------------------------------------------------------------------------
// Resources
// ---------------------------------------------------------------------------

/// `(uri, name, description, kind filter)`; `None` lists every kind.
const RESOURCES: [(&str, &str, &str, Option<&str>); 3] = [
    (
        "crossplane://cluster/resources",
        "Crossplane Cluster Resources",
        "All Crossplane resources in the cluster",
        None,
    ),
    (
        "crossplane://cluster/providers",
        "Crossplane Providers",
        "Installed Crossplane providers",
        Some("providers"),
    ),
    (
        "crossplane://cluster/compositions",
        "Crossplane Compositions",
        "Available Crossplane compositions",
        Some("compositions"),
    ),
];

fn read_resource(session: &mut Session, uri: &str) -> Option<anyhow::Result<String>> {
    let (_, _, _, kind) = RESOURCES.iter().find(|(u, ..)| *u == uri)?;
    let result = records(session, &Value::Null).and_then(|records| {
        let selected: Vec<&ResourceRecord> = records
            .iter()
            .filter(|r| kind.map_or(true, |k| r.kind == k))
            .collect();
        Ok(serde_json::to_string_pretty(&selected)?)
    });
    Some(result)
}

// ---------------------------------------------------------------------------
// Server loop
// ---------------------------------------------------------------------------

pub fn run(session: &mut Session) -> anyhow::Result<()> {
    let stdin = std::io::stdin();
    let stdout = std::io::stdout();
    let tools = all_tools();
    tracing::info!(tools = tools.len(), "mcp server reading requests from stdin");

    for line in stdin.lock().lines() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }

        let response = match serde_json::from_str::<Value>(&line) {
            Err(e) => Some(JsonRpcResponse::err(None, PARSE_ERROR, format!("parse error: {e}"))),
            // Notifications have no "id" and get no response
            Ok(raw) if raw.get("id").is_none() => None,
            Ok(raw) => Some(match serde_json::from_value::<JsonRpcRequest>(raw) {
                Ok(request) => handle_request(&request, &tools, session),
                Err(e) => JsonRpcResponse::err(None, INVALID_REQUEST, format!("invalid request: {e}")),
            }),
        };

        if let Some(response) = response {
            let mut out = stdout.lock();
            serde_json::to_writer(&mut out, &response)?;
            writeln!(out)?;
            out.flush()?;
        }
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// Request dispatch
// ---------------------------------------------------------------------------

pub fn handle_request(req: &JsonRpcRequest, tools: &[McpTool], session: &mut Session) -> JsonRpcResponse {
    let id = req.id.clone();
    match req.method.as_str() {
        "initialize" => JsonRpcResponse::ok(
            id,
            json!({
                "protocolVersion": "2024-11-05",
                "capabilities": {
                    "tools": {"listChanged": false},
                    "resources": {"subscribe": false, "listChanged": false}
                },
                "serverInfo": {
                    "name": "crossplane-ai",
                    "version": env!("CARGO_PKG_VERSION")
                }
            }),
        ),

        "tools/list" => {
            let list: Vec<Value> = tools
                .iter()
                .map(|t| {
                    json!({
                        "name": t.name,
                        "description": t.description,
                        "inputSchema": (t.schema)()
                    })
                })
                .collect();
            JsonRpcResponse::ok(id, json!({ "tools": list }))
        }

        "tools/call" => {
            let Some(params) = &req.params else {
                return JsonRpcResponse::err(id, INVALID_PARAMS, "missing params");
            };
            let Some(name) = get_str(params, "name") else {
                return JsonRpcResponse::err(id, INVALID_PARAMS, "missing tool name in params");
            };
            let Some(tool) = tools.iter().find(|t| t.name == name) else {
                return JsonRpcResponse::err(id, METHOD_NOT_FOUND, format!("tool not found: {name}"));
            };

            let args = params.get("arguments").cloned().unwrap_or(Value::Null);
            let (text, is_error) = match (tool.call)(session, &args) {
                Ok(text) => (text, false),
                Err(e) => {
                    tracing::debug!(tool = name, error = %e, "tool call failed");
                    (format!("{e:#}"), true)
                }
            };
            JsonRpcResponse::ok(
                id,
                json!({
                    "content": [{"type": "text", "text": text}],
                    "isError": is_error
                }),
            )
        }

        "resources/list" => {
            let list: Vec<Value> = RESOURCES
                .iter()
                .map(|(uri, name, description, _)| {
                    json!({
                        "uri": uri,
                        "name": name,
                        "description": description,
                        "mimeType": "application/json"
                    })
                })
                .collect();
            JsonRpcResponse::ok(id, json!({ "resources": list }))
        }

        "resources/read" => {
            let Some(uri) = req.params.as_ref().and_then(|p| get_str(p, "uri")) else {
                return JsonRpcResponse::err(id, INVALID_PARAMS, "missing uri in params");
            };
            match read_resource(session, uri) {
                None => JsonRpcResponse::err(id, INVALID_PARAMS, format!("unknown resource uri: {uri}")),
                Some(Err(e)) => JsonRpcResponse::err(id, INTERNAL_ERROR, format!("{e:#}")),
                Some(Ok(text)) => JsonRpcResponse::ok(
                    id,
                    json!({
                        "contents": [{"uri": uri, "mimeType": "application/json", "text": text}]
                    }),
                ),
            }
        }

        other => JsonRpcResponse::err(id, METHOD_NOT_FOUND, format!("method not found: {other}")),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
