use std::time::Instant;

use async_trait::async_trait;
use reqwest::{Client, Url};
use rmcp::model::JsonObject;

use crate::core::tool::ToolBackend;
use crate::domain::{InvocationEnvelope, InvocationResult, TextContent, UNKNOWN_ERROR};
use crate::infra::http::headers::{add_standard_headers, generate_request_id};
use crate::infra::logging::log_metric;

/// Forwards a single call-tool request to `POST <base>/tools/<name>`.
/// No retries: per-call failures go straight back to the caller.
#[derive(Clone)]
pub struct RemoteInvoker {
    base: String,
    http: Client,
}

impl RemoteInvoker {
    pub fn new(base: impl Into<String>, http: Client) -> Self {
        Self {
            base: base.into(),
            http,
        }
    }

    pub async fn invoke(&self, tool_name: &str, args: JsonObject) -> InvocationResult {
        let url = match tool_url(&self.base, tool_name) {
            Ok(url) => url,
            Err(e) => {
                tracing::warn!(tool = tool_name, base = %self.base, error = %e, "cannot build tool URL");
                return InvocationResult::error(e);
            }
        };
        let req_id = generate_request_id();
        tracing::debug!(tool = tool_name, endpoint = %url, request_id = %req_id, "invoking upstream tool");

        let start = Instant::now();
        let out = match self.post(url, req_id, &args).await {
            Ok(envelope) => from_envelope(envelope),
            Err(e) => {
                tracing::warn!(tool = tool_name, error = %e, "upstream invocation failed");
                InvocationResult::error(e)
            }
        };

        let elapsed_ms = start.elapsed().as_millis() as f64;
        log_metric(tool_name, "invoke_latency_ms", elapsed_ms);
        if out.is_error {
            log_metric(tool_name, "invoke_error_total", 1.0);
        }
        out
    }

    async fn post(
        &self,
        url: Url,
        req_id: String,
        args: &JsonObject,
    ) -> Result<InvocationEnvelope, String> {
        let (builder, _rid) = add_standard_headers(self.http.post(url), Some(req_id));
        let resp = builder.json(args).send().await.map_err(|e| e.to_string())?;
        // Status is not inspected; the envelope's `success` field decides.
        resp.json::<InvocationEnvelope>()
            .await
            .map_err(|e| e.to_string())
    }
}

#[async_trait]
impl ToolBackend for RemoteInvoker {
    async fn call(&self, name: &str, arguments: JsonObject) -> InvocationResult {
        self.invoke(name, arguments).await
    }
}

/// `<base>/tools/<name>` with the name as one percent-encoded path segment.
fn tool_url(base: &str, tool_name: &str) -> Result<Url, String> {
    let mut url = Url::parse(base).map_err(|e| format!("invalid base URL {base}: {e}"))?;
    url.path_segments_mut()
        .map_err(|_| format!("base URL {base} cannot carry a path"))?
        .pop_if_empty()
        .push("tools")
        .push(tool_name);
    Ok(url)
}

fn from_envelope(envelope: InvocationEnvelope) -> InvocationResult {
    match envelope {
        InvocationEnvelope {
            success: true,
            result: Some(result),
            ..
        } => {
            let is_error = result.is_error.unwrap_or(false);
            let mut content: Vec<TextContent> =
                result.content.into_iter().map(TextContent::from).collect();
            if is_error && content.is_empty() {
                content.push(TextContent {
                    text: UNKNOWN_ERROR.to_string(),
                });
            }
            InvocationResult { content, is_error }
        }
        InvocationEnvelope { error, .. } => {
            InvocationResult::error(error.unwrap_or_else(|| UNKNOWN_ERROR.to_string()))
        }
    }
}
