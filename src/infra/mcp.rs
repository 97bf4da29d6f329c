//! MCP server integration (stdio) for tool-bridge.
//!
//! - `tools/list` is a pure projection of the catalog fetched at startup
//! - `tools/call` is forwarded, unvalidated, to the upstream backend
//!
//! Handlers never touch the network for listing and never return protocol
//! errors for failed invocations: those come back as `isError` results.

use std::sync::Arc;

use rmcp::{
    model::{
        CallToolRequestParam, CallToolResult, Implementation, JsonObject, ListToolsResult,
        PaginatedRequestParam, ServerCapabilities, ServerInfo, Tool,
    },
    serve_server,
    service::RequestContext,
    ErrorData as McpError, RoleServer, ServerHandler,
};
use tokio::io::{AsyncRead, AsyncWrite};

use crate::core::error::BridgeError;
use crate::core::schema::translate_catalog_schema;
use crate::core::tool::ToolBackend;
use crate::domain::{Catalog, InvocationResult};

/// The MCP server handler. Only constructible once a catalog exists, which
/// keeps the "fetched once at startup" rule in the type.
#[derive(Clone)]
pub struct BridgeServer {
    catalog: Arc<Catalog>,
    backend: Arc<dyn ToolBackend>,
}

impl BridgeServer {
    pub fn new(catalog: Catalog, backend: Arc<dyn ToolBackend>) -> Self {
        Self {
            catalog: Arc::new(catalog),
            backend,
        }
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn list_tool_descriptors(&self) -> Vec<Tool> {
        self.catalog
            .iter()
            .map(|tool| {
                let schema = translate_catalog_schema(tool.schema.as_ref()).to_json_object();
                Tool::new(
                    tool.name.clone(),
                    tool.description.clone().unwrap_or_default(),
                    Arc::new(schema),
                )
            })
            .collect()
    }

    /// Unknown names are not rejected here; the upstream decides.
    pub async fn dispatch(&self, name: &str, arguments: Option<JsonObject>) -> InvocationResult {
        let arguments = arguments.unwrap_or_default();
        tracing::debug!(tool = name, known = self.catalog.get(name).is_some(), "tools/call");
        self.backend.call(name, arguments).await
    }
}

impl ServerHandler for BridgeServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation {
                name: "tool-bridge".to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
                ..Implementation::from_build_env()
            },
            instructions: Some(
                "Exposes the tools of an upstream HTTP tool service over stdio.".to_string(),
            ),
            ..Default::default()
        }
    }

    async fn list_tools(
        &self,
        _request: Option<PaginatedRequestParam>,
        _context: RequestContext<RoleServer>,
    ) -> Result<ListToolsResult, McpError> {
        Ok(ListToolsResult {
            tools: self.list_tool_descriptors(),
            next_cursor: None,
        })
    }

    async fn call_tool(
        &self,
        request: CallToolRequestParam,
        _context: RequestContext<RoleServer>,
    ) -> Result<CallToolResult, McpError> {
        let out = self.dispatch(&request.name, request.arguments).await;
        Ok(CallToolResult::from(out))
    }
}

/// Serve over any async byte pipe until the peer disconnects.
pub async fn serve_io<R, W>(server: BridgeServer, reader: R, writer: W) -> Result<(), BridgeError>
where
    R: AsyncRead + Send + Unpin + 'static,
    W: AsyncWrite + Send + Unpin + 'static,
{
    let running = serve_server(server, (reader, writer))
        .await
        .map_err(|e| BridgeError::Transport(e.to_string()))?;
    let reason = running
        .waiting()
        .await
        .map_err(|e| BridgeError::Transport(e.to_string()))?;
    tracing::info!(reason = ?reason, "stdio session closed");
    Ok(())
}

/// Run the MCP server on stdin/stdout.
pub async fn serve_stdio(server: BridgeServer) -> Result<(), BridgeError> {
    serve_io(server, tokio::io::stdin(), tokio::io::stdout()).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{CatalogWire, TextContent};
    use async_trait::async_trait;
    use serde_json::{json, Value as JsonValue};
    use std::sync::Mutex;

    /// Records every dispatched call and answers with a fixed result.
    #[derive(Default)]
    struct Recorder {
        calls: Mutex<Vec<(String, JsonObject)>>,
    }

    #[async_trait]
    impl ToolBackend for Recorder {
        async fn call(&self, name: &str, arguments: JsonObject) -> InvocationResult {
            self.calls.lock().unwrap().push((name.to_string(), arguments));
            InvocationResult {
                content: vec![TextContent { text: format!("ran {name}") }],
                is_error: false,
            }
        }
    }

    fn catalog(v: JsonValue) -> Catalog {
        let wire: CatalogWire = serde_json::from_value(v).unwrap();
        Catalog::from(wire)
    }

    fn sample_server(backend: Arc<Recorder>) -> BridgeServer {
        BridgeServer::new(
            catalog(json!({"tools":[
                {"name":"search","description":"Search docs","schema":{
                    "q":{"type":"string"},
                    "limit":{"type":"optional","def":{"innerType":{"type":"number"}}}
                }},
                {"name":"ping"}
            ]})),
            backend,
        )
    }

    #[test]
    fn list_projects_catalog_in_order() {
        let server = sample_server(Arc::new(Recorder::default()));
        let tools = server.list_tool_descriptors();
        let names: Vec<String> = tools.iter().map(|t| t.name.to_string()).collect();
        assert_eq!(names, vec!["search", "ping"]);

        assert_eq!(tools[0].description.as_deref(), Some("Search docs"));
        assert_eq!(
            JsonValue::Object((*tools[0].input_schema).clone()),
            json!({
                "type":"object",
                "properties":{"q":{"type":"string"},"limit":{"type":"number"}},
                "required":["q"]
            })
        );
    }

    #[test]
    fn tool_without_schema_or_description_gets_defaults() {
        let server = sample_server(Arc::new(Recorder::default()));
        let tools = server.list_tool_descriptors();
        assert_eq!(tools[1].description.as_deref(), Some(""));
        assert_eq!(
            JsonValue::Object((*tools[1].input_schema).clone()),
            json!({"type":"object","properties":{}})
        );
    }

    #[tokio::test]
    async fn dispatch_defaults_missing_arguments_to_empty_map() {
        let backend = Arc::new(Recorder::default());
        let server = sample_server(backend.clone());
        let out = server.dispatch("ping", None).await;
        assert_eq!(out.content[0].text, "ran ping");

        let calls = backend.calls.lock().unwrap();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].0, "ping");
        assert!(calls[0].1.is_empty());
    }

    #[tokio::test]
    async fn dispatch_forwards_unknown_names_untouched() {
        let backend = Arc::new(Recorder::default());
        let server = sample_server(backend.clone());
        let args = json!({"x": 1}).as_object().unwrap().clone();
        server.dispatch("not.in.catalog", Some(args.clone())).await;

        let calls = backend.calls.lock().unwrap();
        assert_eq!(calls[0].0, "not.in.catalog");
        assert_eq!(calls[0].1, args);
    }

    #[test]
    fn server_info_advertises_tools() {
        let server = sample_server(Arc::new(Recorder::default()));
        let info = server.get_info();
        assert_eq!(info.server_info.name, "tool-bridge");
        assert!(info.capabilities.tools.is_some());
    }

    #[test]
    fn test_server_handler_trait_impl() {
        let server = sample_server(Arc::new(Recorder::default()));
        fn assert_server_handler<T: ServerHandler>(_handler: T) {}
        assert_server_handler(server);
    }
}
