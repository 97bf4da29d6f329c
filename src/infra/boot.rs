use std::sync::Arc;

use crate::clients::catalog::CatalogFetcher;
use crate::clients::invoker::RemoteInvoker;
use crate::core::error::BridgeError;
use crate::infra::config::Config;
use crate::infra::mcp::{serve_stdio, BridgeServer};
use crate::infra::runtime::limits::make_http_client;

/// `starting` phase: fetch the catalog once and build the handler. No
/// transport is attached until this returns `Ok`.
pub async fn start(cfg: &Config) -> Result<BridgeServer, BridgeError> {
    let http = make_http_client()?;
    let catalog = CatalogFetcher::new(http.clone())
        .with_retry(cfg.fetch_attempts, cfg.fetch_delay)
        .fetch_catalog(&cfg.base_url)
        .await?;
    let invoker = RemoteInvoker::new(cfg.base_url.clone(), http);
    Ok(BridgeServer::new(catalog, Arc::new(invoker)))
}

/// `starting` then `ready`: serves stdio until the client goes away.
pub async fn run_server(cfg: &Config) -> Result<(), BridgeError> {
    tracing::info!(
        base_url = %cfg.base_url,
        fetch_attempts = cfg.fetch_attempts,
        fetch_delay_ms = cfg.fetch_delay.as_millis() as u64,
        "BOOT tool-bridge"
    );
    let server = start(cfg).await?;
    tracing::info!(tools = server.catalog().len(), "ready; attaching stdio transport");
    serve_stdio(server).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;
    use serde_json::json;
    use std::time::Duration;

    fn cfg(base_url: String) -> Config {
        Config {
            base_url,
            fetch_attempts: 2,
            fetch_delay: Duration::from_millis(5),
        }
    }

    #[tokio::test]
    async fn start_builds_server_from_catalog() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/tools");
            then.status(200).json_body(json!({"tools":[{"name":"echo"}]}));
        });

        let bridge = start(&cfg(server.base_url())).await.unwrap();
        assert_eq!(bridge.catalog().len(), 1);
        assert_eq!(bridge.list_tool_descriptors()[0].name, "echo");
    }

    #[tokio::test]
    async fn start_fails_when_catalog_unavailable() {
        let server = MockServer::start();
        let m = server.mock(|when, then| {
            when.method(GET).path("/tools");
            then.status(500);
        });

        let err = start(&cfg(server.base_url())).await.err().unwrap();
        m.assert_hits(2);
        assert!(matches!(err, BridgeError::CatalogUnavailable { .. }));
    }

    #[tokio::test]
    async fn started_server_forwards_calls_to_same_base() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/tools");
            then.status(200).json_body(json!({"tools":[{"name":"echo"}]}));
        });
        let m = server.mock(|when, then| {
            when.method(POST).path("/tools/echo").json_body(json!({}));
            then.status(200).json_body(json!({
                "success": true,
                "result": {"content":[{"type":"text","text":"hi"}]}
            }));
        });

        let bridge = start(&cfg(server.base_url())).await.unwrap();
        let out = bridge.dispatch("echo", None).await;
        m.assert();
        assert_eq!(out.content[0].text, "hi");
    }
}
