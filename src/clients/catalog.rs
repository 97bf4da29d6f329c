use std::time::Duration;

use reqwest::Client;

use crate::core::error::BridgeError;
use crate::domain::{Catalog, CatalogWire};
use crate::infra::config::{DEFAULT_FETCH_ATTEMPTS, DEFAULT_FETCH_DELAY_MS};
use crate::infra::http::headers::add_standard_headers;
use crate::infra::runtime::limits::{make_http_client, retry_fixed};

/// Pulls the upstream tool catalog with bounded, fixed-delay retries.
#[derive(Clone)]
pub struct CatalogFetcher {
    http: Client,
    max_attempts: u32,
    delay: Duration,
}

impl CatalogFetcher {
    pub fn new(http: Client) -> Self {
        Self {
            http,
            max_attempts: DEFAULT_FETCH_ATTEMPTS,
            delay: Duration::from_millis(DEFAULT_FETCH_DELAY_MS),
        }
    }

    pub fn with_retry(mut self, max_attempts: u32, delay: Duration) -> Self {
        self.max_attempts = max_attempts.max(1);
        self.delay = delay;
        self
    }

    /// `GET <base>/tools`. A non-2xx status or an undecodable body counts as a
    /// failed attempt, same as a network error.
    pub async fn fetch_catalog(&self, base_url: &str) -> Result<Catalog, BridgeError> {
        let url = format!("{}/tools", base_url.trim_end_matches('/'));
        tracing::info!(endpoint = %url, max_attempts = self.max_attempts, "fetching tool catalog");

        let http = self.http.clone();
        let res: Result<CatalogWire, String> = retry_fixed(self.max_attempts, self.delay, |attempt| {
            let http = http.clone();
            let url = url.clone();
            async move {
                tracing::debug!(attempt, endpoint = %url, "catalog request");
                let (builder, _rid) = add_standard_headers(http.get(url), None);
                let resp = builder.send().await.map_err(|e| e.to_string())?;
                if !resp.status().is_success() {
                    return Err(format!("upstream status {}", resp.status()));
                }
                resp.json::<CatalogWire>().await.map_err(|e| e.to_string())
            }
        })
        .await;

        match res {
            Ok(wire) => {
                let catalog = Catalog::from(wire);
                tracing::info!(tools = catalog.len(), "tool catalog loaded");
                Ok(catalog)
            }
            Err(reason) => Err(BridgeError::CatalogUnavailable {
                url,
                attempts: self.max_attempts,
                reason,
            }),
        }
    }
}

/// One-shot convenience wrapper with an owned client.
pub async fn fetch_catalog(
    base_url: &str,
    max_attempts: u32,
    delay_ms: u64,
) -> Result<Catalog, BridgeError> {
    CatalogFetcher::new(make_http_client()?)
        .with_retry(max_attempts, Duration::from_millis(delay_ms))
        .fetch_catalog(base_url)
        .await
}
