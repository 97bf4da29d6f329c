use std::fmt::Display;
use std::time::Duration;

use crate::core::error::BridgeError;

/// Upper bound on establishing a TCP connection to the upstream.
///
/// This is stricter than reqwest's default (no connect timeout), so a
/// blackholed upstream address fails a fetch attempt or invocation instead
/// of hanging it. Nothing else is bounded: once connected, a stalled
/// upstream response is waited on indefinitely.
pub const CONNECT_TIMEOUT: Duration = Duration::from_secs(2);

/// Build the upstream reqwest client with [`CONNECT_TIMEOUT`] and no overall
/// request timeout.
pub fn make_http_client() -> Result<reqwest::Client, BridgeError> {
    reqwest::Client::builder()
        .connect_timeout(CONNECT_TIMEOUT)
        .build()
        .map_err(|e| BridgeError::Transport(format!("building http client: {e}")))
}

/// Run `op` up to `max_attempts` times with a constant `delay` between tries.
/// `op` receives the 1-based attempt number. Returns the last error once
/// attempts are exhausted.
pub async fn retry_fixed<T, E, Fut, F>(max_attempts: u32, delay: Duration, mut op: F) -> Result<T, E>
where
    E: Display,
    F: FnMut(u32) -> Fut,
    Fut: std::future::Future<Output = Result<T, E>>,
{
    let max_attempts = max_attempts.max(1);
    let mut attempt: u32 = 1;
    loop {
        match op(attempt).await {
            Ok(v) => return Ok(v),
            Err(e) if attempt >= max_attempts => return Err(e),
            Err(e) => {
                tracing::warn!(attempt, max_attempts, error = %e, "attempt failed; retrying");
                tokio::time::sleep(delay).await;
                attempt += 1;
            }
        }
    }
}
