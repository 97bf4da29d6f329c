use thiserror::Error;

/// Bridge-wide error model. Invocation failures never show up here; they
/// are folded into `InvocationResult` where they happen.
#[derive(Debug, Error)]
pub enum BridgeError {
    #[error("failed to fetch tool catalog from {url} after {attempts} attempt(s): {reason}")]
    CatalogUnavailable {
        url: String,
        attempts: u32,
        reason: String,
    },
    #[error("invalid configuration: {0}")]
    Config(String),
    #[error("transport error: {0}")]
    Transport(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn catalog_error_names_url_and_reason() {
        let e = BridgeError::CatalogUnavailable {
            url: "http://upstream:8085/tools".into(),
            attempts: 3,
            reason: "connection refused".into(),
        };
        let s = e.to_string();
        assert!(s.contains("http://upstream:8085/tools"));
        assert!(s.contains("3 attempt(s)"));
        assert!(s.ends_with("connection refused"));
    }

    #[test]
    fn it_displays_config_message() {
        let e = BridgeError::Config("bad toml".into());
        assert_eq!(e.to_string(), "invalid configuration: bad toml");
    }
}
