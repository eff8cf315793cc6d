//! Configuration (layered: code > env).

use std::sync::OnceLock;

/// Global default config (lazy-initialized from env).
static DEFAULT_CONFIG: OnceLock<BridgeConfig> = OnceLock::new();

/// Default port the agent server listens on.
const DEFAULT_BASE_URL: &str = "http://localhost:4096";

/// Connection settings for the agent server.
#[derive(Debug, Clone)]
pub struct BridgeConfig {
    base_url: String,
    auth_token: Option<String>,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_URL)
    }
}

impl BridgeConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        let mut base_url = base_url.into();
        while base_url.ends_with('/') {
            base_url.pop();
        }
        Self {
            base_url,
            auth_token: None,
        }
    }

    /// Attach a bearer token sent with every request.
    pub fn with_auth_token(mut self, token: impl Into<String>) -> Self {
        self.auth_token = Some(token.into());
        self
    }

    /// Load from environment variables (`OPENCODE_BASE_URL`,
    /// `OPENCODE_API_KEY`), reading `.env` if present.
    pub fn from_env() -> Self {
        let _ = dotenvy::dotenv(); // load .env if present, ignore error
        let mut config = std::env::var("OPENCODE_BASE_URL")
            .map(Self::new)
            .unwrap_or_default();
        if let Ok(token) = std::env::var("OPENCODE_API_KEY") {
            config = config.with_auth_token(token);
        }
        config
    }

    /// Get (or create) the global default config.
    pub fn global() -> &'static BridgeConfig {
        DEFAULT_CONFIG.get_or_init(Self::from_env)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn auth_token(&self) -> Option<&str> {
        self.auth_token.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_points_at_local_server() {
        let config = BridgeConfig::default();
        assert_eq!(config.base_url(), "http://localhost:4096");
        assert!(config.auth_token().is_none());
    }

    #[test]
    fn trailing_slashes_are_trimmed() {
        let config = BridgeConfig::new("http://127.0.0.1:9000//");
        assert_eq!(config.base_url(), "http://127.0.0.1:9000");
    }

    #[test]
    fn explicit_token_is_kept() {
        let config = BridgeConfig::new("http://localhost:4096").with_auth_token("secret");
        assert_eq!(config.auth_token(), Some("secret"));
    }
}
