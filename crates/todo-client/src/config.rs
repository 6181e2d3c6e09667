//! Configuration for the todo API client.

use std::path::PathBuf;

/// Configuration for the todo API client.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ClientConfig {
    /// Server base URL, without the `/api/` prefix.
    pub base_url: String,
    /// Request timeout in milliseconds.
    pub request_timeout_ms: u64,
    /// Where the session file lives.
    pub session_path: PathBuf,
}

impl Default for ClientConfig {
    fn default() -> Self {
        ClientConfig {
            base_url: "http://localhost:8000".to_string(),
            request_timeout_ms: 30000,
            session_path: todo_common::session_path(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ClientConfig::default();
        assert_eq!(config.base_url, "http://localhost:8000");
        assert_eq!(config.request_timeout_ms, 30000);
        assert!(config.session_path.ends_with("session.json"));
    }

    #[test]
    fn test_partial_override() {
        let config = ClientConfig {
            base_url: "http://example.com:9000".to_string(),
            ..Default::default()
        };
        assert_eq!(config.base_url, "http://example.com:9000");
        assert_eq!(config.request_timeout_ms, 30000);
    }

    #[test]
    fn test_clone() {
        let config = ClientConfig::default();
        let cloned = config.clone();
        assert_eq!(config, cloned);
    }
}
