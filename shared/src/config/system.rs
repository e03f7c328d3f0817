//! HTTP server and middleware switches

use serde::{Deserialize, Serialize};

/// Server-wide settings read from the `system` section
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SystemConfig {
    /// Verbose diagnostics and permissive defaults
    pub debug_mode: bool,

    /// Address the HTTP server binds to (`host:port`)
    pub server_address: String,

    /// Wrap the application in the CORS middleware
    pub enable_cors: bool,

    /// Compress responses with gzip
    pub enable_gzip: bool,

    /// Worker threads (0 = number of CPU cores)
    pub workers: usize,

    /// Grace period for in-flight requests on shutdown, in seconds
    pub shutdown_timeout_secs: u64,

    /// Proxies whose `X-Forwarded-*` headers are trusted
    pub trusted_proxies: Vec<String>,

    /// Only these path prefixes get a trace id (empty = every path)
    pub trace_allowed_prefixes: Vec<String>,

    /// Path prefixes never traced
    pub trace_skipped_prefixes: Vec<String>,
}

impl Default for SystemConfig {
    fn default() -> Self {
        Self {
            debug_mode: false,
            server_address: String::from("0.0.0.0:7086"),
            enable_cors: true,
            enable_gzip: true,
            workers: 0,
            shutdown_timeout_secs: 30,
            trusted_proxies: vec![String::from("127.0.0.1"), String::from("10.0.0.0/8")],
            trace_allowed_prefixes: Vec::new(),
            trace_skipped_prefixes: vec![String::from("/pong")],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_system_config_default() {
        let config = SystemConfig::default();
        assert_eq!(config.server_address, "0.0.0.0:7086");
        assert!(config.enable_cors);
        assert!(config.enable_gzip);
        assert_eq!(config.shutdown_timeout_secs, 30);
        assert_eq!(config.workers, 0);
        assert!(config.trace_allowed_prefixes.is_empty());
    }
}
