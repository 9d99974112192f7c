//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the server.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

/// Root configuration.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct AppConfig {
    /// Listener configuration (bind address, body limit).
    pub listener: ListenerConfig,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Where the route specification comes from.
    pub routes: RoutesConfig,

    /// In-memory resource controllers to register.
    pub resources: Vec<ResourceConfig>,

    /// View templates.
    pub views: ViewsConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,

    /// Largest request body accepted, in bytes.
    pub max_body_bytes: usize,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
            max_body_bytes: 1024 * 1024,
        }
    }
}

/// Timeout configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Request timeout (total time for request/response) in seconds.
    pub request_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self { request_secs: 30 }
    }
}

/// Route specification source.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RoutesConfig {
    /// Specification file (`.json` or `.toml`). No file means an empty router.
    pub spec_path: Option<String>,

    /// Path the specification is compiled under.
    pub base_path: String,
}

impl Default for RoutesConfig {
    fn default() -> Self {
        Self {
            spec_path: None,
            base_path: "/".to_string(),
        }
    }
}

/// A `MemoryResource` registered under a controller name.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ResourceConfig {
    /// Controller name referenced by `resource` entries.
    pub controller: String,

    /// Item path parameter; must match the `id` of the `resource` entry.
    #[serde(default = "default_resource_id")]
    pub id: String,

    /// Fields every create/update body must carry.
    #[serde(default)]
    pub required: Vec<String>,
}

fn default_resource_id() -> String {
    "id".to_string()
}

/// View template configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ViewsConfig {
    /// Directory templates are loaded from. No directory means no views.
    pub directory: Option<String>,

    /// Template file extension, without the dot.
    pub extension: String,
}

impl Default for ViewsConfig {
    fn default() -> Self {
        Self {
            directory: None,
            extension: "html".to_string(),
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Default tracing filter; `RUST_LOG` overrides it.
    pub log_filter: String,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_filter: "route_compiler=info,tower_http=info".to_string(),
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}
