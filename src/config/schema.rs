//! Configuration schema definitions.
//!
//! This module defines the service configuration for the routing daemon.
//! All types derive Serde traits for deserialization from TOML files. Route
//! data itself lives in a separate route file (see `codec`).

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::codec::store::{RouteFormat, RouteStore};

/// Root configuration for the routing daemon.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct RouterConfig {
    /// Route file location and reload behavior.
    pub routes: RoutesConfig,

    /// Defaults applied to routing requests.
    pub routing: RoutingConfig,

    /// Admin API settings.
    pub admin: AdminConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Route file configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RoutesConfig {
    /// Path of the route file.
    pub path: PathBuf,

    /// File format; inferred from the extension when omitted.
    pub format: Option<RouteFormat>,

    /// Reload automatically when the file changes.
    pub watch: bool,
}

impl Default for RoutesConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("carrierroute.conf"),
            format: None,
            watch: false,
        }
    }
}

impl RoutesConfig {
    /// The store described by this section.
    pub fn store(&self) -> RouteStore {
        match self.format {
            Some(format) => RouteStore::with_format(self.path.clone(), format),
            None => RouteStore::new(self.path.clone()),
        }
    }
}

/// Routing request defaults.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct RoutingConfig {
    /// Treat probing rules as eligible for admin lookups.
    pub allow_probing: bool,

    /// Carrier used when a request names none.
    pub default_carrier: Option<String>,
}

/// Admin API configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AdminConfig {
    /// Enable the admin API.
    pub enabled: bool,

    /// API key for authentication (Bearer token).
    pub api_key: String,

    /// Admin API bind address.
    pub bind_address: String,
}

impl Default for AdminConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            // WARNING: This is a placeholder! Change this in production.
            api_key: "CHANGE_ME_IN_PRODUCTION".to_string(),
            bind_address: "127.0.0.1:8081".to_string(),
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minimal_config() {
        let config: RouterConfig = toml::from_str("[routes]\npath = \"/etc/routes.toml\"\n").unwrap();
        assert_eq!(config.routes.path, PathBuf::from("/etc/routes.toml"));
        assert_eq!(config.routes.store().format(), RouteFormat::Toml);
        assert!(!config.admin.enabled);
        assert_eq!(config.observability.log_level, "info");
    }

    #[test]
    fn test_explicit_format_overrides_extension() {
        let config: RouterConfig =
            toml::from_str("[routes]\npath = \"routes.txt\"\nformat = \"json\"\nwatch = true\n").unwrap();
        assert_eq!(config.routes.store().format(), RouteFormat::Json);
        assert!(config.routes.watch);
    }
}
