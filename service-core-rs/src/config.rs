//! Service configuration from environment variables.
//!
//! Standardized `<SERVICE>_...` variable names with sensible fallbacks so
//! every service resolves ports, peer addresses and timeouts the same way.
//! Values are read once in `main` and passed down explicitly; nothing else
//! in the crate touches the environment.

use std::env;
use std::net::SocketAddr;
use std::time::Duration;

use tracing::warn;

/// Environment-backed configuration reader for one service.
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    service_name: String,
}

impl ServiceConfig {
    pub fn new(service_name: &str) -> Self {
        Self {
            service_name: service_name.to_string(),
        }
    }

    fn env_prefix(name: &str) -> String {
        name.to_uppercase().replace('-', "_")
    }

    /// Port from `<SERVICE>_SERVICE_PORT`, falling back to the default.
    pub fn get_service_port(&self, default_port: u16) -> u16 {
        let var_name = format!("{}_SERVICE_PORT", Self::env_prefix(&self.service_name));
        match env::var(&var_name) {
            Ok(value) => value.parse::<u16>().unwrap_or_else(|_| {
                warn!(var = %var_name, "invalid port value, using default {}", default_port);
                default_port
            }),
            Err(_) => default_port,
        }
    }

    /// Bind address for this service, `0.0.0.0:<port>`.
    pub fn get_bind_address(&self, default_port: u16) -> SocketAddr {
        let port = self.get_service_port(default_port);
        SocketAddr::from(([0, 0, 0, 0], port))
    }

    /// Client connection address for a peer service:
    /// `<PEER>_SERVICE_ADDR` wins, else `http://localhost:<port>` with
    /// `<PEER>_SERVICE_PORT` applied.
    pub fn get_client_address(&self, peer_name: &str, default_port: u16) -> String {
        let prefix = Self::env_prefix(peer_name);
        if let Ok(addr) = env::var(format!("{}_SERVICE_ADDR", prefix)) {
            return addr;
        }

        let port = env::var(format!("{}_SERVICE_PORT", prefix))
            .ok()
            .and_then(|value| value.parse::<u16>().ok())
            .unwrap_or(default_port);
        format!("http://localhost:{}", port)
    }

    /// Per-call timeout from `<SERVICE>_TIMEOUT_MS`.
    pub fn get_timeout(&self, default_ms: u64) -> Duration {
        let var_name = format!("{}_TIMEOUT_MS", Self::env_prefix(&self.service_name));
        let millis = env::var(&var_name)
            .ok()
            .and_then(|value| value.parse::<u64>().ok())
            .unwrap_or(default_ms);
        Duration::from_millis(millis)
    }

    /// Retry attempts for the auth gate from `<SERVICE>_AUTH_RETRIES`.
    pub fn get_auth_retries(&self, default: u32) -> u32 {
        let var_name = format!("{}_AUTH_RETRIES", Self::env_prefix(&self.service_name));
        env::var(&var_name)
            .ok()
            .and_then(|value| value.parse::<u32>().ok())
            .unwrap_or(default)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_service_port() {
        std::env::set_var("PORT_TEST_SERVICE_PORT", "9000");
        assert_eq!(ServiceConfig::new("port-test").get_service_port(8000), 9000);

        std::env::remove_var("PORT_UNSET_SERVICE_PORT");
        assert_eq!(ServiceConfig::new("port-unset").get_service_port(8000), 8000);
    }

    #[test]
    fn test_invalid_port_falls_back_to_default() {
        std::env::set_var("PORT_BAD_SERVICE_PORT", "not-a-port");
        assert_eq!(ServiceConfig::new("port-bad").get_service_port(8000), 8000);
    }

    #[test]
    fn test_get_client_address() {
        std::env::set_var("PEER_A_SERVICE_ADDR", "http://example.com:9000");
        assert_eq!(
            ServiceConfig::new("test").get_client_address("peer-a", 8000),
            "http://example.com:9000"
        );

        std::env::remove_var("PEER_B_SERVICE_ADDR");
        std::env::set_var("PEER_B_SERVICE_PORT", "9100");
        assert_eq!(
            ServiceConfig::new("test").get_client_address("peer-b", 8000),
            "http://localhost:9100"
        );

        std::env::remove_var("PEER_C_SERVICE_ADDR");
        std::env::remove_var("PEER_C_SERVICE_PORT");
        assert_eq!(
            ServiceConfig::new("test").get_client_address("peer-c", 8000),
            "http://localhost:8000"
        );
    }

    #[test]
    fn test_get_timeout() {
        std::env::set_var("TIMEOUT_TEST_TIMEOUT_MS", "250");
        assert_eq!(
            ServiceConfig::new("timeout-test").get_timeout(3000),
            Duration::from_millis(250)
        );

        std::env::remove_var("TIMEOUT_UNSET_TIMEOUT_MS");
        assert_eq!(
            ServiceConfig::new("timeout-unset").get_timeout(3000),
            Duration::from_millis(3000)
        );
    }
}
