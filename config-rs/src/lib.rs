//! config-rs/lib.rs
//! Shared configuration utilities for the prompt improver service
//! Provides standardized functions for port/address management and .env loading

use std::env;
use std::net::SocketAddr;

/// Default HTTP port for the prompt improver service
pub const DEFAULT_HTTP_PORT: u16 = 8000;

/// Load a `.env` file from the working directory if one exists.
///
/// Returns `true` when a file was found and applied.
pub fn load_dotenv() -> bool {
    match dotenv::dotenv() {
        Ok(path) => {
            log::debug!("Loaded environment from {}", path.display());
            true
        }
        Err(_) => false,
    }
}

/// Get service port from environment variables with proper fallback
///
/// Resolution order:
/// 1. `PORT` (set by most PaaS hosts)
/// 2. `{SERVICE_NAME}_SERVICE_PORT`
/// 3. `default_port`
pub fn get_service_port(service_name: &str, default_port: u16) -> u16 {
    if let Ok(port) = env::var("PORT") {
        match port.parse::<u16>() {
            Ok(port) => return port,
            Err(_) => log::warn!("Invalid port in PORT, ignoring"),
        }
    }

    let var_name = format!("{}_SERVICE_PORT", env_prefix(service_name));
    env::var(&var_name)
        .unwrap_or_else(|_| default_port.to_string())
        .parse::<u16>()
        .unwrap_or_else(|_| {
            log::warn!("Invalid port in {}, using default {}", var_name, default_port);
            default_port
        })
}

/// Host to bind on: all interfaces when running on a hosted platform
/// (`RENDER` is set), loopback otherwise.
pub fn get_bind_host() -> &'static str {
    if env::var_os("RENDER").is_some() {
        "0.0.0.0"
    } else {
        "127.0.0.1"
    }
}

/// Create a SocketAddr for binding a service
///
/// A full `{SERVICE_NAME}_SERVICE_ADDR` override (either `host:port` or
/// `http://host:port`) wins over the port/host resolution.
pub fn get_bind_address(service_name: &str, default_port: u16) -> SocketAddr {
    let var_name = format!("{}_SERVICE_ADDR", env_prefix(service_name));

    if let Ok(addr_str) = env::var(&var_name) {
        let trimmed = addr_str
            .strip_prefix("http://")
            .or_else(|| addr_str.strip_prefix("https://"))
            .unwrap_or(&addr_str);
        match trimmed.parse::<SocketAddr>() {
            Ok(addr) => return addr,
            Err(_) => log::warn!("Invalid address format in {}, using default", var_name),
        }
    }

    let port = get_service_port(service_name, default_port);
    SocketAddr::new(
        get_bind_host()
            .parse()
            .unwrap_or(std::net::IpAddr::V4(std::net::Ipv4Addr::LOCALHOST)),
        port,
    )
}

/// Service-level configuration resolved once at startup
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    pub service_name: String,
}

impl ServiceConfig {
    pub fn new(service_name: impl Into<String>) -> Self {
        Self {
            service_name: service_name.into(),
        }
    }

    pub fn get_service_port(&self, default_port: u16) -> u16 {
        get_service_port(&self.service_name, default_port)
    }

    pub fn get_bind_address(&self, default_port: u16) -> SocketAddr {
        get_bind_address(&self.service_name, default_port)
    }
}

// "prompt-improver" -> "PROMPT_IMPROVER"
fn env_prefix(service_name: &str) -> String {
    service_name
        .to_uppercase()
        .replace(|c: char| !c.is_ascii_alphanumeric(), "_")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_env_prefix() {
        assert_eq!(env_prefix("prompt-improver"), "PROMPT_IMPROVER");
        assert_eq!(env_prefix("LLM"), "LLM");
    }

    #[test]
    fn test_get_service_port() {
        // PORT is shared process state; the other cases only hold without it
        std::env::remove_var("PORT");

        // Test with environment variable
        std::env::set_var("CFGTEST_SERVICE_PORT", "9000");
        assert_eq!(get_service_port("cfgtest", 8000), 9000);

        // Test with default
        std::env::remove_var("UNKNOWN_SERVICE_PORT");
        assert_eq!(get_service_port("UNKNOWN", 8000), 8000);

        // Test with garbage
        std::env::set_var("BROKEN_SERVICE_PORT", "not-a-port");
        assert_eq!(get_service_port("BROKEN", 8000), 8000);

        // Same lookup through ServiceConfig
        assert_eq!(ServiceConfig::new("cfgtest").get_service_port(8000), 9000);
        assert_eq!(ServiceConfig::new("unknown").get_service_port(8100), 8100);

        std::env::remove_var("CFGTEST_SERVICE_PORT");
        std::env::remove_var("BROKEN_SERVICE_PORT");
    }

    #[test]
    fn test_get_bind_address_override() {
        std::env::set_var("ADDRTEST_SERVICE_ADDR", "http://127.0.0.1:9100");
        let addr = get_bind_address("addrtest", 8000);
        assert_eq!(addr, "127.0.0.1:9100".parse::<SocketAddr>().unwrap());

        std::env::set_var("ADDRTEST_SERVICE_ADDR", "10.0.0.1:9200");
        let addr = ServiceConfig::new("addrtest").get_bind_address(8000);
        assert_eq!(addr, "10.0.0.1:9200".parse::<SocketAddr>().unwrap());

        std::env::remove_var("ADDRTEST_SERVICE_ADDR");
    }
}
