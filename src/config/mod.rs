//! Configuration module for the Nexus backend.
//!
//! All configuration is loaded from environment variables with sensible defaults.

use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Path to SQLite database file
    pub db_path: PathBuf,
    /// Address to bind the server to
    pub bind_addr: SocketAddr,
    /// Log level (trace, debug, info, warn, error)
    pub log_level: String,
    /// Email address that receives the admin role at registration
    pub admin_email: Option<String>,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        let db_path = env::var("NEXUS_DB_PATH")
            .unwrap_or_else(|_| "./data/nexus.sqlite".to_string())
            .into();

        let bind_addr = env::var("NEXUS_BIND_ADDR")
            .unwrap_or_else(|_| "127.0.0.1:8080".to_string())
            .parse()
            .expect("Invalid NEXUS_BIND_ADDR format");

        let log_level = env::var("NEXUS_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        let admin_email = env::var("NEXUS_ADMIN_EMAIL").ok();

        Self {
            db_path,
            bind_addr,
            log_level,
            admin_email,
        }
    }

    /// Whether the given email should be granted the admin role.
    pub fn is_admin_email(&self, email: &str) -> bool {
        self.admin_email
            .as_deref()
            .is_some_and(|admin| admin.eq_ignore_ascii_case(email))
    }
}
