use std::path::PathBuf;

use crate::auth::JwtConfig;

/// Server configuration
///
/// # Environment variables
///
/// | Variable | Default | Meaning |
/// |----------|---------|---------|
/// | WORK_DIR | /var/lib/comanda | working directory (database, logs) |
/// | HTTP_PORT | 3000 | HTTP API port |
/// | MESSAGE_TCP_PORT | 8081 | message bus TCP port |
/// | ENVIRONMENT | development | development \| staging \| production |
/// | TAX_RATE | 0.10 | bill tax rate (presentation only) |
///
/// # Example
///
/// ```ignore
/// WORK_DIR=/data/comanda HTTP_PORT=8080 cargo run
/// ```
#[derive(Debug, Clone)]
pub struct Config {
    /// Working directory for database and log files
    pub work_dir: String,
    /// HTTP API port
    pub http_port: u16,
    /// Message bus TCP port (dashboard clients connect here)
    pub message_tcp_port: u16,
    /// JWT configuration
    pub jwt: JwtConfig,
    /// Runtime environment: development | staging | production
    pub environment: String,
    /// Tax rate applied at bill presentation; the engine itself stores
    /// tax-free totals
    pub tax_rate: f64,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        Self {
            work_dir: std::env::var("WORK_DIR").unwrap_or_else(|_| "/var/lib/comanda".into()),
            http_port: std::env::var("HTTP_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(3000),
            message_tcp_port: std::env::var("MESSAGE_TCP_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(8081),
            jwt: JwtConfig::default(),
            environment: std::env::var("ENVIRONMENT").unwrap_or_else(|_| "development".into()),
            tax_rate: std::env::var("TAX_RATE")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(0.10),
        }
    }

    /// Override work dir and ports (test scenarios)
    pub fn with_overrides(
        work_dir: impl Into<String>,
        http_port: u16,
        message_tcp_port: u16,
    ) -> Self {
        let mut config = Self::from_env();
        config.work_dir = work_dir.into();
        config.http_port = http_port;
        config.message_tcp_port = message_tcp_port;
        config
    }

    /// Database directory under the work dir
    pub fn database_dir(&self) -> PathBuf {
        PathBuf::from(&self.work_dir).join("database")
    }

    /// Log directory under the work dir
    pub fn log_dir(&self) -> PathBuf {
        PathBuf::from(&self.work_dir).join("logs")
    }

    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }

    pub fn is_development(&self) -> bool {
        self.environment == "development"
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_env()
    }
}
