//! Configuration management for Perks Core

use anyhow::{Context, Result};
use std::env;

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// HTTP server host
    pub http_host: String,
    /// HTTP server port
    pub http_port: u16,
    /// Database configuration
    pub database: DatabaseConfig,
    /// Redis configuration
    pub redis: RedisConfig,
    /// Telemetry configuration
    pub telemetry: TelemetryConfig,
    /// Application-level settings
    pub app: AppConfig,
}

#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
}

#[derive(Debug, Clone)]
pub struct RedisConfig {
    pub url: String,
    /// When false, the server runs with a no-op cache instead of Redis
    pub enabled: bool,
}

#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    /// "text" or "json"
    pub log_format: String,
    pub metrics_enabled: bool,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            log_format: "text".to_string(),
            metrics_enabled: true,
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Prefix of generated loyalty card numbers
    pub card_number_prefix: String,
    /// TTL for cached per-customer card listings, in seconds
    pub card_list_ttl_secs: u64,
    /// Capacity of the in-process sync event channel
    pub sync_channel_capacity: usize,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            card_number_prefix: "GC".to_string(),
            card_list_ttl_secs: 300,
            sync_channel_capacity: 1024,
        }
    }
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            http_host: env::var("HTTP_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            http_port: env::var("HTTP_PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()
                .context("Invalid HTTP_PORT")?,
            database: DatabaseConfig {
                url: env::var("DATABASE_URL").context("DATABASE_URL is required")?,
                max_connections: env::var("DATABASE_MAX_CONNECTIONS")
                    .unwrap_or_else(|_| "10".to_string())
                    .parse()
                    .unwrap_or(10),
                min_connections: env::var("DATABASE_MIN_CONNECTIONS")
                    .unwrap_or_else(|_| "2".to_string())
                    .parse()
                    .unwrap_or(2),
            },
            redis: RedisConfig {
                url: env::var("REDIS_URL").unwrap_or_else(|_| "redis://localhost:6379".to_string()),
                enabled: env::var("REDIS_ENABLED")
                    .map(|s| s.to_lowercase() != "false")
                    .unwrap_or(true),
            },
            telemetry: TelemetryConfig {
                log_format: env::var("LOG_FORMAT").unwrap_or_else(|_| "text".to_string()),
                metrics_enabled: env::var("METRICS_ENABLED")
                    .map(|s| s.to_lowercase() != "false")
                    .unwrap_or(true),
            },
            app: AppConfig {
                card_number_prefix: env::var("CARD_NUMBER_PREFIX")
                    .unwrap_or_else(|_| "GC".to_string()),
                card_list_ttl_secs: env::var("CARD_LIST_TTL_SECS")
                    .unwrap_or_else(|_| "300".to_string())
                    .parse()
                    .unwrap_or(300),
                sync_channel_capacity: env::var("SYNC_CHANNEL_CAPACITY")
                    .unwrap_or_else(|_| "1024".to_string())
                    .parse()
                    .unwrap_or(1024),
            },
        })
    }

    /// Get HTTP server address
    pub fn http_addr(&self) -> String {
        format!("{}:{}", self.http_host, self.http_port)
    }
}
