//! Provider configuration parsing from environment variables.
//!
//! This module handles loading configuration for both market data providers:
//! - Polygon (keyed aggregates API)
//! - Yahoo Finance (free chart and fundamentals endpoints)

use std::env;

/// Polygon API configuration
#[derive(Debug, Clone, Default)]
pub struct PolygonConfig {
    pub api_key: String,
    pub base_url: String,
}

impl PolygonConfig {
    pub fn from_env() -> Self {
        Self {
            api_key: env::var("POLYGON_API_KEY").unwrap_or_default(),
            base_url: env::var("POLYGON_BASE_URL")
                .unwrap_or_else(|_| "https://api.polygon.io".to_string()),
        }
    }

    pub fn has_api_key(&self) -> bool {
        !self.api_key.trim().is_empty()
    }
}

/// Yahoo Finance endpoint configuration
#[derive(Debug, Clone, Default)]
pub struct YahooConfig {
    pub chart_url: String,
    pub fundamentals_url: String,
}

impl YahooConfig {
    pub fn from_env() -> Self {
        Self {
            chart_url: env::var("YAHOO_CHART_URL")
                .unwrap_or_else(|_| "https://query1.finance.yahoo.com".to_string()),
            fundamentals_url: env::var("YAHOO_FUNDAMENTALS_URL")
                .unwrap_or_else(|_| "https://query2.finance.yahoo.com".to_string()),
        }
    }
}

/// Timeouts applied to every outbound HTTP client
#[derive(Debug, Clone)]
pub struct HttpConfig {
    pub timeout_secs: u64,
    pub connect_timeout_secs: u64,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 30,
            connect_timeout_secs: 10,
        }
    }
}

impl HttpConfig {
    pub fn from_env() -> Self {
        Self {
            timeout_secs: env::var("HTTP_TIMEOUT_SECS")
                .unwrap_or_else(|_| "30".to_string())
                .parse::<u64>()
                .unwrap_or(30),
            connect_timeout_secs: env::var("HTTP_CONNECT_TIMEOUT_SECS")
                .unwrap_or_else(|_| "10".to_string())
                .parse::<u64>()
                .unwrap_or(10),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_polygon_config_defaults() {
        let config = PolygonConfig::from_env();
        assert!(config.base_url.contains("polygon.io"));
    }

    #[test]
    fn test_yahoo_config_defaults() {
        let config = YahooConfig::from_env();
        assert!(config.chart_url.contains("query1.finance.yahoo.com"));
        assert!(config.fundamentals_url.contains("query2.finance.yahoo.com"));
    }

    #[test]
    fn test_http_config_defaults() {
        let config = HttpConfig::default();
        assert_eq!(config.timeout_secs, 30);
        assert_eq!(config.connect_timeout_secs, 10);
    }

    #[test]
    fn test_blank_key_is_missing() {
        let config = PolygonConfig {
            api_key: "   ".to_string(),
            base_url: String::new(),
        };
        assert!(!config.has_api_key());
    }
}
