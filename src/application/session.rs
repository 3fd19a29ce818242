use crate::domain::errors::{MarketDataError, SessionError};
use std::fmt;
use tracing::info;

/// Where a dashboard page sources its price history
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DataSource {
    Yahoo,
    Polygon,
}

impl fmt::Display for DataSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataSource::Yahoo => write!(f, "Yahoo Finance"),
            DataSource::Polygon => write!(f, "Polygon Premium Insights"),
        }
    }
}

/// Current page of the dashboard
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Page {
    Home,
    Yahoo,
    /// Only reachable with a key the provider accepted
    Polygon { api_key: String },
}

impl Page {
    pub fn data_source(&self) -> Option<DataSource> {
        match self {
            Page::Home => None,
            Page::Yahoo => Some(DataSource::Yahoo),
            Page::Polygon { .. } => Some(DataSource::Polygon),
        }
    }
}

/// Navigation state owned by the dashboard
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionContext {
    page: Page,
}

impl Default for SessionContext {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionContext {
    pub fn new() -> Self {
        Self { page: Page::Home }
    }

    pub fn page(&self) -> &Page {
        &self.page
    }

    pub fn api_key(&self) -> Option<&str> {
        match &self.page {
            Page::Polygon { api_key } => Some(api_key),
            _ => None,
        }
    }

    pub fn launch_yahoo(&mut self) {
        info!("Session: Home -> Yahoo Finance dashboard");
        self.page = Page::Yahoo;
    }

    /// Enters the Polygon dashboard with a key that already passed validation.
    pub fn launch_polygon(&mut self, api_key: &str) -> Result<(), SessionError> {
        let api_key = api_key.trim();
        if api_key.is_empty() {
            return Err(SessionError::MissingApiKey);
        }
        info!("Session: Home -> Polygon dashboard");
        self.page = Page::Polygon {
            api_key: api_key.to_string(),
        };
        Ok(())
    }

    pub fn back(&mut self) {
        if self.page != Page::Home {
            info!("Session: back to Home");
        }
        self.page = Page::Home;
    }
}

/// Message shown on the home page when key validation fails
pub fn key_error_message(err: &MarketDataError) -> String {
    if err.is_invalid_api_key() {
        err.to_string()
    } else {
        format!("API Key Error: {}", err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_home_to_yahoo_and_back() {
        let mut session = SessionContext::new();
        assert_eq!(session.page(), &Page::Home);

        session.launch_yahoo();
        assert_eq!(session.page().data_source(), Some(DataSource::Yahoo));

        session.back();
        assert_eq!(session.page(), &Page::Home);
    }

    #[test]
    fn test_polygon_requires_key() {
        let mut session = SessionContext::new();

        assert_eq!(session.launch_polygon("   "), Err(SessionError::MissingApiKey));
        assert_eq!(session.page(), &Page::Home);

        session.launch_polygon(" abc123 ").unwrap();
        assert_eq!(session.api_key(), Some("abc123"));

        session.back();
        assert_eq!(session.api_key(), None);
    }

    #[test]
    fn test_key_error_messages() {
        assert_eq!(
            key_error_message(&MarketDataError::InvalidApiKey),
            "Invalid API Key. Please enter a valid API key."
        );

        let other = MarketDataError::Transport {
            provider: "Polygon",
            reason: "connection refused".to_string(),
        };
        assert_eq!(
            key_error_message(&other),
            "API Key Error: Request to Polygon failed: connection refused"
        );
    }
}
