use thiserror::Error;

/// Substring the premium provider puts in its rejection of a bad key
pub const UNKNOWN_API_KEY_MARKER: &str = "Unknown API Key";

/// Errors related to market data providers and connectivity
#[derive(Debug, Error)]
pub enum MarketDataError {
    #[error("Invalid API Key. Please enter a valid API key.")]
    InvalidApiKey,

    #[error("{provider} requires an API key")]
    MissingApiKey { provider: &'static str },

    #[error("{provider} API error ({status}): {message}")]
    Http {
        provider: &'static str,
        status: u16,
        message: String,
    },

    #[error("{provider} reported an error: {message}")]
    Provider {
        provider: &'static str,
        message: String,
    },

    #[error("Request to {provider} failed: {reason}")]
    Transport {
        provider: &'static str,
        reason: String,
    },

    #[error("Failed to decode {provider} response: {reason}")]
    Decode {
        provider: &'static str,
        reason: String,
    },

    #[error("Invalid request: {reason}")]
    InvalidRequest { reason: String },
}

impl MarketDataError {
    /// Promotes provider rejections that mention an unknown key to `InvalidApiKey`.
    pub fn classify_key_rejection(self) -> Self {
        let mentions_key = match &self {
            MarketDataError::Http { message, .. } | MarketDataError::Provider { message, .. } => {
                message.contains(UNKNOWN_API_KEY_MARKER)
            }
            _ => false,
        };

        if mentions_key {
            MarketDataError::InvalidApiKey
        } else {
            self
        }
    }

    pub fn is_invalid_api_key(&self) -> bool {
        matches!(self, MarketDataError::InvalidApiKey)
    }
}

/// Errors related to writing and reading spreadsheet exports
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("Nothing to export: {name} is empty")]
    EmptyTable { name: String },

    #[error("I/O error on {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Spreadsheet format error: {reason}")]
    Format { reason: String },
}

/// Errors related to dashboard navigation
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SessionError {
    #[error("Please enter your Polygon API key to continue.")]
    MissingApiKey,
}
