use crate::domain::errors::MarketDataError;
use crate::domain::market::types::PriceBar;
use chrono::{TimeZone, Utc};
use rust_decimal::Decimal;
use rust_decimal::prelude::FromPrimitive;
use serde::{Deserialize, Serialize};

pub const PROVIDER: &str = "Polygon";

/// One aggregate bar as returned by `/v2/aggs`
#[derive(Debug, Deserialize, Clone, Serialize)]
pub struct PolygonAgg {
    /// Window start, unix milliseconds
    #[serde(rename = "t")]
    pub timestamp: i64,
    #[serde(rename = "o")]
    pub open: f64,
    #[serde(rename = "h")]
    pub high: f64,
    #[serde(rename = "l")]
    pub low: f64,
    #[serde(rename = "c")]
    pub close: f64,
    #[serde(rename = "v")]
    pub volume: f64,
}

impl PolygonAgg {
    /// `None` when the timestamp or a price cannot be represented
    pub fn to_price_bar(&self) -> Option<PriceBar> {
        Some(PriceBar {
            timestamp: Utc.timestamp_millis_opt(self.timestamp).single()?,
            open: Decimal::from_f64(self.open)?,
            high: Decimal::from_f64(self.high)?,
            low: Decimal::from_f64(self.low)?,
            close: Decimal::from_f64(self.close)?,
            volume: Decimal::from_f64(self.volume)?,
        })
    }
}

/// Envelope shared by the aggregates and market status endpoints
#[derive(Debug, Deserialize, Default)]
pub struct PolygonEnvelope {
    pub status: Option<String>,
    #[serde(default)]
    pub results: Option<Vec<PolygonAgg>>,
    pub next_url: Option<String>,
    pub error: Option<String>,
    pub message: Option<String>,
}

impl PolygonEnvelope {
    fn reported_error(&self) -> Option<String> {
        let failed = matches!(
            self.status.as_deref(),
            Some("ERROR") | Some("NOT_AUTHORIZED") | Some("NOT_FOUND")
        );
        if failed || self.error.is_some() {
            Some(
                self.error
                    .clone()
                    .or_else(|| self.message.clone())
                    .unwrap_or_else(|| "unknown error".to_string()),
            )
        } else {
            None
        }
    }
}

/// One page of aggregates plus the cursor URL for the next one
#[derive(Debug, Default)]
pub struct AggsPage {
    pub bars: Vec<PriceBar>,
    pub next_url: Option<String>,
}

/// Decodes a response body into an envelope, surfacing provider-reported errors.
pub fn parse_envelope(body: &str) -> Result<PolygonEnvelope, MarketDataError> {
    let envelope: PolygonEnvelope =
        serde_json::from_str(body).map_err(|e| MarketDataError::Decode {
            provider: PROVIDER,
            reason: e.to_string(),
        })?;

    if let Some(message) = envelope.reported_error() {
        return Err(MarketDataError::Provider {
            provider: PROVIDER,
            message,
        }
        .classify_key_rejection());
    }

    Ok(envelope)
}

/// Decodes one `/v2/aggs` page. Bars that cannot be represented are dropped.
pub fn parse_aggs_page(body: &str) -> Result<AggsPage, MarketDataError> {
    let envelope = parse_envelope(body)?;
    let bars = envelope
        .results
        .unwrap_or_default()
        .iter()
        .filter_map(PolygonAgg::to_price_bar)
        .collect();

    Ok(AggsPage {
        bars,
        next_url: envelope.next_url.filter(|u| !u.is_empty()),
    })
}

/// Builds the error for a non-2xx response, keeping the provider's own message.
pub fn http_error(status: u16, body: &str) -> MarketDataError {
    let message = serde_json::from_str::<PolygonEnvelope>(body)
        .ok()
        .and_then(|e| e.reported_error())
        .unwrap_or_else(|| body.trim().to_string());

    MarketDataError::Http {
        provider: PROVIDER,
        status,
        message,
    }
    .classify_key_rejection()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    const AGGS_PAGE: &str = r#"{
        "ticker": "AAPL",
        "queryCount": 2,
        "resultsCount": 2,
        "adjusted": true,
        "results": [
            {"v": 70790813, "vw": 131.6292, "o": 130.465, "c": 130.15, "h": 133.41, "l": 129.89, "t": 1673240400000, "n": 645365},
            {"v": 63896155, "vw": 129.8216, "o": 130.26, "c": 130.73, "h": 131.2636, "l": 128.12, "t": 1673326800000, "n": 554940}
        ],
        "status": "OK",
        "request_id": "6a7e466379af0a71039d60cc78e72282",
        "count": 2,
        "next_url": "https://api.polygon.io/v2/aggs/ticker/AAPL/range/1/day/1673326800000/2023-01-31?cursor=bGltaXQ9Mg"
    }"#;

    #[test]
    fn test_parse_aggs_page() {
        let page = parse_aggs_page(AGGS_PAGE).unwrap();

        assert_eq!(page.bars.len(), 2);
        assert_eq!(page.bars[0].open, dec!(130.465));
        assert_eq!(page.bars[0].volume, dec!(70790813));
        assert_eq!(page.bars[0].date().to_string(), "2023-01-09");
        assert!(page.next_url.unwrap().contains("cursor="));
    }

    #[test]
    fn test_delayed_status_without_results_is_empty() {
        let page = parse_aggs_page(
            r#"{"ticker":"ZZZZ","queryCount":0,"resultsCount":0,"adjusted":true,"status":"DELAYED","request_id":"x","count":0}"#,
        )
        .unwrap();

        assert!(page.bars.is_empty());
        assert!(page.next_url.is_none());
    }

    #[test]
    fn test_unknown_key_body_becomes_invalid_key() {
        let body = r#"{"status":"ERROR","request_id":"abc","error":"Unknown API Key"}"#;

        assert!(parse_aggs_page(body).unwrap_err().is_invalid_api_key());
        assert!(http_error(401, body).is_invalid_api_key());
    }

    #[test]
    fn test_not_authorized_keeps_provider_message() {
        let body = r#"{"status":"NOT_AUTHORIZED","request_id":"abc","message":"You are not entitled to this data."}"#;
        let err = http_error(403, body);

        assert!(!err.is_invalid_api_key());
        assert!(err.to_string().contains("not entitled"));
        assert!(err.to_string().contains("403"));
    }

    #[test]
    fn test_garbage_body_is_decode_error() {
        let err = parse_aggs_page("<html>bad gateway</html>").unwrap_err();
        assert!(matches!(err, MarketDataError::Decode { .. }));
    }
}
