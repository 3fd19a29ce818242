use stockdash::application::client::{FetchJob, JobResult, MarketServices, run_job};
use stockdash::application::session::{DataSource, Page, SessionContext, key_error_message};
use stockdash::domain::errors::{MarketDataError, SessionError};
use stockdash::domain::ports::PriceHistoryProvider;
use stockdash::infrastructure::mock::MockMarketDataService;
use std::sync::Arc;

fn services(validator: MockMarketDataService) -> MarketServices {
    let yahoo = Arc::new(MockMarketDataService::new());
    let polygon = yahoo.clone();
    MarketServices {
        yahoo_history: yahoo.clone(),
        financials: yahoo,
        key_validator: Arc::new(validator),
        polygon: Arc::new(move |_key: &str| polygon.clone() as Arc<dyn PriceHistoryProvider>),
    }
}

/// Validates the key through the worker path, then navigates like the UI does.
async fn enter_polygon(session: &mut SessionContext, services: &MarketServices, key: &str) -> Result<(), String> {
    if key.trim().is_empty() {
        return Err(SessionError::MissingApiKey.to_string());
    }
    let result = run_job(
        services,
        FetchJob::ValidateKey {
            api_key: key.trim().to_string(),
        },
    )
    .await;

    match result {
        JobResult::KeyValidated { api_key, result } => {
            result?;
            session.launch_polygon(&api_key).map_err(|e| e.to_string())
        }
        other => panic!("unexpected result {:?}", other),
    }
}

#[tokio::test]
async fn test_valid_key_reaches_polygon_dashboard() {
    let services = services(MockMarketDataService::new());
    let mut session = SessionContext::new();

    enter_polygon(&mut session, &services, " pk_live ").await.unwrap();
    assert_eq!(session.page().data_source(), Some(DataSource::Polygon));
    assert_eq!(session.api_key(), Some("pk_live"));

    session.back();
    assert_eq!(session.page(), &Page::Home);
    assert_eq!(session.api_key(), None);
}

#[tokio::test]
async fn test_rejected_key_stays_home() {
    let services = services(MockMarketDataService::failing(
        r#"{"status":"ERROR","error":"Unknown API Key"}"#,
    ));
    let mut session = SessionContext::new();

    let err = enter_polygon(&mut session, &services, "pk_bad").await.unwrap_err();
    assert_eq!(err, "Invalid API Key. Please enter a valid API key.");
    assert_eq!(session.page(), &Page::Home);
}

#[tokio::test]
async fn test_other_validation_failures_are_prefixed() {
    let services = services(MockMarketDataService::failing("connection reset"));
    let mut session = SessionContext::new();

    let err = enter_polygon(&mut session, &services, "pk_any").await.unwrap_err();
    assert_eq!(err, "API Key Error: Mock reported an error: connection reset");
    assert_eq!(session.page(), &Page::Home);
}

#[tokio::test]
async fn test_missing_key_never_validates() {
    let services = services(MockMarketDataService::new());
    let mut session = SessionContext::new();

    let err = enter_polygon(&mut session, &services, "  ").await.unwrap_err();
    assert_eq!(err, "Please enter your Polygon API key to continue.");
    assert_eq!(session.page(), &Page::Home);
}

#[test]
fn test_yahoo_needs_no_key() {
    let mut session = SessionContext::new();
    session.launch_yahoo();
    assert_eq!(session.page(), &Page::Yahoo);
    assert_eq!(session.api_key(), None);

    assert_eq!(
        key_error_message(&MarketDataError::InvalidApiKey),
        "Invalid API Key. Please enter a valid API key."
    );
}
