use crate::application::client::{MarketServices, PolygonFactory};
use crate::config::{Config, DataMode};
use crate::domain::ports::PriceHistoryProvider;
use crate::infrastructure::mock::MockMarketDataService;
use crate::infrastructure::polygon::PolygonMarketDataService;
use crate::infrastructure::yahoo::YahooFinanceService;
use std::sync::Arc;
use tracing::info;

pub struct ServiceFactory;

impl ServiceFactory {
    pub fn create_services(config: &Config) -> MarketServices {
        match config.mode {
            DataMode::Mock => {
                info!("ServiceFactory: using mock market data");
                let mock = Arc::new(MockMarketDataService::new());
                let polygon_mock = mock.clone();
                let polygon: PolygonFactory = Arc::new(move |_api_key: &str| {
                    polygon_mock.clone() as Arc<dyn PriceHistoryProvider>
                });

                MarketServices {
                    yahoo_history: mock.clone(),
                    financials: mock.clone(),
                    key_validator: mock,
                    polygon,
                }
            }
            DataMode::Live => {
                info!("ServiceFactory: using live Yahoo Finance and Polygon endpoints");
                let yahoo = Arc::new(YahooFinanceService::new(&config.yahoo, &config.http));
                let polygon_service = Arc::new(PolygonMarketDataService::new(&config.polygon, &config.http));

                // Keys entered in the UI reuse the configured client and base URL
                let base = polygon_service.clone();
                let polygon: PolygonFactory = Arc::new(move |api_key: &str| {
                    Arc::new(base.with_api_key(api_key.to_string())) as Arc<dyn PriceHistoryProvider>
                });

                MarketServices {
                    yahoo_history: yahoo.clone(),
                    financials: yahoo,
                    key_validator: polygon_service,
                    polygon,
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{HttpConfig, PolygonConfig, YahooConfig};
    use std::path::PathBuf;

    fn config(mode: DataMode) -> Config {
        Config {
            mode,
            polygon: PolygonConfig {
                api_key: String::new(),
                base_url: "http://127.0.0.1:9".to_string(),
            },
            yahoo: YahooConfig {
                chart_url: "http://127.0.0.1:9/chart".to_string(),
                fundamentals_url: "http://127.0.0.1:9/fundamentals".to_string(),
            },
            http: HttpConfig::default(),
            export_dir: PathBuf::from("."),
        }
    }

    #[test]
    fn test_live_services_name_their_providers() {
        let services = ServiceFactory::create_services(&config(DataMode::Live));
        assert_eq!(services.yahoo_history.name(), "Yahoo Finance");
        assert_eq!((services.polygon)("key").name(), "Polygon");
    }

    #[tokio::test]
    async fn test_mock_services_accept_any_key() {
        let services = ServiceFactory::create_services(&config(DataMode::Mock));
        assert!(services.key_validator.validate_key("anything").await.is_ok());
    }
}
