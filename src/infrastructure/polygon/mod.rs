pub mod common;
pub mod market_data;

pub use common::PolygonAgg;
pub use market_data::{PolygonMarketDataService, PolygonMarketDataServiceBuilder};
