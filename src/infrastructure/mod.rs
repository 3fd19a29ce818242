pub mod core;
pub mod export;
pub mod factory;
pub mod mock;
pub mod polygon;
pub mod yahoo;

pub use export::SpreadsheetExporter;
pub use factory::ServiceFactory;
