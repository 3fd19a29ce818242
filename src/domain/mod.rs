// Market data domain (bars, tickers, ranges)
pub mod market;

// Annual financial statements
pub mod financials;

// Port interfaces
pub mod ports;

// Tabular shape shared by views and exports
pub mod table;

// Domain-specific error types
pub mod errors;
