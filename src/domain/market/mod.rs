// Market data domain
pub mod timespan;
pub mod types;
pub mod weekly;
