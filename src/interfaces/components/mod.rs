pub mod card;
pub mod charts;
pub mod metrics;
pub mod table;
