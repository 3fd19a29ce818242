// Weekly gap analysis and two-ticker comparison
pub mod comparison;
pub mod gap_analysis;

// Display tables built from fetched data
pub mod tables;

// Provider calls folded into user-facing outcomes
pub mod data_fetch;

// Navigation state and the background fetch worker
pub mod client;
pub mod session;
