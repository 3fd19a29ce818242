pub mod chart_view_model;
pub mod dashboard_view_model;
