pub mod components;
pub mod dashboard;
pub mod design_system;
pub mod home;
pub mod ui;
pub mod view_models;
