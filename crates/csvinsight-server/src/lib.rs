pub mod api;
pub mod app;
pub mod config;
pub mod health;
pub mod insights;
pub mod logging;
pub mod reports;
pub mod sample;
pub mod state;
