//! Review aggregation and helpful-vote service for the school directory.

pub mod api;
pub mod app_state;
pub mod config;
pub mod db;
pub mod error;
pub mod identity;
pub mod middleware;
pub mod services;
pub mod telemetry;
pub mod utils;
