//! Periodic HTTP uptime checks with down alerts and a paginated status API.

pub mod api;
pub mod config;
pub mod detector;
pub mod engine;
pub mod models;
pub mod notify;
pub mod pagination;
pub mod prober;
pub mod store;
