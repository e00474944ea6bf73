//! Configuration management for the salon server

mod loader;
mod schema;

pub use loader::ConfigLoader;
pub use schema::{AppConfig, LimitsConfig, ServerConfig};
