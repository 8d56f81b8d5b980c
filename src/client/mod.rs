//! Client module - HTTP transport, configuration and logging

pub mod config;
pub mod http;
pub mod logging;

pub use config::{Config, ConfigError};
pub use http::HttpRaceService;
