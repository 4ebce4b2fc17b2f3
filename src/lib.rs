//! Kinship library
//!
//! Exposes the server and CLI modules for integration testing

pub mod app_settings;
pub mod cli;
pub mod metrics;
pub mod server;

pub use app_settings::Config;
