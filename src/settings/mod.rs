//! Settings module
//!
//! Layered configuration: embedded defaults, optional files, environment.

mod config;
mod loader;

pub use config::AppConfig;
pub use loader::load_config;
