//! Service configuration module

pub mod service_config;

pub use service_config::*;
