//! Logging infrastructure
//!
//! Structured logging using tracing and tracing-subscriber: JSON or pretty
//! formatting, optional rotating file output alongside stdout.

pub mod config;
pub mod logger;

pub use config::{LogConfig, LogFormat, RotationPolicy};
pub use logger::LoggerImpl;
