//! Frontend components
//!
//! Configuration loading for the analyzer. Parsing into a syntax tree happens
//! outside this crate; see [`crate::ast::TreeBuilder`].

pub mod config;

pub use config::{Config, ConfigError, LanguageDefaults, LogFormatConfig, LoggingConfig};
