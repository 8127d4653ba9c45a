//! Process-level infrastructure

pub mod logging;

pub use logging::{init_dev_logging, init_logging, init_prod_logging, LogConfig, LogFormat, LogOutput};
