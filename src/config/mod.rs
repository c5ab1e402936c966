//! Configuration system - environment-based config loading.
//!
//! Everything the poller needs comes from environment variables; there is
//! no config file layer. A restart re-reads the environment.

pub mod settings;

pub use settings::*;
