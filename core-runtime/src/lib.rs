//! # Runtime Module
//!
//! Configuration and logging bootstrap for the Reference Library Core.
//!
//! ## Overview
//!
//! This module owns:
//! - `CoreConfig`: validated settings (library root, database path, optional
//!   WebDAV mirror) built via builder or environment
//! - Logging initialisation on top of `tracing-subscriber`

pub mod config;
pub mod error;
pub mod logging;

pub use config::{CoreConfig, CoreConfigBuilder, WebDavSettings};
pub use error::{Error, Result};
pub use logging::{init_logging, LogFormat, LoggingConfig};
