//! Core utilities for imagecraft tools
//!
//! This crate provides the tool-level plumbing around the image engine:
//!
//! - **Error handling**: errors with codes, context, recovery suggestions and exit codes
//! - **Configuration**: TOML-based configuration with validation
//! - **File scanning**: image file discovery for batch runs
//!
//! # Example
//!
//! ```rust,no_run
//! use imagecraft_core::{config::Config, file_scanner::FileScanner};
//!
//! let config = Config::load(None).expect("invalid configuration");
//! let request = config.schema.output.request().expect("invalid output settings");
//!
//! let inputs = FileScanner::new(["photos"]).scan().expect("cannot scan inputs");
//! println!("{} files -> {}", inputs.len(), request.format);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]

pub mod config;
pub mod error;
pub mod file_scanner;

pub use error::{Error, ErrorCode, Result, ResultExt};

/// Re-export commonly used types
pub mod prelude {
    pub use crate::config::{Config, ConfigSchema};
    pub use crate::error::{exit_codes, Error, ErrorCode, Result, ResultExt};
    pub use crate::file_scanner::FileScanner;
}
