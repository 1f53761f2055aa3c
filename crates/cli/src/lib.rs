//! CLI utilities for imagecraft
//!
//! Provides shared CLI functionality:
//! - Argument groups shared across subcommands
//! - Terminal output formatting
//! - Progress indicators

#![warn(missing_docs)]

pub mod args;
pub mod output;
pub mod progress;
