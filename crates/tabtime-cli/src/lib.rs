//! Timesheet reporting CLI library.
//!
//! This crate provides the CLI interface around `tabtime-core`: argument
//! parsing, configuration, file reading and table output.

mod cli;
pub mod commands;
mod config;
pub mod output;

pub use cli::{Cli, Commands};
pub use config::Config;
