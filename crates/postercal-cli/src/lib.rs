//! Command-line client for the poster calendar.
//!
//! This crate provides the `postercal` binary: the month view, event list and
//! detail views in the terminal, plus the `serve` command that runs the feed
//! proxy.

pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod feed;

pub use cli::Cli;
pub use error::{ClientError, ClientResult};
