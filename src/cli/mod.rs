//! Command-line interface components
//!
//! This module contains CLI-specific code for the OSM Power Fetcher application:
//! argument parsing and the command handlers.

pub mod args;
pub mod commands;

pub use args::{
    Cli, Commands, ConfigAction, ConfigArgs, DownloadArgs, ExtractArgs, GlobalArgs, ReconcileArgs,
};
pub use commands::{handle_config, handle_download, handle_extract, handle_reconcile};
