//! Command-line interface for MERGE Fetcher

pub mod args;
pub mod commands;

pub use args::{Cli, Commands, ConfigArgs, DownloadArgs, GlobalArgs};
pub use commands::{handle_config, handle_download};
