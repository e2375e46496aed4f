//! Command-line surface of the Helpix matching engine.
//!
//! The main entry point is [`run`], which parses the command line, loads
//! `~/.helpix/config.toml`, opens the JSON store and executes one command.
//! `helpix serve` keeps the periodic scheduler running until Ctrl-C.

mod app;
pub mod cli;
mod commands;
pub mod config;

pub use app::run;
pub use cli::{Cli, Commands, OutputFormat};
pub use config::{load_config, Config, ConfigError};
