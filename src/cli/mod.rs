//! CLI module for scenegen - command-line interface and subcommands.

pub mod commands;

pub use commands::Cli;
