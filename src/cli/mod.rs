//! CLI module for inventory - command-line interface and subcommands.
//!
//! Provides the main entry point with subcommands for category and product
//! management.

pub mod commands;

pub use commands::Cli;
