//! Command-line interface for waymark.
//!
//! This module provides the CLI structure and command handlers for the
//! `waymark` binary.

mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

pub use commands::{
    AddCommand, ClearCommand, ConfigCommand, CopyCommand, ListCommand, OutputFormat,
    RemoveCommand, RenameCommand, StatusCommand,
};

/// waymark - Capture, name, and keep GPS locations
///
/// Grabs the current position from the location sensor, labels it with a
/// name you choose, and keeps the list on disk across runs.
#[derive(Debug, Parser)]
#[command(name = "waymark")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to custom configuration file
    #[arg(short, long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Increase verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// The command to execute
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Capture the current position and save it under a name
    Add(AddCommand),

    /// List saved locations
    List(ListCommand),

    /// Rename a saved location
    Rename(RenameCommand),

    /// Delete a saved location
    Remove(RemoveCommand),

    /// Delete all saved locations
    Clear(ClearCommand),

    /// Copy a saved location's coordinates to the clipboard
    Copy(CopyCommand),

    /// Show ledger and sensor status
    Status(StatusCommand),

    /// View or validate configuration
    #[command(subcommand)]
    Config(ConfigCommand),
}

impl Cli {
    /// Get the verbosity level based on flags.
    #[must_use]
    pub fn verbosity(&self) -> crate::logging::Verbosity {
        if self.quiet {
            crate::logging::Verbosity::Quiet
        } else {
            match self.verbose {
                0 => crate::logging::Verbosity::Normal,
                1 => crate::logging::Verbosity::Verbose,
                _ => crate::logging::Verbosity::Trace,
            }
        }
    }
}
