//! CLI command definitions using clap.
//!
//! Defines the main CLI structure and subcommands:
//! - generate: run the full plan/synthesize/render/correct pipeline
//! - plan: run scene planning only and print the plan

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Scenegen - generate educational Manim animations from a topic
#[derive(Parser, Debug)]
#[command(name = "scenegen")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Optional config file path
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    /// Check if verbose mode is enabled
    pub fn is_verbose(&self) -> bool {
        self.verbose
    }
}

/// Main subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Generate an animation video for a topic
    Generate {
        /// Topic to explain, e.g. "pendulum motion"
        topic: String,

        /// Maximum correction cycles before giving up
        #[arg(short, long)]
        max_attempts: Option<u32>,
    },

    /// Plan the scenes for a topic without generating code
    Plan {
        /// Topic to plan scenes for
        topic: String,
    },
}
