//! Command-line arguments.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Inspect how ndcb sees a site's sources
#[derive(Parser, Debug)]
#[command(name = "ndcb")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Site configuration file [default: ./ndcb.toml]
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// List every source file that survives exclusion
    Files {
        /// Output as JSON for scripting
        #[arg(long)]
        json: bool,
    },

    /// Show which source serves a URL path, and where it is written
    Resolve {
        /// URL path, e.g. /blog/hello/
        url: String,
    },

    /// Show the 404 page that would answer a missing URL path
    NotFound {
        url: String,
    },

    /// List a source directory across all roots
    Ls {
        #[arg(default_value = "")]
        pathname: String,
    },

    /// Print a source file
    Cat {
        pathname: String,
    },
}
