// src/cli.rs
//! CLI definitions for packset
//!
//! The command implementations are in the `commands` module.

use clap::{Parser, Subcommand};
use clap_complete::Shell;
use packset::DEFAULT_LANG;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "packset")]
#[command(author, version)]
#[command(about = "Declarative feature switching for Minecraft resource packs", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Show categories, features and their current values
    Show {
        /// Pack directory or .zip file
        pack: PathBuf,

        /// Language code for display labels
        #[arg(short, long, env = "PACKSET_LANG", default_value = DEFAULT_LANG)]
        lang: String,
    },

    /// Check that every feature resolves to a legal state
    Status {
        /// Pack directory or .zip file
        pack: PathBuf,
    },

    /// Preview the renames needed to change a feature
    Plan {
        /// Pack directory or .zip file
        pack: PathBuf,

        /// Feature id
        feature: String,

        /// Target value (true/false, or a state name)
        value: String,
    },

    /// Change a feature
    Set {
        /// Pack directory or .zip file
        pack: PathBuf,

        /// Feature id
        feature: String,

        /// Target value (true/false, or a state name)
        value: String,

        /// Show what would be renamed without making changes
        #[arg(long)]
        dry_run: bool,
    },

    /// Generate shell completion scripts
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}
