// src/commands/mod.rs
//! Command handlers for the packset CLI

mod show;
mod status;
mod switch;

use crate::cli::Cli;
use anyhow::Result;
use clap::CommandFactory;
use clap_complete::Shell;

pub use show::cmd_show;
pub use status::cmd_status;
pub use switch::{cmd_plan, cmd_set};

/// Print shell completions to stdout
pub fn cmd_completions(shell: Shell) -> Result<()> {
    let mut cmd = Cli::command();
    clap_complete::generate(shell, &mut cmd, "packset", &mut std::io::stdout());
    Ok(())
}
