//! CLI for the EthicCompanion service

pub mod serve;

use clap::{Parser, Subcommand};

/// EthicCompanion - moderated, retrieval-augmented LLM responses
#[derive(Parser)]
#[command(name = "ethic-companion")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Run the HTTP API server
    Serve,
}
