pub mod commands;
pub mod config;
pub mod utils;

use clap::{Parser, Subcommand};
use serde::{Deserialize, Serialize};

#[derive(Parser)]
#[command(name = "console")]
#[command(about = "Admin console CLI - session management and entity editing against the remote API")]
#[command(version)]
pub struct Cli {
    #[arg(long, global = true, help = "Output in human-readable text format")]
    pub text: bool,

    #[arg(long, global = true, help = "Output in JSON format")]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "Session token management")]
    Session {
        #[command(subcommand)]
        cmd: commands::session::SessionCommands,
    },

    #[command(about = "Add and edit companies, locations, gateways and products")]
    Entity {
        #[command(subcommand)]
        cmd: commands::entity::EntityCommands,
    },

    #[command(about = "Inspect route guard decisions")]
    Guard {
        #[command(subcommand)]
        cmd: commands::guard::GuardCommands,
    },

    #[command(about = "Remote API selection")]
    Remote {
        #[command(subcommand)]
        cmd: commands::remote::RemoteCommands,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum OutputFormat {
    Text,
    Json,
}

impl OutputFormat {
    pub fn from_cli(cli: &Cli) -> Self {
        if cli.json {
            OutputFormat::Json
        } else {
            OutputFormat::Text
        }
    }
}

pub async fn run(cli: Cli) -> anyhow::Result<()> {
    let output_format = OutputFormat::from_cli(&cli);

    match cli.command {
        Commands::Session { cmd } => commands::session::handle(cmd, output_format).await,
        Commands::Entity { cmd } => commands::entity::handle(cmd, output_format).await,
        Commands::Guard { cmd } => commands::guard::handle(cmd, output_format).await,
        Commands::Remote { cmd } => commands::remote::handle(cmd, output_format).await,
    }
}
