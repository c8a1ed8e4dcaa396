pub mod commands;
pub mod utils;

use clap::{Parser, Subcommand};
use serde::{Deserialize, Serialize};

#[derive(Parser)]
#[command(name = "unconf")]
#[command(about = "unconf CLI - inspect the permission matrix and query the read API")]
#[command(version)]
pub struct Cli {
    #[arg(long, global = true, help = "Output in JSON format")]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "Print every role with its label and permissions")]
    Roles,

    #[command(about = "Check whether a role holds a permission")]
    Can {
        #[arg(help = "Role name, e.g. track_lead")]
        role: String,
        #[arg(help = "Permission name, e.g. manageTrackSessions")]
        permission: String,
    },

    #[command(about = "Generate a co-host invite token")]
    Token,

    #[command(about = "Query a running server's read API")]
    Get(commands::get::GetArgs),
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
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
        Commands::Roles => commands::roles::list(output_format),
        Commands::Can { role, permission } => commands::roles::can(&role, &permission, output_format),
        Commands::Token => commands::token::generate(output_format),
        Commands::Get(args) => commands::get::handle(args, output_format).await,
    }
}
