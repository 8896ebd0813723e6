//! attunectl - CLI client for the attune daemon

mod client;
mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "attunectl")]
#[command(about = "Talk to the attune emotion-adaptive assistant", long_about = None)]
#[command(version)]
struct Cli {
    /// Daemon base URL
    #[arg(long, global = true, default_value = client::DEFAULT_URL)]
    url: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Send a message and print the reply
    Say {
        /// Message text (words are joined with spaces)
        #[arg(required = true)]
        message: Vec<String>,
    },

    /// Rewrite a passage at a 6th-grade reading level
    Rewrite {
        /// Passage text (words are joined with spaces)
        #[arg(required = true)]
        text: Vec<String>,
    },

    /// Show daemon health
    Health,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let client = client::DaemonClient::new(&cli.url)?;

    match cli.command {
        Commands::Say { message } => commands::say(&client, &message.join(" ")).await,
        Commands::Rewrite { text } => commands::rewrite(&client, &text.join(" ")).await,
        Commands::Health => commands::health(&client).await,
    }
}
