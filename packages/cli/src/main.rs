mod commands;
mod rules;

use clap::{Parser, Subcommand};
use commands::{transform, TransformArgs};

/// Markweave CLI - rule-driven markup transformation
#[derive(Parser, Debug)]
#[command(name = "markweave")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Transform a markup file through the built-in rule set
    Transform(TransformArgs),
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    match cli.command {
        Command::Transform(args) => transform(args).await,
    }
}
