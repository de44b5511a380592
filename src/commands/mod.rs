pub mod bosses;
pub mod init;
pub mod run;

use anyhow::Result;
use clap::{Parser, Subcommand};

#[derive(Debug, Subcommand)]
enum Commands {
    #[command(about = "Configure API credentials and run defaults")]
    Init(init::InitArgs),
    #[command(about = "Aggregate deaths or damage taken per player over a date range")]
    Run(run::RunArgs),
    #[command(about = "List or extend the boss catalog", arg_required_else_help = true)]
    Bosses(bosses::BossesArgs),
}

#[derive(Debug, Parser)]
#[command(author, version, about, long_about = None)]
#[command(arg_required_else_help(true))]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,
}

impl Cli {
    pub async fn menu() -> Result<()> {
        let cli = Self::parse();
        match cli.command {
            Commands::Init(args) => init::cmd(args).await,
            Commands::Run(args) => run::cmd(args).await,
            Commands::Bosses(args) => bosses::cmd(args).await,
        }
    }
}
