use clap::Parser;
use sharelm_gateway::cli::{self, Cli, Command};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = cli.load_config()?;

    match cli.command {
        Command::Serve => cli::serve::run(config).await,
        Command::AddKey(args) => cli::add_key::run(config, args).await,
    }
}
