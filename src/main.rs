//! Moldflow CLI entry point.

use clap::Parser;

use moldflow::cli::{commands, handle_error, Cli, Commands};
use moldflow::infrastructure::{init_logging, ConfigLoader};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let result = run(&cli).await;
    if let Err(err) = result {
        handle_error(err, cli.json);
    }
}

async fn run(cli: &Cli) -> anyhow::Result<()> {
    let config = match &cli.config {
        Some(path) => ConfigLoader::load_from_file(path)?,
        None => ConfigLoader::load()?,
    };
    init_logging(&config.logging)?;

    let ctx = commands::AppContext::init(&config).await?;

    match &cli.command {
        Commands::Request(args) => {
            let actor = cli.acting_identity()?;
            commands::execute_request(&ctx, &actor, args.command.clone(), cli.json).await
        }
        Commands::Liability(args) => {
            let actor = cli.acting_identity()?;
            commands::execute_liability(&ctx, &actor, args.command.clone(), cli.json).await
        }
        Commands::History(args) => {
            commands::execute_history(&ctx, commands::HistoryArgs { id: args.id }, cli.json).await
        }
        Commands::Notifications(args) => {
            commands::execute_notifications(&ctx, args.command.clone(), cli.json).await
        }
    }
}
