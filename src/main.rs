use clap::Parser;
use dutchbook::cli::{self, output, CheckCommand, Cli, Commands, RelationsCommand};

#[tokio::main]
async fn main() {
    let _ = dotenvy::dotenv();
    let cli = Cli::parse();

    let result = match &cli.command {
        Commands::Run(args) => cli::run::execute(args).await,
        Commands::Relations(RelationsCommand::List(args)) => cli::relations::list(args),
        Commands::Relations(RelationsCommand::Add(args)) => cli::relations::add(args).await,
        Commands::Check(CheckCommand::Config(args)) => cli::check::execute_config(&args.config),
    };

    if let Err(e) = result {
        output::error(&e.to_string());
        std::process::exit(1);
    }
}
