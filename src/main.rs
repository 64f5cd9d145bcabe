use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use llama_launch::cli::{Cli, Commands};
use llama_launch::error::{LaunchError, EXIT_FAILURE};
use llama_launch::logging;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // Initialize logging
    let filter = logging::filter_directive(
        std::env::var("RUST_LOG").ok(),
        std::env::var("LOG_LEVEL").ok(),
    );
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(filter))
        .with(cli.json.then(|| tracing_subscriber::fmt::layer().json()))
        .with((!cli.json).then(tracing_subscriber::fmt::layer))
        .init();

    let command = match cli.into_command() {
        Ok(command) => command,
        Err(err) => err.exit(),
    };
    let result = match command {
        Commands::Launch(args) => llama_launch::cli::launch(args).await,
        Commands::List {
            verbose,
            model_prefix,
        } => llama_launch::cli::list(verbose, model_prefix).await,
        Commands::InitConfig {
            output,
            force,
            profile,
        } => llama_launch::cli::init_config(output, force, profile).await,
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("Error: {err:#}");
            let code = err
                .downcast_ref::<LaunchError>()
                .map(LaunchError::exit_code)
                .unwrap_or(EXIT_FAILURE);
            ExitCode::from(code)
        }
    }
}
