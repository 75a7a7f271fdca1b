use anyhow::Result;
use clap::{CommandFactory, Parser};

use lastro::app::{init_logging, run_command, run_query_mode, run_repl_mode, setup_from_cli};
use lastro::Cli;

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from .env file if it exists
    dotenvy::dotenv().ok();

    // Parse CLI arguments
    let cli = Cli::parse();

    if let Some(shell) = cli.generate {
        let mut command = Cli::command();
        let name = command.get_name().to_string();
        clap_complete::generate(shell, &mut command, name, &mut std::io::stdout());
        return Ok(());
    }

    init_logging(cli.verbose);

    let app_config = setup_from_cli(&cli)?;

    // One-off archive lookups
    if let Some(command) = &cli.command {
        return run_command(&cli, command, &app_config).await;
    }

    // Handle query mode if requested
    if let Some(prompt) = cli.query.clone() {
        return run_query_mode(&cli, prompt, app_config).await;
    }

    run_repl_mode(&cli, app_config).await
}
