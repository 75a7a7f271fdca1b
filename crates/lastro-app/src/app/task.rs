use anyhow::{anyhow, bail, Result};
use colored::Colorize;

use lastro_api::ArchiveClient;
use lastro_chat::{SearchController, SessionHandle, SkipReason, SubmitOutcome};

use crate::app::render;
use crate::app::setup::{open_transcript, resolve_visitor, AppConfig};
use crate::cli::{Cli, Commands};

/// Run in query mode - submit a single prompt and exit
pub async fn run_query_mode(cli: &Cli, prompt: String, app_config: AppConfig) -> Result<()> {
    let client = ArchiveClient::new(&app_config.client_config)?;
    let consent = app_config.consent_store.load()?;
    let visitor = resolve_visitor(
        app_config.user_ip.as_deref(),
        consent.as_ref(),
        &app_config.client_config,
    )
    .await;

    let controller = SearchController::new(client, SessionHandle::new(), visitor);
    let mut logger = open_transcript(app_config.transcript_dir.as_deref()).await;

    let outcome = controller.submit(&prompt).await;

    if let (Some(logger), Some(message)) = (&mut logger, outcome.message()) {
        logger.log_exchange(message).await;
    }
    if let Some(logger) = &mut logger {
        logger.shutdown().await;
    }

    match outcome {
        SubmitOutcome::Answered(message) => {
            if cli.pretty {
                println!("{}", serde_json::to_string_pretty(&message)?);
            } else {
                print!("{}", render::message(&message));
            }
            Ok(())
        }
        SubmitOutcome::Failed { message, error } => {
            if !cli.pretty {
                print!("{}", render::message(&message));
            }
            Err(anyhow!(error))
        }
        SubmitOutcome::Skipped(SkipReason::EmptyPrompt) => bail!("The prompt is empty"),
        SubmitOutcome::Skipped(SkipReason::MissingIdentity) => bail!(
            "No visitor IP available. Accept data consent with --consent accept or pass --user-ip"
        ),
    }
}

/// Run a one-off archive lookup and print its result
pub async fn run_command(cli: &Cli, command: &Commands, app_config: &AppConfig) -> Result<()> {
    let client = ArchiveClient::new(&app_config.client_config)?;
    match command.execute(&client, cli.pretty).await {
        Ok(output) => {
            println!("{}", output);
            Ok(())
        }
        Err(e) => {
            eprintln!("{} {}", "Error:".bright_red().bold(), e);
            Err(e)
        }
    }
}
