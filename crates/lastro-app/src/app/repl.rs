use anyhow::Result;
use colored::Colorize;
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;

use lastro_api::{ApiError, ArchiveClient};
use lastro_chat::{SearchController, SessionHandle, SkipReason, SubmitOutcome};
use lastro_logging::ConversationLogger;
use lastro_types::ChatMessage;

use crate::app::render;
use crate::app::setup::{open_transcript, resolve_visitor, AppConfig};
use crate::cli::{Cli, ConsentChoice};
use crate::config::{ConsentRecord, ConsentStore};

/// A line typed at the prompt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplCommand {
    Exit,
    Help,
    New,
    Explore,
    Project(String),
    Leave,
    History,
    Consent(Option<ConsentChoice>),
    Unknown(String),
    Prompt(String),
}

pub fn parse_command(line: &str) -> ReplCommand {
    let line = line.trim();
    if line == "exit" || line == "quit" {
        return ReplCommand::Exit;
    }

    // A pasted website path is a project reference
    if line.starts_with("/projetos/") {
        return ReplCommand::Project(line.to_string());
    }

    let Some(rest) = line.strip_prefix('/') else {
        return ReplCommand::Prompt(line.to_string());
    };

    let (name, arg) = match rest.split_once(char::is_whitespace) {
        Some((name, arg)) => (name, arg.trim()),
        None => (rest, ""),
    };

    match name {
        "help" => ReplCommand::Help,
        "new" => ReplCommand::New,
        "explore" => ReplCommand::Explore,
        "project" => ReplCommand::Project(arg.to_string()),
        "leave" => ReplCommand::Leave,
        "history" => ReplCommand::History,
        "consent" => ReplCommand::Consent(match arg {
            "accept" => Some(ConsentChoice::Accept),
            "reject" => Some(ConsentChoice::Reject),
            _ => None,
        }),
        _ => ReplCommand::Unknown(line.to_string()),
    }
}

fn print_help() {
    println!("{}", "Commands:".bright_cyan());
    println!("  <text>                  - Search the archive");
    println!("  /explore                - Start from a random selection of projects");
    println!("  /project <id|link>      - Open a project and ask questions about it");
    println!("  /leave                  - Stop asking about the current project");
    println!("  /history                - Show this session's searches");
    println!("  /new                    - Start a new exploration (clears the history)");
    println!("  /consent accept|reject  - Change the data consent decision");
    println!("  /help                   - Show this help");
    println!("  exit, quit              - Leave");
}

/// Map a yes/no answer to a decision. `None` when the question was
/// dismissed (Ctrl-C, EOF, empty line) or the answer is neither.
pub fn parse_answer(answer: Result<String, ReadlineError>) -> Option<bool> {
    let answer = answer.ok()?;
    match answer.trim().to_lowercase().as_str() {
        "s" | "sim" | "y" | "yes" => Some(true),
        "n" | "não" | "nao" | "no" => Some(false),
        _ => None,
    }
}

/// Ask a yes/no question; anything but an explicit yes is a no
fn confirm(rl: &mut DefaultEditor, question: &str) -> bool {
    let answer = rl.readline(&format!("{} {} ", question.bright_yellow(), "[s/N]".bright_black()));
    parse_answer(answer) == Some(true)
}

/// Save a consent decision. A failure is reported and leaves the session running.
pub fn store_consent(store: &ConsentStore, accepted: bool) -> Option<ConsentRecord> {
    match store.save(accepted) {
        Ok(record) => Some(record),
        Err(e) => {
            eprintln!("{} {:#}", "Error:".bright_red().bold(), e);
            None
        }
    }
}

/// The question is only needed when nothing is stored and no usable IP was given
pub fn should_ask_consent(stored: Option<&ConsentRecord>, user_ip: Option<&str>) -> bool {
    stored.is_none() && user_ip.is_none()
}

/// Ask for data consent. Nothing is stored unless the visitor answers.
fn ask_consent(rl: &mut DefaultEditor, store: &ConsentStore) -> Option<ConsentRecord> {
    println!(
        "{}",
        "O Lastro usa o seu endereço IP para distinguir visitantes e limitar pedidos.".bright_black()
    );
    let answer = rl.readline(&format!(
        "{} {} ",
        "Aceita a utilização destes dados?".bright_yellow(),
        "[s/n]".bright_black()
    ));

    match parse_answer(answer) {
        Some(accepted) => store_consent(store, accepted),
        None => {
            println!("{}", "Sem decisão. A pergunta volta na próxima sessão.".bright_black());
            None
        }
    }
}

async fn log_message(logger: &mut Option<ConversationLogger>, message: &ChatMessage) {
    if let Some(logger) = logger {
        logger.log_exchange(message).await;
    }
}

async fn log_event(logger: &mut Option<ConversationLogger>, kind: &str, project_id: Option<&str>, detail: Option<&str>) {
    if let Some(logger) = logger {
        logger.log_event(kind, project_id, detail).await;
    }
}

fn describe_error(error: &ApiError) -> String {
    match error {
        ApiError::RateLimited => "Demasiados pedidos. Aguarde um minuto e tente de novo.".to_string(),
        other => other.to_string(),
    }
}

/// Run interactive REPL mode
pub async fn run_repl_mode(cli: &Cli, app_config: AppConfig) -> Result<()> {
    println!("{}", "Lastro - pesquisa no arquivo".bright_cyan().bold());
    println!("{}", format!("Backend: {}", app_config.client_config.api_url).bright_black());
    if cli.verbose {
        println!("{}", format!("Consent file: {}", app_config.consent_store.path().display()).bright_black());
    }
    println!("{}", "Type /help for commands, 'exit' or 'quit' to leave\n".bright_black());

    let client = ArchiveClient::new(&app_config.client_config)?;
    let mut rl = DefaultEditor::new()?;

    let stored = match app_config.consent_store.load() {
        Ok(record) => record,
        Err(e) => {
            eprintln!("{} {:#}", "Error:".bright_red().bold(), e);
            None
        }
    };
    let consent = if should_ask_consent(stored.as_ref(), app_config.user_ip.as_deref()) {
        ask_consent(&mut rl, &app_config.consent_store)
    } else {
        stored
    };
    let visitor = resolve_visitor(
        app_config.user_ip.as_deref(),
        consent.as_ref(),
        &app_config.client_config,
    )
    .await;
    if visitor.user_ip().is_none() {
        println!(
            "{}",
            "Pesquisas desativadas sem consentimento. Use /consent accept para as ativar.".bright_yellow()
        );
    }

    let mut controller = SearchController::new(client, SessionHandle::new(), visitor);
    let mut logger = open_transcript(app_config.transcript_dir.as_deref()).await;

    loop {
        let scope = match controller.scope() {
            Some(project) => format!("[{}] ", project.title).bright_magenta().to_string(),
            None => String::new(),
        };
        let readline = rl.readline(&format!("{}{} ", scope, "lastro>".bright_green().bold()));

        match readline {
            Ok(line) => {
                let line = line.trim();

                if line.is_empty() {
                    continue;
                }

                let _ = rl.add_history_entry(line);

                match parse_command(line) {
                    ReplCommand::Exit => {
                        println!("{}", "Até breve!".bright_cyan());
                        break;
                    }
                    ReplCommand::Help => print_help(),
                    ReplCommand::Prompt(prompt) => {
                        println!("{}", "A pesquisar...".bright_black());
                        match controller.submit(&prompt).await {
                            SubmitOutcome::Answered(message) => {
                                log_message(&mut logger, &message).await;
                                println!("\n{}", render::message(&message));
                            }
                            SubmitOutcome::Failed { message, error } => {
                                log_message(&mut logger, &message).await;
                                println!("\n{}", render::message(&message));
                                eprintln!("{} {}", "Error:".bright_red().bold(), describe_error(&error));
                            }
                            SubmitOutcome::Skipped(SkipReason::MissingIdentity) => {
                                println!(
                                    "{}",
                                    "Sem consentimento não é possível pesquisar. Use /consent accept.".bright_yellow()
                                );
                            }
                            SubmitOutcome::Skipped(SkipReason::EmptyPrompt) => {}
                        }
                    }
                    ReplCommand::Explore => match controller.start_exploring().await {
                        Ok(message) => {
                            log_message(&mut logger, &message).await;
                            println!("\n{}", render::message(&message));
                        }
                        Err(e) => {
                            eprintln!("{} {}", "Error:".bright_red().bold(), describe_error(&e));
                        }
                    },
                    ReplCommand::Project(reference) => match render::parse_project_ref(&reference) {
                        Some(id) => match controller.enter_project(&id).await {
                            Ok(view) => {
                                log_event(&mut logger, "enter_project", Some(id.as_str()), Some(view.project.title.as_str())).await;
                                println!("\n{}", render::project_view(&view));
                            }
                            Err(e) if e.is_not_found() => {
                                eprintln!("{} Project {} not found", "❌".bright_red(), id);
                            }
                            Err(e) => {
                                eprintln!("{} {}", "Error:".bright_red().bold(), describe_error(&e));
                            }
                        },
                        None => {
                            eprintln!("{} Usage: /project <id|link>", "💡".bright_yellow());
                        }
                    },
                    ReplCommand::Leave => match controller.leave_project() {
                        Some(project) => {
                            log_event(&mut logger, "leave_project", Some(project.id.as_str()), None).await;
                            println!("{}", format!("Saiu de {}", project.title).bright_black());
                        }
                        None => println!("{}", "Nenhum projeto aberto.".bright_black()),
                    },
                    ReplCommand::History => {
                        let messages = controller.session().messages();
                        if messages.is_empty() {
                            println!("{}", "Escreva na barra de pesquisa para começar.".bright_black());
                        }
                        for message in &messages {
                            println!("{}", render::message(message));
                        }
                    }
                    ReplCommand::New => {
                        let count = controller.session().len();
                        if count == 0 {
                            controller.new_exploration();
                        } else if confirm(&mut rl, "Tem a certeza que deseja limpar todo o histórico de pesquisa?") {
                            controller.new_exploration();
                            let detail = format!("{} messages", count);
                            log_event(&mut logger, "cleared", None, Some(detail.as_str())).await;
                            println!("{}", "Histórico limpo.".bright_green());
                        } else {
                            controller.leave_project();
                        }
                    }
                    ReplCommand::Consent(Some(choice)) => {
                        let Some(record) = store_consent(&app_config.consent_store, choice.accepted()) else {
                            continue;
                        };
                        let visitor = resolve_visitor(
                            app_config.user_ip.as_deref(),
                            Some(&record),
                            &app_config.client_config,
                        )
                        .await;
                        controller.set_visitor(visitor);
                        log_event(&mut logger, "consent", None, Some(if record.accepted { "accepted" } else { "rejected" })).await;
                        println!("{}", format!("Consentimento guardado até {}", record.expires_at.format("%Y-%m-%d")).bright_green());
                    }
                    ReplCommand::Consent(None) => {
                        let status = match app_config.consent_store.load() {
                            Ok(Some(record)) if record.accepted => "aceite",
                            Ok(Some(_)) => "recusado",
                            Ok(None) => "por decidir",
                            Err(e) => {
                                eprintln!("{} {:#}", "Error:".bright_red().bold(), e);
                                continue;
                            }
                        };
                        println!("Consentimento: {}", status);
                        println!("{} Usage: /consent accept|reject", "💡".bright_yellow());
                    }
                    ReplCommand::Unknown(command) => {
                        eprintln!("{} Unknown command '{}'. Type /help for commands.", "❌".bright_red(), command);
                    }
                }
            }
            Err(ReadlineError::Interrupted) => {
                println!("{}", "^C".bright_black());
                continue;
            }
            Err(ReadlineError::Eof) => {
                println!("{}", "Até breve!".bright_cyan());
                break;
            }
            Err(err) => {
                eprintln!("{} {}", "Error:".bright_red().bold(), err);
                break;
            }
        }
    }

    // Graceful shutdown of logger (flush & close)
    if let Some(logger) = &mut logger {
        logger.shutdown().await;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    #[test]
    fn test_plain_text_is_a_prompt() {
        assert_eq!(parse_command("  cante alentejano "), ReplCommand::Prompt("cante alentejano".to_string()));
        assert_eq!(parse_command("quit"), ReplCommand::Exit);
    }

    #[test]
    fn test_slash_commands() {
        assert_eq!(parse_command("/new"), ReplCommand::New);
        assert_eq!(parse_command("/explore"), ReplCommand::Explore);
        assert_eq!(parse_command("/project  42 "), ReplCommand::Project("42".to_string()));
        assert_eq!(parse_command("/consent accept"), ReplCommand::Consent(Some(ConsentChoice::Accept)));
        assert_eq!(parse_command("/consent"), ReplCommand::Consent(None));
        assert_eq!(parse_command("/foo bar"), ReplCommand::Unknown("/foo bar".to_string()));
    }

    #[test]
    fn test_explicit_answers_decide() {
        assert_eq!(parse_answer(Ok(" Sim ".to_string())), Some(true));
        assert_eq!(parse_answer(Ok("y".to_string())), Some(true));
        assert_eq!(parse_answer(Ok("não".to_string())), Some(false));
        assert_eq!(parse_answer(Ok("N".to_string())), Some(false));
    }

    #[test]
    fn test_dismissed_question_stays_undecided() {
        assert_eq!(parse_answer(Err(ReadlineError::Interrupted)), None);
        assert_eq!(parse_answer(Err(ReadlineError::Eof)), None);
        assert_eq!(parse_answer(Ok(String::new())), None);
        assert_eq!(parse_answer(Ok("talvez".to_string())), None);
    }

    #[test]
    fn test_failed_consent_write_is_not_fatal() {
        let dir = TempDir::new().unwrap();
        let blocker = dir.path().join("not-a-dir");
        std::fs::write(&blocker, "x").unwrap();
        let store = ConsentStore::new(blocker.join("consent.json"));

        assert_eq!(store_consent(&store, true), None);
        assert!(store.load().is_ok_and(|record| record.is_none()));
    }

    #[test]
    fn test_consent_decision_is_stored() {
        let dir = TempDir::new().unwrap();
        let store = ConsentStore::new(dir.path().join("consent.json"));

        let record = store_consent(&store, false).unwrap();

        assert!(!record.accepted);
        assert_eq!(store.load().unwrap(), Some(record));
    }

    #[test]
    fn test_blank_user_ip_still_asks_for_consent() {
        let dir = TempDir::new().unwrap();
        let consent_arg = dir.path().join("consent.json").to_string_lossy().to_string();
        let cli = Cli::parse_from(["lastro", "--user-ip", " ", "--consent-file", consent_arg.as_str()]);
        let config = crate::app::setup_from_cli(&cli).unwrap();

        assert!(should_ask_consent(None, config.user_ip.as_deref()));
        assert!(!should_ask_consent(None, Some("198.51.100.4")));

        let stored = ConsentRecord::new(false, chrono::Utc::now());
        assert!(!should_ask_consent(Some(&stored), None));
    }

    #[test]
    fn test_pasted_project_path() {
        let command = parse_command("/projetos/1434903174");
        assert_eq!(command, ReplCommand::Project("/projetos/1434903174".to_string()));
        if let ReplCommand::Project(reference) = command {
            assert_eq!(render::parse_project_ref(&reference), Some("1434903174".to_string()));
        }
    }
}
