use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use clap_complete::Shell;
use std::path::PathBuf;

use lastro_api::ArchiveService;
use lastro_types::Project;

use crate::app::render;

/// CLI arguments for lastro
#[derive(Parser, Debug)]
#[command(name = "lastro")]
#[command(about = "Lastro - natural language search over an archive of music heritage videos")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Generate shell completions
    #[arg(long, value_enum)]
    pub generate: Option<Shell>,

    /// Submit a single prompt, print the answer and exit
    #[arg(long, short = 'q', value_name = "TEXT")]
    pub query: Option<String>,

    /// Pretty-print the JSON output (only useful with --query and subcommands)
    #[arg(long)]
    pub pretty: bool,

    /// Base URL of the archive backend (e.g., http://127.0.0.1:5000)
    #[arg(long, value_name = "URL", env = "LASTRO_API_URL")]
    pub api_url: Option<String>,

    /// Service used to look up the public IP once consent is given
    #[arg(long, value_name = "URL", env = "LASTRO_IP_LOOKUP_URL")]
    pub ip_lookup_url: Option<String>,

    /// Use this IP instead of looking it up
    #[arg(long, value_name = "IP", env = "LASTRO_USER_IP")]
    pub user_ip: Option<String>,

    /// Request timeout in seconds
    #[arg(long, value_name = "SECS", env = "LASTRO_TIMEOUT_SECS")]
    pub timeout: Option<u64>,

    /// Record a data consent decision before starting
    #[arg(long, value_enum)]
    pub consent: Option<ConsentChoice>,

    /// Where the consent decision is stored (default: ~/.lastro/consent.json)
    #[arg(long, value_name = "PATH", env = "LASTRO_CONSENT_FILE")]
    pub consent_file: Option<PathBuf>,

    /// Write a JSONL transcript of the session
    #[arg(long)]
    pub transcript: bool,

    /// Directory for transcripts (default: ~/.lastro/logs)
    #[arg(long, value_name = "DIR", env = "LASTRO_LOG_DIR")]
    pub log_dir: Option<PathBuf>,

    /// Enable verbose debug output (shows HTTP requests, responses, headers, etc.)
    #[arg(long, short = 'v')]
    pub verbose: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ConsentChoice {
    Accept,
    Reject,
}

impl ConsentChoice {
    pub fn accepted(self) -> bool {
        matches!(self, ConsentChoice::Accept)
    }
}

/// One-off archive lookups that do not need a session
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// List every project in the archive
    Projects,
    /// Show one project with its details
    Project {
        /// Project id, or a /projetos/<id> link
        id: String,
    },
    /// Show the suggestion groups of a project
    Suggestions {
        /// Project id, or a /projetos/<id> link
        id: String,
    },
    /// Pick random projects
    Random {
        /// How many projects to pick
        #[arg(default_value = "10")]
        count: usize,
    },
}

impl Commands {
    /// Run the lookup and return what should be printed
    pub async fn execute<S: ArchiveService>(&self, service: &S, pretty: bool) -> Result<String> {
        match self {
            Commands::Projects => {
                let projects = service.projects().await?;
                format_projects(&projects, pretty)
            }
            Commands::Project { id } => {
                let project = service.project(&render::project_id_or_raw(id)).await?;
                if pretty {
                    Ok(serde_json::to_string_pretty(&project)?)
                } else {
                    Ok(render::project_details(&project))
                }
            }
            Commands::Suggestions { id } => {
                let suggestions = service.suggestions(&render::project_id_or_raw(id)).await?;
                if pretty {
                    Ok(serde_json::to_string_pretty(&suggestions)?)
                } else {
                    Ok(render::suggestions(&suggestions))
                }
            }
            Commands::Random { count } => {
                let projects = service.random_projects(*count).await?;
                format_projects(&projects, pretty)
            }
        }
    }
}

fn format_projects(projects: &[Project], pretty: bool) -> Result<String> {
    if pretty {
        Ok(serde_json::to_string_pretty(projects)?)
    } else {
        Ok(render::project_list(projects))
    }
}
