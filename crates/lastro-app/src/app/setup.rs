use anyhow::{bail, Result};
use log::{debug, warn, LevelFilter};
use std::path::{Path, PathBuf};
use std::time::Duration;

use lastro_api::{ClientConfig, PublicIpResolver, DEFAULT_API_URL};
use lastro_chat::VisitorIdentity;
use lastro_logging::{get_logs_dir, ConversationLogger};

use crate::cli::Cli;
use crate::config::{ConsentRecord, ConsentStore};

/// Application configuration derived from CLI arguments and environment
pub struct AppConfig {
    pub client_config: ClientConfig,
    pub consent_store: ConsentStore,
    /// IP given explicitly, bypassing the lookup
    pub user_ip: Option<String>,
    /// Set when a transcript should be written
    pub transcript_dir: Option<PathBuf>,
}

/// Route the `log` facade to stderr. `RUST_LOG` wins unless `--verbose` is given.
pub fn init_logging(verbose: bool) {
    let mut builder = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"));
    builder.format_timestamp(None);
    if verbose {
        builder.filter_level(LevelFilter::Debug);
    }
    let _ = builder.try_init();
}

/// Set up application configuration from CLI arguments
///
/// Precedence: CLI flags > LASTRO_* env (both resolved by clap) > defaults
pub fn setup_from_cli(cli: &Cli) -> Result<AppConfig> {
    let api_url = cli.api_url.as_deref().unwrap_or(DEFAULT_API_URL);
    let mut client_config = ClientConfig::new(api_url).with_verbose(cli.verbose);

    if let Some(url) = &cli.ip_lookup_url {
        client_config = client_config.with_ip_lookup_url(url);
    }

    if let Some(secs) = cli.timeout {
        if secs == 0 {
            bail!("--timeout must be at least one second");
        }
        client_config = client_config.with_timeout(Duration::from_secs(secs));
    }

    let consent_store = match &cli.consent_file {
        Some(path) => ConsentStore::new(path),
        None => ConsentStore::default_location()?,
    };

    if let Some(choice) = cli.consent {
        let record = consent_store.save(choice.accepted())?;
        debug!("Stored consent decision (accepted: {}) in {}", record.accepted, consent_store.path().display());
    }

    let transcript_dir = if cli.transcript {
        Some(match &cli.log_dir {
            Some(dir) => dir.clone(),
            None => get_logs_dir()?,
        })
    } else {
        None
    };

    debug!("Archive backend: {}", client_config.api_url);

    Ok(AppConfig {
        client_config,
        consent_store,
        user_ip: cli.user_ip.clone().filter(|ip| !ip.trim().is_empty()),
        transcript_dir,
    })
}

/// Work out who the visitor is. An explicit IP is used as is; otherwise the
/// public IP is only looked up once consent was given.
pub async fn resolve_visitor(
    user_ip: Option<&str>,
    consent: Option<&ConsentRecord>,
    client_config: &ClientConfig,
) -> VisitorIdentity {
    let accepted = consent.is_some_and(|record| record.accepted);

    if let Some(ip) = user_ip {
        return VisitorIdentity::new(accepted, Some(ip.to_string()));
    }

    if !accepted {
        return VisitorIdentity::new(false, None);
    }

    let lookup = match PublicIpResolver::new(client_config) {
        Ok(resolver) => resolver.resolve().await,
        Err(e) => Err(e),
    };

    match lookup {
        Ok(ip) => VisitorIdentity::new(true, Some(ip)),
        Err(e) => {
            warn!("Public IP lookup failed: {}", e);
            VisitorIdentity::new(true, None)
        }
    }
}

/// Open a transcript when one was requested. Failures only disable it.
pub async fn open_transcript(dir: Option<&Path>) -> Option<ConversationLogger> {
    let dir = dir?;
    match ConversationLogger::new(dir).await {
        Ok(logger) => {
            debug!("Writing transcript to {}", logger.file_path().display());
            Some(logger)
        }
        Err(e) => {
            eprintln!("Transcript disabled: {}", e);
            None
        }
    }
}
