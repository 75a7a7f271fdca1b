use anyhow::{Context, Result};
use chrono::{DateTime, Duration, Utc};
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use lastro_logging::get_lastro_dir;

/// How long a consent decision is remembered
pub const CONSENT_DAYS: i64 = 365;

/// A stored data consent decision
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConsentRecord {
    pub accepted: bool,
    pub decided_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl ConsentRecord {
    pub fn new(accepted: bool, now: DateTime<Utc>) -> Self {
        Self {
            accepted,
            decided_at: now,
            expires_at: now + Duration::days(CONSENT_DAYS),
        }
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }
}

/// Consent decision persisted as JSON on disk
#[derive(Debug, Clone)]
pub struct ConsentStore {
    path: PathBuf,
}

impl ConsentStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Store under ~/.lastro/consent.json
    pub fn default_location() -> Result<Self> {
        Ok(Self::new(get_lastro_dir()?.join("consent.json")))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Current decision, or `None` when the visitor has not decided yet
    pub fn load(&self) -> Result<Option<ConsentRecord>> {
        self.load_at(Utc::now())
    }

    pub fn load_at(&self, now: DateTime<Utc>) -> Result<Option<ConsentRecord>> {
        if !self.path.exists() {
            return Ok(None);
        }

        let content = fs::read_to_string(&self.path)
            .with_context(|| format!("Failed to read consent file {}", self.path.display()))?;

        let record: ConsentRecord = match serde_json::from_str(&content) {
            Ok(record) => record,
            Err(e) => {
                warn!("Ignoring unreadable consent file {}: {}", self.path.display(), e);
                return Ok(None);
            }
        };

        if record.is_expired(now) {
            debug!("Consent decision from {} has expired", record.decided_at);
            return Ok(None);
        }

        Ok(Some(record))
    }

    pub fn save(&self, accepted: bool) -> Result<ConsentRecord> {
        self.save_at(accepted, Utc::now())
    }

    pub fn save_at(&self, accepted: bool, now: DateTime<Utc>) -> Result<ConsentRecord> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }

        let record = ConsentRecord::new(accepted, now);
        let json = serde_json::to_string_pretty(&record)?;
        fs::write(&self.path, json)
            .with_context(|| format!("Failed to write consent file {}", self.path.display()))?;

        Ok(record)
    }
}
