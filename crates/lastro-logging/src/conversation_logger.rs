use anyhow::Result;
use chrono::Local;
use serde::Serialize;
use std::path::{Path, PathBuf};
use tokio::fs::{self, OpenOptions};
use tokio::io::AsyncWriteExt;
use uuid::Uuid;

use lastro_types::ChatMessage;

#[derive(Serialize)]
struct LogEntry<'a> {
    timestamp: String, // ISO‑8601 Local time
    session_id: String,
    kind: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    message_id: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    prompt: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    queries: Option<&'a [String]>,
    #[serde(skip_serializing_if = "Option::is_none")]
    total_results: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    project_id: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    detail: Option<&'a str>,
}

/// Append-only JSONL transcript of one search session
pub struct ConversationLogger {
    session_id: Uuid,
    file_path: PathBuf,
    file: Option<tokio::fs::File>,
}

impl ConversationLogger {
    /// Create a new logger; generates the file name based on the current local time.
    pub async fn new(logs_dir: &Path) -> Result<Self> {
        fs::create_dir_all(logs_dir).await?;

        let session_id = Uuid::new_v4();
        let now_local = Local::now();
        let filename = format!(
            "lastro-{}-{}.jsonl",
            now_local.format("%Y-%m-%d-%H%M%S"),
            &session_id.simple().to_string()[..8]
        );
        let file_path = logs_dir.join(filename);
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&file_path)
            .await?;
        Ok(Self { session_id, file_path, file: Some(file) })
    }

    pub fn session_id(&self) -> Uuid {
        self.session_id
    }

    pub fn file_path(&self) -> &Path {
        &self.file_path
    }

    /// Record an exchange as it was appended to the session log
    pub async fn log_exchange(&mut self, message: &ChatMessage) {
        let kind = if message.is_error_placeholder() { "failed" } else { "answered" };
        let entry = LogEntry {
            timestamp: Local::now().to_rfc3339(),
            session_id: self.session_id.to_string(),
            kind,
            message_id: Some(message.id),
            prompt: Some(&message.prompt),
            queries: message.queries.as_deref(),
            total_results: Some(message.total_results()),
            project_id: message.context_project.as_ref().map(|p| p.id.as_str()),
            detail: None,
        };
        self.write_entry(&entry).await;
    }

    /// Record a session-level event such as a cleared history or a project scope change
    pub async fn log_event(&mut self, kind: &str, project_id: Option<&str>, detail: Option<&str>) {
        let entry = LogEntry {
            timestamp: Local::now().to_rfc3339(),
            session_id: self.session_id.to_string(),
            kind,
            message_id: None,
            prompt: None,
            queries: None,
            total_results: None,
            project_id,
            detail,
        };
        self.write_entry(&entry).await;
    }

    async fn write_entry(&mut self, entry: &LogEntry<'_>) {
        if let Some(file) = &mut self.file {
            if let Ok(json) = serde_json::to_string(entry) {
                if let Err(e) = file.write_all(json.as_bytes()).await {
                    eprintln!("[Logging error] {}", e);
                } else if let Err(e) = file.write_all(b"\n").await {
                    eprintln!("[Logging error] {}", e);
                } else {
                    let _ = file.flush().await;
                }
            }
        }
    }

    /// Close the logger (explicit drop). Called on graceful shutdown.
    pub async fn shutdown(&mut self) {
        if let Some(file) = self.file.take() {
            let _ = file.sync_all().await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lastro_types::{MessageInput, Project};
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_transcript_lines_are_json() {
        let temp_dir = TempDir::new().unwrap();
        let mut logger = ConversationLogger::new(temp_dir.path()).await.unwrap();

        let answered = MessageInput::new("viola campaniça")
            .with_results(vec![vec![Project::default(), Project::default()]])
            .into_message(0);
        logger.log_exchange(&answered).await;
        logger.log_exchange(&MessageInput::failed("sem rede").into_message(1)).await;
        logger.log_event("cleared", None, Some("2 messages")).await;
        logger.shutdown().await;

        let content = std::fs::read_to_string(logger.file_path()).unwrap();
        let lines: Vec<serde_json::Value> = content
            .lines()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect();

        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0]["kind"], "answered");
        assert_eq!(lines[0]["total_results"], 2);
        assert_eq!(lines[1]["kind"], "failed");
        assert_eq!(lines[1]["message_id"], 1);
        assert_eq!(lines[2]["kind"], "cleared");
        assert!(lines[2].get("prompt").is_none());
        assert_eq!(lines[2]["session_id"], logger.session_id().to_string());
    }
}
