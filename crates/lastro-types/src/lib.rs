//! Core types and structures for lastro
//!
//! This crate provides the wire types exchanged with the archive backend and
//! the message types kept in a search session.

use serde::{Deserialize, Deserializer, Serialize};

pub mod message;

pub use message::{ChatMessage, MessageId, MessageInput};

// ============================================================================
// Constants
// ============================================================================

/// Maximum number of messages kept in a session log
pub const MAX_MESSAGES: usize = 25;

/// Number of previous exchanges sent back to the query service as context
pub const HISTORY_SIZE: usize = 1;

/// How many random projects seed a "start exploring" feed
pub const RANDOM_PROJECTS_COUNT: usize = 100;

/// How many random projects are shown next to a single project
pub const PROJECT_RANDOM_COUNT: usize = 50;

/// Prompt recorded for the "start exploring" feed
pub const START_EXPLORING_PROMPT: &str = "começar a explorar";

/// Titles used for the "start exploring" result group, one picked at random
pub const START_EXPLORING_DESCRIPTIONS: [&str; 3] = [
    "Um ponto de partida",
    "Apenas o começo",
    "Vai um empurrão?",
];

// ============================================================================
// Serde helpers
// ============================================================================

/// Deserialize a text field that the backend may send as a string, a number
/// or null. Numbers keep their textual form, null and other values become "".
pub fn deserialize_string_or_null<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::String(s) => Ok(s),
        serde_json::Value::Number(n) => Ok(n.to_string()),
        serde_json::Value::Bool(b) => Ok(b.to_string()),
        _ => Ok(String::new()),
    }
}

// ============================================================================
// Archive Types
// ============================================================================

/// A single archived video record
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    #[serde(deserialize_with = "deserialize_string_or_null", default)]
    pub id: String,
    #[serde(deserialize_with = "deserialize_string_or_null", default)]
    pub title: String,
    #[serde(deserialize_with = "deserialize_string_or_null", default)]
    pub author: String,
    #[serde(deserialize_with = "deserialize_string_or_null", default)]
    pub category: String,
    #[serde(deserialize_with = "deserialize_string_or_null", default)]
    pub link: String,
    #[serde(deserialize_with = "deserialize_string_or_null", default)]
    pub date: String,
    #[serde(deserialize_with = "deserialize_string_or_null", default)]
    pub direction: String,
    #[serde(deserialize_with = "deserialize_string_or_null", default)]
    pub sound: String,
    #[serde(deserialize_with = "deserialize_string_or_null", default)]
    pub production: String,
    #[serde(deserialize_with = "deserialize_string_or_null", default)]
    pub support: String,
    #[serde(deserialize_with = "deserialize_string_or_null", default)]
    pub assistance: String,
    #[serde(deserialize_with = "deserialize_string_or_null", default)]
    pub research: String,
    #[serde(deserialize_with = "deserialize_string_or_null", default)]
    pub location: String,
    #[serde(deserialize_with = "deserialize_string_or_null", default)]
    pub instruments: String,
    #[serde(deserialize_with = "deserialize_string_or_null", default)]
    pub keywords: String,
    #[serde(deserialize_with = "deserialize_string_or_null", default)]
    pub info_pool: String,
    #[serde(
        rename = "created_at",
        deserialize_with = "deserialize_string_or_null",
        default
    )]
    pub created_at: String,
}

impl Project {
    /// Credits that are actually filled in, labelled the way the archive
    /// presents them.
    pub fn credits(&self) -> Vec<(&'static str, &str)> {
        [
            ("Realização", self.direction.as_str()),
            ("Som", self.sound.as_str()),
            ("Produção", self.production.as_str()),
            ("Apoio", self.support.as_str()),
            ("Assistência", self.assistance.as_str()),
            ("Pesquisa", self.research.as_str()),
        ]
        .into_iter()
        .filter(|(_, value)| !value.trim().is_empty())
        .collect()
    }

    /// Comma separated keywords, trimmed, empties dropped
    pub fn keyword_list(&self) -> Vec<&str> {
        self.keywords
            .split(',')
            .map(str::trim)
            .filter(|k| !k.is_empty())
            .collect()
    }

    /// Year part of the publication date, if the date is filled in
    pub fn year(&self) -> Option<&str> {
        let year = self.date.get(..4)?;
        year.chars().all(|c| c.is_ascii_digit()).then_some(year)
    }
}

/// A named group of related projects shown alongside a project
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Suggestion {
    #[serde(deserialize_with = "deserialize_string_or_null", default)]
    pub description: String,
    #[serde(default)]
    pub projects: Vec<Project>,
}

/// Weak reference to the project that scoped a query
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContextProject {
    #[serde(deserialize_with = "deserialize_string_or_null", default)]
    pub id: String,
    #[serde(deserialize_with = "deserialize_string_or_null", default)]
    pub title: String,
    #[serde(deserialize_with = "deserialize_string_or_null", default)]
    pub author: String,
}

impl From<&Project> for ContextProject {
    fn from(project: &Project) -> Self {
        Self {
            id: project.id.clone(),
            title: project.title.clone(),
            author: project.author.clone(),
        }
    }
}

// ============================================================================
// Query Types
// ============================================================================

/// Body of `POST /query`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryRequest {
    pub cookie_consent: bool,
    pub user_ip: String,
    pub previous_queries: Vec<String>,
    pub current_prompt: String,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub current_project_id: Option<String>,
}

/// Response of `POST /query`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryResponse {
    #[serde(default)]
    pub queries: Vec<String>,
    #[serde(default)]
    pub descriptions: Vec<String>,
    #[serde(default)]
    pub results: Vec<Vec<Project>>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub context_project: Option<ContextProject>,
}

impl QueryResponse {
    /// Whether every present field has one entry per result group
    pub fn is_aligned(&self) -> bool {
        let groups = self.results.len();
        (self.queries.is_empty() || self.queries.len() == groups)
            && (self.descriptions.is_empty() || self.descriptions.len() == groups)
    }
}
