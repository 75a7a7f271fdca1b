use serde::{Deserialize, Serialize};

use crate::{ContextProject, Project, QueryResponse};

/// Sequential identity of a message within one session
pub type MessageId = u64;

/// One prompt/response exchange in a session
///
/// A message without result groups is a failure placeholder: the request
/// behind it never produced an answer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatMessage {
    pub id: MessageId,
    pub prompt: String,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub queries: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub descriptions: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub results: Option<Vec<Vec<Project>>>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub context_project: Option<ContextProject>,
}

impl ChatMessage {
    /// True when there is at least one result group to show
    pub fn has_results(&self) -> bool {
        self.results.as_ref().is_some_and(|groups| !groups.is_empty())
    }

    pub fn is_error_placeholder(&self) -> bool {
        !self.has_results()
    }

    /// One-based number shown in the search header
    pub fn search_number(&self) -> u64 {
        self.id + 1
    }

    /// Number of projects across every result group
    pub fn total_results(&self) -> usize {
        self.results
            .as_ref()
            .map(|groups| groups.iter().map(Vec::len).sum())
            .unwrap_or(0)
    }

    /// First derived query, or "" when the exchange has none.
    /// This is what gets sent back as conversational context.
    pub fn primary_query(&self) -> &str {
        self.queries
            .as_ref()
            .and_then(|queries| queries.first())
            .map(String::as_str)
            .unwrap_or("")
    }

    /// Title of result group `index`: its description, else its query, else
    /// the prompt.
    pub fn group_title(&self, index: usize) -> &str {
        non_empty_at(&self.descriptions, index)
            .or_else(|| non_empty_at(&self.queries, index))
            .unwrap_or(self.prompt.as_str())
    }

    /// Non-empty result groups with their titles, in response order
    pub fn groups(&self) -> Vec<(&str, &[Project])> {
        self.results
            .iter()
            .flatten()
            .enumerate()
            .filter(|(_, projects)| !projects.is_empty())
            .map(|(index, projects)| (self.group_title(index), projects.as_slice()))
            .collect()
    }
}

fn non_empty_at(field: &Option<Vec<String>>, index: usize) -> Option<&str> {
    field
        .as_ref()
        .and_then(|values| values.get(index))
        .map(String::as_str)
        .filter(|value| !value.is_empty())
}

/// Everything a caller provides when recording an exchange. The identity is
/// assigned by the session.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MessageInput {
    pub prompt: String,
    pub queries: Option<Vec<String>>,
    pub descriptions: Option<Vec<String>>,
    pub results: Option<Vec<Vec<Project>>>,
    pub context_project: Option<ContextProject>,
}

impl MessageInput {
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            ..Default::default()
        }
    }

    /// Placeholder for a request that failed: only the prompt survives
    pub fn failed(prompt: impl Into<String>) -> Self {
        Self::new(prompt)
    }

    pub fn from_response(prompt: impl Into<String>, response: QueryResponse) -> Self {
        Self {
            prompt: prompt.into(),
            queries: Some(response.queries),
            descriptions: Some(response.descriptions),
            results: Some(response.results),
            context_project: response.context_project,
        }
    }

    pub fn with_descriptions(mut self, descriptions: Vec<String>) -> Self {
        self.descriptions = Some(descriptions);
        self
    }

    pub fn with_results(mut self, results: Vec<Vec<Project>>) -> Self {
        self.results = Some(results);
        self
    }

    pub fn into_message(self, id: MessageId) -> ChatMessage {
        ChatMessage {
            id,
            prompt: self.prompt,
            queries: self.queries,
            descriptions: self.descriptions,
            results: self.results,
            context_project: self.context_project,
        }
    }
}
