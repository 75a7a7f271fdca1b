use std::sync::Arc;

use log::{debug, error, warn};
use rand::seq::SliceRandom;

use lastro_api::{ApiError, ArchiveService};
use lastro_types::{
    ChatMessage, ContextProject, MessageId, MessageInput, Project, QueryRequest, Suggestion,
    HISTORY_SIZE, PROJECT_RANDOM_COUNT, RANDOM_PROJECTS_COUNT, START_EXPLORING_DESCRIPTIONS,
    START_EXPLORING_PROMPT,
};

use crate::handle::{LoadingGuard, SessionHandle};
use crate::session::PendingMessage;

/// Who is asking: the consent flag and the public IP the backend keys
/// visitors on. The IP is only known once consent was given.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VisitorIdentity {
    pub cookie_consent: bool,
    pub user_ip: Option<String>,
}

impl VisitorIdentity {
    pub fn new(cookie_consent: bool, user_ip: Option<String>) -> Self {
        Self {
            cookie_consent,
            user_ip: user_ip.filter(|ip| !ip.trim().is_empty()),
        }
    }

    pub fn anonymous() -> Self {
        Self::default()
    }

    pub fn user_ip(&self) -> Option<&str> {
        self.user_ip.as_deref()
    }
}

/// Why a prompt was not sent
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    EmptyPrompt,
    MissingIdentity,
}

/// What happened to a submitted prompt
#[derive(Debug)]
pub enum SubmitOutcome {
    /// The service answered and the answer was appended
    Answered(ChatMessage),
    /// The request failed and an error placeholder was appended
    Failed { message: ChatMessage, error: ApiError },
    /// Nothing was sent and the session is unchanged
    Skipped(SkipReason),
}

impl SubmitOutcome {
    /// The message appended to the session, if any
    pub fn message(&self) -> Option<&ChatMessage> {
        match self {
            SubmitOutcome::Answered(message) | SubmitOutcome::Failed { message, .. } => Some(message),
            SubmitOutcome::Skipped(_) => None,
        }
    }
}

/// A project together with what is shown around it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectView {
    pub project: Project,
    pub suggestions: Vec<Suggestion>,
    pub random: Vec<Project>,
}

/// A validated prompt whose identity is reserved and whose request is built,
/// waiting to be sent
///
/// Owns everything it needs, so it can be moved into a spawned task. The
/// session stays loading until it is sent or dropped.
#[derive(Debug)]
pub struct PreparedSubmission<S: ArchiveService> {
    service: Arc<S>,
    session: SessionHandle,
    pending: PendingMessage,
    request: QueryRequest,
    loading: LoadingGuard,
}

impl<S: ArchiveService> PreparedSubmission<S> {
    /// Identity the message will carry unless the session is cleared first
    pub fn id(&self) -> MessageId {
        self.pending.id()
    }

    pub fn request(&self) -> &QueryRequest {
        &self.request
    }

    /// Issue the request and record its outcome in the session
    pub async fn send(self) -> SubmitOutcome {
        let PreparedSubmission {
            service,
            session,
            pending,
            request,
            loading,
        } = self;
        let prompt = request.current_prompt.clone();

        let outcome = match service.query(&request).await {
            Ok(response) => {
                if !response.is_aligned() {
                    warn!(
                        "Misaligned response for '{}': {} queries, {} descriptions, {} result groups",
                        prompt,
                        response.queries.len(),
                        response.descriptions.len(),
                        response.results.len()
                    );
                }
                let message = session.complete(pending, MessageInput::from_response(prompt, response));
                debug!("Recorded answer #{} with {} results", message.id, message.total_results());
                SubmitOutcome::Answered(message)
            }
            Err(error) => {
                error!("Query '{}' failed: {}", prompt, error);
                let message = session.complete(pending, MessageInput::failed(prompt));
                SubmitOutcome::Failed { message, error }
            }
        };

        drop(loading);
        outcome
    }
}

/// Turns prompts into archive queries and records the results in a session
pub struct SearchController<S: ArchiveService> {
    service: Arc<S>,
    session: SessionHandle,
    visitor: VisitorIdentity,
    scope: Option<ContextProject>,
}

impl<S: ArchiveService> SearchController<S> {
    pub fn new(service: S, session: SessionHandle, visitor: VisitorIdentity) -> Self {
        Self::with_shared(Arc::new(service), session, visitor)
    }

    pub fn with_shared(service: Arc<S>, session: SessionHandle, visitor: VisitorIdentity) -> Self {
        Self {
            service,
            session,
            visitor,
            scope: None,
        }
    }

    pub fn session(&self) -> &SessionHandle {
        &self.session
    }

    pub fn service(&self) -> &S {
        &self.service
    }

    pub fn visitor(&self) -> &VisitorIdentity {
        &self.visitor
    }

    pub fn set_visitor(&mut self, visitor: VisitorIdentity) {
        self.visitor = visitor;
    }

    /// Project that scopes new queries, if any
    pub fn scope(&self) -> Option<&ContextProject> {
        self.scope.as_ref()
    }

    /// Validate a prompt, reserve its identity and build its request
    ///
    /// Returns `None` without touching the session when the prompt is blank
    /// or the visitor has no IP.
    pub fn prepare(&self, prompt: &str) -> Option<PreparedSubmission<S>> {
        self.try_prepare(prompt).ok()
    }

    fn try_prepare(&self, prompt: &str) -> Result<PreparedSubmission<S>, SkipReason> {
        let prompt = prompt.trim();
        if prompt.is_empty() {
            debug!("Ignoring empty prompt");
            return Err(SkipReason::EmptyPrompt);
        }

        let Some(user_ip) = self.visitor.user_ip() else {
            debug!("Ignoring prompt without a visitor IP");
            return Err(SkipReason::MissingIdentity);
        };

        let loading = self.session.start_loading();
        let request = QueryRequest {
            cookie_consent: self.visitor.cookie_consent,
            user_ip: user_ip.to_string(),
            previous_queries: self.session.recent_queries(HISTORY_SIZE),
            current_prompt: prompt.to_string(),
            current_project_id: self.scope.as_ref().map(|p| p.id.clone()),
        };
        let pending = self.session.reserve();
        debug!("Prepared prompt #{}: {}", pending.id(), prompt);

        Ok(PreparedSubmission {
            service: Arc::clone(&self.service),
            session: self.session.clone(),
            pending,
            request,
            loading,
        })
    }

    /// Send a prompt and wait for its outcome
    pub async fn submit(&self, prompt: &str) -> SubmitOutcome {
        match self.try_prepare(prompt) {
            Ok(prepared) => prepared.send().await,
            Err(reason) => SubmitOutcome::Skipped(reason),
        }
    }

    /// Seed the session with a random selection of projects
    pub async fn start_exploring(&self) -> Result<ChatMessage, ApiError> {
        let _loading = self.session.start_loading();
        let projects = self.service.random_projects(RANDOM_PROJECTS_COUNT).await?;

        let description = START_EXPLORING_DESCRIPTIONS
            .choose(&mut rand::thread_rng())
            .copied()
            .unwrap_or(START_EXPLORING_DESCRIPTIONS[0]);
        let input = MessageInput::new(START_EXPLORING_PROMPT)
            .with_descriptions(vec![description.to_string()])
            .with_results(vec![projects]);

        Ok(self.session.push(input))
    }

    /// Load a project and scope later queries to it
    pub async fn enter_project(&mut self, id: &str) -> Result<ProjectView, ApiError> {
        let view = self.load_project(id).await?;
        debug!("Entering project {} ({})", view.project.id, view.project.title);
        self.scope = Some(ContextProject::from(&view.project));
        Ok(view)
    }

    /// Fetch a project with its suggestions and a random selection, without
    /// changing the scope
    pub async fn load_project(&self, id: &str) -> Result<ProjectView, ApiError> {
        let _loading = self.session.start_loading();
        let (project, suggestions, random) = tokio::try_join!(
            self.service.project(id),
            self.service.suggestions(id),
            self.service.random_projects(PROJECT_RANDOM_COUNT),
        )?;

        Ok(ProjectView {
            project,
            suggestions,
            random,
        })
    }

    pub fn leave_project(&mut self) -> Option<ContextProject> {
        self.scope.take()
    }

    /// Start over: empty log, no project scope
    pub fn new_exploration(&mut self) {
        self.session.clear_messages();
        self.scope = None;
    }
}
