use async_trait::async_trait;

use lastro_types::{Project, QueryRequest, QueryResponse, Suggestion};

use crate::error::ApiError;

pub mod archive;
pub mod ip;

pub use archive::ArchiveClient;
pub use ip::PublicIpResolver;

/// Archive service trait - everything the search session needs from the backend
#[async_trait]
pub trait ArchiveService: Send + Sync {
    /// `GET /projects`
    async fn projects(&self) -> Result<Vec<Project>, ApiError>;

    /// `GET /projects/{id}`
    async fn project(&self, id: &str) -> Result<Project, ApiError>;

    /// `GET /suggestions/{id}`
    async fn suggestions(&self, id: &str) -> Result<Vec<Suggestion>, ApiError>;

    /// `GET /random-projects/{count}`
    async fn random_projects(&self, count: usize) -> Result<Vec<Project>, ApiError>;

    /// `POST /query` - natural-language search
    async fn query(&self, request: &QueryRequest) -> Result<QueryResponse, ApiError>;
}
