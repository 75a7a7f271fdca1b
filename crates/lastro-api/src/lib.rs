//! # lastro-api
//!
//! HTTP access to the Lastro archive backend.
//!
//! ## Features
//!
//! - **Service trait**: `ArchiveService` is what the session layer talks to,
//!   so tests can swap the network for an in-memory double
//! - **reqwest client**: `ArchiveClient` maps every backend route to a typed call
//! - **Visitor identity**: `PublicIpResolver` looks up the public IP sent with
//!   each query, only once the visitor has accepted data consent
//!
//! ## Example
//!
//! ```rust,no_run
//! use lastro_api::{ArchiveClient, ArchiveService, ClientConfig};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let client = ArchiveClient::new(&ClientConfig::default())?;
//!     let projects = client.random_projects(5).await?;
//!     for project in projects {
//!         println!("{} - {}", project.title, project.author);
//!     }
//!     Ok(())
//! }
//! ```

pub mod client;
pub mod config;
pub mod error;

pub use client::{ArchiveClient, ArchiveService, PublicIpResolver};
pub use config::{
    normalize_api_url,
    ClientConfig,
    DEFAULT_API_URL,
    DEFAULT_IP_LOOKUP_URL,
    DEFAULT_TIMEOUT_SECS,
};
pub use error::ApiError;
