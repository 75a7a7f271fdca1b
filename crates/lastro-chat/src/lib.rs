//! Search session state for lastro
//!
//! A session is a bounded, ordered log of prompt/response exchanges plus the
//! bookkeeping needed to drive it from asynchronous requests:
//!
//! - [`ChatSession`] owns the log, hands out identities and tracks requests in flight
//! - [`SessionHandle`] shares one session between tasks
//! - [`SearchController`] turns prompts into backend requests and records the outcome
//!
//! # Example
//!
//! ```no_run
//! use lastro_api::{ArchiveClient, ClientConfig};
//! use lastro_chat::{SearchController, SessionHandle, SubmitOutcome, VisitorIdentity};
//!
//! # async fn example() -> anyhow::Result<()> {
//! let client = ArchiveClient::new(&ClientConfig::default())?;
//! let session = SessionHandle::new();
//! let visitor = VisitorIdentity::new(true, Some("203.0.113.9".to_string()));
//! let controller = SearchController::new(client, session.clone(), visitor);
//!
//! if let SubmitOutcome::Answered(message) = controller.submit("cante alentejano").await {
//!     println!("{} results", message.total_results());
//! }
//! # Ok(())
//! # }
//! ```

pub mod controller;
pub mod handle;
pub mod session;


pub use controller::{
    PreparedSubmission, ProjectView, SearchController, SkipReason, SubmitOutcome, VisitorIdentity,
};
pub use handle::{LoadingGuard, SessionHandle};
pub use session::{ChatSession, PendingMessage};
