pub mod consent;

pub use consent::{ConsentRecord, ConsentStore, CONSENT_DAYS};
