//! postbox/crates/services/src/lib.rs
//!
//! The application services of Postbox: form state, notifications, and the
//! submission orchestrator that ties them to the gateway ports.

pub mod form;
pub mod identity;
pub mod notify;
pub mod submit;

pub use form::{FormField, PostForm, SubmitRequest, ValidationError};
pub use identity::FixedIdentity;
pub use notify::{Notification, NotificationCenter, NotificationState};
pub use submit::{
    AuthorPolicy, SubmissionPhase, SubmissionReceipt, SubmissionService, SubmitError,
};
