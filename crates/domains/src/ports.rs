//! # Core Traits (Ports)
//!
//! Contracts between the submission core and its external collaborators.
//! Every collaborator is injected through one of these traits so tests can
//! substitute fakes; there are no ambient singletons.

use async_trait::async_trait;
use uuid::Uuid;

use crate::error::GatewayError;
use crate::models::{Category, Identity, ListingItem, NewPost, Post};

/// Remote data gateway: executes named reads and writes against the backend.
///
/// Write-to-read consistency: a successful [`create_post`](BoardGateway::create_post)
/// marks the listing read stale inside the adapter, and nothing else. A newly
/// created category is not reflected in any cached category read.
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait BoardGateway: Send + Sync {
    /// Returns every category whose topic matches `topic` exactly.
    /// No normalization is applied to the input.
    async fn categories_by_topic(&self, topic: &str) -> Result<Vec<Category>, GatewayError>;

    /// Returns the aggregate listing, newest first, up to `limit` rows.
    async fn listing(&self, limit: usize) -> Result<Vec<ListingItem>, GatewayError>;

    /// Persists a new category and returns it with its generated id.
    async fn create_category(&self, topic: &str) -> Result<Category, GatewayError>;

    /// Persists a new post. Precondition: `post.category_id` references a
    /// category that exists at call time.
    async fn create_post(&self, post: NewPost) -> Result<Post, GatewayError>;
}

/// Identity collaborator: a black box producing an optional signed-in user.
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
pub trait IdentityProvider: Send + Sync {
    fn current_identity(&self) -> Option<Identity>;
}

/// Correlation token linking a notification's creation to its later update.
pub type NotificationToken = Uuid;

/// Terminal state pushed onto an open notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationStatus {
    Success,
    Error,
}

/// Notification surface: purely observational. The orchestrator consumes
/// nothing from it beyond the correlation token.
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
pub trait Notifier: Send + Sync {
    /// Opens a pending notification and returns its correlation token.
    fn open(&self, message: &str) -> NotificationToken;

    /// Updates the notification created under `token` to a terminal status.
    fn update(&self, token: NotificationToken, status: NotificationStatus, message: &str);
}
