//! # Submission Orchestrator
//!
//! Sequences the find-or-create category resolution and the dependent post
//! creation, and owns the notification lifecycle around them. All remote
//! work runs strictly in order because each step depends on the previous
//! step's result; the pending notification is the only user-visible sign
//! that the event loop is awaiting network results.

use std::sync::{Arc, Mutex};

use tokio::sync::broadcast;

use domains::error::GatewayError;
use domains::events::BoardEvent;
use domains::models::{Category, CategoryId, NewPost, PostId};
use domains::ports::{
    BoardGateway, IdentityProvider, NotificationStatus, NotificationToken, Notifier,
};
use thiserror::Error;

use crate::form::{PostForm, SubmitRequest, ValidationError};

/// Whether a submission may proceed without a signed-in identity.
///
/// `AllowAnonymous` preserves the historical behavior: the post is created
/// with no author. `RequireIdentity` rejects before any gateway call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AuthorPolicy {
    #[default]
    AllowAnonymous,
    RequireIdentity,
}

/// Observable lifecycle of the orchestrator. Callers use this to disable
/// their submit control; the orchestrator itself does not guard against a
/// second submission starting while one is in flight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SubmissionPhase {
    #[default]
    Idle,
    Submitting,
    Succeeded,
    Failed,
}

/// Submission failure, tagged by the step that raised it so callers can
/// render differentiated messages.
#[derive(Error, Debug)]
pub enum SubmitError {
    /// A required field is missing. Detected before any remote call; no
    /// notification is opened.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// No identity is present and the policy requires one.
    #[error("sign in before submitting a post")]
    IdentityRequired,

    /// The category lookup failed. No partial state was created.
    #[error("category lookup failed")]
    Resolution(#[source] GatewayError),

    /// Creating the missing category failed. No post was created.
    #[error("category creation failed")]
    CategoryCreation(#[source] GatewayError),

    /// Creating the post failed. A category created earlier in this
    /// submission persists with no post attached; it is not compensated.
    #[error("post creation failed")]
    PostCreation(#[source] GatewayError),
}

/// What a successful submission produced.
#[derive(Debug, Clone, PartialEq)]
pub struct SubmissionReceipt {
    pub post_id: PostId,
    pub category_id: CategoryId,
    /// True when this submission created the category rather than finding it.
    pub created_category: bool,
    pub token: NotificationToken,
}

/// Orchestrates one submission at a time over injected collaborators.
pub struct SubmissionService {
    gateway: Arc<dyn BoardGateway>,
    identity: Arc<dyn IdentityProvider>,
    notifier: Arc<dyn Notifier>,
    events: broadcast::Sender<BoardEvent>,
    author_policy: AuthorPolicy,
    phase: Mutex<SubmissionPhase>,
}

impl SubmissionService {
    pub fn new(
        gateway: Arc<dyn BoardGateway>,
        identity: Arc<dyn IdentityProvider>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        let (events, _) = broadcast::channel(16);
        Self {
            gateway,
            identity,
            notifier,
            events,
            author_policy: AuthorPolicy::default(),
            phase: Mutex::new(SubmissionPhase::Idle),
        }
    }

    pub fn with_author_policy(mut self, policy: AuthorPolicy) -> Self {
        self.author_policy = policy;
        self
    }

    /// Subscribes to board events. A `ListingChanged` event means cached
    /// copies of the aggregate listing are stale.
    pub fn subscribe(&self) -> broadcast::Receiver<BoardEvent> {
        self.events.subscribe()
    }

    pub fn phase(&self) -> SubmissionPhase {
        *self.phase.lock().unwrap()
    }

    /// Returns a terminal phase to `Idle` once the UI has shown the outcome.
    pub fn acknowledge(&self) {
        let mut phase = self.phase.lock().unwrap();
        if matches!(*phase, SubmissionPhase::Succeeded | SubmissionPhase::Failed) {
            *phase = SubmissionPhase::Idle;
        }
    }

    /// Looks up the categories matching `topic` exactly. Zero or one record
    /// is expected; with a backend that does not enforce topic uniqueness
    /// the first result wins.
    pub async fn resolve_category(&self, topic: &str) -> Result<Option<Category>, GatewayError> {
        let mut matches = self.gateway.categories_by_topic(topic).await?;
        if matches.len() > 1 {
            tracing::warn!(topic, count = matches.len(), "duplicate categories for topic");
        }
        Ok(if matches.is_empty() {
            None
        } else {
            Some(matches.remove(0))
        })
    }

    /// Resolves `topic` to an existing category or creates one. Returns the
    /// category id and whether it was newly created.
    ///
    /// The resolve-then-create sequence is racy: two concurrent submissions
    /// for the same new topic can both observe "not found". When the backend
    /// enforces topic uniqueness the loser's create comes back as a conflict
    /// and we re-resolve once to attach to the winner; without such a
    /// constraint both creates succeed and a duplicate category remains.
    async fn find_or_create_category(
        &self,
        topic: &str,
    ) -> Result<(CategoryId, bool), SubmitError> {
        if let Some(existing) = self
            .resolve_category(topic)
            .await
            .map_err(SubmitError::Resolution)?
        {
            tracing::debug!(topic, category_id = %existing.id, "using existing category");
            return Ok((existing.id, false));
        }

        tracing::debug!(topic, "category is new, creating it");
        match self.gateway.create_category(topic).await {
            Ok(created) => Ok((created.id, true)),
            Err(err) if err.is_conflict() => {
                // Lost the race: another submission created it between our
                // resolve and create. Re-resolve and use the winner.
                tracing::debug!(topic, "category create conflicted, re-resolving");
                let winner = self
                    .gateway
                    .categories_by_topic(topic)
                    .await
                    .map_err(SubmitError::CategoryCreation)?
                    .into_iter()
                    .next()
                    .ok_or(SubmitError::CategoryCreation(err))?;
                Ok((winner.id, false))
            }
            Err(err) => Err(SubmitError::CategoryCreation(err)),
        }
    }

    async fn run_submission(
        &self,
        request: SubmitRequest,
        author: Option<String>,
    ) -> Result<(PostId, CategoryId, bool), SubmitError> {
        // 1. Resolve the effective topic to a category id, creating the
        //    category when absent.
        let (category_id, created_category) = self.find_or_create_category(&request.topic).await?;

        // 2. Create the post against the resolved category.
        let post = self
            .gateway
            .create_post(NewPost {
                title: request.title,
                body: request.body,
                image: request.image,
                category_id: category_id.clone(),
                author,
            })
            .await
            .map_err(|err| {
                if created_category {
                    // The category persists with no post attached. Accepted,
                    // not compensated.
                    tracing::warn!(%category_id, "post creation failed after creating category");
                }
                SubmitError::PostCreation(err)
            })?;

        Ok((post.id, category_id, created_category))
    }

    /// Runs one full submission over the form's current values.
    ///
    /// On success the form is cleared and a `ListingChanged` event is
    /// emitted; on any remote failure the form is left untouched for retry
    /// and the pending notification flips to an error.
    pub async fn submit(&self, form: &mut PostForm) -> Result<SubmissionReceipt, SubmitError> {
        // Validation runs before anything else: no notification is opened
        // and no gateway call is made when it fails.
        let request = form.validate()?;

        let author = self.identity.current_identity().map(|id| id.display_name);
        if author.is_none() && self.author_policy == AuthorPolicy::RequireIdentity {
            return Err(SubmitError::IdentityRequired);
        }

        *self.phase.lock().unwrap() = SubmissionPhase::Submitting;
        let token = self.notifier.open("Creating new post...");
        tracing::info!(topic = %request.topic, title = %request.title, %token, "submission started");

        match self.run_submission(request, author).await {
            Ok((post_id, category_id, created_category)) => {
                *self.phase.lock().unwrap() = SubmissionPhase::Succeeded;
                self.notifier
                    .update(token, NotificationStatus::Success, "New post created");
                form.reset();
                // Receivers may come and go; an empty subscriber list is fine.
                let _ = self.events.send(BoardEvent::ListingChanged {
                    post_id: post_id.clone(),
                });
                tracing::info!(%post_id, %category_id, created_category, "submission succeeded");
                Ok(SubmissionReceipt {
                    post_id,
                    category_id,
                    created_category,
                    token,
                })
            }
            Err(err) => {
                *self.phase.lock().unwrap() = SubmissionPhase::Failed;
                self.notifier.update(
                    token,
                    NotificationStatus::Error,
                    "Whoops! Something went wrong!",
                );
                tracing::error!(error = %err, "submission failed");
                Err(err)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use domains::models::{Identity, Post};
    use domains::ports::{MockBoardGateway, MockIdentityProvider};
    use mockall::predicate::eq;

    use crate::notify::{NotificationCenter, NotificationState};

    fn category(id: &str, topic: &str) -> Category {
        Category {
            id: CategoryId::from(id),
            topic: topic.to_string(),
            created_at: Utc::now(),
        }
    }

    fn created_post(id: &str, new_post: &NewPost) -> Post {
        Post {
            id: PostId::from(id),
            title: new_post.title.clone(),
            body: new_post.body.clone(),
            image: new_post.image.clone(),
            category_id: new_post.category_id.clone(),
            author: new_post.author.clone(),
            created_at: Utc::now(),
        }
    }

    fn signed_in(name: &str) -> Arc<MockIdentityProvider> {
        let mut identity = MockIdentityProvider::new();
        let name = name.to_string();
        identity.expect_current_identity().returning(move || {
            Some(Identity {
                display_name: name.clone(),
            })
        });
        Arc::new(identity)
    }

    fn signed_out() -> Arc<MockIdentityProvider> {
        let mut identity = MockIdentityProvider::new();
        identity.expect_current_identity().returning(|| None);
        Arc::new(identity)
    }

    #[tokio::test]
    async fn existing_category_is_reused() {
        let mut gateway = MockBoardGateway::new();
        gateway
            .expect_categories_by_topic()
            .with(eq("reactjs"))
            .times(1)
            .returning(|_| Ok(vec![category("7", "reactjs")]));
        gateway.expect_create_category().times(0);
        gateway
            .expect_create_post()
            .times(1)
            .returning(|p| Ok(created_post("100", &p)));

        let notifier = Arc::new(NotificationCenter::new());
        let service =
            SubmissionService::new(Arc::new(gateway), signed_in("jin"), notifier.clone());

        let mut form = PostForm::new();
        form.set_title("Second post");
        form.set_topic_override("reactjs");

        let receipt = service.submit(&mut form).await.unwrap();
        assert_eq!(receipt.category_id, CategoryId::from("7"));
        assert!(!receipt.created_category);
        assert_eq!(
            notifier.snapshot(receipt.token).unwrap().state,
            NotificationState::Success
        );
    }

    #[tokio::test]
    async fn missing_category_is_created_first() {
        let mut gateway = MockBoardGateway::new();
        gateway
            .expect_categories_by_topic()
            .with(eq("reactjs"))
            .times(1)
            .returning(|_| Ok(vec![]));
        gateway
            .expect_create_category()
            .with(eq("reactjs"))
            .times(1)
            .returning(|topic| Ok(category("9", topic)));
        gateway
            .expect_create_post()
            .withf(|p| p.category_id == CategoryId::from("9") && p.title == "Hello World")
            .times(1)
            .returning(|p| Ok(created_post("101", &p)));

        let service = SubmissionService::new(
            Arc::new(gateway),
            signed_in("jin"),
            Arc::new(NotificationCenter::new()),
        );

        let mut form = PostForm::new();
        form.set_title("Hello World");
        form.set_topic_override("reactjs");

        let receipt = service.submit(&mut form).await.unwrap();
        assert!(receipt.created_category);
        assert_eq!(form.title(), "");
        assert_eq!(form.topic_override(), "");
    }

    #[tokio::test]
    async fn empty_title_makes_no_gateway_calls() {
        let mut gateway = MockBoardGateway::new();
        gateway.expect_categories_by_topic().times(0);
        gateway.expect_create_category().times(0);
        gateway.expect_create_post().times(0);

        let notifier = Arc::new(NotificationCenter::new());
        let service =
            SubmissionService::new(Arc::new(gateway), signed_in("jin"), notifier.clone());

        let mut form = PostForm::new();
        let err = service.submit(&mut form).await.unwrap_err();
        assert!(matches!(err, SubmitError::Validation(_)));
        assert_eq!(notifier.open_count(), 0);
        assert_eq!(service.phase(), SubmissionPhase::Idle);
    }

    #[tokio::test]
    async fn post_creation_failure_preserves_form_fields() {
        let mut gateway = MockBoardGateway::new();
        gateway
            .expect_categories_by_topic()
            .returning(|_| Ok(vec![category("7", "reactjs")]));
        gateway.expect_create_post().returning(|_| {
            Err(GatewayError::Backend {
                message: "insert failed".into(),
            })
        });

        let notifier = Arc::new(NotificationCenter::new());
        let service =
            SubmissionService::new(Arc::new(gateway), signed_in("jin"), notifier.clone());

        let mut form = PostForm::new();
        form.set_title("Hello World");
        form.set_body("some body");
        form.set_topic_override("reactjs");

        let err = service.submit(&mut form).await.unwrap_err();
        assert!(matches!(err, SubmitError::PostCreation(_)));
        assert_eq!(form.title(), "Hello World");
        assert_eq!(form.body(), "some body");
        assert_eq!(form.topic_override(), "reactjs");
        assert_eq!(service.phase(), SubmissionPhase::Failed);
    }

    #[tokio::test]
    async fn category_create_conflict_re_resolves_to_winner() {
        let mut gateway = MockBoardGateway::new();
        let mut lookups = 0;
        gateway
            .expect_categories_by_topic()
            .times(2)
            .returning(move |_| {
                lookups += 1;
                if lookups == 1 {
                    Ok(vec![])
                } else {
                    Ok(vec![category("12", "rust")])
                }
            });
        gateway.expect_create_category().times(1).returning(|_| {
            Err(GatewayError::Conflict {
                message: "topic already exists".into(),
            })
        });
        gateway
            .expect_create_post()
            .withf(|p| p.category_id == CategoryId::from("12"))
            .times(1)
            .returning(|p| Ok(created_post("102", &p)));

        let service = SubmissionService::new(
            Arc::new(gateway),
            signed_in("jin"),
            Arc::new(NotificationCenter::new()),
        );

        let mut form = PostForm::new();
        form.set_title("Racy");
        form.set_topic_override("rust");

        let receipt = service.submit(&mut form).await.unwrap();
        assert_eq!(receipt.category_id, CategoryId::from("12"));
        assert!(!receipt.created_category);
    }

    #[tokio::test]
    async fn anonymous_submission_allowed_by_default() {
        let mut gateway = MockBoardGateway::new();
        gateway
            .expect_categories_by_topic()
            .returning(|_| Ok(vec![category("7", "reactjs")]));
        gateway
            .expect_create_post()
            .withf(|p| p.author.is_none())
            .times(1)
            .returning(|p| Ok(created_post("103", &p)));

        let service = SubmissionService::new(
            Arc::new(gateway),
            signed_out(),
            Arc::new(NotificationCenter::new()),
        );

        let mut form = PostForm::new();
        form.set_title("No author");
        form.set_topic_override("reactjs");
        service.submit(&mut form).await.unwrap();
    }

    #[tokio::test]
    async fn require_identity_policy_blocks_before_gateway() {
        let mut gateway = MockBoardGateway::new();
        gateway.expect_categories_by_topic().times(0);
        gateway.expect_create_category().times(0);
        gateway.expect_create_post().times(0);

        let notifier = Arc::new(NotificationCenter::new());
        let service = SubmissionService::new(Arc::new(gateway), signed_out(), notifier.clone())
            .with_author_policy(AuthorPolicy::RequireIdentity);

        let mut form = PostForm::new();
        form.set_title("Hello");
        form.set_topic_override("rust");

        let err = service.submit(&mut form).await.unwrap_err();
        assert!(matches!(err, SubmitError::IdentityRequired));
        assert_eq!(notifier.open_count(), 0);
    }

    #[tokio::test]
    async fn success_emits_listing_changed() {
        let mut gateway = MockBoardGateway::new();
        gateway
            .expect_categories_by_topic()
            .returning(|_| Ok(vec![category("7", "reactjs")]));
        gateway
            .expect_create_post()
            .returning(|p| Ok(created_post("104", &p)));

        let service = SubmissionService::new(
            Arc::new(gateway),
            signed_in("jin"),
            Arc::new(NotificationCenter::new()),
        );
        let mut events = service.subscribe();

        let mut form = PostForm::new();
        form.set_title("Hello");
        form.set_topic_override("reactjs");
        service.submit(&mut form).await.unwrap();

        assert_eq!(
            events.try_recv().unwrap(),
            BoardEvent::ListingChanged {
                post_id: PostId::from("104")
            }
        );
    }

    #[tokio::test]
    async fn acknowledge_returns_terminal_phase_to_idle() {
        let mut gateway = MockBoardGateway::new();
        gateway
            .expect_categories_by_topic()
            .returning(|_| Ok(vec![category("7", "reactjs")]));
        gateway
            .expect_create_post()
            .returning(|p| Ok(created_post("105", &p)));

        let service = SubmissionService::new(
            Arc::new(gateway),
            signed_in("jin"),
            Arc::new(NotificationCenter::new()),
        );

        let mut form = PostForm::new();
        form.set_title("Hello");
        form.set_topic_override("reactjs");
        service.submit(&mut form).await.unwrap();

        assert_eq!(service.phase(), SubmissionPhase::Succeeded);
        service.acknowledge();
        assert_eq!(service.phase(), SubmissionPhase::Idle);
    }
}
