//! Write-to-read consistency: the listing cache goes stale after a post is
//! created (and only then), and subscribers see an explicit event.

use std::sync::Arc;

use domains::events::BoardEvent;
use domains::ports::BoardGateway;
use gateway_adapters::MemoryGateway;
use services::{FixedIdentity, NotificationCenter, PostForm, SubmissionService};

fn service_over(gateway: Arc<MemoryGateway>) -> SubmissionService {
    SubmissionService::new(
        gateway,
        Arc::new(FixedIdentity::signed_in("jin")),
        Arc::new(NotificationCenter::new()),
    )
}

#[tokio::test]
async fn successful_submission_invalidates_the_listing_read() {
    let gateway = Arc::new(MemoryGateway::new());
    gateway.seed_category("rust");
    let service = service_over(gateway.clone());

    // Warm the listing cache before submitting.
    assert!(gateway.listing(10).await.unwrap().is_empty());
    assert!(gateway.listing_cache_warm());

    let mut form = PostForm::scoped("rust");
    form.set_title("Fresh post");
    service.submit(&mut form).await.unwrap();

    assert!(!gateway.listing_cache_warm());
    let listing = gateway.listing(10).await.unwrap();
    assert_eq!(listing.len(), 1);
    assert_eq!(listing[0].post.title, "Fresh post");
}

#[tokio::test]
async fn category_creation_alone_invalidates_nothing() {
    let gateway = Arc::new(MemoryGateway::new());
    let service = service_over(gateway.clone());

    gateway.listing(10).await.unwrap();

    // A brand-new topic: the submission creates a category along the way.
    // The category read is computed per call, so the new category is only
    // visible there; the listing cache was invalidated by the post write,
    // not the category write.
    let mut form = PostForm::new();
    form.set_title("New topic post");
    form.set_topic_override("zig");
    service.submit(&mut form).await.unwrap();

    assert_eq!(gateway.categories_by_topic("zig").await.unwrap().len(), 1);
    assert!(!gateway.listing_cache_warm());
}

#[tokio::test]
async fn subscribers_observe_listing_changed() {
    let gateway = Arc::new(MemoryGateway::new());
    gateway.seed_category("rust");
    let service = service_over(gateway.clone());
    let mut events = service.subscribe();

    let mut form = PostForm::scoped("rust");
    form.set_title("Observed");
    let receipt = service.submit(&mut form).await.unwrap();

    match events.try_recv().unwrap() {
        BoardEvent::ListingChanged { post_id } => assert_eq!(post_id, receipt.post_id),
    }
}

#[tokio::test]
async fn failed_submission_emits_no_event() {
    let gateway = Arc::new(MemoryGateway::new());
    let service = service_over(gateway.clone());
    let mut events = service.subscribe();

    gateway.fail_next(gateway_adapters::GatewayOp::CreatePost);

    let mut form = PostForm::new();
    form.set_title("Doomed");
    form.set_topic_override("rust");
    service.submit(&mut form).await.unwrap_err();

    assert!(events.try_recv().is_err());
}
