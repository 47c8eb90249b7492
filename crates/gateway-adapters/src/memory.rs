//! # MemoryGateway
//!
//! In-memory `BoardGateway` used by tests and offline runs. It behaves like
//! the remote backend, including the write-to-read consistency rule: a
//! successful post creation marks the listing read stale and nothing else
//! does. A call log and one-shot failure injection make partial-failure
//! scenarios reproducible.

use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::Utc;
use dashmap::DashMap;

use domains::error::GatewayError;
use domains::models::{Category, CategoryId, ListingItem, NewPost, Post, PostId};
use domains::ports::BoardGateway;

/// One gateway operation, for failure injection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GatewayOp {
    CategoriesByTopic,
    Listing,
    CreateCategory,
    CreatePost,
}

/// Snapshot of how many times each operation ran.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CallCounts {
    pub categories_by_topic: usize,
    pub listing: usize,
    pub create_category: usize,
    pub create_post: usize,
}

impl CallCounts {
    pub fn total(&self) -> usize {
        self.categories_by_topic + self.listing + self.create_category + self.create_post
    }
}

#[derive(Default)]
struct CallLog {
    categories_by_topic: AtomicUsize,
    listing: AtomicUsize,
    create_category: AtomicUsize,
    create_post: AtomicUsize,
}

#[derive(Default)]
pub struct MemoryGateway {
    categories: DashMap<String, Category>,
    posts: DashMap<String, Post>,
    next_id: AtomicU64,
    /// Cached listing; `None` means stale and the next read recomputes it.
    listing_cache: Mutex<Option<Vec<ListingItem>>>,
    /// When set, `create_category` for an existing topic reports a conflict
    /// instead of inserting a duplicate (a backend with a uniqueness
    /// constraint). Off by default to match a constraint-less backend.
    enforce_unique_topics: AtomicBool,
    fail_once: Mutex<HashSet<GatewayOp>>,
    calls: CallLog,
}

impl MemoryGateway {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_unique_topics(self) -> Self {
        self.enforce_unique_topics.store(true, Ordering::SeqCst);
        self
    }

    /// Inserts a category directly, bypassing the gateway surface and the
    /// call log. For arranging pre-existing state in tests.
    pub fn seed_category(&self, topic: &str) -> Category {
        let category = Category {
            id: self.mint_id(),
            topic: topic.to_string(),
            created_at: Utc::now(),
        };
        self.categories
            .insert(category.id.to_string(), category.clone());
        category
    }

    /// Makes the next call to `op` fail with a backend error.
    pub fn fail_next(&self, op: GatewayOp) {
        self.fail_once.lock().unwrap().insert(op);
    }

    pub fn calls(&self) -> CallCounts {
        CallCounts {
            categories_by_topic: self.calls.categories_by_topic.load(Ordering::SeqCst),
            listing: self.calls.listing.load(Ordering::SeqCst),
            create_category: self.calls.create_category.load(Ordering::SeqCst),
            create_post: self.calls.create_post.load(Ordering::SeqCst),
        }
    }

    pub fn category_count(&self) -> usize {
        self.categories.len()
    }

    pub fn post_count(&self) -> usize {
        self.posts.len()
    }

    /// True while the listing cache holds a computed result.
    pub fn listing_cache_warm(&self) -> bool {
        self.listing_cache.lock().unwrap().is_some()
    }

    fn mint_id(&self) -> CategoryId {
        CategoryId(self.next_seq().to_string())
    }

    fn next_seq(&self) -> u64 {
        self.next_id.fetch_add(1, Ordering::SeqCst) + 1
    }

    fn take_failure(&self, op: GatewayOp) -> Result<(), GatewayError> {
        if self.fail_once.lock().unwrap().remove(&op) {
            return Err(GatewayError::Backend {
                message: format!("injected failure for {op:?}"),
            });
        }
        Ok(())
    }

    fn topic_of(&self, category_id: &CategoryId) -> String {
        self.categories
            .get(&category_id.to_string())
            .map(|c| c.topic.clone())
            .unwrap_or_default()
    }

    fn rebuild_listing(&self) -> Vec<ListingItem> {
        let mut items: Vec<ListingItem> = self
            .posts
            .iter()
            .map(|entry| ListingItem {
                topic: self.topic_of(&entry.value().category_id),
                post: entry.value().clone(),
            })
            .collect();
        // Newest first; minted ids are monotonic decimals, so id length then
        // value breaks timestamp ties.
        items.sort_by(|a, b| {
            let key = |item: &ListingItem| {
                (item.post.created_at, item.post.id.0.len(), item.post.id.0.clone())
            };
            key(b).cmp(&key(a))
        });
        items
    }
}

#[async_trait]
impl BoardGateway for MemoryGateway {
    async fn categories_by_topic(&self, topic: &str) -> Result<Vec<Category>, GatewayError> {
        self.calls
            .categories_by_topic
            .fetch_add(1, Ordering::SeqCst);
        self.take_failure(GatewayOp::CategoriesByTopic)?;

        // Literal match, no normalization.
        Ok(self
            .categories
            .iter()
            .filter(|c| c.value().topic == topic)
            .map(|c| c.value().clone())
            .collect())
    }

    async fn listing(&self, limit: usize) -> Result<Vec<ListingItem>, GatewayError> {
        self.calls.listing.fetch_add(1, Ordering::SeqCst);
        self.take_failure(GatewayOp::Listing)?;

        let mut cache = self.listing_cache.lock().unwrap();
        let items = match cache.as_ref() {
            Some(items) => items.clone(),
            None => {
                let rebuilt = self.rebuild_listing();
                *cache = Some(rebuilt.clone());
                rebuilt
            }
        };
        Ok(items.into_iter().take(limit).collect())
    }

    async fn create_category(&self, topic: &str) -> Result<Category, GatewayError> {
        self.calls.create_category.fetch_add(1, Ordering::SeqCst);
        self.take_failure(GatewayOp::CreateCategory)?;

        if self.enforce_unique_topics.load(Ordering::SeqCst)
            && self.categories.iter().any(|c| c.topic == topic)
        {
            return Err(GatewayError::Conflict {
                message: format!("category topic '{topic}' already exists"),
            });
        }

        let category = Category {
            id: self.mint_id(),
            topic: topic.to_string(),
            created_at: Utc::now(),
        };
        self.categories
            .insert(category.id.to_string(), category.clone());
        // Note: no cached read is invalidated here; a new category shows up
        // in category reads only because they are computed per call.
        Ok(category)
    }

    async fn create_post(&self, post: NewPost) -> Result<Post, GatewayError> {
        self.calls.create_post.fetch_add(1, Ordering::SeqCst);
        self.take_failure(GatewayOp::CreatePost)?;

        let created = Post {
            id: PostId(self.next_seq().to_string()),
            title: post.title,
            body: post.body,
            image: post.image,
            category_id: post.category_id,
            author: post.author,
            created_at: Utc::now(),
        };
        self.posts.insert(created.id.to_string(), created.clone());

        // Write-to-read consistency: the listing read is declared stale,
        // and only the listing read.
        *self.listing_cache.lock().unwrap() = None;
        Ok(created)
    }
}
