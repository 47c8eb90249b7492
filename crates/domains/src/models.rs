//! # Domain Models
//!
//! These structs represent the core entities of the Postbox submission
//! pipeline. Record identifiers are minted by the backend, so the client
//! treats them as opaque strings rather than parsing them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque identifier of a [`Category`], owned by the backend.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CategoryId(pub String);

impl fmt::Display for CategoryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for CategoryId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Opaque identifier of a [`Post`], owned by the backend.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PostId(pub String);

impl fmt::Display for PostId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for PostId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// A named grouping that posts belong to (a "topic").
///
/// Intended to be unique by `topic`. The backend is expected to enforce
/// this; the client matches the topic string literally, with no case or
/// whitespace normalization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Category {
    pub id: CategoryId,
    pub topic: String,
    pub created_at: DateTime<Utc>,
}

/// A user-submitted content record attached to exactly one category.
/// Immutable after creation from this client's perspective.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Post {
    pub id: PostId,
    pub title: String,
    pub body: Option<String>,
    /// Optional image URL; the client does not fetch or validate it.
    pub image: Option<String>,
    pub category_id: CategoryId,
    /// Display name of the submitting identity, if one was present.
    pub author: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Write payload for creating a [`Post`]. The `category_id` must reference
/// a category that exists at call time; the caller guarantees this by
/// sequencing, the gateway does not re-check it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewPost {
    pub title: String,
    pub body: Option<String>,
    pub image: Option<String>,
    pub category_id: CategoryId,
    pub author: Option<String>,
}

/// One row of the aggregate listing: a post with its category topic
/// denormalized onto it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListingItem {
    pub post: Post,
    pub topic: String,
}

/// The current signed-in identity, as reported by the identity collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub display_name: String,
}
