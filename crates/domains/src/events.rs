//! # Board Events
//!
//! Explicit events emitted by the submission core, replacing framework-level
//! refetch declarations. Any reader that caches the listing subscribes and
//! re-reads when it sees `ListingChanged`.

use serde::{Deserialize, Serialize};

use crate::models::PostId;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum BoardEvent {
    /// The aggregate listing gained a new post and cached copies are stale.
    ListingChanged { post_id: PostId },
}
