//! # GraphqlGateway
//!
//! `BoardGateway` implementation over a GraphQL-over-HTTP backend. This
//! module maps the wire envelope and row shapes back to the `domains`
//! models; nothing above this layer knows GraphQL exists.

use async_trait::async_trait;
use reqwest::header::AUTHORIZATION;
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use domains::error::GatewayError;
use domains::models::{Category, CategoryId, ListingItem, NewPost, Post, PostId};
use domains::ports::BoardGateway;

const CATEGORIES_BY_TOPIC: &str = r#"
query CategoriesByTopic($topic: String!) {
    getCategoryListByTopic(topic: $topic) {
        id
        topic
        created_at
    }
}"#;

const POST_LIST: &str = r#"
query PostList($limit: Int!) {
    getPostList(limit: $limit) {
        id
        title
        body
        image
        category_id
        author
        created_at
        topic
    }
}"#;

const INSERT_CATEGORY: &str = r#"
mutation InsertCategory($topic: String!) {
    insertCategory(topic: $topic) {
        id
        topic
        created_at
    }
}"#;

const INSERT_POST: &str = r#"
mutation InsertPost(
    $title: String!
    $body: String
    $image: String
    $category_id: ID!
    $author: String
) {
    insertPost(
        title: $title
        body: $body
        image: $image
        category_id: $category_id
        author: $author
    ) {
        id
        title
        body
        image
        category_id
        author
        created_at
    }
}"#;

pub struct GraphqlGateway {
    http: reqwest::Client,
    endpoint: String,
    api_key: SecretString,
}

impl GraphqlGateway {
    pub fn new(endpoint: impl Into<String>, api_key: SecretString) -> Self {
        Self {
            http: reqwest::Client::new(),
            endpoint: endpoint.into(),
            api_key,
        }
    }

    async fn execute<V, T>(&self, query: &str, variables: V) -> Result<T, GatewayError>
    where
        V: Serialize,
        T: DeserializeOwned,
    {
        let response = self
            .http
            .post(&self.endpoint)
            .header(
                AUTHORIZATION,
                format!("Apikey {}", self.api_key.expose_secret()),
            )
            .json(&GraphqlRequest { query, variables })
            .send()
            .await
            .map_err(|err| GatewayError::Transport(err.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(GatewayError::Backend {
                message: format!("http status {status}"),
            });
        }

        let envelope: GraphqlResponse<T> = response
            .json()
            .await
            .map_err(|err| GatewayError::Decode(err.to_string()))?;

        if let Some(first) = envelope.errors.into_iter().next() {
            return Err(classify_backend_error(first.message));
        }
        envelope
            .data
            .ok_or_else(|| GatewayError::Decode("response carried neither data nor errors".into()))
    }
}

/// Maps a GraphQL error to the gateway taxonomy. Uniqueness violations are
/// reported by the backend as plain error messages, so the conflict signal
/// is recovered by inspecting them.
fn classify_backend_error(message: String) -> GatewayError {
    let lowered = message.to_lowercase();
    let conflict = ["duplicate", "unique", "already exists", "conflict"]
        .iter()
        .any(|needle| lowered.contains(needle));
    if conflict {
        GatewayError::Conflict { message }
    } else {
        GatewayError::Backend { message }
    }
}

#[async_trait]
impl BoardGateway for GraphqlGateway {
    async fn categories_by_topic(&self, topic: &str) -> Result<Vec<Category>, GatewayError> {
        tracing::debug!(topic, "gateway read: categories by topic");
        let data: CategoriesByTopicData = self
            .execute(CATEGORIES_BY_TOPIC, serde_json::json!({ "topic": topic }))
            .await?;
        Ok(data.categories.into_iter().map(Category::from).collect())
    }

    async fn listing(&self, limit: usize) -> Result<Vec<ListingItem>, GatewayError> {
        tracing::debug!(limit, "gateway read: post listing");
        let data: PostListData = self
            .execute(POST_LIST, serde_json::json!({ "limit": limit }))
            .await?;
        Ok(data.posts.into_iter().map(ListingItem::from).collect())
    }

    async fn create_category(&self, topic: &str) -> Result<Category, GatewayError> {
        tracing::debug!(topic, "gateway write: create category");
        let data: InsertCategoryData = self
            .execute(INSERT_CATEGORY, serde_json::json!({ "topic": topic }))
            .await?;
        Ok(data.category.into())
    }

    async fn create_post(&self, post: NewPost) -> Result<Post, GatewayError> {
        tracing::debug!(title = %post.title, category_id = %post.category_id, "gateway write: create post");
        let data: InsertPostData = self
            .execute(
                INSERT_POST,
                serde_json::json!({
                    "title": post.title,
                    "body": post.body,
                    "image": post.image,
                    "category_id": post.category_id,
                    "author": post.author,
                }),
            )
            .await?;
        Ok(data.post.into())
    }
}

// ── Wire shapes ──────────────────────────────────────────────────────────────

#[derive(Serialize)]
struct GraphqlRequest<'a, V> {
    query: &'a str,
    variables: V,
}

#[derive(Deserialize)]
struct GraphqlResponse<T> {
    data: Option<T>,
    #[serde(default)]
    errors: Vec<GraphqlResponseError>,
}

#[derive(Deserialize)]
struct GraphqlResponseError {
    message: String,
}

#[derive(Deserialize)]
struct CategoryRow {
    id: String,
    topic: String,
    created_at: chrono::DateTime<chrono::Utc>,
}

impl From<CategoryRow> for Category {
    fn from(row: CategoryRow) -> Self {
        Category {
            id: CategoryId(row.id),
            topic: row.topic,
            created_at: row.created_at,
        }
    }
}

#[derive(Deserialize)]
struct PostRow {
    id: String,
    title: String,
    body: Option<String>,
    image: Option<String>,
    category_id: String,
    author: Option<String>,
    created_at: chrono::DateTime<chrono::Utc>,
    /// Present on listing rows only (denormalized category topic).
    #[serde(default)]
    topic: Option<String>,
}

impl From<PostRow> for Post {
    fn from(row: PostRow) -> Self {
        Post {
            id: PostId(row.id),
            title: row.title,
            body: row.body,
            image: row.image,
            category_id: CategoryId(row.category_id),
            author: row.author,
            created_at: row.created_at,
        }
    }
}

impl From<PostRow> for ListingItem {
    fn from(row: PostRow) -> Self {
        let topic = row.topic.clone().unwrap_or_default();
        ListingItem {
            post: row.into(),
            topic,
        }
    }
}

#[derive(Deserialize)]
struct CategoriesByTopicData {
    #[serde(rename = "getCategoryListByTopic")]
    categories: Vec<CategoryRow>,
}

#[derive(Deserialize)]
struct PostListData {
    #[serde(rename = "getPostList")]
    posts: Vec<PostRow>,
}

#[derive(Deserialize)]
struct InsertCategoryData {
    #[serde(rename = "insertCategory")]
    category: CategoryRow,
}

#[derive(Deserialize)]
struct InsertPostData {
    #[serde(rename = "insertPost")]
    post: PostRow,
}
