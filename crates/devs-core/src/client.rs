//! Typed GraphQL client for the external content API.
//!
//! Every call POSTs `{query, variables}` to one endpoint with an optional bearer
//! token and decodes the `{data, errors}` envelope. Any `errors` entry fails the call
//! with the server-provided messages. There is no retry; dropping the future cancels.

use std::fmt;
use std::time::{Duration, Instant};

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tracing::{debug, warn};
use url::Url;

use crate::content::{Category, Post, PostPage, PostStatus, User};
use crate::fmt::truncate;
use crate::validation::{CategoryInput, PostDraft, ProfileUpdate};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

/// Longest error body kept from a non-2xx response.
const ERROR_BODY_CHARS: usize = 512;

/// Error type for API calls.
#[derive(Debug)]
pub enum ClientError {
    /// Invalid endpoint or client setup.
    Config(String),
    /// Transport failure (connect, timeout, TLS).
    Network(reqwest::Error),
    /// Non-success HTTP status.
    Http { status: u16, body: String },
    /// GraphQL `errors` returned by the server.
    Graphql(Vec<String>),
    /// Response did not match the expected shape.
    Decode(String),
    NotFound(String),
}

impl fmt::Display for ClientError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClientError::Config(msg) => write!(f, "client configuration error: {}", msg),
            ClientError::Network(e) => write!(f, "network error: {}", e),
            ClientError::Http { status, body } => write!(f, "HTTP {}: {}", status, body),
            ClientError::Graphql(messages) => write!(f, "{}", messages.join("; ")),
            ClientError::Decode(msg) => write!(f, "unexpected response: {}", msg),
            ClientError::NotFound(what) => write!(f, "not found: {}", what),
        }
    }
}

impl std::error::Error for ClientError {}

impl From<reqwest::Error> for ClientError {
    fn from(e: reqwest::Error) -> Self {
        ClientError::Network(e)
    }
}

// ----------------------------------------------------------------------------
// Envelope
// ----------------------------------------------------------------------------

#[derive(Serialize)]
struct Request<'a> {
    query: &'a str,
    variables: Value,
}

#[derive(Deserialize)]
struct Envelope<T> {
    data: Option<T>,
    #[serde(default)]
    errors: Option<Vec<ServerError>>,
}

#[derive(Deserialize)]
struct ServerError {
    #[serde(default)]
    message: String,
}

/// Decodes a GraphQL response body.
pub fn decode_envelope<T: DeserializeOwned>(body: &[u8]) -> Result<T, ClientError> {
    let envelope: Envelope<T> =
        serde_json::from_slice(body).map_err(|e| ClientError::Decode(e.to_string()))?;
    if let Some(errors) = envelope.errors
        && !errors.is_empty()
    {
        let messages = errors
            .into_iter()
            .map(|e| {
                if e.message.is_empty() {
                    "unknown GraphQL error".to_string()
                } else {
                    e.message
                }
            })
            .collect();
        return Err(ClientError::Graphql(messages));
    }
    envelope
        .data
        .ok_or_else(|| ClientError::Decode("response has neither data nor errors".to_string()))
}

// ----------------------------------------------------------------------------
// Operations
// ----------------------------------------------------------------------------

const POST_FIELDS: &str = "id slug title excerpt content coverImage status tags views \
    createdAt publishedAt updatedAt \
    category { id name slug description postCount } author { id name avatar }";

const CATEGORY_FIELDS: &str = "id name slug description postCount";

const USER_FIELDS: &str = "id name email role avatar bio postCount createdAt";

/// Filters for the posts listing. Unset fields are omitted.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostFilter {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tag: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<PostStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search: Option<String>,
}

#[derive(Deserialize)]
struct PostsData {
    posts: PostPage,
}

#[derive(Deserialize)]
struct PostData {
    post: Option<Post>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreatePostData {
    create_post: Post,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct UpdatePostData {
    update_post: Option<Post>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct DeletePostData {
    delete_post: bool,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct IncrementViewsData {
    increment_post_views: Option<i64>,
}

#[derive(Deserialize)]
struct CategoriesData {
    categories: Vec<Category>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreateCategoryData {
    create_category: Category,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct UpdateCategoryData {
    update_category: Option<Category>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct DeleteCategoryData {
    delete_category: bool,
}

#[derive(Deserialize)]
struct UsersData {
    users: Vec<User>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct UpdateProfileData {
    update_profile: User,
}

// ----------------------------------------------------------------------------
// Client
// ----------------------------------------------------------------------------

/// Cheap to clone; clones share the connection pool.
#[derive(Clone)]
pub struct GraphqlClient {
    http: reqwest::Client,
    endpoint: Url,
    token: Option<String>,
}

impl fmt::Debug for GraphqlClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GraphqlClient")
            .field("endpoint", &self.endpoint.as_str())
            .field("token", &self.token.as_ref().map(|_| "***"))
            .finish()
    }
}

impl GraphqlClient {
    pub fn new(endpoint: &str, token: Option<String>) -> Result<Self, ClientError> {
        let endpoint = Url::parse(endpoint)
            .map_err(|e| ClientError::Config(format!("invalid endpoint {}: {}", endpoint, e)))?;
        if !matches!(endpoint.scheme(), "http" | "https") {
            return Err(ClientError::Config(format!(
                "unsupported endpoint scheme: {}",
                endpoint.scheme()
            )));
        }
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .user_agent(concat!("devs/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            http,
            endpoint,
            token: token.filter(|t| !t.is_empty()),
        })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    /// Runs one GraphQL operation and decodes its `data`.
    pub async fn execute<T: DeserializeOwned>(
        &self,
        operation: &'static str,
        query: &str,
        variables: Value,
    ) -> Result<T, ClientError> {
        let start = Instant::now();
        let mut request = self
            .http
            .post(self.endpoint.clone())
            .json(&Request { query, variables });
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await?;
        let status = response.status();
        let body = response.bytes().await?;
        let elapsed_ms = start.elapsed().as_millis() as u64;

        if !status.is_success() {
            let text = String::from_utf8_lossy(&body);
            warn!(operation, status = status.as_u16(), elapsed_ms, "GraphQL HTTP error");
            return Err(ClientError::Http {
                status: status.as_u16(),
                body: truncate(text.trim(), ERROR_BODY_CHARS),
            });
        }

        let result = decode_envelope(&body);
        match &result {
            Ok(_) => debug!(operation, elapsed_ms, "GraphQL call ok"),
            Err(e) => warn!(operation, elapsed_ms, error = %e, "GraphQL call failed"),
        }
        result
    }

    // -- posts --------------------------------------------------------------

    pub async fn posts(
        &self,
        filter: &PostFilter,
        page: u32,
        page_size: u32,
    ) -> Result<PostPage, ClientError> {
        let query = format!(
            "query Posts($filter: PostFilter, $page: Int, $pageSize: Int) {{ \
             posts(filter: $filter, page: $page, pageSize: $pageSize) {{ total items {{ {POST_FIELDS} }} }} }}"
        );
        let data: PostsData = self
            .execute(
                "posts",
                &query,
                json!({"filter": filter, "page": page, "pageSize": page_size}),
            )
            .await?;
        Ok(data.posts)
    }

    pub async fn post(&self, slug: &str) -> Result<Post, ClientError> {
        let query = format!("query Post($slug: String!) {{ post(slug: $slug) {{ {POST_FIELDS} }} }}");
        let data: PostData = self.execute("post", &query, json!({"slug": slug})).await?;
        data.post
            .ok_or_else(|| ClientError::NotFound(format!("post {}", slug)))
    }

    pub async fn create_post(&self, draft: &PostDraft) -> Result<Post, ClientError> {
        let query = format!(
            "mutation CreatePost($input: PostInput!) {{ createPost(input: $input) {{ {POST_FIELDS} }} }}"
        );
        let data: CreatePostData = self
            .execute("createPost", &query, json!({"input": draft}))
            .await?;
        Ok(data.create_post)
    }

    pub async fn update_post(&self, id: &str, draft: &PostDraft) -> Result<Post, ClientError> {
        let query = format!(
            "mutation UpdatePost($id: ID!, $input: PostInput!) {{ updatePost(id: $id, input: $input) {{ {POST_FIELDS} }} }}"
        );
        let data: UpdatePostData = self
            .execute("updatePost", &query, json!({"id": id, "input": draft}))
            .await?;
        data.update_post
            .ok_or_else(|| ClientError::NotFound(format!("post {}", id)))
    }

    pub async fn delete_post(&self, id: &str) -> Result<(), ClientError> {
        let data: DeletePostData = self
            .execute(
                "deletePost",
                "mutation DeletePost($id: ID!) { deletePost(id: $id) }",
                json!({"id": id}),
            )
            .await?;
        if data.delete_post {
            Ok(())
        } else {
            Err(ClientError::NotFound(format!("post {}", id)))
        }
    }

    /// Bumps the view counter and returns the new count.
    pub async fn increment_post_views(&self, slug: &str) -> Result<i64, ClientError> {
        let data: IncrementViewsData = self
            .execute(
                "incrementPostViews",
                "mutation IncrementPostViews($slug: String!) { incrementPostViews(slug: $slug) }",
                json!({"slug": slug}),
            )
            .await?;
        data.increment_post_views
            .ok_or_else(|| ClientError::NotFound(format!("post {}", slug)))
    }

    // -- categories ---------------------------------------------------------

    pub async fn categories(&self) -> Result<Vec<Category>, ClientError> {
        let query = format!("query Categories {{ categories {{ {CATEGORY_FIELDS} }} }}");
        let data: CategoriesData = self.execute("categories", &query, json!({})).await?;
        Ok(data.categories)
    }

    pub async fn create_category(&self, input: &CategoryInput) -> Result<Category, ClientError> {
        let query = format!(
            "mutation CreateCategory($input: CategoryInput!) {{ createCategory(input: $input) {{ {CATEGORY_FIELDS} }} }}"
        );
        let data: CreateCategoryData = self
            .execute("createCategory", &query, json!({"input": input}))
            .await?;
        Ok(data.create_category)
    }

    pub async fn update_category(
        &self,
        id: &str,
        input: &CategoryInput,
    ) -> Result<Category, ClientError> {
        let query = format!(
            "mutation UpdateCategory($id: ID!, $input: CategoryInput!) {{ updateCategory(id: $id, input: $input) {{ {CATEGORY_FIELDS} }} }}"
        );
        let data: UpdateCategoryData = self
            .execute("updateCategory", &query, json!({"id": id, "input": input}))
            .await?;
        data.update_category
            .ok_or_else(|| ClientError::NotFound(format!("category {}", id)))
    }

    pub async fn delete_category(&self, id: &str) -> Result<(), ClientError> {
        let data: DeleteCategoryData = self
            .execute(
                "deleteCategory",
                "mutation DeleteCategory($id: ID!) { deleteCategory(id: $id) }",
                json!({"id": id}),
            )
            .await?;
        if data.delete_category {
            Ok(())
        } else {
            Err(ClientError::NotFound(format!("category {}", id)))
        }
    }

    // -- users --------------------------------------------------------------

    pub async fn users(&self) -> Result<Vec<User>, ClientError> {
        let query = format!("query Users {{ users {{ {USER_FIELDS} }} }}");
        let data: UsersData = self.execute("users", &query, json!({})).await?;
        Ok(data.users)
    }

    pub async fn update_profile(&self, update: &ProfileUpdate) -> Result<User, ClientError> {
        let query = format!(
            "mutation UpdateProfile($input: ProfileInput!) {{ updateProfile(input: $input) {{ {USER_FIELDS} }} }}"
        );
        let data: UpdateProfileData = self
            .execute("updateProfile", &query, json!({"input": update}))
            .await?;
        Ok(data.update_profile)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_data() {
        let body = br#"{"data":{"posts":{"total":1,"items":[
            {"id":"p1","slug":"a","title":"A","createdAt":"2024-01-01T00:00:00Z"}]}}}"#;
        let data: PostsData = decode_envelope(body).unwrap();
        assert_eq!(data.posts.total, 1);
        assert_eq!(data.posts.items[0].slug, "a");
    }

    #[test]
    fn errors_win_over_partial_data() {
        let body = br#"{"data":{"post":null},"errors":[{"message":"forbidden"},{"message":"again"}]}"#;
        match decode_envelope::<PostData>(body) {
            Err(ClientError::Graphql(msgs)) => assert_eq!(msgs, vec!["forbidden", "again"]),
            other => panic!("unexpected: {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn empty_errors_array_is_success() {
        let body = br#"{"data":{"deletePost":true},"errors":[]}"#;
        let data: DeletePostData = decode_envelope(body).unwrap();
        assert!(data.delete_post);
    }

    #[test]
    fn missing_data_is_decode_error() {
        assert!(matches!(
            decode_envelope::<PostData>(b"{}"),
            Err(ClientError::Decode(_))
        ));
        assert!(matches!(
            decode_envelope::<PostData>(b"<html>"),
            Err(ClientError::Decode(_))
        ));
    }

    #[test]
    fn null_post_decodes_to_none() {
        let data: PostData = decode_envelope(br#"{"data":{"post":null}}"#).unwrap();
        assert!(data.post.is_none());
    }

    #[test]
    fn filter_omits_unset_fields() {
        let filter = PostFilter {
            tag: Some("rust".into()),
            status: Some(PostStatus::Published),
            ..Default::default()
        };
        assert_eq!(
            serde_json::to_value(&filter).unwrap(),
            json!({"tag": "rust", "status": "PUBLISHED"})
        );
    }

    #[test]
    fn rejects_bad_endpoint() {
        assert!(matches!(
            GraphqlClient::new("not a url", None),
            Err(ClientError::Config(_))
        ));
        assert!(matches!(
            GraphqlClient::new("ftp://api.example.com/graphql", None),
            Err(ClientError::Config(_))
        ));
        let client = GraphqlClient::new("https://api.example.com/graphql", Some(String::new())).unwrap();
        assert!(format!("{:?}", client).contains("token: None"));
    }
}
