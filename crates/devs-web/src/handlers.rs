//! HTTP request handlers: public content API, admin tables, preferences, analytics.

use axum::body::Bytes;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::Json;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, info, warn};

use devs_core::VERSION;
use devs_core::analytics::{AnalyticsSummary, SummaryQuery, parse_payload};
use devs_core::api::service::{
    ApiPostList, EditorModeRequest, EditorModeResponse, HealthResponse, IngestResponse,
    PublicConfig,
};
use devs_core::api::table::{ApiTableView, convert};
use devs_core::client::PostFilter;
use devs_core::content::{Category, Post, PostStatus, User};
use devs_core::prefs::Preferences;
use devs_core::table::{ActionOutcome, TableAction, TableRow, TableState};
use devs_core::validation::{CategoryInput, PostDraft, ProfileUpdate};

use crate::error::ApiError;
use crate::state::{AppState, TableName, now_epoch_ms};

const DEFAULT_PAGE_SIZE: u32 = 10;
const MAX_PAGE_SIZE: u32 = 50;

// ============================================================
// Health & config
// ============================================================

#[utoipa::path(
    get,
    path = "/api/v1/health",
    responses(
        (status = 200, description = "Service is healthy", body = HealthResponse)
    )
)]
pub(crate) async fn handle_health(State(ctx): AppState) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: VERSION.to_string(),
        content_api: ctx.client.is_some(),
    })
}

#[utoipa::path(
    get,
    path = "/api/v1/config",
    responses(
        (status = 200, description = "Public site configuration", body = PublicConfig)
    )
)]
pub(crate) async fn handle_config(State(ctx): AppState) -> Json<PublicConfig> {
    Json(ctx.config.as_ref().clone())
}

// ============================================================
// Posts & categories (proxied to the content API)
// ============================================================

#[derive(Debug, Default, Deserialize, utoipa::IntoParams)]
#[into_params(parameter_in = Query)]
pub(crate) struct PostListQuery {
    /// Category slug.
    category: Option<String>,
    tag: Option<String>,
    /// Free-text search over titles and excerpts.
    search: Option<String>,
    /// 1-based page number (default 1).
    page: Option<u32>,
    /// Page size, 1..=50 (default 10).
    page_size: Option<u32>,
}

fn non_empty(s: Option<String>) -> Option<String> {
    s.map(|s| s.trim().to_string()).filter(|s| !s.is_empty())
}

#[utoipa::path(
    get,
    path = "/api/v1/posts",
    params(PostListQuery),
    responses(
        (status = 200, description = "One page of published posts", body = ApiPostList),
        (status = 502, description = "Content API error", body = devs_core::api::service::ErrorBody),
        (status = 503, description = "Content API not configured")
    )
)]
pub(crate) async fn handle_posts(
    State(ctx): AppState,
    Query(query): Query<PostListQuery>,
) -> Result<Json<ApiPostList>, ApiError> {
    let client = ctx.client()?;
    let page = query.page.unwrap_or(1).max(1);
    let page_size = query
        .page_size
        .unwrap_or(DEFAULT_PAGE_SIZE)
        .clamp(1, MAX_PAGE_SIZE);
    let filter = PostFilter {
        category: non_empty(query.category),
        tag: non_empty(query.tag),
        status: Some(PostStatus::Published),
        search: non_empty(query.search),
    };
    let result = client.posts(&filter, page, page_size).await?;
    Ok(Json(ApiPostList::new(result, page, page_size)))
}

#[utoipa::path(
    get,
    path = "/api/v1/posts/{slug}",
    params(("slug" = String, Path, description = "Post slug")),
    responses(
        (status = 200, description = "Post with its view count incremented", body = Post),
        (status = 404, description = "No post with this slug"),
        (status = 502, description = "Content API error")
    )
)]
pub(crate) async fn handle_post(
    State(ctx): AppState,
    Path(slug): Path<String>,
) -> Result<Json<Post>, ApiError> {
    let client = ctx.client()?;
    let mut post = client.post(&slug).await?;
    // View counting is best effort; the post is served either way.
    match client.increment_post_views(&slug).await {
        Ok(views) => post.views = views,
        Err(e) => warn!(slug = %slug, error = %e, "failed to increment views"),
    }
    Ok(Json(post))
}

#[utoipa::path(
    get,
    path = "/api/v1/categories",
    responses(
        (status = 200, description = "All categories", body = Vec<Category>),
        (status = 502, description = "Content API error")
    )
)]
pub(crate) async fn handle_categories(
    State(ctx): AppState,
) -> Result<Json<Vec<Category>>, ApiError> {
    let categories = ctx.client()?.categories().await?;
    Ok(Json(categories))
}

#[utoipa::path(
    post,
    path = "/api/v1/admin/posts",
    request_body = PostDraft,
    responses(
        (status = 201, description = "Post created", body = Post),
        (status = 401, description = "Missing or invalid credentials"),
        (status = 422, description = "Validation failed", body = devs_core::api::service::ErrorBody),
        (status = 502, description = "Content API error")
    )
)]
pub(crate) async fn handle_create_post(
    State(ctx): AppState,
    Json(draft): Json<PostDraft>,
) -> Result<(StatusCode, Json<Post>), ApiError> {
    let draft = draft.validate()?;
    let post = ctx.client()?.create_post(&draft).await?;
    info!(id = %post.id, slug = %post.slug, status = post.status.as_str(), "post created");
    Ok((StatusCode::CREATED, Json(post)))
}

#[utoipa::path(
    post,
    path = "/api/v1/admin/categories",
    request_body = CategoryInput,
    responses(
        (status = 201, description = "Category created", body = Category),
        (status = 401, description = "Missing or invalid credentials"),
        (status = 422, description = "Validation failed", body = devs_core::api::service::ErrorBody),
        (status = 502, description = "Content API error")
    )
)]
pub(crate) async fn handle_create_category(
    State(ctx): AppState,
    Json(input): Json<CategoryInput>,
) -> Result<(StatusCode, Json<Category>), ApiError> {
    let input = input.validate()?;
    let category = ctx.client()?.create_category(&input).await?;
    info!(id = %category.id, slug = %category.slug, "category created");
    Ok((StatusCode::CREATED, Json(category)))
}

#[utoipa::path(
    put,
    path = "/api/v1/admin/posts/{id}",
    params(("id" = String, Path, description = "Post id")),
    request_body = PostDraft,
    responses(
        (status = 200, description = "Post updated", body = Post),
        (status = 404, description = "No post with this id"),
        (status = 422, description = "Validation failed", body = devs_core::api::service::ErrorBody),
        (status = 502, description = "Content API error")
    )
)]
pub(crate) async fn handle_update_post(
    State(ctx): AppState,
    Path(id): Path<String>,
    Json(draft): Json<PostDraft>,
) -> Result<Json<Post>, ApiError> {
    let draft = draft.validate()?;
    let post = ctx.client()?.update_post(&id, &draft).await?;
    info!(id = %post.id, slug = %post.slug, status = post.status.as_str(), "post updated");
    Ok(Json(post))
}

#[utoipa::path(
    delete,
    path = "/api/v1/admin/posts/{id}",
    params(("id" = String, Path, description = "Post id")),
    responses(
        (status = 204, description = "Post deleted"),
        (status = 404, description = "No post with this id"),
        (status = 502, description = "Content API error")
    )
)]
pub(crate) async fn handle_delete_post(
    State(ctx): AppState,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    ctx.client()?.delete_post(&id).await?;
    info!(id = %id, "post deleted");
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    put,
    path = "/api/v1/admin/categories/{id}",
    params(("id" = String, Path, description = "Category id")),
    request_body = CategoryInput,
    responses(
        (status = 200, description = "Category updated", body = Category),
        (status = 404, description = "No category with this id"),
        (status = 422, description = "Validation failed", body = devs_core::api::service::ErrorBody),
        (status = 502, description = "Content API error")
    )
)]
pub(crate) async fn handle_update_category(
    State(ctx): AppState,
    Path(id): Path<String>,
    Json(input): Json<CategoryInput>,
) -> Result<Json<Category>, ApiError> {
    let input = input.validate()?;
    let category = ctx.client()?.update_category(&id, &input).await?;
    info!(id = %category.id, slug = %category.slug, "category updated");
    Ok(Json(category))
}

#[utoipa::path(
    delete,
    path = "/api/v1/admin/categories/{id}",
    params(("id" = String, Path, description = "Category id")),
    responses(
        (status = 204, description = "Category deleted"),
        (status = 404, description = "No category with this id"),
        (status = 502, description = "Content API error")
    )
)]
pub(crate) async fn handle_delete_category(
    State(ctx): AppState,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    ctx.client()?.delete_category(&id).await?;
    info!(id = %id, "category deleted");
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    put,
    path = "/api/v1/admin/profile",
    request_body = ProfileUpdate,
    responses(
        (status = 200, description = "Profile updated", body = User),
        (status = 422, description = "Validation failed", body = devs_core::api::service::ErrorBody),
        (status = 502, description = "Content API error")
    )
)]
pub(crate) async fn handle_update_profile(
    State(ctx): AppState,
    Json(update): Json<ProfileUpdate>,
) -> Result<Json<User>, ApiError> {
    let update = update.validate()?;
    let user = ctx.client()?.update_profile(&update).await?;
    info!(id = %user.id, "profile updated");
    Ok(Json(user))
}

// ============================================================
// Admin tables
// ============================================================

/// Parses and applies one gesture, returning the refreshed projection.
/// Decodes a JSON body whatever its content type; failures become a 400 `ErrorBody`.
fn parse_json<T: DeserializeOwned>(body: &[u8]) -> Result<T, ApiError> {
    serde_json::from_slice(body).map_err(|e| ApiError::BadRequest(e.to_string()))
}

fn apply_action<T: TableRow<Key = String>>(
    table_name: TableName,
    table: &mut TableState<T>,
    action: TableAction<String>,
) -> Result<ApiTableView, ApiError> {
    debug!(table = %table_name, action = ?action, "table action");
    match table.apply(action)? {
        ActionOutcome::RowsReordered(rows) => {
            info!(table = %table_name, rows = rows.len(), "manual row order changed");
        }
        ActionOutcome::Changed | ActionOutcome::Unchanged => {}
    }
    Ok(convert(table_name.as_str(), table.view()))
}

#[utoipa::path(
    get,
    path = "/api/v1/admin/tables/{table}",
    params(("table" = String, Path, description = "posts | users")),
    responses(
        (status = 200, description = "Current page of the table", body = ApiTableView),
        (status = 401, description = "Missing or invalid credentials"),
        (status = 404, description = "Unknown table")
    )
)]
pub(crate) async fn handle_table_view(
    State(ctx): AppState,
    Path(table): Path<String>,
) -> Result<Json<ApiTableView>, ApiError> {
    let name: TableName = table.parse()?;
    let inner = ctx.lock();
    let view = match name {
        TableName::Posts => convert(name.as_str(), inner.posts.view()),
        TableName::Users => convert(name.as_str(), inner.users.view()),
    };
    Ok(Json(view))
}

#[utoipa::path(
    post,
    path = "/api/v1/admin/tables/{table}/actions",
    params(("table" = String, Path, description = "posts | users")),
    request_body(
        content = Object,
        description = "Table gesture, e.g. {\"type\": \"toggle_sort\", \"column\": \"views\", \"multi\": false}"
    ),
    responses(
        (status = 200, description = "Table after the gesture", body = ApiTableView),
        (status = 400, description = "Malformed gesture"),
        (status = 401, description = "Missing or invalid credentials"),
        (status = 404, description = "Unknown table"),
        (status = 409, description = "Gesture conflicts with the table state", body = devs_core::api::service::ErrorBody)
    )
)]
pub(crate) async fn handle_table_action(
    State(ctx): AppState,
    Path(table): Path<String>,
    body: Bytes,
) -> Result<Json<ApiTableView>, ApiError> {
    let name: TableName = table.parse()?;
    let action: TableAction<String> = parse_json(&body)?;
    let mut inner = ctx.lock();
    let view = match name {
        TableName::Posts => apply_action(name, &mut inner.posts, action)?,
        TableName::Users => apply_action(name, &mut inner.users, action)?,
    };
    Ok(Json(view))
}

// ============================================================
// Preferences
// ============================================================

#[utoipa::path(
    get,
    path = "/api/v1/preferences",
    responses(
        (status = 200, description = "Current UI preferences", body = Preferences)
    )
)]
pub(crate) async fn handle_get_preferences(State(ctx): AppState) -> Json<Preferences> {
    Json(ctx.lock().prefs.get().clone())
}

#[utoipa::path(
    put,
    path = "/api/v1/preferences",
    request_body = Preferences,
    responses(
        (status = 200, description = "Saved preferences (normalized)", body = Preferences),
        (status = 500, description = "Preferences could not be written")
    )
)]
pub(crate) async fn handle_put_preferences(
    State(ctx): AppState,
    Json(prefs): Json<Preferences>,
) -> Result<Json<Preferences>, ApiError> {
    let mut inner = ctx.lock();
    let saved = inner.prefs.replace(prefs)?.clone();
    Ok(Json(saved))
}

#[utoipa::path(
    put,
    path = "/api/v1/preferences/editor-mode",
    request_body = EditorModeRequest,
    responses(
        (status = 200, description = "Flags to push to the editor", body = EditorModeResponse),
        (status = 500, description = "Preferences could not be written")
    )
)]
pub(crate) async fn handle_put_editor_mode(
    State(ctx): AppState,
    Json(req): Json<EditorModeRequest>,
) -> Result<Json<EditorModeResponse>, ApiError> {
    let mut inner = ctx.lock();
    inner.prefs.update(|p| p.editor_mode = req.mode)?;
    debug!(mode = %req.mode, "editor mode switched");
    Ok(Json(EditorModeResponse::from(req.mode)))
}

// ============================================================
// Analytics
// ============================================================

#[utoipa::path(
    post,
    path = "/api/analytics",
    request_body(
        content = Object,
        description = "A single metric or {\"metrics\": [...]}"
    ),
    responses(
        (status = 200, description = "Metrics accepted", body = IngestResponse),
        (status = 400, description = "Body is not JSON")
    )
)]
pub(crate) async fn handle_ingest_analytics(
    State(ctx): AppState,
    body: Bytes,
) -> Result<Json<IngestResponse>, ApiError> {
    // Beacons arrive as text/plain, so the body is parsed regardless of content type.
    let body: Value = parse_json(&body)?;
    let (entries, dropped) = parse_payload(&body, now_epoch_ms());
    if dropped > 0 {
        debug!(dropped, "malformed metrics dropped");
    }
    let processed = ctx.lock().analytics.ingest(entries);
    Ok(Json(IngestResponse {
        success: true,
        processed,
    }))
}

#[utoipa::path(
    get,
    path = "/api/analytics",
    params(SummaryQuery),
    responses(
        (status = 200, description = "Aggregated web-vitals statistics", body = AnalyticsSummary)
    )
)]
pub(crate) async fn handle_analytics_summary(
    State(ctx): AppState,
    Query(query): Query<SummaryQuery>,
) -> Json<AnalyticsSummary> {
    Json(ctx.lock().analytics.summary(&query))
}

#[cfg(test)]
mod tests {
    use std::path::Path as FsPath;
    use std::sync::{Arc, Mutex};

    use axum::Router;
    use axum::body::{Body, to_bytes};
    use axum::http::{Request, header};
    use base64::Engine;
    use chrono::TimeZone;
    use serde_json::json;
    use tower::ServiceExt;

    use devs_core::content::Author;
    use devs_core::prefs::PreferenceStore;

    use super::*;
    use crate::state::{AppContext, WebAppInner};

    fn context(dir: &FsPath) -> AppContext {
        let prefs = PreferenceStore::load(dir.join("prefs.json"));
        AppContext {
            state: Arc::new(Mutex::new(WebAppInner::new(prefs, 100))),
            client: None,
            config: Arc::new(PublicConfig {
                base_url: "https://devs.example.com".into(),
                analytics_id: Some("G-TEST".into()),
                upload_cloud_name: None,
                upload_preset: None,
            }),
        }
    }

    fn seed_posts(ctx: &AppContext, n: usize) {
        let posts = (0..n)
            .map(|i| Post {
                id: format!("p{i:02}"),
                slug: format!("post-{i}"),
                title: format!("Post {i}"),
                excerpt: None,
                content: String::new(),
                cover_image: None,
                status: PostStatus::Published,
                tags: vec![],
                category: None,
                author: Some(Author {
                    id: "u1".into(),
                    name: "Ada".into(),
                    avatar: None,
                }),
                views: (i as i64 * 7) % 5,
                created_at: chrono::Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
                published_at: None,
                updated_at: None,
            })
            .collect();
        ctx.lock().posts.set_data(posts);
    }

    async fn send(app: Router, req: Request<Body>) -> (StatusCode, Value) {
        let response = app.oneshot(req).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, body)
    }

    fn get(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    fn json_req(method: &str, uri: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn health_and_config() {
        let dir = tempfile::tempdir().unwrap();
        let app = crate::build_router(context(dir.path()), None);

        let (status, body) = send(app.clone(), get("/api/v1/health")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
        assert_eq!(body["content_api"], false);

        let (_, body) = send(app, get("/api/v1/config")).await;
        assert_eq!(body["base_url"], "https://devs.example.com");
        assert_eq!(body["analytics_id"], "G-TEST");
        assert!(body.get("upload_preset").is_none());
    }

    #[tokio::test]
    async fn content_routes_need_a_client() {
        let dir = tempfile::tempdir().unwrap();
        let app = crate::build_router(context(dir.path()), None);
        let (status, _) = send(app, get("/api/v1/posts?page=2")).await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    }

    #[tokio::test]
    async fn invalid_draft_is_rejected_before_any_call() {
        let dir = tempfile::tempdir().unwrap();
        let app = crate::build_router(context(dir.path()), None);
        let (status, body) = send(
            app,
            json_req(
                "POST",
                "/api/v1/admin/posts",
                json!({"title": "x", "status": "PUBLISHED", "coverImage": "http://a/b.png"}),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        let fields: Vec<&str> = body["fields"]
            .as_array()
            .unwrap()
            .iter()
            .map(|f| f["field"].as_str().unwrap())
            .collect();
        assert_eq!(fields, vec!["title", "content", "coverImage", "categoryId"]);
    }

    #[tokio::test]
    async fn profile_update_is_validated() {
        let dir = tempfile::tempdir().unwrap();
        let app = crate::build_router(context(dir.path()), None);
        let (status, body) = send(
            app.clone(),
            json_req("PUT", "/api/v1/admin/profile", json!({"name": "A", "website": "ftp://x"})),
        )
        .await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["fields"][0]["field"], "name");
        assert_eq!(body["fields"][1]["field"], "website");

        let (status, _) = send(
            app,
            json_req("PUT", "/api/v1/admin/profile", json!({"name": "Ada"})),
        )
        .await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    }

    #[tokio::test]
    async fn table_view_and_actions() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = context(dir.path());
        seed_posts(&ctx, 23);
        let app = crate::build_router(ctx, None);

        let (status, body) = send(app.clone(), get("/api/v1/admin/tables/posts")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["page"]["page_count"], 3);
        assert_eq!(body["rows"].as_array().unwrap().len(), 10);
        assert_eq!(body["search_column"], "title");

        let (status, body) = send(
            app.clone(),
            json_req(
                "POST",
                "/api/v1/admin/tables/posts/actions",
                json!({"type": "set_page", "index": 2}),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["rows"].as_array().unwrap().len(), 3);

        let (_, body) = send(
            app.clone(),
            json_req(
                "POST",
                "/api/v1/admin/tables/posts/actions",
                json!({"type": "toggle_sort", "column": "views"}),
            ),
        )
        .await;
        assert_eq!(body["rows_draggable"], false);

        let (status, body) = send(
            app.clone(),
            json_req(
                "POST",
                "/api/v1/admin/tables/posts/actions",
                json!({"type": "move_row", "active": "p01", "over": "p02"}),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert!(body["error"].as_str().unwrap().contains("sorted"));

        let (status, _) = send(
            app.clone(),
            json_req(
                "POST",
                "/api/v1/admin/tables/posts/actions",
                json!({"type": "explode"}),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let req = Request::builder()
            .method("POST")
            .uri("/api/v1/admin/tables/posts/actions")
            .header(header::CONTENT_TYPE, "text/plain")
            .body(Body::from("not json"))
            .unwrap();
        let (status, body) = send(app.clone(), req).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].is_string());

        let (status, _) = send(app, get("/api/v1/admin/tables/comments")).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn admin_routes_require_credentials_when_configured() {
        let dir = tempfile::tempdir().unwrap();
        let creds = Arc::new(("admin".to_string(), "pw".to_string()));
        let app = crate::build_router(context(dir.path()), Some(creds));

        let (status, _) = send(app.clone(), get("/api/v1/admin/tables/users")).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        let token = base64::engine::general_purpose::STANDARD.encode("admin:pw");
        let req = Request::builder()
            .uri("/api/v1/admin/tables/users")
            .header(header::AUTHORIZATION, format!("Basic {token}"))
            .body(Body::empty())
            .unwrap();
        let (status, body) = send(app.clone(), req).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["table"], "users");

        let (status, _) = send(app, get("/api/v1/health")).await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn preferences_write_through() {
        let dir = tempfile::tempdir().unwrap();
        let app = crate::build_router(context(dir.path()), None);

        let (status, body) = send(
            app.clone(),
            json_req(
                "PUT",
                "/api/v1/preferences/editor-mode",
                json!({"mode": "suggestion"}),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["flags"]["readOnly"], false);
        assert_eq!(body["flags"]["suggesting"], true);

        let (_, body) = send(
            app.clone(),
            json_req(
                "PUT",
                "/api/v1/preferences",
                json!({"theme": "dark", "editorMode": "viewing"}),
            ),
        )
        .await;
        assert_eq!(body["theme"], "dark");
        assert_eq!(body["sidebarCollapsed"], false);

        let reloaded = PreferenceStore::load(dir.path().join("prefs.json"));
        assert_eq!(
            reloaded.get().editor_mode,
            devs_core::editor::EditorMode::Viewing
        );

        let (_, body) = send(app, get("/api/v1/preferences")).await;
        assert_eq!(body["editorMode"], "viewing");
    }

    #[tokio::test]
    async fn analytics_ingest_and_summary() {
        let dir = tempfile::tempdir().unwrap();
        let app = crate::build_router(context(dir.path()), None);

        let (status, body) = send(
            app.clone(),
            json_req(
                "POST",
                "/api/analytics",
                json!({"metrics": [
                    {"name": "LCP", "value": 1800, "path": "/"},
                    {"name": "LCP", "value": 4200, "path": "/"},
                    {"name": "CLS"},
                ]}),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({"success": true, "processed": 2}));

        let (_, body) = send(
            app.clone(),
            json_req("POST", "/api/analytics", json!({"name": "FID", "value": 50})),
        )
        .await;
        assert_eq!(body["processed"], 1);

        let beacon = Request::builder()
            .method("POST")
            .uri("/api/analytics")
            .header(header::CONTENT_TYPE, "text/plain;charset=UTF-8")
            .body(Body::from(r#"{"name":"TTFB","value":120}"#))
            .unwrap();
        let (_, body) = send(app.clone(), beacon).await;
        assert_eq!(body["processed"], 1);

        let (status, _) = send(
            app.clone(),
            Request::builder()
                .method("POST")
                .uri("/api/analytics")
                .body(Body::from("not json"))
                .unwrap(),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, body) = send(app, get("/api/analytics?path=/&metric=LCP")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["total"], 2);
        assert_eq!(body["metrics"]["LCP"]["ratings"]["good"], 1);
        assert_eq!(body["metrics"]["LCP"]["ratings"]["poor"], 1);
        assert_eq!(body["metrics"]["LCP"]["avg"], 3000.0);
    }
}
