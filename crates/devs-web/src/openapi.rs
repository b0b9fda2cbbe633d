//! OpenAPI documentation definition.

use devs_core::analytics::{
    AnalyticsSummary, ConnectionInfo, MetricEntry, MetricStats, Rating, RatingCounts, TimeRange,
};
use devs_core::api::service::{
    ApiPostList, EditorModeRequest, EditorModeResponse, ErrorBody, HealthResponse, IngestResponse,
    PublicConfig,
};
use devs_core::api::table::{ApiHeader, ApiPageInfo, ApiRow, ApiTableView};
use devs_core::content::{Author, Category, Post, PostStatus, Role, User};
use devs_core::editor::{EditorFlags, EditorMode};
use devs_core::prefs::{Preferences, Theme, VisualEffects};
use devs_core::validation::{CategoryInput, FieldError, PostDraft, ProfileUpdate};
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::handlers::handle_health,
        crate::handlers::handle_config,
        crate::handlers::handle_posts,
        crate::handlers::handle_post,
        crate::handlers::handle_categories,
        crate::handlers::handle_create_post,
        crate::handlers::handle_create_category,
        crate::handlers::handle_update_post,
        crate::handlers::handle_delete_post,
        crate::handlers::handle_update_category,
        crate::handlers::handle_delete_category,
        crate::handlers::handle_update_profile,
        crate::handlers::handle_table_view,
        crate::handlers::handle_table_action,
        crate::handlers::handle_get_preferences,
        crate::handlers::handle_put_preferences,
        crate::handlers::handle_put_editor_mode,
        crate::handlers::handle_ingest_analytics,
        crate::handlers::handle_analytics_summary,
    ),
    components(schemas(
        HealthResponse,
        PublicConfig,
        ErrorBody,
        FieldError,
        ApiPostList,
        Post,
        PostStatus,
        Author,
        Category,
        User,
        Role,
        PostDraft,
        CategoryInput,
        ProfileUpdate,
        ApiTableView,
        ApiHeader,
        ApiRow,
        ApiPageInfo,
        devs_core::table::ColumnKind,
        devs_core::table::Placement,
        devs_core::table::PinSide,
        devs_core::table::ShadowEdge,
        devs_core::table::SortDirection,
        devs_core::table::Density,
        devs_core::table::DragKind,
        devs_core::table::PageSelection,
        Preferences,
        Theme,
        VisualEffects,
        EditorMode,
        EditorFlags,
        EditorModeRequest,
        EditorModeResponse,
        IngestResponse,
        MetricEntry,
        ConnectionInfo,
        Rating,
        AnalyticsSummary,
        MetricStats,
        RatingCounts,
        TimeRange,
    )),
    info(
        title = "DEVS API",
        version = "1.0",
        description = "Content platform API: posts, categories, admin tables, preferences and web-vitals analytics"
    )
)]
pub(crate) struct ApiDoc;
