//! Request and response bodies of the devs-web service.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::content::{Post, PostPage};
use crate::editor::{EditorFlags, EditorMode};
use crate::validation::FieldError;

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct HealthResponse {
    pub status: String,
    /// Server version including git SHA (e.g. "0.1.0-abc1234").
    pub version: String,
    /// Whether an external content API is configured.
    pub content_api: bool,
}

/// Configuration values safe to expose to browsers.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct PublicConfig {
    pub base_url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub analytics_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub upload_cloud_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub upload_preset: Option<String>,
}

/// One page of the public post listing.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ApiPostList {
    pub items: Vec<Post>,
    pub total: i64,
    pub page: u32,
    pub page_size: u32,
    pub page_count: u32,
}

impl ApiPostList {
    pub fn new(result: PostPage, page: u32, page_size: u32) -> Self {
        let total = result.total.max(0) as u64;
        let page_count = if page_size == 0 {
            0
        } else {
            total.div_ceil(page_size as u64) as u32
        };
        Self {
            items: result.items,
            total: result.total,
            page,
            page_size,
            page_count,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct IngestResponse {
    pub success: bool,
    /// Number of accepted metrics.
    pub processed: usize,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct EditorModeRequest {
    pub mode: EditorMode,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct EditorModeResponse {
    pub mode: EditorMode,
    pub label: String,
    pub flags: EditorFlags,
    /// Whether comments and track changes are loaded in this mode.
    pub collaborative: bool,
}

impl From<EditorMode> for EditorModeResponse {
    fn from(mode: EditorMode) -> Self {
        Self {
            mode,
            label: mode.label().to_string(),
            flags: mode.flags(),
            collaborative: mode.collaborative(),
        }
    }
}

/// Error body for all non-2xx responses.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ErrorBody {
    pub error: String,
    /// Failing fields (validation errors only).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fields: Option<Vec<FieldError>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn post_list_page_count() {
        let list = ApiPostList::new(
            PostPage {
                items: vec![],
                total: 23,
            },
            0,
            10,
        );
        assert_eq!(list.page_count, 3);
        let empty = ApiPostList::new(
            PostPage {
                items: vec![],
                total: 0,
            },
            0,
            10,
        );
        assert_eq!(empty.page_count, 0);
    }

    #[test]
    fn editor_mode_response_carries_flags() {
        let r = EditorModeResponse::from(EditorMode::Viewing);
        let json = serde_json::to_value(&r).unwrap();
        assert_eq!(json["mode"], "viewing");
        assert_eq!(json["flags"]["readOnly"], true);
        assert_eq!(json["flags"]["suggesting"], false);
        assert_eq!(json["collaborative"], true);
    }
}
