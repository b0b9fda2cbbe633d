//! Content records (posts, categories, users) and their admin table rows.
//!
//! Field names follow the external GraphQL API (camelCase on the wire).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::fmt::{FmtStyle, format_count, normalize_for_display, reading_minutes, truncate};
use crate::table::{CellValue, ColumnDef, ColumnKind, TableRow};

/// Characters of body text shown in an expanded post row.
const DETAIL_PREVIEW_CHARS: usize = 280;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[cfg_attr(feature = "api", derive(utoipa::ToSchema))]
pub enum PostStatus {
    #[default]
    Draft,
    Published,
    Archived,
}

impl PostStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            PostStatus::Draft => "draft",
            PostStatus::Published => "published",
            PostStatus::Archived => "archived",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[cfg_attr(feature = "api", derive(utoipa::ToSchema))]
pub enum Role {
    #[default]
    Reader,
    Author,
    Admin,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Role::Reader => "reader",
            Role::Author => "author",
            Role::Admin => "admin",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "api", derive(utoipa::ToSchema))]
pub struct Author {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub avatar: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "api", derive(utoipa::ToSchema))]
pub struct Category {
    pub id: String,
    pub name: String,
    pub slug: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub post_count: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "api", derive(utoipa::ToSchema))]
pub struct Post {
    pub id: String,
    pub slug: String,
    pub title: String,
    #[serde(default)]
    pub excerpt: Option<String>,
    /// Rich-text body (HTML).
    #[serde(default)]
    pub content: String,
    /// Secure URL returned by the upload widget.
    #[serde(default)]
    pub cover_image: Option<String>,
    #[serde(default)]
    pub status: PostStatus,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub category: Option<Category>,
    #[serde(default)]
    pub author: Option<Author>,
    #[serde(default)]
    pub views: i64,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub published_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Post {
    pub fn reading_minutes(&self) -> u32 {
        reading_minutes(&plain_text(&self.content))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "api", derive(utoipa::ToSchema))]
pub struct User {
    pub id: String,
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub role: Role,
    #[serde(default)]
    pub avatar: Option<String>,
    #[serde(default)]
    pub bio: Option<String>,
    #[serde(default)]
    pub post_count: i64,
    pub created_at: DateTime<Utc>,
}

/// One page of posts plus the unpaged total.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "api", derive(utoipa::ToSchema))]
pub struct PostPage {
    pub items: Vec<Post>,
    pub total: i64,
}

/// Strips markup tags and collapses whitespace.
pub fn plain_text(html: &str) -> String {
    let mut out = String::with_capacity(html.len());
    let mut in_tag = false;
    for ch in html.chars() {
        match ch {
            '<' => in_tag = true,
            '>' if in_tag => {
                in_tag = false;
                out.push(' ');
            }
            _ if !in_tag => out.push(ch),
            _ => {}
        }
    }
    normalize_for_display(&out)
}

// ----------------------------------------------------------------------------
// Admin table rows
// ----------------------------------------------------------------------------

pub fn post_columns() -> Vec<ColumnDef> {
    vec![
        ColumnDef::new("title", "Title", ColumnKind::Text)
            .width(280)
            .searchable()
            .always_visible(),
        ColumnDef::new("status", "Status", ColumnKind::Status),
        ColumnDef::new("category", "Category", ColumnKind::Text).width(160),
        ColumnDef::new("author", "Author", ColumnKind::Text).width(160),
        ColumnDef::new("views", "Views", ColumnKind::Number),
        ColumnDef::new("published", "Published", ColumnKind::Date),
        ColumnDef::new("tags", "Tags", ColumnKind::Tags).unsortable(),
    ]
}

impl TableRow for Post {
    type Key = String;

    fn key(&self) -> String {
        self.id.clone()
    }

    fn cell(&self, column: &str) -> CellValue {
        match column {
            "title" => CellValue::text(&self.title),
            "status" => CellValue::text(self.status.as_str()),
            "category" => self
                .category
                .as_ref()
                .map(|c| CellValue::text(&c.name))
                .unwrap_or(CellValue::Empty),
            "author" => self
                .author
                .as_ref()
                .map(|a| CellValue::text(&a.name))
                .unwrap_or(CellValue::Empty),
            "views" => CellValue::Integer(self.views),
            "published" => CellValue::opt_date(self.published_at),
            "tags" => CellValue::Tags(self.tags.clone()),
            _ => CellValue::Empty,
        }
    }

    fn detail(&self) -> Option<String> {
        let body = match self.excerpt.as_deref().map(str::trim) {
            Some(e) if !e.is_empty() => normalize_for_display(e),
            _ => plain_text(&self.content),
        };
        if body.is_empty() {
            return None;
        }
        Some(format!(
            "{} ({} min read, {} views)",
            truncate(&body, DETAIL_PREVIEW_CHARS),
            self.reading_minutes(),
            format_count(self.views, FmtStyle::Detail)
        ))
    }
}

pub fn user_columns() -> Vec<ColumnDef> {
    vec![
        ColumnDef::new("name", "Name", ColumnKind::Text)
            .width(200)
            .searchable()
            .always_visible(),
        ColumnDef::new("email", "Email", ColumnKind::Text),
        ColumnDef::new("role", "Role", ColumnKind::Status),
        ColumnDef::new("posts", "Posts", ColumnKind::Number),
        ColumnDef::new("joined", "Joined", ColumnKind::Date),
    ]
}

impl TableRow for User {
    type Key = String;

    fn key(&self) -> String {
        self.id.clone()
    }

    fn cell(&self, column: &str) -> CellValue {
        match column {
            "name" => CellValue::text(&self.name),
            "email" => CellValue::text(&self.email),
            "role" => CellValue::text(self.role.as_str()),
            "posts" => CellValue::Integer(self.post_count),
            "joined" => CellValue::Date(self.created_at),
            _ => CellValue::Empty,
        }
    }

    fn detail(&self) -> Option<String> {
        self.bio
            .as_deref()
            .map(normalize_for_display)
            .filter(|b| !b.is_empty())
    }
}
