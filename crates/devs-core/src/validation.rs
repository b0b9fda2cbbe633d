//! Form validation for the authoring, category and profile forms.
//!
//! Each `validate` call checks every field and reports all failures at once,
//! returning the normalized input on success (trimmed text, derived slug, cleaned tags).

use std::fmt;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::content::{PostStatus, plain_text};
use crate::fmt::slugify;

pub const TITLE_MIN: usize = 3;
pub const TITLE_MAX: usize = 120;
pub const EXCERPT_MAX: usize = 300;
pub const MAX_TAGS: usize = 10;
pub const TAG_MAX: usize = 30;
pub const CATEGORY_NAME_MIN: usize = 2;
pub const CATEGORY_NAME_MAX: usize = 50;
pub const DESCRIPTION_MAX: usize = 500;
pub const PROFILE_NAME_MIN: usize = 2;
pub const PROFILE_NAME_MAX: usize = 60;
pub const BIO_MAX: usize = 500;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[cfg_attr(feature = "api", derive(utoipa::ToSchema))]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

/// All failing fields of one form submission.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[cfg_attr(feature = "api", derive(utoipa::ToSchema))]
pub struct ValidationErrors {
    pub errors: Vec<FieldError>,
}

impl ValidationErrors {
    pub fn push(&mut self, field: &str, message: impl Into<String>) {
        self.errors.push(FieldError {
            field: field.to_string(),
            message: message.into(),
        });
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn fields(&self) -> Vec<&str> {
        self.errors.iter().map(|e| e.field.as_str()).collect()
    }

    fn into_result<T>(self, value: T) -> Result<T, ValidationErrors> {
        if self.is_empty() { Ok(value) } else { Err(self) }
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "validation failed")?;
        for (i, e) in self.errors.iter().enumerate() {
            let sep = if i == 0 { ": " } else { "; " };
            write!(f, "{}{}: {}", sep, e.field, e.message)?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationErrors {}

// ----------------------------------------------------------------------------
// Field helpers
// ----------------------------------------------------------------------------

fn check_length(errs: &mut ValidationErrors, field: &str, value: &str, min: usize, max: usize) {
    let n = value.chars().count();
    if n < min {
        if min == 1 {
            errs.push(field, "is required");
        } else {
            errs.push(field, format!("must be at least {} characters", min));
        }
    } else if n > max {
        errs.push(field, format!("must be at most {} characters", max));
    }
}

fn check_url(errs: &mut ValidationErrors, field: &str, value: &str, allow_http: bool) {
    match Url::parse(value) {
        Ok(u) if u.scheme() == "https" || (allow_http && u.scheme() == "http") => {
            if u.host_str().is_none_or(str::is_empty) {
                errs.push(field, "must include a host");
            }
        }
        Ok(_) if allow_http => errs.push(field, "must be an http(s) URL"),
        Ok(_) => errs.push(field, "must be an https URL"),
        Err(e) => errs.push(field, format!("invalid URL: {}", e)),
    }
}

/// Trims and turns blank strings into `None`.
fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

/// Normalizes an explicit slug or derives one from `source`.
fn resolve_slug(errs: &mut ValidationErrors, slug: Option<String>, source: &str) -> String {
    match non_blank(slug) {
        Some(s) => {
            if slugify(&s) != s {
                errs.push("slug", "may only contain lowercase letters, digits and dashes");
            }
            s
        }
        None => {
            let derived = slugify(source);
            if derived.is_empty() && !source.trim().is_empty() {
                errs.push("slug", "cannot be derived; provide one explicitly");
            }
            derived
        }
    }
}

// ----------------------------------------------------------------------------
// Forms
// ----------------------------------------------------------------------------

/// Authoring form.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
#[cfg_attr(feature = "api", derive(utoipa::ToSchema))]
pub struct PostDraft {
    pub title: String,
    pub slug: Option<String>,
    pub excerpt: Option<String>,
    /// Rich-text body (HTML).
    pub content: String,
    pub cover_image: Option<String>,
    pub status: PostStatus,
    pub tags: Vec<String>,
    pub category_id: Option<String>,
}

impl PostDraft {
    /// Drafts only need a title; publishing also requires a body and a category.
    pub fn validate(self) -> Result<PostDraft, ValidationErrors> {
        let mut errs = ValidationErrors::default();

        let title = self.title.trim().to_string();
        check_length(&mut errs, "title", &title, TITLE_MIN, TITLE_MAX);
        let slug = resolve_slug(&mut errs, self.slug, &title);
        if slug.chars().count() > TITLE_MAX {
            errs.push("slug", format!("must be at most {} characters", TITLE_MAX));
        }

        let excerpt = non_blank(self.excerpt);
        if let Some(e) = &excerpt {
            check_length(&mut errs, "excerpt", e, 1, EXCERPT_MAX);
        }

        let published = self.status == PostStatus::Published;
        if published && plain_text(&self.content).is_empty() {
            errs.push("content", "is required to publish");
        }

        let cover_image = non_blank(self.cover_image);
        if let Some(url) = &cover_image {
            check_url(&mut errs, "coverImage", url, false);
        }

        let tags = normalize_tags(&mut errs, self.tags);

        let category_id = non_blank(self.category_id);
        if published && category_id.is_none() {
            errs.push("categoryId", "is required to publish");
        }

        errs.into_result(PostDraft {
            title,
            slug: Some(slug),
            excerpt,
            content: self.content,
            cover_image,
            status: self.status,
            tags,
            category_id,
        })
    }
}

/// Lowercases, trims and dedups tags, keeping first-seen order.
fn normalize_tags(errs: &mut ValidationErrors, tags: Vec<String>) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(tags.len());
    for tag in tags {
        let tag = tag.trim().to_lowercase();
        if tag.is_empty() || out.contains(&tag) {
            continue;
        }
        if tag.chars().count() > TAG_MAX {
            errs.push("tags", format!("tag \"{}\" exceeds {} characters", tag, TAG_MAX));
            continue;
        }
        out.push(tag);
    }
    if out.len() > MAX_TAGS {
        errs.push("tags", format!("at most {} tags allowed", MAX_TAGS));
    }
    out
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
#[cfg_attr(feature = "api", derive(utoipa::ToSchema))]
pub struct CategoryInput {
    pub name: String,
    pub slug: Option<String>,
    pub description: Option<String>,
}

impl CategoryInput {
    pub fn validate(self) -> Result<CategoryInput, ValidationErrors> {
        let mut errs = ValidationErrors::default();
        let name = self.name.trim().to_string();
        check_length(&mut errs, "name", &name, CATEGORY_NAME_MIN, CATEGORY_NAME_MAX);
        let slug = resolve_slug(&mut errs, self.slug, &name);
        let description = non_blank(self.description);
        if let Some(d) = &description {
            check_length(&mut errs, "description", d, 1, DESCRIPTION_MAX);
        }
        errs.into_result(CategoryInput {
            name,
            slug: Some(slug),
            description,
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
#[cfg_attr(feature = "api", derive(utoipa::ToSchema))]
pub struct ProfileUpdate {
    pub name: String,
    pub bio: Option<String>,
    /// Secure URL returned by the upload widget.
    pub avatar: Option<String>,
    pub website: Option<String>,
}

impl ProfileUpdate {
    pub fn validate(self) -> Result<ProfileUpdate, ValidationErrors> {
        let mut errs = ValidationErrors::default();
        let name = self.name.trim().to_string();
        check_length(&mut errs, "name", &name, PROFILE_NAME_MIN, PROFILE_NAME_MAX);
        let bio = non_blank(self.bio);
        if let Some(b) = &bio {
            check_length(&mut errs, "bio", b, 1, BIO_MAX);
        }
        let avatar = non_blank(self.avatar);
        if let Some(a) = &avatar {
            check_url(&mut errs, "avatar", a, false);
        }
        let website = non_blank(self.website);
        if let Some(w) = &website {
            check_url(&mut errs, "website", w, true);
        }
        errs.into_result(ProfileUpdate {
            name,
            bio,
            avatar,
            website,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn draft_derives_slug_and_cleans_tags() {
        let draft = PostDraft {
            title: "  Hello, Rust World!  ".into(),
            tags: vec!["Rust".into(), " rust ".into(), "".into(), "Web".into()],
            cover_image: Some("   ".into()),
            ..Default::default()
        };
        let ok = draft.validate().unwrap();
        assert_eq!(ok.title, "Hello, Rust World!");
        assert_eq!(ok.slug.as_deref(), Some("hello-rust-world"));
        assert_eq!(ok.tags, vec!["rust", "web"]);
        assert_eq!(ok.cover_image, None);
    }

    #[test]
    fn reports_every_failing_field() {
        let draft = PostDraft {
            title: "Hi".into(),
            slug: Some("Bad Slug".into()),
            content: "<p> </p>".into(),
            cover_image: Some("http://cdn.example.com/a.png".into()),
            status: PostStatus::Published,
            tags: (0..12).map(|i| format!("t{i}")).collect(),
            ..Default::default()
        };
        let errs = draft.validate().unwrap_err();
        assert_eq!(
            errs.fields(),
            vec!["title", "slug", "content", "coverImage", "tags", "categoryId"]
        );
        assert!(errs.to_string().starts_with("validation failed: title: must be at least 3"));
    }

    #[test]
    fn published_post_with_body_and_category_passes() {
        let draft = PostDraft {
            title: "Shipping".into(),
            slug: Some("shipping-v2".into()),
            content: "<p>Body</p>".into(),
            cover_image: Some("https://res.example.com/img.png".into()),
            status: PostStatus::Published,
            category_id: Some("c1".into()),
            ..Default::default()
        };
        assert!(draft.validate().is_ok());
    }

    #[test]
    fn long_tag_is_rejected() {
        let draft = PostDraft {
            title: "Tags".into(),
            tags: vec!["x".repeat(TAG_MAX + 1)],
            ..Default::default()
        };
        assert_eq!(draft.validate().unwrap_err().fields(), vec!["tags"]);
    }

    #[test]
    fn category_requires_name() {
        let errs = CategoryInput::default().validate().unwrap_err();
        assert_eq!(errs.fields(), vec!["name"]);

        let ok = CategoryInput {
            name: "Systems Programming".into(),
            ..Default::default()
        }
        .validate()
        .unwrap();
        assert_eq!(ok.slug.as_deref(), Some("systems-programming"));
    }

    #[test]
    fn profile_urls() {
        let ok = ProfileUpdate {
            name: "Ada".into(),
            website: Some("http://ada.dev".into()),
            avatar: Some("https://res.example.com/a.png".into()),
            ..Default::default()
        };
        assert!(ok.validate().is_ok());

        let bad = ProfileUpdate {
            name: "Ada".into(),
            website: Some("ftp://ada.dev".into()),
            avatar: Some("not a url".into()),
            bio: Some("b".repeat(BIO_MAX + 1)),
        };
        assert_eq!(bad.validate().unwrap_err().fields(), vec!["bio", "avatar", "website"]);
    }
}
