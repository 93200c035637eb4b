//! Link resources and note link previews.
//!
//! # Invariants
//! - `url` is non-empty and scheme-qualified.
//! - `thumbnail` is always populated (supplied or derived from `url`).

use crate::model::ids::{EpochMs, NormalizeCtx};
use crate::normalize::resource::{derive_thumbnail, detect_resource_kind, normalize_url};
use serde::Serialize;

/// Broad category of a linked resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ResourceKind {
    /// YouTube video.
    Youtube,
    /// Hosted document (docs, drives, PDFs).
    Material,
    /// Anything else.
    Link,
}

impl ResourceKind {
    pub fn from_key(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "youtube" => Some(Self::Youtube),
            "material" => Some(Self::Material),
            "link" => Some(Self::Link),
            _ => None,
        }
    }
}

/// A link saved on a project or derived from a note body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Resource {
    pub id: String,
    pub title: String,
    pub url: String,
    pub kind: ResourceKind,
    pub thumbnail: String,
    pub description: String,
    pub created_at: EpochMs,
}

/// Input for a new resource. Empty strings mean "derive".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResourceDraft {
    pub url: String,
    pub title: String,
    pub description: String,
    pub kind: Option<ResourceKind>,
    pub thumbnail: String,
}

impl ResourceDraft {
    pub fn from_url(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Self::default()
        }
    }
}

/// Builds a resource from a draft; `None` when the URL is blank.
pub fn create_resource(draft: ResourceDraft, ctx: &mut NormalizeCtx<'_>) -> Option<Resource> {
    let url = normalize_url(&draft.url)?;
    let kind = draft.kind.unwrap_or_else(|| detect_resource_kind(&url));
    let thumbnail = match draft.thumbnail.trim() {
        "" => derive_thumbnail(&url, kind),
        supplied => supplied.to_string(),
    };

    Some(Resource {
        id: ctx.next_id(),
        title: draft.title.trim().to_string(),
        url,
        kind,
        thumbnail,
        description: draft.description.trim().to_string(),
        created_at: ctx.now(),
    })
}
