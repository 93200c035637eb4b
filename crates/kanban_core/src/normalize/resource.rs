//! URL, resource kind and thumbnail normalization.
//!
//! # Invariants
//! - Normalized URLs always carry a scheme (`https://` when missing).
//! - YouTube resources resolve to the `i.ytimg.com` thumbnail of their id.

use crate::model::ids::NormalizeCtx;
use crate::model::resource::{Resource, ResourceKind};
use crate::normalize::{id_field, text_field, timestamp_field, trimmed_field};
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;
use std::collections::HashSet;

static SCHEME_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-zA-Z][a-zA-Z0-9+.\-]*://").expect("valid scheme regex"));
static URL_PARTS_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[a-zA-Z][a-zA-Z0-9+.\-]*://([^/?#]*)([^?#]*)(?:\?([^#]*))?")
        .expect("valid url parts regex")
});
static VIDEO_ID_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z0-9_\-]{3,}$").expect("valid video id regex"));

/// Hosts whose links are treated as study/work material.
const MATERIAL_HOSTS: [&str; 8] = [
    "docs.google.com",
    "drive.google.com",
    "dropbox.com",
    "notion.so",
    "notion.site",
    "onedrive.live.com",
    "scribd.com",
    "slideshare.net",
];

const SCREENSHOT_SERVICE: &str = "https://image.thum.io/get/width/640/";

/// Host, path and query of an absolute URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UrlParts<'a> {
    /// Lowercased host without credentials or port.
    pub host: String,
    pub path: &'a str,
    pub query: &'a str,
}

/// Trims and scheme-qualifies a URL; `None` for blank input.
pub fn normalize_url(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    if SCHEME_RE.is_match(trimmed) {
        return Some(trimmed.to_string());
    }
    if let Some(rest) = trimmed.strip_prefix("//") {
        return Some(format!("https://{rest}"));
    }
    Some(format!("https://{trimmed}"))
}

/// Splits a scheme-qualified URL.
pub fn url_parts(url: &str) -> Option<UrlParts<'_>> {
    let caps = URL_PARTS_RE.captures(url)?;
    let authority = caps.get(1).map_or("", |m| m.as_str());
    let host = authority
        .rsplit('@')
        .next()
        .unwrap_or_default()
        .split(':')
        .next()
        .unwrap_or_default()
        .to_ascii_lowercase();
    Some(UrlParts {
        host,
        path: caps.get(2).map_or("", |m| m.as_str()),
        query: caps.get(3).map_or("", |m| m.as_str()),
    })
}

/// `host` equals `domain` or is one of its subdomains.
fn host_matches(host: &str, domain: &str) -> bool {
    host == domain
        || host
            .strip_suffix(domain)
            .is_some_and(|prefix| prefix.ends_with('.'))
}

/// Classifies a URL by host and path.
pub fn detect_resource_kind(url: &str) -> ResourceKind {
    let Some(parts) = url_parts(url) else {
        return ResourceKind::Link;
    };
    if host_matches(&parts.host, "youtube.com")
        || host_matches(&parts.host, "youtu.be")
        || host_matches(&parts.host, "youtube-nocookie.com")
    {
        return ResourceKind::Youtube;
    }
    let is_material_host = MATERIAL_HOSTS
        .iter()
        .any(|domain| host_matches(&parts.host, domain));
    if is_material_host || parts.path.to_ascii_lowercase().ends_with(".pdf") {
        return ResourceKind::Material;
    }
    ResourceKind::Link
}

/// Extracts a YouTube video id.
///
/// Supports `watch?v=<id>`, `youtu.be/<id>` and `/embed/`, `/shorts/`,
/// `/live/`, `/v/` path forms.
pub fn youtube_video_id(url: &str) -> Option<String> {
    let parts = url_parts(url)?;
    let mut segments = parts.path.split('/').filter(|segment| !segment.is_empty());

    let candidate = if host_matches(&parts.host, "youtu.be") {
        segments.next().map(str::to_string)
    } else if host_matches(&parts.host, "youtube.com")
        || host_matches(&parts.host, "youtube-nocookie.com")
    {
        let from_query = parts.query.split('&').find_map(|pair| {
            pair.strip_prefix("v=")
                .filter(|value| !value.is_empty())
                .map(str::to_string)
        });
        from_query.or_else(|| match segments.next() {
            Some("embed" | "shorts" | "live" | "v") => segments.next().map(str::to_string),
            _ => None,
        })
    } else {
        None
    };

    candidate.filter(|id| VIDEO_ID_RE.is_match(id))
}

/// Thumbnail for a URL that came without one.
pub fn derive_thumbnail(url: &str, kind: ResourceKind) -> String {
    if kind == ResourceKind::Youtube {
        if let Some(video_id) = youtube_video_id(url) {
            return format!("https://i.ytimg.com/vi/{video_id}/hqdefault.jpg");
        }
    }
    format!("{SCREENSHOT_SERVICE}{url}")
}

/// Key used to detect duplicate links.
///
/// Scheme and host compare case-insensitively and one trailing `/` is
/// ignored; query parameter order is significant.
pub fn preview_key(url: &str) -> String {
    let normalized = normalize_url(url).unwrap_or_default();
    let trimmed = normalized.strip_suffix('/').unwrap_or(&normalized);
    match SCHEME_RE.find(trimmed) {
        Some(scheme) => {
            let rest = &trimmed[scheme.end()..];
            let host_end = rest.find(['/', '?', '#']).unwrap_or(rest.len());
            format!(
                "{}{}{}",
                scheme.as_str().to_ascii_lowercase(),
                rest[..host_end].to_ascii_lowercase(),
                &rest[host_end..]
            )
        }
        None => trimmed.to_string(),
    }
}

/// Normalizes one persisted resource; `None` when it has no usable URL.
pub fn normalize_resource(raw: &Value, ctx: &mut NormalizeCtx<'_>) -> Option<Resource> {
    let url = match raw {
        Value::String(url) => normalize_url(url)?,
        other => normalize_url(other.get("url").and_then(Value::as_str)?)?,
    };
    let kind = raw
        .get("kind")
        .and_then(Value::as_str)
        .and_then(ResourceKind::from_key)
        .unwrap_or_else(|| detect_resource_kind(&url));
    let thumbnail =
        trimmed_field(raw, "thumbnail").unwrap_or_else(|| derive_thumbnail(&url, kind));

    Some(Resource {
        id: id_field(raw, ctx),
        title: text_field(raw, "title").trim().to_string(),
        url,
        kind,
        thumbnail,
        description: text_field(raw, "description").trim().to_string(),
        created_at: timestamp_field(raw, "createdAt").unwrap_or_else(|| ctx.now()),
    })
}

/// Normalizes a resource list, dropping blank and duplicate URLs.
pub fn normalize_resources(source: Option<&Value>, ctx: &mut NormalizeCtx<'_>) -> Vec<Resource> {
    let Some(items) = source.and_then(Value::as_array) else {
        return Vec::new();
    };
    let mut seen_urls = HashSet::new();
    let mut seen_ids = HashSet::new();
    let mut resources = Vec::with_capacity(items.len());
    for item in items {
        let Some(mut resource) = normalize_resource(item, ctx) else {
            continue;
        };
        if !seen_urls.insert(preview_key(&resource.url)) {
            continue;
        }
        if !seen_ids.insert(resource.id.clone()) {
            resource.id = ctx.next_id();
            seen_ids.insert(resource.id.clone());
        }
        resources.push(resource);
    }
    resources
}

#[cfg(test)]
mod tests {
    use super::{
        derive_thumbnail, detect_resource_kind, normalize_resources, normalize_url, preview_key,
        youtube_video_id,
    };
    use crate::model::ids::{NormalizeCtx, SequentialIdGenerator};
    use crate::model::resource::ResourceKind;
    use serde_json::json;

    #[test]
    fn normalize_url_prepends_https() {
        assert_eq!(normalize_url(" example.com/a ").as_deref(), Some("https://example.com/a"));
        assert_eq!(normalize_url("//cdn.io/x").as_deref(), Some("https://cdn.io/x"));
        assert_eq!(normalize_url("http://a.b").as_deref(), Some("http://a.b"));
        assert_eq!(normalize_url("   "), None);
    }

    #[test]
    fn kinds_are_detected_from_host_and_path() {
        assert_eq!(detect_resource_kind("https://youtu.be/abc123"), ResourceKind::Youtube);
        assert_eq!(
            detect_resource_kind("https://m.youtube.com/watch?v=abc123"),
            ResourceKind::Youtube
        );
        assert_eq!(
            detect_resource_kind("https://docs.google.com/document/d/1"),
            ResourceKind::Material
        );
        assert_eq!(
            detect_resource_kind("https://example.com/paper.PDF"),
            ResourceKind::Material
        );
        assert_eq!(detect_resource_kind("https://notyoutube.com/x"), ResourceKind::Link);
    }

    #[test]
    fn video_id_supports_query_and_path_forms() {
        assert_eq!(
            youtube_video_id("https://www.youtube.com/watch?list=x&v=dQw4w9WgXcQ").as_deref(),
            Some("dQw4w9WgXcQ")
        );
        assert_eq!(youtube_video_id("https://youtu.be/abc123").as_deref(), Some("abc123"));
        assert_eq!(
            youtube_video_id("https://www.youtube.com/shorts/short_01").as_deref(),
            Some("short_01")
        );
        assert_eq!(
            youtube_video_id("https://www.youtube.com/embed/emb-1?start=3").as_deref(),
            Some("emb-1")
        );
        assert_eq!(youtube_video_id("https://www.youtube.com/feed"), None);
    }

    #[test]
    fn thumbnails_use_video_cdn_or_screenshot_service() {
        assert_eq!(
            derive_thumbnail("https://youtu.be/abc123", ResourceKind::Youtube),
            "https://i.ytimg.com/vi/abc123/hqdefault.jpg"
        );
        assert_eq!(
            derive_thumbnail("https://example.com", ResourceKind::Link),
            "https://image.thum.io/get/width/640/https://example.com"
        );
    }

    #[test]
    fn preview_key_ignores_host_case_and_trailing_slash() {
        assert_eq!(preview_key("HTTPS://Example.com/"), preview_key("https://example.com"));
        assert_ne!(preview_key("https://a.io/?x=1&y=2"), preview_key("https://a.io/?y=2&x=1"));
        assert_ne!(preview_key("https://a.io/Path"), preview_key("https://a.io/path"));
    }

    #[test]
    fn resource_list_drops_blank_and_duplicate_urls() {
        let mut ids = SequentialIdGenerator::new("r");
        let mut ctx = NormalizeCtx::new(&mut ids, 10);
        let resources = normalize_resources(
            Some(&json!([
                { "url": "example.com", "title": " Home " },
                { "url": "https://example.com/" },
                { "url": "  " },
                "youtu.be/abc123",
                { "url": "https://x.io", "kind": "material", "thumbnail": "t.png" }
            ])),
            &mut ctx,
        );
        assert_eq!(resources.len(), 3);
        assert_eq!(resources[0].url, "https://example.com");
        assert_eq!(resources[0].title, "Home");
        assert_eq!(resources[1].kind, ResourceKind::Youtube);
        assert_eq!(resources[2].kind, ResourceKind::Material);
        assert_eq!(resources[2].thumbnail, "t.png");
        assert_eq!(resources[2].created_at, 10);
    }
}
