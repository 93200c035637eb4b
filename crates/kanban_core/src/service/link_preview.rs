//! Link previews for URLs typed into notes.
//!
//! # Responsibility
//! - Detect URLs in note content.
//! - Debounce resolution after edits (`PreviewScheduler`).
//! - Resolve metadata through a `LinkResolver`, degrading to a placeholder.
//! - Apply results through the store without duplicating previews.
//!
//! # Invariants
//! - Resolution failures never propagate; they yield a placeholder preview
//!   with a derived thumbnail and empty title/description.
//! - Edits after scheduling do not cancel in-flight resolution; duplicate
//!   application is suppressed at apply time.

use crate::config::CoreConfig;
use crate::model::ids::{EpochMs, NormalizeCtx};
use crate::model::note::Note;
use crate::model::resource::{create_resource, Resource, ResourceDraft, ResourceKind};
use crate::normalize::resource::{detect_resource_kind, normalize_url, preview_key, url_parts};
use crate::repo::kv_repo::KeyValueStore;
use crate::service::resources::has_preview_for;
use crate::service::store::{StoreResult, WorkspaceStore};
use log::{debug, info, warn};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;
use std::collections::{BTreeMap, HashSet};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::time::Duration;

static URL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?i)\b(?:https?://|www\.)[^\s<>()\[\]{}"'`]+"#).expect("valid url regex")
});

const TRAILING_PUNCTUATION: &[char] = &['.', ',', ';', ':', '!', '?', '\'', '"', '*', '_'];

pub const DEFAULT_OEMBED_ENDPOINT: &str = "https://noembed.com/embed";
const RESOLVE_TIMEOUT: Duration = Duration::from_secs(10);

/// Scheme-qualified URLs found in `content`, in order, without duplicates.
pub fn detect_urls(content: &str) -> Vec<String> {
    let mut seen = HashSet::new();
    URL_RE
        .find_iter(content)
        .filter_map(|found| normalize_url(found.as_str().trim_end_matches(TRAILING_PUNCTUATION)))
        .filter(|url| url_parts(url).is_some_and(|parts| parts.host.contains('.')))
        .filter(|url| seen.insert(preview_key(url)))
        .collect()
}

/// URLs of `note` that have no preview yet.
pub fn pending_urls(note: &Note) -> Vec<String> {
    detect_urls(&note.content)
        .into_iter()
        .filter(|url| !has_preview_for(&note.link_previews, url))
        .collect()
}

/// Per-note debounce deadlines.
#[derive(Debug, Clone)]
pub struct PreviewScheduler {
    debounce_ms: EpochMs,
    deadlines: BTreeMap<String, EpochMs>,
}

impl PreviewScheduler {
    pub fn new(debounce_ms: u64) -> Self {
        Self {
            debounce_ms: EpochMs::try_from(debounce_ms).unwrap_or(EpochMs::MAX),
            deadlines: BTreeMap::new(),
        }
    }

    pub fn from_config(config: &CoreConfig) -> Self {
        Self::new(config.preview_debounce_ms)
    }

    /// (Re)arms the deadline of `note_id` to `now + debounce`.
    pub fn note_edited(&mut self, note_id: &str, now: EpochMs) {
        self.deadlines
            .insert(note_id.to_string(), now.saturating_add(self.debounce_ms));
    }

    /// Removes and returns notes whose deadline is at or before `now`.
    pub fn take_due(&mut self, now: EpochMs) -> Vec<String> {
        let due: Vec<String> = self
            .deadlines
            .iter()
            .filter(|(_, deadline)| **deadline <= now)
            .map(|(note_id, _)| note_id.clone())
            .collect();
        for note_id in &due {
            self.deadlines.remove(note_id);
        }
        due
    }

    pub fn next_deadline(&self) -> Option<EpochMs> {
        self.deadlines.values().copied().min()
    }

    pub fn is_idle(&self) -> bool {
        self.deadlines.is_empty()
    }
}

/// Metadata fetched for one URL.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LinkMetadata {
    pub title: String,
    pub description: String,
    pub thumbnail: Option<String>,
}

/// Metadata lookup failure.
#[derive(Debug)]
pub enum ResolveError {
    Client(reqwest::Error),
    /// Non-success HTTP status.
    Http(u16),
    /// Provider answered with an error payload.
    Provider(String),
}

impl Display for ResolveError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Client(err) => write!(f, "link lookup failed: {err}"),
            Self::Http(status) => write!(f, "link lookup returned status {status}"),
            Self::Provider(message) => write!(f, "link provider error: {message}"),
        }
    }
}

impl Error for ResolveError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Client(err) => Some(err),
            Self::Http(_) | Self::Provider(_) => None,
        }
    }
}

impl From<reqwest::Error> for ResolveError {
    fn from(value: reqwest::Error) -> Self {
        Self::Client(value)
    }
}

/// Source of link metadata.
pub trait LinkResolver {
    fn resolve(&self, url: &str) -> Result<LinkMetadata, ResolveError>;
}

#[derive(Debug, Deserialize)]
struct OembedResponse {
    title: Option<String>,
    author_name: Option<String>,
    provider_name: Option<String>,
    thumbnail_url: Option<String>,
    error: Option<String>,
}

/// oEmbed lookup over blocking HTTP.
pub struct OembedResolver {
    client: reqwest::blocking::Client,
    endpoint: String,
}

impl OembedResolver {
    pub fn new() -> Result<Self, ResolveError> {
        Self::with_endpoint(DEFAULT_OEMBED_ENDPOINT)
    }

    pub fn with_endpoint(endpoint: impl Into<String>) -> Result<Self, ResolveError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(RESOLVE_TIMEOUT)
            .user_agent(concat!("kanban-core/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            client,
            endpoint: endpoint.into(),
        })
    }
}

impl LinkResolver for OembedResolver {
    fn resolve(&self, url: &str) -> Result<LinkMetadata, ResolveError> {
        let response = self
            .client
            .get(&self.endpoint)
            .query(&[("url", url)])
            .send()?;
        if !response.status().is_success() {
            return Err(ResolveError::Http(response.status().as_u16()));
        }
        let body: OembedResponse = response.json()?;
        if let Some(message) = body.error {
            return Err(ResolveError::Provider(message));
        }

        let description = [body.author_name, body.provider_name]
            .into_iter()
            .flatten()
            .map(|part| part.trim().to_string())
            .filter(|part| !part.is_empty())
            .collect::<Vec<_>>()
            .join(" · ");
        Ok(LinkMetadata {
            title: body.title.unwrap_or_default().trim().to_string(),
            description,
            thumbnail: body
                .thumbnail_url
                .map(|thumbnail| thumbnail.trim().to_string())
                .filter(|thumbnail| !thumbnail.is_empty()),
        })
    }
}

/// Resolves `url` into a preview, substituting a placeholder on failure.
///
/// YouTube previews always use the thumbnail derived from the video id.
/// Returns `None` only for a blank URL.
pub fn resolve_or_placeholder<R: LinkResolver + ?Sized>(
    resolver: &R,
    url: &str,
    ctx: &mut NormalizeCtx<'_>,
) -> Option<Resource> {
    let url = normalize_url(url)?;
    let kind = detect_resource_kind(&url);
    let draft = match resolver.resolve(&url) {
        Ok(metadata) => ResourceDraft {
            title: metadata.title,
            description: metadata.description,
            kind: Some(kind),
            thumbnail: match kind {
                ResourceKind::Youtube => String::new(),
                _ => metadata.thumbnail.unwrap_or_default(),
            },
            url,
        },
        Err(err) => {
            warn!("event=link_resolve module=service status=fallback error={err}");
            ResourceDraft {
                kind: Some(kind),
                ..ResourceDraft::from_url(url)
            }
        }
    };
    create_resource(draft, ctx)
}

/// Resolves and applies previews for every note whose debounce elapsed.
///
/// Only notes of the active project are handled. Returns the number of
/// previews added.
pub fn run_due_previews<S, R>(
    store: &mut WorkspaceStore<S>,
    scheduler: &mut PreviewScheduler,
    resolver: &R,
) -> StoreResult<usize>
where
    S: KeyValueStore,
    R: LinkResolver + ?Sized,
{
    let mut applied = 0;
    for note_id in scheduler.take_due(store.now_ms()) {
        let urls = match store.active_project().notes_state.note(&note_id) {
            Some(note) => pending_urls(note),
            None => {
                debug!("event=link_preview_run module=service status=skipped note_id={note_id}");
                continue;
            }
        };
        for url in urls {
            let Some(preview) = store.with_ctx(|ctx| resolve_or_placeholder(resolver, &url, ctx))
            else {
                continue;
            };
            if store.apply_link_preview(&note_id, preview)? {
                applied += 1;
            }
        }
    }
    if applied > 0 {
        info!("event=link_preview_run module=service status=ok applied={applied}");
    }
    Ok(applied)
}
