//! CORS policy for the `/api` routes, built from the configured origin allow-list.

use axum::http::{header::HeaderValue, request::Parts, Method};
use globset::{GlobBuilder, GlobSet, GlobSetBuilder};
use tower_http::cors::{AllowHeaders, AllowOrigin, CorsLayer};

use bookshelf_kernel::settings::CorsSettings;

const ALLOWED_METHODS: [Method; 6] = [
    Method::GET,
    Method::POST,
    Method::PUT,
    Method::PATCH,
    Method::DELETE,
    Method::OPTIONS,
];

/// Allowed origins as case-insensitive globs, e.g. `https://*.example.com` or
/// `http://localhost:*`. Entries that fail to compile are skipped.
#[derive(Debug, Clone)]
pub struct OriginPatterns {
    patterns: Vec<String>,
    set: GlobSet,
}

impl OriginPatterns {
    pub fn new(patterns: impl IntoIterator<Item = String>) -> Self {
        let mut builder = GlobSetBuilder::new();
        let mut accepted = Vec::new();
        for pattern in patterns {
            match GlobBuilder::new(&pattern).case_insensitive(true).build() {
                Ok(glob) => {
                    builder.add(glob);
                    accepted.push(pattern);
                }
                Err(error) => {
                    tracing::warn!(%pattern, %error, "ignoring invalid CORS origin pattern");
                }
            }
        }

        let set = builder.build().unwrap_or_else(|error| {
            tracing::warn!(%error, "failed to build CORS origin set; refusing all origins");
            accepted.clear();
            GlobSet::empty()
        });

        Self {
            patterns: accepted,
            set,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.set.is_empty()
    }

    pub fn matches(&self, origin: &str) -> bool {
        self.set.is_match(origin)
    }
}

/// Build the CORS layer: listed origins only, credentials allowed, request headers mirrored.
pub fn cors_layer(settings: &CorsSettings) -> CorsLayer {
    let patterns = OriginPatterns::new(settings.origins());
    if patterns.is_empty() {
        tracing::warn!("no CORS origins configured; cross-origin requests will be refused");
    } else {
        tracing::info!(origins = ?patterns.patterns, "CORS allow-list configured");
    }

    CorsLayer::new()
        .allow_origin(AllowOrigin::predicate(
            move |origin: &HeaderValue, _request: &Parts| {
                origin
                    .to_str()
                    .map(|origin| patterns.matches(origin))
                    .unwrap_or(false)
            },
        ))
        .allow_methods(ALLOWED_METHODS.to_vec())
        .allow_headers(AllowHeaders::mirror_request())
        .allow_credentials(true)
}
