//! Redirect responses.
//!
//! # Responsibilities
//! - Turn a rewrite payload into the complete HTTP response
//! - Produce the plain redirect used when no rewrite applies
//!
//! # Design Decisions
//! - Affiliate pages are 200 HTML with noindex/nofollow and no-store
//! - Plain redirects are 302 so the destination is never cached as permanent

use axum::http::header::{CACHE_CONTROL, CONTENT_TYPE, LOCATION};
use axum::http::{HeaderName, StatusCode};
use axum::response::{IntoResponse, Response};
use url::Url;

use crate::affiliate::RedirectPayload;

pub const X_ROBOTS_TAG: HeaderName = HeaderName::from_static("x-robots-tag");

/// The full response for a rewritten link. Nothing else may be written after it.
pub fn affiliate_page(payload: RedirectPayload) -> Response {
    (
        StatusCode::OK,
        [
            (CONTENT_TYPE, RedirectPayload::CONTENT_TYPE),
            (X_ROBOTS_TAG, RedirectPayload::ROBOTS),
            (CACHE_CONTROL, "no-store"),
        ],
        payload.html,
    )
        .into_response()
}

/// Ordinary redirect to the unmodified destination.
pub fn plain_redirect(destination: &Url) -> Response {
    (StatusCode::FOUND, [(LOCATION, destination.as_str())]).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_affiliate_page_headers() {
        let payload = RedirectPayload::new("https://www.awin1.com/cread.php?awinmid=1".into());
        let response = affiliate_page(payload);

        assert_eq!(response.status(), StatusCode::OK);
        let headers = response.headers();
        assert_eq!(headers[CONTENT_TYPE], "text/html; charset=utf-8");
        assert_eq!(headers[X_ROBOTS_TAG], "noindex, nofollow");
        assert_eq!(headers[CACHE_CONTROL], "no-store");
    }

    #[test]
    fn test_plain_redirect() {
        let url = Url::parse("https://example.org/a?b=c").unwrap();
        let response = plain_redirect(&url);

        assert_eq!(response.status(), StatusCode::FOUND);
        assert_eq!(response.headers()[LOCATION], "https://example.org/a?b=c");
    }
}
