//! End-to-end tests for short-link resolution with affiliate rewriting.

use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};

use affiliate_redirect::settings::{MemorySettingsStore, SettingsHandle};

mod common;

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn app() -> axum::Router {
    common::build_app(
        Arc::new(MemorySettingsStore::new()),
        SettingsHandle::new(common::sample_settings()),
    )
}

#[tokio::test]
async fn test_merchant_link_gets_affiliate_page() {
    let app = app();
    let response = common::send(&app, get("/deal")).await;

    assert_eq!(response.status(), StatusCode::OK);
    let headers = response.headers();
    assert_eq!(headers[header::CONTENT_TYPE], "text/html; charset=utf-8");
    assert_eq!(headers["x-robots-tag"], "noindex, nofollow");
    assert!(headers.contains_key("x-request-id"));

    let body = common::body_string(response).await;
    let expected = "https://www.awin1.com/cread.php?awinmid=12345&amp;awinaffid=999&amp;campaign=summer&amp;clickref=abc&amp;ued=https%3A%2F%2Fwww.coolblue.nl%2Fproduct%2F123";
    assert!(body.contains(&format!("content=\"0; url={expected}\"")));
    assert!(body.contains(&format!("href=\"{expected}\"")));
    assert!(body.contains("window.location.href"));
}

#[tokio::test]
async fn test_merchant_default_campaign_applies() {
    let app = app();
    let response = common::send(&app, get("/be")).await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = common::body_string(response).await;
    assert!(body.contains("awinmid=12345&amp;awinaffid=999&amp;campaign=launch&amp;ued=https%3A%2F%2Fcoolblue.be%2F"));
    assert!(!body.contains("clickref"));
}

#[tokio::test]
async fn test_ued_carries_destination_as_configured() {
    let app = app();
    let response = common::send(&app, get("/mixed")).await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = common::body_string(response).await;
    assert!(body.contains("&amp;clickref=x&amp;ued=https%3A%2F%2FWWW.CoolBlue.NL%2FActies%2F..%2FDeal\""));
}

#[tokio::test]
async fn test_disabled_merchant_gets_plain_redirect() {
    let app = app();
    let response = common::send(&app, get("/bol")).await;

    assert_eq!(response.status(), StatusCode::FOUND);
    assert_eq!(response.headers()[header::LOCATION], "https://www.bol.com/nl/p/1");
}

#[tokio::test]
async fn test_unknown_merchant_gets_plain_redirect() {
    let app = app();
    let response = common::send(&app, get("/other")).await;

    assert_eq!(response.status(), StatusCode::FOUND);
    assert_eq!(response.headers()[header::LOCATION], "https://example.org/page?x=1");
}

#[tokio::test]
async fn test_unknown_code_is_not_found() {
    let app = app();
    let response = common::send(&app, get("/nope")).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_health() {
    let app = app();
    let response = common::send(&app, get("/health")).await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(common::body_string(response).await, "ok");
}

#[tokio::test]
async fn test_settings_swap_changes_next_request() {
    let handle = SettingsHandle::new(common::sample_settings());
    let app = common::build_app(Arc::new(MemorySettingsStore::new()), handle.clone());

    let mut settings = common::sample_settings();
    settings.merchants.get_mut("coolblue").unwrap().enabled = false;
    handle.replace(settings);

    let response = common::send(&app, get("/deal")).await;
    assert_eq!(response.status(), StatusCode::FOUND);
}
